#![forbid(unsafe_code)]

//! Selection bookkeeping and reconciliation against a live list view.
//!
//! [`SelectablesList`] owns three things that must stay consistent: the
//! ordered list of selected entities, the host widget's visual selection,
//! and the notifications delivered to the owner (callback + delegate).
//! Taps, filter changes, reloads, and container swaps all funnel through
//! it.
//!
//! # Selection modes
//!
//! The host widget is always switched to multi-select
//! ([`did_load`](SelectablesList::did_load)), regardless of the configured
//! mode. A widget constrained to "exactly one selected row" would swallow
//! the deselection event for a tap on the already-selected row; with
//! multi-select always on, that tap surfaces as a deselection and the
//! controller decides what it means. Single-selection semantics are
//! enforced here in software: after any selection event the selected list
//! holds at most one entry, and every other visually selected row is
//! cleared without re-entering the handlers.
//!
//! # Failure Modes
//!
//! - Tap at a stale position → ignored.
//! - Deselecting an entity that is not selected → no-op, no notification.
//! - Selecting an entity already selected (by identity) → no duplicate
//!   entry, `on_select` does not re-fire.
//! - Selected entity hidden by the current filter → retained in the
//!   selection, not rendered until it reappears.

use core::fmt;
use std::rc::Weak;

use slate_core::{Container, FilterableContainer, Position, SelectableEntity};
use tracing::{debug, trace};

use crate::ListView;
use crate::cell::{CellPool, ConfigurableCell};
use crate::data_source::ListDataSource;

/// Observer of selection changes, registered as a non-owning reference.
///
/// The controller holds a [`Weak`]; it never keeps the host alive, and a
/// dropped observer silently stops receiving notifications.
pub trait SelectablesDelegate<T> {
    /// An entity was added to the selection.
    fn list_did_select(&self, entity: &T);

    /// An entity was removed from the selection.
    fn list_did_deselect(&self, entity: &T);

    /// The confirm action fired with the full selection, in selection
    /// order.
    fn list_did_confirm(&self, _entities: &[T]) {}
}

/// Events from the host's search input surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInputEvent {
    /// The filter text changed (`None` clears the filter).
    TextChanged(Option<String>),
    /// The search/confirm button was pressed.
    Submitted,
    /// The show-results button was pressed.
    ResultsRequested,
}

type SelectCallback<T> = Box<dyn FnMut(&T)>;
type ConfirmCallback<T> = Box<dyn FnMut(&[T])>;

/// Selection controller binding a container-backed data source to a host
/// list widget.
///
/// Construction is builder-style; the selection mode flags are fixed once
/// the controller is built. See the crate root for a usage example.
pub struct SelectablesList<C: Container, V> {
    data_source: ListDataSource<C>,
    view: V,
    selected: Vec<C::Item>,
    multiselection: bool,
    custom_selection_rendering: bool,
    instance_id: String,
    on_select: Option<SelectCallback<C::Item>>,
    on_confirm: Option<ConfirmCallback<C::Item>>,
    delegate: Option<Weak<dyn SelectablesDelegate<C::Item>>>,
}

impl<C, V> SelectablesList<C, V>
where
    C: Container,
    C::Item: Clone,
    V: ListView,
{
    /// A single-selection controller over `container`, driving `view`.
    #[must_use]
    pub fn new(container: Option<C>, view: V) -> Self {
        Self {
            data_source: ListDataSource::new(container),
            view,
            selected: Vec::new(),
            multiselection: false,
            custom_selection_rendering: false,
            instance_id: "selectables".to_string(),
            on_select: None,
            on_confirm: None,
            delegate: None,
        }
    }

    /// Seed the selection. Entries keep their order and are reflected
    /// visually on the next [`did_appear`](Self::did_appear) or reload.
    #[must_use]
    pub fn with_selected(mut self, selected: Vec<C::Item>) -> Self {
        self.selected = selected;
        self
    }

    /// Allow more than one selected entity at a time.
    #[must_use]
    pub fn with_multiselection(mut self, multiselection: bool) -> Self {
        self.multiselection = multiselection;
        self
    }

    /// Let cells render their own selection marker instead of the
    /// widget's highlight; see [`render_cell`](Self::render_cell).
    #[must_use]
    pub fn with_custom_selection_rendering(mut self, enabled: bool) -> Self {
        self.custom_selection_rendering = enabled;
        self
    }

    /// Identifier distinguishing this controller instance in persisted
    /// state.
    #[must_use]
    pub fn with_instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = id.into();
        self
    }

    /// Hook invoked each time an entity is newly added to the selection.
    #[must_use]
    pub fn with_on_select(mut self, f: impl FnMut(&C::Item) + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    /// Hook invoked by [`confirm`](Self::confirm) with the full
    /// selection in selection order.
    #[must_use]
    pub fn with_on_confirm(mut self, f: impl FnMut(&[C::Item]) + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    /// Register the delegate. Only a weak reference is kept.
    pub fn set_delegate(&mut self, delegate: Weak<dyn SelectablesDelegate<C::Item>>) {
        self.delegate = Some(delegate);
    }

    /// Drop the delegate registration.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Whether more than one entity may be selected.
    #[must_use]
    pub fn multiselection(&self) -> bool {
        self.multiselection
    }

    /// Whether cells render their own selection marker.
    #[must_use]
    pub fn uses_custom_selection_rendering(&self) -> bool {
        self.custom_selection_rendering
    }

    /// Identifier used for persisted state.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The selected entities, in selection order.
    #[must_use]
    pub fn selected(&self) -> &[C::Item] {
        &self.selected
    }

    pub(crate) fn set_selected_entries(&mut self, entries: Vec<C::Item>) {
        self.selected = entries;
    }

    /// The bound data source.
    #[must_use]
    pub fn data_source(&self) -> &ListDataSource<C> {
        &self.data_source
    }

    /// Mutable access to the bound data source.
    pub fn data_source_mut(&mut self) -> &mut ListDataSource<C> {
        &mut self.data_source
    }

    /// The host view seam.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the host view seam.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Widget attached: switch it to multi-select. Always, regardless of
    /// the configured mode — see the module docs.
    pub fn did_load(&mut self) {
        self.view.set_multiselect(true);
    }

    /// Widget became visible: reflect the current selection.
    pub fn did_appear(&mut self) {
        self.select_rows_for_current_selection();
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Whether an identity-equal entity is in the selection.
    #[must_use]
    pub fn is_selected(&self, entity: &C::Item) -> bool {
        self.selected.iter().any(|e| e.entity_eq(entity))
    }

    // ── Manual selection ────────────────────────────────────────────

    /// Mark `position` selected in the widget, then run the selection
    /// handler for `entity`. Idempotent; never errors.
    pub fn select(&mut self, entity: &C::Item, position: Position) {
        self.view.select_row(position);
        self.handle_did_select(entity.clone(), position);
    }

    /// Mark `position` deselected in the widget, then run the
    /// deselection handler for `entity`.
    pub fn deselect(&mut self, entity: &C::Item, position: Position) {
        self.view.deselect_row(position);
        self.handle_did_deselect(entity);
    }

    /// Select every currently visible entity.
    pub fn select_all(&mut self) {
        for (position, entity) in self.visible_entries() {
            self.select(&entity, position);
        }
    }

    /// Deselect every currently visible entity.
    pub fn deselect_all(&mut self) {
        for (position, entity) in self.visible_entries() {
            self.deselect(&entity, position);
        }
    }

    fn visible_entries(&self) -> Vec<(Position, C::Item)> {
        let mut entries = Vec::new();
        if let Some(container) = self.data_source.container() {
            container.enumerate(|position, item| entries.push((position, item.clone())));
        }
        entries
    }

    // ── Widget events ───────────────────────────────────────────────

    /// The widget toggled the row at `position` to selected.
    pub fn row_selected(&mut self, position: Position) {
        let Some(entity) = self.data_source.entity_at(position).cloned() else {
            debug!("selection event at stale position {position}, ignoring");
            return;
        };
        self.handle_did_select(entity, position);
    }

    /// The widget toggled the row at `position` to deselected.
    pub fn row_deselected(&mut self, position: Position) {
        let Some(entity) = self.data_source.entity_at(position).cloned() else {
            debug!("deselection event at stale position {position}, ignoring");
            return;
        };
        self.handle_did_deselect(&entity);
    }

    // ── Handlers ────────────────────────────────────────────────────

    fn handle_did_select(&mut self, entity: C::Item, position: Position) {
        if !self.is_selected(&entity) {
            if let Some(on_select) = self.on_select.as_mut() {
                on_select(&entity);
            }
            self.selected.push(entity.clone());
            self.notify_delegate(|delegate, e| delegate.list_did_select(e), &entity);
            debug!("selected entry at {position} ({} total)", self.selected.len());
        }

        if !self.multiselection {
            self.selected.clear();
            self.selected.push(entity);
            // Visual-only cleanup: must not re-enter the deselection
            // handler.
            for other in self.view.selected_rows() {
                if other != position {
                    self.view.deselect_row(other);
                }
            }
        }
    }

    fn handle_did_deselect(&mut self, entity: &C::Item) {
        if let Some(index) = self.selected.iter().position(|e| e.entity_eq(entity)) {
            let removed = self.selected.remove(index);
            self.notify_delegate(|delegate, e| delegate.list_did_deselect(e), &removed);
            debug!("deselected entry ({} remain)", self.selected.len());
        }
    }

    fn notify_delegate<F>(&self, notify: F, entity: &C::Item)
    where
        F: Fn(&dyn SelectablesDelegate<C::Item>, &C::Item),
    {
        if let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) {
            notify(&*delegate, entity);
        }
    }

    // ── Reconciliation ──────────────────────────────────────────────

    /// Re-apply the selection visually: look up each selected entity's
    /// current position and mark it selected in the widget. Entities not
    /// visible under the current filter are skipped and retained.
    ///
    /// Must run after any full reload (initial display, filter change,
    /// container swap), since reloads invalidate positions and drop the
    /// widget's visual selection.
    pub fn select_rows_for_current_selection(&mut self) {
        for entry in &self.selected {
            let found = self
                .data_source
                .container()
                .and_then(|c| c.search(|_, item| item.entity_eq(entry)));
            match found {
                Some(position) => self.view.select_row(position),
                None => trace!("selected entry not visible, selection retained"),
            }
        }
    }

    /// Replace the bound container: reload the widget and re-apply the
    /// current selection against the new container's positions.
    pub fn set_container(&mut self, container: Option<C>) {
        self.data_source.set_container(container);
        self.view.reload();
        self.select_rows_for_current_selection();
    }

    // ── Confirm ─────────────────────────────────────────────────────

    /// Deliver the full selection to the owner, in selection order,
    /// through both the confirm callback and the delegate.
    pub fn confirm(&mut self) {
        if let Some(on_confirm) = self.on_confirm.as_mut() {
            on_confirm(&self.selected);
        }
        if let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) {
            delegate.list_did_confirm(&self.selected);
        }
    }

    // ── Cells ───────────────────────────────────────────────────────

    /// Render the cell for `position`, marking it selected when custom
    /// selection rendering is enabled.
    pub fn render_cell<K>(&self, pool: &mut CellPool<K>, position: Position) -> Option<K>
    where
        K: ConfigurableCell<C::Item>,
    {
        let mut cell = self.data_source.render_cell(pool, position)?;
        if self.custom_selection_rendering {
            let selected = self
                .data_source
                .entity_at(position)
                .is_some_and(|e| self.is_selected(e));
            cell.set_selected(selected);
        }
        Some(cell)
    }
}

impl<C, V> SelectablesList<C, V>
where
    C: FilterableContainer,
    C::Item: Clone,
    V: ListView,
{
    /// The filter text changed: narrow the container, rebuild the widget,
    /// and re-apply the selection against the new positions.
    pub fn search_text_changed(&mut self, text: Option<&str>) {
        self.data_source.apply_filter(text);
        self.view.reload();
        self.select_rows_for_current_selection();
    }

    /// Dispatch an event from the host's search input surface. Button
    /// presses carry no core state change; the host dismisses its input.
    pub fn search_event(&mut self, event: SearchInputEvent) {
        match event {
            SearchInputEvent::TextChanged(text) => self.search_text_changed(text.as_deref()),
            SearchInputEvent::Submitted | SearchInputEvent::ResultsRequested => {
                trace!("search surface action acknowledged");
            }
        }
    }
}

impl<C, V> fmt::Debug for SelectablesList<C, V>
where
    C: Container,
    V: ListView,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectablesList")
            .field("instance_id", &self.instance_id)
            .field("selected", &self.selected.len())
            .field("multiselection", &self.multiselection)
            .field(
                "custom_selection_rendering",
                &self.custom_selection_rendering,
            )
            .field("rows", &self.data_source.rows_in(0))
            .finish_non_exhaustive()
    }
}
