#![forbid(unsafe_code)]

//! Test fixtures for slate: a recording list view, a sample entity type,
//! and proptest strategies over rosters.
//!
//! The fixtures live in a library crate so integration tests, property
//! tests, and downstream consumers exercise the binding layer through the
//! same doubles.

use std::borrow::Cow;

use slate_core::{Position, SelectableEntity};
use slate_select::ListView;
use tracing::trace;

/// Sample entity: identity by `id`, display by `name`.
///
/// The split demonstrates the capability contract — two values with the
/// same id are the same entity even when their display text differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Stable identity.
    pub id: u32,
    /// Display name.
    pub name: String,
}

impl Contact {
    /// Create a contact.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl SelectableEntity for Contact {
    fn entity_eq(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// A deterministic roster of `n` contacts named `Contact 0..n`.
#[must_use]
pub fn roster(n: u32) -> Vec<Contact> {
    (0..n).map(|i| Contact::new(i, format!("Contact {i}"))).collect()
}

/// List-view double recording every programmatic call the controller
/// makes.
///
/// `reload` clears the recorded visual selection, mirroring native list
/// widgets that drop selection on a data reload.
#[derive(Debug, Default)]
pub struct RecordingListView {
    selected: Vec<Position>,
    /// Number of `reload` calls observed.
    pub reload_count: usize,
    /// Last value passed to `set_multiselect`.
    pub multiselect_enabled: bool,
}

impl RecordingListView {
    /// A fresh view with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions currently rendered as selected, in selection order.
    #[must_use]
    pub fn selected_positions(&self) -> &[Position] {
        &self.selected
    }

    /// Whether `position` is rendered as selected.
    #[must_use]
    pub fn is_row_selected(&self, position: Position) -> bool {
        self.selected.contains(&position)
    }
}

impl ListView for RecordingListView {
    fn select_row(&mut self, position: Position) {
        if !self.selected.contains(&position) {
            self.selected.push(position);
        }
    }

    fn deselect_row(&mut self, position: Position) {
        self.selected.retain(|p| *p != position);
    }

    fn selected_rows(&self) -> Vec<Position> {
        self.selected.clone()
    }

    fn reload(&mut self) {
        trace!("recording view reloaded");
        self.reload_count += 1;
        self.selected.clear();
    }

    fn set_multiselect(&mut self, enabled: bool) {
        self.multiselect_enabled = enabled;
    }
}

/// Proptest strategies over fixture data.
pub mod strategies {
    use super::Contact;
    use proptest::prelude::*;

    /// Rosters of up to `max` contacts with unique ids.
    pub fn rosters(max: usize) -> impl Strategy<Value = Vec<Contact>> {
        proptest::collection::btree_set(0..1000u32, 0..max).prop_map(|ids| {
            ids.into_iter()
                .map(|id| Contact::new(id, format!("Contact {id}")))
                .collect()
        })
    }
}
