#![forbid(unsafe_code)]

//! Ordered, sectioned collections of entities, addressed by [`Position`].
//!
//! A [`Container`] is the read side of the binding layer: row/section
//! counts, positional lookup, and stable-order enumeration and search.
//! [`FilterableContainer`] adds a text filter that narrows the visible
//! subset without touching the underlying storage.
//!
//! # Invariants
//!
//! - Enumeration and search visit rows in section-major order, and search
//!   returns the first match in that order.
//! - Positions are only valid until the next mutation, filter change, or
//!   reload of the container.
//! - Filtering is non-destructive: clearing the filter restores the full
//!   storage, in its original order.

use tracing::debug;

use crate::entity::SelectableEntity;
use crate::position::Position;

/// An ordered, possibly sectioned collection of entities.
///
/// Supplied by the host application; the binding layer only consumes this
/// interface and never assumes a concrete representation.
pub trait Container {
    /// The entity type held by this container.
    type Item: SelectableEntity;

    /// Number of sections. Flat containers report a single section.
    fn sections(&self) -> usize;

    /// Number of visible rows in `section`. Out-of-range sections are 0.
    fn rows_in(&self, section: usize) -> usize;

    /// The entity at `position`, or `None` if the position is stale or out
    /// of range.
    fn get(&self, position: Position) -> Option<&Self::Item>;

    /// Title for a section header, if the container carries one.
    fn section_title(&self, _section: usize) -> Option<&str> {
        None
    }

    /// Total visible row count across all sections.
    fn len(&self) -> usize {
        (0..self.sections()).map(|s| self.rows_in(s)).sum()
    }

    /// Whether no rows are visible.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every visible row in section-major order.
    fn enumerate<F>(&self, mut visit: F)
    where
        F: FnMut(Position, &Self::Item),
    {
        for section in 0..self.sections() {
            for row in 0..self.rows_in(section) {
                let position = Position::new(section, row);
                if let Some(item) = self.get(position) {
                    visit(position, item);
                }
            }
        }
    }

    /// First position whose row satisfies `predicate`, in section-major
    /// order, or `None` if no visible row matches.
    fn search<F>(&self, mut predicate: F) -> Option<Position>
    where
        F: FnMut(Position, &Self::Item) -> bool,
    {
        for section in 0..self.sections() {
            for row in 0..self.rows_in(section) {
                let position = Position::new(section, row);
                if let Some(item) = self.get(position)
                    && predicate(position, item)
                {
                    return Some(position);
                }
            }
        }
        None
    }
}

/// A container whose visible subset can be narrowed by a text filter.
pub trait FilterableContainer: Container {
    /// Apply a filter. `None`, empty, and whitespace-only text all clear
    /// the filter. All previously resolved positions are invalidated.
    fn apply_filter(&mut self, text: Option<&str>);

    /// The currently applied filter text, if any.
    fn filter_text(&self) -> Option<&str>;
}

// ── VecContainer ────────────────────────────────────────────────────

/// Flat, single-section container over a `Vec`.
#[derive(Debug, Clone, Default)]
pub struct VecContainer<T> {
    items: Vec<T>,
}

impl<T: SelectableEntity> VecContainer<T> {
    /// Create a container over `items`, preserving their order.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Append an item. Invalidates outstanding positions.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// The backing items, in order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: SelectableEntity> Container for VecContainer<T> {
    type Item = T;

    fn sections(&self) -> usize {
        1
    }

    fn rows_in(&self, section: usize) -> usize {
        if section == 0 { self.items.len() } else { 0 }
    }

    fn get(&self, position: Position) -> Option<&T> {
        if position.section != 0 {
            return None;
        }
        self.items.get(position.row)
    }
}

// ── SectionedContainer ──────────────────────────────────────────────

/// One titled group of rows inside a [`SectionedContainer`].
#[derive(Debug, Clone)]
pub struct Section<T> {
    title: Option<String>,
    items: Vec<T>,
}

impl<T: SelectableEntity> Section<T> {
    /// A section with a header title.
    #[must_use]
    pub fn new(title: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            title: Some(title.into()),
            items,
        }
    }

    /// A section without a header.
    #[must_use]
    pub fn untitled(items: Vec<T>) -> Self {
        Self { title: None, items }
    }

    /// The section's rows, in order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

/// Multi-section container with optional per-section header titles.
#[derive(Debug, Clone, Default)]
pub struct SectionedContainer<T> {
    sections: Vec<Section<T>>,
}

impl<T: SelectableEntity> SectionedContainer<T> {
    /// Create a container from pre-built sections.
    #[must_use]
    pub fn new(sections: Vec<Section<T>>) -> Self {
        Self { sections }
    }

    /// Append a section. Invalidates outstanding positions.
    pub fn push_section(&mut self, section: Section<T>) {
        self.sections.push(section);
    }
}

impl<T: SelectableEntity> Container for SectionedContainer<T> {
    type Item = T;

    fn sections(&self) -> usize {
        self.sections.len()
    }

    fn rows_in(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.items.len())
    }

    fn get(&self, position: Position) -> Option<&T> {
        self.sections
            .get(position.section)
            .and_then(|s| s.items.get(position.row))
    }

    fn section_title(&self, section: usize) -> Option<&str> {
        self.sections.get(section).and_then(|s| s.title.as_deref())
    }
}

// ── FilterableVec ───────────────────────────────────────────────────

/// Flat container with a sticky backing store and a text-filtered view.
///
/// Filtering matches the filter text case-insensitively as a substring of
/// each entity's [`describe`](SelectableEntity::describe) output. The
/// backing store is never mutated by filter changes, so clearing the
/// filter restores the original rows in their original order.
#[derive(Debug, Clone, Default)]
pub struct FilterableVec<T> {
    storage: Vec<T>,
    visible: Vec<usize>,
    filter: Option<String>,
}

impl<T: SelectableEntity> FilterableVec<T> {
    /// Create an unfiltered container over `items`.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            storage: items,
            visible,
            filter: None,
        }
    }

    /// The full backing store, ignoring the current filter.
    #[must_use]
    pub fn storage(&self) -> &[T] {
        &self.storage
    }

    /// Append an item to the backing store and re-evaluate the filter.
    /// Invalidates outstanding positions.
    pub fn push(&mut self, item: T) {
        self.storage.push(item);
        self.rebuild_visible();
    }

    fn matches(item: &T, needle: &str) -> bool {
        item.describe().to_lowercase().contains(needle)
    }

    fn rebuild_visible(&mut self) {
        self.visible = match self.filter.as_deref() {
            Some(text) => {
                let needle = text.to_lowercase();
                self.storage
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| Self::matches(item, &needle))
                    .map(|(index, _)| index)
                    .collect()
            }
            None => (0..self.storage.len()).collect(),
        };
        debug!(
            "filter rebuilt: {} of {} rows visible",
            self.visible.len(),
            self.storage.len()
        );
    }
}

impl<T: SelectableEntity> Container for FilterableVec<T> {
    type Item = T;

    fn sections(&self) -> usize {
        1
    }

    fn rows_in(&self, section: usize) -> usize {
        if section == 0 { self.visible.len() } else { 0 }
    }

    fn get(&self, position: Position) -> Option<&T> {
        if position.section != 0 {
            return None;
        }
        self.visible
            .get(position.row)
            .and_then(|&index| self.storage.get(index))
    }
}

impl<T: SelectableEntity> FilterableContainer for FilterableVec<T> {
    fn apply_filter(&mut self, text: Option<&str>) {
        self.filter = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        self.rebuild_visible();
    }

    fn filter_text(&self) -> Option<&str> {
        self.filter.as_deref()
    }
}
