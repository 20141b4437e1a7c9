#![forbid(unsafe_code)]

//! Cell contract and reuse pool.
//!
//! A cell moves through a two-state machine: **empty → configured → empty**.
//! [`ConfigurableCell::configure`] overwrites any prior content, and
//! [`ReusableCell::prepare_for_reuse`] returns a recycled cell to the empty
//! state before it is handed out again. There is no separate "clear" state:
//! reconfiguration and reuse are the only transitions.

use slate_core::SelectableEntity;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Cells kept idle per pool before recycled instances are dropped.
const DEFAULT_POOL_CAPACITY: usize = 32;

/// A rendering unit that can be pooled and recycled.
pub trait ReusableCell: Default {
    /// Identifier under which instances of this cell type are registered
    /// with the host widget and pooled for reuse.
    fn reuse_identifier() -> &'static str;

    /// Reset to the empty state before the next [`configure`] call.
    ///
    /// Display configuration (sizing, styling) survives reuse; only
    /// per-entity content is cleared.
    ///
    /// [`configure`]: ConfigurableCell::configure
    fn prepare_for_reuse(&mut self);
}

/// A cell that renders one entity's description.
pub trait ConfigurableCell<T>: ReusableCell {
    /// Display `entity`. Overwrites any previously configured content.
    fn configure(&mut self, entity: &T);

    /// Hook for custom selection rendering. Cells that draw their own
    /// selection marker override this; the default ignores it.
    fn set_selected(&mut self, _selected: bool) {}
}

// ── TextCell ────────────────────────────────────────────────────────

/// Reference cell: a single line of text holding the entity description.
///
/// When a maximum width is set, the description is truncated to whole
/// grapheme clusters that fit within that many display columns.
#[derive(Debug, Clone, Default)]
pub struct TextCell {
    text: Option<String>,
    selected: bool,
    max_width: Option<usize>,
}

impl TextCell {
    /// An empty cell with no width limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the rendered description to `columns` display columns.
    #[must_use]
    pub fn with_max_width(mut self, columns: usize) -> Self {
        self.max_width = Some(columns);
        self
    }

    /// The configured description, or `None` while empty.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the cell currently displays an entity.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.text.is_some()
    }

    /// Whether the cell renders itself selected (custom selection mode).
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The line as the host should draw it: a selection marker prefix when
    /// the cell renders its own selection, then the description.
    #[must_use]
    pub fn display_line(&self) -> String {
        match (&self.text, self.selected) {
            (Some(text), true) => format!("● {text}"),
            (Some(text), false) => text.clone(),
            (None, _) => String::new(),
        }
    }

    fn truncate_to_width(text: &str, max: usize) -> String {
        let mut width = 0;
        let mut out = String::new();
        for grapheme in text.graphemes(true) {
            let w = UnicodeWidthStr::width(grapheme);
            if w == 0 {
                continue;
            }
            if width + w > max {
                break;
            }
            out.push_str(grapheme);
            width += w;
        }
        out
    }
}

impl ReusableCell for TextCell {
    fn reuse_identifier() -> &'static str {
        "slate.text"
    }

    fn prepare_for_reuse(&mut self) {
        self.text = None;
        self.selected = false;
    }
}

impl<T: SelectableEntity> ConfigurableCell<T> for TextCell {
    fn configure(&mut self, entity: &T) {
        let description = entity.describe();
        self.text = Some(match self.max_width {
            Some(max) => Self::truncate_to_width(&description, max),
            None => description.into_owned(),
        });
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

// ── CellPool ────────────────────────────────────────────────────────

/// Bounded free-list of recycled cells.
///
/// [`dequeue`](Self::dequeue) hands out a recycled instance when one is
/// idle, otherwise a fresh `Default` one. [`recycle`](Self::recycle)
/// prepares a cell for reuse and keeps it, up to the pool's capacity.
#[derive(Debug)]
pub struct CellPool<C> {
    free: Vec<C>,
    capacity: usize,
}

impl<C: ReusableCell> CellPool<C> {
    /// A pool with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// A pool keeping at most `capacity` idle cells.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::new(),
            capacity,
        }
    }

    /// A recycled cell if one is idle, otherwise a fresh one. Either way
    /// the returned cell is in the empty state.
    pub fn dequeue(&mut self) -> C {
        match self.free.pop() {
            Some(cell) => cell,
            None => {
                trace!("cell pool empty, allocating {}", C::reuse_identifier());
                C::default()
            }
        }
    }

    /// Return a cell to the pool. Cells beyond capacity are dropped.
    pub fn recycle(&mut self, mut cell: C) {
        if self.free.len() < self.capacity {
            cell.prepare_for_reuse();
            self.free.push(cell);
        }
    }

    /// Number of idle cells currently held.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

impl<C: ReusableCell> Default for CellPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Person;

    // ── TextCell state machine ──────────────────────────────────────

    #[test]
    fn fresh_cell_is_empty() {
        let cell = TextCell::new();
        assert!(!cell.is_configured());
        assert_eq!(cell.text(), None);
        assert_eq!(cell.display_line(), "");
    }

    #[test]
    fn configure_stores_description() {
        let mut cell = TextCell::new();
        cell.configure(&Person::new(1, "Ada"));
        assert!(cell.is_configured());
        assert_eq!(cell.text(), Some("Ada"));
    }

    #[test]
    fn reconfigure_overwrites() {
        let mut cell = TextCell::new();
        cell.configure(&Person::new(1, "Ada"));
        cell.configure(&Person::new(2, "Grace"));
        assert_eq!(cell.text(), Some("Grace"));
    }

    #[test]
    fn prepare_for_reuse_returns_to_empty() {
        let mut cell = TextCell::new().with_max_width(10);
        cell.configure(&Person::new(1, "Ada"));
        ConfigurableCell::<Person>::set_selected(&mut cell, true);

        cell.prepare_for_reuse();
        assert!(!cell.is_configured());
        assert!(!cell.is_selected());
        // Display configuration survives reuse.
        cell.configure(&Person::new(2, "A very long display name"));
        assert_eq!(cell.text(), Some("A very lon"));
    }

    // ── Truncation ──────────────────────────────────────────────────

    #[test]
    fn truncates_to_display_columns() {
        let mut cell = TextCell::new().with_max_width(4);
        cell.configure(&Person::new(1, "abcdef"));
        assert_eq!(cell.text(), Some("abcd"));
    }

    #[test]
    fn truncation_respects_wide_graphemes() {
        // Each CJK glyph is two columns; only two fit in five.
        let mut cell = TextCell::new().with_max_width(5);
        cell.configure(&Person::new(1, "日本語"));
        assert_eq!(cell.text(), Some("日本"));
    }

    #[test]
    fn no_limit_keeps_full_text() {
        let mut cell = TextCell::new();
        cell.configure(&Person::new(1, "日本語テキスト"));
        assert_eq!(cell.text(), Some("日本語テキスト"));
    }

    // ── Selection marker ────────────────────────────────────────────

    #[test]
    fn display_line_marks_selection() {
        let mut cell = TextCell::new();
        cell.configure(&Person::new(1, "Ada"));
        assert_eq!(cell.display_line(), "Ada");

        ConfigurableCell::<Person>::set_selected(&mut cell, true);
        assert_eq!(cell.display_line(), "● Ada");
    }

    // ── CellPool ────────────────────────────────────────────────────

    #[test]
    fn dequeue_from_empty_pool_allocates() {
        let mut pool: CellPool<TextCell> = CellPool::new();
        let cell = pool.dequeue();
        assert!(!cell.is_configured());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn recycled_cell_is_reused_empty() {
        let mut pool: CellPool<TextCell> = CellPool::new();
        let mut cell = pool.dequeue();
        cell.configure(&Person::new(1, "Ada"));
        pool.recycle(cell);
        assert_eq!(pool.idle(), 1);

        let cell = pool.dequeue();
        assert!(!cell.is_configured());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn pool_capacity_is_bounded() {
        let mut pool: CellPool<TextCell> = CellPool::with_capacity(2);
        for _ in 0..5 {
            pool.recycle(TextCell::new());
        }
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn reuse_identifier_is_stable() {
        assert_eq!(TextCell::reuse_identifier(), "slate.text");
    }
}
