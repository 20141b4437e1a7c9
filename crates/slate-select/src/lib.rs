#![forbid(unsafe_code)]

//! Selection and list binding on top of `slate-core` containers.
//!
//! The binding layer has three moving parts: [`ListDataSource`] translates a
//! container into row/section counts and configured cells, the
//! [`SelectablesList`] controller owns selection bookkeeping and keeps the
//! host widget's visual selection consistent with it, and the [`ListView`]
//! trait is the seam behind which the host widget lives.
//!
//! # Example
//!
//! ```
//! use slate_core::{FilterableVec, Position};
//! use slate_select::{ListView, SelectablesList};
//!
//! #[derive(Default)]
//! struct NullView;
//!
//! impl ListView for NullView {
//!     fn select_row(&mut self, _: Position) {}
//!     fn deselect_row(&mut self, _: Position) {}
//!     fn selected_rows(&self) -> Vec<Position> {
//!         Vec::new()
//!     }
//!     fn reload(&mut self) {}
//! }
//!
//! let names = FilterableVec::new(vec!["Ada".to_string(), "Grace".to_string()]);
//! let mut list = SelectablesList::new(Some(names), NullView);
//!
//! list.select(&"Ada".to_string(), Position::new(0, 0));
//! assert!(list.is_selected(&"Ada".to_string()));
//!
//! // Filtering hides "Ada" but the selection is sticky.
//! list.search_text_changed(Some("gr"));
//! assert!(list.is_selected(&"Ada".to_string()));
//! ```

pub mod cell;
pub mod data_source;
pub mod persist;
pub mod selection;

pub use cell::{CellPool, ConfigurableCell, ReusableCell, TextCell};
pub use data_source::{DEFAULT_HEADER_HEIGHT, ListDataSource};
pub use persist::{Persistable, SelectionState, StateEnvelope, StateKey, StateStore};
pub use selection::{SearchInputEvent, SelectablesDelegate, SelectablesList};

use slate_core::Position;

/// Host list-widget seam.
///
/// The controller drives the widget exclusively through this trait:
/// programmatic select/deselect at a position, a query of the currently
/// selected positions, and a full reload. Implementations mirror whatever
/// the host toolkit's list widget exposes.
///
/// A reload is expected to drop the widget's visual selection (native list
/// widgets do); the controller re-applies it afterwards from its own
/// bookkeeping.
pub trait ListView {
    /// Mark the row at `position` selected. Visual only; the widget must
    /// not report this back as a selection event.
    fn select_row(&mut self, position: Position);

    /// Mark the row at `position` deselected. Visual only.
    fn deselect_row(&mut self, position: Position);

    /// Every position currently rendered as selected.
    fn selected_rows(&self) -> Vec<Position>;

    /// Rebuild all rows from the data source. Invalidates positions and
    /// clears visual selection.
    fn reload(&mut self);

    /// Allow or disallow simultaneous multi-row selection in the widget.
    ///
    /// The controller always enables this, regardless of its own selection
    /// mode; see [`SelectablesList::did_load`].
    fn set_multiselect(&mut self, _enabled: bool) {}
}
