#![forbid(unsafe_code)]

//! Container-to-list binding: counts, headers, and cell configuration.

use slate_core::{Container, FilterableContainer, Position};
use tracing::debug;

use crate::cell::{CellPool, ConfigurableCell, ReusableCell, TextCell};

/// Header height in display units when a header identifier is set.
pub const DEFAULT_HEADER_HEIGHT: f32 = 66.0;

/// Binds a [`Container`] to a rendered list: row/section counts, header
/// metadata, positional entity lookup, and cell configuration.
///
/// The container is replaceable at runtime; swapping it invalidates all
/// outstanding positions, and the owner is expected to reload the widget.
#[derive(Debug)]
pub struct ListDataSource<C> {
    container: Option<C>,
    cell_identifier: String,
    header_identifier: Option<String>,
    header_height: f32,
}

impl<C: Container> ListDataSource<C> {
    /// A data source over `container`, using the [`TextCell`] reuse
    /// identifier until another one is configured.
    #[must_use]
    pub fn new(container: Option<C>) -> Self {
        Self {
            container,
            cell_identifier: TextCell::reuse_identifier().to_string(),
            header_identifier: None,
            header_height: DEFAULT_HEADER_HEIGHT,
        }
    }

    /// Use `identifier` when registering and dequeuing cells.
    #[must_use]
    pub fn with_cell_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.cell_identifier = identifier.into();
        self
    }

    /// Render section headers under `identifier` at the default height.
    #[must_use]
    pub fn with_header_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.header_identifier = Some(identifier.into());
        self
    }

    /// Override the header height used when a header identifier is set.
    #[must_use]
    pub fn with_header_height(mut self, height: f32) -> Self {
        self.header_height = height;
        self
    }

    /// The bound container, if any.
    #[must_use]
    pub fn container(&self) -> Option<&C> {
        self.container.as_ref()
    }

    /// Mutable access to the bound container.
    pub fn container_mut(&mut self) -> Option<&mut C> {
        self.container.as_mut()
    }

    /// Replace the bound container. The owner must reload the widget and
    /// re-apply selection afterwards.
    pub fn set_container(&mut self, container: Option<C>) {
        debug!(
            "container replaced ({} rows)",
            container.as_ref().map_or(0, Container::len)
        );
        self.container = container;
    }

    /// Number of sections, 0 without a container.
    #[must_use]
    pub fn sections(&self) -> usize {
        self.container.as_ref().map_or(0, Container::sections)
    }

    /// Number of rows in `section`, 0 without a container.
    #[must_use]
    pub fn rows_in(&self, section: usize) -> usize {
        self.container.as_ref().map_or(0, |c| c.rows_in(section))
    }

    /// The entity at `position`, or `None` for stale/out-of-range
    /// positions or a missing container.
    #[must_use]
    pub fn entity_at(&self, position: Position) -> Option<&C::Item> {
        self.container.as_ref().and_then(|c| c.get(position))
    }

    /// The cell reuse identifier.
    #[must_use]
    pub fn cell_identifier(&self) -> &str {
        &self.cell_identifier
    }

    /// The header reuse identifier, if headers are rendered.
    #[must_use]
    pub fn header_identifier(&self) -> Option<&str> {
        self.header_identifier.as_deref()
    }

    /// Header height for `section`: 0 unless a header identifier is set.
    #[must_use]
    pub fn header_height(&self, _section: usize) -> f32 {
        if self.header_identifier.is_some() {
            self.header_height
        } else {
            0.0
        }
    }

    /// Title of `section`, if the container carries one.
    #[must_use]
    pub fn section_title(&self, section: usize) -> Option<&str> {
        self.container.as_ref().and_then(|c| c.section_title(section))
    }

    /// Resolve the entity at `position`, dequeue a cell from `pool`, and
    /// configure it. `None` if the position does not resolve.
    pub fn render_cell<K>(&self, pool: &mut CellPool<K>, position: Position) -> Option<K>
    where
        K: ConfigurableCell<C::Item>,
    {
        let entity = self.entity_at(position)?;
        let mut cell = pool.dequeue();
        cell.configure(entity);
        Some(cell)
    }
}

impl<C: FilterableContainer> ListDataSource<C> {
    /// Apply a filter to the bound container. All outstanding positions
    /// are invalid afterwards; the owner reloads and re-applies selection.
    pub fn apply_filter(&mut self, text: Option<&str>) {
        if let Some(container) = self.container.as_mut() {
            container.apply_filter(text);
        }
    }

    /// The currently applied filter text.
    #[must_use]
    pub fn filter_text(&self) -> Option<&str> {
        self.container.as_ref().and_then(FilterableContainer::filter_text)
    }
}
