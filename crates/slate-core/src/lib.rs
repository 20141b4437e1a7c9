#![forbid(unsafe_code)]

//! Data model for the slate list-binding toolkit.
//!
//! Three pieces: the [`SelectableEntity`] capability every listed item must
//! satisfy, [`Position`] addressing into sectioned collections, and the
//! [`Container`] family of traits and implementations that the binding layer
//! in `slate-select` consumes.
//!
//! # Example
//!
//! ```
//! use slate_core::{Container, FilterableContainer, FilterableVec};
//!
//! let mut fruits = FilterableVec::new(vec![
//!     "apple".to_string(),
//!     "banana".to_string(),
//!     "apricot".to_string(),
//! ]);
//! assert_eq!(fruits.len(), 3);
//!
//! fruits.apply_filter(Some("ap"));
//! assert_eq!(fruits.len(), 2);
//!
//! fruits.apply_filter(None);
//! assert_eq!(fruits.len(), 3);
//! ```

pub mod container;
pub mod entity;
pub mod position;

pub use container::{Container, FilterableContainer, FilterableVec, Section, SectionedContainer, VecContainer};
pub use entity::SelectableEntity;
pub use position::Position;
