//! Derived, filtered and sorted views of the catalog.
//!
//! Everything here is pure: the same snapshot and view state always yield
//! the same list, so it is safe to recompute on every input change.

pub mod projector;

pub use projector::{compare_titles, list_genres, project, sort_stable};
