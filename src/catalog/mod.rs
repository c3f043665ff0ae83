//! Remote catalog access and caching.
//!
//! - `source`: the `CatalogSource` trait every fetcher implements
//! - `http`: reqwest client for the podcast API
//! - `wire`: API payload shapes and normalization into domain types
//! - `store`: the `CatalogStore` cache with loading/error status

pub mod http;
pub mod source;
pub mod store;
pub mod wire;

pub use http::{HttpCatalogSource, DEFAULT_BASE_URL, DEFAULT_EPISODE_LIST_FILE};
pub use source::{CatalogSource, FetchError};
pub use store::{Catalog, CatalogStatus, CatalogStore, StalePolicy};
pub use wire::parse_timestamp;
