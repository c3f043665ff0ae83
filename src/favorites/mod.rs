//! Favorite episodes.
//!
//! Favorites are grouped by show. Every mutation is written through to
//! storage under the `favorites` key before the call returns.

pub mod ledger;

pub use ledger::{FavoriteEntry, FavoriteGroups, FavoritesLedger, SortScope};
