//! Application core.
//!
//! - Browser: command surface over catalog, view, favorites and progress

pub mod browser;

pub use browser::Browser;
