//! price-compare - Concurrent multi-retailer product price comparison.
//!
//! Fetches search pages from several retailers at once, extracts
//! name/price/link triples with per-retailer CSS selectors, and merges the
//! offers into one list sorted by price.

pub mod commands;
pub mod config;
pub mod format;
pub mod retail;
pub mod server;

pub use config::Config;
pub use retail::{PriceResult, PriceSearch, Registry, SearchError, SearchRequest};
