//! Retailer search pipeline: registry, fetching, extraction, and aggregation.

pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod price;
pub mod registry;

pub use extractor::Extractor;
pub use fetcher::{HttpFetcher, PageFetch, RetryPolicy};
pub use models::{FetchOutcome, PriceResult, SearchRequest};
pub use orchestrator::{PriceSearch, SearchError};
pub use price::normalize_price;
pub use registry::{Registry, RegistryError, Retailer, RetailerConfig};
