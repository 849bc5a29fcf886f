//! Concurrent fan-out of one fetch+extract pipeline per eligible retailer.

use crate::config::Config;
use crate::retail::extractor::{Extractor, DEFAULT_MAX_RESULTS};
use crate::retail::fetcher::{HttpFetcher, PageFetch};
use crate::retail::models::{PriceResult, SearchRequest};
use crate::retail::registry::Registry;
use anyhow::Context;
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

/// Errors surfaced to callers of [`PriceSearch::search`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// No retailer has a base URL for the requested country.
    #[error("No retailers available for the specified country: {0}")]
    NoRetailersForCountry(String),

    /// The request is missing a field.
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),
}

/// Runs a search across every retailer serving the requested country.
pub struct PriceSearch {
    fetcher: Arc<dyn PageFetch>,
    registry: Arc<Registry>,
    max_results: usize,
}

impl PriceSearch {
    /// Creates a search over `registry` using a shared fetcher.
    pub fn new(fetcher: Arc<dyn PageFetch>, registry: Arc<Registry>) -> Self {
        Self { fetcher, registry, max_results: DEFAULT_MAX_RESULTS }
    }

    /// Creates a search with an HTTP fetcher and the configured retailers.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let registry = Registry::with_extra(config.retailers.clone())
            .context("Invalid retailer configuration")?;
        let fetcher = HttpFetcher::new(config).context("Failed to create HTTP client")?;

        Ok(Self::new(Arc::new(fetcher), Arc::new(registry)).with_max_results(config.max_results))
    }

    /// Sets the per-retailer result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Searches all eligible retailers and returns results sorted by price.
    ///
    /// Waits for every retailer. A retailer whose page cannot be fetched, or
    /// whose pipeline panics, contributes no results; only a country with no
    /// retailers at all is an error.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<PriceResult>, SearchError> {
        let country = request.country_code();

        let jobs: Vec<_> = self
            .registry
            .eligible(&country)
            .filter_map(|retailer| {
                let base_url = retailer.base_url(&country)?.to_string();
                let url = retailer.search_url(&country, &request.query)?;
                Some((retailer.clone(), base_url, url))
            })
            .collect();

        if jobs.is_empty() {
            warn!("No retailers configured for country '{}'", request.country);
            return Err(SearchError::NoRetailersForCountry(request.country.clone()));
        }

        info!("Searching {} retailers in '{}' for: {}", jobs.len(), country, request.query);

        let (ids, handles): (Vec<String>, Vec<_>) = jobs
            .into_iter()
            .map(|(retailer, base_url, url)| {
                let id = retailer.id().to_string();
                let fetcher = Arc::clone(&self.fetcher);
                let max_results = self.max_results;
                let span = info_span!("retailer", id = %id, url = %url);

                let task = async move {
                    let outcome = fetcher.fetch(&url).await;
                    Extractor::new(&retailer, &base_url)
                        .with_max_results(max_results)
                        .extract(outcome.markup())
                };

                (id, tokio::spawn(task.instrument(span)))
            })
            .unzip();

        let mut results = Vec::new();

        for (id, joined) in ids.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(items) => {
                    debug!("{} returned {} results", id, items.len());
                    results.extend(items);
                }
                Err(e) => {
                    warn!("{} - pipeline failed: {}", id, e);
                }
            }
        }

        sort_by_price(&mut results);

        info!("Found {} results for: {}", results.len(), request.query);
        Ok(results)
    }
}

/// Sorts ascending by price; equal prices keep their relative order.
pub fn sort_by_price(results: &mut [PriceResult]) {
    results.sort_by(|a, b| a.price.total_cmp(&b.price));
}
