//! Search command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::retail::{PriceSearch, SearchError, SearchRequest};
use anyhow::Result;
use tracing::info;

/// Executes a price search from the command line.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let search = PriceSearch::from_config(&self.config)?;
        self.execute_with(&search, query).await
    }

    /// Executes the search with a provided pipeline (for testing).
    pub async fn execute_with(&self, search: &PriceSearch, query: &str) -> Result<String> {
        let request = SearchRequest::new(self.config.country.clone(), query);
        request.validate().map_err(SearchError::InvalidRequest)?;

        info!("Searching for: {} ({})", query, request.country_code());

        let results = search.search(&request).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_results(&results))
    }
}
