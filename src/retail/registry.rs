//! Retailer registry: per-country base URLs, search paths, and CSS selectors.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Placeholder replaced by the encoded query in a search path template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Static description of one retailer, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerConfig {
    /// Unique retailer id, reported as `website` in results
    pub id: String,
    /// Country code to base URL (e.g. `us` -> `https://www.amazon.com`)
    pub base_urls: BTreeMap<String, String>,
    /// Search path with exactly one `{query}` placeholder
    pub search_path: String,
    /// Selector for price elements
    pub price_selector: String,
    /// Selector for product name elements
    pub name_selector: String,
    /// Selector for product link elements
    pub url_selector: String,
}

impl RetailerConfig {
    fn new(
        id: &str,
        base_urls: &[(&str, &str)],
        search_path: &str,
        price_selector: &str,
        name_selector: &str,
        url_selector: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            base_urls: base_urls.iter().map(|(c, u)| (c.to_string(), u.to_string())).collect(),
            search_path: search_path.to_string(),
            price_selector: price_selector.to_string(),
            name_selector: name_selector.to_string(),
            url_selector: url_selector.to_string(),
        }
    }
}

/// Retailers shipped with the binary.
pub fn builtin_retailers() -> Vec<RetailerConfig> {
    vec![
        RetailerConfig::new(
            "amazon",
            &[("us", "https://www.amazon.com"), ("in", "https://www.amazon.in")],
            "/s?k={query}",
            ".a-price-whole",
            ".a-size-medium.a-text-normal",
            ".a-link-normal.s-no-outline",
        ),
        RetailerConfig::new(
            "walmart",
            &[("us", "https://www.walmart.com")],
            "/search?q={query}",
            "[data-automation-id='product-price']",
            "[data-automation-id='product-title']",
            "a[data-automation-id='product-title-link']",
        ),
        RetailerConfig::new(
            "flipkart",
            &[("in", "https://www.flipkart.com")],
            "/search?q={query}&sid=tyy%2C4io",
            ".Nx9bqj._4b5DiR",
            ".KzDlHZ",
            ".CGtC98",
        ),
    ]
}

/// Errors raised while building a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate retailer id '{0}'")]
    DuplicateRetailer(String),

    #[error("retailer '{retailer}' search path '{template}' must contain exactly one {{query}}")]
    InvalidTemplate { retailer: String, template: String },

    #[error("retailer '{retailer}' has no base URLs")]
    NoCountries(String),

    #[error("retailer '{retailer}' has invalid {field} selector '{selector}': {reason}")]
    InvalidSelector { retailer: String, field: &'static str, selector: String, reason: String },
}

/// Compiled selectors for one retailer.
#[derive(Debug, Clone)]
pub struct RetailerSelectors {
    pub price: Selector,
    pub name: Selector,
    pub url: Selector,
}

/// A validated retailer with compiled selectors.
#[derive(Debug, Clone)]
pub struct Retailer {
    config: RetailerConfig,
    selectors: RetailerSelectors,
}

impl Retailer {
    /// Validates a config and compiles its selectors.
    pub fn from_config(mut config: RetailerConfig) -> Result<Self, RegistryError> {
        if config.search_path.matches(QUERY_PLACEHOLDER).count() != 1 {
            return Err(RegistryError::InvalidTemplate {
                retailer: config.id.clone(),
                template: config.search_path.clone(),
            });
        }

        if config.base_urls.is_empty() {
            return Err(RegistryError::NoCountries(config.id.clone()));
        }

        config.base_urls = config
            .base_urls
            .into_iter()
            .map(|(country, url)| (country.trim().to_lowercase(), url))
            .collect();

        let selectors = RetailerSelectors {
            price: compile(&config.id, "price", &config.price_selector)?,
            name: compile(&config.id, "name", &config.name_selector)?,
            url: compile(&config.id, "url", &config.url_selector)?,
        };

        Ok(Self { config, selectors })
    }

    /// Returns the retailer id.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &RetailerConfig {
        &self.config
    }

    /// Returns the compiled selectors.
    pub fn selectors(&self) -> &RetailerSelectors {
        &self.selectors
    }

    /// Returns the base URL for a country, matched case-insensitively.
    pub fn base_url(&self, country: &str) -> Option<&str> {
        self.config.base_urls.get(&country.trim().to_lowercase()).map(String::as_str)
    }

    /// Returns the country codes this retailer serves.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.config.base_urls.keys().map(String::as_str)
    }

    /// Builds the search page URL for a country and query.
    pub fn search_url(&self, country: &str, query: &str) -> Option<String> {
        let base_url = self.base_url(country)?;
        let path = self.config.search_path.replace(QUERY_PLACEHOLDER, &encode_query(query));
        Some(format!("{}{}", base_url, path))
    }
}

fn compile(retailer: &str, field: &'static str, selector: &str) -> Result<Selector, RegistryError> {
    Selector::parse(selector).map_err(|e| RegistryError::InvalidSelector {
        retailer: retailer.to_string(),
        field,
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Encodes a query for a URL query string: spaces become `+`, other reserved
/// characters are percent-encoded.
pub fn encode_query(query: &str) -> String {
    urlencoding::encode(query).replace("%20", "+")
}

/// Ordered, immutable set of retailers.
#[derive(Debug, Clone)]
pub struct Registry {
    retailers: Vec<Retailer>,
}

impl Registry {
    /// Builds a registry, rejecting duplicate ids and invalid entries.
    pub fn new(configs: Vec<RetailerConfig>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut retailers = Vec::with_capacity(configs.len());

        for config in configs {
            if !seen.insert(config.id.clone()) {
                return Err(RegistryError::DuplicateRetailer(config.id));
            }
            retailers.push(Retailer::from_config(config)?);
        }

        Ok(Self { retailers })
    }

    /// Registry with the built-in retailers only.
    pub fn builtin() -> Self {
        Self::new(builtin_retailers()).expect("built-in retailer table is valid")
    }

    /// Registry with the built-in retailers followed by `extra`.
    pub fn with_extra(extra: Vec<RetailerConfig>) -> Result<Self, RegistryError> {
        let mut configs = builtin_retailers();
        configs.extend(extra);
        Self::new(configs)
    }

    /// Retailers with a base URL for `country`, in registry order.
    pub fn eligible<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a Retailer> + 'a {
        self.retailers.iter().filter(move |r| r.base_url(country).is_some())
    }

    /// Looks up a retailer by id.
    pub fn get(&self, id: &str) -> Option<&Retailer> {
        self.retailers.iter().find(|r| r.id() == id)
    }

    /// Returns all retailers in registry order.
    pub fn all(&self) -> &[Retailer] {
        &self.retailers
    }

    /// Returns every country served by at least one retailer, sorted.
    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> =
            self.retailers.iter().flat_map(|r| r.countries().map(String::from)).collect();
        countries.sort();
        countries.dedup();
        countries
    }

}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
