//! Data models for search requests, fetched pages, and price results.

use serde::{Deserialize, Serialize};

/// A single product offer extracted from a retailer's search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    /// Retailer id the offer came from
    pub website: String,
    /// Product name as shown on the listing
    pub product_name: String,
    /// Normalized price, always positive
    pub price: f64,
    /// Absolute product URL, or `#` when the listing had no link
    pub url: String,
}

impl PriceResult {
    /// Creates a new price result.
    pub fn new(
        website: impl Into<String>,
        product_name: impl Into<String>,
        price: f64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            website: website.into(),
            product_name: product_name.into(),
            price,
            url: url.into(),
        }
    }
}

/// A price search for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Country code, matched case-insensitively against the registry
    pub country: String,
    /// Free-text product query
    pub query: String,
}

impl SearchRequest {
    /// Creates a new search request.
    pub fn new(country: impl Into<String>, query: impl Into<String>) -> Self {
        Self { country: country.into(), query: query.into() }
    }

    /// Returns the country code normalized for registry lookups.
    pub fn country_code(&self) -> String {
        self.country.trim().to_lowercase()
    }

    /// Checks that both fields are present.
    pub fn validate(&self) -> Result<(), String> {
        if self.country.trim().is_empty() {
            return Err("country must not be empty".to_string());
        }
        if self.query.trim().is_empty() {
            return Err("query must not be empty".to_string());
        }
        Ok(())
    }
}

/// Result of fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Raw page markup (HTTP 200 body)
    Markup(String),
    /// Every attempt failed
    Unavailable,
}

impl FetchOutcome {
    /// Returns the markup, if the fetch succeeded.
    pub fn markup(&self) -> Option<&str> {
        match self {
            FetchOutcome::Markup(html) => Some(html.as_str()),
            FetchOutcome::Unavailable => None,
        }
    }

    /// Returns true if the page could not be fetched.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_result_serde_field_names() {
        let result = PriceResult::new("amazon", "Desk Lamp", 24.5, "https://www.amazon.com/dp/X");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["website"], "amazon");
        assert_eq!(json["product_name"], "Desk Lamp");
        assert_eq!(json["price"], 24.5);
        assert_eq!(json["url"], "https://www.amazon.com/dp/X");
    }

    #[test]
    fn test_search_request_country_code() {
        let request = SearchRequest::new("  US ", "lamp");
        assert_eq!(request.country_code(), "us");
    }

    #[test]
    fn test_search_request_validate() {
        assert!(SearchRequest::new("us", "lamp").validate().is_ok());

        let err = SearchRequest::new(" ", "lamp").validate().unwrap_err();
        assert!(err.contains("country"));

        let err = SearchRequest::new("us", "").validate().unwrap_err();
        assert!(err.contains("query"));
    }

    #[test]
    fn test_search_request_deserialize() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"country": "in", "query": "phone case"}"#).unwrap();
        assert_eq!(request.country, "in");
        assert_eq!(request.query, "phone case");
    }

    #[test]
    fn test_fetch_outcome() {
        let page = FetchOutcome::Markup("<html></html>".to_string());
        assert_eq!(page.markup(), Some("<html></html>"));
        assert!(!page.is_unavailable());

        assert_eq!(FetchOutcome::Unavailable.markup(), None);
        assert!(FetchOutcome::Unavailable.is_unavailable());
    }
}
