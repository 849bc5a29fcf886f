//! Extraction of price results from retailer search pages.
//!
//! Prices, names, and links are selected independently and paired by index:
//! the i-th price goes with the i-th name and the i-th link. Pages whose three
//! selections are not aligned will attach prices to the wrong products.

use crate::retail::models::PriceResult;
use crate::retail::price::normalize_price;
use crate::retail::registry::Retailer;
use scraper::{ElementRef, Html};
use tracing::{debug, trace, warn};

/// Default number of candidates taken from each page.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Name used when a listing has no name element.
pub const MISSING_NAME: &str = "N/A";

/// URL used when a listing's link element has no `href`.
pub const MISSING_URL: &str = "#";

/// Extractor for one retailer's search page in one country.
pub struct Extractor<'a> {
    retailer: &'a Retailer,
    base_url: &'a str,
    max_results: usize,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor; relative links are resolved against `base_url`.
    pub fn new(retailer: &'a Retailer, base_url: &'a str) -> Self {
        Self { retailer, base_url, max_results: DEFAULT_MAX_RESULTS }
    }

    /// Sets how many elements are taken from each selection.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Extracts results in page order. `None` markup yields no results.
    pub fn extract(&self, markup: Option<&str>) -> Vec<PriceResult> {
        let id = self.retailer.id();

        let Some(html) = markup else {
            warn!("{} - no page to extract from", id);
            return Vec::new();
        };

        let document = Html::parse_document(html);
        let selectors = self.retailer.selectors();

        let take = self.max_results;
        let prices: Vec<ElementRef> = document.select(&selectors.price).take(take).collect();
        let names: Vec<ElementRef> = document.select(&selectors.name).take(take).collect();
        let urls: Vec<ElementRef> = document.select(&selectors.url).take(take).collect();

        debug!(
            "{} - prices found: {}, names found: {}, urls found: {}",
            id,
            prices.len(),
            names.len(),
            urls.len()
        );

        let mut results = Vec::new();

        for ((price_el, name_el), url_el) in prices.into_iter().zip(names).zip(urls) {
            let price_text = element_text(price_el);

            let price = match normalize_price(&price_text) {
                Some(price) if price > 0.0 => price,
                _ => {
                    debug!("{} - invalid price for item: {:?}", id, price_text);
                    continue;
                }
            };

            let product_name = self.product_name(Some(name_el));
            let url = self.resolve_url(Some(url_el));

            trace!("{} - found: name={}, price={}, url={}", id, product_name, price, url);
            results.push(PriceResult::new(id, product_name, price, url));
        }

        results
    }

    fn product_name(&self, element: Option<ElementRef>) -> String {
        element.map(element_text).unwrap_or_else(|| MISSING_NAME.to_string())
    }

    fn resolve_url(&self, element: Option<ElementRef>) -> String {
        match element.and_then(|e| e.value().attr("href")) {
            None => MISSING_URL.to_string(),
            Some(href) if has_scheme(href) => href.to_string(),
            Some(href) => format!("{}{}", self.base_url, href),
        }
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Returns true if `href` starts with a URL scheme such as `https:`.
fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retail::registry::{Registry, RetailerConfig};

    fn make_retailer() -> Retailer {
        let config = RetailerConfig {
            id: "shop".to_string(),
            base_urls: [("us".to_string(), "https://shop.example".to_string())].into(),
            search_path: "/find?q={query}".to_string(),
            price_selector: ".price".to_string(),
            name_selector: ".name".to_string(),
            url_selector: "a.link".to_string(),
        };
        Retailer::from_config(config).unwrap()
    }

    fn make_listing_html(items: &[(&str, &str, Option<&str>)]) -> String {
        let mut html = String::from("<html><body>");
        for (name, price, href) in items {
            let link = match href {
                Some(href) => format!(r#"<a class="link" href="{}">view</a>"#, href),
                None => r#"<a class="link">view</a>"#.to_string(),
            };
            html.push_str(&format!(
                r#"<div class="card"><span class="name">{}</span><span class="price">{}</span>{}</div>"#,
                name, price, link
            ));
        }
        html.push_str("</body></html>");
        html
    }

    #[test]
    fn test_extract_basic() {
        let retailer = make_retailer();
        let html = make_listing_html(&[
            ("Desk Lamp", "$24.99", Some("/p/lamp")),
            ("Floor Lamp", "$59.00", Some("https://cdn.example/p/floor")),
        ]);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));

        assert_eq!(
            results,
            vec![
                PriceResult::new("shop", "Desk Lamp", 24.99, "https://shop.example/p/lamp"),
                PriceResult::new("shop", "Floor Lamp", 59.0, "https://cdn.example/p/floor"),
            ]
        );
    }

    #[test]
    fn test_extract_unavailable_markup() {
        let retailer = make_retailer();
        let results = Extractor::new(&retailer, "https://shop.example").extract(None);
        assert!(results.is_empty());
    }

    #[test]
    fn test_extract_empty_page() {
        let retailer = make_retailer();
        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(""));
        assert!(results.is_empty());
    }

    #[test]
    fn test_extract_skips_unparsable_price() {
        let retailer = make_retailer();
        let html = make_listing_html(&[
            ("Broken", "$,", Some("/p/broken")),
            ("Good", "12.50", Some("/p/good")),
        ]);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_name, "Good");
    }

    #[test]
    fn test_extract_skips_zero_price() {
        let retailer = make_retailer();
        let html = make_listing_html(&[("Free", "$0.00", Some("/p/free"))]);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));
        assert!(results.is_empty());
    }

    #[test]
    fn test_extract_skips_overflowing_price() {
        let retailer = make_retailer();
        let huge = "9".repeat(400);
        let html = make_listing_html(&[
            ("Glitched", huge.as_str(), Some("/p/glitch")),
            ("Real", "$19.99", Some("/p/real")),
        ]);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_name, "Real");
        assert!(results.iter().all(|r| r.price.is_finite()));
    }

    #[test]
    fn test_extract_missing_href_uses_placeholder() {
        let retailer = make_retailer();
        let html = make_listing_html(&[("No Link", "9.99", None)]);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "#");
        assert_eq!(results[0].price, 9.99);
    }

    #[test]
    fn test_extract_trims_name() {
        let retailer = make_retailer();
        let html = make_listing_html(&[("\n   Spaced Out  \n", "5", Some("/p/x"))]);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));
        assert_eq!(results[0].product_name, "Spaced Out");
    }

    #[test]
    fn test_extract_nested_price_text() {
        let retailer = make_retailer();
        let html = r#"
            <span class="name">Kettle</span>
            <span class="price"><sup>$</sup>1,299<sup>.99</sup></span>
            <a class="link" href="/p/kettle">view</a>
        "#;

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(html));
        assert_eq!(results[0].price, 1299.99);
    }

    #[test]
    fn test_extract_truncates_to_max_results() {
        let retailer = make_retailer();
        let items: Vec<(String, String)> =
            (1..=8).map(|i| (format!("Item {}", i), format!("{}.00", i))).collect();
        let refs: Vec<(&str, &str, Option<&str>)> =
            items.iter().map(|(n, p)| (n.as_str(), p.as_str(), Some("/p"))).collect();
        let html = make_listing_html(&refs);

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(&html));
        assert_eq!(results.len(), DEFAULT_MAX_RESULTS);

        let results = Extractor::new(&retailer, "https://shop.example")
            .with_max_results(2)
            .extract(Some(&html));
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].product_name, "Item 2");
    }

    #[test]
    fn test_extract_truncation_happens_before_price_filter() {
        let retailer = make_retailer();
        let html = make_listing_html(&[
            ("A", "n/a", Some("/a")),
            ("B", "n/a", Some("/b")),
            ("C", "3.00", Some("/c")),
        ]);

        let results = Extractor::new(&retailer, "https://shop.example")
            .with_max_results(2)
            .extract(Some(&html));
        assert!(results.is_empty());
    }

    #[test]
    fn test_extract_pairs_by_index_with_mismatched_counts() {
        let retailer = make_retailer();
        // Three prices, two names, one link: pairing stops at the shortest list
        let html = r#"
            <span class="price">10</span>
            <span class="price">20</span>
            <span class="price">30</span>
            <span class="name">First</span>
            <span class="name">Second</span>
            <a class="link" href="/only">view</a>
        "#;

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(html));
        assert_eq!(results, vec![PriceResult::new("shop", "First", 10.0, "https://shop.example/only")]);
    }

    #[test]
    fn test_extract_pairs_by_position_not_structure() {
        let retailer = make_retailer();
        // The first card lacks a price, so prices shift onto the wrong names
        let html = r#"
            <div><span class="name">No Price</span><a class="link" href="/a">a</a></div>
            <div><span class="name">Priced</span><span class="price">15</span><a class="link" href="/b">b</a></div>
        "#;

        let results = Extractor::new(&retailer, "https://shop.example").extract(Some(html));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_name, "No Price");
        assert_eq!(results[0].price, 15.0);
        assert_eq!(results[0].url, "https://shop.example/a");
    }

    #[test]
    fn test_resolve_url_variants() {
        let retailer = make_retailer();
        let extractor = Extractor::new(&retailer, "https://shop.example");

        let html = Html::parse_fragment(
            r#"<a id="abs" href="http://other.example/x"></a>
               <a id="rel" href="/dp/B001"></a>
               <a id="bare" href="item?id=1"></a>
               <a id="none"></a>"#,
        );
        let link = |id: &str| {
            let selector = scraper::Selector::parse(&format!("#{}", id)).unwrap();
            html.select(&selector).next()
        };

        assert_eq!(extractor.resolve_url(link("abs")), "http://other.example/x");
        assert_eq!(extractor.resolve_url(link("rel")), "https://shop.example/dp/B001");
        assert_eq!(extractor.resolve_url(link("bare")), "https://shop.exampleitem?id=1");
        assert_eq!(extractor.resolve_url(link("none")), "#");
        assert_eq!(extractor.resolve_url(None), "#");
    }

    #[test]
    fn test_product_name_missing() {
        let retailer = make_retailer();
        let extractor = Extractor::new(&retailer, "https://shop.example");
        assert_eq!(extractor.product_name(None), "N/A");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://example.com"));
        assert!(has_scheme("http://example.com"));
        assert!(has_scheme("git+ssh://host/repo"));
        assert!(!has_scheme("/dp/B001"));
        assert!(!has_scheme("dp/B001"));
        assert!(!has_scheme("#"));
        assert!(!has_scheme("/search?q=a:b"));
        assert!(!has_scheme("1abc:foo"));
        assert!(!has_scheme(""));
    }

    #[test]
    fn test_extract_with_builtin_amazon_selectors() {
        let registry = Registry::builtin();
        let amazon = registry.get("amazon").unwrap();
        let html = r#"
            <div data-component-type="s-search-result">
                <a class="a-link-normal s-no-outline" href="/dp/B0TEST0001">img</a>
                <span class="a-size-medium a-base a-text-normal">Mechanical Keyboard</span>
                <span class="a-price"><span class="a-price-whole">49.</span><span class="a-price-fraction">99</span></span>
            </div>
        "#;

        let results =
            Extractor::new(amazon, amazon.base_url("us").unwrap()).extract(Some(html));
        assert_eq!(
            results,
            vec![PriceResult::new(
                "amazon",
                "Mechanical Keyboard",
                49.0,
                "https://www.amazon.com/dp/B0TEST0001"
            )]
        );
    }
}
