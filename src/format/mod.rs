//! Output formatting for price results (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::retail::PriceResult;

/// Formats price results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a list of results, already sorted by the caller.
    pub fn format_results(&self, results: &[PriceResult]) -> String {
        if results.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No results found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_results(results),
            OutputFormat::Table => self.table_results(results),
            OutputFormat::Markdown => self.markdown_results(results),
            OutputFormat::Csv => self.csv_results(results),
        }
    }

    // JSON formatting

    fn json_results(&self, results: &[PriceResult]) -> String {
        serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_results(&self, results: &[PriceResult]) -> String {
        let website_width = 10;
        let price_width = 12;
        let name_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<website_width$}  {:<price_width$}  {:<name_width$}  {}",
            "Website", "Price", "Product", "URL"
        ));
        lines.push(format!(
            "{:-<website_width$}  {:-<price_width$}  {:-<name_width$}  {:-<3}",
            "", "", "", ""
        ));

        for result in results {
            lines.push(format!(
                "{:<website_width$}  {:>price_width$.2}  {:<name_width$}  {}",
                result.website,
                result.price,
                truncate(&result.product_name, name_width),
                result.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} results", results.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_results(&self, results: &[PriceResult]) -> String {
        let mut lines = Vec::new();

        lines.push("| Website | Price | Product |".to_string());
        lines.push("|---------|-------|---------|".to_string());

        for result in results {
            let name = truncate(&result.product_name, 40).replace('|', "\\|");
            let product = if result.url == "#" {
                name
            } else {
                format!("[{}]({})", name, result.url)
            };

            lines.push(format!("| {} | {:.2} | {} |", result.website, result.price, product));
        }

        lines.push(String::new());
        lines.push(format!("*{} results found*", results.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "website,product_name,price,url".to_string()
    }

    fn csv_results(&self, results: &[PriceResult]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for result in results {
            lines.push(format!(
                "{},{},{},{}",
                Self::csv_escape(&result.website),
                Self::csv_escape(&result.product_name),
                result.price,
                Self::csv_escape(&result.url)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens `s` to at most `max` characters, ending in `...` when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
