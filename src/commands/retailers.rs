//! Lists configured retailers and the countries they serve.

use crate::retail::Registry;

/// Renders the registry as a table.
pub fn list_retailers(registry: &Registry) -> String {
    let mut lines = Vec::new();

    lines.push("Configured retailers:\n".to_string());
    lines.push(format!("{:<12} {:<8} {:<28} {}", "Retailer", "Country", "Base URL", "Search path"));
    lines.push(format!("{:-<12} {:-<8} {:-<28} {:-<20}", "", "", "", ""));

    for retailer in registry.all() {
        for country in retailer.countries() {
            lines.push(format!(
                "{:<12} {:<8} {:<28} {}",
                retailer.id(),
                country,
                retailer.base_url(country).unwrap_or_default(),
                retailer.config().search_path
            ));
        }
    }

    lines.join("\n")
}
