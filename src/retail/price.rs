//! Price string normalization.
//!
//! Only ASCII digits and `.` survive cleaning. There is no currency or locale
//! handling, so grouped formats such as `1.234,56` or `1,234.56.00` either
//! misparse or are rejected.

/// Parses a raw price string into a number.
///
/// Returns `None` when nothing numeric is left after cleaning, when the
/// cleaned text is not a valid float (e.g. more than one `.`), or when the
/// digits overflow to infinity.
pub fn normalize_price(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }

    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}
