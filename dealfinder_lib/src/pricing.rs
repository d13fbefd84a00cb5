//! Price-string normalization for German-locale listing prices.
//!
//! Listing prices arrive as display text such as `"1.234,56 €"`,
//! `"50 € VB"` or `"Zu verschenken"`. [`normalize_price`] turns them into a
//! number or `None`; [`format_price`] renders a number back in the same
//! convention.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::NOT_AVAILABLE;

/// Case-insensitive marker for free items.
pub const GIVEAWAY_MARKER: &str = "zu verschenken";

/// Currency symbols, the "Verhandlungsbasis" (negotiable) marker and all
/// whitespace, including non-breaking spaces.
static PRICE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"€|\beuro?\b|\bvb\b|\s").expect("static price noise pattern"));

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("static decimal pattern"));

/// Parse a locale-formatted price into euros.
///
/// Returns `None` if:
/// - the text is empty or whitespace
/// - it contains the giveaway marker
/// - anything other than digits and one decimal separator remains after
///   stripping currency, the negotiable marker, thousands separators and
///   whitespace
///
/// Never panics; malformed input fails closed.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let lower = raw.to_lowercase();
    if lower.trim().is_empty() || lower.contains(GIVEAWAY_MARKER) {
        return None;
    }

    let stripped = PRICE_NOISE.replace_all(&lower, "");
    let cleaned = stripped.replace('.', "").replace(',', ".");
    if !PLAIN_DECIMAL.is_match(&cleaned) {
        return None;
    }
    cleaned.parse().ok()
}

/// Render euros the way listings show them: `.` thousands separator, `,`
/// decimal separator, cents only when non-zero, trailing ` €`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let frac = cents % 100;
    let sign = if value < 0.0 && cents != 0 { "-" } else { "" };
    if frac == 0 {
        format!("{}{} €", sign, whole)
    } else {
        format!("{}{},{:02} €", sign, whole, frac)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
