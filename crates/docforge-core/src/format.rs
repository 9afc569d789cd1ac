//! # Formatting Utilities
//!
//! Locale-aware currency/date display formatting and HTML escaping.
//!
//! This is the ONLY place monetary values are rounded. The calculation
//! engine accumulates unrounded `f64`s; half-up rounding to 2 decimals
//! happens here, at the point of display.

use chrono::NaiveDate;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Escapes a value for safe insertion into HTML text content.
///
/// Applied to EVERY substituted value, including internally computed totals:
/// the substitution step stays injection-safe regardless of upstream input.
///
/// ## Example
/// ```rust
/// use docforge_core::format::escape_html;
///
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("<script>"), "&lt;script&gt;");
/// ```
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// Rounding
// =============================================================================

/// Rounds to 2 decimal places, half up.
///
/// `f64::round` rounds half away from zero; display values here are always
/// non-negative, so that is half-up.
#[inline]
pub fn round_half_up_2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Currency
// =============================================================================

/// Display symbol for common ISO 4217 codes; falls back to "CODE " prefix.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" | "MXN" | "CAD" | "AUD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "BRL" => "R$",
        "INR" => "₹",
        other => other,
    }
}

/// Formats a monetary amount: symbol, thousands grouping, 2 decimals, half-up.
///
/// ## Example
/// ```rust
/// use docforge_core::format::format_money;
///
/// assert_eq!(format_money(1234.5, "USD"), "$1,234.50");
/// assert_eq!(format_money(0.0, "EUR"), "€0.00");
/// assert_eq!(format_money(999999.995, "GBP"), "£1,000,000.00");
/// ```
pub fn format_money(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
    let total_cents = (amount * 100.0).round() as i64;
    let major = total_cents / 100;
    let minor = total_cents % 100;

    let symbol = currency_symbol(currency);
    let grouped = group_thousands(major);

    if symbol == currency {
        // Unknown code: "XYZ 1,234.50"
        format!("{symbol} {grouped}.{minor:02}")
    } else {
        format!("{symbol}{grouped}.{minor:02}")
    }
}

/// Inserts comma thousands separators into a non-negative integer.
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;

    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Dates, Quantities, Percentages
// =============================================================================

/// Formats a date for display ("24 Aug 2026").
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Formats an optional date; absent dates render blank.
pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// Formats a quantity for the item table.
pub fn format_quantity(quantity: u32) -> String {
    quantity.to_string()
}

/// Formats a percent rate for tax-breakdown labels ("16%", "8.25%").
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    if (value.fract()).abs() < f64::EPSILON {
        format!("{}%", value as i64)
    } else {
        format!("{value}%")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_full_set() {
        assert_eq!(
            escape_html(r#"&<>"'/"#),
            "&amp;&lt;&gt;&quot;&#x27;&#x2F;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up_2(0.825), 0.83);
        assert_eq!(round_half_up_2(0.824), 0.82);
        assert_eq!(round_half_up_2(f64::NAN), 0.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0, "USD"), "$0.00");
        assert_eq!(format_money(10.99, "USD"), "$10.99");
        assert_eq!(format_money(1234.5, "EUR"), "€1,234.50");
        assert_eq!(format_money(1000000.0, "USD"), "$1,000,000.00");
        // Unknown currencies keep their code.
        assert_eq!(format_money(5.0, "XYZ"), "XYZ 5.00");
        // Display is the rounding point: half-up at 2 decimals.
        assert_eq!(format_money(0.825, "USD"), "$0.83");
        // Bad numeric input never crashes.
        assert_eq!(format_money(f64::NAN, "USD"), "$0.00");
        assert_eq!(format_money(-10.0, "USD"), "$0.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(format_date(d), "24 Aug 2026");
        assert_eq!(format_opt_date(None), "");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(16.0), "16%");
        assert_eq!(format_percent(8.25), "8.25%");
    }
}
