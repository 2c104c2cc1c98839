// Utility functions

/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a value as `1,234,567.89` after rounding to two decimals.
pub fn format_currency(value: f64) -> String {
    let rounded = round2(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Like [`format_currency`], with `N/A` for missing values.
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_else(|| "N/A".to_string())
}

/// Plain two-decimal rendering for machine-readable output; empty when missing.
pub fn format_plain(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", round2(v))).unwrap_or_default()
}

/// Converts a string to kebab-case.
pub fn to_kebab_case(text: &str) -> String {
    text.trim().to_lowercase().replace([' ', '_'], "-")
}
