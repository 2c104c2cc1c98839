use crate::model::CellValue;

const CURRENCY_SYMBOLS: [char; 3] = ['€', '$', '£'];

/// Parses a price cell. Numbers pass through; text may carry a leading
/// currency symbol and thousands separators (`"€250,000"` -> `250000.0`).
/// Empty or unparseable cells yield `None`.
pub fn parse_price(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(text) => parse_price_text(text),
    }
}

pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches(&CURRENCY_SYMBOLS[..])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integral cell such as a year or quarter (`2020`, `"2020"`, `2020.0`).
pub fn parse_integer(cell: &CellValue) -> Option<i64> {
    let value = match cell {
        CellValue::Empty => return None,
        CellValue::Number(n) => *n,
        CellValue::Text(text) => {
            let text = text.trim();
            if let Ok(v) = text.parse::<i64>() {
                return Some(v);
            }
            text.parse::<f64>().ok()?
        }
    };
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}
