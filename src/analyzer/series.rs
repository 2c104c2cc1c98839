use crate::model::{Period, Row, TrackerError};
use crate::normalizer::{collect_field_names, resolve_field};
use crate::parser::cell::parse_price;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub period: Period,
    pub price: f64,
}

/// Prices of one category over a period range, ordered by period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Header the requested category resolved to; `None` for an empty store.
    pub field: Option<String>,
    pub points: Vec<SeriesPoint>,
    pub start_price: Option<f64>,
    pub end_price: Option<f64>,
    /// Rows left out because their period or price could not be parsed.
    pub skipped: usize,
}

impl Series {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Extracts the `requested` field for every row in `[start, end]`.
pub fn extract_series(
    rows: &[Row],
    start: Period,
    end: Period,
    requested: &str,
) -> Result<Series, TrackerError> {
    let mut series = Series::default();
    if rows.is_empty() {
        return Ok(series);
    }

    let available = collect_field_names(rows);
    let field = match resolve_field(requested, &available) {
        Some(field) => field.to_string(),
        None => {
            return Err(TrackerError::ColumnNotFound {
                requested: requested.to_string(),
                available,
            });
        }
    };

    for (idx, row) in rows.iter().enumerate() {
        let period = match row.period() {
            Ok(p) => p,
            Err(e) => {
                debug!("Skipping row {}: {}", idx, e);
                series.skipped += 1;
                continue;
            }
        };
        if period < start || period > end {
            continue;
        }

        let Some(price) = row.get(&field).and_then(parse_price) else {
            debug!("Skipping {} at {}: no usable value", field, period);
            series.skipped += 1;
            continue;
        };

        if period == start && series.start_price.is_none() {
            series.start_price = Some(price);
        }
        if period == end && series.end_price.is_none() {
            series.end_price = Some(price);
        }
        series.points.push(SeriesPoint { period, price });
    }

    series.points.sort_by_key(|p| p.period);
    series.field = Some(field);
    Ok(series)
}
