use crate::model::{CellValue, Period, Row, TrackerError};
use crate::parser::cell::parse_integer;
use tracing::debug;

/// Earliest and latest period present in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetBounds {
    pub earliest: Period,
    pub latest: Period,
}

/// Derives the dataset boundaries from every row with a valid period.
/// Returns `None` when no such row exists.
pub fn dataset_bounds(rows: &[Row]) -> Option<DatasetBounds> {
    let mut bounds: Option<DatasetBounds> = None;
    for (idx, row) in rows.iter().enumerate() {
        let period = match row.period() {
            Ok(p) => p,
            Err(e) => {
                debug!("Ignoring row {} while computing bounds: {}", idx, e);
                continue;
            }
        };
        bounds = Some(match bounds {
            None => DatasetBounds { earliest: period, latest: period },
            Some(b) => DatasetBounds {
                earliest: b.earliest.min(period),
                latest: b.latest.max(period),
            },
        });
    }
    bounds
}

/// The period following the last row in storage order.
/// Storage order is trusted, the rows are not re-sorted.
pub fn next_period(rows: &[Row]) -> Result<Period, TrackerError> {
    let last = rows
        .last()
        .ok_or_else(|| TrackerError::DataUnavailable("the record store is empty".into()))?;
    Ok(last.period()?.next())
}

/// Same as [`next_period`], from the raw last row (`[year, quarter, ...]`).
pub fn next_period_from_cells(cells: &[CellValue]) -> Result<Period, TrackerError> {
    if cells.is_empty() {
        return Err(TrackerError::DataUnavailable("the record store is empty".into()));
    }
    let year = cells
        .first()
        .and_then(parse_integer)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| TrackerError::MalformedRow("last row has no valid year".into()))?;
    let quarter = cells
        .get(1)
        .and_then(parse_integer)
        .and_then(|q| u8::try_from(q).ok())
        .ok_or_else(|| TrackerError::MalformedRow("last row has no valid quarter".into()))?;
    Ok(Period::new(year, quarter)?.next())
}
