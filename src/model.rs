// Core structs: Period, Category, Row, NewRecord and the error types
use std::fmt;
use thiserror::Error;

use crate::parser::cell::parse_integer;

pub const YEAR_FIELD: &str = "Year";
pub const QUARTER_FIELD: &str = "Quarter";

/// One calendar quarter. Ordering is the tuple order `(year, quarter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    pub fn new(year: i32, quarter: u8) -> Result<Self, TrackerError> {
        if !(1..=4).contains(&quarter) {
            return Err(TrackerError::MalformedRow(format!(
                "quarter must be between 1 and 4, got {}",
                quarter
            )));
        }
        Ok(Self { year, quarter })
    }

    /// The quarter immediately following this one.
    pub fn next(self) -> Self {
        if self.quarter < 4 {
            Self { year: self.year, quarter: self.quarter + 1 }
        } else {
            Self { year: self.year + 1, quarter: 1 }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Nationally,
    Dublin,
    Cork,
    Galway,
    Limerick,
    Waterford,
    OtherCounties,
}

impl Category {
    /// Menu order, which is also the column order of a stored record.
    pub const ALL: [Category; 7] = [
        Category::Nationally,
        Category::Dublin,
        Category::Cork,
        Category::Galway,
        Category::Limerick,
        Category::Waterford,
        Category::OtherCounties,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            Category::Nationally => "Nationally",
            Category::Dublin => "Dublin",
            Category::Cork => "Cork",
            Category::Galway => "Galway",
            Category::Limerick => "Limerick",
            Category::Waterford => "Waterford",
            Category::OtherCounties => "Other_counties",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::OtherCounties => "Other counties",
            other => other.field_name(),
        }
    }

    /// Maps a 1-based menu index to a category.
    pub fn from_menu_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw cell as delivered by a record store.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            serde_json::Value::String(s) if s.is_empty() => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// One stored quarterly record, keyed by header name in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, CellValue)>,
}

impl Row {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Parses the `Year`/`Quarter` fields into a period.
    pub fn period(&self) -> Result<Period, TrackerError> {
        let year = self
            .get(YEAR_FIELD)
            .and_then(parse_integer)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| TrackerError::MalformedRow("missing or invalid Year".into()))?;
        let quarter = self
            .get(QUARTER_FIELD)
            .and_then(parse_integer)
            .and_then(|q| u8::try_from(q).ok())
            .ok_or_else(|| TrackerError::MalformedRow("missing or invalid Quarter".into()))?;
        Period::new(year, quarter)
    }
}

/// A record about to be appended: the next period and one price per category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub period: Period,
    pub prices: [f64; 7],
}

impl NewRecord {
    pub fn price(&self, category: Category) -> f64 {
        let idx = Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        self.prices[idx]
    }

    /// `[year, quarter, nationally, dublin, cork, galway, limerick, waterford, other_counties]`
    pub fn to_cells(&self) -> Vec<CellValue> {
        let mut cells = Vec::with_capacity(2 + self.prices.len());
        cells.push(CellValue::Number(self.period.year as f64));
        cells.push(CellValue::Number(self.period.quarter as f64));
        cells.extend(self.prices.iter().map(|p| CellValue::Number(*p)));
        cells
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no data available: {0}")]
    DataUnavailable(String),

    #[error("column '{requested}' not found; available fields: {}", .available.join(", "))]
    ColumnNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("invalid numeric input: {0}")]
    InvalidNumericInput(String),

    #[error("record store unavailable: {0}")]
    RecordStoreUnavailable(#[from] StorageError),

    #[error("malformed row: {0}")]
    MalformedRow(String),

    #[error("failed to export report: {0}")]
    Export(#[source] std::io::Error),

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(
        "access denied by the spreadsheet service (HTTP {status}); share the spreadsheet with the service account and check the access token"
    )]
    PermissionDenied { status: u16 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: CellValue, quarter: CellValue) -> Row {
        Row::from_pairs([(YEAR_FIELD, year), (QUARTER_FIELD, quarter)])
    }

    #[test]
    fn next_period_rolls_over_the_year() {
        assert_eq!(Period::new(2020, 4).unwrap().next(), Period::new(2021, 1).unwrap());
        assert_eq!(Period::new(2020, 2).unwrap().next(), Period::new(2020, 3).unwrap());
    }

    #[test]
    fn period_rejects_invalid_quarter() {
        assert!(Period::new(2020, 0).is_err());
        assert!(Period::new(2020, 5).is_err());
    }

    #[test]
    fn period_orders_by_year_then_quarter() {
        let a = Period::new(2019, 4).unwrap();
        let b = Period::new(2020, 1).unwrap();
        let c = Period::new(2020, 3).unwrap();
        assert!(a < b && b < c);
        assert_eq!(b.to_string(), "2020 Q1");
    }

    #[test]
    fn row_period_accepts_numbers_and_text() {
        let r = row(CellValue::Number(2021.0), CellValue::Text("3".into()));
        assert_eq!(r.period().unwrap(), Period::new(2021, 3).unwrap());
    }

    #[test]
    fn row_period_missing_quarter_is_malformed() {
        let r = Row::from_pairs([(YEAR_FIELD, CellValue::Number(2021.0))]);
        assert!(matches!(r.period(), Err(TrackerError::MalformedRow(_))));
        let r = row(CellValue::Number(2021.0), CellValue::Number(7.0));
        assert!(matches!(r.period(), Err(TrackerError::MalformedRow(_))));
    }

    #[test]
    fn category_menu_index_is_one_based() {
        assert_eq!(Category::from_menu_index(1), Some(Category::Nationally));
        assert_eq!(Category::from_menu_index(7), Some(Category::OtherCounties));
        assert_eq!(Category::from_menu_index(0), None);
        assert_eq!(Category::from_menu_index(8), None);
        assert_eq!(Category::OtherCounties.label(), "Other counties");
    }

    #[test]
    fn new_record_cells_follow_column_order() {
        let record = NewRecord {
            period: Period::new(2024, 1).unwrap(),
            prices: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        };
        let cells = record.to_cells();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], CellValue::Number(2024.0));
        assert_eq!(cells[1], CellValue::Number(1.0));
        assert_eq!(cells[8], CellValue::Number(7.0));
        assert_eq!(record.price(Category::Dublin), 2.0);
    }

    #[test]
    fn column_not_found_lists_available_fields() {
        let err = TrackerError::ColumnNotFound {
            requested: "Kerry".into(),
            available: vec!["Year".into(), "Dublin".into()],
        };
        assert_eq!(
            err.to_string(),
            "column 'Kerry' not found; available fields: Year, Dublin"
        );
    }
}
