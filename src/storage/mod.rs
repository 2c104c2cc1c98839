// Record store backends.

pub mod sheets;
pub mod sqlite;

pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;

use crate::model::{CellValue, NewRecord, Row, StorageError};

/// Tabular, append-only store of quarterly records.
pub trait RecordStore {
    /// Every stored row in storage order.
    fn fetch_all_rows(&self) -> Result<Vec<Row>, StorageError>;

    /// The literal last-appended row, independent of the header schema.
    fn fetch_raw_last_row(&self) -> Result<Option<Vec<CellValue>>, StorageError>;

    fn append_row(&self, record: &NewRecord) -> Result<(), StorageError>;
}
