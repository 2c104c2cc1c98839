use crate::model::{CellValue, Category, NewRecord, Row, StorageError, QUARTER_FIELD, YEAR_FIELD};
use crate::storage::RecordStore;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tracing::info;

const TABLE: &str = "property_prices";

/// Local record store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens the database file and creates the table if it is missing.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        let price_columns = Category::ALL
            .iter()
            .map(|c| format!("{} REAL", c.field_name()))
            .collect::<Vec<_>>()
            .join(",\n                ");

        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                {YEAR_FIELD} INTEGER NOT NULL,
                {QUARTER_FIELD} INTEGER NOT NULL,
                {price_columns},
                UNIQUE ({YEAR_FIELD}, {QUARTER_FIELD})
            );
            "
        ))?;

        Ok(Self { conn })
    }

    /// Column names in record order: `Year`, `Quarter`, then one per category.
    fn columns() -> Vec<&'static str> {
        let mut columns = vec![YEAR_FIELD, QUARTER_FIELD];
        columns.extend(Category::ALL.iter().map(|c| c.field_name()));
        columns
    }

    fn select_sql(suffix: &str) -> String {
        format!("SELECT {} FROM {} {}", Self::columns().join(", "), TABLE, suffix)
    }

    /// Appends raw cells in record order. Text cells are stored as-is.
    pub fn append_cells(&self, cells: &[CellValue]) -> Result<(), StorageError> {
        let columns = Self::columns();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            TABLE,
            columns.join(", "),
            placeholders
        );

        let mut values: Vec<Value> = cells.iter().map(sql_value).collect();
        values.resize(columns.len(), Value::Null);
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }

    fn read_cells(row: &rusqlite::Row, count: usize) -> Result<Vec<CellValue>, rusqlite::Error> {
        (0..count)
            .map(|i| row.get_ref(i).map(cell_value))
            .collect()
    }
}

impl RecordStore for SqliteStore {
    fn fetch_all_rows(&self) -> Result<Vec<Row>, StorageError> {
        let columns = Self::columns();
        let mut stmt = self.conn.prepare(&Self::select_sql("ORDER BY id ASC"))?;
        let rows = stmt.query_map([], |row| {
            let cells = Self::read_cells(row, columns.len())?;
            Ok(Row::from_pairs(columns.iter().copied().zip(cells)))
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn fetch_raw_last_row(&self) -> Result<Option<Vec<CellValue>>, StorageError> {
        let count = Self::columns().len();
        let mut stmt = self.conn.prepare(&Self::select_sql("ORDER BY id DESC LIMIT 1"))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::read_cells(row, count)?))
        } else {
            Ok(None)
        }
    }

    fn append_row(&self, record: &NewRecord) -> Result<(), StorageError> {
        self.append_cells(&record.to_cells())?;
        info!("Appended record for {} to SQLite", record.period);
        Ok(())
    }
}

fn sql_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Number(n) => Value::Real(*n),
        CellValue::Text(text) => Value::Text(text.clone()),
    }
}

fn cell_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => CellValue::Empty,
        ValueRef::Integer(i) => CellValue::Number(i as f64),
        ValueRef::Real(f) => CellValue::Number(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}
