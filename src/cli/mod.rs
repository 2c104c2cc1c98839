pub mod actions;
pub mod prompt;

use crate::model::TrackerError;
use crate::storage::RecordStore;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

const MENU: &str = "\n==== Property Price Tracker ====\n\
    1. Add the next quarter's prices\n\
    2. Analyse prices over a range of quarters\n\
    3. Exit";

/// Interactive menu over a record store. The store is borrowed for the
/// lifetime of the menu and every action fetches fresh data from it.
pub struct Menu<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    export_dir: PathBuf,
}

impl<'a, S: RecordStore + ?Sized> Menu<'a, S> {
    pub fn new(store: &'a S, export_dir: PathBuf) -> Self {
        Self { store, export_dir }
    }

    /// Runs until the user exits. Failed actions are reported and the menu
    /// is shown again; console I/O failures (including end of input) end the loop.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<()> {
        loop {
            writeln!(output, "{}", MENU)?;
            let choice = prompt::prompt_validated_integer(input, output, "Select an option", 1, 3)?;
            let result = match choice {
                1 => actions::add_record(self.store, input, output),
                2 => actions::analyze_range(self.store, &self.export_dir, input, output),
                _ => {
                    info!("Exit requested");
                    writeln!(output, "Goodbye!")?;
                    return Ok(());
                }
            };

            match result {
                Ok(()) => {}
                Err(TrackerError::Io(e)) => return Err(e),
                Err(e) => {
                    warn!("Menu action {} failed: {}", choice, e);
                    writeln!(output, "Error: {}", e)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, NewRecord, Period, Row, StorageError};
    use crate::storage::SqliteStore;
    use std::io::Cursor;

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for (year, quarter, dublin) in [(2020, 1, 100.0), (2020, 2, 200.0), (2020, 3, 300.0), (2020, 4, 400.0)] {
            store
                .append_row(&NewRecord {
                    period: Period::new(year, quarter).unwrap(),
                    prices: [50.0, dublin, 1.0, 1.0, 1.0, 1.0, 1.0],
                })
                .unwrap();
        }
        store
    }

    fn run(store: &dyn RecordStore, script: &str, export_dir: PathBuf) -> (io::Result<()>, String) {
        let menu = Menu::new(store, export_dir);
        let mut input = Cursor::new(script.to_string());
        let mut output = Vec::new();
        let result = menu.run(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn adds_the_next_quarter() {
        let store = seeded_store();
        let script = "1\n410\n€520,000\n300\n290\n280\n270\n260\ny\n3\n";
        let (result, text) = run(&store, script, PathBuf::from("unused"));
        result.unwrap();
        assert!(text.contains("Adding average prices for 2021 Q1"));
        assert!(text.contains("Record for 2021 Q1 saved."));

        let rows = store.fetch_all_rows().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].period().unwrap(), Period::new(2021, 1).unwrap());
        assert_eq!(rows[4].get("Dublin"), Some(&CellValue::Number(520000.0)));
    }

    #[test]
    fn declined_record_is_not_stored() {
        let store = seeded_store();
        let script = "1\n1\n2\n3\n4\n5\n6\n7\nn\n3\n";
        let (result, text) = run(&store, script, PathBuf::from("unused"));
        result.unwrap();
        assert!(text.contains("Record discarded."));
        assert_eq!(store.fetch_all_rows().unwrap().len(), 4);
    }

    #[test]
    fn add_on_empty_store_reports_and_continues() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (result, text) = run(&store, "1\n3\n", PathBuf::from("unused"));
        result.unwrap();
        assert!(text.contains("Error: no data available"));
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn analyses_a_range_and_exports() {
        let store = seeded_store();
        let dir = tempfile::tempdir().unwrap();
        // Start 2020 Q1, end 2020 Q4, category 2 (Dublin), export.
        let script = "2\n2020\n1\n2020\n4\n2\ny\n3\n";
        let (result, text) = run(&store, script, dir.path().to_path_buf());
        result.unwrap();
        assert!(text.contains("Data is available from 2020 Q1 to 2020 Q4."));
        assert!(text.contains("Dublin increased by 300.00%"));
        assert!(text.contains("129.10"));
        assert!(text.contains("Table written to"));
        let exported = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(exported, 2);
    }

    #[test]
    fn end_period_cannot_precede_start() {
        let store = seeded_store();
        // End quarter 1 is rejected once the start is 2020 Q3.
        let script = "2\n2020\n3\n2020\n1\n3\n1\nn\n3\n";
        let (result, text) = run(&store, script, PathBuf::from("unused"));
        result.unwrap();
        assert!(text.contains("End quarter (3-4): "));
        assert!(text.contains("1 is outside the range 3-4"));
        assert!(text.contains("Nationally prices from 2020 Q3 to 2020 Q3"));
    }

    #[test]
    fn end_of_input_stops_the_menu() {
        let store = seeded_store();
        let (result, _) = run(&store, "2\n2020\n", PathBuf::from("unused"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    struct OfflineStore;

    impl RecordStore for OfflineStore {
        fn fetch_all_rows(&self) -> Result<Vec<Row>, StorageError> {
            Err(StorageError::PermissionDenied { status: 403 })
        }

        fn fetch_raw_last_row(&self) -> Result<Option<Vec<CellValue>>, StorageError> {
            Err(StorageError::PermissionDenied { status: 403 })
        }

        fn append_row(&self, _record: &NewRecord) -> Result<(), StorageError> {
            Err(StorageError::PermissionDenied { status: 403 })
        }
    }

    #[test]
    fn store_failure_returns_to_the_menu() {
        let (result, text) = run(&OfflineStore, "2\n1\n3\n", PathBuf::from("unused"));
        result.unwrap();
        assert_eq!(text.matches("Error: record store unavailable").count(), 2);
        assert!(text.contains("share the spreadsheet"));
        assert!(text.contains("Goodbye!"));
    }
}
