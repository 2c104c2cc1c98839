use crate::config::SheetsConfig;
use crate::model::{CellValue, NewRecord, Row, StorageError};
use crate::storage::RecordStore;
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3/files";
/// A1 range without a sheet name addresses the first worksheet.
const DEFAULT_RANGE: &str = "A:Z";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Remote record store backed by a Google Sheets worksheet.
/// The first row of the worksheet is the header.
pub struct SheetsStore {
    client: Client,
    access_token: String,
    spreadsheet_id: String,
    range: String,
}

impl SheetsStore {
    /// Builds the HTTP client and resolves the spreadsheet, by ID when
    /// configured, otherwise by name through the Drive API.
    pub fn connect(settings: &SheetsConfig, access_token: String) -> Result<Self, StorageError> {
        let client = Client::builder()
            .user_agent(concat!("property-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        let spreadsheet_id = match &settings.spreadsheet_id {
            Some(id) => id.clone(),
            None => Self::find_spreadsheet(&client, &access_token, &settings.spreadsheet_name)?,
        };
        let range = match &settings.worksheet {
            Some(title) => format!("'{}'!{}", title.replace('\'', "''"), DEFAULT_RANGE),
            None => DEFAULT_RANGE.to_string(),
        };

        info!("Connected to spreadsheet {} (range {})", spreadsheet_id, range);
        Ok(Self {
            client,
            access_token,
            spreadsheet_id,
            range,
        })
    }

    fn find_spreadsheet(client: &Client, token: &str, name: &str) -> Result<String, StorageError> {
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            name.replace('\'', "\\'")
        );
        let response = client
            .get(DRIVE_API)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()?;
        let list: FileList = check_status(response)?.json()?;

        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| StorageError::NotFound(format!("spreadsheet named '{}'", name)))
    }

    fn values_url(&self, suffix: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(SHEETS_API)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let range = format!("{}{}", self.range, suffix);
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidResponse("invalid API base URL".into()))?
            .extend([self.spreadsheet_id.as_str(), "values", range.as_str()]);
        Ok(url)
    }

    fn fetch_values(&self) -> Result<Vec<Vec<serde_json::Value>>, StorageError> {
        let response = self
            .client
            .get(self.values_url("")?)
            .bearer_auth(&self.access_token)
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")])
            .send()?;
        let body: ValueRange = check_status(response)?.json()?;
        debug!("Fetched {} worksheet rows", body.values.len());
        Ok(body.values)
    }
}

impl RecordStore for SheetsStore {
    fn fetch_all_rows(&self) -> Result<Vec<Row>, StorageError> {
        Ok(rows_from_values(self.fetch_values()?))
    }

    fn fetch_raw_last_row(&self) -> Result<Option<Vec<CellValue>>, StorageError> {
        Ok(last_data_row(self.fetch_values()?))
    }

    fn append_row(&self, record: &NewRecord) -> Result<(), StorageError> {
        let cells: Vec<serde_json::Value> = record.to_cells().iter().map(json_value).collect();
        let response = self
            .client
            .post(self.values_url(":append")?)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [cells] }))
            .send()?;
        check_status(response)?;
        info!("Appended record for {} to spreadsheet {}", record.period, self.spreadsheet_id);
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StorageError::PermissionDenied {
            status: status.as_u16(),
        }),
        StatusCode::NOT_FOUND => Err(StorageError::NotFound(
            "spreadsheet or worksheet (check the ID, name and sharing settings)".into(),
        )),
        _ => {
            let body = response.text().unwrap_or_else(|_| "unknown".into());
            Err(StorageError::InvalidResponse(format!("[{}] {}", status, body)))
        }
    }
}

/// Converts a value grid into rows keyed by the header row. Short rows are
/// padded with empty cells; rows without any content are dropped.
pub fn rows_from_values(values: Vec<Vec<serde_json::Value>>) -> Vec<Row> {
    let mut lines = values.into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header
        .into_iter()
        .map(|v| CellValue::from(v).to_string().trim().to_string())
        .collect();

    lines
        .map(|line| {
            let mut cells: Vec<CellValue> = line.into_iter().map(CellValue::from).collect();
            cells.resize(header.len(), CellValue::Empty);
            cells
        })
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| Row::from_pairs(header.iter().cloned().zip(cells)))
        .collect()
}

/// The last non-empty row below the header, as raw cells.
pub fn last_data_row(values: Vec<Vec<serde_json::Value>>) -> Option<Vec<CellValue>> {
    values
        .into_iter()
        .skip(1)
        .map(|line| line.into_iter().map(CellValue::from).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .last()
}

fn json_value(cell: &CellValue) -> serde_json::Value {
    match cell {
        CellValue::Empty => serde_json::Value::Null,
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => json!(*n as i64),
        CellValue::Number(n) => json!(n),
        CellValue::Text(text) => json!(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Period;

    fn grid() -> Vec<Vec<serde_json::Value>> {
        vec![
            vec![json!("Year"), json!("Quarter"), json!("Nationally"), json!("Dublin")],
            vec![json!(2020), json!(1), json!(290000), json!("€410,000")],
            vec![json!(2020), json!(2), json!(295000.5)],
            vec![json!(""), json!("")],
            vec![json!(2020), json!(3), json!(""), json!(415000)],
        ]
    }

    #[test]
    fn grid_becomes_rows_keyed_by_header() {
        let rows = rows_from_values(grid());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].period().unwrap(), Period::new(2020, 1).unwrap());
        assert_eq!(rows[0].get("Dublin"), Some(&CellValue::Text("€410,000".into())));
        assert_eq!(rows[1].get("Nationally"), Some(&CellValue::Number(295000.5)));
        assert_eq!(rows[1].get("Dublin"), Some(&CellValue::Empty));
        assert_eq!(rows[2].get("Nationally"), Some(&CellValue::Empty));
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let values = vec![vec![json!("Year"), json!("Quarter")]];
        assert!(rows_from_values(values.clone()).is_empty());
        assert_eq!(last_data_row(values), None);
        assert!(rows_from_values(Vec::new()).is_empty());
    }

    #[test]
    fn last_data_row_skips_blank_lines() {
        let cells = last_data_row(grid()).unwrap();
        assert_eq!(cells[0], CellValue::Number(2020.0));
        assert_eq!(cells[1], CellValue::Number(3.0));
    }

    #[test]
    fn appended_numbers_are_integral_when_possible() {
        assert_eq!(json_value(&CellValue::Number(2024.0)), json!(2024));
        assert_eq!(json_value(&CellValue::Number(1234.5)), json!(1234.5));
        assert_eq!(json_value(&CellValue::Empty), serde_json::Value::Null);
    }
}
