use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_SPREADSHEET_NAME: &str = "new_property_price";
const DEFAULT_TOKEN_FILE: &str = ".secrets/property-tracker-token.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown backend '{0}', expected 'sqlite' or 'sheets'")]
    UnknownBackend(String),

    #[error("access token not found: {0}")]
    MissingCredentials(String),
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Sheets,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_name: String,
    /// Worksheet title; the first worksheet when unset.
    pub worksheet: Option<String>,
    pub token_path: Option<PathBuf>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            spreadsheet_name: DEFAULT_SPREADSHEET_NAME.to_string(),
            worksheet: None,
            token_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub sqlite_path: String,
    pub export_dir: PathBuf,
    pub sheets: SheetsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            sqlite_path: "property_prices.db".to_string(),
            export_dir: PathBuf::from("exports"),
            sheets: SheetsConfig::default(),
        }
    }
}

/// Loads the config file; a missing file yields the defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config file at {}, using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_string(),
                source,
            });
        }
    };
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Applies `PT_*` overrides. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(backend) = lookup("PT_BACKEND") {
        config.backend = match backend.trim().to_lowercase().as_str() {
            "sqlite" => Backend::Sqlite,
            "sheets" => Backend::Sheets,
            _ => return Err(ConfigError::UnknownBackend(backend)),
        };
    }
    if let Some(path) = lookup("PT_DB_PATH") {
        config.sqlite_path = path;
    }
    if let Some(dir) = lookup("PT_EXPORT_DIR") {
        config.export_dir = PathBuf::from(dir);
    }
    if let Some(id) = lookup("PT_SPREADSHEET_ID").filter(|id| !id.trim().is_empty()) {
        config.sheets.spreadsheet_id = Some(id);
    }
    if let Some(name) = lookup("PT_SPREADSHEET_NAME") {
        config.sheets.spreadsheet_name = name;
    }
    if let Some(path) = lookup("PT_TOKEN_PATH") {
        config.sheets.token_path = Some(PathBuf::from(path));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
}

/// Resolves the bearer token for the Sheets backend: `PT_ACCESS_TOKEN`,
/// then the configured token file, then `~/.secrets/property-tracker-token.json`.
pub fn resolve_access_token<F>(sheets: &SheetsConfig, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("PT_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }

    let path = match &sheets.token_path {
        Some(path) => path.clone(),
        None => {
            let home = lookup("HOME").ok_or_else(|| {
                ConfigError::MissingCredentials(
                    "set PT_ACCESS_TOKEN or PT_TOKEN_PATH".to_string(),
                )
            })?;
            Path::new(&home).join(DEFAULT_TOKEN_FILE)
        }
    };

    let content = fs::read_to_string(&path).map_err(|_| {
        ConfigError::MissingCredentials(format!(
            "no token file at {}; set PT_ACCESS_TOKEN, or PT_TOKEN_PATH to a file holding the token",
            path.display()
        ))
    })?;
    parse_token(&content).ok_or_else(|| {
        ConfigError::MissingCredentials(format!("token file {} is empty", path.display()))
    })
}

/// Accepts either a bare token or `{"access_token": "..."}`.
fn parse_token(content: &str) -> Option<String> {
    let trimmed = content.trim();
    let token = if trimmed.starts_with('{') {
        serde_json::from_str::<TokenFile>(trimmed).ok()?.access_token
    } else {
        trimmed.to_string()
    };
    let token = token.trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "backend": "sheets", "sheets": { "worksheet": "Data" } }"#)
                .unwrap();
        assert_eq!(config.backend, Backend::Sheets);
        assert_eq!(config.sqlite_path, "property_prices.db");
        assert_eq!(config.sheets.spreadsheet_name, "new_property_price");
        assert_eq!(config.sheets.worksheet.as_deref(), Some("Data"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_config(path.to_str().unwrap()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_win() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("PT_BACKEND", "Sheets"),
                ("PT_SPREADSHEET_ID", "abc123"),
                ("PT_EXPORT_DIR", "/tmp/out"),
            ]),
        )
        .unwrap();
        assert_eq!(config.backend, Backend::Sheets);
        assert_eq!(config.sheets.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));

        let err = apply_env_overrides(&mut config, env(&[("PT_BACKEND", "excel")]));
        assert!(matches!(err, Err(ConfigError::UnknownBackend(_))));
    }

    #[test]
    fn token_from_env_or_file() {
        let sheets = SheetsConfig::default();
        let token = resolve_access_token(&sheets, env(&[("PT_ACCESS_TOKEN", " ya29.token ")])).unwrap();
        assert_eq!(token, "ya29.token");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, r#"{"access_token": "from-file"}"#).unwrap();
        let sheets = SheetsConfig {
            token_path: Some(path),
            ..SheetsConfig::default()
        };
        assert_eq!(resolve_access_token(&sheets, env(&[])).unwrap(), "from-file");
    }

    #[test]
    fn missing_token_names_the_fix() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().to_str().unwrap();
        let err = resolve_access_token(&SheetsConfig::default(), env(&[("HOME", home)])).unwrap_err();
        assert!(err.to_string().contains("PT_ACCESS_TOKEN"));
    }

    #[test]
    fn bare_token_file() {
        assert_eq!(parse_token("  abc\n").as_deref(), Some("abc"));
        assert_eq!(parse_token("   "), None);
    }
}
