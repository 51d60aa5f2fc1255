// src/error.rs
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable failure while reading one workbook. Becomes a [`Diagnostic`].
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("failed to open workbook")]
    Open(#[source] calamine::Error),
    #[error("failed to read sheet `{sheet}`")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// Failure of the storage collaborator. Fatal for the batch.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to serialize record")]
    Serialize(#[from] serde_json::Error),
    #[error("no open transaction")]
    NoTransaction,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config")]
    Parse(#[from] serde_yaml::Error),
}

/// Non-fatal error report returned alongside ingestion results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// The error and its causes on one line.
    pub error: String,
    /// The error followed by one `Caused by:` line per source.
    pub traceback: String,
}

impl Diagnostic {
    pub fn new(file: Option<&str>, sheet: Option<&str>, err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        Self {
            file: file.map(str::to_string),
            sheet: sheet.map(str::to_string),
            error: format!("{:#}", err),
            traceback: format!("{:?}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_renders_source_chain() {
        let err = WalkError::Sheet {
            sheet: "Март".into(),
            source: calamine::Error::Msg("bad xml"),
        };
        let d = Diagnostic::new(Some("q1.xlsx"), Some("Март"), err);
        assert_eq!(d.error, "failed to read sheet `Март`: bad xml");
        assert!(d.traceback.starts_with("failed to read sheet `Март`"));
        assert!(d.traceback.contains("Caused by:"));
        assert!(d.traceback.contains("bad xml"));
    }

    #[test]
    fn diagnostic_omits_absent_scope() {
        let d = Diagnostic::new(None, None, StoreError::NoTransaction);
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["error"], "no open transaction");
        assert!(value.get("file").is_none());
        assert!(value.get("sheet").is_none());
        assert!(value["traceback"]
            .as_str()
            .is_some_and(|t| t.starts_with("no open transaction")));
    }
}
