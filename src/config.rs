// src/config.rs
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::crm::NO_MONTH_LABEL;
use crate::error::ConfigError;
use crate::process::{Calendar, IngestMode, IngestOptions};

/// Settings file, e.g.
///
/// ```yaml
/// calendar: english_short
/// mode: detect
/// database: /var/lib/sheetcrm/crm.sqlite
/// no_month_label: "No month"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub calendar: Calendar,
    pub mode: IngestMode,
    pub database: PathBuf,
    pub no_month_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: Calendar::default(),
            mode: IngestMode::default(),
            database: PathBuf::from("crm.sqlite"),
            no_month_label: NO_MONTH_LABEL.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            calendar: self.calendar,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_yaml("calendar: english_short\n").unwrap();
        assert_eq!(cfg.calendar, Calendar::EnglishShort);
        assert_eq!(cfg.mode, IngestMode::Detect);
        assert_eq!(cfg.no_month_label, NO_MONTH_LABEL);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "mode: sheet_name\ndatabase: /tmp/x.sqlite").unwrap();
        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.mode, IngestMode::SheetName);
        assert_eq!(cfg.database, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(
            cfg.ingest_options(),
            IngestOptions {
                calendar: Calendar::Russian,
                mode: IngestMode::SheetName
            }
        );
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        assert!(matches!(
            Config::from_yaml("calender: russian"),
            Err(ConfigError::Parse(_))
        ));
        assert!(Config::from_yaml("calendar: klingon").is_err());
        assert!(matches!(
            Config::load(Path::new("/nonexistent/sheetcrm.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
