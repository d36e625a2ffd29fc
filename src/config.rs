use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::report::day_selector::{DayDirective, SelectionError};

/// Default settings file name, looked up in the input directory
pub const SETTINGS_FILE_NAME: &str = "ibuttons.config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Couldn't open config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config validation error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config validation error: {0}")]
    InvalidValue(String),

    #[error("Config validation error: {0}")]
    Directive(#[from] SelectionError),
}

/// `DaysToProcess` as written in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DaysToProcess {
    Keyword(String),
    Days(Vec<u32>),
}

/// Settings file contents, keys as they appear in the JSON
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSettings {
    start_row: i64,
    end_row: i64,
    repeat_last_value: bool,
    days_to_process: DaysToProcess,
}

/// Run settings, validated and converted to 0-based rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// First row of the data window (0-based, inclusive)
    pub start_row: usize,
    /// Last row of the data window (0-based, inclusive)
    pub end_row: usize,
    /// Append each day's first reading to the end of the previous day
    pub repeat_last_value: bool,
    pub days_to_process: DayDirective,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading settings from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(text)?;
        let settings = Self::try_from(raw)?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Number of rows covered by the window, whether or not they hold data
    pub fn selected_rows(&self) -> usize {
        self.end_row - self.start_row + 1
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        if raw.start_row < 1 {
            return Err(ConfigError::InvalidValue(format!(
                "StartRow must be at least 1, got {}",
                raw.start_row
            )));
        }
        if raw.end_row < raw.start_row {
            return Err(ConfigError::InvalidValue(format!(
                "EndRow ({}) must not be before StartRow ({})",
                raw.end_row, raw.start_row
            )));
        }

        let to_index = |row: i64, key: &str| {
            usize::try_from(row - 1)
                .map_err(|_| ConfigError::InvalidValue(format!("{key} is out of range: {row}")))
        };

        Ok(Settings {
            start_row: to_index(raw.start_row, "StartRow")?,
            end_row: to_index(raw.end_row, "EndRow")?,
            repeat_last_value: raw.repeat_last_value,
            days_to_process: DayDirective::try_from(raw.days_to_process)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_converts_rows_to_zero_based() {
        let settings = Settings::from_json(
            r#"{"StartRow": 16, "EndRow": 303, "RepeatLastValue": true, "DaysToProcess": "All"}"#,
        )
        .unwrap();
        assert_eq!(settings.start_row, 15);
        assert_eq!(settings.end_row, 302);
        assert!(settings.repeat_last_value);
        assert_eq!(settings.days_to_process, DayDirective::AllDays);
        assert_eq!(settings.selected_rows(), 288);
    }

    #[test]
    fn test_from_json_explicit_days() {
        let settings = Settings::from_json(
            r#"{"StartRow": 2, "EndRow": 49, "RepeatLastValue": false, "DaysToProcess": [2, 1, 2]}"#,
        )
        .unwrap();
        assert_eq!(
            settings.days_to_process,
            DayDirective::ExplicitDays(vec![2, 1, 2])
        );
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let settings = Settings::from_json(
            r#"{"StartRow": 1, "EndRow": 1, "RepeatLastValue": false, "DaysToProcess": "none", "Comment": "x"}"#,
        )
        .unwrap();
        assert_eq!(settings.days_to_process, DayDirective::Skip);
    }

    #[test]
    fn test_from_json_missing_key() {
        let err = Settings::from_json(r#"{"StartRow": 1, "EndRow": 10, "DaysToProcess": "All"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("RepeatLastValue"));
    }

    #[test]
    fn test_from_json_wrong_type() {
        let err = Settings::from_json(
            r#"{"StartRow": "1", "EndRow": 10, "RepeatLastValue": false, "DaysToProcess": "All"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = Settings::from_json(
            r#"{"StartRow": 1, "EndRow": 10, "RepeatLastValue": "yes", "DaysToProcess": "All"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_json_negative_day_is_type_error() {
        let err = Settings::from_json(
            r#"{"StartRow": 1, "EndRow": 10, "RepeatLastValue": false, "DaysToProcess": [1, -2]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_json_start_row_zero() {
        let err = Settings::from_json(
            r#"{"StartRow": 0, "EndRow": 10, "RepeatLastValue": false, "DaysToProcess": "All"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_from_json_end_before_start() {
        let err = Settings::from_json(
            r#"{"StartRow": 10, "EndRow": 9, "RepeatLastValue": false, "DaysToProcess": "All"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("EndRow (9)"));
    }

    #[test]
    fn test_from_json_unknown_directive() {
        let err = Settings::from_json(
            r#"{"StartRow": 1, "EndRow": 10, "RepeatLastValue": false, "DaysToProcess": "Some"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Directive(SelectionError::InvalidDirective(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Settings::from_file(Path::new("/nonexistent/ibuttons.config")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
