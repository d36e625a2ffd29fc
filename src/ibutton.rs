// iButton data-logger export module
//
// This module handles the CSV exports written for iButton temperature loggers.
// An export contains:
// - Free-form header lines: logger registration, sample rate, alarm thresholds
// - Data lines: Date/Time, Unit, Value
//
// Headers can sit at any row or cell, so metadata is found by scanning and
// readings are taken from a configured row window.

pub mod metadata_parser;
pub mod reading_parser;

pub use metadata_parser::{extract_metadata, LoggerMetadata, MetadataError};
pub use reading_parser::{
    extract_readings, parse_time_of_day, Extraction, Reading, RowWarning, TimestampError,
};

/// One parsed CSV export: the subject key and its raw row-table
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectTable {
    pub key: String,
    pub rows: Vec<Vec<String>>,
}

impl SubjectTable {
    pub fn new(key: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            key: key.into(),
            rows,
        }
    }
}
