use crate::ibutton::{MetadataError, TimestampError};
use crate::report::day_selector::SelectionError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{subject}: {source}")]
    Metadata {
        subject: String,
        #[source]
        source: MetadataError,
    },

    #[error("Different {what} found in csv files: {values}")]
    Inconsistent { what: &'static str, values: String },

    #[error("Sample rate of {0} minute(s) does not fit in a day")]
    InvalidSampleRate(u32),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),

    #[error("Column ordinal {ordinal} with offset {offset} is not a valid column")]
    InvalidColumn { ordinal: i64, offset: i64 },

    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    #[error("Cell ({row}, {col}) of sheet '{sheet}' written twice")]
    DuplicateCell { sheet: String, row: u32, col: u32 },

    #[error("No input files to process")]
    NoSubjects,

    #[error("No readings found in any input file")]
    NoReadings,
}
