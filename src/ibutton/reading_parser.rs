/// iButton export reading parser
///
/// Extracts (timestamp, value) pairs from the data lines of an export.
/// Data lines have the structure:
/// - Column A (index 0): Date/Time as locale-specific text
/// - Column B (index 1): Unit letter (ignored)
/// - Column C (index 2): Temperature value
use chrono::NaiveTime;
use regex::Regex;
use tracing::{debug, warn};

const TIMESTAMP_COLUMN: usize = 0;
const VALUE_COLUMN: usize = 2;

/// A single temperature reading
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: String,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// A row inside the configured window that could not be used
#[derive(Debug, Clone, PartialEq)]
pub struct RowWarning {
    pub subject: String,
    /// 1-based row number, as shown by a spreadsheet application
    pub row: usize,
    pub reason: String,
}

/// Readings of one export plus the rows skipped while extracting them
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub readings: Vec<Reading>,
    pub warnings: Vec<RowWarning>,
}

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("No time of day found in timestamp '{0}'")]
    Missing(String),

    #[error("Time of day out of range in timestamp '{0}'")]
    OutOfRange(String),

    #[error("Invalid timestamp pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Extract readings from the inclusive 0-based row window `[start_row, end_row]`
///
/// Rows past the end of the table are absent, not errors. A row whose value
/// cell is missing or not numeric is skipped and reported as a warning.
pub fn extract_readings(
    subject: &str,
    rows: &[Vec<String>],
    start_row: usize,
    end_row: usize,
) -> Extraction {
    let mut extraction = Extraction::default();

    for (row_idx, row) in rows
        .iter()
        .enumerate()
        .skip(start_row)
        .take_while(|(idx, _)| *idx <= end_row)
    {
        match parse_row(row) {
            Ok(reading) => extraction.readings.push(reading),
            Err(reason) => {
                warn!("Skipping row {} of {}: {}", row_idx + 1, subject, reason);
                extraction.warnings.push(RowWarning {
                    subject: subject.to_string(),
                    row: row_idx + 1,
                    reason,
                });
            }
        }
    }

    debug!(
        "Extracted {} readings from {} ({} rows skipped)",
        extraction.readings.len(),
        subject,
        extraction.warnings.len()
    );

    extraction
}

fn parse_row(row: &[String]) -> Result<Reading, String> {
    let timestamp = row
        .get(TIMESTAMP_COLUMN)
        .ok_or_else(|| "empty row".to_string())?;
    let raw_value = row
        .get(VALUE_COLUMN)
        .ok_or_else(|| format!("missing value column in {row:?}"))?;
    let value = raw_value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("cannot parse value '{raw_value}': {e}"))?;

    Ok(Reading::new(timestamp.clone(), value))
}

/// Parse the time of day out of a locale-specific timestamp
///
/// Accepts 24-hour times and 12-hour times with an `AM`/`PM` or
/// `a. m.`/`p. m.` marker, e.g. `"21/06/23 01:30:00 p. m."` → 13:30:00.
pub fn parse_time_of_day(timestamp: &str) -> Result<NaiveTime, TimestampError> {
    let re = Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([AaPp])\.?\s*[Mm]\.?)?")?;
    let caps = re
        .captures(timestamp)
        .ok_or_else(|| TimestampError::Missing(timestamp.to_string()))?;

    let field = |idx: usize| -> u32 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    let (mut hour, minute, second) = (field(1), field(2), field(3));

    if let Some(marker) = caps.get(4) {
        if hour == 0 || hour > 12 {
            return Err(TimestampError::OutOfRange(timestamp.to_string()));
        }
        hour %= 12;
        if marker.as_str().eq_ignore_ascii_case("p") {
            hour += 12;
        }
    }

    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| TimestampError::OutOfRange(timestamp.to_string()))
}
