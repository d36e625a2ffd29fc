/// iButton export metadata parser
///
/// Locates the sample rate and the temperature unit inside an export. Both are
/// embedded in free-text header cells, e.g.:
/// ```text
/// Sample Rate: 60 minute(s)
/// High Temperature Alarm: 40.0°C
/// ```
use regex::Regex;
use tracing::debug;

const SAMPLE_RATE_TOKEN: &str = "Sample Rate";
const HIGH_ALARM_TOKEN: &str = "High Temperature Alarm:";
const LOW_ALARM_TOKEN: &str = "Low Temperature Alarm:";

/// Metadata extracted from one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerMetadata {
    /// Minutes between consecutive readings
    pub sample_rate_minutes: u32,
    /// Temperature unit symbol, `°C` or `°F`
    pub unit: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid metadata pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Extract sample rate and unit from a row-table
pub fn extract_metadata(rows: &[Vec<String>]) -> Result<LoggerMetadata, MetadataError> {
    let sample_rate_minutes = extract_sample_rate(rows)?;
    let unit = extract_unit(rows)?;
    debug!("Found sample rate {} min, unit {}", sample_rate_minutes, unit);

    Ok(LoggerMetadata {
        sample_rate_minutes,
        unit,
    })
}

/// First cell mentioning the sample rate that carries an integer
///
/// Example: "Sample Rate: 10 minute(s)" → 10
fn extract_sample_rate(rows: &[Vec<String>]) -> Result<u32, MetadataError> {
    let re = Regex::new(r"(\d+)")?;

    cells(rows)
        .filter(|cell| cell.contains(SAMPLE_RATE_TOKEN))
        .find_map(|cell| {
            re.captures(cell)
                .and_then(|cap| cap.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        })
        .ok_or(MetadataError::NotFound("Sample rate"))
}

/// First alarm threshold cell that ends in a degree unit
///
/// Example: "Low Temperature Alarm: -5.5 °F" → "°F"
fn extract_unit(rows: &[Vec<String>]) -> Result<String, MetadataError> {
    let re = Regex::new(r"[-+]?\d+(?:\.\d+)?\s*(°[CF])")?;

    cells(rows)
        .filter(|cell| cell.contains(HIGH_ALARM_TOKEN) || cell.contains(LOW_ALARM_TOKEN))
        .find_map(|cell| {
            re.captures(cell)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().to_string())
        })
        .ok_or(MetadataError::NotFound("Units"))
}

fn cells(rows: &[Vec<String>]) -> impl Iterator<Item = &String> {
    rows.iter().flat_map(|row| row.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|line| line.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_extract_metadata_from_header_lines() {
        let table = rows(&[
            &["1-Wire/iButton Part Number: DS1921G"],
            &["Sample Rate: 60 minute(s)"],
            &["High Temperature Alarm: 40.0°C"],
            &["Low Temperature Alarm: -10.0°C"],
            &["Date/Time", "Unit", "Value"],
            &["01/01/24 00:00:00", "C", "21.5"],
        ]);
        let meta = extract_metadata(&table).unwrap();
        assert_eq!(meta.sample_rate_minutes, 60);
        assert_eq!(meta.unit, "°C");
    }

    #[test]
    fn test_extract_metadata_tokens_in_any_cell() {
        let table = rows(&[
            &["01/01/24 00:00:00", "F", "70.1", "Low Temperature Alarm: 32 °F"],
            &["x", "y", "Mission Sample Rate: 15 minute(s)"],
        ]);
        let meta = extract_metadata(&table).unwrap();
        assert_eq!(meta.sample_rate_minutes, 15);
        assert_eq!(meta.unit, "°F");
    }

    #[test]
    fn test_sample_rate_cell_without_digits_keeps_scanning() {
        let table = rows(&[
            &["Sample Rate: unknown"],
            &["Sample Rate: 30 minute(s)"],
        ]);
        assert_eq!(extract_sample_rate(&table).unwrap(), 30);
    }

    #[test]
    fn test_sample_rate_first_match_wins() {
        let table = rows(&[&["Sample Rate: 5 minute(s)"], &["Sample Rate: 10 minute(s)"]]);
        assert_eq!(extract_sample_rate(&table).unwrap(), 5);
    }

    #[test]
    fn test_sample_rate_missing() {
        let table = rows(&[&["High Temperature Alarm: 40.0°C"]]);
        let err = extract_metadata(&table).unwrap_err();
        assert!(matches!(err, MetadataError::NotFound("Sample rate")));
    }

    #[test]
    fn test_unit_missing() {
        let table = rows(&[&["Sample Rate: 60 minute(s)"], &["High Temperature Alarm: off"]]);
        let err = extract_metadata(&table).unwrap_err();
        assert!(matches!(err, MetadataError::NotFound("Units")));
        assert_eq!(err.to_string(), "Units not found");
    }

    #[test]
    fn test_unit_ignores_degrees_outside_alarm_cells() {
        let table = rows(&[&["Ambient 20°F"], &["High Temperature Alarm: 40.0°C"]]);
        assert_eq!(extract_unit(&table).unwrap(), "°C");
    }

    #[test]
    fn test_unit_signed_threshold() {
        let table = rows(&[&["Low Temperature Alarm: -12.25°C"]]);
        assert_eq!(extract_unit(&table).unwrap(), "°C");
    }
}
