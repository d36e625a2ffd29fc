#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Header lines of a logger export, before the column header
pub const EXPORT_HEADER: &[&str] = &[
    "1-Wire/iButton Part Number: DS1921G-F5",
    "1-Wire/iButton Registration Number: 5F0000002A3B1C21",
    "Mission Start: 01/01/24 00:00:00",
    "Sample Rate: Every 60 minute(s)",
    "High Temperature Alarm: 40.0°C",
    "Low Temperature Alarm: -10.0°C",
];

/// 1-based row of the first reading in `export_csv` output
pub const FIRST_READING_ROW: usize = EXPORT_HEADER.len() + 2;

/// Settings JSON selecting `count` readings starting at the first one
pub fn settings_json(count: usize, repeat_last_value: bool, days: &str) -> String {
    format!(
        r#"{{"StartRow": {}, "EndRow": {}, "RepeatLastValue": {}, "DaysToProcess": {}}}"#,
        FIRST_READING_ROW,
        FIRST_READING_ROW + count - 1,
        repeat_last_value,
        days
    )
}

/// A logger export with `count` hourly readings; reading `i` is `base + i % 5`
pub fn export_csv(count: usize, base: f64) -> String {
    let mut text = String::new();
    for line in EXPORT_HEADER {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("Date/Time,Unit,Value\n");
    for i in 0..count {
        text.push_str(&format!(
            "{:02}/01/24 {:02}:00:00,C,{}\n",
            1 + i / 24,
            i % 24,
            base + (i % 5) as f64
        ));
    }
    text
}

/// Same export as `export_csv`, encoded as Latin-1
pub fn export_csv_latin1(count: usize, base: f64) -> Vec<u8> {
    export_csv(count, base)
        .chars()
        .map(|c| u8::try_from(u32::from(c)).expect("export text is Latin-1"))
        .collect()
}

pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture file");
    path
}
