mod common;

use common::{export_csv, export_csv_latin1, write_file, EXPORT_HEADER};
use ibutton_report::ibutton::extract_metadata;
use ibutton_report::importers::{CsvImportError, CsvImporter};
use tempfile::TempDir;

#[test]
fn test_discover_sorts_and_filters() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "mouse_b.csv", export_csv(2, 20.0));
    write_file(dir.path(), "mouse_a.CSV", export_csv(2, 20.0));
    write_file(dir.path(), "notes.txt", "not an export");
    write_file(dir.path(), "ibuttons.config", "{}");
    std::fs::create_dir(dir.path().join("archive.csv")).unwrap();

    let files = CsvImporter::new(dir.path()).discover().unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["mouse_a.CSV", "mouse_b.csv"]);
}

#[test]
fn test_discover_empty_directory() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "ibuttons.config", "{}");

    let result = CsvImporter::new(dir.path()).discover();
    assert!(matches!(result, Err(CsvImportError::NoCsvFiles(_))));
}

#[test]
fn test_read_table_keys_by_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "cage 3.csv", export_csv(3, 20.0));

    let table = CsvImporter::read_table(&path).unwrap();
    assert_eq!(table.key, "cage 3");
    assert_eq!(table.rows.len(), EXPORT_HEADER.len() + 1 + 3);
    assert_eq!(table.rows[0], vec!["1-Wire/iButton Part Number: DS1921G-F5"]);
    assert_eq!(
        table.rows[EXPORT_HEADER.len() + 1],
        vec!["01/01/24 00:00:00", "C", "20"]
    );
}

#[test]
fn test_read_table_decodes_latin1() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "legacy.csv", export_csv_latin1(3, 20.0));

    let table = CsvImporter::read_table(&path).unwrap();
    let meta = extract_metadata(&table.rows).unwrap();
    assert_eq!(meta.unit, "°C");
    assert_eq!(meta.sample_rate_minutes, 60);
}

#[test]
fn test_read_table_blank_lines_keep_row_numbers() {
    let dir = TempDir::new().unwrap();
    let text = "Sample Rate: 60 minute(s)\n\nHigh Temperature Alarm: 40.0°C\n\n\nDate/Time,Unit,Value\n01/01/24 00:00:00,C,20.5\n";
    let path = write_file(dir.path(), "gaps.csv", text);

    let table = CsvImporter::read_table(&path).unwrap();
    assert_eq!(table.rows.len(), 7);
    assert!(table.rows[1].is_empty());
    assert_eq!(table.rows[2], vec!["High Temperature Alarm: 40.0°C"]);
    assert!(table.rows[3].is_empty());
    assert!(table.rows[4].is_empty());
    assert_eq!(table.rows[6], vec!["01/01/24 00:00:00", "C", "20.5"]);
}

#[test]
fn test_read_table_blank_lines_with_crlf() {
    let dir = TempDir::new().unwrap();
    let text = "Sample Rate: 60 minute(s)\r\n\r\nHigh Temperature Alarm: 40.0°C\r\n\r\n\r\nDate/Time,Unit,Value\r\n01/01/24 00:00:00,C,20.5\r\n";
    let path = write_file(dir.path(), "gaps_crlf.csv", text);

    let table = CsvImporter::read_table(&path).unwrap();
    assert_eq!(table.rows.len(), 7);
    assert_eq!(table.rows[0], vec!["Sample Rate: 60 minute(s)"]);
    assert!(table.rows[1].is_empty());
    assert_eq!(table.rows[2], vec!["High Temperature Alarm: 40.0°C"]);
    assert!(table.rows[3].is_empty());
    assert!(table.rows[4].is_empty());
    assert_eq!(table.rows[5], vec!["Date/Time", "Unit", "Value"]);
    assert_eq!(table.rows[6], vec!["01/01/24 00:00:00", "C", "20.5"]);
}

#[test]
fn test_read_table_quoted_field_spanning_lines_is_one_row() {
    let dir = TempDir::new().unwrap();
    let text = "\"Mission\nNotes\",x\n\n01/01/24 00:00:00,C,20.5\n";
    let path = write_file(dir.path(), "quoted.csv", text);

    let table = CsvImporter::read_table(&path).unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0], vec!["Mission\nNotes", "x"]);
    assert!(table.rows[1].is_empty());
    assert_eq!(table.rows[2], vec!["01/01/24 00:00:00", "C", "20.5"]);
}

#[test]
fn test_read_all_reads_every_export() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "b.csv", export_csv(1, 20.0));
    write_file(dir.path(), "a.csv", export_csv(2, 20.0));

    let tables = CsvImporter::new(dir.path()).read_all().unwrap();
    let keys: Vec<&str> = tables.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
}
