use csv::ReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::ibutton::SubjectTable;
use crate::utils::{decode_text, subject_key};

#[derive(Error, Debug)]
pub enum CsvImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid file name: {0}")]
    InvalidFileName(PathBuf),

    #[error("No CSV files found in {0}")]
    NoCsvFiles(PathBuf),
}

/// Reader for a directory of iButton CSV exports
pub struct CsvImporter {
    input_dir: PathBuf,
}

impl CsvImporter {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// List the `.csv` files of the input directory (extension matched
    /// case-insensitively), sorted by file name
    pub fn discover(&self) -> Result<Vec<PathBuf>, CsvImportError> {
        let io_err = |source| CsvImportError::Io {
            path: self.input_dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.input_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(CsvImportError::NoCsvFiles(self.input_dir.clone()));
        }

        files.sort();
        info!(
            "Found {} CSV files in {}",
            files.len(),
            self.input_dir.display()
        );
        Ok(files)
    }

    /// Read every discovered file, in file name order
    pub fn read_all(&self) -> Result<Vec<SubjectTable>, CsvImportError> {
        self.discover()?
            .iter()
            .map(|path| Self::read_table(path))
            .collect()
    }

    /// Read one export into a row-table keyed by its file stem
    ///
    /// Records may have any number of fields; header lines of an export are
    /// usually shorter than its data lines. A blank line is an empty row, so
    /// row `i` of the table is line `i + 1` of the file unless a quoted field
    /// spans lines.
    pub fn read_table(path: &Path) -> Result<SubjectTable, CsvImportError> {
        let key =
            subject_key(path).map_err(|_| CsvImportError::InvalidFileName(path.to_path_buf()))?;
        let bytes = fs::read(path).map_err(|source| CsvImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = decode_text(bytes);

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut pending = String::new();
        for line in text.lines() {
            // Blank lines yield no record but still count as rows
            if pending.is_empty() && line.is_empty() {
                rows.push(Vec::new());
                continue;
            }

            if !pending.is_empty() {
                pending.push('\n');
            }
            pending.push_str(line);

            // An odd number of quotes means a quoted field continues on the
            // next line
            if pending.matches('"').count() % 2 == 0 {
                rows.push(parse_record(path, &pending)?);
                pending.clear();
            }
        }
        if !pending.is_empty() {
            rows.push(parse_record(path, &pending)?);
        }

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(SubjectTable::new(key, rows))
    }
}

/// Parse one complete record; fields may be quoted and counts vary by line
fn parse_record(path: &Path, record_text: &str) -> Result<Vec<String>, CsvImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(record_text.as_bytes());

    match reader.records().next() {
        Some(record) => record
            .map(|r| r.iter().map(str::to_string).collect())
            .map_err(|source| CsvImportError::Csv {
                path: path.to_path_buf(),
                source,
            }),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_importer_creation() {
        let importer = CsvImporter::new("/data/run1");
        assert_eq!(importer.input_dir(), Path::new("/data/run1"));
    }

    #[test]
    fn test_discover_missing_directory() {
        let importer = CsvImporter::new("/nonexistent/ibuttons");
        assert!(matches!(
            importer.discover(),
            Err(CsvImportError::Io { .. })
        ));
    }
}
