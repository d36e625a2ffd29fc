use std::collections::HashSet;

use crate::report::error::ReportError;

/// Longest sheet name a workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Content of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Formula text without the leading `=`
    Formula(String),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// A single cell write; row and column are 1-based
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
}

/// Ordered writes targeting one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub name: String,
    cells: Vec<CellWrite>,
    occupied: HashSet<(u32, u32)>,
}

impl SheetPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            occupied: HashSet::new(),
        }
    }

    /// Append a write; a second write to the same cell is rejected
    pub fn write(
        &mut self,
        row: u32,
        col: u32,
        value: impl Into<CellValue>,
    ) -> Result<(), ReportError> {
        if !self.occupied.insert((row, col)) {
            return Err(ReportError::DuplicateCell {
                sheet: self.name.clone(),
                row,
                col,
            });
        }
        self.cells.push(CellWrite {
            row,
            col,
            value: value.into(),
        });
        Ok(())
    }

    pub fn write_formula(&mut self, row: u32, col: u32, formula: String) -> Result<(), ReportError> {
        self.write(row, col, CellValue::Formula(formula))
    }

    pub fn cells(&self) -> &[CellWrite] {
        &self.cells
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.col == col)
            .map(|c| &c.value)
    }

    /// Values written to one column, in row order
    pub fn column(&self, col: u32) -> Vec<(u32, &CellValue)> {
        let mut column: Vec<(u32, &CellValue)> = self
            .cells
            .iter()
            .filter(|c| c.col == col)
            .map(|c| (c.row, &c.value))
            .collect();
        column.sort_by_key(|(row, _)| *row);
        column
    }

    pub fn max_column(&self) -> u32 {
        self.cells.iter().map(|c| c.col).max().unwrap_or(0)
    }
}

/// Every sheet of a report, in output order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WritePlan {
    sheets: Vec<SheetPlan>,
}

impl WritePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sheet: SheetPlan) -> Result<(), ReportError> {
        if self
            .sheets
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&sheet.name))
        {
            return Err(ReportError::InvalidSheetName {
                name: sheet.name,
                reason: "duplicate sheet name",
            });
        }
        self.sheets.push(sheet);
        Ok(())
    }

    pub fn sheets(&self) -> &[SheetPlan] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetPlan> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn cell_count(&self) -> usize {
        self.sheets.iter().map(|s| s.cells.len()).sum()
    }
}

/// Check a name against the workbook sheet naming rules
pub fn validate_sheet_name(name: &str) -> Result<(), ReportError> {
    let reason = if name.is_empty() {
        Some("empty name")
    } else if name.chars().count() > MAX_SHEET_NAME_LEN {
        Some("longer than 31 characters")
    } else if name.contains(FORBIDDEN_SHEET_CHARS) {
        Some("contains one of [ ] : * ? / \\")
    } else if name.starts_with('\'') || name.ends_with('\'') {
        Some("starts or ends with an apostrophe")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ReportError::InvalidSheetName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
