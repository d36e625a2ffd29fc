use rust_xlsxwriter::{Formula, Workbook, Worksheet, XlsxError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::report::{CellValue, CellWrite, SheetPlan, WritePlan};

/// Last column of an xlsx worksheet (XFD)
const MAX_COLUMNS: u32 = 16_384;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to write sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: XlsxError,
    },

    #[error("Cell ({row}, {col}) of sheet '{sheet}' is outside the worksheet")]
    OutOfBounds { sheet: String, row: u32, col: u32 },

    #[error("Failed to save workbook: {0}")]
    Save(#[from] XlsxError),
}

/// Counts of what was written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub sheets: usize,
    pub cells: usize,
    pub formulas: usize,
}

/// Apply a write plan to a new workbook and save it as `.xlsx`
#[instrument(skip(plan), fields(sheets = plan.sheets().len()))]
pub fn save_report(plan: &WritePlan, path: &Path) -> Result<WriteSummary, WriteError> {
    let mut workbook = build_workbook(plan)?;
    workbook.save(path)?;

    let summary = summarize(plan);
    info!(
        "Saved {} ({} sheets, {} cells, {} formulas)",
        path.display(),
        summary.sheets,
        summary.cells,
        summary.formulas
    );
    Ok(summary)
}

/// Serialize a write plan to an in-memory `.xlsx` file
pub fn report_to_buffer(plan: &WritePlan) -> Result<Vec<u8>, WriteError> {
    let mut workbook = build_workbook(plan)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(plan: &WritePlan) -> Result<Workbook, WriteError> {
    let mut workbook = Workbook::new();

    for sheet in plan.sheets() {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|source| WriteError::Sheet {
                sheet: sheet.name.clone(),
                source,
            })?;
        write_sheet(worksheet, sheet)?;
        debug!("Wrote sheet {} ({} cells)", sheet.name, sheet.cells().len());
    }

    Ok(workbook)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &SheetPlan) -> Result<(), WriteError> {
    for cell in sheet.cells() {
        let (row, col) = zero_based(sheet, cell)?;
        let result = match &cell.value {
            CellValue::Text(text) => worksheet.write_string(row, col, text),
            CellValue::Number(number) => worksheet.write_number(row, col, *number),
            CellValue::Formula(formula) => {
                worksheet.write_formula(row, col, Formula::new(formula.as_str()))
            }
        };
        result.map_err(|source| WriteError::Sheet {
            sheet: sheet.name.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Plan coordinates are 1-based; rust_xlsxwriter uses 0-based u32 rows and
/// u16 columns
fn zero_based(sheet: &SheetPlan, cell: &CellWrite) -> Result<(u32, u16), WriteError> {
    let out_of_bounds = || WriteError::OutOfBounds {
        sheet: sheet.name.clone(),
        row: cell.row,
        col: cell.col,
    };

    if cell.row == 0 || cell.col == 0 || cell.col > MAX_COLUMNS {
        return Err(out_of_bounds());
    }
    let col = u16::try_from(cell.col - 1).map_err(|_| out_of_bounds())?;
    Ok((cell.row - 1, col))
}

fn summarize(plan: &WritePlan) -> WriteSummary {
    let formulas = plan
        .sheets()
        .iter()
        .flat_map(|s| s.cells())
        .filter(|c| matches!(c.value, CellValue::Formula(_)))
        .count();

    WriteSummary {
        sheets: plan.sheets().len(),
        cells: plan.cell_count(),
        formulas,
    }
}
