// Report module
//
// Turns parsed logger exports into a write plan for the consolidated workbook:
// - One sheet per subject: raw readings, then readings split into
//   experimental days
// - A "Group Average" sheet of AVERAGE formulas over the selected days
//
// Formulas are generated as text; the spreadsheet application evaluates them.

pub mod assembler;
pub mod column_codec;
pub mod consistency;
pub mod day_partitioner;
pub mod day_selector;
pub mod error;
pub mod formula_builder;
pub mod write_plan;

pub use assembler::{AssembledReport, ReportAssembler, SubjectDataset, GROUP_AVERAGE_SHEET};
pub use day_partitioner::ExperimentalDay;
pub use day_selector::{DayDirective, DaySelection, SelectionError};
pub use error::ReportError;
pub use write_plan::{CellValue, CellWrite, SheetPlan, WritePlan};
