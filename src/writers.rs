// ! Output writers for assembled reports

pub mod xlsx_writer;

pub use xlsx_writer::{report_to_buffer, save_report, WriteError, WriteSummary};
