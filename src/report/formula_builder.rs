use crate::report::column_codec::column_label;
use crate::report::error::ReportError;

/// Columns A-C of a subject sheet hold the timestamp, the value and a blank
/// separator, so day N lives in column N + 3
pub const DAY_COLUMN_OFFSET: i64 = 3;

/// Sheet name as it must appear in a cross-sheet reference
///
/// Plain identifiers are used as is; anything else is single-quoted with
/// embedded quotes doubled (`O'Neil 2` → `'O''Neil 2'`).
pub fn sheet_reference(sheet: &str) -> String {
    let plain = !sheet.is_empty()
        && !sheet.starts_with(|c: char| c.is_ascii_digit())
        && sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !looks_like_cell(sheet);

    if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Names that read as an `A1` or `R1C1` cell reference (`B12`, `R2C3`, `RC`,
/// `R`, `C`)
fn looks_like_cell(name: &str) -> bool {
    let letters = name.chars().take_while(char::is_ascii_alphabetic).count();
    let digits = &name[letters..];
    let a1 = (1..=3).contains(&letters)
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit());

    let (row_marker, rest) = strip_r1c1_part(name, 'R');
    let (col_marker, rest) = strip_r1c1_part(rest, 'C');
    let r1c1 = (row_marker || col_marker) && rest.is_empty();

    a1 || r1c1
}

/// Strip a leading `marker` (any case) and the digits after it
fn strip_r1c1_part(name: &str, marker: char) -> (bool, &str) {
    match name.strip_prefix(|c: char| c.eq_ignore_ascii_case(&marker)) {
        Some(rest) => (true, rest.trim_start_matches(|c: char| c.is_ascii_digit())),
        None => (false, name),
    }
}

/// Average of one hour slot across the selected days of one subject sheet
///
/// `AVERAGE(probe!D4,probe!E4)` for days [1, 2] at row 4 with offset 3.
pub fn per_subject_hour_formula(
    days: &[u32],
    sheet: &str,
    row: u32,
    column_offset: i64,
) -> Result<String, ReportError> {
    let sheet = sheet_reference(sheet);
    let operands = days
        .iter()
        .map(|&day| {
            column_label(i64::from(day), column_offset).map(|col| format!("{sheet}!{col}{row}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("AVERAGE({})", operands.join(",")))
}

/// Average of one summary row, from column A up to the column just before
/// `output_column`
///
/// Column A holds the time axis as text, which AVERAGE skips.
pub fn per_hour_group_formula(row: u32, output_column: u32) -> Result<String, ReportError> {
    let last = column_label(i64::from(output_column) - 1, 0)?;
    Ok(format!("AVERAGE(A{row}:{last}{row})"))
}
