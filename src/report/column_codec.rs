use crate::report::error::ReportError;

/// Convert a 1-based column ordinal plus an offset into a spreadsheet column
/// label (1 → A, 26 → Z, 27 → AA, ...)
///
/// This is bijective base 26: there is no zero digit, so each step borrows one
/// before dividing.
///
/// # Examples
///
/// ```
/// use ibutton_report::report::column_codec::column_label;
///
/// assert_eq!(column_label(1, 0).unwrap(), "A");
/// assert_eq!(column_label(1, 3).unwrap(), "D");
/// assert_eq!(column_label(27, 0).unwrap(), "AA");
/// ```
pub fn column_label(ordinal: i64, offset: i64) -> Result<String, ReportError> {
    let mut n = ordinal + offset;
    if n <= 0 {
        return Err(ReportError::InvalidColumn { ordinal, offset });
    }

    let mut label = Vec::new();
    while n > 0 {
        let remainder = (n - 1) % 26;
        label.push(b'A' + remainder as u8);
        n = (n - 1) / 26;
    }
    label.reverse();

    Ok(String::from_utf8_lossy(&label).into_owned())
}

/// A1-style reference for a 1-based column and row, e.g. (4, 10) → "D10"
pub fn cell_reference(column: u32, row: u32) -> Result<String, ReportError> {
    Ok(format!("{}{row}", column_label(i64::from(column), 0)?))
}
