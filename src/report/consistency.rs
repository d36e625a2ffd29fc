use std::fmt::Display;

use crate::report::error::ReportError;

/// Return the single value shared by every element, or fail naming the
/// distinct values found (in first-seen order)
///
/// `what` names the quantity in the error, e.g. "sample rates".
pub fn validate_consistent<T>(what: &'static str, values: &[T]) -> Result<T, ReportError>
where
    T: PartialEq + Clone + Display,
{
    let first = values.first().ok_or(ReportError::NoSubjects)?;

    if values.iter().all(|v| v == first) {
        return Ok(first.clone());
    }

    let mut distinct: Vec<&T> = Vec::new();
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }

    Err(ReportError::Inconsistent {
        what,
        values: distinct
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
