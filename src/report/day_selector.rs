use crate::config::DaysToProcess;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("DaysToProcess must be \"All\", \"None\" or a list of day numbers, got \"{0}\"")]
    InvalidDirective(String),

    #[error("DaysToProcess list is empty")]
    EmptyDayList,

    #[error("Days {requested:?} are outside the {total_days} experimental day(s) available")]
    OutOfRange { requested: Vec<u32>, total_days: u32 },

    #[error("Row window spans {days} experimental days; at most {max} fit in a worksheet")]
    TooManyDays { days: usize, max: u32 },
}

/// Day N sits in column N + 3 of a subject sheet and XFD (16384) is the last
/// worksheet column
pub const MAX_DAYS: u32 = 16_384 - 3;

/// Which experimental days feed the averaging step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayDirective {
    Skip,
    AllDays,
    ExplicitDays(Vec<u32>),
}

impl TryFrom<DaysToProcess> for DayDirective {
    type Error = SelectionError;

    fn try_from(value: DaysToProcess) -> Result<Self, Self::Error> {
        match value {
            DaysToProcess::Keyword(word) if word.eq_ignore_ascii_case("none") => Ok(Self::Skip),
            DaysToProcess::Keyword(word) if word.eq_ignore_ascii_case("all") => Ok(Self::AllDays),
            DaysToProcess::Keyword(word) => Err(SelectionError::InvalidDirective(word)),
            DaysToProcess::Days(days) if days.is_empty() => Err(SelectionError::EmptyDayList),
            DaysToProcess::Days(days) => Ok(Self::ExplicitDays(days)),
        }
    }
}

/// Outcome of resolving a directive against the available days
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySelection {
    Skip,
    /// 1-based day numbers in the order given, duplicates kept
    Days(Vec<u32>),
}

/// Number of experimental days covered by the configured row window
pub fn total_days(selected_rows: usize, records_per_day: usize) -> Result<u32, SelectionError> {
    if records_per_day == 0 {
        return Ok(0);
    }
    let days = selected_rows.div_ceil(records_per_day);
    u32::try_from(days)
        .ok()
        .filter(|&d| d <= MAX_DAYS)
        .ok_or(SelectionError::TooManyDays {
            days,
            max: MAX_DAYS,
        })
}

pub fn resolve(directive: &DayDirective, total_days: u32) -> Result<DaySelection, SelectionError> {
    match directive {
        DayDirective::Skip => Ok(DaySelection::Skip),
        DayDirective::AllDays if total_days == 0 => Err(SelectionError::EmptyDayList),
        DayDirective::AllDays => Ok(DaySelection::Days((1..=total_days).collect())),
        DayDirective::ExplicitDays(days) => {
            let out_of_range: Vec<u32> = days
                .iter()
                .copied()
                .filter(|&day| day == 0 || day > total_days)
                .collect();
            if !out_of_range.is_empty() {
                return Err(SelectionError::OutOfRange {
                    requested: out_of_range,
                    total_days,
                });
            }
            Ok(DaySelection::Days(days.clone()))
        }
    }
}
