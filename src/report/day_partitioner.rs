use crate::ibutton::Reading;
use crate::report::error::ReportError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// One experimental day: a run of consecutive readings
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentalDay {
    pub readings: Vec<Reading>,
    /// The last reading is a copy of the next day's first reading
    pub boundary_copy: bool,
}

impl ExperimentalDay {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().map(|r| r.value)
    }
}

/// Readings taken in 24 hours at the given sample rate
pub fn records_per_day(sample_rate_minutes: u32) -> Result<usize, ReportError> {
    if sample_rate_minutes == 0 || sample_rate_minutes > MINUTES_PER_DAY {
        return Err(ReportError::InvalidSampleRate(sample_rate_minutes));
    }
    Ok((MINUTES_PER_DAY / sample_rate_minutes) as usize)
}

/// Split readings into days of `records_per_day` readings (the last day may
/// be shorter)
///
/// With `repeat_last_value`, every day except the last also ends with the
/// first reading of the following day, so neighbouring days share a sample.
pub fn partition(
    readings: &[Reading],
    records_per_day: usize,
    repeat_last_value: bool,
) -> Vec<ExperimentalDay> {
    if records_per_day == 0 {
        return Vec::new();
    }

    let mut days: Vec<ExperimentalDay> = readings
        .chunks(records_per_day)
        .map(|chunk| ExperimentalDay {
            readings: chunk.to_vec(),
            boundary_copy: false,
        })
        .collect();

    if repeat_last_value {
        for i in 1..days.len() {
            let carried = days[i].readings[0].clone();
            let previous = &mut days[i - 1];
            previous.readings.push(carried);
            previous.boundary_copy = true;
        }
    }

    days
}
