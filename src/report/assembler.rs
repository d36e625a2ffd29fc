/// Report assembly
///
/// Runs the stages of one report in a fixed order:
/// 1. Ingest: metadata and readings from every table
/// 2. Validate: one sample rate and one unit across the batch
/// 3. Select days: resolve the day directive against the day count
/// 4. Partition and write raw: one sheet per subject
/// 5. Compute averages: the "Group Average" sheet, unless skipped
///
/// Each stage consumes the previous one, so a stage cannot run twice or out
/// of order.
use chrono::{Duration, NaiveTime};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use crate::config::Settings;
use crate::ibutton::{
    extract_metadata, extract_readings, parse_time_of_day, Reading, RowWarning, SubjectTable,
};
use crate::report::consistency::validate_consistent;
use crate::report::day_partitioner::{partition, records_per_day};
use crate::report::day_selector::{resolve, total_days, DaySelection};
use crate::report::error::ReportError;
use crate::report::formula_builder::{
    per_hour_group_formula, per_subject_hour_formula, DAY_COLUMN_OFFSET,
};
use crate::report::write_plan::{validate_sheet_name, SheetPlan, WritePlan};

pub const GROUP_AVERAGE_SHEET: &str = "Group Average";

// Subject sheet layout (1-based)
const TITLE_ROW: u32 = 1;
const UNITS_ROW: u32 = 2;
const HEADER_ROW: u32 = 3;
const FIRST_DATA_ROW: u32 = 4;
const TIMESTAMP_COL: u32 = 1;
const VALUE_COL: u32 = 2;
const FIRST_DAY_COL: u32 = DAY_COLUMN_OFFSET as u32 + 1;

// Group Average sheet layout (1-based)
const TIME_COL: u32 = 1;
const FIRST_SUBJECT_COL: u32 = 2;
const FIRST_SLOT_ROW: u32 = 2;

/// Readings of one subject, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDataset {
    pub key: String,
    pub readings: Vec<Reading>,
}

/// Finished report and the facts it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledReport {
    pub plan: WritePlan,
    pub warnings: Vec<RowWarning>,
    pub sample_rate_minutes: u32,
    pub unit: String,
    pub records_per_day: usize,
    pub total_days: u32,
    /// Days fed into the averages, `None` when averaging was skipped
    pub averaged_days: Option<Vec<u32>>,
}

/// Batch-wide values fixed by validation
#[derive(Debug, Clone)]
struct Calibration {
    sample_rate_minutes: u32,
    unit: String,
    records_per_day: usize,
}

pub struct ReportAssembler {
    settings: Settings,
}

impl ReportAssembler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run every stage and return the finished report
    pub fn assemble(self, tables: Vec<SubjectTable>) -> Result<AssembledReport, ReportError> {
        self.ingest(tables)?
            .validate()?
            .select_days()?
            .partition_and_write_raw()?
            .compute_averages()
    }

    /// Extract metadata and readings from every table, in input order
    #[instrument(skip_all, fields(files = tables.len()))]
    pub fn ingest(self, tables: Vec<SubjectTable>) -> Result<Ingested, ReportError> {
        if tables.is_empty() {
            return Err(ReportError::NoSubjects);
        }
        check_subject_keys(&tables)?;

        let mut ingested = Ingested {
            settings: self.settings,
            subjects: Vec::with_capacity(tables.len()),
            sample_rates: Vec::with_capacity(tables.len()),
            units: Vec::with_capacity(tables.len()),
            warnings: Vec::new(),
        };

        for table in tables {
            let metadata =
                extract_metadata(&table.rows).map_err(|source| ReportError::Metadata {
                    subject: table.key.clone(),
                    source,
                })?;
            let extraction = extract_readings(
                &table.key,
                &table.rows,
                ingested.settings.start_row,
                ingested.settings.end_row,
            );
            debug!(
                "Ingested {}: {} readings, sample rate {} min, unit {}",
                table.key,
                extraction.readings.len(),
                metadata.sample_rate_minutes,
                metadata.unit
            );

            ingested.sample_rates.push(metadata.sample_rate_minutes);
            ingested.units.push(metadata.unit);
            ingested.warnings.extend(extraction.warnings);
            ingested.subjects.push(SubjectDataset {
                key: table.key,
                readings: extraction.readings,
            });
        }

        info!("Ingested {} subjects", ingested.subjects.len());
        Ok(ingested)
    }
}

/// Output of the ingest stage
#[derive(Debug)]
pub struct Ingested {
    settings: Settings,
    subjects: Vec<SubjectDataset>,
    sample_rates: Vec<u32>,
    units: Vec<String>,
    warnings: Vec<RowWarning>,
}

impl Ingested {
    pub fn subjects(&self) -> &[SubjectDataset] {
        &self.subjects
    }

    pub fn warnings(&self) -> &[RowWarning] {
        &self.warnings
    }

    /// Require one sample rate and one unit across all subjects
    #[instrument(skip_all)]
    pub fn validate(self) -> Result<Validated, ReportError> {
        let sample_rate_minutes = validate_consistent("sample rates", &self.sample_rates)?;
        let unit = validate_consistent("units", &self.units)?;
        let records_per_day = records_per_day(sample_rate_minutes)?;

        info!(
            "Batch sample rate {} min ({} records per day), unit {}",
            sample_rate_minutes, records_per_day, unit
        );

        Ok(Validated {
            settings: self.settings,
            subjects: self.subjects,
            warnings: self.warnings,
            calibration: Calibration {
                sample_rate_minutes,
                unit,
                records_per_day,
            },
        })
    }
}

/// Output of the validate stage
#[derive(Debug)]
pub struct Validated {
    settings: Settings,
    subjects: Vec<SubjectDataset>,
    warnings: Vec<RowWarning>,
    calibration: Calibration,
}

impl Validated {
    pub fn sample_rate_minutes(&self) -> u32 {
        self.calibration.sample_rate_minutes
    }

    pub fn unit(&self) -> &str {
        &self.calibration.unit
    }

    pub fn records_per_day(&self) -> usize {
        self.calibration.records_per_day
    }

    /// Resolve the day directive against the days covered by the row window
    #[instrument(skip_all)]
    pub fn select_days(self) -> Result<DaysSelected, ReportError> {
        let total_days = total_days(
            self.settings.selected_rows(),
            self.calibration.records_per_day,
        )?;
        let selection = resolve(&self.settings.days_to_process, total_days)?;

        match &selection {
            DaySelection::Skip => info!("Averaging skipped ({} days available)", total_days),
            DaySelection::Days(days) => {
                info!("Averaging days {:?} of {}", days, total_days)
            }
        }

        Ok(DaysSelected {
            settings: self.settings,
            subjects: self.subjects,
            warnings: self.warnings,
            calibration: self.calibration,
            total_days,
            selection,
        })
    }
}

/// Output of the day selection stage
#[derive(Debug)]
pub struct DaysSelected {
    settings: Settings,
    subjects: Vec<SubjectDataset>,
    warnings: Vec<RowWarning>,
    calibration: Calibration,
    total_days: u32,
    selection: DaySelection,
}

impl DaysSelected {
    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn selection(&self) -> &DaySelection {
        &self.selection
    }

    /// Emit one sheet per subject: raw readings, then one column per day
    #[instrument(skip_all)]
    pub fn partition_and_write_raw(self) -> Result<Partitioned, ReportError> {
        let mut plan = WritePlan::new();

        for subject in &self.subjects {
            let sheet = self.subject_sheet(subject)?;
            debug!("Sheet {}: {} cells", sheet.name, sheet.cells().len());
            plan.push(sheet)?;
        }

        Ok(Partitioned {
            subjects: self.subjects,
            warnings: self.warnings,
            calibration: self.calibration,
            total_days: self.total_days,
            selection: self.selection,
            plan,
        })
    }

    fn subject_sheet(&self, subject: &SubjectDataset) -> Result<SheetPlan, ReportError> {
        let mut sheet = SheetPlan::new(subject.key.as_str());

        sheet.write(TITLE_ROW, TIMESTAMP_COL, "Original CSV values")?;
        sheet.write(
            UNITS_ROW,
            TIMESTAMP_COL,
            format!("Units: {}", self.calibration.unit),
        )?;
        sheet.write(HEADER_ROW, TIMESTAMP_COL, "Date/Time")?;
        sheet.write(HEADER_ROW, VALUE_COL, "Value")?;

        for (row, reading) in (FIRST_DATA_ROW..).zip(&subject.readings) {
            sheet.write(row, TIMESTAMP_COL, reading.timestamp.as_str())?;
            sheet.write(row, VALUE_COL, reading.value)?;
        }

        let days = partition(
            &subject.readings,
            self.calibration.records_per_day,
            self.settings.repeat_last_value,
        );

        sheet.write(TITLE_ROW, FIRST_DAY_COL, "Processed values")?;
        for ((day_number, col), day) in (1u32..).zip(FIRST_DAY_COL..).zip(&days) {
            sheet.write(HEADER_ROW, col, format!("Day {day_number}"))?;
            for (row, value) in (FIRST_DATA_ROW..).zip(day.values()) {
                sheet.write(row, col, value)?;
            }
        }

        if let DaySelection::Days(selected) = &self.selection {
            let missing: Vec<u32> = selected
                .iter()
                .copied()
                .filter(|&day| day as usize > days.len())
                .collect();
            if !missing.is_empty() {
                warn!(
                    "{} has {} day(s) of data; days {:?} will average empty cells",
                    subject.key,
                    days.len(),
                    missing
                );
            }
        }

        Ok(sheet)
    }
}

/// Output of the partition stage
#[derive(Debug)]
pub struct Partitioned {
    subjects: Vec<SubjectDataset>,
    warnings: Vec<RowWarning>,
    calibration: Calibration,
    total_days: u32,
    selection: DaySelection,
    plan: WritePlan,
}

impl Partitioned {
    pub fn plan(&self) -> &WritePlan {
        &self.plan
    }

    /// Emit the "Group Average" sheet when days were selected
    #[instrument(skip_all)]
    pub fn compute_averages(mut self) -> Result<AssembledReport, ReportError> {
        let averaged_days = match &self.selection {
            DaySelection::Skip => None,
            DaySelection::Days(days) => {
                let sheet = self.group_average_sheet(days)?;
                self.plan.push(sheet)?;
                Some(days.clone())
            }
        };

        info!(
            "Report assembled: {} sheets, {} cells, {} skipped rows",
            self.plan.sheets().len(),
            self.plan.cell_count(),
            self.warnings.len()
        );

        Ok(AssembledReport {
            plan: self.plan,
            warnings: self.warnings,
            sample_rate_minutes: self.calibration.sample_rate_minutes,
            unit: self.calibration.unit,
            records_per_day: self.calibration.records_per_day,
            total_days: self.total_days,
            averaged_days,
        })
    }

    fn group_average_sheet(&self, days: &[u32]) -> Result<SheetPlan, ReportError> {
        let first_timestamp = self
            .subjects
            .iter()
            .find_map(|s| s.readings.first())
            .map(|r| r.timestamp.as_str())
            .ok_or(ReportError::NoReadings)?;
        let start = parse_time_of_day(first_timestamp)?;

        let mut sheet = SheetPlan::new(GROUP_AVERAGE_SHEET);
        let slot_rows: Vec<u32> = (FIRST_SLOT_ROW..)
            .take(self.calibration.records_per_day)
            .collect();

        sheet.write(TITLE_ROW, TIME_COL, "Time")?;
        for (slot, &row) in slot_rows.iter().enumerate() {
            let label = slot_time(start, self.calibration.sample_rate_minutes, slot);
            sheet.write(row, TIME_COL, label.format("%H:%M").to_string())?;
        }

        for (col, subject) in (FIRST_SUBJECT_COL..).zip(&self.subjects) {
            sheet.write(TITLE_ROW, col, subject.key.as_str())?;
            for (&row, source_row) in slot_rows.iter().zip(FIRST_DATA_ROW..) {
                let formula =
                    per_subject_hour_formula(days, &subject.key, source_row, DAY_COLUMN_OFFSET)?;
                sheet.write_formula(row, col, formula)?;
            }
        }

        let group_col = FIRST_SUBJECT_COL + self.subjects.len() as u32;
        sheet.write(TITLE_ROW, group_col, GROUP_AVERAGE_SHEET)?;
        for &row in &slot_rows {
            sheet.write_formula(row, group_col, per_hour_group_formula(row, group_col)?)?;
        }

        Ok(sheet)
    }
}

/// Time of the `slot`-th reading of a day starting at `start`, wrapping past
/// midnight
fn slot_time(start: NaiveTime, sample_rate_minutes: u32, slot: usize) -> NaiveTime {
    let offset = Duration::minutes(i64::from(sample_rate_minutes) * slot as i64);
    start.overflowing_add_signed(offset).0
}

/// Subject keys become sheet names, so they must be valid and distinct
fn check_subject_keys(tables: &[SubjectTable]) -> Result<(), ReportError> {
    let mut seen = HashSet::new();
    for table in tables {
        validate_sheet_name(&table.key)?;
        let folded = table.key.to_lowercase();
        if folded == GROUP_AVERAGE_SHEET.to_lowercase() {
            return Err(ReportError::InvalidSheetName {
                name: table.key.clone(),
                reason: "reserved for the group average sheet",
            });
        }
        if !seen.insert(folded) {
            return Err(ReportError::InvalidSheetName {
                name: table.key.clone(),
                reason: "duplicate sheet name",
            });
        }
    }
    Ok(())
}
