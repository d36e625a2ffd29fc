use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ibutton_report::config::{Settings, SETTINGS_FILE_NAME};
use ibutton_report::importers::CsvImporter;
use ibutton_report::report::{AssembledReport, ReportAssembler};
use ibutton_report::writers::save_report;

const DEFAULT_OUTPUT_NAME: &str = "ibuttons_macro.xlsx";

#[derive(Parser, Debug)]
#[command(name = "ibutton-report")]
#[command(about = "Consolidate iButton temperature exports into one workbook with daily averages", long_about = None)]
struct Cli {
    /// Directory holding the logger CSV exports
    #[arg(long, env = "IBUTTONS_INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Settings file (defaults to ibuttons.config in the input directory)
    #[arg(long, env = "IBUTTONS_SETTINGS")]
    settings: Option<PathBuf>,

    /// Output workbook (defaults to ibuttons_macro.xlsx in the input directory)
    #[arg(long, env = "IBUTTONS_OUTPUT")]
    output: Option<PathBuf>,

    /// Assemble the report and print the summary without writing the workbook
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ibutton_report=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[instrument(skip_all)]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();

    let settings_path = cli
        .settings
        .unwrap_or_else(|| cli.input_dir.join(SETTINGS_FILE_NAME));
    let output_path = cli
        .output
        .unwrap_or_else(|| cli.input_dir.join(DEFAULT_OUTPUT_NAME));

    // Settings are validated before any CSV is opened
    let settings = Settings::from_file(&settings_path)?;

    let importer = CsvImporter::new(&cli.input_dir);
    let files = importer.discover()?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut tables = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name);
        tables.push(CsvImporter::read_table(path)?);
        pb.inc(1);
    }
    pb.finish_with_message(format!("✓ Read {} files", tables.len()));

    let report = ReportAssembler::new(settings).assemble(tables)?;

    if cli.dry_run {
        info!("Dry run, not writing {}", output_path.display());
    } else {
        save_report(&report.plan, &output_path)?;
    }

    print_summary(&report, &output_path, cli.dry_run);
    info!("Finished in {:.2?}", started.elapsed());
    Ok(())
}

fn print_summary(report: &AssembledReport, output_path: &std::path::Path, dry_run: bool) {
    println!("\n{}", "=".repeat(60));
    println!("Report summary");
    println!("{}", "=".repeat(60));
    println!("Sheets:          {}", report.plan.sheets().len());
    println!("Sample rate:     {} minutes", report.sample_rate_minutes);
    println!("Units:           {}", report.unit);
    println!("Records per day: {}", report.records_per_day);
    println!("Total days:      {}", report.total_days);
    match &report.averaged_days {
        Some(days) => {
            let days: Vec<String> = days.iter().map(u32::to_string).collect();
            println!("Averaged days:   {}", days.join(", "));
        }
        None => println!("Averaged days:   none (averaging skipped)"),
    }

    if report.warnings.is_empty() {
        println!("Skipped rows:    0");
    } else {
        println!("Skipped rows:    {}", report.warnings.len());
        for warning in &report.warnings {
            println!(
                "  {} row {}: {}",
                warning.subject, warning.row, warning.reason
            );
        }
    }

    if dry_run {
        println!("Output:          (dry run, nothing written)");
    } else {
        println!("Output:          {}", output_path.display());
    }
    println!("{}", "=".repeat(60));
}
