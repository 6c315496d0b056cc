use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use dv_entry::calendar::{
    ethiopian_to_gregorian, format_ethiopian_date, gregorian_to_ethiopian, EthiopianDate,
};
use dv_entry::config::AppConfig;
use dv_entry::error::AppError;
use dv_entry::telemetry;
use dv_entry::wizard::draft::{DraftStore, FileKvStore};
use dv_entry::wizard::validation::reference::ReferenceData;
use dv_entry::wizard::validation::steps::validate_complete_form;

#[derive(Parser, Debug)]
#[command(
    name = "DV Entry Wizard",
    about = "Inspect and validate diversity-visa entry drafts from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a persisted draft against the complete-form rule set
    Validate(ValidateArgs),
    /// Convert dates between the Ethiopian and Gregorian calendars
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Path to the draft store file (defaults to DV_DRAFT_PATH)
    #[arg(long)]
    draft: Option<PathBuf>,
    /// Evaluation date for age and expiry rules (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// Convert a Gregorian date (YYYY-MM-DD) to the Ethiopian calendar
    ToEthiopian {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Convert an Ethiopian year/month/day to the Gregorian calendar
    ToGregorian { year: i32, month: u32, day: u32 },
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Validate(args) => run_validate(args, &config),
        Command::Calendar { command } => run_calendar(command),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn run_validate(args: ValidateArgs, config: &AppConfig) -> Result<(), AppError> {
    let path = args
        .draft
        .unwrap_or_else(|| config.storage.draft_path.clone());
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let reference = match &config.reference.countries_csv {
        Some(csv_path) => ReferenceData::from_csv_path(csv_path)?,
        None => ReferenceData::default(),
    };

    let store = DraftStore::new(FileKvStore::open(&path)?);
    let Some(form) = store.load()? else {
        println!("No draft found at {}", path.display());
        return Ok(());
    };

    println!(
        "Draft {} (step {}: {})",
        form.form_id.0,
        form.current_step.index(),
        form.current_step.label()
    );

    let report = validate_complete_form(&form, today, &reference);
    if report.is_valid() {
        println!("Complete-form validation passed; the entry is ready to submit.");
    } else {
        println!("\n{} validation error(s):", report.errors.len());
        for error in &report.errors {
            println!("- {}: {}", error.field, error.message);
        }
    }
    if !report.warnings.is_empty() {
        println!("\n{} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("- {}: {}", warning.field, warning.message);
        }
    }

    Ok(())
}

fn run_calendar(command: CalendarCommand) -> Result<(), AppError> {
    match command {
        CalendarCommand::ToEthiopian { date } => match gregorian_to_ethiopian(date) {
            Ok(ethiopian) => {
                println!(
                    "{date} = {} ({}-{:02}-{:02} EC)",
                    format_ethiopian_date(ethiopian),
                    ethiopian.year,
                    ethiopian.month,
                    ethiopian.day
                );
            }
            Err(err) => println!("Cannot convert {date}: {err}"),
        },
        CalendarCommand::ToGregorian { year, month, day } => {
            let ethiopian = EthiopianDate::new(year, month, day);
            match ethiopian_to_gregorian(ethiopian) {
                Ok(gregorian) => {
                    println!("{} = {gregorian}", format_ethiopian_date(ethiopian));
                }
                Err(err) => println!("Cannot convert: {err}"),
            }
        }
    }
    Ok(())
}
