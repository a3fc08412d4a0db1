use std::process::ExitCode;

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lunar_almanac::date_utils::{parse_date, parse_month};
use lunar_almanac::{AlmanacError, Almanac, Config, DayData, MonthGrid, MoonPhase, WEEKDAY_HEADERS};

#[derive(Debug, Parser)]
#[command(
    name = "lunar_almanac",
    version,
    about = "Moon phase, sidereal sign and tradition labels for calendar days"
)]
struct Cli {
    /// Evaluate dates at local midnight in this UTC offset
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    /// Print cache and timing metrics after the output
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detail for one date, YYYY-MM-DD (defaults to today)
    Day { date: Option<String> },
    /// Calendar grid for a month, YYYY-MM (defaults to this month)
    Month { month: Option<String> },
}

fn init_logging(filter: &str) {
    // Initialize logging with structured format.
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_filter);

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "lunar_almanac failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: Config) -> Result<(), AlmanacError> {
    let config = match cli.utc_offset_minutes {
        Some(minutes) => config.with_utc_offset_minutes(minutes)?,
        None => config,
    };
    let offset = config.utc_offset()?;
    let today = Utc::now().with_timezone(&offset).date_naive();
    let almanac = Almanac::new(&config)?;

    match cli.command.unwrap_or(Command::Day { date: None }) {
        Command::Day { date } => {
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => today,
            };
            info!(%date, "rendering day");
            print_day(&almanac.day(date)?);
        }
        Command::Month { month } => {
            let first = match month {
                Some(raw) => parse_month(&raw)?,
                None => today.with_day0(0).unwrap_or(today),
            };
            info!(month = %first.format("%Y-%m"), "rendering month");
            print_month(&almanac.month(first.year(), first.month())?, today);
        }
    }

    if cli.metrics {
        println!("\n{}", almanac.metrics().report());
    }
    Ok(())
}

fn print_day(data: &DayData) {
    let astro = &data.astro;
    let tradition = &data.tradition;
    let trend = if astro.is_waxing() { "waxing" } else { "waning" };

    println!("📆 Date: {}", astro.date.format("%A, %-d %B %Y"));
    println!(
        "{} Phase: {} ({}% illuminated)",
        astro.phase.glyph(),
        astro.phase,
        astro.illumination_percent
    );
    println!("🌙 Age: {:.1} days ({trend})", astro.age);
    println!(
        "✨ Sidereal Moon: {} {:.2}° ({} sign)",
        astro.zodiac,
        astro.sidereal_longitude,
        astro.zodiac.element().name()
    );
    println!("🔢 Julian Day: {:.4}", astro.julian_day);

    println!("\n📜 Traditions:");
    println!(
        "  Western Name: {} (Post-Medieval)",
        tradition.western_name.unwrap_or("—")
    );
    println!("  Veintena: {} (Solar Reconstruction)", tradition.veintena);
    println!("  Tibetan Lunar Day: Day {}", tradition.tibetan_day);
    println!("  Biodynamic: {} Day", tradition.biodynamic_type);

    println!("\n💬 Commentary:");
    for line in &tradition.commentary {
        println!("  • {line}");
    }
}

fn print_month(grid: &MonthGrid, today: NaiveDate) {
    if let Some(first) = grid.day(1) {
        println!("{}", first.astro.date.format("%B %Y"));
    }

    let header: Vec<String> = WEEKDAY_HEADERS.iter().map(|d| format!("{d:>5}")).collect();
    println!("{}", header.join(" "));

    for week in grid.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                Some(day) => {
                    let marker = if day.astro.date == today { '*' } else { ' ' };
                    format!("{marker}{:>2} {}", day.astro.date.day(), day.astro.phase.glyph())
                }
                None => "     ".to_string(),
            })
            .collect();
        println!("{}", row.join(" "));
    }

    for (phase, title) in [(MoonPhase::New, "New"), (MoonPhase::Full, "Full")] {
        let days: Vec<String> = grid
            .days_in_phase(phase)
            .map(|d| d.astro.date.day().to_string())
            .collect();
        if !days.is_empty() {
            println!("{} {title}: {}", phase.glyph(), days.join(", "));
        }
    }

    let (prev_year, prev_month) = grid.previous_month();
    let (next_year, next_month) = grid.next_month();
    println!("◀ {prev_year}-{prev_month:02}   {next_year}-{next_month:02} ▶");
}
