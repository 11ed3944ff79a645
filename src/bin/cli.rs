//! Keiba CLI - Command-line interface for race rankings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use keiba::data::RaceArchive;
use keiba::error::{validate_race_id, validate_year};
use keiba::models::{HorseEntry, RankingMode};
use keiba::pipeline::{Pipeline, PipelineConfig, RankOutcome};
use keiba::report::table_from_delimited;
use keiba::scraper::{RaceScraper, ScraperConfig};

/// Default report directory
const DEFAULT_OUT_DIR: &str = ".";
/// Default race archive directory
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser)]
#[command(name = "keiba")]
#[command(author, version, about = "Horse race ranking CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for ranking reports
    #[arg(long, env = "KEIBA_OUT_DIR", default_value = DEFAULT_OUT_DIR, global = true)]
    out_dir: PathBuf,

    /// Directory for the race archive
    #[arg(long, env = "KEIBA_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the runners of an upcoming race
    Rank {
        /// netkeiba race id (12 digits)
        #[arg(short, long)]
        race_id: String,

        /// Delay between requests in milliseconds
        #[arg(long, default_value = "1000")]
        delay: u64,

        /// Print only, do not write report files
        #[arg(long)]
        no_save: bool,
    },

    /// Rank a finished race using only races run before it
    Backtest {
        /// netkeiba race id (12 digits)
        #[arg(short, long)]
        race_id: String,

        /// Delay between requests in milliseconds
        #[arg(long, default_value = "1000")]
        delay: u64,

        /// Print only, do not write report files
        #[arg(long)]
        no_save: bool,
    },

    /// Archive a year of newcomer races
    Harvest {
        /// Year to harvest (YYYY)
        #[arg(short, long)]
        year: i32,

        /// Delay between requests in milliseconds
        #[arg(long, default_value = "500")]
        delay: u64,
    },

    /// List races in the archive
    Archive,

    /// Print a saved ranking CSV as a table
    Show {
        /// Report file (.csv)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    println!(
        "{}",
        format!("Keiba CLI v{}", env!("CARGO_PKG_VERSION")).cyan().bold()
    );
    println!();

    if cli.interactive {
        run_interactive(&cli.out_dir, &cli.data_dir)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Rank {
                race_id,
                delay,
                no_save,
            } => {
                run_rank(&cli.out_dir, &race_id, RankingMode::Live, delay, !no_save)?;
            }
            Commands::Backtest {
                race_id,
                delay,
                no_save,
            } => {
                run_rank(&cli.out_dir, &race_id, RankingMode::Backtest, delay, !no_save)?;
            }
            Commands::Harvest { year, delay } => {
                run_harvest(&cli.data_dir, year, delay)?;
            }
            Commands::Archive => {
                list_archive(&cli.data_dir)?;
            }
            Commands::Show { file } => {
                show_report(&file)?;
            }
        }
    } else {
        println!("No command given. Use --help for usage or -i for interactive mode.");
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

fn build_pipeline(out_dir: &Path, delay: u64, save: bool) -> Result<Pipeline> {
    let scraper = RaceScraper::new(ScraperConfig::default().with_delay(delay))
        .context("Failed to create HTTP client")?;

    Ok(Pipeline::new(
        scraper,
        PipelineConfig {
            out_dir: out_dir.to_path_buf(),
            save,
            ..Default::default()
        },
    ))
}

fn run_rank(out_dir: &Path, race_id: &str, mode: RankingMode, delay: u64, save: bool) -> Result<()> {
    if let Err(msg) = validate_race_id(race_id) {
        anyhow::bail!(msg);
    }

    let label = match mode {
        RankingMode::Live => "Ranking",
        RankingMode::Backtest => "Backtesting",
    };
    println!("{}: race {}", label.green(), race_id);
    println!();

    let rt = build_runtime()?;
    let pipeline = build_pipeline(out_dir, delay, save)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Reading runners...");

    let on_horse = |index: usize, total: usize, entry: &HorseEntry| {
        pb.set_length(total as u64);
        pb.set_position(index as u64);
        pb.set_message(entry.horse_name.clone());
    };

    let result = rt.block_on(async {
        match mode {
            RankingMode::Live => pipeline.rank_live(race_id, on_horse).await,
            RankingMode::Backtest => pipeline.rank_backtest(race_id, on_horse).await,
        }
    });

    pb.finish_and_clear();

    let outcome = result.with_context(|| format!("Failed to rank race {}", race_id))?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &RankOutcome) {
    let report = &outcome.report;

    println!(
        "{} {} ({}, history up to {})",
        report.race_id,
        report.race_name.yellow().bold(),
        report.mode,
        report.reference_date
    );
    println!("{}", "-".repeat(80));
    println!("{}", report.to_table());
    println!();

    let without_data = report.horses.iter().filter(|h| !h.stat.has_data()).count();
    if without_data > 0 {
        println!(
            "{}: {} horse(s) without recent history",
            "Note".yellow(),
            without_data
        );
    }

    if let Some((csv_path, json_path)) = &outcome.saved {
        println!("{}: {:?}", "Saved".green(), csv_path);
        println!("{}: {:?}", "Saved".green(), json_path);
    }
}

fn run_harvest(data_dir: &Path, year: i32, delay: u64) -> Result<()> {
    if let Err(msg) = validate_year(year) {
        anyhow::bail!(msg);
    }

    println!("{}: newcomer races of {}", "Harvesting".green(), year);
    println!();

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let rt = build_runtime()?;
    let pipeline = build_pipeline(data_dir, delay, false)?;
    let archive = RaceArchive::new(data_dir);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Reading race list...");

    let result = rt.block_on(pipeline.harvest(year, &archive, |index, total, code| {
        pb.set_message(format!("{}/{} {}", index + 1, total, code));
    }));

    pb.finish_and_clear();

    let summary = result.with_context(|| format!("Harvest of {} failed", year))?;

    println!(
        "{}: {} races found, {} written, {} already archived, {} failed",
        "Complete".green(),
        summary.races_found,
        summary.written,
        summary.skipped,
        summary.failed
    );
    println!("Archive: {:?}", archive.dir());

    Ok(())
}

fn list_archive(data_dir: &Path) -> Result<()> {
    let archive = RaceArchive::new(data_dir);
    let codes = archive
        .codes()
        .with_context(|| format!("Failed to read archive {:?}", data_dir))?;

    if codes.is_empty() {
        println!("No races archived in {:?}", data_dir);
        return Ok(());
    }

    println!("{}", "Archived races:".yellow().bold());
    println!("{}", "-".repeat(80));

    for code in &codes {
        match archive.load(code) {
            Ok((race, horses)) => println!("{}", race.summary_line(horses.len())),
            Err(e) => println!("{} {}: {}", "Warning".yellow(), code, e),
        }
    }

    println!("\n{} races", codes.len());
    Ok(())
}

fn show_report(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read report {:?}", file))?;

    println!("{}", table_from_delimited(&text));
    Ok(())
}

fn run_interactive(out_dir: &Path, data_dir: &Path) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Select Quit to exit.\n");

    let theme = ColorfulTheme::default();

    loop {
        let options = vec![
            "Rank an upcoming race",
            "Backtest a finished race",
            "Harvest newcomer races",
            "List archived races",
            "Show a saved report",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        // Errors are reported and the menu is shown again
        let result = match selection {
            0 | 1 => {
                let race_id: String = Input::with_theme(&theme)
                    .with_prompt("Race id (12 digits)")
                    .validate_with(|input: &String| validate_race_id(input))
                    .interact_text()?;

                let mode = if selection == 0 {
                    RankingMode::Live
                } else {
                    RankingMode::Backtest
                };

                println!();
                run_rank(out_dir, &race_id, mode, 1000, true)
            }
            2 => {
                let year: i32 = Input::with_theme(&theme)
                    .with_prompt("Year (YYYY)")
                    .validate_with(|input: &i32| validate_year(*input))
                    .interact_text()?;

                println!();
                run_harvest(data_dir, year, 500)
            }
            3 => {
                println!();
                list_archive(data_dir)
            }
            4 => {
                let file: String = Input::with_theme(&theme)
                    .with_prompt("Report file (.csv)")
                    .interact_text()?;

                println!();
                show_report(Path::new(&file))
            }
            _ => {
                println!("Goodbye!");
                break;
            }
        };

        if let Err(e) = result {
            println!("{}: {:#}", "Error".red(), e);
        }
        println!();
    }

    Ok(())
}
