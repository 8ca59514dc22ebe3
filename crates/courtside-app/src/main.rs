// Courtside entry point.
//
// 1. Parse the command line
// 2. Load config (seeding config/ from defaults/ when missing)
// 3. Initialize tracing (log to file)
// 4. Run the requested pipeline and print a one-line summary

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use courtside_app::ingest;
use courtside_app::pipeline::{Pipeline, WeekWindow};
use courtside_core::config::{self, StorageConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "Best-ball and category round-robin scoring for a fantasy basketball league")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge one day's player stat lines into the weekly best-ball snapshot
    BestBall {
        /// Daily player stat CSV
        #[arg(long)]
        delta: PathBuf,
        /// Date the stat lines belong to (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Fantasy week number
        #[arg(short, long)]
        week: u32,
        /// First day of the week (YYYY-MM-DD)
        #[arg(long)]
        week_start: NaiveDate,
        /// Last day of the week (YYYY-MM-DD)
        #[arg(long)]
        week_end: NaiveDate,
    },
    /// Play every team against every other on a week's category totals
    RoundRobin {
        /// Weekly team category CSV
        #[arg(long)]
        stats: PathBuf,
        /// Fantasy week number
        #[arg(short, long)]
        week: u32,
    },
    /// Rebuild both season snapshots from every stored week
    Season {
        /// In-progress week, excluded from best/worst week (defaults to the latest stored week)
        #[arg(long)]
        latest_week: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config().context("failed to load configuration")?;
    init_tracing(&config.storage)?;
    info!(
        "Config loaded: league={}, season {}, {} round-robin categories",
        config.league.name,
        config.league.season,
        config.league.rules.len()
    );

    let pipeline = Pipeline::from_config(&config);

    match cli.command {
        Commands::BestBall {
            delta,
            date,
            week,
            week_start,
            week_end,
        } => {
            let teams = ingest::load_daily_players(&delta)
                .with_context(|| format!("failed to load {}", delta.display()))?;
            let window = WeekWindow {
                week,
                start: week_start,
                end: week_end,
            };
            let report = pipeline.run_best_ball_day(window, date, &teams)?;
            if report.merged {
                println!(
                    "week {}: merged {} ({} player lines) -> {}",
                    week,
                    date,
                    report.players_updated,
                    report.path.display()
                );
            } else {
                println!("week {week}: {date} was already merged, nothing written");
            }
        }
        Commands::RoundRobin { stats, week } => {
            let lines = ingest::load_team_lines(&stats)
                .with_context(|| format!("failed to load {}", stats.display()))?;
            let snapshot = pipeline.run_round_robin_week(week, &lines)?;
            println!(
                "week {}: round robin for {} teams -> {}",
                week,
                snapshot.results.len(),
                pipeline
                    .store()
                    .weekly_round_robin_path(snapshot.season, week)
                    .display()
            );
        }
        Commands::Season { latest_week } => match pipeline.run_season(latest_week, Utc::now())? {
            Some(report) => {
                if let Some(best_ball) = &report.best_ball {
                    println!(
                        "season best ball: {} teams, weeks {:?}",
                        best_ball.teams.len(),
                        best_ball.weeks_included
                    );
                }
                if let Some(round_robin) = &report.round_robin {
                    println!(
                        "season round robin: {} teams, weeks {:?}",
                        round_robin.results.len(),
                        round_robin.weeks_included
                    );
                }
            }
            None => println!(
                "no weekly snapshots in {}, nothing to aggregate",
                pipeline.store().dir().display()
            ),
        },
    }

    info!("Courtside finished");
    Ok(())
}

/// Initialize tracing to log to a file under the configured log directory.
fn init_tracing(storage: &StorageConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(&storage.log_dir)
        .with_context(|| format!("failed to create {}", storage.log_dir.display()))?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(storage.log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&storage.log_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
