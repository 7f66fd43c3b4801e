use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use weekly_roster::config::SchedulerConfig;
use weekly_roster::display::print_week;
use weekly_roster::parser::{load_calendar, load_overrides, load_roster};
use weekly_roster::schedule::{build_week, check_override_day, normalize_roster, Roster};
use weekly_roster::web;

#[derive(Parser)]
#[command(name = "weekly-roster")]
#[command(about = "Assigns staff to Reservations, Dispatch and specialist work across a week")]
struct Cli {
    /// JSON config file (overrides WEEKLY_ROSTER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one week's schedule from files and print it
    Build {
        /// Roster file (.csv or .json)
        #[arg(long)]
        roster: PathBuf,
        /// Any date in the week to build (YYYY-MM-DD)
        #[arg(long)]
        week_start: NaiveDate,
        /// PTO and meeting CSV (name,date,start,end)
        #[arg(long)]
        calendar: Option<PathBuf>,
        /// Override CSV (name,day,task,start,end)
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Print the schedule as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Roster to start with
        #[arg(long)]
        roster: Option<PathBuf>,
    },
}

/// Loads and validates a roster, logging every record that had to be skipped
fn load_valid_roster(path: &Path) -> anyhow::Result<Roster> {
    let raws = load_roster(path).with_context(|| format!("reading roster {}", path.display()))?;
    let total = raws.len();
    let (roster, issues) = normalize_roster(raws);
    for issue in &issues {
        tracing::warn!("roster record skipped: {}", issue);
    }
    if total > 0 && roster.is_empty() {
        bail!("no valid employees in {}", path.display());
    }
    tracing::info!(employees = roster.len(), "roster loaded");
    Ok(roster)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = SchedulerConfig::load(cli.config.as_deref()).context("loading config")?;

    match cli.command {
        Commands::Build {
            roster,
            week_start,
            calendar,
            overrides,
            json,
        } => {
            let mut roster = load_valid_roster(&roster)?;

            if let Some(path) = calendar {
                let entries = load_calendar(&path)
                    .with_context(|| format!("reading calendar {}", path.display()))?;
                for issue in roster.resolve_calendar(&entries) {
                    tracing::warn!("calendar entry dropped: {}", issue);
                }
            }

            let mut overrides = match overrides {
                Some(path) => load_overrides(&path)
                    .with_context(|| format!("reading overrides {}", path.display()))?,
                None => Vec::new(),
            };
            overrides.retain(|o| match check_override_day(o) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("override skipped: {}", e);
                    false
                }
            });

            let week = build_week(&config, &roster, &overrides, week_start);
            for (date, day) in &week {
                for warning in &day.warnings {
                    tracing::warn!(%date, "override skipped: {}", warning);
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&week)?);
            } else {
                print_week(&week, &config.time_grid);
            }
        }
        Commands::Serve { port, roster } => {
            let roster = match roster {
                Some(path) => load_valid_roster(&path)?,
                None => Roster::default(),
            };
            tracing::info!("Starting web server on http://localhost:{}", port);
            web::start_server(port, config, roster).await?;
        }
    }

    Ok(())
}
