mod cli;
mod config;
mod db;
mod error;
mod models;
mod scoring;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, MarkInput, NewFlow};
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::FlowRepo;
use models::GoalDuration;
use scoring::{FlowScorer, SystemClock};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    let repo = FlowRepo::new(&conn);
    let scorer = FlowScorer::new(&config.scoring, SystemClock);

    // Pre-seed unset rows for the coming days so they show up as pending
    let seeded = repo.ensure_window(scorer.today(), config.display.lookahead_days)?;
    if seeded > 0 {
        log::debug!("Seeded {} pending days", seeded);
    }

    match cli.command.unwrap_or(Commands::List) {
        Commands::Add {
            title,
            description,
            tracking,
            goal,
            unit,
            hours,
            minutes,
            seconds,
            days,
            month_days,
            start,
        } => {
            let input = NewFlow {
                title,
                description,
                tracking,
                goal,
                unit,
                goal_duration: GoalDuration {
                    hours,
                    minutes,
                    seconds,
                },
                days,
                month_days,
                start,
            };
            handlers::handle_add(&repo, &scorer.clock, input)?;
        }
        Commands::List => {
            handlers::handle_list(&repo, &scorer)?;
        }
        Commands::Mark {
            flow,
            mark,
            date,
            count,
            duration,
            pauses,
            emotion,
            note,
        } => {
            let input = MarkInput {
                mark,
                date,
                count,
                duration,
                pauses,
                emotion,
                note,
            };
            handlers::handle_mark(&repo, &scorer.clock, &flow, input)?;
        }
        Commands::Delete { flow } => {
            handlers::handle_delete(&repo, &flow)?;
        }
        Commands::Stats { flow, from, to } => {
            handlers::handle_stats(&repo, &scorer, &flow, from.as_deref(), to.as_deref())?;
        }
        Commands::Heatmap { flow, days } => {
            let days = days.unwrap_or(config.display.heatmap_days);
            handlers::handle_heatmap(&repo, &scorer, &flow, days)?;
        }
        Commands::Achievements => {
            handlers::handle_achievements(&repo, &scorer)?;
        }
        Commands::Insights { flow } => {
            handlers::handle_insights(&repo, &scorer, flow.as_deref())?;
        }
        Commands::Export => {
            handlers::handle_export(&repo)?;
        }
        Commands::Import { path } => {
            handlers::handle_import(&repo, &path)?;
        }
    }

    Ok(())
}
