use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flowtrack", version, author, about = "A terminal habit tracker with streaks, scores and insights")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingArg {
    Binary,
    Quantitative,
    Time,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new flow
    Add {
        /// Flow title
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// How the flow is measured
        #[arg(long = "type", value_enum, default_value = "binary")]
        tracking: TrackingArg,
        /// Daily goal for quantitative flows
        #[arg(long)]
        goal: Option<f64>,
        /// Unit for quantitative flows (pages, reps, ...)
        #[arg(long, default_value = "")]
        unit: String,
        /// Goal duration for time-based flows
        #[arg(long, default_value = "0")]
        hours: u32,
        #[arg(long, default_value = "0")]
        minutes: u32,
        #[arg(long, default_value = "0")]
        seconds: u32,
        /// Weekdays the flow is scheduled on, e.g. mon,wed,fri (default: every day)
        #[arg(long, value_delimiter = ',', conflicts_with = "month_days")]
        days: Vec<String>,
        /// Days of the month the flow is scheduled on, e.g. 1,15
        #[arg(long, value_delimiter = ',')]
        month_days: Vec<u32>,
        /// First tracked day, YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<String>,
    },
    /// List flows with today's status and streak
    List,
    /// Record a day's outcome for a flow
    Mark {
        /// Flow id or title
        flow: String,
        /// done, fail, skip or clear
        mark: String,
        /// Day to mark, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Amount done, for quantitative flows
        #[arg(long)]
        count: Option<f64>,
        /// Seconds spent, for time-based flows
        #[arg(long)]
        duration: Option<u64>,
        /// Number of pauses, for time-based flows
        #[arg(long)]
        pauses: Option<u32>,
        /// Mood label (happy, tired, ...)
        #[arg(long)]
        emotion: Option<String>,
        /// Free-text reflection
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a flow and its history
    Delete {
        /// Flow id or title
        flow: String,
    },
    /// Show the scoreboard and streaks of a flow
    Stats {
        /// Flow id or title
        flow: String,
        /// Range start, YYYY-MM-DD (default: flow start)
        #[arg(long)]
        from: Option<String>,
        /// Range end, YYYY-MM-DD (default: today)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show a day-by-day heat map of a flow
    Heatmap {
        /// Flow id or title
        flow: String,
        /// Number of days ending today
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show unlocked and pending achievements
    Achievements,
    /// Show insights for one flow or all flows
    Insights {
        /// Flow id or title
        flow: Option<String>,
    },
    /// Export all flows as JSON to stdout
    Export,
    /// Import flows from a JSON export
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
}
