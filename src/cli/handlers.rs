use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::cli::args::TrackingArg;
use crate::db::legacy;
use crate::db::repository::FlowRepository;
use crate::models::flow::{parse_date, parse_weekday};
use crate::models::{
    DateRange, DayClass, DayStatus, Flow, GoalDuration, InsightKind, Mark, Progress, Recurrence,
    Rollup, Tracking,
};
use crate::scoring::{classify_day, classify_range, is_scheduled, Clock, FlowScorer};
use crate::utils::format::{
    format_amount, format_duration_secs, format_points, pad, progress_bar,
};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;72;170;160m";

const TITLE_WIDTH: usize = 24;
const MAX_HEATMAP_DAYS: u32 = 3660;

fn find_flow(repo: &impl FlowRepository, key: &str) -> Result<Flow> {
    repo.find(key)?
        .ok_or_else(|| anyhow!(crate::error::FlowError::NotFound(key.to_string())))
}

fn class_icon(class: DayClass) -> String {
    match class {
        DayClass::Completed => format!("{}●\x1b[0m", GREEN),
        DayClass::Partial => format!("{}◑\x1b[0m", AMBER),
        DayClass::Failed => format!("{}✗\x1b[0m", RED),
        DayClass::Skipped => format!("{}–\x1b[0m", DIM),
        DayClass::Inactive => format!("{}○\x1b[0m", DIM),
    }
}

// ─── Add ─────────────────────────────────────────────────────────────────────

pub struct NewFlow {
    pub title: String,
    pub description: String,
    pub tracking: TrackingArg,
    pub goal: Option<f64>,
    pub unit: String,
    pub goal_duration: GoalDuration,
    pub days: Vec<String>,
    pub month_days: Vec<u32>,
    pub start: Option<String>,
}

/// Turn CLI input into a flow. The id is the creation time in milliseconds.
pub fn build_flow<C: Clock>(input: NewFlow, clock: &C) -> Result<Flow> {
    if input.title.trim().is_empty() {
        bail!("Flow title cannot be empty");
    }

    let tracking = match input.tracking {
        TrackingArg::Binary => Tracking::Binary,
        TrackingArg::Quantitative => {
            let goal = input.goal.unwrap_or(1.0);
            if goal <= 0.0 {
                bail!("Goal must be greater than zero");
            }
            Tracking::Quantitative {
                goal,
                unit_text: input.unit,
            }
        }
        TrackingArg::Time => {
            if input.goal_duration.total_secs() == 0 {
                bail!("Time-based flows need --hours, --minutes or --seconds");
            }
            Tracking::TimeBased {
                goal: input.goal_duration,
            }
        }
    };

    let recurrence = if !input.month_days.is_empty() {
        if let Some(bad) = input.month_days.iter().find(|d| !(1..=31).contains(*d)) {
            bail!("Day of month out of range: {}", bad);
        }
        Recurrence::month_days(input.month_days)
    } else if !input.days.is_empty() {
        let days = input
            .days
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<_>, _>>()?;
        Recurrence::weekdays(days)
    } else {
        Recurrence::every_day()
    };

    let start = match input.start.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => clock.today(),
    };

    let mut flow = Flow::new(
        clock.now().timestamp_millis().to_string(),
        input.title.trim(),
        tracking,
    );
    flow.description = input.description;
    flow.start_date = Some(start);
    flow.recurrence = recurrence;
    Ok(flow)
}

pub fn handle_add<C: Clock>(repo: &impl FlowRepository, clock: &C, input: NewFlow) -> Result<()> {
    let flow = build_flow(input, clock)?;
    repo.save_flow(&flow)?;
    println_colored!(
        GREEN,
        "  ✓ Added {} ({}, {})",
        flow.title,
        flow.tracking_type(),
        flow.recurrence.describe()
    );
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

pub fn handle_list<C: Clock>(repo: &impl FlowRepository, scorer: &FlowScorer<C>) -> Result<()> {
    let flows = repo.list_flows()?;
    let today = scorer.today();

    println!();
    if flows.is_empty() {
        println_colored!(DIM, "  No flows yet. Add one with `flowtrack add <title>`.");
        println!();
        return Ok(());
    }

    println_colored!(TEAL, "  Flows — {}", today.format("%a %Y-%m-%d"));
    println!();
    for flow in &flows {
        let today_icon = if is_scheduled(flow, today) {
            class_icon(classify_day(flow, flow.day(today)))
        } else {
            format!("{}·\x1b[0m", DIM)
        };
        let streak = scorer.compute_streaks(flow, today);
        println!(
            "  {} {}{:<13}{}{:>4} day streak\x1b[0m",
            today_icon,
            pad(&flow.title, TITLE_WIDTH),
            flow.tracking_type().to_string(),
            DIM,
            streak.current_streak,
        );
    }
    println!();
    Ok(())
}

// ─── Mark ────────────────────────────────────────────────────────────────────

pub struct MarkInput {
    pub mark: String,
    pub date: Option<String>,
    pub count: Option<f64>,
    pub duration: Option<u64>,
    pub pauses: Option<u32>,
    pub emotion: Option<String>,
    pub note: Option<String>,
}

/// Mark to store when an amount was logged: the amount decides completion,
/// an explicit skip or fail is otherwise kept.
pub fn derive_mark(amount: f64, goal: f64, requested: Mark) -> Mark {
    if goal > 0.0 && amount >= goal {
        Mark::Completed
    } else if requested == Mark::Completed {
        Mark::Unset
    } else {
        requested
    }
}

/// Apply a mark to the existing status of a day. Returns the new status.
pub fn apply_mark(flow: &Flow, existing: Option<&DayStatus>, input: &MarkInput) -> Result<DayStatus> {
    let requested = Mark::from_str(&input.mark)?;
    let mut day = existing
        .cloned()
        .unwrap_or_else(|| DayStatus::marked(requested));

    if let Some(emotion) = &input.emotion {
        day.emotion = Some(emotion.trim().to_lowercase()).filter(|e| !e.is_empty());
    }
    if let Some(note) = &input.note {
        day.note = Some(note.clone());
    }

    match &flow.tracking {
        Tracking::Binary => {
            if input.count.is_some() || input.duration.is_some() {
                bail!("{} is a binary flow; it takes no count or duration", flow.title);
            }
            day.progress = Progress::Binary;
            day.mark = requested;
        }
        Tracking::Quantitative { goal, unit_text } => {
            if input.duration.is_some() {
                bail!("{} counts {}, not time", flow.title, unit_text);
            }
            let previous = match &day.progress {
                Progress::Quantitative { count, .. } => *count,
                _ => 0.0,
            };
            let count = match (requested, input.count) {
                (Mark::Unset, _) => 0.0,
                (_, Some(count)) => count.max(0.0),
                (Mark::Completed, None) => previous.max(*goal),
                (_, None) => previous,
            };
            day.progress = Progress::Quantitative {
                count,
                goal: Some(*goal),
                unit_text: Some(unit_text.clone()),
            };
            day.mark = derive_mark(count, *goal, requested);
        }
        Tracking::TimeBased { goal } => {
            if input.count.is_some() {
                bail!("{} tracks time; use --duration", flow.title);
            }
            let (previous, previous_pauses) = match &day.progress {
                Progress::TimeBased {
                    total_duration,
                    pauses_count,
                    ..
                } => (*total_duration, *pauses_count),
                _ => (0, 0),
            };
            let goal_secs = goal.total_secs();
            let duration = match (requested, input.duration) {
                (Mark::Unset, _) => 0,
                (_, Some(secs)) => secs,
                (Mark::Completed, None) => previous.max(goal_secs),
                (_, None) => previous,
            };
            let pauses = if requested == Mark::Unset {
                0
            } else {
                input.pauses.unwrap_or(previous_pauses)
            };
            day.progress = Progress::TimeBased {
                total_duration: duration,
                pauses_count: pauses,
                goal: Some(*goal),
            };
            day.mark = derive_mark(duration as f64, goal_secs as f64, requested);
        }
    }
    Ok(day)
}

pub fn handle_mark<C: Clock>(
    repo: &impl FlowRepository,
    clock: &C,
    key: &str,
    input: MarkInput,
) -> Result<()> {
    let mut flow = find_flow(repo, key)?;
    let date = match input.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => clock.today(),
    };
    if flow.start_date.is_some_and(|start| date < start) {
        bail!("{} starts on {}", flow.title, flow.start_date.unwrap_or(date));
    }
    if !is_scheduled(&flow, date) {
        println_colored!(
            AMBER,
            "  {} is not scheduled on {} ({}); recording anyway",
            flow.title,
            date,
            flow.recurrence.describe()
        );
    }

    let mut day = apply_mark(&flow, flow.day(date), &input)?;
    day.timestamp = Some(clock.now());
    flow.status.insert(date, day.clone());
    repo.save_flow(&flow)?;

    let class = classify_day(&flow, Some(&day));
    let detail = match &day.progress {
        Progress::Binary => String::new(),
        Progress::Quantitative {
            count, unit_text, ..
        } => format!(
            " — {} {}",
            format_amount(*count),
            unit_text.as_deref().unwrap_or_default()
        ),
        Progress::TimeBased { total_duration, .. } => {
            format!(" — {}", format_duration_secs(*total_duration))
        }
    };
    let color = match class {
        DayClass::Completed => GREEN,
        DayClass::Partial => AMBER,
        DayClass::Failed => RED,
        DayClass::Skipped | DayClass::Inactive => DIM,
    };
    println_colored!(
        color,
        "  {} {} on {}: {}{}",
        day.mark.icon(),
        flow.title,
        date,
        class.as_str(),
        detail.trim_end()
    );
    Ok(())
}

// ─── Delete ──────────────────────────────────────────────────────────────────

pub fn handle_delete(repo: &impl FlowRepository, key: &str) -> Result<()> {
    let flow = find_flow(repo, key)?;
    if repo.delete_flow(&flow.id)? {
        println_colored!(RED, "  ✗ Deleted {} and {} days of history", flow.title, flow.status.len());
    }
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats<C: Clock>(
    repo: &impl FlowRepository,
    scorer: &FlowScorer<C>,
    key: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let flow = find_flow(repo, key)?;
    let lifetime = scorer.lifetime(&flow);
    let range = DateRange::new(
        from.map(parse_date).transpose()?.unwrap_or(lifetime.start),
        to.map(parse_date).transpose()?.unwrap_or(lifetime.end),
    );
    if range.is_empty() {
        bail!("Range start {} is after end {}", range.start, range.end);
    }

    let board = scorer.compute_scoreboard(&flow, range);
    let streak = scorer.compute_streaks(&flow, range.end);

    println!();
    println_colored!(TEAL, "  {} — {}..{}", flow.title, range.start, range.end);
    println_colored!(DIM, "  {} · {}", flow.tracking_type(), flow.recurrence.describe());
    println!();
    println_colored!(
        BOLD,
        "  Streak:      {} days current  |  {} days best",
        streak.current_streak,
        streak.best_streak
    );
    println!(
        "  Completion:  {}  {:.1}%",
        progress_bar(board.completed, board.scheduled_days, 20),
        board.completion_rate
    );
    let buckets = [
        DayClass::Completed,
        DayClass::Partial,
        DayClass::Failed,
        DayClass::Skipped,
        DayClass::Inactive,
    ]
    .iter()
    .map(|class| format!("{} {} {}", class_icon(*class), board.count(*class), class.as_str()))
    .collect::<Vec<_>>()
    .join("  ");
    println!("  Days:        {} scheduled  {}", board.scheduled_days, buckets);
    println!();
    println_colored!(BOLD, "  Score:       {}", format_points(board.final_score));
    println_colored!(
        DIM,
        "               days {}  streak {}  mood {}  notes {}",
        format_points(board.classification_points),
        format_points(board.streak_bonus),
        format_points(board.emotion_bonus),
        format_points(board.notes_bonus)
    );

    match &board.rollup {
        Rollup::Binary => {}
        Rollup::Quantitative {
            total_count,
            average_count,
        } => {
            let unit = match &flow.tracking {
                Tracking::Quantitative { unit_text, .. } => unit_text.as_str(),
                _ => "",
            };
            println!();
            println!(
                "  Total:       {} {}  (avg {} per day)",
                format_amount(*total_count),
                unit,
                format_amount(*average_count)
            );
        }
        Rollup::TimeBased {
            total_duration,
            average_duration,
            total_pauses,
        } => {
            println!();
            println!(
                "  Total:       {}  (avg {} per day, {} pauses)",
                format_duration_secs(*total_duration),
                format_duration_secs(average_duration.round() as u64),
                total_pauses
            );
        }
    }
    println!();
    Ok(())
}

// ─── Heat map ────────────────────────────────────────────────────────────────

pub fn handle_heatmap<C: Clock>(
    repo: &impl FlowRepository,
    scorer: &FlowScorer<C>,
    key: &str,
    days: u32,
) -> Result<()> {
    if days > MAX_HEATMAP_DAYS {
        bail!("Heat map covers at most {} days", MAX_HEATMAP_DAYS);
    }
    let flow = find_flow(repo, key)?;
    let range = DateRange::last_days(scorer.today(), days.max(1));
    let outcomes: HashMap<NaiveDate, DayClass> = classify_range(&flow, range)
        .into_iter()
        .map(|o| (o.date, o.class))
        .collect();

    println!();
    println_colored!(TEAL, "  {} — last {} days", flow.title, days.max(1));
    println_colored!(
        DIM,
        "  (● done, ◑ partial, ✗ failed, – skipped, ○ inactive, · not scheduled)"
    );
    println!();

    let mut line = String::new();
    let mut week_start: Option<NaiveDate> = None;
    for date in range.days() {
        if week_start.is_none() {
            week_start = Some(date);
        }
        let cell = match outcomes.get(&date) {
            Some(class) => class_icon(*class),
            None => format!("{}·\x1b[0m", DIM),
        };
        line.push_str(&cell);
        line.push(' ');
        if date.weekday() == chrono::Weekday::Sun || date == range.end {
            if let Some(start) = week_start.take() {
                println!("  {}  {}", start.format("%b %d"), line);
            }
            line.clear();
        }
    }
    println!();
    Ok(())
}

// ─── Achievements ────────────────────────────────────────────────────────────

pub fn handle_achievements<C: Clock>(
    repo: &impl FlowRepository,
    scorer: &FlowScorer<C>,
) -> Result<()> {
    let flows = repo.list_flows()?;
    let list = scorer.list_achievements(&flows);
    let unlocked = list.iter().filter(|a| a.unlocked).count();

    println!();
    println_colored!(TEAL, "  Achievements ({}/{})", unlocked, list.len());
    println!();
    for a in &list {
        let bar = progress_bar(a.progress, a.max_progress, 10);
        if a.unlocked {
            println_colored!(GREEN, "  {} {}✓  {}", a.icon, pad(&a.title, 20), a.description);
        } else {
            println_colored!(
                DIM,
                "  {} {} {} {}/{}  {}",
                a.icon,
                pad(&a.title, 19),
                bar,
                a.progress,
                a.max_progress,
                a.description
            );
        }
    }
    println!();
    Ok(())
}

// ─── Insights ────────────────────────────────────────────────────────────────

pub fn handle_insights<C: Clock>(
    repo: &impl FlowRepository,
    scorer: &FlowScorer<C>,
    key: Option<&str>,
) -> Result<()> {
    let flows = match key {
        Some(key) => vec![find_flow(repo, key)?],
        None => repo.list_flows()?,
    };
    let insights = scorer.list_insights(&flows);

    println!();
    println_colored!(TEAL, "  Insights");
    println!();
    if insights.is_empty() {
        println_colored!(DIM, "  Nothing to report yet.");
    }
    for insight in &insights {
        let color = match insight.kind {
            InsightKind::Positive => GREEN,
            InsightKind::Warning => AMBER,
            InsightKind::Neutral => BOLD,
        };
        println_colored!(color, "  {} {}", insight.icon, insight.title);
        println_colored!(DIM, "     {}", insight.description);
    }
    println!();
    Ok(())
}

// ─── Export / import ─────────────────────────────────────────────────────────

pub fn handle_export(repo: &impl FlowRepository) -> Result<()> {
    let flows = repo.list_flows()?;
    println!("{}", legacy::to_json(&flows)?);
    Ok(())
}

pub fn handle_import(repo: &impl FlowRepository, path: &Path) -> Result<()> {
    let flows = legacy::read_file(path)?;
    for flow in &flows {
        repo.save_flow(flow)?;
    }
    println_colored!(GREEN, "  ✓ Imported {} flows from {}", flows.len(), path.display());
    Ok(())
}
