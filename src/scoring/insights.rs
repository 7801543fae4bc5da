use chrono::{Datelike, Weekday};
use std::collections::HashMap;

use crate::models::{DayClass, DayOutcome, Flow, Insight, InsightKind, Scoreboard, StreakResult};
use crate::models::flow::weekday_abbrev;

/// Scheduled days needed before rate-based insights are meaningful.
const MIN_DAYS: u32 = 7;

/// Everything the insight rules look at for one flow.
pub struct FlowSnapshot<'a> {
    pub flow: &'a Flow,
    pub board: Scoreboard,
    pub streak: StreakResult,
    pub outcomes: Vec<DayOutcome>,
}

pub struct InsightRule {
    pub title: &'static str,
    pub icon: &'static str,
    pub kind: InsightKind,
    /// Returns the description when the rule fires.
    pub check: fn(&FlowSnapshot) -> Option<String>,
}

pub const INSIGHTS: &[InsightRule] = &[
    InsightRule {
        title: "Just getting started",
        icon: "🌱",
        kind: InsightKind::Neutral,
        check: getting_started,
    },
    InsightRule {
        title: "On a roll",
        icon: "🚀",
        kind: InsightKind::Positive,
        check: on_a_roll,
    },
    InsightRule {
        title: "Needs attention",
        icon: "⚠",
        kind: InsightKind::Warning,
        check: needs_attention,
    },
    InsightRule {
        title: "Streak going strong",
        icon: "🔥",
        kind: InsightKind::Positive,
        check: streak_alive,
    },
    InsightRule {
        title: "Rebuild your streak",
        icon: "🔁",
        kind: InsightKind::Neutral,
        check: rebuild_streak,
    },
    InsightRule {
        title: "Almost there",
        icon: "🎯",
        kind: InsightKind::Neutral,
        check: almost_there,
    },
    InsightRule {
        title: "Struggling",
        icon: "🧗",
        kind: InsightKind::Warning,
        check: struggling,
    },
    InsightRule {
        title: "Mood lift",
        icon: "😊",
        kind: InsightKind::Positive,
        check: mood_lift,
    },
    InsightRule {
        title: "Mood dip",
        icon: "🌧",
        kind: InsightKind::Warning,
        check: mood_dip,
    },
    InsightRule {
        title: "Strongest day",
        icon: "📅",
        kind: InsightKind::Neutral,
        check: strongest_weekday,
    },
];

pub fn evaluate(snapshot: &FlowSnapshot) -> Vec<Insight> {
    INSIGHTS
        .iter()
        .filter_map(|rule| {
            (rule.check)(snapshot).map(|description| Insight {
                flow_id: snapshot.flow.id.clone(),
                title: rule.title.to_string(),
                description,
                icon: rule.icon.to_string(),
                kind: rule.kind,
            })
        })
        .collect()
}

fn getting_started(s: &FlowSnapshot) -> Option<String> {
    (s.board.scheduled_days < MIN_DAYS).then(|| {
        format!(
            "{} has {} scheduled days so far; trends show up after a week.",
            s.flow.title, s.board.scheduled_days
        )
    })
}

fn on_a_roll(s: &FlowSnapshot) -> Option<String> {
    (s.board.scheduled_days >= MIN_DAYS && s.board.completion_rate >= 80.0).then(|| {
        format!(
            "{} is at {:.1}% completion.",
            s.flow.title, s.board.completion_rate
        )
    })
}

fn needs_attention(s: &FlowSnapshot) -> Option<String> {
    (s.board.scheduled_days >= MIN_DAYS && s.board.completion_rate < 40.0).then(|| {
        format!(
            "{} is only at {:.1}% completion. Try a smaller goal.",
            s.flow.title, s.board.completion_rate
        )
    })
}

fn streak_alive(s: &FlowSnapshot) -> Option<String> {
    (s.streak.current_streak >= 7)
        .then(|| format!("{} days in a row on {}.", s.streak.current_streak, s.flow.title))
}

fn rebuild_streak(s: &FlowSnapshot) -> Option<String> {
    (s.streak.current_streak == 0 && s.streak.best_streak >= 7).then(|| {
        format!(
            "Your best run on {} was {} days. Start again today.",
            s.flow.title, s.streak.best_streak
        )
    })
}

fn almost_there(s: &FlowSnapshot) -> Option<String> {
    (s.board.partial >= 3 && s.board.partial >= s.board.failed).then(|| {
        format!(
            "{} days reached at least half of the {} goal.",
            s.board.partial, s.flow.title
        )
    })
}

fn struggling(s: &FlowSnapshot) -> Option<String> {
    (s.board.scheduled_days >= MIN_DAYS && s.board.failed > s.board.completed).then(|| {
        format!(
            "{} failed days against {} completed on {}.",
            s.board.failed, s.board.completed, s.flow.title
        )
    })
}

fn mood_lift(s: &FlowSnapshot) -> Option<String> {
    let (pos, neg) = (s.board.positive_emotion_days, s.board.negative_emotion_days);
    (pos >= 3 && pos > neg).then(|| format!("You felt good on {} days of {}.", pos, s.flow.title))
}

fn mood_dip(s: &FlowSnapshot) -> Option<String> {
    let (pos, neg) = (s.board.positive_emotion_days, s.board.negative_emotion_days);
    (neg >= 3 && neg > pos).then(|| {
        format!(
            "{} days of {} came with a low mood. Consider an easier time slot.",
            neg, s.flow.title
        )
    })
}

/// Weekday with the highest completion ratio, given at least two samples.
fn strongest_weekday(s: &FlowSnapshot) -> Option<String> {
    let mut by_day: HashMap<Weekday, (u32, u32)> = HashMap::new();
    for outcome in &s.outcomes {
        let entry = by_day.entry(outcome.date.weekday()).or_insert((0, 0));
        entry.0 += 1;
        if outcome.class == DayClass::Completed {
            entry.1 += 1;
        }
    }
    if by_day.len() < 2 {
        return None;
    }

    let (day, (total, done)) = by_day
        .into_iter()
        .filter(|(_, (total, done))| *total >= 2 && *done > 0)
        .max_by(|(a_day, (a_total, a_done)), (b_day, (b_total, b_done))| {
            let a = *a_done as f64 / *a_total as f64;
            let b = *b_done as f64 / *b_total as f64;
            a.partial_cmp(&b)
                .unwrap_or(std::cmp::Ordering::Equal)
                // Earlier weekday wins a tie.
                .then(b_day.num_days_from_monday().cmp(&a_day.num_days_from_monday()))
        })?;

    Some(format!(
        "{} goes best on {} ({}/{} completed).",
        s.flow.title,
        weekday_abbrev(day),
        done,
        total
    ))
}
