//! Achievement catalogue and unlock evaluation.
//!
//! Thresholds live in [`ACHIEVEMENTS`]; evaluation only measures the
//! aggregate metric each rule names and compares it to the threshold.

use crate::models::{Achievement, Scoreboard, StreakResult};

/// Minimum scheduled days before the completion-rate badge can unlock.
const MIN_DAYS_FOR_RATE: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalCompletions,
    BestStreak,
    CompletionRate,
    NotesWritten,
    PositiveDays,
    FlowCount,
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementRule {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub metric: Metric,
    pub threshold: u32,
}

pub const ACHIEVEMENTS: &[AchievementRule] = &[
    AchievementRule {
        id: "first_step",
        title: "First Step",
        description: "Complete a flow for the first time.",
        icon: "🌱",
        metric: Metric::TotalCompletions,
        threshold: 1,
    },
    AchievementRule {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Reach a 7-day streak.",
        icon: "🔥",
        metric: Metric::BestStreak,
        threshold: 7,
    },
    AchievementRule {
        id: "month_master",
        title: "Month Master",
        description: "Reach a 30-day streak.",
        icon: "🏆",
        metric: Metric::BestStreak,
        threshold: 30,
    },
    AchievementRule {
        id: "century_club",
        title: "Century Club",
        description: "Complete 100 scheduled days.",
        icon: "💯",
        metric: Metric::TotalCompletions,
        threshold: 100,
    },
    AchievementRule {
        id: "consistency_king",
        title: "Consistency King",
        description: "Keep an overall completion rate of 80% or more.",
        icon: "👑",
        metric: Metric::CompletionRate,
        threshold: 80,
    },
    AchievementRule {
        id: "reflective_mind",
        title: "Reflective Mind",
        description: "Write 10 daily notes.",
        icon: "📝",
        metric: Metric::NotesWritten,
        threshold: 10,
    },
    AchievementRule {
        id: "good_vibes",
        title: "Good Vibes",
        description: "Log a positive mood on 20 days.",
        icon: "😊",
        metric: Metric::PositiveDays,
        threshold: 20,
    },
    AchievementRule {
        id: "flow_collector",
        title: "Flow Collector",
        description: "Track 5 flows at once.",
        icon: "🗂",
        metric: Metric::FlowCount,
        threshold: 5,
    },
];

/// Aggregates across every flow that achievements are measured against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub flows: u32,
    pub scheduled_days: u32,
    pub completions: u32,
    pub best_streak: u32,
    pub notes_written: u32,
    pub positive_days: u32,
}

impl Totals {
    pub fn add(&mut self, board: &Scoreboard, streak: &StreakResult) {
        self.flows += 1;
        self.scheduled_days += board.scheduled_days;
        self.completions += board.completed;
        self.best_streak = self.best_streak.max(streak.best_streak);
        self.notes_written += board.notes_written;
        self.positive_days += board.positive_emotion_days;
    }

    fn measure(&self, metric: Metric) -> u32 {
        match metric {
            Metric::TotalCompletions => self.completions,
            Metric::BestStreak => self.best_streak,
            Metric::CompletionRate if self.scheduled_days < MIN_DAYS_FOR_RATE => 0,
            // Whole percent, floored on the exact ratio.
            Metric::CompletionRate => {
                (u64::from(self.completions) * 100 / u64::from(self.scheduled_days)) as u32
            }
            Metric::NotesWritten => self.notes_written,
            Metric::PositiveDays => self.positive_days,
            Metric::FlowCount => self.flows,
        }
    }
}

pub fn evaluate(totals: &Totals) -> Vec<Achievement> {
    ACHIEVEMENTS
        .iter()
        .map(|rule| {
            let value = totals.measure(rule.metric);
            Achievement {
                id: rule.id.to_string(),
                title: rule.title.to_string(),
                description: rule.description.to_string(),
                icon: rule.icon.to_string(),
                unlocked: value >= rule.threshold,
                progress: value.min(rule.threshold),
                max_progress: rule.threshold,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(list: &'a [Achievement], id: &str) -> &'a Achievement {
        list.iter().find(|a| a.id == id).unwrap()
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = ACHIEVEMENTS.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn nothing_unlocked_without_history() {
        let list = evaluate(&Totals::default());
        assert_eq!(list.len(), ACHIEVEMENTS.len());
        assert!(list.iter().all(|a| !a.unlocked && a.progress == 0));
    }

    #[test]
    fn progress_is_capped_at_threshold() {
        let totals = Totals {
            flows: 1,
            scheduled_days: 150,
            completions: 140,
            best_streak: 12,
            ..Totals::default()
        };
        let list = evaluate(&totals);
        let century = find(&list, "century_club");
        assert!(century.unlocked);
        assert_eq!(century.progress, 100);
        let month = find(&list, "month_master");
        assert!(!month.unlocked);
        assert_eq!(month.progress, 12);
        assert_eq!(month.max_progress, 30);
        assert!(find(&list, "week_warrior").unlocked);
        assert!(find(&list, "consistency_king").unlocked);
    }

    #[test]
    fn rate_badge_needs_a_week_of_history() {
        let totals = Totals {
            flows: 1,
            scheduled_days: 3,
            completions: 3,
            ..Totals::default()
        };
        assert!(!find(&evaluate(&totals), "consistency_king").unlocked);
    }

    #[test]
    fn rate_badge_is_not_rounded_up() {
        let mut totals = Totals {
            flows: 1,
            scheduled_days: 2500,
            completions: 1999,
            ..Totals::default()
        };
        let king = find(&evaluate(&totals), "consistency_king").clone();
        assert!(!king.unlocked);
        assert_eq!(king.progress, 79);

        totals.completions = 2000;
        let king = find(&evaluate(&totals), "consistency_king").clone();
        assert!(king.unlocked);
        assert_eq!(king.progress, 80);
    }
}
