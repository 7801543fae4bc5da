use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of one scheduled day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Completed,
    Partial,
    Failed,
    Skipped,
    Inactive,
}

impl DayClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayClass::Completed => "completed",
            DayClass::Partial => "partial",
            DayClass::Failed => "failed",
            DayClass::Skipped => "skipped",
            DayClass::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub class: DayClass,
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days ending at `end`, inclusive. Clamped at the earliest
    /// representable date.
    pub fn last_days(end: NaiveDate, days: u32) -> Self {
        let span = chrono::Duration::days(days.saturating_sub(1) as i64);
        Self {
            start: end.checked_sub_signed(span).unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub best_streak: u32,
    /// Day-of-month numbers of the current streak within the as-of month.
    pub streak_days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rollup {
    Binary,
    Quantitative {
        total_count: f64,
        average_count: f64,
    },
    TimeBased {
        total_duration: u64,
        average_duration: f64,
        total_pauses: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub scheduled_days: u32,
    pub completed: u32,
    pub partial: u32,
    pub failed: u32,
    pub skipped: u32,
    pub inactive: u32,
    pub classification_points: i64,
    pub streak_bonus: i64,
    pub emotion_bonus: i64,
    pub notes_bonus: i64,
    pub final_score: i64,
    pub completion_rate: f64,
    pub positive_emotion_days: u32,
    pub negative_emotion_days: u32,
    pub notes_written: u32,
    pub rollup: Rollup,
}

impl Scoreboard {
    pub fn empty(rollup: Rollup) -> Self {
        Self {
            scheduled_days: 0,
            completed: 0,
            partial: 0,
            failed: 0,
            skipped: 0,
            inactive: 0,
            classification_points: 0,
            streak_bonus: 0,
            emotion_bonus: 0,
            notes_bonus: 0,
            final_score: 0,
            completion_rate: 0.0,
            positive_emotion_days: 0,
            negative_emotion_days: 0,
            notes_written: 0,
            rollup,
        }
    }

    pub fn count(&self, class: DayClass) -> u32 {
        match class {
            DayClass::Completed => self.completed,
            DayClass::Partial => self.partial,
            DayClass::Failed => self.failed,
            DayClass::Skipped => self.skipped,
            DayClass::Inactive => self.inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn range_iterates_inclusive_days() {
        let range = DateRange::new(d("2024-02-27"), d("2024-03-01"));
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], d("2024-02-29"));
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = DateRange::new(d("2024-03-02"), d("2024-03-01"));
        assert!(range.is_empty());
        assert_eq!(range.days().count(), 0);
    }

    #[test]
    fn last_days_ends_at_given_date() {
        let range = DateRange::last_days(d("2024-03-10"), 7);
        assert_eq!(range.start, d("2024-03-04"));
        assert_eq!(range.days().count(), 7);
    }

    #[test]
    fn last_days_clamps_instead_of_overflowing() {
        let range = DateRange::last_days(d("2026-10-19"), 100_000_000);
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.end, d("2026-10-19"));
        assert!(!range.is_empty());
    }
}
