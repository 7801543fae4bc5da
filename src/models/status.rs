use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FlowError;
use crate::models::GoalDuration;

/// The user's explicit marker for a day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Completed,
    Failed,
    Skipped,
    #[default]
    Unset,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Completed => "completed",
            Mark::Failed => "failed",
            Mark::Skipped => "skipped",
            Mark::Unset => "unset",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Mark::Completed => "●",
            Mark::Failed => "✗",
            Mark::Skipped => "–",
            Mark::Unset => "○",
        }
    }
}

impl FromStr for Mark {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" | "done" | "complete" => Ok(Mark::Completed),
            "failed" | "fail" | "missed" => Ok(Mark::Failed),
            "skipped" | "skip" => Ok(Mark::Skipped),
            "unset" | "clear" | "pending" => Ok(Mark::Unset),
            _ => Err(FlowError::UnknownMark(s.to_string())),
        }
    }
}

/// Type-specific measurement recorded for a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Progress {
    /// No measurement: a binary flow, or a day recorded by its mark alone.
    #[default]
    Binary,
    Quantitative {
        count: f64,
        goal: Option<f64>,
        unit_text: Option<String>,
    },
    TimeBased {
        /// Seconds.
        total_duration: u64,
        pauses_count: u32,
        goal: Option<GoalDuration>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayStatus {
    pub mark: Mark,
    pub emotion: Option<String>,
    pub note: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub progress: Progress,
}

impl DayStatus {
    pub fn marked(mark: Mark) -> Self {
        Self {
            mark,
            ..Self::default()
        }
    }

    pub fn has_note(&self) -> bool {
        self.note.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Count or seconds logged for the day, zero for binary progress.
    pub fn amount(&self) -> f64 {
        match &self.progress {
            Progress::Binary => 0.0,
            Progress::Quantitative { count, .. } => *count,
            Progress::TimeBased { total_duration, .. } => *total_duration as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mark_aliases() {
        assert_eq!("done".parse::<Mark>().unwrap(), Mark::Completed);
        assert_eq!("Missed".parse::<Mark>().unwrap(), Mark::Failed);
        assert_eq!("clear".parse::<Mark>().unwrap(), Mark::Unset);
        assert!("maybe".parse::<Mark>().is_err());
    }

    #[test]
    fn blank_note_does_not_count() {
        let mut day = DayStatus::marked(Mark::Completed);
        day.note = Some("   ".to_string());
        assert!(!day.has_note());
        day.note = Some(" felt good ".to_string());
        assert!(day.has_note());
    }
}
