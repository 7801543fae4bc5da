pub mod flow;
pub mod insight;
pub mod stats;
pub mod status;

pub use flow::{Flow, GoalDuration, Recurrence, Tracking, TrackingType, WeekdayKey};
pub use insight::{Achievement, Insight, InsightKind};
pub use stats::{DateRange, DayClass, DayOutcome, Rollup, Scoreboard, StreakResult};
pub use status::{DayStatus, Mark, Progress};
