use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::error::FlowError;
use crate::models::DayStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingType {
    Binary,
    Quantitative,
    TimeBased,
}

impl TrackingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingType::Binary => "binary",
            TrackingType::Quantitative => "quantitative",
            TrackingType::TimeBased => "timebased",
        }
    }

    /// Label used by the legacy JSON store.
    pub fn legacy_label(&self) -> &'static str {
        match self {
            TrackingType::Binary => "Binary",
            TrackingType::Quantitative => "Quantitative",
            TrackingType::TimeBased => "Time-based",
        }
    }
}

impl std::fmt::Display for TrackingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.legacy_label())
    }
}

impl FromStr for TrackingType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binary" => Ok(TrackingType::Binary),
            "quantitative" | "count" => Ok(TrackingType::Quantitative),
            "time-based" | "timebased" | "time" => Ok(TrackingType::TimeBased),
            _ => Err(FlowError::UnknownTrackingType(s.to_string())),
        }
    }
}

/// Goal duration of a time-based flow, or a per-day override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDuration {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl GoalDuration {
    pub fn from_secs(total: u64) -> Self {
        Self {
            hours: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64
    }
}

/// How a flow is measured, together with its goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Tracking {
    Binary,
    Quantitative { goal: f64, unit_text: String },
    TimeBased { goal: GoalDuration },
}

impl Tracking {
    pub fn kind(&self) -> TrackingType {
        match self {
            Tracking::Binary => TrackingType::Binary,
            Tracking::Quantitative { .. } => TrackingType::Quantitative,
            Tracking::TimeBased { .. } => TrackingType::TimeBased,
        }
    }
}

/// Which calendar days a flow expects action on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    Days {
        every_day: bool,
        days_of_week: BTreeSet<WeekdayKey>,
    },
    MonthDays(BTreeSet<u32>),
    /// Missing or unreadable recurrence: nothing is ever scheduled.
    Unset,
}

impl Recurrence {
    pub fn every_day() -> Self {
        Recurrence::Days {
            every_day: true,
            days_of_week: BTreeSet::new(),
        }
    }

    pub fn weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        Recurrence::Days {
            every_day: false,
            days_of_week: days.into_iter().map(WeekdayKey).collect(),
        }
    }

    pub fn month_days(days: impl IntoIterator<Item = u32>) -> Self {
        Recurrence::MonthDays(days.into_iter().filter(|d| (1..=31).contains(d)).collect())
    }

    pub fn describe(&self) -> String {
        match self {
            Recurrence::Days { every_day: true, .. } => "every day".to_string(),
            Recurrence::Days { days_of_week, .. } if days_of_week.is_empty() => {
                "no days".to_string()
            }
            Recurrence::Days { days_of_week, .. } => days_of_week
                .iter()
                .map(|d| weekday_abbrev(d.0))
                .collect::<Vec<_>>()
                .join(","),
            Recurrence::MonthDays(days) => format!(
                "monthly on {}",
                days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",")
            ),
            Recurrence::Unset => "unscheduled".to_string(),
        }
    }
}

/// `chrono::Weekday` ordered Monday-first so it can live in a `BTreeSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekdayKey(pub Weekday);

impl Ord for WeekdayKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .num_days_from_monday()
            .cmp(&other.0.num_days_from_monday())
    }
}

impl PartialOrd for WeekdayKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

pub fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Accepts "Mon", "monday", "MO" and similar spellings.
pub fn parse_weekday(s: &str) -> Result<Weekday, FlowError> {
    let lower = s.trim().to_lowercase();
    let day = match lower.get(..2).unwrap_or("") {
        "mo" => Weekday::Mon,
        "tu" => Weekday::Tue,
        "we" => Weekday::Wed,
        "th" => Weekday::Thu,
        "fr" => Weekday::Fri,
        "sa" => Weekday::Sat,
        "su" => Weekday::Sun,
        _ => return Err(FlowError::UnknownWeekday(s.to_string())),
    };
    Ok(day)
}

pub fn parse_date(s: &str) -> Result<NaiveDate, FlowError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| FlowError::BadDate(s.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tracking: Tracking,
    /// `None` when the stored start date could not be read; such a flow
    /// scores as empty.
    pub start_date: Option<NaiveDate>,
    pub recurrence: Recurrence,
    pub status: BTreeMap<NaiveDate, DayStatus>,
}

impl Flow {
    pub fn new(id: impl Into<String>, title: impl Into<String>, tracking: Tracking) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            tracking,
            start_date: None,
            recurrence: Recurrence::every_day(),
            status: BTreeMap::new(),
        }
    }

    pub fn tracking_type(&self) -> TrackingType {
        self.tracking.kind()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayStatus> {
        self.status.get(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tracking_type_labels() {
        assert_eq!(
            "Time-based".parse::<TrackingType>().unwrap(),
            TrackingType::TimeBased
        );
        assert_eq!(
            "quantitative".parse::<TrackingType>().unwrap(),
            TrackingType::Quantitative
        );
        assert!("Streaky".parse::<TrackingType>().is_err());
    }

    #[test]
    fn parses_weekday_spellings() {
        assert_eq!(parse_weekday("Mon").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("thursday").unwrap(), Weekday::Thu);
        assert_eq!(parse_weekday(" SU ").unwrap(), Weekday::Sun);
        assert!(parse_weekday("xx").is_err());
    }

    #[test]
    fn goal_duration_round_trips_seconds() {
        let goal = GoalDuration::from_secs(5430);
        assert_eq!(goal.hours, 1);
        assert_eq!(goal.minutes, 30);
        assert_eq!(goal.seconds, 30);
        assert_eq!(goal.total_secs(), 5430);
    }

    #[test]
    fn month_days_drop_out_of_range_values() {
        let rec = Recurrence::month_days([0, 1, 15, 32]);
        assert_eq!(rec, Recurrence::MonthDays([1, 15].into_iter().collect()));
    }

    #[test]
    fn describes_weekday_recurrence_in_week_order() {
        let rec = Recurrence::weekdays([Weekday::Fri, Weekday::Mon]);
        assert_eq!(rec.describe(), "Mon,Fri");
    }
}
