//! Reader and writer for the JSON store format of the mobile app.
//!
//! Field names are camelCase and day outcomes are symbol strings (`✅`, `❌`,
//! `➖`, `-`, `+`). This is the only place those symbols exist; everything
//! past this module works with [`Mark`].

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::FlowError;
use crate::models::flow::{parse_date, parse_weekday, weekday_abbrev};
use crate::models::{
    DayStatus, Flow, GoalDuration, Mark, Progress, Recurrence, Tracking, TrackingType, WeekdayKey,
};

const SYMBOL_DONE: &str = "✅";
const SYMBOL_FAILED: &str = "❌";
const SYMBOL_SKIPPED: &str = "➖";
const SYMBOL_UNSET: &str = "+";

pub fn symbol_to_mark(symbol: &str) -> Mark {
    match symbol.trim() {
        SYMBOL_DONE => Mark::Completed,
        SYMBOL_FAILED => Mark::Failed,
        SYMBOL_SKIPPED | "-" => Mark::Skipped,
        _ => Mark::Unset,
    }
}

pub fn mark_to_symbol(mark: Mark) -> &'static str {
    match mark {
        Mark::Completed => SYMBOL_DONE,
        Mark::Failed => SYMBOL_FAILED,
        Mark::Skipped => SYMBOL_SKIPPED,
        Mark::Unset => SYMBOL_UNSET,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyFlow {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tracking_type: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    repeat_type: Option<String>,
    #[serde(default)]
    every_day: bool,
    #[serde(default)]
    days_of_week: Vec<String>,
    #[serde(default)]
    selected_month_days: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    goal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hours: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minutes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seconds: Option<Value>,
    #[serde(default)]
    status: BTreeMap<String, LegacyDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDay {
    #[serde(default)]
    symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quantitative: Option<LegacyQuantitative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timebased: Option<LegacyTimebased>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyQuantitative {
    #[serde(default)]
    count: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    goal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTimebased {
    #[serde(default)]
    total_duration: Value,
    #[serde(default)]
    pauses_count: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hours: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minutes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seconds: Option<Value>,
}

/// Numbers in the store are sometimes written as strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn whole(value: Option<&Value>) -> u32 {
    value.and_then(number).map(|n| n.max(0.0) as u32).unwrap_or(0)
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` or a full timestamp whose date part is one.
fn legacy_date(raw: &str) -> Result<NaiveDate, FlowError> {
    parse_date(raw).or_else(|e| {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|t| t.date_naive())
            .map_err(|_| e)
    })
}

fn goal_duration(h: Option<&Value>, m: Option<&Value>, s: Option<&Value>) -> GoalDuration {
    GoalDuration {
        hours: whole(h),
        minutes: whole(m),
        seconds: whole(s),
    }
}

impl LegacyFlow {
    fn into_flow(self) -> Result<Flow, FlowError> {
        let id = id_string(&self.id).ok_or_else(|| FlowError::Invalid("flow without id".into()))?;

        let kind = match self.tracking_type.as_deref() {
            None => TrackingType::Binary,
            Some(raw) => TrackingType::from_str(raw)?,
        };
        let tracking = match kind {
            TrackingType::Binary => Tracking::Binary,
            TrackingType::Quantitative => Tracking::Quantitative {
                goal: self.goal.as_ref().and_then(number).unwrap_or(1.0),
                unit_text: self.unit_text.clone().unwrap_or_default(),
            },
            TrackingType::TimeBased => Tracking::TimeBased {
                goal: goal_duration(
                    self.hours.as_ref(),
                    self.minutes.as_ref(),
                    self.seconds.as_ref(),
                ),
            },
        };

        let start_date = match self.start_date.as_deref().map(legacy_date) {
            Some(Ok(date)) => Some(date),
            Some(Err(e)) => {
                log::warn!("flow {}: {}", id, e);
                None
            }
            None => None,
        };

        let recurrence = match self.repeat_type.as_deref() {
            Some("day") => Recurrence::Days {
                every_day: self.every_day,
                days_of_week: self
                    .days_of_week
                    .iter()
                    .filter_map(|d| parse_weekday(d).ok())
                    .map(WeekdayKey)
                    .collect(),
            },
            Some("month") => Recurrence::month_days(
                self.selected_month_days
                    .iter()
                    .filter_map(number)
                    .filter(|n| n.fract() == 0.0 && *n > 0.0)
                    .map(|n| n as u32),
            ),
            other => {
                if let Some(other) = other {
                    log::warn!("flow {}: {}", id, FlowError::UnknownRepeatType(other.into()));
                }
                Recurrence::Unset
            }
        };

        let mut status = BTreeMap::new();
        for (key, day) in self.status {
            match parse_date(&key) {
                Ok(date) => {
                    status.insert(date, day.into_status(kind));
                }
                Err(e) => log::warn!("flow {}: skipping status entry: {}", id, e),
            }
        }

        Ok(Flow {
            id,
            title: self.title,
            description: self.description,
            tracking,
            start_date,
            recurrence,
            status,
        })
    }

    fn from_flow(flow: &Flow) -> Self {
        let mut legacy = LegacyFlow {
            id: Value::String(flow.id.clone()),
            title: flow.title.clone(),
            description: flow.description.clone(),
            tracking_type: Some(flow.tracking_type().legacy_label().to_string()),
            start_date: flow.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ..LegacyFlow::default()
        };

        match &flow.recurrence {
            Recurrence::Days {
                every_day,
                days_of_week,
            } => {
                legacy.repeat_type = Some("day".to_string());
                legacy.every_day = *every_day;
                legacy.days_of_week = days_of_week
                    .iter()
                    .map(|d| weekday_abbrev(d.0).to_string())
                    .collect();
            }
            Recurrence::MonthDays(days) => {
                legacy.repeat_type = Some("month".to_string());
                legacy.selected_month_days =
                    days.iter().map(|d| Value::String(d.to_string())).collect();
            }
            Recurrence::Unset => {}
        }

        match &flow.tracking {
            Tracking::Binary => {}
            Tracking::Quantitative { goal, unit_text } => {
                legacy.goal = Some(Value::from(*goal));
                legacy.unit_text = Some(unit_text.clone());
            }
            Tracking::TimeBased { goal } => {
                legacy.hours = Some(Value::from(goal.hours));
                legacy.minutes = Some(Value::from(goal.minutes));
                legacy.seconds = Some(Value::from(goal.seconds));
            }
        }

        legacy.status = flow
            .status
            .iter()
            .map(|(date, day)| (date.format("%Y-%m-%d").to_string(), LegacyDay::from_status(day)))
            .collect();
        legacy
    }
}

impl LegacyDay {
    fn into_status(self, kind: TrackingType) -> DayStatus {
        // A day without its sub-record keeps no measurement; the symbol decides.
        let progress = match (kind, self.quantitative, self.timebased) {
            (TrackingType::Quantitative, Some(q), _) => Progress::Quantitative {
                count: number(&q.count).unwrap_or(0.0),
                goal: q.goal.as_ref().and_then(number),
                unit_text: q.unit_text,
            },
            (TrackingType::TimeBased, _, Some(t)) => {
                let goal = goal_duration(t.hours.as_ref(), t.minutes.as_ref(), t.seconds.as_ref());
                Progress::TimeBased {
                    total_duration: whole(Some(&t.total_duration)) as u64,
                    pauses_count: whole(Some(&t.pauses_count)),
                    goal: (goal.total_secs() > 0).then_some(goal),
                }
            }
            _ => Progress::Binary,
        };

        DayStatus {
            mark: symbol_to_mark(&self.symbol),
            emotion: self.emotion.filter(|e| !e.trim().is_empty()),
            note: self.note,
            timestamp: self
                .timestamp
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc)),
            progress,
        }
    }

    fn from_status(day: &DayStatus) -> Self {
        let mut legacy = LegacyDay {
            symbol: mark_to_symbol(day.mark).to_string(),
            emotion: day.emotion.clone(),
            note: day.note.clone(),
            timestamp: day.timestamp.map(|t| t.to_rfc3339()),
            ..LegacyDay::default()
        };
        match &day.progress {
            Progress::Binary => {}
            Progress::Quantitative {
                count,
                goal,
                unit_text,
            } => {
                legacy.quantitative = Some(LegacyQuantitative {
                    count: Value::from(*count),
                    goal: goal.map(Value::from),
                    unit_text: unit_text.clone(),
                });
            }
            Progress::TimeBased {
                total_duration,
                pauses_count,
                goal,
            } => {
                legacy.timebased = Some(LegacyTimebased {
                    total_duration: Value::from(*total_duration),
                    pauses_count: Value::from(*pauses_count),
                    hours: goal.map(|g| Value::from(g.hours)),
                    minutes: goal.map(|g| Value::from(g.minutes)),
                    seconds: goal.map(|g| Value::from(g.seconds)),
                });
            }
        }
        legacy
    }
}

/// Parse an exported flow list. Flows that cannot be interpreted are logged
/// and left out; the rest are returned.
pub fn parse_flows(json: &str) -> Result<Vec<Flow>> {
    let raw: Vec<LegacyFlow> = serde_json::from_str(json).context("Parsing flow JSON")?;
    let mut flows = Vec::with_capacity(raw.len());
    for legacy in raw {
        let title = legacy.title.clone();
        match legacy.into_flow() {
            Ok(flow) => flows.push(flow),
            Err(e) => log::warn!("skipping flow '{}': {}", title, e),
        }
    }
    Ok(flows)
}

pub fn to_json(flows: &[Flow]) -> Result<String> {
    let legacy: Vec<LegacyFlow> = flows.iter().map(LegacyFlow::from_flow).collect();
    serde_json::to_string_pretty(&legacy).context("Serializing flows")
}

pub fn read_file(path: &Path) -> Result<Vec<Flow>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
    parse_flows(&content)
}
