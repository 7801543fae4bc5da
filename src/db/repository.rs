use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::flow::{parse_date, parse_weekday, weekday_abbrev};
use crate::models::{
    DayStatus, Flow, GoalDuration, Mark, Progress, Recurrence, Tracking, TrackingType, WeekdayKey,
};
use crate::scoring::schedule::is_tracked;

/// Storage seam between the CLI and wherever flows live.
pub trait FlowRepository {
    fn list_flows(&self) -> Result<Vec<Flow>>;
    fn get_flow(&self, id: &str) -> Result<Option<Flow>>;
    fn save_flow(&self, flow: &Flow) -> Result<()>;
    /// Removes the flow and every status entry it owns. Returns whether the
    /// flow existed.
    fn delete_flow(&self, id: &str) -> Result<bool>;

    /// Look a flow up by id, then by case-insensitive title.
    fn find(&self, key: &str) -> Result<Option<Flow>> {
        if let Some(flow) = self.get_flow(key)? {
            return Ok(Some(flow));
        }
        let key = key.trim().to_lowercase();
        Ok(self
            .list_flows()?
            .into_iter()
            .find(|f| f.title.to_lowercase() == key))
    }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

const FLOW_COLUMNS: &str = "id, title, description, tracking_type, goal, unit_text,
    goal_hours, goal_minutes, goal_seconds, start_date, repeat_type, every_day,
    days_of_week, month_days";

struct FlowRow {
    id: String,
    title: String,
    description: String,
    tracking_type: String,
    goal: Option<f64>,
    unit_text: Option<String>,
    goal_hours: i64,
    goal_minutes: i64,
    goal_seconds: i64,
    start_date: Option<String>,
    repeat_type: Option<String>,
    every_day: bool,
    days_of_week: String,
    month_days: String,
}

fn flow_row(row: &Row) -> rusqlite::Result<FlowRow> {
    Ok(FlowRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        tracking_type: row.get(3)?,
        goal: row.get(4)?,
        unit_text: row.get(5)?,
        goal_hours: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
        goal_minutes: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
        goal_seconds: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
        start_date: row.get(9)?,
        repeat_type: row.get(10)?,
        every_day: row.get::<_, Option<i32>>(11)?.unwrap_or(0) != 0,
        days_of_week: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
        month_days: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
    })
}

impl FlowRow {
    fn into_flow(self) -> Result<Flow> {
        let tracking = match TrackingType::from_str(&self.tracking_type)? {
            TrackingType::Binary => Tracking::Binary,
            TrackingType::Quantitative => Tracking::Quantitative {
                goal: self.goal.unwrap_or(1.0),
                unit_text: self.unit_text.unwrap_or_default(),
            },
            TrackingType::TimeBased => Tracking::TimeBased {
                goal: GoalDuration {
                    hours: self.goal_hours.max(0) as u32,
                    minutes: self.goal_minutes.max(0) as u32,
                    seconds: self.goal_seconds.max(0) as u32,
                },
            },
        };

        let start_date = match self.start_date.as_deref() {
            Some(raw) => match parse_date(raw) {
                Ok(date) => Some(date),
                Err(e) => {
                    log::warn!("flow {}: {}", self.id, e);
                    None
                }
            },
            None => None,
        };

        let recurrence = match self.repeat_type.as_deref() {
            Some("day") => Recurrence::Days {
                every_day: self.every_day,
                days_of_week: split_list(&self.days_of_week)
                    .filter_map(|s| parse_weekday(s).ok())
                    .map(WeekdayKey)
                    .collect(),
            },
            Some("month") => Recurrence::MonthDays(
                split_list(&self.month_days)
                    .filter_map(|s| s.parse::<u32>().ok())
                    .filter(|d| (1..=31).contains(d))
                    .collect(),
            ),
            _ => Recurrence::Unset,
        };

        Ok(Flow {
            id: self.id,
            title: self.title,
            description: self.description,
            tracking,
            start_date,
            recurrence,
            status: BTreeMap::new(),
        })
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn encode_recurrence(rec: &Recurrence) -> (Option<&'static str>, bool, String, String) {
    match rec {
        Recurrence::Days {
            every_day,
            days_of_week,
        } => (
            Some("day"),
            *every_day,
            days_of_week
                .iter()
                .map(|d| weekday_abbrev(d.0))
                .collect::<Vec<_>>()
                .join(","),
            String::new(),
        ),
        Recurrence::MonthDays(days) => (
            Some("month"),
            false,
            String::new(),
            days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(","),
        ),
        Recurrence::Unset => (None, false, String::new(), String::new()),
    }
}

struct DayRow {
    date: String,
    mark: String,
    emotion: Option<String>,
    note: Option<String>,
    timestamp: Option<String>,
    count: Option<f64>,
    day_goal: Option<f64>,
    unit_text: Option<String>,
    total_duration: Option<i64>,
    pauses_count: Option<i64>,
    goal_seconds: Option<i64>,
}

fn day_row(row: &Row) -> rusqlite::Result<DayRow> {
    Ok(DayRow {
        date: row.get(0)?,
        mark: row.get(1)?,
        emotion: row.get(2)?,
        note: row.get(3)?,
        timestamp: row.get(4)?,
        count: row.get(5)?,
        day_goal: row.get(6)?,
        unit_text: row.get(7)?,
        total_duration: row.get(8)?,
        pauses_count: row.get(9)?,
        goal_seconds: row.get(10)?,
    })
}

impl DayRow {
    /// Progress is rebuilt from the owning flow's tracking type so a day can
    /// never carry a mismatched measurement.
    fn into_status(self, kind: TrackingType) -> Result<(NaiveDate, DayStatus)> {
        let date = parse_date(&self.date)?;
        // NULL measurement columns mean the day was recorded by mark alone.
        let progress = match (kind, self.count, self.total_duration) {
            (TrackingType::Quantitative, Some(count), _) => Progress::Quantitative {
                count,
                goal: self.day_goal,
                unit_text: self.unit_text,
            },
            (TrackingType::TimeBased, _, Some(total)) => Progress::TimeBased {
                total_duration: total.max(0) as u64,
                pauses_count: self.pauses_count.unwrap_or(0).max(0) as u32,
                goal: self
                    .goal_seconds
                    .filter(|s| *s > 0)
                    .map(|s| GoalDuration::from_secs(s as u64)),
            },
            _ => Progress::Binary,
        };
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));
        Ok((
            date,
            DayStatus {
                mark: Mark::from_str(&self.mark)?,
                emotion: self.emotion,
                note: self.note,
                timestamp,
                progress,
            },
        ))
    }
}

/// Longest lookahead window `ensure_window` will seed.
const MAX_WINDOW_DAYS: u32 = 366;

// ─── Flow repo ───────────────────────────────────────────────────────────────

pub struct FlowRepo<'c> {
    conn: &'c Connection,
}

impl<'c> FlowRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn load_status(&self, flow: &mut Flow) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "SELECT date, mark, emotion, note, timestamp, count, day_goal, unit_text,
                    total_duration, pauses_count, goal_seconds
             FROM day_status WHERE flow_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![flow.id], day_row)?;

        let kind = flow.tracking_type();
        for r in rows {
            let (date, status) = r?.into_status(kind)?;
            flow.status.insert(date, status);
        }
        Ok(())
    }

    pub fn upsert_day(&self, flow_id: &str, date: NaiveDate, day: &DayStatus) -> Result<()> {
        let (count, day_goal, unit_text, total_duration, pauses_count, goal_seconds) =
            match &day.progress {
                Progress::Binary => (None, None, None, None, None, None),
                Progress::Quantitative {
                    count,
                    goal,
                    unit_text,
                } => (Some(*count), *goal, unit_text.clone(), None, None, None),
                Progress::TimeBased {
                    total_duration,
                    pauses_count,
                    goal,
                } => (
                    None,
                    None,
                    None,
                    Some(*total_duration as i64),
                    Some(*pauses_count as i64),
                    goal.map(|g| g.total_secs() as i64),
                ),
            };

        self.conn.execute(
            "INSERT INTO day_status (flow_id, date, mark, emotion, note, timestamp, count,
                                     day_goal, unit_text, total_duration, pauses_count, goal_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(flow_id, date) DO UPDATE SET
                mark = ?3, emotion = ?4, note = ?5, timestamp = ?6, count = ?7,
                day_goal = ?8, unit_text = ?9, total_duration = ?10, pauses_count = ?11,
                goal_seconds = ?12",
            params![
                flow_id,
                date.format("%Y-%m-%d").to_string(),
                day.mark.as_str(),
                day.emotion,
                day.note,
                day.timestamp.map(|t| t.to_rfc3339()),
                count,
                day_goal,
                unit_text,
                total_duration,
                pauses_count,
                goal_seconds,
            ],
        )?;
        Ok(())
    }

    /// Ensure an empty status row exists for every scheduled day of every
    /// flow from `today` through the next `days - 1` days, at most
    /// `MAX_WINDOW_DAYS`. Returns the number of rows created.
    pub fn ensure_window(&self, today: NaiveDate, days: u32) -> Result<usize> {
        let mut created = 0;
        if days > MAX_WINDOW_DAYS {
            log::warn!("lookahead of {} days capped at {}", days, MAX_WINDOW_DAYS);
        }
        let dates: Vec<NaiveDate> = std::iter::successors(Some(today), |d| d.succ_opt())
            .take(days.min(MAX_WINDOW_DAYS) as usize)
            .collect();
        for flow in self.list_flows()? {
            for &date in &dates {
                if !is_tracked(&flow, date) {
                    continue;
                }
                created += self.conn.execute(
                    "INSERT OR IGNORE INTO day_status (flow_id, date, mark)
                     VALUES (?1, ?2, 'unset')",
                    params![flow.id, date.format("%Y-%m-%d").to_string()],
                )?;
            }
        }
        log::debug!("seeded {} status rows from {}", created, today);
        Ok(created)
    }
}

impl FlowRepository for FlowRepo<'_> {
    fn list_flows(&self) -> Result<Vec<Flow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM flows ORDER BY rowid", FLOW_COLUMNS))?;
        let rows = stmt
            .query_map([], flow_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let mut flow = row.into_flow()?;
            self.load_status(&mut flow)?;
            result.push(flow);
        }
        Ok(result)
    }

    fn get_flow(&self, id: &str) -> Result<Option<Flow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM flows WHERE id = ?1", FLOW_COLUMNS),
                params![id],
                flow_row,
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(row) => {
                let mut flow = row.into_flow()?;
                self.load_status(&mut flow)?;
                Ok(Some(flow))
            }
        }
    }

    fn save_flow(&self, flow: &Flow) -> Result<()> {
        let (goal, unit_text, goal_duration) = match &flow.tracking {
            Tracking::Binary => (None, None, GoalDuration::default()),
            Tracking::Quantitative { goal, unit_text } => {
                (Some(*goal), Some(unit_text.clone()), GoalDuration::default())
            }
            Tracking::TimeBased { goal } => (None, None, *goal),
        };
        let (repeat_type, every_day, days_of_week, month_days) =
            encode_recurrence(&flow.recurrence);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO flows (id, title, description, tracking_type, goal, unit_text,
                                goal_hours, goal_minutes, goal_seconds, start_date,
                                repeat_type, every_day, days_of_week, month_days)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                title = ?2, description = ?3, tracking_type = ?4, goal = ?5, unit_text = ?6,
                goal_hours = ?7, goal_minutes = ?8, goal_seconds = ?9, start_date = ?10,
                repeat_type = ?11, every_day = ?12, days_of_week = ?13, month_days = ?14",
            params![
                flow.id,
                flow.title,
                flow.description,
                flow.tracking_type().as_str(),
                goal,
                unit_text,
                goal_duration.hours,
                goal_duration.minutes,
                goal_duration.seconds,
                flow.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                repeat_type,
                every_day,
                days_of_week,
                month_days,
            ],
        )?;
        tx.execute("DELETE FROM day_status WHERE flow_id = ?1", params![flow.id])?;
        for (date, day) in &flow.status {
            self.upsert_day(&flow.id, *date, day)?;
        }
        tx.commit()
            .with_context(|| format!("Saving flow {}", flow.id))?;
        Ok(())
    }

    fn delete_flow(&self, id: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM day_status WHERE flow_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM flows WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
