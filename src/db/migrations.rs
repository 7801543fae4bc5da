use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS flows (
            id             TEXT PRIMARY KEY,
            title          TEXT NOT NULL,
            description    TEXT NOT NULL DEFAULT '',
            tracking_type  TEXT NOT NULL
                           CHECK(tracking_type IN ('binary','quantitative','timebased')),
            goal           REAL,
            unit_text      TEXT,
            goal_hours     INTEGER DEFAULT 0,
            goal_minutes   INTEGER DEFAULT 0,
            goal_seconds   INTEGER DEFAULT 0,
            start_date     TEXT,
            repeat_type    TEXT CHECK(repeat_type IS NULL OR repeat_type IN ('day','month')),
            every_day      INTEGER DEFAULT 0,
            days_of_week   TEXT DEFAULT '',
            month_days     TEXT DEFAULT '',
            created_at     TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS day_status (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            flow_id         TEXT NOT NULL REFERENCES flows(id),
            date            TEXT NOT NULL,
            mark            TEXT NOT NULL DEFAULT 'unset'
                            CHECK(mark IN ('completed','failed','skipped','unset')),
            emotion         TEXT,
            note            TEXT,
            timestamp       TEXT,
            count           REAL,
            day_goal        REAL,
            unit_text       TEXT,
            total_duration  INTEGER,
            pauses_count    INTEGER,
            goal_seconds    INTEGER,
            UNIQUE(flow_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_day_status_flow ON day_status(flow_id, date);
    ")?;
    Ok(())
}
