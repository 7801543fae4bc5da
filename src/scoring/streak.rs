use chrono::{Datelike, NaiveDate};

use crate::models::{DateRange, DayClass, Flow, StreakResult};
use crate::scoring::evaluator::classify_day;
use crate::scoring::schedule::is_tracked;

/// Current and best streak of `flow` over its scheduled days from the start
/// date up to and including `as_of`. Unscheduled days neither break nor
/// extend a streak.
pub fn streaks(flow: &Flow, as_of: NaiveDate) -> StreakResult {
    let Some(start) = flow.start_date else {
        return StreakResult::default();
    };

    let mut running = 0u32;
    let mut best = 0u32;
    let mut run_days: Vec<NaiveDate> = Vec::new();

    for date in DateRange::new(start, as_of).days() {
        if !is_tracked(flow, date) {
            continue;
        }
        if classify_day(flow, flow.day(date)) == DayClass::Completed {
            running += 1;
            best = best.max(running);
            run_days.push(date);
        } else {
            running = 0;
            run_days.clear();
        }
    }

    let streak_days = run_days
        .iter()
        .filter(|d| d.year() == as_of.year() && d.month() == as_of.month())
        .map(|d| d.day())
        .collect();

    StreakResult {
        current_streak: running,
        best_streak: best,
        streak_days,
    }
}
