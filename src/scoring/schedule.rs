use chrono::{Datelike, NaiveDate};

use crate::models::{Flow, Recurrence, WeekdayKey};

/// Whether `flow`'s recurrence asks for action on `date`.
pub fn is_scheduled(flow: &Flow, date: NaiveDate) -> bool {
    match &flow.recurrence {
        Recurrence::Days {
            every_day,
            days_of_week,
        } => *every_day || days_of_week.contains(&WeekdayKey(date.weekday())),
        Recurrence::MonthDays(days) => days.contains(&date.day()),
        Recurrence::Unset => false,
    }
}

/// Whether `date` falls in the flow's tracked lifetime and is scheduled.
/// A flow with no readable start date tracks nothing.
pub fn is_tracked(flow: &Flow, date: NaiveDate) -> bool {
    match flow.start_date {
        Some(start) => date >= start && is_scheduled(flow, date),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tracking;
    use chrono::Weekday;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn flow_with(recurrence: Recurrence) -> Flow {
        let mut flow = Flow::new("f1", "Read", Tracking::Binary);
        flow.recurrence = recurrence;
        flow.start_date = Some(d("2024-01-01"));
        flow
    }

    #[test]
    fn every_day_schedules_all_dates() {
        let flow = flow_with(Recurrence::every_day());
        assert!(is_scheduled(&flow, d("2024-03-09")));
        assert!(is_scheduled(&flow, d("2024-03-10")));
    }

    #[test]
    fn weekday_recurrence_matches_listed_days_only() {
        // 2024-03-11 is a Monday.
        let flow = flow_with(Recurrence::weekdays([Weekday::Mon, Weekday::Wed]));
        assert!(is_scheduled(&flow, d("2024-03-11")));
        assert!(!is_scheduled(&flow, d("2024-03-12")));
        assert!(is_scheduled(&flow, d("2024-03-13")));
    }

    #[test]
    fn month_recurrence_matches_day_of_month() {
        let flow = flow_with(Recurrence::month_days([1, 15]));
        assert!(is_scheduled(&flow, d("2024-04-01")));
        assert!(is_scheduled(&flow, d("2024-04-15")));
        assert!(!is_scheduled(&flow, d("2024-04-16")));
    }

    #[test]
    fn unset_recurrence_never_schedules() {
        let flow = flow_with(Recurrence::Unset);
        assert!(!is_scheduled(&flow, d("2024-04-01")));
    }

    #[test]
    fn days_before_start_are_not_tracked() {
        let mut flow = flow_with(Recurrence::every_day());
        assert!(!is_tracked(&flow, d("2023-12-31")));
        assert!(is_tracked(&flow, d("2024-01-01")));
        flow.start_date = None;
        assert!(!is_tracked(&flow, d("2024-01-01")));
    }
}
