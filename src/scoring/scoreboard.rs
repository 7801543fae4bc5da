use crate::config::{ScoringConfig, StreakBonusPolicy};
use crate::models::{
    DateRange, DayClass, DayOutcome, DayStatus, Flow, Progress, Rollup, Scoreboard, Tracking,
};
use crate::scoring::evaluator::classify_day;
use crate::scoring::schedule::is_tracked;

const STREAK_BONUS_INTERVAL: u32 = 7;

/// Classification of every tracked day of `flow` within `range`, in date order.
pub fn classify_range(flow: &Flow, range: DateRange) -> Vec<DayOutcome> {
    range
        .days()
        .filter(|date| is_tracked(flow, *date))
        .map(|date| DayOutcome {
            date,
            class: classify_day(flow, flow.day(date)),
        })
        .collect()
}

/// Fold the tracked days of `flow` in `range` into bucket counts, points and
/// rollups. A flow without a readable start date yields an all-zero board.
pub fn scoreboard(flow: &Flow, range: DateRange, config: &ScoringConfig) -> Scoreboard {
    let mut board = Scoreboard::empty(empty_rollup(&flow.tracking));
    if flow.start_date.is_none() {
        log::warn!("flow {} has no readable start date; scoring as empty", flow.id);
        return board;
    }

    let mut running = 0u32;
    let mut total_amount = 0.0f64;
    let mut total_pauses = 0u32;

    for outcome in classify_range(flow, range) {
        let day = flow.day(outcome.date);
        board.scheduled_days += 1;

        match outcome.class {
            DayClass::Completed => board.completed += 1,
            DayClass::Partial => board.partial += 1,
            DayClass::Failed => board.failed += 1,
            DayClass::Skipped => board.skipped += 1,
            DayClass::Inactive => board.inactive += 1,
        }
        board.classification_points += class_points(outcome.class, config);

        if outcome.class == DayClass::Completed {
            running += 1;
            board.streak_bonus += streak_bonus(running, config);
        } else {
            running = 0;
        }

        if let Some(day) = day {
            tally_reflection(&mut board, day, config);
            total_amount += day.amount();
            if let Progress::TimeBased { pauses_count, .. } = &day.progress {
                total_pauses += pauses_count;
            }
        }
    }

    board.final_score =
        board.classification_points + board.streak_bonus + board.emotion_bonus + board.notes_bonus;

    let counted = if config.partial_counts_toward_rate {
        board.completed + board.partial
    } else {
        board.completed
    };
    board.completion_rate = percent(counted, board.scheduled_days);
    board.rollup = rollup(&flow.tracking, total_amount, total_pauses, board.scheduled_days);

    log::debug!(
        "scoreboard {} {}..{}: {} scheduled, score {}",
        flow.id,
        range.start,
        range.end,
        board.scheduled_days,
        board.final_score
    );
    board
}

fn class_points(class: DayClass, config: &ScoringConfig) -> i64 {
    match class {
        DayClass::Completed => config.completed_points,
        DayClass::Partial => config.partial_points,
        DayClass::Failed => config.failed_points,
        DayClass::Skipped => config.skipped_points,
        DayClass::Inactive => config.inactive_points,
    }
}

fn streak_bonus(running: u32, config: &ScoringConfig) -> i64 {
    let earned = match config.streak_bonus {
        StreakBonusPolicy::Weekly => running > 0 && running % STREAK_BONUS_INTERVAL == 0,
        StreakBonusPolicy::Daily => running >= 2,
    };
    if earned { config.streak_bonus_points } else { 0 }
}

fn tally_reflection(board: &mut Scoreboard, day: &DayStatus, config: &ScoringConfig) {
    match emotion_tone(day.emotion.as_deref(), config) {
        Some(Tone::Positive) => {
            board.positive_emotion_days += 1;
            board.emotion_bonus += config.positive_emotion_points;
        }
        Some(Tone::Negative) => {
            board.negative_emotion_days += 1;
            board.emotion_bonus += config.negative_emotion_points;
        }
        None => {}
    }
    if day.has_note() {
        board.notes_written += 1;
        board.notes_bonus += config.note_points;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

/// Look up an emotion label in the configured tables, ignoring case.
pub fn emotion_tone(emotion: Option<&str>, config: &ScoringConfig) -> Option<Tone> {
    let label = emotion?.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }
    let matches = |table: &[String]| table.iter().any(|e| e.trim().to_lowercase() == label);
    if matches(&config.emotion_positive) {
        Some(Tone::Positive)
    } else if matches(&config.emotion_negative) {
        Some(Tone::Negative)
    } else {
        None
    }
}

fn empty_rollup(tracking: &Tracking) -> Rollup {
    rollup(tracking, 0.0, 0, 0)
}

fn rollup(tracking: &Tracking, total: f64, pauses: u32, scheduled: u32) -> Rollup {
    let average = if scheduled == 0 {
        0.0
    } else {
        round1(total / scheduled as f64)
    };
    match tracking {
        Tracking::Binary => Rollup::Binary,
        Tracking::Quantitative { .. } => Rollup::Quantitative {
            total_count: round1(total),
            average_count: average,
        },
        Tracking::TimeBased { .. } => Rollup::TimeBased {
            total_duration: total as u64,
            average_duration: average,
            total_pauses: pauses,
        },
    }
}

/// `100 * part / whole` rounded to one decimal; zero when `whole` is zero.
fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(100.0 * part as f64 / whole as f64)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalDuration, Mark, Recurrence};
    use chrono::{Duration, NaiveDate};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn binary_flow(start: &str, marks: &[Mark]) -> Flow {
        let mut flow = Flow::new("b", "Journal", Tracking::Binary);
        let start = d(start);
        flow.start_date = Some(start);
        for (i, mark) in marks.iter().enumerate() {
            flow.status
                .insert(start + Duration::days(i as i64), DayStatus::marked(*mark));
        }
        flow
    }

    #[test]
    fn all_completed_week_and_a_half() {
        let flow = binary_flow("2024-03-01", &[Mark::Completed; 10]);
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-10")),
            &ScoringConfig::default(),
        );
        assert_eq!(board.scheduled_days, 10);
        assert_eq!(board.completed, 10);
        assert_eq!(board.completion_rate, 100.0);
        assert_eq!(board.classification_points, 100);
        assert_eq!(board.streak_bonus, 5);
        assert_eq!(board.final_score, 105);
    }

    #[test]
    fn daily_bonus_policy_pays_from_second_day() {
        let flow = binary_flow("2024-03-01", &[Mark::Completed; 4]);
        let config = ScoringConfig {
            streak_bonus: StreakBonusPolicy::Daily,
            ..ScoringConfig::default()
        };
        let board = scoreboard(&flow, DateRange::new(d("2024-03-01"), d("2024-03-04")), &config);
        assert_eq!(board.streak_bonus, 15);
    }

    #[test]
    fn buckets_sum_to_scheduled_days() {
        let flow = binary_flow(
            "2024-03-01",
            &[Mark::Completed, Mark::Failed, Mark::Skipped, Mark::Unset],
        );
        // Two trailing days have no record at all.
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-06")),
            &ScoringConfig::default(),
        );
        assert_eq!(board.scheduled_days, 6);
        let buckets: u32 = [
            DayClass::Completed,
            DayClass::Partial,
            DayClass::Failed,
            DayClass::Skipped,
            DayClass::Inactive,
        ]
        .iter()
        .map(|c| board.count(*c))
        .sum();
        assert_eq!(buckets, board.scheduled_days);
        assert_eq!(board.inactive, 3);
        assert_eq!(board.classification_points, 10 - 8 + 0 - 4 * 3);
        assert_eq!(board.completion_rate, 16.7);
    }

    #[test]
    fn range_is_clamped_to_start_date() {
        let flow = binary_flow("2024-03-05", &[Mark::Completed; 2]);
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-06")),
            &ScoringConfig::default(),
        );
        assert_eq!(board.scheduled_days, 2);
    }

    #[test]
    fn no_scheduled_days_means_zero_rate() {
        let mut flow = binary_flow("2024-03-01", &[Mark::Completed; 3]);
        flow.recurrence = Recurrence::Unset;
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-03")),
            &ScoringConfig::default(),
        );
        assert_eq!(board.scheduled_days, 0);
        assert_eq!(board.completion_rate, 0.0);
        assert_eq!(board.final_score, 0);
    }

    #[test]
    fn unreadable_start_date_scores_as_empty() {
        let mut flow = binary_flow("2024-03-01", &[Mark::Completed; 3]);
        flow.start_date = None;
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-03")),
            &ScoringConfig::default(),
        );
        assert_eq!(board, Scoreboard::empty(Rollup::Binary));
    }

    #[test]
    fn emotions_and_notes_add_bonuses() {
        let mut flow = binary_flow("2024-03-01", &[Mark::Completed; 3]);
        if let Some(day) = flow.status.get_mut(&d("2024-03-01")) {
            day.emotion = Some("Happy".to_string());
            day.note = Some("morning run".to_string());
        }
        if let Some(day) = flow.status.get_mut(&d("2024-03-02")) {
            day.emotion = Some("tired".to_string());
            day.note = Some("  ".to_string());
        }
        if let Some(day) = flow.status.get_mut(&d("2024-03-03")) {
            day.emotion = Some("bored".to_string());
        }
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-03")),
            &ScoringConfig::default(),
        );
        assert_eq!(board.emotion_bonus, 1);
        assert_eq!(board.notes_bonus, 1);
        assert_eq!(board.positive_emotion_days, 1);
        assert_eq!(board.negative_emotion_days, 1);
        assert_eq!(board.final_score, 30 + 1 + 1);
    }

    #[test]
    fn partial_policy_changes_rate_only() {
        let mut flow = Flow::new(
            "q",
            "Water",
            Tracking::Quantitative {
                goal: 8.0,
                unit_text: "glasses".to_string(),
            },
        );
        flow.start_date = Some(d("2024-03-01"));
        for (date, count) in [("2024-03-01", 8.0), ("2024-03-02", 4.0)] {
            flow.status.insert(
                d(date),
                DayStatus {
                    progress: Progress::Quantitative {
                        count,
                        goal: None,
                        unit_text: None,
                    },
                    ..DayStatus::default()
                },
            );
        }
        let range = DateRange::new(d("2024-03-01"), d("2024-03-02"));

        let strict = scoreboard(&flow, range, &ScoringConfig::default());
        assert_eq!(strict.partial, 1);
        assert_eq!(strict.completion_rate, 50.0);
        assert_eq!(
            strict.rollup,
            Rollup::Quantitative {
                total_count: 12.0,
                average_count: 6.0
            }
        );

        let lenient = scoreboard(
            &flow,
            range,
            &ScoringConfig {
                partial_counts_toward_rate: true,
                ..ScoringConfig::default()
            },
        );
        assert_eq!(lenient.completion_rate, 100.0);
        assert_eq!(lenient.final_score, strict.final_score);
    }

    #[test]
    fn time_based_rollup_sums_duration_and_pauses() {
        let mut flow = Flow::new(
            "t",
            "Practice",
            Tracking::TimeBased {
                goal: GoalDuration::from_secs(1800),
            },
        );
        flow.start_date = Some(d("2024-03-01"));
        for (date, secs, pauses) in [("2024-03-01", 1800, 1), ("2024-03-02", 600, 2)] {
            flow.status.insert(
                d(date),
                DayStatus {
                    progress: Progress::TimeBased {
                        total_duration: secs,
                        pauses_count: pauses,
                        goal: None,
                    },
                    ..DayStatus::default()
                },
            );
        }
        let board = scoreboard(
            &flow,
            DateRange::new(d("2024-03-01"), d("2024-03-03")),
            &ScoringConfig::default(),
        );
        assert_eq!(board.completed, 1);
        assert_eq!(board.failed, 1);
        assert_eq!(board.inactive, 1);
        assert_eq!(
            board.rollup,
            Rollup::TimeBased {
                total_duration: 2400,
                average_duration: 800.0,
                total_pauses: 3
            }
        );
    }

    #[test]
    fn repeated_calls_are_identical() {
        let flow = binary_flow("2024-03-01", &[Mark::Completed, Mark::Failed, Mark::Completed]);
        let range = DateRange::new(d("2024-03-01"), d("2024-03-05"));
        let config = ScoringConfig::default();
        assert_eq!(scoreboard(&flow, range, &config), scoreboard(&flow, range, &config));
    }

    #[test]
    fn classify_range_skips_unscheduled_days() {
        let mut flow = binary_flow("2024-03-01", &[Mark::Completed; 3]);
        flow.recurrence = Recurrence::month_days([2]);
        let outcomes = classify_range(&flow, DateRange::new(d("2024-03-01"), d("2024-03-03")));
        assert_eq!(
            outcomes,
            vec![DayOutcome {
                date: d("2024-03-02"),
                class: DayClass::Completed
            }]
        );
    }
}
