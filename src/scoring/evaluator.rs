use crate::models::{DayClass, DayStatus, Flow, Mark, Progress, Tracking};

/// Share of the goal at which a day counts as partial.
const PARTIAL_RATIO: f64 = 0.5;

/// Classify one scheduled day of `flow`. A day without a status record is
/// inactive; a day without a measurement is classified by its mark.
pub fn classify_day(flow: &Flow, day: Option<&DayStatus>) -> DayClass {
    let Some(day) = day else {
        return DayClass::Inactive;
    };

    match &flow.tracking {
        Tracking::Binary => classify_mark(day.mark),
        Tracking::Quantitative { goal, .. } => {
            let (count, day_goal) = match &day.progress {
                Progress::Quantitative { count, goal, .. } => (*count, *goal),
                _ => return classify_mark(day.mark),
            };
            let goal = day_goal
                .filter(|g| *g > 0.0)
                .or(Some(*goal).filter(|g| *g > 0.0))
                .unwrap_or(1.0);
            classify_amount(count, goal, day.mark)
        }
        Tracking::TimeBased { goal } => {
            let (duration, day_goal) = match &day.progress {
                Progress::TimeBased {
                    total_duration,
                    goal,
                    ..
                } => (*total_duration, *goal),
                _ => return classify_mark(day.mark),
            };
            let goal_secs = day_goal
                .map(|g| g.total_secs())
                .filter(|s| *s > 0)
                .unwrap_or_else(|| goal.total_secs());
            if goal_secs == 0 {
                // No goal to measure against: any logged time completes.
                return if duration > 0 {
                    DayClass::Completed
                } else {
                    fallback_mark(day.mark)
                };
            }
            classify_amount(duration as f64, goal_secs as f64, day.mark)
        }
    }
}

fn classify_mark(mark: Mark) -> DayClass {
    match mark {
        Mark::Completed => DayClass::Completed,
        Mark::Failed => DayClass::Failed,
        Mark::Skipped => DayClass::Skipped,
        Mark::Unset => DayClass::Inactive,
    }
}

fn classify_amount(amount: f64, goal: f64, mark: Mark) -> DayClass {
    if amount >= goal {
        DayClass::Completed
    } else if amount >= goal * PARTIAL_RATIO {
        DayClass::Partial
    } else if amount > 0.0 {
        DayClass::Failed
    } else {
        fallback_mark(mark)
    }
}

/// Nothing was logged; only an explicit skip or fail is honoured.
fn fallback_mark(mark: Mark) -> DayClass {
    match mark {
        Mark::Skipped => DayClass::Skipped,
        Mark::Failed => DayClass::Failed,
        Mark::Completed | Mark::Unset => DayClass::Inactive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoalDuration;

    fn quantitative(goal: f64) -> Flow {
        Flow::new(
            "q",
            "Pushups",
            Tracking::Quantitative {
                goal,
                unit_text: "reps".to_string(),
            },
        )
    }

    fn timed(secs: u64) -> Flow {
        Flow::new(
            "t",
            "Meditate",
            Tracking::TimeBased {
                goal: GoalDuration::from_secs(secs),
            },
        )
    }

    fn count_day(count: f64, goal: Option<f64>) -> DayStatus {
        DayStatus {
            progress: Progress::Quantitative {
                count,
                goal,
                unit_text: None,
            },
            ..DayStatus::default()
        }
    }

    fn timed_day(total_duration: u64) -> DayStatus {
        DayStatus {
            progress: Progress::TimeBased {
                total_duration,
                pauses_count: 0,
                goal: None,
            },
            ..DayStatus::default()
        }
    }

    #[test]
    fn missing_day_is_inactive() {
        let flow = Flow::new("b", "Walk", Tracking::Binary);
        assert_eq!(classify_day(&flow, None), DayClass::Inactive);
    }

    #[test]
    fn binary_follows_mark() {
        let flow = Flow::new("b", "Walk", Tracking::Binary);
        let cases = [
            (Mark::Completed, DayClass::Completed),
            (Mark::Failed, DayClass::Failed),
            (Mark::Skipped, DayClass::Skipped),
            (Mark::Unset, DayClass::Inactive),
        ];
        for (mark, expected) in cases {
            assert_eq!(classify_day(&flow, Some(&DayStatus::marked(mark))), expected);
        }
    }

    #[test]
    fn half_of_quantitative_goal_is_partial() {
        let flow = quantitative(10.0);
        assert_eq!(
            classify_day(&flow, Some(&count_day(5.0, Some(10.0)))),
            DayClass::Partial
        );
        assert_eq!(
            classify_day(&flow, Some(&count_day(4.0, None))),
            DayClass::Failed
        );
        assert_eq!(
            classify_day(&flow, Some(&count_day(12.0, None))),
            DayClass::Completed
        );
    }

    #[test]
    fn day_goal_overrides_flow_goal() {
        let flow = quantitative(10.0);
        assert_eq!(
            classify_day(&flow, Some(&count_day(4.0, Some(4.0)))),
            DayClass::Completed
        );
    }

    #[test]
    fn zero_goal_falls_back_to_one() {
        let flow = quantitative(0.0);
        assert_eq!(
            classify_day(&flow, Some(&count_day(1.0, Some(0.0)))),
            DayClass::Completed
        );
    }

    #[test]
    fn zero_count_uses_explicit_skip() {
        let flow = quantitative(10.0);
        let mut day = count_day(0.0, None);
        day.mark = Mark::Skipped;
        assert_eq!(classify_day(&flow, Some(&day)), DayClass::Skipped);
        day.mark = Mark::Completed;
        assert_eq!(classify_day(&flow, Some(&day)), DayClass::Inactive);
    }

    #[test]
    fn time_based_goal_met_exactly_completes() {
        let flow = timed(1800);
        assert_eq!(classify_day(&flow, Some(&timed_day(1800))), DayClass::Completed);
        assert_eq!(classify_day(&flow, Some(&timed_day(900))), DayClass::Partial);
        assert_eq!(classify_day(&flow, Some(&timed_day(60))), DayClass::Failed);
        assert_eq!(classify_day(&flow, Some(&timed_day(0))), DayClass::Inactive);
    }

    #[test]
    fn time_based_day_override_wins() {
        let flow = timed(3600);
        let day = DayStatus {
            progress: Progress::TimeBased {
                total_duration: 600,
                pauses_count: 1,
                goal: Some(GoalDuration::from_secs(600)),
            },
            ..DayStatus::default()
        };
        assert_eq!(classify_day(&flow, Some(&day)), DayClass::Completed);
    }

    #[test]
    fn time_based_without_goal_completes_on_any_time() {
        let flow = timed(0);
        assert_eq!(classify_day(&flow, Some(&timed_day(1))), DayClass::Completed);
        assert_eq!(classify_day(&flow, Some(&timed_day(0))), DayClass::Inactive);
    }

    #[test]
    fn day_without_measurement_follows_mark() {
        for flow in [quantitative(10.0), timed(1800)] {
            let cases = [
                (Mark::Completed, DayClass::Completed),
                (Mark::Failed, DayClass::Failed),
                (Mark::Skipped, DayClass::Skipped),
                (Mark::Unset, DayClass::Inactive),
            ];
            for (mark, expected) in cases {
                assert_eq!(classify_day(&flow, Some(&DayStatus::marked(mark))), expected);
            }
        }
    }
}
