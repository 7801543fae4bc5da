use chrono::NaiveDate;

use crate::config::ScoringConfig;
use crate::models::{Achievement, DateRange, Flow, Insight, Scoreboard, StreakResult};
use crate::scoring::achievements::{self, Totals};
use crate::scoring::clock::Clock;
use crate::scoring::insights::{self, FlowSnapshot};
use crate::scoring::scoreboard::{classify_range, scoreboard};
use crate::scoring::streak::streaks;

/// Entry point for the analytics the CLI shows: binds the scoring policy to
/// a clock so "today" is injectable.
pub struct FlowScorer<'a, C: Clock> {
    pub config: &'a ScoringConfig,
    pub clock: C,
}

impl<'a, C: Clock> FlowScorer<'a, C> {
    pub fn new(config: &'a ScoringConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn compute_scoreboard(&self, flow: &Flow, range: DateRange) -> Scoreboard {
        scoreboard(flow, range, self.config)
    }

    pub fn compute_streaks(&self, flow: &Flow, as_of: NaiveDate) -> StreakResult {
        streaks(flow, as_of)
    }

    /// Range from the flow's start date to today, or an empty range when the
    /// start date is unknown.
    pub fn lifetime(&self, flow: &Flow) -> DateRange {
        let today = self.today();
        match flow.start_date {
            Some(start) => DateRange::new(start, today),
            None => DateRange::new(today, today),
        }
    }

    pub fn snapshot<'f>(&self, flow: &'f Flow) -> FlowSnapshot<'f> {
        let range = self.lifetime(flow);
        FlowSnapshot {
            flow,
            board: self.compute_scoreboard(flow, range),
            streak: self.compute_streaks(flow, range.end),
            outcomes: classify_range(flow, range),
        }
    }

    pub fn list_achievements(&self, flows: &[Flow]) -> Vec<Achievement> {
        let mut totals = Totals::default();
        for flow in flows {
            let range = self.lifetime(flow);
            let board = self.compute_scoreboard(flow, range);
            let streak = self.compute_streaks(flow, range.end);
            totals.add(&board, &streak);
        }
        achievements::evaluate(&totals)
    }

    pub fn list_insights(&self, flows: &[Flow]) -> Vec<Insight> {
        flows
            .iter()
            .flat_map(|flow| insights::evaluate(&self.snapshot(flow)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayStatus, GoalDuration, Mark, Progress, Tracking};
    use crate::scoring::clock::FixedClock;
    use chrono::Duration;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn completed_flow(id: &str, today: NaiveDate, days: i64) -> Flow {
        let mut flow = Flow::new(id, id, Tracking::Binary);
        let start = today - Duration::days(days - 1);
        flow.start_date = Some(start);
        for i in 0..days {
            flow.status
                .insert(start + Duration::days(i), DayStatus::marked(Mark::Completed));
        }
        flow
    }

    #[test]
    fn ten_day_streak_scenario() {
        let today = d("2024-05-20");
        let config = ScoringConfig::default();
        let scorer = FlowScorer::new(&config, FixedClock::on(today));
        let flow = completed_flow("read", today, 10);

        let board = scorer.compute_scoreboard(&flow, scorer.lifetime(&flow));
        assert_eq!(board.completed, 10);
        assert_eq!(board.completion_rate, 100.0);

        let streak = scorer.compute_streaks(&flow, today);
        assert_eq!(streak.current_streak, 10);
        assert_eq!(streak.best_streak, 10);
    }

    #[test]
    fn broken_streak_scenario() {
        let today = d("2024-05-20");
        let config = ScoringConfig::default();
        let scorer = FlowScorer::new(&config, FixedClock::on(today));
        let mut flow = completed_flow("run", today, 10);
        flow.status
            .insert(today - Duration::days(3), DayStatus::marked(Mark::Failed));

        let streak = scorer.compute_streaks(&flow, today);
        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.best_streak, 6);
    }

    #[test]
    fn invalid_start_scores_zero_without_panicking() {
        let today = d("2024-05-20");
        let config = ScoringConfig::default();
        let scorer = FlowScorer::new(&config, FixedClock::on(today));
        let mut flow = completed_flow("x", today, 5);
        flow.start_date = None;

        let board = scorer.compute_scoreboard(&flow, scorer.lifetime(&flow));
        assert_eq!(board.scheduled_days, 0);
        assert_eq!(board.final_score, 0);
        assert_eq!(scorer.compute_streaks(&flow, today), StreakResult::default());
    }

    #[test]
    fn achievements_aggregate_across_flows() {
        let today = d("2024-05-20");
        let config = ScoringConfig::default();
        let scorer = FlowScorer::new(&config, FixedClock::on(today));
        let flows = vec![completed_flow("a", today, 60), completed_flow("b", today, 45)];

        let list = scorer.list_achievements(&flows);
        let century = list.iter().find(|a| a.id == "century_club").unwrap();
        assert!(century.unlocked);
        let month = list.iter().find(|a| a.id == "month_master").unwrap();
        assert!(month.unlocked);
        let collector = list.iter().find(|a| a.id == "flow_collector").unwrap();
        assert_eq!(collector.progress, 2);
        assert!(!collector.unlocked);
    }

    #[test]
    fn insights_are_tagged_with_their_flow() {
        let today = d("2024-05-20");
        let config = ScoringConfig::default();
        let scorer = FlowScorer::new(&config, FixedClock::on(today));
        let mut timed = Flow::new(
            "med",
            "Meditate",
            Tracking::TimeBased {
                goal: GoalDuration::from_secs(1800),
            },
        );
        timed.start_date = Some(today - Duration::days(1));
        timed.status.insert(
            today,
            DayStatus {
                progress: Progress::TimeBased {
                    total_duration: 1800,
                    pauses_count: 0,
                    goal: None,
                },
                ..DayStatus::default()
            },
        );
        let flows = vec![completed_flow("read", today, 10), timed];

        let list = scorer.list_insights(&flows);
        assert!(list.iter().any(|i| i.flow_id == "read" && i.title == "On a roll"));
        assert!(list.iter().any(|i| i.flow_id == "med" && i.title == "Just getting started"));
    }
}
