pub mod achievements;
pub mod clock;
pub mod evaluator;
pub mod insights;
pub mod schedule;
pub mod scoreboard;
pub mod scorer;
pub mod streak;

pub use clock::{Clock, SystemClock};
pub use evaluator::classify_day;
pub use schedule::is_scheduled;
pub use scoreboard::classify_range;
pub use scorer::FlowScorer;
