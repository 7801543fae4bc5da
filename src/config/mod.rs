pub mod settings;

pub use settings::{AppConfig, ScoringConfig, StreakBonusPolicy};
