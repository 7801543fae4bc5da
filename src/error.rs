use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Unknown tracking type: {0}")]
    UnknownTrackingType(String),

    #[error("Unknown repeat type: {0}")]
    UnknownRepeatType(String),

    #[error("Bad date '{0}', expected YYYY-MM-DD")]
    BadDate(String),

    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("Unknown mark: {0}")]
    UnknownMark(String),

    #[error("Flow '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),
}
