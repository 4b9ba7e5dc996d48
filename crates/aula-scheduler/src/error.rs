use thiserror::Error;

/// Errors raised while interpreting schedule entries.
///
/// Both variants are recoverable by contract: the reconciler logs the
/// offending entry and moves on with the rest of the pass.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid day in schedule: {0}")]
    InvalidDay(String),

    #[error("Invalid time in schedule: {0} (expected HH:MM)")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
