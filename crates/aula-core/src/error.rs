use thiserror::Error;

/// Errors surfaced by the core configuration layer.
///
/// Schedule-file problems are NOT represented here — the schedule loader
/// swallows them by contract (fail-safe-empty) and only logs.
#[derive(Debug, Error)]
pub enum AulaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    Timezone(String),
}

pub type Result<T> = std::result::Result<T, AulaError>;
