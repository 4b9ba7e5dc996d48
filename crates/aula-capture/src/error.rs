use thiserror::Error;

/// Failure classes of a single capture run. All of them stay inside the
/// executor — `record` logs and returns.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to launch capture process: {0}")]
    Spawn(String),

    #[error("I/O error while supervising capture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture process exited with status {code}: {stderr}")]
    FfmpegExit { code: i32, stderr: String },

    #[error("Capture watchdog expired after {secs}s — process killed")]
    Watchdog { secs: u64 },
}

pub type Result<T> = std::result::Result<T, CaptureError>;
