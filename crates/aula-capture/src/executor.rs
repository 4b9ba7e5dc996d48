//! Spawns and supervises one ffmpeg capture per firing.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use aula_core::config::{CaptureConfig, StorageConfig};
use aula_core::schedule::CaptureRequest;
use chrono::Local;
use tokio::process::Command;
use tracing::{error, info};

use crate::error::{CaptureError, Result};
use crate::output::recording_path;

/// How much captured stderr an error report keeps. ffmpeg repeats itself;
/// the tail is where the actual failure reason lands.
const STDERR_TAIL_CHARS: usize = 2048;

/// Shared, immutable capture settings. One instance serves all firings;
/// every `record` call is independent of every other.
pub struct CaptureExecutor {
    ffmpeg_path: String,
    base_url: String,
    referer: String,
    storage_root: PathBuf,
    grace: Duration,
}

impl CaptureExecutor {
    pub fn new(capture: &CaptureConfig, storage: &StorageConfig) -> Self {
        Self {
            ffmpeg_path: capture.ffmpeg_path.clone(),
            base_url: capture.base_url.trim_end_matches('/').to_string(),
            referer: capture.referer.clone(),
            storage_root: PathBuf::from(&storage.root),
            grace: Duration::from_secs(capture.grace_secs),
        }
    }

    /// Source address for a room's live stream.
    pub fn stream_url(&self, room_id: &str) -> String {
        format!("{}/{}/playlist.m3u8", self.base_url, room_id)
    }

    /// Record one firing. Never fails from the caller's perspective: the
    /// outcome is logged, and any error stays contained here so other due
    /// jobs and the scheduling loop are unaffected.
    pub async fn record(&self, request: &CaptureRequest) {
        info!(
            room = %request.room_id,
            lecture = %request.lecture,
            duration_secs = request.duration_secs,
            "recording started"
        );
        match self.run_capture(request).await {
            Ok(path) => {
                info!(room = %request.room_id, lecture = %request.lecture, path = %path.display(), "recording finished");
            }
            Err(e) => {
                error!(room = %request.room_id, lecture = %request.lecture, "recording failed: {e}");
            }
        }
    }

    async fn run_capture(&self, request: &CaptureRequest) -> Result<PathBuf> {
        let url = self.stream_url(&request.room_id);
        let path = recording_path(
            &self.storage_root,
            &request.lecture,
            &request.room_id,
            Local::now().naive_local(),
        );
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(CaptureError::CreateDir)?;
        }

        // Stream-copy, no re-encode; ffmpeg stops itself after `-t` seconds.
        let child = Command::new(&self.ffmpeg_path)
            .arg("-protocol_whitelist")
            .arg("https,tls,tcp")
            .arg("-headers")
            .arg(format!("Referer: {}", self.referer))
            .arg("-i")
            .arg(&url)
            .arg("-c")
            .arg("copy")
            .arg("-t")
            .arg(request.duration_secs.to_string())
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CaptureError::Spawn(format!("{}: {e}", self.ffmpeg_path)))?;

        // `wait_with_output` takes the child by value, so drive it on its own
        // task and keep the PID for the watchdog kill path.
        let pid = child.id();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(child.wait_with_output().await);
        });

        let deadline = Duration::from_secs(request.duration_secs) + self.grace;
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(Ok(output))) => {
                if output.status.success() {
                    Ok(path)
                } else {
                    Err(CaptureError::FfmpegExit {
                        code: output.status.code().unwrap_or(-1),
                        stderr: tail(&output.stderr),
                    })
                }
            }
            Ok(Ok(Err(e))) => Err(CaptureError::Io(e)),
            Ok(Err(_recv_err)) => Err(CaptureError::Spawn(
                "wait task dropped unexpectedly".to_string(),
            )),
            Err(_elapsed) => {
                // ffmpeg ignored its own cutoff; reclaim the slot.
                if let Some(raw_pid) = pid {
                    #[cfg(unix)]
                    unsafe {
                        libc::kill(raw_pid as libc::pid_t, libc::SIGKILL);
                    }
                    #[cfg(not(unix))]
                    {
                        let _ = std::process::Command::new("taskkill")
                            .args(["/F", "/PID", &raw_pid.to_string()])
                            .output();
                    }
                }
                Err(CaptureError::Watchdog {
                    secs: deadline.as_secs(),
                })
            }
        }
    }
}

fn tail(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end();
    match text.char_indices().nth_back(STDERR_TAIL_CHARS - 1) {
        Some((idx, _)) => text[idx..].to_string(),
        None => text.to_string(),
    }
}
