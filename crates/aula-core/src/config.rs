use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{AulaError, Result};

/// Top-level config (aula.toml + AULA_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AulaConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Where the desired-state schedule file lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Path to the YAML schedule file.
    /// Override with env var: AULA_SCHEDULE_PATH=/etc/aula/schedule.yml
    #[serde(default = "default_schedule_path")]
    pub path: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            path: default_schedule_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for recording artifacts. One subdirectory per lecture.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Settings for the ffmpeg capture invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Stream endpoint base; the room id and `playlist.m3u8` are appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Referer header value the streaming origin requires.
    #[serde(default = "default_referer")]
    pub referer: String,
    /// ffmpeg binary to invoke (name resolved via PATH, or an absolute path).
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Watchdog margin on top of the instructed recording duration. A capture
    /// still running `grace_secs` past its cutoff is killed.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            referer: default_referer(),
            ffmpeg_path: default_ffmpeg_path(),
            grace_secs: default_grace_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between timer-registry pump ticks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Seconds between schedule reconciliation passes.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
    /// IANA timezone the schedule file's day+time entries are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            reconcile_interval_secs: default_reconcile_interval(),
            timezone: default_timezone(),
        }
    }
}

impl DaemonConfig {
    /// Parse the configured timezone name.
    ///
    /// This is the one configuration error that is fatal at startup — without
    /// a valid zone no trigger time can be computed.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| AulaError::Timezone(self.timezone.clone()))
    }
}

fn default_schedule_path() -> String {
    "config.yml".to_string()
}
fn default_storage_root() -> String {
    "video-downloads".to_string()
}
fn default_base_url() -> String {
    "https://live.video.tuwien.ac.at/lecturetube-live".to_string()
}
fn default_referer() -> String {
    "https://tuwel.tuwien.ac.at/".to_string()
}
fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}
fn default_grace_secs() -> u64 {
    120
}
fn default_poll_interval() -> u64 {
    3
}
fn default_reconcile_interval() -> u64 {
    10
}
fn default_timezone() -> String {
    "Europe/Vienna".to_string()
}

impl AulaConfig {
    /// Load config from a TOML file with AULA_* env var overrides.
    ///
    /// The file may be absent — every section has defaults, so a bare
    /// `AULA_STORAGE_ROOT=/srv/recordings aula-daemon` works without one.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path.unwrap_or("aula.toml");

        let config: AulaConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("AULA_").split("_"))
            .extract()
            .map_err(|e| AulaError::Config(e.to_string()))?;

        Ok(config)
    }
}
