use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::app_dirs::AppDirs;
use crate::session::{
    SessionState, TimerMode, DEFAULT_BREAK_MINUTES, DEFAULT_TOTAL_COUNT, DEFAULT_WORK_MINUTES,
    MIN_MINUTES, MIN_TOTAL,
};

/// Startup defaults. Nothing from a running session is ever written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub total_count: u32,
    pub timer_mode: TimerMode,
    pub theatre_mode: bool,
    pub progress_visible: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            total_count: DEFAULT_TOTAL_COUNT,
            timer_mode: TimerMode::Pomodoro,
            theatre_mode: true,
            progress_visible: true,
        }
    }
}

impl From<&Config> for SessionState {
    fn from(cfg: &Config) -> Self {
        let work_minutes = cfg.work_minutes.max(MIN_MINUTES);
        SessionState {
            work_minutes,
            break_minutes: cfg.break_minutes.max(MIN_MINUTES),
            total_count: cfg.total_count.max(MIN_TOTAL),
            timer_mode: cfg.timer_mode,
            theatre_mode: cfg.theatre_mode,
            progress_visible: cfg.progress_visible,
            seconds_remaining: work_minutes as u64 * 60,
            ..SessionState::default()
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("focus_study.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring config {}: {}", self.path.display(), e);
                Config::default()
            }
        }
    }
}
