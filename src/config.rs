use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::http_cache::app_cache_dir;

pub const DEFAULT_DATA_URL: &str = "https://limerickgaahub.ie/data/hurling_2025.json";
pub const DEFAULT_KNOCKOUT_URL: &str = "https://limerickgaahub.ie/data/knockout_2025.json";
pub const DEFAULT_SHARE_BASE: &str = "https://limerickgaahub.ie/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_url: String,
    pub knockout_url: Option<String>,
    pub overrides_path: Option<PathBuf>,
    pub fetch_retries: u32,
    pub refresh_interval: Duration,
    pub share_base: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            knockout_url: Some(DEFAULT_KNOCKOUT_URL.to_string()),
            overrides_path: None,
            fetch_retries: 2,
            refresh_interval: Duration::from_secs(300),
            share_base: DEFAULT_SHARE_BASE.to_string(),
            log_dir: app_cache_dir().map(|dir| dir.join("logs")),
        }
    }
}

impl Config {
    /// Reads `HURLING_*` variables; call `load_env_files` first so `.env`
    /// entries are visible.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let knockout_url = match env::var("HURLING_KNOCKOUT_URL") {
            Ok(val) if val.trim().is_empty() => None,
            Ok(val) => Some(val.trim().to_string()),
            Err(_) => defaults.knockout_url,
        };
        Self {
            data_url: opt_env("HURLING_DATA_URL").unwrap_or(defaults.data_url),
            knockout_url,
            overrides_path: opt_env("HURLING_OVERRIDES_PATH").map(PathBuf::from),
            fetch_retries: env::var("HURLING_FETCH_RETRIES")
                .ok()
                .and_then(|val| val.parse::<u32>().ok())
                .unwrap_or(defaults.fetch_retries)
                .clamp(0, 5),
            refresh_interval: Duration::from_secs(
                env::var("HURLING_REFRESH_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok())
                    .unwrap_or(defaults.refresh_interval.as_secs())
                    .max(30),
            ),
            share_base: opt_env("HURLING_SHARE_BASE").unwrap_or(defaults.share_base),
            log_dir: opt_env("HURLING_LOG_DIR")
                .map(PathBuf::from)
                .or(defaults.log_dir),
        }
    }
}

pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
