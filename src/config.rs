//! Configuration management for the auto-skipper.
//!
//! Settings are read from environment variables, which are populated from a
//! dotenv-style settings file:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory, or the file given with `--env-file`
//! 3. Application defaults for every tunable
//!
//! Credentials have no default and must be present.

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::{Result, SkipError};

pub const APP_DIR: &str = "spotskip";

pub const DEFAULT_SKIP_WINDOW_DAYS: i64 = 60;
pub const MAX_SKIP_WINDOW_DAYS: i64 = 36_500;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 120;
pub const DEFAULT_PATTERN_SAMPLE_SIZE: usize = 5;
pub const DEFAULT_PATTERN_TOLERANCE_DAYS: i64 = 2;
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_CONTROL_ADDRESS: &str = "127.0.0.1:8740";

/// Loads environment variables from the settings file.
///
/// Without an explicit path the file is looked up in the platform-specific
/// local data directory:
/// - Linux: `~/.local/share/spotskip/.env`
/// - macOS: `~/Library/Application Support/spotskip/.env`
/// - Windows: `%LOCALAPPDATA%/spotskip/.env`
///
/// Variables already set in the process environment are left untouched.
///
/// # Errors
///
/// Fails when the data directory cannot be created or the file cannot be
/// read or parsed.
pub async fn load_env(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = path.unwrap_or_else(|| data_dir().join(".env"));
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    dotenv::from_path(&path).map_err(|e| {
        SkipError::Config(format!("cannot load {}: {}", path.display(), e))
    })?;
    Ok(path)
}

/// The local data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Folder holding the daily log files.
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Address of the local control server.
///
/// Read from `CONTROL_ADDRESS`, falling back to `127.0.0.1:8740`.
pub fn control_address() -> Result<SocketAddr> {
    let raw = env::var("CONTROL_ADDRESS").unwrap_or_else(|_| DEFAULT_CONTROL_ADDRESS.to_string());
    parse_socket_addr(&raw)
}

fn parse_socket_addr(raw: &str) -> Result<SocketAddr> {
    SocketAddr::from_str(raw.trim())
        .map_err(|e| SkipError::Config(format!("CONTROL_ADDRESS '{}': {}", raw, e)))
}

/// Every setting the skipper runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub lastfm_user: String,
    pub lastfm_api_key: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_refresh_token: String,

    pub skip_window_days: i64,
    pub poll_interval: Duration,
    pub pattern_sample_size: usize,
    pub pattern_tolerance_days: i64,
    pub pattern_restart_enabled: bool,
    pub filler_playlist: Option<String>,
    pub remote_control_url: Option<String>,

    pub spotify_api_url: String,
    pub spotify_token_url: String,
    pub lastfm_api_url: String,
    pub control_address: SocketAddr,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// Blank values are treated like missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| SkipError::Config(format!("{} must be set", key)))
        };

        let pattern_sample_size = parse_or(
            get("PATTERN_SAMPLE_SIZE"),
            "PATTERN_SAMPLE_SIZE",
            DEFAULT_PATTERN_SAMPLE_SIZE,
        )?;
        if pattern_sample_size == 0 {
            return Err(SkipError::Config(
                "PATTERN_SAMPLE_SIZE must be at least 1".into(),
            ));
        }

        let poll_seconds: u64 = parse_or(
            get("POLL_INTERVAL_SECONDS"),
            "POLL_INTERVAL_SECONDS",
            DEFAULT_POLL_INTERVAL_SECONDS,
        )?;
        if poll_seconds == 0 {
            return Err(SkipError::Config(
                "POLL_INTERVAL_SECONDS must be at least 1".into(),
            ));
        }

        let skip_window_days: i64 = parse_or(
            get("SKIP_WINDOW_DAYS"),
            "SKIP_WINDOW_DAYS",
            DEFAULT_SKIP_WINDOW_DAYS,
        )?;
        if !(0..=MAX_SKIP_WINDOW_DAYS).contains(&skip_window_days) {
            return Err(SkipError::Config(format!(
                "SKIP_WINDOW_DAYS must be between 0 and {}",
                MAX_SKIP_WINDOW_DAYS
            )));
        }

        let pattern_tolerance_days: i64 = parse_or(
            get("PATTERN_TOLERANCE_DAYS"),
            "PATTERN_TOLERANCE_DAYS",
            DEFAULT_PATTERN_TOLERANCE_DAYS,
        )?;
        if pattern_tolerance_days < 0 {
            return Err(SkipError::Config(
                "PATTERN_TOLERANCE_DAYS cannot be negative".into(),
            ));
        }

        let pattern_restart_enabled = match get("PATTERN_RESTART_ENABLED") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                SkipError::Config(format!(
                    "PATTERN_RESTART_ENABLED '{}' is not a boolean",
                    raw
                ))
            })?,
            None => true,
        };

        let control_address = match get("CONTROL_ADDRESS") {
            Some(raw) => parse_socket_addr(&raw)?,
            None => parse_socket_addr(DEFAULT_CONTROL_ADDRESS)?,
        };

        Ok(Self {
            lastfm_user: required("LASTFM_USER")?,
            lastfm_api_key: required("LASTFM_API_KEY")?,
            spotify_client_id: required("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            spotify_refresh_token: required("SPOTIFY_REFRESH_TOKEN")?,
            skip_window_days,
            poll_interval: Duration::from_secs(poll_seconds),
            pattern_sample_size,
            pattern_tolerance_days,
            pattern_restart_enabled,
            filler_playlist: get("FILLER_PLAYLIST"),
            remote_control_url: get("REMOTE_CONTROL_URL"),
            spotify_api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            spotify_token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string()),
            lastfm_api_url: get("LASTFM_API_URL")
                .unwrap_or_else(|| DEFAULT_LASTFM_API_URL.to_string()),
            control_address,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| SkipError::Config(format!("{} '{}': {}", key, value, e))),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
