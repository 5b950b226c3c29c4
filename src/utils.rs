use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::{Result, SkipError};

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| SkipError::Config(format!("cannot build HTTP client: {}", e)))
}

/// `Basic base64(client_id:client_secret)`, as the token endpoint expects.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", encoded)
}

/// Spotify reports success on player commands as 200, 202 or 204.
pub fn is_command_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
    )
}

/// Accepts a bare playlist id, a `spotify:` URI or an `open.spotify.com` link.
pub fn playlist_context_uri(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("spotify:") {
        return raw.to_string();
    }

    if let Some(rest) = raw
        .strip_prefix("https://open.spotify.com/playlist/")
        .or_else(|| raw.strip_prefix("http://open.spotify.com/playlist/"))
    {
        let id = rest.split(['?', '/']).next().unwrap_or(rest);
        return format!("spotify:playlist:{}", id);
    }

    format!("spotify:playlist:{}", raw)
}

/// Reads the remote on/off switch from a response body.
///
/// The first non-empty line decides: `on` (any case) allows skipping, any
/// other text blocks it. A body without any text keeps skipping enabled.
pub fn remote_switch_allows(body: &str) -> bool {
    match body.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(line) => line.to_lowercase() == "on",
        None => true,
    }
}

/// Extracts a unix timestamp that may be encoded as a string or a number.
pub fn parse_unix_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = match value {
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    DateTime::<Utc>::from_timestamp(seconds, 0)
}

/// Whole days elapsed between `then` and `now`, never negative.
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}
