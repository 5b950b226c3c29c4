//! Last.fm listening history.
//!
//! Uses `user.getTrackScrobbles` with `limit=1`, which returns the most
//! recent scrobble of one exact artist/track pair for the configured user.
//! Parameters go through the query encoder, so names with diacritics,
//! commas or brackets are sent intact.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{config::Settings, error::Result, utils, warning};

#[allow(async_fn_in_trait)]
pub trait History {
    /// When `track` by `artist` was last played, if ever.
    ///
    /// Only transport failures are errors. Unknown tracks, error payloads
    /// and malformed timestamps all come back as `Ok(None)`.
    async fn last_played_at(&self, artist: &str, track: &str) -> Result<Option<DateTime<Utc>>>;
}

pub struct HistoryClient {
    http: Client,
    api_url: String,
    user: String,
    api_key: String,
}

impl HistoryClient {
    pub fn new(http: Client, settings: &Settings) -> Self {
        Self {
            http,
            api_url: settings.lastfm_api_url.clone(),
            user: settings.lastfm_user.clone(),
            api_key: settings.lastfm_api_key.clone(),
        }
    }
}

impl History for HistoryClient {
    async fn last_played_at(&self, artist: &str, track: &str) -> Result<Option<DateTime<Utc>>> {
        let res = self
            .http
            .get(&self.api_url)
            .timeout(utils::HTTP_TIMEOUT)
            .query(&[
                ("method", "user.gettrackscrobbles"),
                ("user", self.user.as_str()),
                ("artist", artist),
                ("track", track),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            warning!("[Last.fm] Unexpected status {}: {}", status.as_u16(), body);
            return Ok(None);
        }

        let body = res.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(json) => Ok(latest_scrobble(&json)),
            Err(e) => {
                warning!("[Last.fm] Unreadable response: {}", e);
                Ok(None)
            }
        }
    }
}

/// Pulls the newest scrobble time out of a `trackscrobbles` payload.
///
/// `trackscrobbles.track` is a list in the common case and a single object
/// when there is exactly one match; an empty result may be an empty list,
/// an empty object or missing altogether. A "now playing" entry carries no
/// date and is passed over.
pub fn latest_scrobble(json: &Value) -> Option<DateTime<Utc>> {
    let scrobbles = json.get("trackscrobbles")?.get("track")?;
    let latest = match scrobbles {
        Value::Array(items) => items.iter().find(|item| !is_now_playing(item))?,
        Value::Object(_) if !is_now_playing(scrobbles) => scrobbles,
        _ => return None,
    };
    utils::parse_unix_timestamp(latest.get("date")?.get("uts")?)
}

fn is_now_playing(item: &Value) -> bool {
    item.get("@attr")
        .and_then(|attr| attr.get("nowplaying"))
        .and_then(Value::as_str)
        .is_some_and(|flag| flag == "true")
}
