use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Cached bearer credential for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    /// Already shortened by the refresh margin.
    pub expires_at: DateTime<Utc>,
}

/// What a refresh exchange hands back before it is turned into a [`Credential`].
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// The track currently playing. Two tracks are the same when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub item: Option<PlayingItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayingItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ItemArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackContext {
    pub uri: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStateResponse {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub context: Option<PlaybackContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayContextRequest<'a> {
    pub context_uri: &'a str,
}

/// Snapshot returned by the control server's `/status` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlStatus {
    pub paused: bool,
    /// A keep request the loop has not bound to a track yet.
    #[serde(default)]
    pub keep_pending: bool,
    pub kept_track: Option<String>,
    pub now_playing: Option<Track>,
    pub version: String,
}

#[derive(Tabled)]
pub struct StatusTableRow {
    pub setting: String,
    pub value: String,
}
