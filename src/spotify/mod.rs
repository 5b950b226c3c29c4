//! # Spotify Integration Module
//!
//! The streaming-service side of the skipper: the only API that is allowed
//! to send a "skip" command for the user's account.
//!
//! ## Architecture
//!
//! ```text
//! Skipper loop
//!      ↓
//! PlaybackClient (player::Playback)
//!      ↓ bearer token
//! TokenManager → SpotifyTokenExchange (refresh-token grant)
//!      ↓
//! Spotify Web API / Accounts service
//! ```
//!
//! ## Authentication
//!
//! [`auth`] exchanges the long-lived refresh token from the settings file
//! for a short-lived access token. The client id and secret travel as a
//! Basic auth header. There is no interactive login: the refresh token is
//! obtained once, outside of this program.
//!
//! ## Playback
//!
//! [`player`] reads the currently playing track and player state, and sends
//! skip, pause, play and shuffle commands.
//!
//! ### Status handling
//! - `204 No Content` on the currently-playing read means nothing is playing
//! - skip and pause report a rejected command as a warning and carry on
//! - play and shuffle return `SkipError::CommandRejected` so the restart
//!   sequence can stop early
//! - transport failures surface as `SkipError::Network`

pub mod auth;
pub mod player;
