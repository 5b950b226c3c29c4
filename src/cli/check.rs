use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    fatal, info,
    lastfm::{History, HistoryClient},
    playing,
    skipper::SkipWindowPolicy,
    spotify::player::{Playback, PlaybackClient},
    success, utils, warning,
};

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Verifies the credentials with one token refresh and one lookup, without
/// skipping anything.
pub async fn check(settings: Settings) {
    let http = match utils::http_client() {
        Ok(http) => http,
        Err(e) => fatal!("{}", e),
    };
    let mut playback = PlaybackClient::from_settings(http.clone(), &settings);
    let history = HistoryClient::new(http, &settings);

    let pb = spinner("Asking Spotify what is playing...");
    let current = playback.current_track().await;
    pb.finish_and_clear();

    let track = match current {
        Ok(Some(track)) => track,
        Ok(None) => {
            success!("Spotify credentials work. Nothing is playing right now.");
            return;
        }
        Err(e) => fatal!("Spotify check failed: {}", e),
    };

    success!("Spotify credentials work.");
    playing!("Currently playing: {} – {}", track.artist, track.name);

    let pb = spinner("Looking up the last scrobble on Last.fm...");
    let last_played = history.last_played_at(&track.artist, &track.name).await;
    pb.finish_and_clear();

    match last_played {
        Ok(Some(at)) => {
            let now = chrono::Utc::now();
            let policy = SkipWindowPolicy::from_days(settings.skip_window_days);
            info!(
                "Last scrobble: {} - {} days ago",
                at.format("%Y-%m-%d"),
                utils::days_between(at, now)
            );
            if policy.is_recent(at, now) {
                info!("A running instance would skip this song.");
            } else {
                info!("A running instance would keep this song.");
            }
        }
        Ok(None) => info!("There's no scrobble for this song."),
        Err(e) => warning!("Last.fm check failed: {}", e),
    }
}
