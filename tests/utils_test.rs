use std::{collections::HashMap, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::json;
use spotskip::{SkipError, config::Settings, utils::*};

fn required() -> HashMap<&'static str, String> {
    HashMap::from([
        ("LASTFM_USER", "listener".to_string()),
        ("LASTFM_API_KEY", "lastfm-key".to_string()),
        ("SPOTIFY_CLIENT_ID", "client-id".to_string()),
        ("SPOTIFY_CLIENT_SECRET", "client-secret".to_string()),
        ("SPOTIFY_REFRESH_TOKEN", "refresh-me".to_string()),
    ])
}

fn settings_with(extra: &[(&'static str, &str)]) -> spotskip::Result<Settings> {
    let mut values = required();
    for (key, value) in extra {
        values.insert(*key, value.to_string());
    }
    Settings::from_lookup(|key| values.get(key).cloned())
}

#[test]
fn test_basic_auth_header() {
    let header = basic_auth_header("client-id", "client-secret");
    let encoded = header.strip_prefix("Basic ").unwrap();
    let decoded = STANDARD.decode(encoded).unwrap();
    assert_eq!(decoded, b"client-id:client-secret");
}

#[test]
fn test_is_command_success() {
    assert!(is_command_success(StatusCode::OK));
    assert!(is_command_success(StatusCode::ACCEPTED));
    assert!(is_command_success(StatusCode::NO_CONTENT));
    assert!(!is_command_success(StatusCode::NOT_FOUND));
    assert!(!is_command_success(StatusCode::FORBIDDEN));
}

#[test]
fn test_playlist_context_uri() {
    assert_eq!(
        playlist_context_uri("37i9dQZF1DXcBWIGoYBM5M"),
        "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"
    );
    assert_eq!(
        playlist_context_uri("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
        "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"
    );
    assert_eq!(
        playlist_context_uri("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc"),
        "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"
    );
    assert_eq!(
        playlist_context_uri("  37i9dQZF1DXcBWIGoYBM5M \n"),
        "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"
    );
}

#[test]
fn test_remote_switch_allows() {
    assert!(remote_switch_allows("on"));
    assert!(remote_switch_allows("On\r\n"));
    assert!(remote_switch_allows("\n\n  on\noff"));
    assert!(remote_switch_allows(""));
    assert!(remote_switch_allows("  \n "));
    assert!(!remote_switch_allows("off"));
    assert!(!remote_switch_allows("online"));
}

#[test]
fn test_parse_unix_timestamp() {
    let expected = Utc.timestamp_opt(1700000000, 0).unwrap();
    assert_eq!(parse_unix_timestamp(&json!("1700000000")), Some(expected));
    assert_eq!(parse_unix_timestamp(&json!(1700000000)), Some(expected));
    assert_eq!(parse_unix_timestamp(&json!("soon")), None);
    assert_eq!(parse_unix_timestamp(&json!(null)), None);
    assert_eq!(parse_unix_timestamp(&json!(1.5)), None);
}

#[test]
fn test_days_between() {
    let now = Utc.with_ymd_and_hms(2024, 10, 24, 12, 0, 0).unwrap();
    let then = Utc.with_ymd_and_hms(2024, 10, 20, 18, 0, 0).unwrap();
    assert_eq!(days_between(then, now), 3);
    assert_eq!(days_between(now, now), 0);
    // a scrobble stamped slightly ahead of the local clock
    assert_eq!(days_between(now + chrono::Duration::minutes(5), now), 0);
}

#[test]
fn test_settings_defaults() {
    let settings = settings_with(&[]).unwrap();

    assert_eq!(settings.skip_window_days, 60);
    assert_eq!(settings.poll_interval, Duration::from_secs(120));
    assert_eq!(settings.pattern_sample_size, 5);
    assert_eq!(settings.pattern_tolerance_days, 2);
    assert!(settings.pattern_restart_enabled);
    assert!(settings.filler_playlist.is_none());
    assert!(settings.remote_control_url.is_none());
    assert_eq!(settings.spotify_api_url, "https://api.spotify.com/v1");
    assert_eq!(settings.control_address.to_string(), "127.0.0.1:8740");
}

#[test]
fn test_settings_overrides() {
    let settings = settings_with(&[
        ("SKIP_WINDOW_DAYS", "30"),
        ("POLL_INTERVAL_SECONDS", "45"),
        ("PATTERN_RESTART_ENABLED", "off"),
        ("FILLER_PLAYLIST", "spotify:playlist:filler"),
        ("SPOTIFY_API_URL", "http://localhost:3000/v1/"),
        ("REMOTE_CONTROL_URL", "  "),
    ])
    .unwrap();

    assert_eq!(settings.skip_window_days, 30);
    assert!(settings_with(&[("SKIP_WINDOW_DAYS", "36500")]).is_ok());
    assert_eq!(settings.poll_interval, Duration::from_secs(45));
    assert!(!settings.pattern_restart_enabled);
    assert_eq!(
        settings.filler_playlist.as_deref(),
        Some("spotify:playlist:filler")
    );
    assert_eq!(settings.spotify_api_url, "http://localhost:3000/v1");
    assert!(settings.remote_control_url.is_none());
}

#[test]
fn test_settings_missing_credential() {
    let mut values = required();
    values.remove("SPOTIFY_REFRESH_TOKEN");
    let err = Settings::from_lookup(|key| values.get(key).cloned()).unwrap_err();

    match err {
        SkipError::Config(message) => assert!(message.contains("SPOTIFY_REFRESH_TOKEN")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_settings_rejects_bad_values() {
    for extra in [
        ("PATTERN_SAMPLE_SIZE", "0"),
        ("POLL_INTERVAL_SECONDS", "0"),
        ("SKIP_WINDOW_DAYS", "-1"),
        ("SKIP_WINDOW_DAYS", "sixty"),
        ("SKIP_WINDOW_DAYS", "100000000"),
        ("PATTERN_TOLERANCE_DAYS", "-2"),
        ("PATTERN_RESTART_ENABLED", "sometimes"),
        ("CONTROL_ADDRESS", "localhost"),
    ] {
        assert!(
            matches!(settings_with(&[extra]), Err(SkipError::Config(_))),
            "{:?} should be rejected",
            extra
        );
    }
}
