use std::sync::Arc;

use reqwest::Client;

use crate::{
    config::{self, Settings},
    error, fatal, info,
    lastfm::HistoryClient,
    logging,
    management::{ControlState, PatternDetector},
    server::{self, Claim},
    skipper::{RemoteGate, SkipWindowPolicy, Skipper, Timing},
    spotify::player::PlaybackClient,
    utils, warning,
};

pub type SpotifySkipper = Skipper<PlaybackClient, HistoryClient, RemoteGate>;

/// Wires the real Spotify, Last.fm and remote-switch clients into a skipper.
pub fn build_skipper(
    settings: &Settings,
    http: Client,
    control: Arc<ControlState>,
) -> SpotifySkipper {
    let playback = PlaybackClient::from_settings(http.clone(), settings);
    let history = HistoryClient::new(http.clone(), settings);
    let gate = RemoteGate::new(http, settings.remote_control_url.clone());

    let skipper = Skipper::new(
        playback,
        history,
        gate,
        control,
        SkipWindowPolicy::from_days(settings.skip_window_days),
        Timing::new(settings.poll_interval),
    );

    if settings.pattern_restart_enabled {
        skipper.with_pattern_restart(
            PatternDetector::new(
                settings.pattern_sample_size,
                settings.pattern_tolerance_days,
            ),
            settings
                .filler_playlist
                .as_deref()
                .map(utils::playlist_context_uri),
        )
    } else {
        skipper
    }
}

/// Runs the skipper until it is told to exit.
///
/// The control address is claimed first. When another instance already
/// holds it, this process says so and exits without touching the log file.
pub async fn run(settings: Settings) {
    let addr = settings.control_address;
    let listener = match server::claim(addr).await {
        Ok(Claim::Acquired(listener)) => listener,
        Ok(Claim::AlreadyRunning) => {
            warning!(
                "{} is already running in the background (control address {}).",
                env!("CARGO_PKG_NAME"),
                addr
            );
            std::process::exit(0);
        }
        Err(e) => fatal!("Cannot bind control address {}: {}", addr, e),
    };

    if let Err(e) = logging::init(config::logs_dir()) {
        warning!("Cannot write log files: {}", e);
    }
    logging::banner();

    let http = match utils::http_client() {
        Ok(http) => http,
        Err(e) => fatal!("{}", e),
    };

    let control = Arc::new(ControlState::new());
    let server_state = Arc::clone(&control);
    tokio::spawn(async move {
        if let Err(e) = server::start_control_server(listener, server_state).await {
            error!("Control server stopped: {}", e);
        }
    });
    info!("Control server listening on http://{}", addr);

    let mut skipper = build_skipper(&settings, http, Arc::clone(&control));

    tokio::select! {
        _ = skipper.run() => {}
        _ = control.shutdown_requested() => info!("Exiting."),
        _ = tokio::signal::ctrl_c() => info!("Stopped by user."),
    }
}
