use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};
use spotskip::{
    SkipError,
    lastfm::History,
    management::{ControlState, PatternDetector},
    skipper::{Cycle, Gate, SkipWindowPolicy, Skipper, Timing},
    spotify::player::Playback,
    types::Track,
};

// Helper function to create a test track
fn track(id: &str, name: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artist: "Skyforest".to_string(),
    }
}

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::days(days)
}

#[derive(Default)]
struct FakePlayback {
    polls: VecDeque<Option<Track>>,
    paused: bool,
    context: Option<String>,
    reject_play: bool,
    fail_network: bool,
    calls: Vec<String>,
}

impl FakePlayback {
    fn playing(tracks: Vec<Track>) -> Self {
        Self {
            polls: tracks.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }
}

impl Playback for FakePlayback {
    async fn current_track(&mut self) -> spotskip::Result<Option<Track>> {
        self.calls.push("current_track".into());
        if self.fail_network {
            return Err(SkipError::Network("connection refused".into()));
        }
        Ok(self.polls.pop_front().flatten())
    }

    async fn is_paused(&mut self) -> spotskip::Result<bool> {
        self.calls.push("is_paused".into());
        Ok(self.paused)
    }

    async fn skip(&mut self) -> spotskip::Result<()> {
        self.calls.push("skip".into());
        Ok(())
    }

    async fn pause(&mut self) -> spotskip::Result<()> {
        self.calls.push("pause".into());
        Ok(())
    }

    async fn play(&mut self, context_uri: &str, _shuffle: Option<bool>) -> spotskip::Result<()> {
        self.calls.push(format!("play:{}", context_uri));
        if self.reject_play {
            return Err(SkipError::CommandRejected {
                command: "play",
                status: 404,
                body: "no active device".into(),
            });
        }
        Ok(())
    }

    async fn enable_shuffle(&mut self, state: bool) -> spotskip::Result<()> {
        self.calls.push(format!("shuffle:{}", state));
        Ok(())
    }

    async fn current_context_uri(&mut self) -> spotskip::Result<Option<String>> {
        self.calls.push("context".into());
        Ok(self.context.clone())
    }
}

#[derive(Default)]
struct FakeHistory {
    plays: HashMap<String, DateTime<Utc>>,
    fail: bool,
    lookups: RefCell<Vec<String>>,
}

impl FakeHistory {
    fn with(plays: &[(&str, DateTime<Utc>)]) -> Self {
        Self {
            plays: plays.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
            ..Self::default()
        }
    }
}

impl History for FakeHistory {
    async fn last_played_at(
        &self,
        _artist: &str,
        track: &str,
    ) -> spotskip::Result<Option<DateTime<Utc>>> {
        self.lookups.borrow_mut().push(track.to_string());
        if self.fail {
            return Err(SkipError::Network("timed out".into()));
        }
        Ok(self.plays.get(track).copied())
    }
}

struct FakeGate {
    enabled: bool,
    checks: Cell<u32>,
}

impl FakeGate {
    fn open() -> Self {
        Self {
            enabled: true,
            checks: Cell::new(0),
        }
    }
}

impl Gate for FakeGate {
    async fn is_enabled(&self) -> bool {
        self.checks.set(self.checks.get() + 1);
        self.enabled
    }
}

fn timing() -> Timing {
    Timing {
        poll_interval: Duration::from_secs(120),
        after_skip: Duration::from_secs(5),
        repause: Duration::ZERO,
        restart_step: Duration::ZERO,
    }
}

fn skipper(
    playback: FakePlayback,
    history: FakeHistory,
    gate: FakeGate,
    control: Arc<ControlState>,
) -> Skipper<FakePlayback, FakeHistory, FakeGate> {
    Skipper::new(
        playback,
        history,
        gate,
        control,
        SkipWindowPolicy::from_days(60),
        timing(),
    )
}

#[tokio::test]
async fn recent_track_is_skipped_and_loop_hurries_on() {
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(10))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()));

    let cycle = skipper.step().await.unwrap();

    assert_eq!(
        cycle,
        Cycle::Skipped {
            days_since: 10,
            pattern: false
        }
    );
    assert_eq!(cycle.delay(skipper.timing()), Duration::from_secs(5));
    assert_eq!(
        skipper.playback().calls,
        vec!["current_track", "is_paused", "skip"]
    );
}

#[tokio::test]
async fn paused_player_is_paused_again_after_skip() {
    let mut playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    playback.paused = true;
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(10))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()));

    skipper.step().await.unwrap();

    assert_eq!(
        skipper.playback().calls,
        vec!["current_track", "is_paused", "skip", "pause"]
    );
}

#[tokio::test]
async fn old_track_is_kept_with_full_wait() {
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(200))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()));

    let cycle = skipper.step().await.unwrap();

    assert_eq!(cycle, Cycle::OutsideWindow { days_since: 200 });
    assert_eq!(cycle.delay(skipper.timing()), Duration::from_secs(120));
    assert_eq!(skipper.playback().count("skip"), 0);
}

#[tokio::test]
async fn track_without_history_is_never_skipped() {
    let playback = FakePlayback::playing(vec![track("t1", "Unknown Song")]);
    let mut skipper = skipper(
        playback,
        FakeHistory::default(),
        FakeGate::open(),
        Arc::new(ControlState::new()),
    );

    assert_eq!(skipper.step().await.unwrap(), Cycle::NoHistory);
    assert_eq!(skipper.playback().calls, vec!["current_track"]);
}

#[tokio::test]
async fn history_failure_counts_as_no_history() {
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let history = FakeHistory {
        fail: true,
        ..FakeHistory::with(&[("Heart of the Forest", days_ago(1))])
    };
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()));

    assert_eq!(skipper.step().await.unwrap(), Cycle::NoHistory);
    assert_eq!(skipper.playback().count("skip"), 0);
}

#[tokio::test]
async fn window_edge_needs_a_play_after_the_cutoff() {
    let just_inside = Utc::now() - chrono::Duration::days(60) + chrono::Duration::seconds(60);
    let just_outside = Utc::now() - chrono::Duration::days(60) - chrono::Duration::seconds(1);
    let playback = FakePlayback::playing(vec![track("in", "Inside"), track("out", "Outside")]);
    let history = FakeHistory::with(&[("Inside", just_inside), ("Outside", just_outside)]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()));

    assert!(matches!(skipper.step().await.unwrap(), Cycle::Skipped { .. }));
    assert!(matches!(
        skipper.step().await.unwrap(),
        Cycle::OutsideWindow { .. }
    ));
    assert_eq!(skipper.playback().count("skip"), 1);
}

#[tokio::test]
async fn manual_pause_makes_no_calls() {
    let control = Arc::new(ControlState::new());
    control.set_paused(true);
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(1))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), control);

    let cycle = skipper.step().await.unwrap();

    assert_eq!(cycle, Cycle::Paused);
    assert_eq!(cycle.delay(skipper.timing()), Duration::from_secs(120));
    assert!(skipper.playback().calls.is_empty());
    assert!(skipper.history().lookups.borrow().is_empty());
}

#[tokio::test]
async fn remote_switch_off_behaves_like_pause() {
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(1))]);
    let gate = FakeGate {
        enabled: false,
        checks: Cell::new(0),
    };
    let mut skipper = skipper(playback, history, gate, Arc::new(ControlState::new()));

    assert_eq!(skipper.step().await.unwrap(), Cycle::RemoteDisabled);
    assert!(skipper.playback().calls.is_empty());
}

#[tokio::test]
async fn nothing_playing_waits_full_interval() {
    let playback = FakePlayback::default();
    let mut skipper = skipper(
        playback,
        FakeHistory::default(),
        FakeGate::open(),
        Arc::new(ControlState::new()),
    );

    let cycle = skipper.step().await.unwrap();
    assert_eq!(cycle, Cycle::NothingPlaying);
    assert_eq!(cycle.delay(skipper.timing()), Duration::from_secs(120));
}

#[tokio::test]
async fn same_track_is_looked_up_once() {
    let same = track("t1", "Heart of the Forest");
    let playback = FakePlayback::playing(vec![same.clone(), same.clone(), same]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(200))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()));

    assert_eq!(
        skipper.step().await.unwrap(),
        Cycle::OutsideWindow { days_since: 200 }
    );
    assert_eq!(skipper.step().await.unwrap(), Cycle::StillPlaying);
    assert_eq!(skipper.step().await.unwrap(), Cycle::StillPlaying);
    assert_eq!(skipper.history().lookups.borrow().len(), 1);
    assert_eq!(skipper.last_observed(), Some("t1"));
}

#[tokio::test]
async fn keep_request_protects_a_track_returned_to_after_a_skip() {
    let control = Arc::new(ControlState::new());
    let playback = FakePlayback::playing(vec![
        track("x", "Heart of the Forest"),
        track("y", "Northern Lights"),
        track("x", "Heart of the Forest"),
        track("y", "Northern Lights"),
    ]);
    let history = FakeHistory::with(&[
        ("Heart of the Forest", days_ago(3)),
        ("Northern Lights", days_ago(300)),
    ]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::clone(&control));

    assert!(matches!(
        skipper.step().await.unwrap(),
        Cycle::Skipped { days_since: 3, .. }
    ));
    assert_eq!(
        skipper.step().await.unwrap(),
        Cycle::OutsideWindow { days_since: 300 }
    );

    // the user went back to the skipped song and asks to keep it
    control.request_keep();
    assert!(control.kept_track().await.is_none());

    assert_eq!(skipper.step().await.unwrap(), Cycle::Kept);
    assert_eq!(skipper.playback().count("skip"), 1);
    assert_eq!(control.kept_track().await.as_deref(), Some("x"));
    assert!(!control.keep_pending());

    skipper.step().await.unwrap();
    assert!(control.kept_track().await.is_none());
}

#[tokio::test]
async fn keep_request_waits_for_something_to_play() {
    let control = Arc::new(ControlState::new());
    let mut playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    playback.polls.push_front(None);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(1))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::clone(&control));

    control.request_keep();
    assert_eq!(skipper.step().await.unwrap(), Cycle::NothingPlaying);
    assert!(control.keep_pending());

    assert_eq!(skipper.step().await.unwrap(), Cycle::Kept);
    assert_eq!(skipper.playback().count("skip"), 0);
}

#[tokio::test]
async fn keep_request_for_the_same_song_outlives_the_dedupe() {
    let control = Arc::new(ControlState::new());
    let playback = FakePlayback::playing(vec![
        track("t1", "Heart of the Forest"),
        track("t1", "Heart of the Forest"),
    ]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(200))]);
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::clone(&control));

    skipper.step().await.unwrap();
    control.request_keep();

    assert_eq!(skipper.step().await.unwrap(), Cycle::StillPlaying);
    assert_eq!(control.kept_track().await.as_deref(), Some("t1"));
}

#[tokio::test]
async fn observed_track_is_published_to_control_state() {
    let control = Arc::new(ControlState::new());
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let mut skipper = skipper(
        playback,
        FakeHistory::default(),
        FakeGate::open(),
        Arc::clone(&control),
    );

    skipper.step().await.unwrap();

    let now_playing = control.now_playing().await.unwrap();
    assert_eq!(now_playing.id, "t1");
}

#[tokio::test]
async fn network_failure_ends_the_cycle_with_transient_error() {
    let playback = FakePlayback {
        fail_network: true,
        ..FakePlayback::default()
    };
    let mut skipper = skipper(
        playback,
        FakeHistory::default(),
        FakeGate::open(),
        Arc::new(ControlState::new()),
    );

    let err = skipper.step().await.unwrap_err();
    assert!(err.is_transient());
}

fn clustered_run() -> (FakePlayback, FakeHistory) {
    let names = ["One", "Two", "Three", "Four", "Five"];
    let days = [3, 4, 5, 4, 3];
    let tracks = names
        .iter()
        .enumerate()
        .map(|(i, n)| track(&format!("t{}", i), n))
        .collect();
    let plays: Vec<(&str, DateTime<Utc>)> = names
        .iter()
        .zip(days)
        .map(|(n, d)| (*n, days_ago(d)))
        .collect();
    (FakePlayback::playing(tracks), FakeHistory::with(&plays))
}

#[tokio::test]
async fn clustered_skips_restart_the_playlist_shuffled() {
    let (mut playback, history) = clustered_run();
    playback.context = Some("spotify:playlist:original".to_string());
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()))
        .with_pattern_restart(
            PatternDetector::new(5, 2),
            Some("spotify:playlist:filler".to_string()),
        );

    let mut patterns = Vec::new();
    for _ in 0..5 {
        match skipper.step().await.unwrap() {
            Cycle::Skipped { pattern, .. } => patterns.push(pattern),
            other => panic!("expected a skip, got {:?}", other),
        }
    }

    assert_eq!(patterns, vec![false, false, false, false, true]);
    assert!(skipper.detector().unwrap().is_empty());

    let calls = &skipper.playback().calls;
    let tail: Vec<&str> = calls[calls.len() - 4..].iter().map(String::as_str).collect();
    assert_eq!(
        tail,
        vec![
            "context",
            "play:spotify:playlist:filler",
            "shuffle:true",
            "play:spotify:playlist:original"
        ]
    );
}

#[tokio::test]
async fn restart_without_context_is_abandoned() {
    let (playback, history) = clustered_run();
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()))
        .with_pattern_restart(PatternDetector::new(5, 2), None);

    for _ in 0..5 {
        skipper.step().await.unwrap();
    }

    let playback = skipper.playback();
    assert_eq!(playback.count("context"), 1);
    assert!(!playback.calls.iter().any(|c| c.starts_with("play:")));
    assert_eq!(playback.count("shuffle:true"), 0);
    assert!(skipper.detector().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_restart_step_stops_the_sequence() {
    let (mut playback, history) = clustered_run();
    playback.context = Some("spotify:playlist:original".to_string());
    playback.reject_play = true;
    let mut skipper = skipper(playback, history, FakeGate::open(), Arc::new(ControlState::new()))
        .with_pattern_restart(
            PatternDetector::new(5, 2),
            Some("spotify:playlist:filler".to_string()),
        );

    for _ in 0..4 {
        skipper.step().await.unwrap();
    }
    assert!(matches!(
        skipper.step().await.unwrap(),
        Cycle::Skipped { pattern: true, .. }
    ));

    let playback = skipper.playback();
    assert_eq!(playback.count("play:spotify:playlist:filler"), 1);
    assert_eq!(playback.count("shuffle:true"), 0);
    assert_eq!(playback.count("play:spotify:playlist:original"), 0);
}

#[tokio::test]
async fn spread_out_skips_never_restart() {
    let names = ["One", "Two", "Three", "Four", "Five"];
    let days = [1, 10, 20, 30, 40];
    let tracks = names
        .iter()
        .enumerate()
        .map(|(i, n)| track(&format!("t{}", i), n))
        .collect();
    let plays: Vec<(&str, DateTime<Utc>)> = names
        .iter()
        .zip(days)
        .map(|(n, d)| (*n, days_ago(d)))
        .collect();
    let mut playback = FakePlayback::playing(tracks);
    playback.context = Some("spotify:playlist:original".to_string());
    let mut skipper = skipper(
        playback,
        FakeHistory::with(&plays),
        FakeGate::open(),
        Arc::new(ControlState::new()),
    )
    .with_pattern_restart(PatternDetector::new(5, 2), None);

    for _ in 0..5 {
        skipper.step().await.unwrap();
    }

    assert_eq!(skipper.playback().count("context"), 0);
    assert_eq!(skipper.detector().unwrap().len(), 5);
}

#[tokio::test]
async fn every_error_waits_a_full_poll_interval() {
    let skipper = skipper(
        FakePlayback::default(),
        FakeHistory::default(),
        FakeGate::open(),
        Arc::new(ControlState::new()),
    );
    let poll = Duration::from_secs(120);

    let transient: spotskip::Result<Cycle> = Err(SkipError::Network("reset".into()));
    let auth: spotskip::Result<Cycle> = Err(SkipError::Auth("revoked".into()));
    let rejected: spotskip::Result<Cycle> = Err(SkipError::CommandRejected {
        command: "next",
        status: 403,
        body: "restricted".into(),
    });

    assert_eq!(skipper.next_delay(&transient), poll);
    assert_eq!(skipper.next_delay(&auth), poll);
    assert_eq!(skipper.next_delay(&rejected), poll);
    assert_eq!(skipper.next_delay(&Ok(Cycle::NoHistory)), poll);
    assert_eq!(
        skipper.next_delay(&Ok(Cycle::Skipped {
            days_since: 1,
            pattern: false
        })),
        Duration::from_secs(5)
    );
}

#[tokio::test]
async fn widest_window_skips_without_overflowing() {
    let playback = FakePlayback::playing(vec![track("t1", "Heart of the Forest")]);
    let history = FakeHistory::with(&[("Heart of the Forest", days_ago(3))]);
    let mut skipper = Skipper::new(
        playback,
        history,
        FakeGate::open(),
        Arc::new(ControlState::new()),
        SkipWindowPolicy::from_days(100_000_000),
        timing(),
    );

    assert!(matches!(
        skipper.step().await.unwrap(),
        Cycle::Skipped { days_since: 3, .. }
    ));
}
