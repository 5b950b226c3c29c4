//! # Skipper Loop
//!
//! Polls the player, compares the current track against Last.fm history and
//! skips it when it was played inside the skip window.
//!
//! ## Cycle
//!
//! Each call to [`Skipper::step`] walks these gates in order and stops at the
//! first one that applies:
//!
//! 1. Manual pause from the control surface
//! 2. Remote switch reports "off"
//! 3. Nothing playing
//! 4. Same track id as the previous poll (no second lookup)
//! 5. Track marked "don't skip this one". A keep request from the control
//!    surface binds to the track read in that same cycle; the mark is
//!    dropped once another track shows up
//! 6. No scrobble found
//! 7. Last scrobble older than the window
//! 8. Otherwise: skip, restore a paused player, feed the pattern detector
//!
//! A skip is followed by a short delay instead of the full poll interval so
//! a run of recently played tracks is worked through quickly.
//!
//! ## Pattern restart
//!
//! When the [`PatternDetector`] reports that the last skips all landed on
//! tracks played within a few days of each other, the current context is
//! restarted: a filler playlist is played briefly, shuffle is enabled and
//! the original context is started again. Any failing step ends the restart
//! for this cycle.
//!
//! ## Failures
//!
//! [`Skipper::run`] never returns. An error from a cycle is logged and the
//! loop sleeps one full poll interval before trying again. A keep request
//! cuts any delay short.

mod gate;
mod policy;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::sleep;

use crate::{
    error::Result,
    error, info,
    lastfm::History,
    management::{ControlState, PatternDetector},
    playing,
    spotify::player::Playback,
    success, utils, warning,
};

pub use gate::{Gate, RemoteGate};
pub use policy::SkipWindowPolicy;

pub const AFTER_SKIP_DELAY: Duration = Duration::from_secs(5);
pub const REPAUSE_DELAY: Duration = Duration::from_secs(1);
pub const RESTART_STEP_DELAY: Duration = Duration::from_secs(2);

/// Delays used between and inside cycles.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub poll_interval: Duration,
    /// Used instead of `poll_interval` right after a skip.
    pub after_skip: Duration,
    /// Wait between a skip and re-pausing a player that was paused.
    pub repause: Duration,
    /// Settle time between the sub-steps of a context restart.
    pub restart_step: Duration,
}

impl Timing {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            after_skip: AFTER_SKIP_DELAY,
            repause: REPAUSE_DELAY,
            restart_step: RESTART_STEP_DELAY,
        }
    }
}

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    Paused,
    RemoteDisabled,
    NothingPlaying,
    StillPlaying,
    Kept,
    NoHistory,
    OutsideWindow { days_since: i64 },
    Skipped { days_since: i64, pattern: bool },
}

impl Cycle {
    pub fn delay(&self, timing: &Timing) -> Duration {
        match self {
            Cycle::Skipped { .. } => timing.after_skip,
            _ => timing.poll_interval,
        }
    }
}

pub struct Skipper<P, H, G> {
    playback: P,
    history: H,
    gate: G,
    control: Arc<ControlState>,
    policy: SkipWindowPolicy,
    timing: Timing,
    detector: Option<PatternDetector>,
    filler_context: Option<String>,
    last_observed: Option<String>,
}

impl<P: Playback, H: History, G: Gate> Skipper<P, H, G> {
    pub fn new(
        playback: P,
        history: H,
        gate: G,
        control: Arc<ControlState>,
        policy: SkipWindowPolicy,
        timing: Timing,
    ) -> Self {
        Self {
            playback,
            history,
            gate,
            control,
            policy,
            timing,
            detector: None,
            filler_context: None,
            last_observed: None,
        }
    }

    /// Enables the pattern restart. `filler_context` is played briefly
    /// before the original context is started again.
    pub fn with_pattern_restart(
        mut self,
        detector: PatternDetector,
        filler_context: Option<String>,
    ) -> Self {
        self.detector = Some(detector);
        self.filler_context = filler_context;
        self
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn detector(&self) -> Option<&PatternDetector> {
        self.detector.as_ref()
    }

    pub fn last_observed(&self) -> Option<&str> {
        self.last_observed.as_deref()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub async fn run(&mut self) {
        info!(
            "Auto-skipper enabled. Skipping songs that have been listened to in the last {} days.",
            self.policy.window().num_days()
        );

        loop {
            let outcome = self.step().await;
            match &outcome {
                Err(e) if e.is_transient() => {
                    warning!("{}. Trying again at the next poll.", e)
                }
                Err(e) => error!("Unexpected error: {}", e),
                Ok(_) => {}
            }

            tokio::select! {
                _ = sleep(self.next_delay(&outcome)) => {}
                _ = self.control.woken() => {}
            }
        }
    }

    /// How long to wait after a cycle. Any error waits a full poll interval.
    pub fn next_delay(&self, outcome: &Result<Cycle>) -> Duration {
        match outcome {
            Ok(cycle) => cycle.delay(&self.timing),
            Err(_) => self.timing.poll_interval,
        }
    }

    /// Runs one poll, compare, decide, act cycle.
    pub async fn step(&mut self) -> Result<Cycle> {
        if self.control.is_paused() {
            info!("Skipping is paused from the control menu.");
            return Ok(Cycle::Paused);
        }

        if !self.gate.is_enabled().await {
            info!("Remote switch is off, not checking.");
            return Ok(Cycle::RemoteDisabled);
        }

        let Some(track) = self.playback.current_track().await? else {
            info!("Nothing is playing right now.");
            return Ok(Cycle::NothingPlaying);
        };

        if self.control.take_keep_request() {
            self.control.keep_track(track.id.clone()).await;
            success!(
                "Not skipping {} – {} while it plays.",
                track.artist,
                track.name
            );
        }

        if self.last_observed.as_deref() == Some(track.id.as_str()) {
            info!("Same song as last time ({}), skipping the check.", track.name);
            return Ok(Cycle::StillPlaying);
        }

        self.last_observed = Some(track.id.clone());
        self.control.set_now_playing(Some(track.clone())).await;
        playing!("Currently playing: {} – {}", track.artist, track.name);

        if let Some(kept) = self.control.kept_track().await {
            if kept == track.id {
                info!("Skipping is off for this song.");
                return Ok(Cycle::Kept);
            }
            self.control.clear_kept_track().await;
        }

        let last_played = match self
            .history
            .last_played_at(&track.artist, &track.name)
            .await
        {
            Ok(last_played) => last_played,
            Err(e) => {
                warning!("[Last.fm] {}", e);
                None
            }
        };

        let Some(last_played) = last_played else {
            info!("There's no scrobble for this song, not skipping.");
            return Ok(Cycle::NoHistory);
        };

        let now = Utc::now();
        let days_since = utils::days_between(last_played, now);
        info!(
            "Last scrobble: {} - {} days ago",
            last_played.format("%Y-%m-%d"),
            days_since
        );

        if !self.policy.is_recent(last_played, now) {
            success!("The last scrobble is older than the window, not skipping.");
            return Ok(Cycle::OutsideWindow { days_since });
        }

        info!("Already listened to {} days ago, skipping.", days_since);
        let pattern = self.skip_current(days_since).await?;
        Ok(Cycle::Skipped {
            days_since,
            pattern,
        })
    }

    /// Skips the current track and returns whether a repeating pattern was
    /// detected.
    async fn skip_current(&mut self, days_since: i64) -> Result<bool> {
        // skipping resumes a paused player
        let was_paused = self.playback.is_paused().await?;
        self.playback.skip().await?;

        if was_paused {
            sleep(self.timing.repause).await;
            self.playback.pause().await?;
            info!("Playback was paused before the skip, paused it again.");
        }

        let pattern = match self.detector.as_mut() {
            Some(detector) => detector.observe(days_since),
            None => false,
        };

        if pattern {
            warning!("Recent skips keep landing on the same rotation, restarting the playlist shuffled.");
            self.restart_context().await;
        }

        Ok(pattern)
    }

    async fn restart_context(&mut self) -> bool {
        match self.try_restart_context().await {
            Ok(true) => {
                success!("Playlist restarted with shuffle enabled.");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warning!("Restart abandoned: {}", e);
                false
            }
        }
    }

    async fn try_restart_context(&mut self) -> Result<bool> {
        let Some(context) = self.playback.current_context_uri().await? else {
            warning!("Nothing to restart, the current playback has no context.");
            return Ok(false);
        };

        if let Some(filler) = self.filler_context.clone() {
            self.playback.play(&filler, None).await?;
            sleep(self.timing.restart_step).await;
        }

        self.playback.enable_shuffle(true).await?;
        sleep(self.timing.restart_step).await;

        self.playback.play(&context, None).await?;
        Ok(true)
    }
}
