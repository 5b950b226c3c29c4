use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::types::{ControlStatus, Track};

/// State shared between the skipper loop and the control surface.
///
/// The control server flips the pause flag and files keep requests; the
/// loop reads both once per cycle and publishes the track it last observed.
///
/// A keep request is not bound to a track id here. The control surface only
/// knows the last observed track, which may no longer be the one playing, so
/// the loop binds the request to whatever it reads from the player next and
/// is woken so that happens right away.
#[derive(Debug, Default)]
pub struct ControlState {
    paused: AtomicBool,
    keep_requested: AtomicBool,
    kept_track: Mutex<Option<String>>,
    now_playing: Mutex<Option<Track>>,
    wake: Notify,
    shutdown: Notify,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// Flips the pause flag and returns the new value.
    pub fn toggle_paused(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub async fn kept_track(&self) -> Option<String> {
        self.kept_track.lock().await.clone()
    }

    pub async fn keep_track(&self, track_id: String) {
        *self.kept_track.lock().await = Some(track_id);
    }

    pub async fn clear_kept_track(&self) {
        *self.kept_track.lock().await = None;
    }

    /// Asks the loop not to skip the track that is playing right now.
    pub fn request_keep(&self) {
        self.keep_requested.store(true, Ordering::Relaxed);
        self.wake.notify_one();
    }

    pub fn keep_pending(&self) -> bool {
        self.keep_requested.load(Ordering::Relaxed)
    }

    /// Consumes a pending keep request.
    pub fn take_keep_request(&self) -> bool {
        self.keep_requested.swap(false, Ordering::Relaxed)
    }

    /// Resolves when the loop should poll before its delay runs out.
    pub async fn woken(&self) {
        self.wake.notified().await;
    }

    pub async fn now_playing(&self) -> Option<Track> {
        self.now_playing.lock().await.clone()
    }

    pub async fn set_now_playing(&self, track: Option<Track>) {
        *self.now_playing.lock().await = track;
    }

    pub async fn status(&self) -> ControlStatus {
        ControlStatus {
            paused: self.is_paused(),
            keep_pending: self.keep_pending(),
            kept_track: self.kept_track().await,
            now_playing: self.now_playing().await,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }
}
