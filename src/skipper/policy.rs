use chrono::{DateTime, Duration, Utc};

/// How recent a past play must be to cause a skip.
#[derive(Debug, Clone, Copy)]
pub struct SkipWindowPolicy {
    window: Duration,
}

impl SkipWindowPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Windows too large for a `Duration` are clamped to the maximum.
    pub fn from_days(days: i64) -> Self {
        Self::new(Duration::try_days(days).unwrap_or(Duration::MAX))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Plays strictly after `now - window` are recent. A play exactly on
    /// the cutoff is not. A cutoff before the earliest representable time
    /// makes every play recent.
    pub fn is_recent(&self, last_played_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match now.checked_sub_signed(self.window) {
            Some(cutoff) => last_played_at > cutoff,
            None => true,
        }
    }
}
