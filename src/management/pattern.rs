use std::collections::VecDeque;

/// Watches the recency of the last few skips for a repeating rotation.
///
/// When the last `sample_size` skipped tracks were all last played within
/// `tolerance_days` of each other, playback is most likely cycling through
/// the same small set of tracks. The ledger holds at most `sample_size`
/// entries, oldest first.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    ledger: VecDeque<i64>,
    sample_size: usize,
    tolerance_days: i64,
}

impl PatternDetector {
    pub fn new(sample_size: usize, tolerance_days: i64) -> Self {
        let sample_size = sample_size.max(1);
        Self {
            ledger: VecDeque::with_capacity(sample_size),
            sample_size,
            tolerance_days,
        }
    }

    pub fn record_skip(&mut self, days_since: i64) {
        self.ledger.push_back(days_since);
        while self.ledger.len() > self.sample_size {
            self.ledger.pop_front();
        }
    }

    pub fn is_repeating(&self) -> bool {
        if self.ledger.len() != self.sample_size {
            return false;
        }
        let (Some(min), Some(max)) = (self.ledger.iter().min(), self.ledger.iter().max()) else {
            return false;
        };
        max - min <= self.tolerance_days
    }

    pub fn reset(&mut self) {
        self.ledger.clear();
    }

    /// Records a skip and reports whether it completed a repeating pattern.
    /// A detected pattern clears the ledger.
    pub fn observe(&mut self, days_since: i64) -> bool {
        self.record_skip(days_since);
        let repeating = self.is_repeating();
        if repeating {
            self.reset();
        }
        repeating
    }

    pub fn ledger(&self) -> impl Iterator<Item = i64> + '_ {
        self.ledger.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(5, 2)
    }
}
