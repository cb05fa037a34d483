use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gap between two reveals that keeps a combo alive.
pub const COMBO_WINDOW: Duration = Duration::from_secs(1);

/// Timing state fed by every cell that transitions to revealed, including
/// each cell opened by a flood fill.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    current: u32,
    max: u32,
    last_reveal_at: Option<Duration>,
}

impl ComboState {
    /// Records one reveal at `now`: increments the combo when the gap since
    /// the previous reveal is under the window, otherwise restarts at 1.
    pub fn record(&mut self, now: Duration) {
        self.current = match self.last_reveal_at {
            Some(last) if now.saturating_sub(last) < COMBO_WINDOW => self.current + 1,
            _ => 1,
        };
        self.max = self.max.max(self.current);
        self.last_reveal_at = Some(now);
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    pub const fn last_reveal_at(&self) -> Option<Duration> {
        self.last_reveal_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn fast_reveals_chain_and_slow_ones_restart() {
        let mut combo = ComboState::default();

        combo.record(at(0));
        assert_eq!(combo.current(), 1);

        combo.record(at(400));
        assert_eq!(combo.current(), 2);

        combo.record(at(1900));
        assert_eq!(combo.current(), 1);
        assert_eq!(combo.max(), 2);
    }

    #[test]
    fn exactly_one_second_gap_restarts() {
        let mut combo = ComboState::default();
        combo.record(at(0));
        combo.record(at(1000));
        assert_eq!(combo.current(), 1);
    }

    #[test]
    fn max_tracks_the_best_chain() {
        let mut combo = ComboState::default();
        for i in 0..5 {
            combo.record(at(i * 100));
        }
        combo.record(at(10_000));
        combo.record(at(10_100));

        assert_eq!(combo.current(), 2);
        assert_eq!(combo.max(), 5);
    }
}
