use std::time::Duration;

use crate::GameTime;

/// Accumulates frame time until the next forced drop is due.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropTimer {
    pub drop_counter: Duration,
    pub last_time: GameTime,
}

impl DropTimer {
    /// Registers a frame at `now`.
    ///
    /// Returns `true` once strictly more than `drop_interval` has accumulated, in which
    /// case the counter starts over from zero. Timestamps going backwards count as no time.
    pub fn tick(&mut self, now: GameTime, drop_interval: Duration) -> bool {
        let delta_time = now.saturating_sub(self.last_time);
        self.last_time = now;
        self.drop_counter += delta_time;
        if self.drop_counter > drop_interval {
            self.drop_counter = Duration::ZERO;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
