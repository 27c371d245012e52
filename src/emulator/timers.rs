//! The delay and sound timers, ticked by the driver at 60 Hz.

use std::time::Duration;

pub const TIMER_HZ: u32 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// Count both timers down by one, stopping at zero.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        *self = Timers::default();
    }
}

/// Time between two ticks at `hz`.
pub fn tick_interval(hz: u32) -> Duration {
    Duration::from_secs(1) / hz.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_stop_at_zero() {
        let mut timers = Timers { delay: 2, sound: 1 };
        timers.tick();
        assert_eq!(timers, Timers { delay: 1, sound: 0 });
        timers.tick();
        timers.tick();
        assert_eq!(timers, Timers { delay: 0, sound: 0 });
    }

    #[test]
    fn sixty_hertz_interval() {
        assert_eq!(tick_interval(TIMER_HZ), Duration::from_nanos(16_666_666));
    }
}
