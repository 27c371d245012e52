use chip_os::emulator::input::NUM_KEYS;
use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

/// A thread-safe record of when each hex key was last pressed.
/// Terminals report presses but no releases, so a key counts as held
/// until `timeout` has passed since its last press.
/// Wrap it in an `std::sync::Arc` and you are good to go.
pub struct KeyBuffer {
    timeout: Duration,
    presses: Mutex<[Option<Instant>; NUM_KEYS]>,
}

impl KeyBuffer {
    pub fn new(timeout: Duration) -> KeyBuffer {
        KeyBuffer {
            timeout,
            presses: Mutex::new([None; NUM_KEYS]),
        }
    }

    /// Record a press of hex key `key`.
    pub fn press(&self, key: u8) {
        self.press_at(key, Instant::now());
    }

    fn press_at(&self, key: u8, at: Instant) {
        if let Ok(mut presses) = self.presses.lock() {
            if let Some(slot) = presses.get_mut(key as usize) {
                *slot = Some(at);
            }
        }
    }

    /// Which keys count as held right now.
    pub fn held(&self) -> [bool; NUM_KEYS] {
        let mut held = [false; NUM_KEYS];
        if let Ok(presses) = self.presses.lock() {
            for (state, press) in held.iter_mut().zip(presses.iter()) {
                *state = press.map_or(false, |at| at.elapsed() < self.timeout);
            }
        }
        held
    }
}
