pub const NUM_KEYS: usize = 16;

/// Pressed state of the hex keys 0..=0xF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; NUM_KEYS],
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    /// Keys outside 0..=0xF are never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(state) => *state = pressed,
            None => log::debug!("Ignoring state of unknown key {:#x}", key),
        }
    }

    pub fn replace(&mut self, keys: [bool; NUM_KEYS]) {
        self.keys = keys;
    }

    /// The lowest pressed key, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }

    pub fn clear(&mut self) {
        self.keys = [false; NUM_KEYS];
    }
}

/// Represents an input device that updates the keypad between cycles.
pub trait EmulatorInput {
    fn poll(&mut self, keypad: &mut Keypad);
}

/// An input device that never provides any input
pub struct DummyInput;

impl EmulatorInput for DummyInput {
    fn poll(&mut self, keypad: &mut Keypad) {
        keypad.clear();
    }
}
