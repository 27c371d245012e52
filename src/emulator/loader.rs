//! Copies disk entries into user memory.

use crate::emulator::emulator::Emulator;
use crate::emulator::error::LoadError;
use crate::emulator::machine::{Lifecycle, Mode};
use crate::emulator::memory::{KERNEL_START, PROGRAM_CAPACITY, PROGRAM_START};

impl Emulator {
    /// Copy the disk entry called `name` to 0x200 and start executing it.
    /// Nothing changes if the entry cannot be loaded.
    pub fn load(&mut self, name: &str) -> Result<(), LoadError> {
        let (index, _) = self
            .disk
            .find(name)
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;
        self.load_index(index)
    }

    /// Like `load`, but by disk slot.
    pub fn load_index(&mut self, index: usize) -> Result<(), LoadError> {
        match self.lifecycle {
            Lifecycle::AwaitingProgram | Lifecycle::UserRunning => {}
            Lifecycle::Uninitialized | Lifecycle::KernelBoot => {
                return Err(LoadError::NotReady("booting"))
            }
            Lifecycle::Halted(_) => return Err(LoadError::NotReady("halted")),
        }
        self.copy_program(index)?;
        self.lifecycle = Lifecycle::UserRunning;
        Ok(())
    }

    /// Copy entry `index` into user memory and reset execution to its entry point.
    pub(super) fn copy_program(&mut self, index: usize) -> Result<(), LoadError> {
        let entry = self.disk.get(index).ok_or(LoadError::IndexOutOfRange(index))?;
        if !entry.is_loaded() {
            return Err(LoadError::NotPopulated(entry.name().to_string()));
        }
        if entry.size() > PROGRAM_CAPACITY {
            return Err(LoadError::TooLarge {
                size: entry.size(),
                max: PROGRAM_CAPACITY,
            });
        }

        log::info!("Loading {}, {} bytes", entry.name(), entry.size());
        let start = PROGRAM_START as usize;
        let end = start + entry.size();
        self.memory.write_slice(start, entry.data(), Mode::Kernel)?;
        // Leave nothing of a previous program behind
        self.memory.clear(end..KERNEL_START as usize)?;

        self.program_counter = PROGRAM_START;
        self.stack.clear();
        self.program_loaded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::emulator::emulator::Emulator;
    use crate::emulator::error::LoadError;
    use crate::emulator::machine::Lifecycle;
    use crate::emulator::memory::PROGRAM_CAPACITY;
    use pretty_assertions::assert_eq;

    fn booted_with(entries: &[(&str, &[u8])]) -> Emulator {
        let mut emulator = Emulator::with_seed(3);
        for (name, data) in entries {
            emulator.disk_mut().insert(name, data).unwrap();
        }
        emulator.boot().unwrap();
        emulator
    }

    #[test]
    fn load_places_bytes_at_0x200() {
        let breakout = [0x00, 0xE0, 0xA2, 0x2A, 0x60, 0x0C];
        let mut emulator = booted_with(&[("Breakout", &breakout[..])]);
        emulator.load("Breakout").unwrap();
        assert_eq!(&emulator.memory().as_slice()[0x200..0x206], &breakout[..]);
        assert_eq!(emulator.program_counter(), 0x200);
        assert_eq!(emulator.lifecycle(), Lifecycle::UserRunning);
        assert_eq!(emulator.disk().find("Breakout").unwrap().1.data(), &breakout[..]);
    }

    #[test]
    fn unknown_names_change_nothing() {
        let mut emulator = booted_with(&[("Breakout", &[1, 2, 3][..])]);
        let before = emulator.memory().as_slice().to_vec();
        assert_eq!(emulator.load("Pong"), Err(LoadError::NotFound("Pong".to_string())));
        assert_eq!(emulator.memory().as_slice(), &before[..]);
        assert_eq!(emulator.lifecycle(), Lifecycle::AwaitingProgram);
    }

    #[test]
    fn programs_must_fit_below_the_kernel() {
        let big = vec![0xAA; PROGRAM_CAPACITY + 1];
        let fits = vec![0xBB; PROGRAM_CAPACITY];
        let mut emulator = booted_with(&[("Big", &big[..]), ("Fits", &fits[..])]);
        assert_eq!(
            emulator.load("Big"),
            Err(LoadError::TooLarge {
                size: PROGRAM_CAPACITY + 1,
                max: PROGRAM_CAPACITY
            })
        );
        assert_eq!(emulator.memory().as_slice()[0x200], 0);
        emulator.load("Fits").unwrap();
        assert_eq!(emulator.memory().as_slice()[0xFFF], 0xBB);
    }

    #[test]
    fn reloading_clears_the_previous_program() {
        let mut emulator = booted_with(&[("Long", &[1, 2, 3, 4][..]), ("Short", &[9][..])]);
        emulator.load("Long").unwrap();
        emulator.step().unwrap();
        emulator.load("Short").unwrap();
        assert_eq!(&emulator.memory().as_slice()[0x200..0x204], &[9, 0, 0, 0][..]);
        assert_eq!(emulator.program_counter(), 0x200);
    }

    #[test]
    fn unpopulated_slots_cannot_be_loaded() {
        let mut emulator = Emulator::with_seed(3);
        emulator.disk_mut().insert_missing("Tetris").unwrap();
        emulator.boot().unwrap();
        assert_eq!(
            emulator.load("Tetris"),
            Err(LoadError::NotPopulated("Tetris".to_string()))
        );
        assert_eq!(emulator.load_index(2), Err(LoadError::IndexOutOfRange(2)));
    }

    #[test]
    fn loading_needs_a_booted_machine() {
        let mut emulator = Emulator::with_seed(3);
        emulator.disk_mut().insert("Breakout", &[1]).unwrap();
        assert_eq!(emulator.load("Breakout"), Err(LoadError::NotReady("booting")));
        emulator.boot().unwrap();
        emulator.request_exit();
        assert_eq!(emulator.load("Breakout"), Err(LoadError::NotReady("halted")));
    }
}
