//! Register file, call stack, privilege mode and lifecycle.

use crate::emulator::error::Fault;

pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
/// V15 holds carry, borrow, shifted-out and collision flags.
pub const FLAG_REGISTER: usize = 0xF;

/// Privilege mode of the running code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Kernel,
    User,
}

/// Why the machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Normal termination, requested by the driver.
    Exit,
    Fault(Fault),
}

/// Where the machine is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed and zeroed, bootstrap not yet installed.
    Uninitialized,
    /// Running the bootstrap program in the kernel region.
    KernelBoot,
    /// In user mode at 0x200 with no program loaded yet.
    AwaitingProgram,
    UserRunning,
    Halted(Halt),
}

/// A fixed 16 frame stack of return addresses.
pub struct CallStack {
    frames: [u16; STACK_SIZE],
    sp: u8,
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack {
            frames: [0; STACK_SIZE],
            sp: 0,
        }
    }

    /// Push `addr` as the return address of a call made at `pc`.
    pub fn push(&mut self, addr: u16, pc: u16) -> Result<(), Fault> {
        let slot = self
            .frames
            .get_mut(self.sp as usize)
            .ok_or(Fault::StackOverflow { pc })?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    /// Pop the most recent return address for a return made at `pc`.
    pub fn pop(&mut self, pc: u16) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow { pc });
        }
        self.sp -= 1;
        Ok(self.frames[self.sp as usize])
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn frames(&self) -> &[u16] {
        &self.frames[..self.sp as usize]
    }

    pub fn clear(&mut self) {
        self.frames = [0; STACK_SIZE];
        self.sp = 0;
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_returns_pushes_in_reverse() {
        let mut stack = CallStack::new();
        stack.push(0x202, 0x200).unwrap();
        stack.push(0x302, 0x300).unwrap();
        assert_eq!(stack.frames(), &[0x202, 0x302]);
        assert_eq!(stack.pop(0x400), Ok(0x302));
        assert_eq!(stack.pop(0x304), Ok(0x202));
        assert_eq!(stack.sp(), 0);
    }

    #[test]
    fn seventeenth_push_overflows() {
        let mut stack = CallStack::new();
        for i in 0..STACK_SIZE as u16 {
            stack.push(i * 2, 0x200).unwrap();
        }
        assert_eq!(stack.push(0, 0x250), Err(Fault::StackOverflow { pc: 0x250 }));
        assert_eq!(stack.sp(), 16);
    }

    #[test]
    fn pop_on_empty_underflows() {
        let mut stack = CallStack::new();
        assert_eq!(stack.pop(0x200), Err(Fault::StackUnderflow { pc: 0x200 }));
        assert_eq!(stack.sp(), 0);
    }
}
