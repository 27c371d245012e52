//! The 5 KiB address space.
//!
//! ```text
//! 0x0000-0x01FF  interpreter, hex font glyphs at 0x0050
//! 0x0200-0x0FFF  user programs
//! 0x1000-0x13FF  kernel, the bootstrap program
//! ```
//!
//! Every access is bounds-checked, and user mode accesses to the kernel
//! region are refused.

use std::ops::Range;

use crate::emulator::error::Fault;
use crate::emulator::machine::Mode;

pub const MEM_SIZE: usize = 5120;
pub const FONT_BASE: u16 = 0x050;
pub const PROGRAM_START: u16 = 0x200;
pub const KERNEL_START: u16 = 0x1000;
/// Last address of the kernel region, inclusive.
pub const KERNEL_END: u16 = 0x13FF;
/// Number of bytes a user program may occupy, from `PROGRAM_START` up to the kernel region.
pub const PROGRAM_CAPACITY: usize = (KERNEL_START - PROGRAM_START) as usize;

/// Bytes per font glyph.
pub const GLYPH_SIZE: u16 = 5;
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Whether `addr` lies in the kernel region.
pub fn in_kernel_region(addr: usize) -> bool {
    (KERNEL_START as usize..=KERNEL_END as usize).contains(&addr)
}

pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            bytes: [0; MEM_SIZE],
        }
    }

    /// Validate an access of `len` bytes starting at `addr` made in `mode`.
    fn check(&self, addr: usize, len: usize, mode: Mode) -> Result<Range<usize>, Fault> {
        let end = addr.checked_add(len).ok_or(Fault::OutOfBounds { addr })?;
        if end > MEM_SIZE {
            return Err(Fault::OutOfBounds {
                addr: addr.max(MEM_SIZE),
            });
        }

        let kernel = KERNEL_START as usize..KERNEL_END as usize + 1;
        if mode == Mode::User && len > 0 && addr < kernel.end && end > kernel.start {
            return Err(Fault::KernelRegionAccess {
                addr: addr.max(kernel.start),
            });
        }

        Ok(addr..end)
    }

    pub fn read(&self, addr: usize, mode: Mode) -> Result<u8, Fault> {
        let range = self.check(addr, 1, mode)?;
        Ok(self.bytes[range.start])
    }

    pub fn read_slice(&self, addr: usize, len: usize, mode: Mode) -> Result<&[u8], Fault> {
        let range = self.check(addr, len, mode)?;
        Ok(&self.bytes[range])
    }

    pub fn write_slice(&mut self, addr: usize, data: &[u8], mode: Mode) -> Result<(), Fault> {
        let range = self.check(addr, data.len(), mode)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Zero `range`, as a kernel mode access.
    pub fn clear(&mut self, range: Range<usize>) -> Result<(), Fault> {
        let range = self.check(range.start, range.len(), Mode::Kernel)?;
        for byte in &mut self.bytes[range] {
            *byte = 0;
        }
        Ok(())
    }

    /// The whole address space, for inspection by debuggers and tests.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_past_the_end_fault() {
        let memory = Memory::new();
        assert_eq!(memory.read(MEM_SIZE - 1, Mode::Kernel), Ok(0));
        assert_eq!(
            memory.read(MEM_SIZE, Mode::Kernel),
            Err(Fault::OutOfBounds { addr: MEM_SIZE })
        );
        assert_eq!(
            memory.read_slice(MEM_SIZE - 2, 4, Mode::Kernel),
            Err(Fault::OutOfBounds { addr: MEM_SIZE })
        );
    }

    #[test]
    fn user_mode_cannot_touch_the_kernel_region() {
        let mut memory = Memory::new();
        assert_eq!(
            memory.write_slice(0x1000, &[1], Mode::User),
            Err(Fault::KernelRegionAccess { addr: 0x1000 })
        );
        assert_eq!(
            memory.read_slice(0xFFE, 4, Mode::User),
            Err(Fault::KernelRegionAccess { addr: 0x1000 })
        );
        assert_eq!(memory.write_slice(0x1000, &[1], Mode::Kernel), Ok(()));
        assert_eq!(memory.read(0x1000, Mode::Kernel), Ok(1));
        assert!(memory.read(0xFFF, Mode::User).is_ok());
    }

    #[test]
    fn empty_accesses_are_allowed_anywhere_in_bounds() {
        let memory = Memory::new();
        assert_eq!(memory.read_slice(0x1000, 0, Mode::User), Ok(&[][..]));
    }

    #[test]
    fn region_helpers() {
        assert!(in_kernel_region(0x1000));
        assert!(in_kernel_region(0x13FF));
        assert!(!in_kernel_region(0xFFF));
        assert!(!in_kernel_region(0x1400));
        assert_eq!(PROGRAM_CAPACITY, 0xE00);
    }
}
