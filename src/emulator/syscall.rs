//! Kernel services reached through `F0NN` and the capability check guarding them.

use crate::emulator::disk::ENTRY_CAPACITY;
use crate::emulator::emulator::{Cycle, Emulator};
use crate::emulator::error::{Diagnostic, Fault};
use crate::emulator::instruction::{Const, Instruction, Reg};
use crate::emulator::machine::Mode;
use crate::emulator::memory::{FONT, FONT_BASE, KERNEL_START, PROGRAM_CAPACITY};

/// The program installed at `KERNEL_START` on power-on.
/// It resets the machine, loads the font, resets I/O, starts the shell and jumps to user space.
pub const BOOTSTRAP: [u8; 10] = [
    0xF0, 0x00, // reset
    0xF0, 0x02, // load font
    0xF0, 0x04, // reset I/O
    0xF0, 0x06, // shell init
    0x12, 0x00, // goto 0x200
];

/// The kernel services, by syscall id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    Reset,
    LoadFont,
    ResetIo,
    ShellInit,
    LoadRom,
}

impl Syscall {
    pub fn from_id(id: u8) -> Option<Syscall> {
        match id {
            0x00 => Some(Syscall::Reset),
            0x02 => Some(Syscall::LoadFont),
            0x04 => Some(Syscall::ResetIo),
            0x06 => Some(Syscall::ShellInit),
            0x08 => Some(Syscall::LoadRom),
            _ => None,
        }
    }
}

/// Decides whether code running in a given mode may invoke kernel syscalls.
pub trait SyscallGate {
    fn can_invoke_kernel_syscall(&self, mode: Mode) -> bool;
}

/// Only kernel mode code may invoke syscalls.
pub struct KernelOnly;

impl SyscallGate for KernelOnly {
    fn can_invoke_kernel_syscall(&self, mode: Mode) -> bool {
        mode == Mode::Kernel
    }
}

impl Emulator {
    /// Execute `F0NN`. Outside kernel mode the per-register instructions
    /// still apply to V0, but syscall ids are rejected.
    pub(super) fn kernel_call(&mut self, id: u8) -> Result<Cycle, Fault> {
        if !self.gate.can_invoke_kernel_syscall(self.mode) {
            if let Some(instruction) = Instruction::register_op(Reg(0), Const(id)) {
                return self.dispatch(instruction);
            }
            return Ok(self.diagnose(Diagnostic::SyscallRejected { id }));
        }

        let syscall = match Syscall::from_id(id) {
            Some(syscall) => syscall,
            None => return Ok(self.diagnose(Diagnostic::UnknownSyscall { id })),
        };
        log::debug!("Kernel syscall {:?}", syscall);

        match syscall {
            Syscall::Reset => {
                log::info!("Initializing CPU registers, stack and memory");
                self.memory.clear(0..KERNEL_START as usize)?;
                self.registers = Default::default();
                self.i = 0;
                self.stack.clear();
                self.program_loaded = false;
            }
            Syscall::LoadFont => {
                self.memory.write_slice(FONT_BASE as usize, &FONT, Mode::Kernel)?;
            }
            Syscall::ResetIo => {
                log::info!("Initializing I/O");
                self.framebuffer.clear();
                self.timers.reset();
                self.keypad.clear();
                self.check_disk();
            }
            Syscall::ShellInit => {
                log::info!("Initializing CHIP_OS shell");
                self.shell_ready = true;
            }
            Syscall::LoadRom => {
                let index = self.registers[0] as usize;
                if let Err(source) = self.copy_program(index) {
                    return Ok(self.diagnose(Diagnostic::SyscallFailed { id, source }));
                }
            }
        }
        Ok(Cycle::Continue)
    }

    fn check_disk(&self) {
        let largest = self.disk.entries().map(|(_, e)| e.size()).max().unwrap_or(0);
        log::info!(
            "Disk: {} entries, largest {} bytes of {} per entry",
            self.disk.len(),
            largest,
            ENTRY_CAPACITY
        );
        if largest > PROGRAM_CAPACITY {
            log::warn!(
                "Disk: an entry of {} bytes will not fit the {} bytes of user memory",
                largest,
                PROGRAM_CAPACITY
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::instruction::Addr;
    use crate::emulator::machine::Lifecycle;
    use crate::emulator::memory::{KERNEL_END, PROGRAM_START};
    use crate::emulator::timers::Timers;

    struct Always;

    impl SyscallGate for Always {
        fn can_invoke_kernel_syscall(&self, _: Mode) -> bool {
            true
        }
    }

    fn syscall(emulator: &mut Emulator, id: u8) -> Result<Cycle, Fault> {
        emulator.execute_single(Instruction::KernelCall(Const(id)))
    }

    fn booted() -> Emulator {
        let mut emulator = Emulator::with_seed(7);
        emulator.boot().unwrap();
        emulator
    }

    #[test]
    fn kernel_only_gate() {
        assert!(KernelOnly.can_invoke_kernel_syscall(Mode::Kernel));
        assert!(!KernelOnly.can_invoke_kernel_syscall(Mode::User));
    }

    #[test]
    fn syscall_ids_are_known() {
        assert_eq!(Syscall::from_id(0x00), Some(Syscall::Reset));
        assert_eq!(Syscall::from_id(0x08), Some(Syscall::LoadRom));
        assert_eq!(Syscall::from_id(0x07), None);
        assert_eq!(Syscall::from_id(0x09), None);
    }

    #[test]
    fn bootstrap_ends_in_user_space() {
        assert_eq!(
            Instruction::from_two_u8(BOOTSTRAP[8], BOOTSTRAP[9]),
            Instruction::Goto(Addr(PROGRAM_START))
        );
    }

    #[test]
    fn user_mode_syscalls_are_rejected() {
        let mut emulator = booted();
        emulator.framebuffer.xor(0, 0, 1);
        assert_eq!(
            syscall(&mut emulator, 0x04),
            Ok(Cycle::NoOp(Diagnostic::SyscallRejected { id: 0x04 }))
        );
        assert_eq!(emulator.framebuffer().get(0, 0), 1);
    }

    #[test]
    fn user_mode_zero_selector_addresses_v0() {
        let mut emulator = booted();
        emulator.registers[0] = 9;
        assert_eq!(syscall(&mut emulator, 0x15), Ok(Cycle::Continue));
        assert_eq!(emulator.timers().delay, 9);
    }

    #[test]
    fn kernel_mode_unknown_ids_are_no_ops() {
        let mut emulator = Emulator::with_seed(7);
        emulator.power_on().unwrap();
        assert_eq!(
            syscall(&mut emulator, 0x07),
            Ok(Cycle::NoOp(Diagnostic::UnknownSyscall { id: 0x07 }))
        );
    }

    #[test]
    fn an_elevating_gate_opens_the_kernel_path() {
        let mut emulator = Emulator::with_seed(7).with_gate(Box::new(Always));
        emulator.boot().unwrap();
        emulator.framebuffer.xor(0, 0, 1);
        assert_eq!(syscall(&mut emulator, 0x04), Ok(Cycle::Continue));
        assert_eq!(emulator.framebuffer().get(0, 0), 0);
    }

    #[test]
    fn reset_syscalls_clear_the_machine_but_not_the_kernel() {
        let mut emulator = Emulator::with_seed(7).with_gate(Box::new(Always));
        emulator.boot().unwrap();
        emulator.registers[1] = 5;
        emulator.registers[0xF] = 1;
        emulator.i = 0x300;
        emulator.stack.push(0x400, 0x202).unwrap();
        emulator.timers = Timers { delay: 7, sound: 3 };
        emulator.keypad.set(3, true);
        emulator.memory.write_slice(0x200, &[0xAB], Mode::Kernel).unwrap();

        // I/O reset
        assert_eq!(syscall(&mut emulator, 0x04), Ok(Cycle::Continue));
        assert_eq!(emulator.timers(), &Timers::default());
        assert!(!emulator.keypad().is_pressed(3));
        assert_eq!(emulator.register(1), 5);

        // Machine reset
        assert_eq!(syscall(&mut emulator, 0x00), Ok(Cycle::Continue));
        assert_eq!(emulator.registers(), &[0; 16]);
        assert_eq!(emulator.i(), 0);
        assert_eq!(emulator.stack().sp(), 0);
        let memory = emulator.memory().as_slice();
        assert!(memory[..KERNEL_START as usize].iter().all(|&b| b == 0));
        let kernel = &memory[KERNEL_START as usize..=KERNEL_END as usize];
        let (bootstrap, rest) = kernel.split_at(BOOTSTRAP.len());
        assert_eq!(bootstrap, &BOOTSTRAP[..]);
        assert!(rest.iter().all(|&b| b == 0));
    }

    #[test]
    fn load_rom_syscall_loads_the_entry_in_v0() {
        let mut emulator = Emulator::with_seed(7);
        emulator.disk_mut().insert("Breakout", &[0x61, 0x01]).unwrap();
        emulator.disk_mut().insert("Tetris", &[0x62, 0x02]).unwrap();
        emulator.power_on().unwrap();
        emulator.registers[0] = 1;

        assert_eq!(syscall(&mut emulator, 0x08), Ok(Cycle::Continue));
        assert_eq!(emulator.program_counter(), PROGRAM_START);

        // Leaving the kernel region ends the boot with the program ready
        emulator.step().unwrap();
        assert_eq!(emulator.mode(), Mode::User);
        assert_eq!(emulator.lifecycle(), Lifecycle::UserRunning);
        assert_eq!(emulator.register(2), 2);
    }

    #[test]
    fn failed_load_rom_syscall_is_a_no_op() {
        let mut emulator = Emulator::with_seed(7);
        emulator.power_on().unwrap();
        emulator.registers[0] = 3;
        let pc = emulator.program_counter();
        assert!(matches!(
            syscall(&mut emulator, 0x08),
            Ok(Cycle::NoOp(Diagnostic::SyscallFailed { id: 0x08, .. }))
        ));
        assert_eq!(emulator.program_counter(), pc);
    }
}
