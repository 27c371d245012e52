//! Errors and diagnostics produced by the machine.

use thiserror::Error;

/// A fatal machine fault. The machine is halted before one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("stack overflow: call at {pc:#06X} with all 16 frames in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {addr:#06X}")]
    OutOfBounds { addr: usize },

    #[error("user mode access to kernel memory at address {addr:#06X}")]
    KernelRegionAccess { addr: usize },
}

/// A non-fatal problem. It is logged and the cycle completes as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("unknown kernel syscall {id:#04X}")]
    UnknownSyscall { id: u8 },

    #[error("kernel syscall {id:#04X} rejected outside kernel mode")]
    SyscallRejected { id: u8 },

    #[error("kernel syscall {id:#04X} failed: {source}")]
    SyscallFailed { id: u8, source: LoadError },
}

/// Why a program could not be loaded. No machine state changes when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no disk entry named {0:?}")]
    NotFound(String),

    #[error("disk entry {0:?} has no data")]
    NotPopulated(String),

    #[error("no disk entry at index {0}")]
    IndexOutOfRange(usize),

    #[error("program is {size} bytes but only {max} bytes fit in user memory")]
    TooLarge { size: usize, max: usize },

    #[error("the machine cannot load a program while {0}")]
    NotReady(&'static str),

    #[error(transparent)]
    Fault(#[from] Fault),
}

/// Why an entry could not be added to the virtual disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiskError {
    #[error("the virtual disk already holds {0} entries")]
    Full(usize),

    #[error("{name:?} is {size} bytes, the disk holds at most {max} bytes per entry")]
    TooLarge { name: String, size: usize, max: usize },

    #[error("the virtual disk already has an entry named {0:?}")]
    DuplicateName(String),
}
