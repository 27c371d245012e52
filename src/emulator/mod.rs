//! The CHIP-8 machine with its privilege modes, kernel syscalls and virtual disk.

pub mod disk;
pub mod emulator;
pub mod error;
pub mod input;
pub mod instruction;
pub mod loader;
pub mod machine;
pub mod memory;
pub mod output;
pub mod syscall;
pub mod timers;

pub use self::emulator::{Cycle, Emulator, Selection};
pub use self::error::{Diagnostic, DiskError, Fault, LoadError};
pub use self::machine::{Halt, Lifecycle, Mode};
