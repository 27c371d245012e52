/*!

A CHIP-8 emulator with a small operating system around it,
based on https://en.wikipedia.org/wiki/CHIP-8.

The machine has 5 KiB of memory. Next to the usual interpreter area and user program
region there is a kernel region at 0x1000 holding a bootstrap program. It runs in kernel
mode on power-on, where `F0NN` opcodes are syscalls that reset the machine, load the font
and prepare I/O, and then jumps to 0x200 in user mode. Programs come from a virtual disk
of up to four named ROM images.

# Crossterm Frontend

If you want to try the emulator on some programs, there is a ready-to-use implementation
you can run by using `cargo run --release --bin crossterm_frontend -- <roms>...`.
Pick a program from the menu, then use the keys `1234`, `qwer`, `asdf` and `zxcv`
as the hex keypad. Escape quits.

# Library

```rust
use chip_os::emulator::{Emulator, Lifecycle, Mode};

let mut emulator = Emulator::new();
emulator.disk_mut().insert("Clear", &[0x00, 0xE0]).unwrap();

// Run the bootstrap program, which ends in user mode at 0x200
emulator.boot().unwrap();
assert_eq!(emulator.mode(), Mode::User);

emulator.load("Clear").unwrap();
assert_eq!(emulator.lifecycle(), Lifecycle::UserRunning);
emulator.step().unwrap(); // Will now clear the display
```

Alternatively, you can experiment by executing instructions manually.

```rust
use chip_os::emulator::Emulator;
use chip_os::emulator::instruction::{Instruction, Reg, Const, Addr};

let mut emulator = Emulator::new();
emulator.boot().unwrap();

// Execute instructions manually
emulator.execute_single(Instruction::ClearScreen).unwrap();

// Or many sequentially
emulator.execute_many(&[
    Instruction::Goto(Addr(0x250)),
    Instruction::SetRegToConst(Reg(0xA), Const(35)),
    Instruction::SetRegToReg(Reg(0xB), Reg(0xA))
]).unwrap();
assert_eq!(emulator.register(0xB), 35);
```

## Driving the machine

The emulator never blocks and owns no threads. A driver calls `step` (or `run_frame`)
in a loop, ticks the timers at 60 Hz and moves keys and pixels between cycles through
`EmulatorInput` and `EmulatorOutput`. Take a look at `src/emulator/input.rs` and
`src/emulator/output.rs` to see how to implement these, and at `src/bin` for two drivers.
A fatal fault halts the machine and comes back as an `Err`, while `request_exit`
halts it normally.
*/

pub mod config;
pub mod emulator;
pub mod util;
