//! The machine and its fetch-decode-execute cycle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::emulator::disk::VirtualDisk;
use crate::emulator::error::{Diagnostic, Fault, LoadError};
use crate::emulator::input::{EmulatorInput, Keypad};
use crate::emulator::instruction::*;
use crate::emulator::machine::{
    CallStack, Halt, Lifecycle, Mode, FLAG_REGISTER, NUM_REGISTERS,
};
use crate::emulator::memory::{
    in_kernel_region, Memory, FONT_BASE, GLYPH_SIZE, KERNEL_START, PROGRAM_START,
};
use crate::emulator::output::{EmulatorOutput, Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::emulator::syscall::{KernelOnly, SyscallGate, BOOTSTRAP};
use crate::emulator::timers::Timers;

/// What a single cycle amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// The instruction was executed.
    Continue,
    /// `FX0A` found no key pressed. The same instruction runs again next cycle.
    WaitingForKey,
    /// A non-fatal problem was logged and the instruction did nothing.
    NoOp(Diagnostic),
    /// Nothing ran: the machine is not booted, has no program, or is halted.
    Idle,
}

/// Selection made in the ROM menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Rom(String),
    Exit,
}

pub struct Emulator {
    pub(super) memory: Memory,
    pub(super) registers: [u8; NUM_REGISTERS],
    pub(super) i: u16,
    pub(super) program_counter: u16,
    pub(super) stack: CallStack,
    pub(super) mode: Mode,
    pub(super) lifecycle: Lifecycle,
    pub(super) program_loaded: bool,
    pub(super) shell_ready: bool,

    pub(super) timers: Timers,
    pub(super) keypad: Keypad,
    pub(super) framebuffer: Framebuffer,
    pub(super) disk: VirtualDisk,

    pub(super) gate: Box<dyn SyscallGate>,
    rng: StdRng,
}

impl Emulator {
    /// Create a zeroed machine with an entropy-seeded random generator.
    pub fn new() -> Emulator {
        Emulator::with_rng(StdRng::from_entropy())
    }

    /// Create a zeroed machine whose `CXNN` results are reproducible.
    pub fn with_seed(seed: u64) -> Emulator {
        Emulator::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Emulator {
        Emulator {
            memory: Memory::new(),
            registers: [0; NUM_REGISTERS],
            i: 0,
            program_counter: 0,
            stack: CallStack::new(),
            mode: Mode::Kernel,
            lifecycle: Lifecycle::Uninitialized,
            program_loaded: false,
            shell_ready: false,

            timers: Timers::default(),
            keypad: Keypad::new(),
            framebuffer: Framebuffer::new(),
            disk: VirtualDisk::new(),

            gate: Box::new(KernelOnly),
            rng,
        }
    }

    /// Replace the check deciding who may invoke kernel syscalls.
    pub fn with_gate(mut self, gate: Box<dyn SyscallGate>) -> Emulator {
        self.gate = gate;
        self
    }

    /// Install the bootstrap program and point the machine at it in kernel mode.
    pub fn power_on(&mut self) -> Result<(), Fault> {
        self.memory.write_slice(KERNEL_START as usize, &BOOTSTRAP, Mode::Kernel)?;
        self.program_counter = KERNEL_START;
        self.mode = Mode::Kernel;
        self.lifecycle = Lifecycle::KernelBoot;
        log::debug!("Powered on, booting from {:#06x}", KERNEL_START);
        Ok(())
    }

    /// Power on if needed and run the bootstrap program until it leaves the kernel region.
    pub fn boot(&mut self) -> Result<(), Fault> {
        if self.lifecycle == Lifecycle::Uninitialized {
            self.power_on()?;
        }
        while self.lifecycle == Lifecycle::KernelBoot {
            self.step()?;
        }
        log::info!("CHIP-8 initialized");
        Ok(())
    }

    /// Perform a single cycle: fetch the opcode at `pc`, advance `pc` and execute it.
    /// A fault halts the machine before it is returned.
    pub fn step(&mut self) -> Result<Cycle, Fault> {
        self.leave_kernel_if_done();
        match self.lifecycle {
            Lifecycle::KernelBoot | Lifecycle::UserRunning => {}
            _ => return Ok(Cycle::Idle),
        }

        // Opcodes are stored big-endian
        let pc = self.program_counter;
        let high = self.memory.read(pc as usize, self.mode);
        let high = self.halt_on_fault(high)?;
        let low = self.memory.read(pc as usize + 1, self.mode);
        let low = self.halt_on_fault(low)?;
        let instruction = Instruction::from_two_u8(high, low);

        log::trace!("{:#06x}: {:?}", pc, instruction);

        self.program_counter = pc.wrapping_add(2); // Each opcode is two bytes
        let cycle = self.execute_single(instruction)?;
        self.leave_kernel_if_done();
        Ok(cycle)
    }

    /// Run up to `cycles` cycles, stopping early if the machine goes idle,
    /// then tick the timers once.
    pub fn run_frame(&mut self, cycles: u32) -> Result<Cycle, Fault> {
        let mut last = Cycle::Idle;
        for _ in 0..cycles {
            last = self.step()?;
            if last == Cycle::Idle {
                break;
            }
        }
        self.tick_timers();
        Ok(last)
    }

    /// Execute a single instruction, as if it had been fetched at `pc - 2`.
    /// A fault halts the machine before it is returned.
    pub fn execute_single(&mut self, instruction: Instruction) -> Result<Cycle, Fault> {
        if let Lifecycle::Halted(_) = self.lifecycle {
            return Ok(Cycle::Idle);
        }
        let result = self.dispatch(instruction);
        self.halt_on_fault(result)
    }

    /// Execute many instructions sequentially, stopping at the first fault.
    pub fn execute_many(&mut self, instructions: &[Instruction]) -> Result<(), Fault> {
        for instruction in instructions {
            self.execute_single(*instruction)?;
        }
        Ok(())
    }

    /// Decrement both timers once, called by the driver at 60 Hz.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// Stop the machine as a normal termination.
    pub fn request_exit(&mut self) {
        if let Lifecycle::Halted(_) = self.lifecycle {
            return;
        }
        log::info!("Closing CHIP_OS");
        self.lifecycle = Lifecycle::Halted(Halt::Exit);
    }

    /// Act on a menu selection.
    pub fn apply_selection(&mut self, selection: &Selection) -> Result<(), LoadError> {
        match selection {
            Selection::Rom(name) => self.load(name),
            Selection::Exit => {
                self.request_exit();
                Ok(())
            }
        }
    }

    /// Let `input` update the keypad.
    pub fn poll_input<I: EmulatorInput>(&mut self, input: &mut I) {
        input.poll(&mut self.keypad);
    }

    /// Hand the framebuffer to `output`.
    pub fn present<O: EmulatorOutput>(&self, output: &mut O) -> Result<(), O::Error> {
        output.present(&self.framebuffer)
    }

    pub fn register(&self, x: u8) -> u8 {
        self.registers[x as usize & 0xF]
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn disk(&self) -> &VirtualDisk {
        &self.disk
    }

    /// The disk is meant to be populated before the first load.
    pub fn disk_mut(&mut self) -> &mut VirtualDisk {
        &mut self.disk
    }

    pub fn shell_ready(&self) -> bool {
        self.shell_ready
    }

    fn halt_on_fault<T>(&mut self, result: Result<T, Fault>) -> Result<T, Fault> {
        if let Err(fault) = &result {
            log::error!("Machine fault: {}", fault);
            self.lifecycle = Lifecycle::Halted(Halt::Fault(*fault));
        }
        result
    }

    /// Switch to user mode once the bootstrap has jumped out of the kernel region.
    fn leave_kernel_if_done(&mut self) {
        if self.lifecycle != Lifecycle::KernelBoot
            || in_kernel_region(self.program_counter as usize)
        {
            return;
        }
        self.mode = Mode::User;
        self.program_counter = PROGRAM_START;
        self.lifecycle = if self.program_loaded {
            Lifecycle::UserRunning
        } else {
            Lifecycle::AwaitingProgram
        };
        log::debug!("Entered user mode, {:?}", self.lifecycle);
    }

    pub(super) fn diagnose(&self, diagnostic: Diagnostic) -> Cycle {
        log::warn!("{:#06x}: {}", self.program_counter.wrapping_sub(2), diagnostic);
        Cycle::NoOp(diagnostic)
    }

    /// Register selectors are four bits wide, higher bits are ignored.
    fn v(&self, x: u8) -> u8 {
        self.registers[x as usize & 0xF]
    }

    fn v_mut(&mut self, x: u8) -> &mut u8 {
        &mut self.registers[x as usize & 0xF]
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    /// Store an ALU result in `Vx`, then the flag in V15.
    fn set_with_flag(&mut self, x: u8, value: u8, flag: bool) {
        *self.v_mut(x) = value;
        self.registers[FLAG_REGISTER] = flag as u8;
    }

    pub(super) fn dispatch(&mut self, instruction: Instruction) -> Result<Cycle, Fault> {
        let pc = self.program_counter.wrapping_sub(2);
        match instruction {
            // Clear the screen
            Instruction::ClearScreen => {
                self.framebuffer.clear();
            }

            // Return to the previous call site via the stack.
            Instruction::Return => {
                self.program_counter = self.stack.pop(pc)?;
            }

            Instruction::Goto(Addr(addr)) => {
                self.program_counter = addr;
            }

            // Store the return address on the stack, then jump to the specified address
            Instruction::Call(Addr(addr)) => {
                self.stack.push(self.program_counter, pc)?;
                self.program_counter = addr;
            }

            Instruction::IfRegEqConst(Reg(x), Const(n)) => {
                self.skip_if(self.v(x) == n);
            }

            Instruction::IfRegNeqConst(Reg(x), Const(n)) => {
                self.skip_if(self.v(x) != n);
            }

            Instruction::IfRegEqReg(Reg(x), Reg(y)) => {
                self.skip_if(self.v(x) == self.v(y));
            }

            Instruction::SetRegToConst(Reg(x), Const(n)) => {
                *self.v_mut(x) = n;
            }

            // Wraps around without touching the flag
            Instruction::IncRegByConst(Reg(x), Const(n)) => {
                *self.v_mut(x) = self.v(x).wrapping_add(n);
            }

            Instruction::SetRegToReg(Reg(x), Reg(y)) => {
                *self.v_mut(x) = self.v(y);
            }

            Instruction::BitwiseOr(Reg(x), Reg(y)) => {
                let vy = self.v(y);
                *self.v_mut(x) |= vy;
            }

            Instruction::BitwiseAnd(Reg(x), Reg(y)) => {
                let vy = self.v(y);
                *self.v_mut(x) &= vy;
            }

            Instruction::BitwiseXor(Reg(x), Reg(y)) => {
                let vy = self.v(y);
                *self.v_mut(x) ^= vy;
            }

            // VF is 1 on carry
            Instruction::IncRegByReg(Reg(x), Reg(y)) => {
                let (sum, carry) = self.v(x).overflowing_add(self.v(y));
                self.set_with_flag(x, sum, carry);
            }

            // VF is 1 when there is no borrow
            Instruction::DecRegByReg(Reg(x), Reg(y)) => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_with_flag(x, vx.wrapping_sub(vy), vx >= vy);
            }

            Instruction::BitshiftRight(Reg(x)) => {
                let vx = self.v(x);
                self.set_with_flag(x, vx >> 1, vx & 1 == 1);
            }

            Instruction::SetVxVyMinusVx(Reg(x), Reg(y)) => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_with_flag(x, vy.wrapping_sub(vx), vy >= vx);
            }

            Instruction::BitshiftLeft(Reg(x)) => {
                let vx = self.v(x);
                self.set_with_flag(x, vx << 1, vx >> 7 == 1);
            }

            Instruction::IfRegNeqReg(Reg(x), Reg(y)) => {
                self.skip_if(self.v(x) != self.v(y));
            }

            Instruction::SetI(Addr(addr)) => {
                self.i = addr;
            }

            Instruction::SetPcToV0PlusAddr(Addr(addr)) => {
                self.program_counter = addr + self.v(0) as u16;
            }

            Instruction::SetVxRand(Reg(x), Const(n)) => {
                let value = self.rng.gen::<u8>() & n;
                *self.v_mut(x) = value;
            }

            Instruction::Draw(Reg(x), Reg(y), Const(sprite_height)) => {
                self.draw(x, y, sprite_height)?;
            }

            Instruction::IfKeyEqVx(Reg(x)) => {
                self.skip_if(self.keypad.is_pressed(self.v(x)));
            }

            Instruction::IfKeyNeqVx(Reg(x)) => {
                self.skip_if(!self.keypad.is_pressed(self.v(x)));
            }

            Instruction::SetRegToDelayTimer(Reg(x)) => {
                *self.v_mut(x) = self.timers.delay;
            }

            // Rewind pc until a key is pressed
            Instruction::SetRegToGetKey(Reg(x)) => match self.keypad.first_pressed() {
                Some(key) => *self.v_mut(x) = key,
                None => {
                    self.program_counter = pc;
                    return Ok(Cycle::WaitingForKey);
                }
            },

            Instruction::SetDelayTimerToReg(Reg(x)) => {
                self.timers.delay = self.v(x);
            }

            Instruction::SetSoundTimerToReg(Reg(x)) => {
                self.timers.sound = self.v(x);
            }

            Instruction::AddRegToI(Reg(x)) => {
                self.i = self.i.wrapping_add(self.v(x) as u16);
            }

            // Each font glyph is 5 bytes
            Instruction::SetIToSpriteAddrVx(Reg(x)) => {
                self.i = FONT_BASE + self.v(x) as u16 * GLYPH_SIZE;
            }

            Instruction::SetIToBcdOfReg(Reg(x)) => {
                let value = self.v(x);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                self.memory.write_slice(self.i as usize, &digits, self.mode)?;
            }

            // Dump register values up to Vx
            Instruction::RegDump(Reg(x)) => {
                let registers = &self.registers[..=x as usize & 0xF];
                self.memory.write_slice(self.i as usize, registers, self.mode)?;
            }

            // Load register values up to Vx
            Instruction::RegLoad(Reg(x)) => {
                let count = (x as usize & 0xF) + 1;
                let values = self.memory.read_slice(self.i as usize, count, self.mode)?;
                self.registers[..count].copy_from_slice(values);
            }

            Instruction::KernelCall(Const(id)) => {
                return self.kernel_call(id);
            }

            Instruction::Unknown(opcode) => {
                return Ok(self.diagnose(Diagnostic::UnknownOpcode { opcode }));
            }
        };
        Ok(Cycle::Continue)
    }

    /// XOR an 8 pixel wide sprite from `I` onto the screen at `(Vx, Vy)`.
    /// The start wraps around the screen, the rest of the sprite is clipped.
    fn draw(&mut self, x: u8, y: u8, sprite_height: u8) -> Result<(), Fault> {
        let x_coord = self.v(x) as usize % SCREEN_WIDTH;
        let y_coord = self.v(y) as usize % SCREEN_HEIGHT;

        // Each row is 8 bits
        let sprite = self.memory.read_slice(self.i as usize, sprite_height as usize, self.mode)?;

        let mut any_collisions = false;
        for (dy, &row) in sprite.iter().enumerate() {
            for dx in 0..8 {
                let bit = (row >> (7 - dx)) & 1;
                any_collisions |= self.framebuffer.xor(x_coord + dx, y_coord + dy, bit);
            }
        }

        self.registers[FLAG_REGISTER] = any_collisions as u8;
        Ok(())
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
