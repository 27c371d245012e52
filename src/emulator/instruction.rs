use crate::util::bit_splitter::BitSplitter;

/// A wrapper for addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub u8);

/// A single instruction from the extended CHIP-8 instruction set.
/// Two bytes written in hexadecimal, with the following special characters:
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register identifier
/// - PC: Program counter
/// - I: 16 bit register for memory address
/// - VN: One of the 16 available variables (register identifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen, // 00E0
    Return, // 00EE
    Goto(Addr), // 1NNN
    Call(Addr), // 2NNN
    IfRegEqConst(Reg, Const), // 3XNN
    IfRegNeqConst(Reg, Const), // 4XNN
    IfRegEqReg(Reg, Reg), // 5XY0
    SetRegToConst(Reg, Const), // 6XNN
    IncRegByConst(Reg, Const), // 7XNN
    SetRegToReg(Reg, Reg), // 8XY0
    BitwiseOr(Reg, Reg), // 8XY1
    BitwiseAnd(Reg, Reg), // 8XY2
    BitwiseXor(Reg, Reg), // 8XY3
    IncRegByReg(Reg, Reg), // 8XY4
    DecRegByReg(Reg, Reg), // 8XY5
    BitshiftRight(Reg), // 8XY6
    SetVxVyMinusVx(Reg, Reg), // 8XY7
    BitshiftLeft(Reg), // 8XYE
    IfRegNeqReg(Reg, Reg), // 9XY0
    SetI(Addr), // ANNN
    SetPcToV0PlusAddr(Addr), // BNNN
    SetVxRand(Reg, Const), // CXNN
    Draw(Reg, Reg, Const), // DXYN
    IfKeyEqVx(Reg), // EX9E
    IfKeyNeqVx(Reg), // EXA1
    SetRegToDelayTimer(Reg), // FX07
    SetRegToGetKey(Reg), // FX0A
    SetDelayTimerToReg(Reg), // FX15
    SetSoundTimerToReg(Reg), // FX18
    AddRegToI(Reg), // FX1E
    SetIToSpriteAddrVx(Reg), // FX29
    SetIToBcdOfReg(Reg), // FX33
    RegDump(Reg), // FX55
    RegLoad(Reg), // FX65
    KernelCall(Const), // F0NN
    Unknown(u16),
}

impl Instruction {
    pub fn from_u16(value: u16) -> Instruction {
        let opcode = BitSplitter::from_u16(value);
        Instruction::decode(opcode)
    }

    /// Decode the two bytes fetched at `pc` and `pc + 1`.
    pub fn from_two_u8(high: u8, low: u8) -> Instruction {
        Instruction::decode(BitSplitter::new(high, low))
    }

    fn decode(opcode: BitSplitter) -> Instruction {
        let unknown = Instruction::Unknown(opcode.as_u16());
        match opcode.as_four_u8() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (0, _, _, _) => unknown,
            (1, _, _, _) => Instruction::Goto(Addr(opcode.nnn())),
            (2, _, _, _) => Instruction::Call(Addr(opcode.nnn())),
            (3, x, _, _) => Instruction::IfRegEqConst(Reg(x), Const(opcode.nn())),
            (4, x, _, _) => Instruction::IfRegNeqConst(Reg(x), Const(opcode.nn())),
            (5, x, y, 0) => Instruction::IfRegEqReg(Reg(x), Reg(y)),
            (5, _, _, _) => unknown,
            (6, x, _, _) => Instruction::SetRegToConst(Reg(x), Const(opcode.nn())),
            (7, x, _, _) => Instruction::IncRegByConst(Reg(x), Const(opcode.nn())),
            (8, x, y, 0) => Instruction::SetRegToReg(Reg(x), Reg(y)),
            (8, x, y, 1) => Instruction::BitwiseOr(Reg(x), Reg(y)),
            (8, x, y, 2) => Instruction::BitwiseAnd(Reg(x), Reg(y)),
            (8, x, y, 3) => Instruction::BitwiseXor(Reg(x), Reg(y)),
            (8, x, y, 4) => Instruction::IncRegByReg(Reg(x), Reg(y)),
            (8, x, y, 5) => Instruction::DecRegByReg(Reg(x), Reg(y)),
            (8, x, _, 6) => Instruction::BitshiftRight(Reg(x)),
            (8, x, y, 7) => Instruction::SetVxVyMinusVx(Reg(x), Reg(y)),
            (8, x, _, 0xE) => Instruction::BitshiftLeft(Reg(x)),
            (8, _, _, _) => unknown,
            (9, x, y, 0) => Instruction::IfRegNeqReg(Reg(x), Reg(y)),
            (9, _, _, _) => unknown,
            (0xA, _, _, _) => Instruction::SetI(Addr(opcode.nnn())),
            (0xB, _, _, _) => Instruction::SetPcToV0PlusAddr(Addr(opcode.nnn())),
            (0xC, x, _, _) => Instruction::SetVxRand(Reg(x), Const(opcode.nn())),
            (0xD, x, y, n) => Instruction::Draw(Reg(x), Reg(y), Const(n)),
            (0xE, x, 9, 0xE) => Instruction::IfKeyEqVx(Reg(x)),
            (0xE, x, 0xA, 1) => Instruction::IfKeyNeqVx(Reg(x)),
            (0xE, _, _, _) => unknown,
            // A zero register selector marks a kernel syscall
            (0xF, 0, _, _) => Instruction::KernelCall(Const(opcode.nn())),
            (0xF, x, _, _) => {
                Instruction::register_op(Reg(x), Const(opcode.nn())).unwrap_or(unknown)
            }
            _ => unknown,
        }
    }

    /// The per-register `FXNN` instruction selected by `nn`, if there is one.
    pub fn register_op(x: Reg, nn: Const) -> Option<Instruction> {
        let instruction = match nn.0 {
            0x07 => Instruction::SetRegToDelayTimer(x),
            0x0A => Instruction::SetRegToGetKey(x),
            0x15 => Instruction::SetDelayTimerToReg(x),
            0x18 => Instruction::SetSoundTimerToReg(x),
            0x1E => Instruction::AddRegToI(x),
            0x29 => Instruction::SetIToSpriteAddrVx(x),
            0x33 => Instruction::SetIToBcdOfReg(x),
            0x55 => Instruction::RegDump(x),
            0x65 => Instruction::RegLoad(x),
            _ => return None,
        };
        Some(instruction)
    }
}
