//! Small helpers shared by the emulator.

pub mod bit_splitter;
