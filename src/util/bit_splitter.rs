/// A structure for splitting a fetched opcode into the fields
/// the decoder dispatches on.
///
/// ```text
///   F    X    Y    N
/// [1111 0000 0000 0000] family
/// [0000 1111 0000 0000] x, primary register
/// [0000 0000 1111 0000] y, secondary register
/// [0000 0000 0000 1111] n, 4-bit constant
/// [0000 0000 1111 1111] nn, 8-bit constant
/// [0000 1111 1111 1111] nnn, 12-bit address
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSplitter(u8, u8);

impl BitSplitter {
    pub fn from_u16(value: u16) -> BitSplitter {
        BitSplitter((value >> 8) as u8, (value & 0x00FF) as u8)
    }

    /// Build from the two bytes at `pc` and `pc + 1`, high byte first.
    pub fn new(high: u8, low: u8) -> BitSplitter {
        BitSplitter(high, low)
    }

    pub fn as_u16(&self) -> u16 {
        ((self.0 as u16) << 8) | self.1 as u16
    }

    /// All four nibbles, most significant first.
    pub fn as_four_u8(&self) -> (u8, u8, u8, u8) {
        (self.family(), self.x(), self.y(), self.n())
    }

    pub fn family(&self) -> u8 {
        self.0 >> 4
    }

    pub fn x(&self) -> u8 {
        self.0 & 0x0F
    }

    pub fn y(&self) -> u8 {
        self.1 >> 4
    }

    pub fn n(&self) -> u8 {
        self.1 & 0x0F
    }

    pub fn nn(&self) -> u8 {
        self.1
    }

    pub fn nnn(&self) -> u16 {
        self.as_u16() & 0x0FFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_taken_from_the_right_nibbles() {
        let op = BitSplitter::from_u16(0xABCD);
        assert_eq!(op.family(), 0xA);
        assert_eq!(op.x(), 0xB);
        assert_eq!(op.y(), 0xC);
        assert_eq!(op.n(), 0xD);
        assert_eq!(op.nn(), 0xCD);
        assert_eq!(op.nnn(), 0xBCD);
    }

    #[test]
    fn high_byte_comes_first() {
        assert_eq!(BitSplitter::new(0x12, 0x34).as_u16(), 0x1234);
        assert_eq!(BitSplitter::new(0x12, 0x34), BitSplitter::from_u16(0x1234));
        assert_eq!(BitSplitter::new(0xF0, 0x0F).as_four_u8(), (0xF, 0, 0, 0xF));
    }
}
