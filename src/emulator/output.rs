use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// The 64x32 monochrome screen, one cell per pixel, indexed `y * 64 + x`.
/// Every cell is either 0 or 1.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    cells: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Framebuffer {
        Framebuffer {
            cells: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// The pixel at `(x, y)`, or 0 outside the screen.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            self.cells[y * SCREEN_WIDTH + x]
        } else {
            0
        }
    }

    /// XOR a single sprite bit into the pixel at `(x, y)`.
    /// Returns true if a lit pixel was turned off. Off-screen pixels are clipped.
    pub fn xor(&mut self, x: usize, y: usize, bit: u8) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let cell = &mut self.cells[y * SCREEN_WIDTH + x];
        let collision = bit & *cell == 1;
        *cell ^= bit & 1;
        collision
    }

    pub fn clear(&mut self) {
        self.cells = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
    }

    /// Read-only snapshot of all cells, row by row.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(SCREEN_WIDTH)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for c in row.iter() {
                write!(f, "{}", if *c == 1 { "#" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}

/// Represents a screen the framebuffer can be presented on.
pub trait EmulatorOutput {
    type Error;

    fn present(&mut self, framebuffer: &Framebuffer) -> Result<(), Self::Error>;
}

/// An output device that only remembers how many frames it was given.
pub struct DummyOutput {
    frames: usize,
}

impl DummyOutput {
    pub fn new() -> DummyOutput {
        DummyOutput { frames: 0 }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Default for DummyOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatorOutput for DummyOutput {
    type Error = std::convert::Infallible;

    fn present(&mut self, _: &Framebuffer) -> Result<(), Self::Error> {
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_reports_collisions() {
        let mut fb = Framebuffer::new();
        assert!(!fb.xor(3, 4, 1));
        assert_eq!(fb.get(3, 4), 1);
        assert_eq!(fb.cells()[4 * 64 + 3], 1);
        assert!(fb.xor(3, 4, 1));
        assert_eq!(fb.get(3, 4), 0);
        assert!(!fb.xor(3, 4, 0));
    }

    #[test]
    fn off_screen_pixels_are_clipped() {
        let mut fb = Framebuffer::new();
        assert!(!fb.xor(64, 0, 1));
        assert!(!fb.xor(0, 32, 1));
        assert_eq!(fb, Framebuffer::new());
    }

    #[test]
    fn display_draws_lit_cells() {
        let mut fb = Framebuffer::new();
        fb.xor(1, 0, 1);
        let text = fb.to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(&first[..3], " # ");
        assert_eq!(text.lines().count(), SCREEN_HEIGHT);
    }
}
