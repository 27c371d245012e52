use chip_os::emulator::input::{EmulatorInput, Keypad};
use chip_os::emulator::output::{EmulatorOutput, Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};

use super::key_buffer::KeyBuffer;

use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, ErrorKind};
use std::io::{stdout, Stdout, Write};

pub struct CrosstermInput<'a> {
    key_buffer: &'a KeyBuffer,
}

impl CrosstermInput<'_> {
    pub fn new(key_buffer: &KeyBuffer) -> CrosstermInput {
        CrosstermInput { key_buffer }
    }
}

impl EmulatorInput for CrosstermInput<'_> {
    fn poll(&mut self, keypad: &mut Keypad) {
        keypad.replace(self.key_buffer.held());
    }
}

/// Draws the framebuffer inside a box, two terminal columns per pixel.
pub struct CrosstermOutput {
    out: Stdout,
    shown: Option<Framebuffer>,
}

impl CrosstermOutput {
    pub fn new() -> crossterm::Result<CrosstermOutput> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;

        let bottom = SCREEN_HEIGHT as u16 + 1;
        let right = 2 * SCREEN_WIDTH as u16 + 1;
        for y in 0..=bottom {
            for x in 0..=right {
                let c = match (x, y) {
                    (0, 0) => '┏',
                    (x, 0) if x == right => '┓',
                    (0, y) if y == bottom => '┗',
                    (x, y) if x == right && y == bottom => '┛',
                    (_, 0) => '━',
                    (_, y) if y == bottom => '━',
                    (0, _) => '┃',
                    (x, _) if x == right => '┃',
                    _ => continue,
                };
                queue!(out, cursor::MoveTo(x, y), Print(c))?;
            }
        }
        out.flush()?;

        Ok(CrosstermOutput { out, shown: None })
    }

    fn draw(&mut self, x: usize, y: usize, state: u8) -> crossterm::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(2 * x as u16 + 1, y as u16 + 1),
            Print(if state == 1 { "██" } else { "  " })
        )
    }
}

impl Drop for CrosstermOutput {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

impl EmulatorOutput for CrosstermOutput {
    type Error = ErrorKind;

    /// Only cells that changed since the last frame are redrawn.
    fn present(&mut self, framebuffer: &Framebuffer) -> crossterm::Result<()> {
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let state = framebuffer.get(x, y);
                let changed = match &self.shown {
                    Some(shown) => shown.get(x, y) != state,
                    None => true,
                };
                if changed {
                    self.draw(x, y, state)?;
                }
            }
        }
        self.out.flush()?;
        self.shown = Some(framebuffer.clone());
        Ok(())
    }
}
