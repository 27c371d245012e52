use super::key_buffer::KeyBuffer;
use crossterm::event::{poll, read, Event, KeyCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A struct for managing keypresses that will automatically
/// start a thread that grabs keypresses.
pub struct KeyManager {
    stop: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
    key_buffer: Arc<KeyBuffer>,
    event_listener: Option<JoinHandle<()>>,
}

impl KeyManager {
    // Start event listener thread
    pub fn new(timeout: Duration) -> KeyManager {
        let stop = Arc::new(AtomicBool::new(false));
        let quit = Arc::new(AtomicBool::new(false));
        let key_buffer = Arc::new(KeyBuffer::new(timeout));
        let event_listener = event_listener(stop.clone(), quit.clone(), key_buffer.clone());
        KeyManager {
            stop,
            quit,
            key_buffer,
            event_listener: Some(event_listener),
        }
    }

    pub fn key_buffer(&self) -> &KeyBuffer {
        &self.key_buffer
    }

    /// Whether escape has been pressed
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

impl Drop for KeyManager {
    fn drop(&mut self) {
        // Tell the event listener to stop, and wait for it
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.event_listener.take() {
            let _ = handle.join();
        }
    }
}

/// Map the original keyboard layout onto the hex keypad.
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
pub fn hex_key(c: char) -> Option<u8> {
    let key = match c.to_ascii_lowercase() {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xC,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xD,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xE,
        'z' => 0xA,
        'x' => 0x0,
        'c' => 0xB,
        'v' => 0xF,
        _ => return None,
    };
    Some(key)
}

/// Starts a thread that listens for key events and pushes them to the key buffer.
fn event_listener(
    stop: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
    key_buffer: Arc<KeyBuffer>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::error!("Could not poll for events: {}", e);
                    break;
                }
            }

            // Investigate the event
            match read() {
                Ok(Event::Key(key_event)) => match key_event.code {
                    KeyCode::Esc => quit.store(true, Ordering::Relaxed),
                    KeyCode::Char(c) => match hex_key(c) {
                        Some(key) => key_buffer.press(key),
                        None => log::debug!("Unmapped key {:?}", c),
                    },
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => log::error!("Could not read event: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_layout() {
        assert_eq!(hex_key('1'), Some(0x1));
        assert_eq!(hex_key('4'), Some(0xC));
        assert_eq!(hex_key('x'), Some(0x0));
        assert_eq!(hex_key('V'), Some(0xF));
        assert_eq!(hex_key('p'), None);
    }
}
