#![forbid(unsafe_code)]

//! Input parser state machine and timeout-aware terminal reader.
//!
//! [`InputParser`] decodes terminal input bytes into [`KeyEvent`] values.
//! [`TermInput`] wraps it around a byte channel fed from stdin and adds the
//! bounded-timeout read policy the editor loop relies on.
//!
//! # Design
//!
//! The parser is a state machine that handles:
//! - ASCII characters and control codes
//! - CSI (Control Sequence Introducer) sequences: `ESC [ <letter>` and
//!   `ESC [ <digit> ~`
//! - SS3 (Single Shift 3) sequences: `ESC O <letter>`
//!
//! Anything it cannot decode degrades to a bare [`KeyCode::Escape`] — an
//! unrecognized sequence is a no-op, never an error. A read timeout while a
//! sequence is in flight has the same degradation: [`InputParser::pending`]
//! flushes the partial state to `Escape`.

use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::event::{Event, KeyCode, KeyEvent, Modifiers};

/// Default bounded read timeout, matching a 100 ms terminal poll.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Parser state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParserState {
    /// Normal character input.
    #[default]
    Ground,
    /// After ESC (0x1B).
    Escape,
    /// After ESC [ (CSI introducer).
    Csi,
    /// After ESC [ <digit>, expecting `~`.
    CsiParam(u8),
    /// After ESC O (SS3 introducer).
    Ss3,
}

/// Terminal input parser.
///
/// Feed bytes one at a time; each call optionally yields a decoded key:
///
/// ```
/// use quill_core::event::KeyCode;
/// use quill_core::input::InputParser;
///
/// let mut parser = InputParser::new();
/// let keys: Vec<_> = b"\x1b[A".iter().filter_map(|&b| parser.feed(b)).collect();
/// assert_eq!(keys.len(), 1);
/// assert_eq!(keys[0].code, KeyCode::Up);
/// ```
#[derive(Debug, Default)]
pub struct InputParser {
    state: ParserState,
}

impl InputParser {
    /// Create a new input parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single byte and optionally return a decoded key.
    pub fn feed(&mut self, byte: u8) -> Option<KeyEvent> {
        match self.state {
            ParserState::Ground => self.feed_ground(byte),
            ParserState::Escape => self.feed_escape(byte),
            ParserState::Csi => self.feed_csi(byte),
            ParserState::CsiParam(digit) => self.feed_csi_param(digit, byte),
            ParserState::Ss3 => self.feed_ss3(byte),
        }
    }

    /// Flush a partially-read escape sequence.
    ///
    /// Called when the read timeout expires mid-sequence: a lone ESC byte
    /// (or any unfinished sequence) becomes a bare Escape key.
    pub fn pending(&mut self) -> Option<KeyEvent> {
        if self.state == ParserState::Ground {
            return None;
        }
        self.state = ParserState::Ground;
        Some(KeyEvent::new(KeyCode::Escape))
    }

    fn feed_ground(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            // ESC - start escape sequence
            0x1B => {
                self.state = ParserState::Escape;
                None
            }
            // Enter (Ctrl+M) - check before generic Ctrl range
            0x0D => Some(KeyEvent::new(KeyCode::Enter)),
            // Tab (Ctrl+I) - check before generic Ctrl range
            0x09 => Some(KeyEvent::new(KeyCode::Tab)),
            // Ctrl+H deletes, same as Backspace
            0x08 => Some(KeyEvent::new(KeyCode::Backspace)),
            // Other Ctrl+A through Ctrl+Z
            0x01..=0x07 | 0x0A..=0x0C | 0x0E..=0x1A => {
                let c = (byte + b'a' - 1) as char;
                Some(KeyEvent::ctrl(c))
            }
            // Backspace (DEL)
            0x7F => Some(KeyEvent::new(KeyCode::Backspace)),
            // Printable ASCII
            0x20..=0x7E => Some(KeyEvent::new(KeyCode::Char(byte as char))),
            // NUL and non-ASCII bytes are ignored
            _ => None,
        }
    }

    fn feed_escape(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            // CSI introducer
            b'[' => {
                self.state = ParserState::Csi;
                None
            }
            // SS3 introducer
            b'O' => {
                self.state = ParserState::Ss3;
                None
            }
            // Another ESC: emit the first one, stay here for the next
            0x1B => Some(KeyEvent::new(KeyCode::Escape)),
            // Anything else degrades to a bare Escape
            _ => {
                self.state = ParserState::Ground;
                Some(KeyEvent::new(KeyCode::Escape))
            }
        }
    }

    fn feed_csi(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            b'0'..=b'9' => {
                self.state = ParserState::CsiParam(byte - b'0');
                None
            }
            _ => {
                self.state = ParserState::Ground;
                let code = match byte {
                    b'A' => KeyCode::Up,
                    b'B' => KeyCode::Down,
                    b'C' => KeyCode::Right,
                    b'D' => KeyCode::Left,
                    b'H' => KeyCode::Home,
                    b'F' => KeyCode::End,
                    _ => KeyCode::Escape,
                };
                Some(KeyEvent::new(code))
            }
        }
    }

    fn feed_csi_param(&mut self, digit: u8, byte: u8) -> Option<KeyEvent> {
        self.state = ParserState::Ground;
        if byte != b'~' {
            return Some(KeyEvent::new(KeyCode::Escape));
        }
        let code = match digit {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => KeyCode::Escape,
        };
        Some(KeyEvent::new(code))
    }

    fn feed_ss3(&mut self, byte: u8) -> Option<KeyEvent> {
        self.state = ParserState::Ground;
        let code = match byte {
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            _ => KeyCode::Escape,
        };
        Some(KeyEvent::new(code))
    }
}

/// Timeout-aware terminal input reader.
///
/// A pump thread pulls raw bytes off the input collaborator into a channel
/// (blocking `Read` has no portable timeout of its own); `next_event`
/// drains the channel through an [`InputParser`] with a bounded wait.
///
/// Timeout expiry is a normal "nothing to do yet" signal: with the parser
/// at ground it yields [`Event::Tick`], mid-sequence it flushes the partial
/// sequence to a bare Escape. Any other read failure is fatal and
/// propagated.
#[derive(Debug)]
pub struct TermInput {
    rx: Receiver<io::Result<u8>>,
    parser: InputParser,
    timeout: Duration,
}

impl TermInput {
    /// Start reading stdin with the default 100 ms timeout.
    #[must_use]
    pub fn stdin() -> Self {
        Self::from_reader(io::stdin(), DEFAULT_TIMEOUT)
    }

    /// Start a pump thread over an arbitrary byte source.
    #[must_use]
    pub fn from_reader<R: Read + Send + 'static>(mut reader: R, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = [0u8; 1024];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        for &b in &buf[..n] {
                            if tx.send(Ok(b)).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                }
            }
        });
        Self {
            rx,
            parser: InputParser::new(),
            timeout,
        }
    }

    /// Read the next event, waiting at most the configured timeout.
    pub fn next_event(&mut self) -> io::Result<Event> {
        loop {
            match self.rx.recv_timeout(self.timeout) {
                Ok(Ok(byte)) => {
                    if let Some(key) = self.parser.feed(byte) {
                        return Ok(Event::Key(key));
                    }
                }
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    return Ok(self.parser.pending().map_or(Event::Tick, Event::Key));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    if let Some(key) = self.parser.pending() {
                        return Ok(Event::Key(key));
                    }
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input closed",
                    ));
                }
            }
        }
    }
}

impl Iterator for TermInput {
    type Item = io::Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => None,
            other => Some(other),
        }
    }
}

/// Convenience for tests and scripted runs: a pre-decoded event sequence.
pub fn scripted<I: IntoIterator<Item = Event>>(
    events: I,
) -> impl Iterator<Item = io::Result<Event>> {
    events.into_iter().map(Ok)
}
