#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! RAII-based raw-mode management that ensures cleanup even on panic. The
//! guard owns raw-mode entry/exit; everything else about the terminal (the
//! frame bytes themselves) belongs to the render layer.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Drop restores the terminal** - raw mode is disabled and the cursor
//!    shown when the [`RawSession`] is dropped.
//! 2. **Panic safety** - a panic hook performs the same best-effort restore
//!    before the default hook prints the message, so the report is readable.
//! 3. **Signal safety (unix)** - SIGINT/SIGTERM restore the terminal before
//!    the process exits.
//!
//! # Escape Sequences Reference
//!
//! | Feature | Enable | Disable |
//! |---------|--------|---------|
//! | Show cursor | `CSI ? 25 h` | `CSI ? 25 l` |
//! | Raw mode | via termios | via termios |

use std::io::{self, Write};
use std::sync::OnceLock;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// A terminal session that manages raw mode and cleanup.
///
/// # Contract
///
/// - **Exclusive ownership**: only one `RawSession` should exist at a time.
/// - **Raw mode entry**: creating a session enters raw mode (no line
///   buffering, no echo).
/// - **Cleanup guarantee**: dropping the session (normally or via panic)
///   restores the terminal.
#[derive(Debug)]
pub struct RawSession {
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl RawSession {
    /// Enter raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        Ok(Self {
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        })
    }

    /// Get the current terminal size (columns, rows).
    ///
    /// # Errors
    ///
    /// Failure to query the size is a fatal setup error for callers; it is
    /// surfaced, never defaulted.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        best_effort_restore();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode disabled");
    }
}

impl Drop for RawSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_restore();
            previous(info);
        }));
    });
}

fn best_effort_restore() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                #[cfg(feature = "tracing")]
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_restore();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// Note: tests that actually enter raw mode would interfere with the test
// runner's terminal state, so session behavior is exercised manually and
// via the editor's scripted-input tests that bypass the terminal entirely.
