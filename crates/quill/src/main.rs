#![forbid(unsafe_code)]

//! quill: a small terminal text editor.
//!
//! Usage: `quill [file]`. Set `QUILL_LOG` (an env-filter directive such as
//! `quill=debug`) to append structured logs to `quill.log`; the terminal
//! itself is occupied by the frame.

mod editor;

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use quill_core::input::TermInput;
use quill_core::session::RawSession;

use crate::editor::Editor;

fn main() -> ExitCode {
    init_logging();

    let path = env::args_os().nth(1).map(PathBuf::from);
    match run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The session guard has already restored the terminal here
            eprintln!("quill: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<PathBuf>) -> io::Result<()> {
    let session = RawSession::new()?;
    let (cols, rows) = session.size()?;

    let mut editor = Editor::new(
        TermInput::stdin(),
        io::stdout(),
        cols as usize,
        rows as usize,
    );
    if let Some(path) = path {
        editor.open(path)?;
    }
    editor.run()
}

fn init_logging() {
    let Ok(filter) = env::var("QUILL_LOG") else {
        return;
    };
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open("quill.log")
    else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}
