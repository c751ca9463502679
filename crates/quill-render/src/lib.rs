#![forbid(unsafe_code)]

//! Render layer: ANSI emission helpers, the viewport controller, and the
//! full-frame screen renderer.

pub mod ansi;
pub mod screen;
pub mod scroll;
