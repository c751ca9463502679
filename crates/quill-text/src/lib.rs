#![forbid(unsafe_code)]

//! Editing model: rows, the row store, and the search scan.

pub mod buffer;
pub mod row;
pub mod search;
