//! Core business logic

pub mod lyrics;

pub use lyrics::{LyricsLib, PageOutOfRange};
