//! Data models
//!
//! This module contains the song record and the payloads built around it.

mod song;

pub use song::{NewSong, Pagination, Song, SongBody, SongDetail, SongFilter, SongLyrics};
