//! # Songbook Common Library
//!
//! Music metadata model shared by the songbook tools:
//! - Tag records, the key grammar and the synthetic tag resolver
//! - Record dump format
//! - Album and collection aggregation with a small value cache
//! - Playlists, file-backed playlist persistence and the playlist registry
//! - Configuration loading
//! - Human-readable formatting of durations, sizes and ratings

pub mod collection;
pub mod config;
pub mod error;
pub mod human;
pub mod playlist;
pub mod tags;

pub use collection::{Album, Collection};
pub use error::{Error, Result};
pub use playlist::{FileBackedPlaylist, Playlist};
pub use tags::{TagRecord, TagValue, Track};
