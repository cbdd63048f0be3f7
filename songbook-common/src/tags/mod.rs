//! Track metadata: typed values, the key grammar, records and the resolver
//!
//! # Key kinds
//!
//! - **real** keys (`artist`, `title`, ...) are stored as-is
//! - **internal** keys start with `~` (`~filename`, `~people`); some are
//!   stored bookkeeping, the rest are computed by [`resolve`]
//! - **numeric** keys start with `~#` (`~#length`, `~#rating`) and always
//!   hold numbers
//! - **tied** keys join several keys into one value (`~artist~title`)

mod dump;
mod key;
mod language;
mod record;
mod resolve;
mod track;
mod value;

pub use key::{is_tied, tagsplit, TagKey};
pub use language::language_name;
pub use record::{AlbumKey, TagRecord, TagSource, UNKNOWN_FORMAT};
pub use resolve::{resolve, Synthetic, DEFAULT_CONNECTOR, DEFAULT_JOINER};
pub use track::Track;
pub use value::TagValue;

/// Sources of `~people`, most important first
pub const PEOPLE: [&str; 9] = [
    "artist",
    "albumartist",
    "author",
    "composer",
    "~performers",
    "originalartist",
    "lyricist",
    "arranger",
    "conductor",
];

/// Sources of `~peoplesort`, most important first
pub const PEOPLE_SORT: [&str; 9] = [
    "artistsort",
    "albumartistsort",
    "author",
    "composersort",
    "~performerssort",
    "originalartist",
    "lyricist",
    "arranger",
    "conductor",
];

/// Values of `~people` standing for many people, most important last
pub const VARIOUS_ARTISTS_VALUES: [&str; 3] = ["V.A.", "various artists", "Various Artists"];

/// Seconds since the epoch; default to 0
pub const TIME_TAGS: [&str; 4] = ["~#lastplayed", "~#laststarted", "~#added", "~#mtime"];

/// Bytes; default to 0
pub const SIZE_TAGS: [&str; 1] = ["~#filesize"];

/// Numeric keys reporting `0` when unset
pub const NUMERIC_ZERO_DEFAULT: [&str; 11] = [
    "~#skipcount",
    "~#playcount",
    "~#length",
    "~#bitrate",
    "~#cue_in",
    "~#cue_out",
    "~#lastplayed",
    "~#laststarted",
    "~#added",
    "~#mtime",
    "~#filesize",
];

/// Keys holding filesystem paths
pub const FILESYSTEM_TAGS: [&str; 4] = ["~filename", "~basename", "~dirname", "~mountpoint"];

/// Usage statistics carried over when a record is reloaded
pub const MIGRATE: [&str; 9] = [
    "~#playcount",
    "~#laststarted",
    "~#lastplayed",
    "~#added",
    "~#skipcount",
    "~#rating",
    "~bookmark",
    "~#cue_in",
    "~#cue_out",
];

/// Whether `key` reports `0` when unset
pub fn is_zero_default(key: &str) -> bool {
    NUMERIC_ZERO_DEFAULT.contains(&key)
}

/// Whether `key` holds a filesystem path
pub fn is_filesystem_tag(key: &str) -> bool {
    FILESYSTEM_TAGS.contains(&key)
}

/// Sort counterpart of a display key
pub fn sort_tag_for(key: &str) -> Option<&'static str> {
    match key {
        "artist" => Some("artistsort"),
        "album" => Some("albumsort"),
        "albumartist" => Some("albumartistsort"),
        "composer" => Some("composersort"),
        "title" => Some("titlesort"),
        "performer" => Some("performersort"),
        "~performer" => Some("~performersort"),
        "~performers" => Some("~performerssort"),
        _ => None,
    }
}

/// Display counterpart of a sort key
pub fn tag_for_sort(key: &str) -> Option<&'static str> {
    match key {
        "artistsort" => Some("artist"),
        "albumsort" => Some("album"),
        "albumartistsort" => Some("albumartist"),
        "composersort" => Some("composer"),
        "titlesort" => Some("title"),
        "performersort" => Some("performer"),
        "~performersort" => Some("~performer"),
        "~performerssort" => Some("~performers"),
        _ => None,
    }
}

/// Role implied by a people key, used for role annotations
pub fn role_for(key: &str) -> Option<&'static str> {
    match key {
        "composer" => Some("composition"),
        "lyricist" => Some("lyrics"),
        "arranger" => Some("arrangement"),
        "conductor" => Some("conducting"),
        _ => None,
    }
}
