//! Tag key grammar
//!
//! ```text
//! key      := real | "~" internal | "~#" numeric | tied
//! numeric  := name [ ":" func ]          func is exactly three characters
//! tied     := "~" part ( "~" part )+     a second "~" anywhere after the first
//! part     := [ "~" ] name | "#" name    "~~x" forces x to be internal
//! ```
//!
//! Keys are parsed once into a [`TagKey`] and dispatched by variant.

/// Internal names that a tied key resolves without an explicit `~~`
const INTERNAL_NAMES: [&str; 26] = [
    "people",
    "peoplesort",
    "performer",
    "performers",
    "performersort",
    "performerssort",
    "basename",
    "dirname",
    "filename",
    "mountpoint",
    "uri",
    "format",
    "codec",
    "encoding",
    "length",
    "long-length",
    "bitrate",
    "filesize",
    "rating",
    "year",
    "originalyear",
    "lyrics",
    "playlists",
    "tracks",
    "discs",
    "name",
];

/// Structured form of a tag key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKey<'a> {
    /// Stored key without marker (`artist`)
    Real(&'a str),
    /// `~name`, without the marker; may carry a `:variant` suffix
    Internal(&'a str),
    /// `~#name[:func]`, without the marker
    Numeric {
        name: &'a str,
        func: Option<&'a str>,
    },
    /// Sub-keys of a tied key, each itself a full key
    Tied(Vec<String>),
}

impl<'a> TagKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        let Some(body) = key.strip_prefix('~') else {
            return TagKey::Real(key);
        };
        if body.contains('~') {
            return TagKey::Tied(tagsplit(key));
        }
        match body.strip_prefix('#') {
            Some(numeric) => {
                let (name, func) = split_func(numeric);
                TagKey::Numeric { name, func }
            }
            None => TagKey::Internal(body),
        }
    }
}

/// Split a trailing three-character `:func` off a numeric name
fn split_func(name: &str) -> (&str, Option<&str>) {
    let bytes = name.as_bytes();
    if bytes.len() > 4 && bytes[bytes.len() - 4] == b':' && name.is_char_boundary(name.len() - 3) {
        let (head, func) = name.split_at(name.len() - 4);
        (head, Some(&func[1..]))
    } else {
        (name, None)
    }
}

/// Whether `key` is a tied key (`~a~b`, also `~~a`)
pub fn is_tied(key: &str) -> bool {
    key.strip_prefix('~').is_some_and(|body| body.contains('~'))
}

/// Split a tied key into its sub-keys.
///
/// Parts naming an internal value (`people`, `length`, ...) and parts after
/// `~~` become `~part`; parts starting with `#` become `~#part`; everything
/// else is a real key. A key that is not tied comes back unchanged.
///
/// ```
/// use songbook_common::tags::tagsplit;
///
/// assert_eq!(tagsplit("~artist~title"), vec!["artist", "title"]);
/// assert_eq!(tagsplit("~people~title"), vec!["~people", "title"]);
/// assert_eq!(tagsplit("~title~~version"), vec!["title", "~version"]);
/// assert_eq!(tagsplit("~#track~title"), vec!["~#track", "title"]);
/// ```
pub fn tagsplit(key: &str) -> Vec<String> {
    if !is_tied(key) {
        return vec![key.to_string()];
    }
    let body = &key[1..];

    let mut parts = Vec::new();
    let mut force_internal = false;
    for part in body.split('~') {
        if part.is_empty() {
            force_internal = true;
            continue;
        }
        let base = part.split(':').next().unwrap_or(part);
        if part.starts_with('#') || force_internal || INTERNAL_NAMES.contains(&base) {
            parts.push(format!("~{}", part));
        } else {
            parts.push(part.to_string());
        }
        force_internal = false;
    }
    parts
}
