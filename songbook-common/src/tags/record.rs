//! One track's stored metadata
//!
//! A [`TagRecord`] is a validated, typed map. Stored values are normalized on
//! insertion so every read can trust the value type of a key:
//! - `~#` keys hold numbers
//! - filesystem keys (`~filename`, `~mountpoint`, ...) hold paths
//! - everything else holds text

use super::{
    is_filesystem_tag, is_zero_default, resolve, role_for, sort_tag_for, TagValue, MIGRATE,
};
use crate::config::settings;
use crate::human::{human_sort_key, SortChunk};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Format name of records not created by a format-specific loader
pub const UNKNOWN_FORMAT: &str = "Unknown Audio File";

/// Maximum length of each lyrics path component
const LYRICS_COMPONENT_MAX: usize = 128;

/// Backing medium a record can be (re)loaded from
///
/// Decoding real audio containers is outside this crate; implementations
/// read whatever storage the host uses.
pub trait TagSource {
    /// Load a fresh record for `path`
    fn load(&self, path: &Path) -> Result<TagRecord>;
}

/// Grouping key shared by all tracks of one album
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlbumKey {
    pub album: Vec<SortChunk>,
    pub album_artist: Vec<SortChunk>,
    /// Explicit grouping id: grouping key, label id or MusicBrainz album id
    pub grouping: String,
}

/// Typed key/value store for one track
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    tags: BTreeMap<String, TagValue>,
    format: String,
}

impl Default for TagRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRecord {
    pub fn new() -> Self {
        Self {
            tags: BTreeMap::new(),
            format: UNKNOWN_FORMAT.to_string(),
        }
    }

    /// Empty record produced by a loader for `format` (e.g. `"MP3"`)
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            tags: BTreeMap::new(),
            format: format.into(),
        }
    }

    /// Build a record from key/value pairs, validating each
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<TagValue>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.set(key.as_ref(), value)?;
        }
        Ok(record)
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// Store `value` under `key`, replacing any previous value
    ///
    /// Rejects empty keys, keys containing `=` or a newline, and values that
    /// cannot be coerced to the key's type.
    pub fn set(&mut self, key: &str, value: impl Into<TagValue>) -> Result<()> {
        validate_key(key)?;
        let value = normalize(key, value.into())?;
        self.tags.insert(key.to_string(), value);
        Ok(())
    }

    /// Stored value, without synthesis
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    /// Stored text value, without synthesis
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.tags.get(key).and_then(TagValue::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<TagValue> {
        self.tags.remove(key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Keys without the internal marker
    pub fn realkeys(&self) -> Vec<&str> {
        self.keys().filter(|k| !k.starts_with('~')).collect()
    }

    /// Keys equal to `prefix` or starting with `prefix:`, sorted
    pub fn prefixkeys(&self, prefix: &str) -> Vec<String> {
        self.tags
            .keys()
            .filter(|k| {
                k.strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
            })
            .cloned()
            .collect()
    }

    // ========================================================================
    // Resolved access
    // ========================================================================

    /// Resolve `key` (real, internal, numeric or tied); see [`resolve`]
    pub fn resolve(&self, key: &str, default: &TagValue, connector: &str, joiner: &str) -> TagValue {
        resolve(self, key, default, connector, joiner)
    }

    /// Resolve with an empty default and the standard connector/joiner
    pub fn call(&self, key: &str) -> TagValue {
        self.call_or(key, TagValue::empty())
    }

    /// Resolve with an explicit default
    pub fn call_or(&self, key: &str, default: TagValue) -> TagValue {
        resolve(
            self,
            key,
            &default,
            super::DEFAULT_CONNECTOR,
            super::DEFAULT_JOINER,
        )
    }

    /// All values of a key; synthetic keys are resolved, numbers give one value
    ///
    /// An empty synthetic value and a missing key both give `[]`.
    pub fn list(&self, key: &str) -> Vec<String> {
        if key.contains('~') || key == "title" {
            self.call(key).values()
        } else {
            self.tags.get(key).map(TagValue::values).unwrap_or_default()
        }
    }

    /// All values joined with `", "`; numeric values are returned as numbers
    pub fn comma(&self, key: &str) -> TagValue {
        let value = if key.contains('~') || key == "title" {
            self.call(key)
        } else {
            self.tags.get(key).cloned().unwrap_or_default()
        };
        match value {
            TagValue::Int(_) | TagValue::Float(_) => value,
            other => TagValue::Text(other.to_text().replace('\n', ", ")),
        }
    }

    /// Union of the values of `keys`, first occurrence wins
    pub fn list_unique<I, S>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for key in keys {
            for value in self.list(key.as_ref()) {
                if seen.insert(value.clone()) {
                    out.push(value);
                }
            }
        }
        out
    }

    /// `(display, sort)` pairs; the sort value falls back to the display one
    pub fn list_sort(&self, key: &str) -> Vec<(String, String)> {
        let display = self.call(key).values();
        let sort = sort_tag_for(key)
            .map(|sort_key| self.call(sort_key).values())
            .unwrap_or_default();

        display
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let s = sort
                    .get(i)
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .unwrap_or_else(|| d.clone());
                (d, s)
            })
            .collect()
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Add another value; text values are appended as a new line
    pub fn add(&mut self, key: &str, value: impl Into<TagValue>) -> Result<()> {
        validate_key(key)?;
        let value = normalize(key, value.into())?;
        if let (Some(TagValue::Text(existing)), TagValue::Text(new)) =
            (self.tags.get_mut(key), &value)
        {
            existing.push('\n');
            existing.push_str(new);
            return Ok(());
        }
        self.tags.insert(key.to_string(), value);
        Ok(())
    }

    /// Replace `old` by `new` among the values of `key`; set `key` to `new`
    /// if `old` is not one of them
    pub fn change(&mut self, key: &str, old: &str, new: &str) -> Result<()> {
        let mut parts = self.tags.get(key).map(TagValue::values).unwrap_or_default();
        match parts.iter().position(|p| p == old) {
            Some(index) => {
                parts[index] = new.to_string();
                self.set(key, parts.join("\n"))
            }
            None => self.set(key, new),
        }
    }

    /// Remove one value of `key`, or the whole key when `value` is `None`
    ///
    /// Missing keys and values are ignored.
    pub fn remove(&mut self, key: &str, value: Option<&str>) {
        let Some(stored) = self.tags.get(key) else {
            return;
        };
        match value {
            None => {
                self.tags.remove(key);
            }
            Some(v) if stored.as_str() == Some(v) => {
                self.tags.remove(key);
            }
            Some(v) => {
                let mut parts = stored.values();
                if let Some(index) = parts.iter().position(|p| p == v) {
                    parts.remove(index);
                    self.tags
                        .insert(key.to_string(), TagValue::Text(parts.join("\n")));
                }
            }
        }
    }

    /// True if `~#rating` is stored (otherwise the default rating is reported)
    pub fn has_rating(&self) -> bool {
        self.tags.contains_key("~#rating")
    }

    pub fn remove_rating(&mut self) {
        self.tags.remove("~#rating");
    }

    // ========================================================================
    // Identity and derived paths
    // ========================================================================

    pub fn filename(&self) -> Option<&Path> {
        match self.tags.get("~filename") {
            Some(TagValue::Path(p)) => Some(p),
            _ => None,
        }
    }

    pub fn mountpoint(&self) -> Option<&Path> {
        match self.tags.get("~mountpoint") {
            Some(TagValue::Path(p)) => Some(p),
            _ => None,
        }
    }

    pub fn album_key(&self) -> AlbumKey {
        let grouping = ["album_grouping_key", "labelid", "musicbrainz_albumid"]
            .iter()
            .filter_map(|k| self.get_text(k))
            .find(|v| !v.is_empty())
            .unwrap_or("")
            .to_string();
        AlbumKey {
            album: human_sort_key(&self.call("albumsort").to_text()),
            album_artist: human_sort_key(&self.call("albumartistsort").to_text()),
            grouping,
        }
    }

    /// Where external lyrics for this track live:
    /// `<lyrics_dir>/<lyricist or artist>/<title>.lyric`
    pub fn lyric_filename(&self) -> PathBuf {
        let title = lyrics_component(&self.comma("title").to_text());
        let lyricist = self.comma("lyricist");
        let who = if lyricist.is_empty_text() {
            self.comma("artist")
        } else {
            lyricist
        };
        settings()
            .lyrics_dir
            .join(lyrics_component(&who.to_text()))
            .join(format!("{}.lyric", title))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Fill in bookkeeping values and clean up stored text
    ///
    /// - NUL-separated text becomes newline-separated, empty parts dropped
    /// - zero-valued numerics that default to zero anyway are removed
    /// - `~filename` is set from `filename` (required if not yet stored)
    /// - `~mountpoint` defaults to the filesystem root of the file
    /// - `~#added` defaults to now
    /// - `~#mtime`, `~#filesize` come from the filesystem; `~#bitrate` is
    ///   estimated from size and length when missing
    ///
    /// Filesystem errors are not reported: `~#mtime` is set to 0 instead.
    pub fn sanitize(&mut self, filename: Option<&Path>) -> Result<()> {
        for value in self.tags.values_mut() {
            if let TagValue::Text(text) = value {
                if text.contains('\0') {
                    *text = text
                        .split('\0')
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n");
                }
            }
        }
        self.tags
            .retain(|key, value| !(is_zero_default(key) && value.as_f64() == Some(0.0)));

        if let Some(path) = filename {
            self.set("~filename", path)?;
        }
        let path = match self.filename() {
            Some(path) => path.to_path_buf(),
            None => return Err(Error::validation("Unknown filename")),
        };

        if !self.tags.contains_key("~mountpoint") {
            let root = path.ancestors().last().unwrap_or(Path::new("/"));
            let root = if root.as_os_str().is_empty() {
                Path::new("/")
            } else {
                root
            };
            self.set("~mountpoint", root)?;
        }

        self.tags
            .entry("~#added".to_string())
            .or_insert_with(|| TagValue::Int(chrono::Utc::now().timestamp()));

        match std::fs::metadata(&path) {
            Ok(meta) => {
                let mtime = meta
                    .modified()
                    .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp())
                    .unwrap_or(0);
                let size = i64::try_from(meta.len()).unwrap_or(i64::MAX);
                self.tags.insert("~#mtime".to_string(), TagValue::Int(mtime));
                self.tags.insert("~#filesize".to_string(), TagValue::Int(size));

                if !self.tags.contains_key("~#bitrate") {
                    // kbps = bytes * 8 / seconds / 1000
                    let length = self.get("~#length").and_then(TagValue::as_f64).unwrap_or(0.0);
                    if length > 0.0 {
                        let kbps = (size as f64 / (length * 125.0)).trunc() as i64;
                        self.tags.insert("~#bitrate".to_string(), TagValue::Int(kbps));
                    }
                }
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cannot stat file");
                self.tags.insert("~#mtime".to_string(), TagValue::Int(0));
            }
        }
        Ok(())
    }

    /// Re-read this record from its backing medium
    ///
    /// Usage statistics listed in [`MIGRATE`] survive the reload. If loading
    /// fails the record is left exactly as it was.
    pub fn reload(&mut self, source: &dyn TagSource) -> Result<()> {
        let path = self
            .filename()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Load("record has no ~filename".to_string()))?;

        let saved: Vec<(String, TagValue)> = MIGRATE
            .iter()
            .filter_map(|k| self.tags.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();

        match source.load(&path) {
            Ok(fresh) => {
                self.tags = fresh.tags;
                self.format = fresh.format;
                self.tags
                    .entry("~filename".to_string())
                    .or_insert_with(|| TagValue::Path(path.clone()));
                self.tags.extend(saved);
                debug!(path = %path.display(), "Reloaded record");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Reload failed, keeping old tags");
                Err(e)
            }
        }
    }

    /// Names implied by the role of a people key (`composer` → composition)
    pub(crate) fn implied_roles(&self, keys: &[&str]) -> Vec<(String, &'static str)> {
        keys.iter()
            .filter_map(|k| role_for(k).map(|role| (*k, role)))
            .flat_map(|(k, role)| self.list(k).into_iter().map(move |name| (name, role)))
            .collect()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::validation("tag keys must not be empty"));
    }
    if key.contains('=') || key.contains('\n') {
        return Err(Error::validation(format!("invalid tag key {:?}", key)));
    }
    Ok(())
}

/// Coerce a value to the type its key requires
fn normalize(key: &str, value: TagValue) -> Result<TagValue> {
    if key.starts_with("~#") {
        match value {
            TagValue::Int(_) | TagValue::Float(_) => Ok(value),
            TagValue::Text(ref text) => parse_number(text).ok_or_else(|| {
                Error::validation(format!("{} needs a numeric value, got {:?}", key, text))
            }),
            TagValue::Path(_) => Err(Error::validation(format!(
                "{} needs a numeric value, got a path",
                key
            ))),
        }
    } else if is_filesystem_tag(key) {
        match value {
            TagValue::Path(_) => Ok(value),
            TagValue::Text(text) => Ok(TagValue::Path(PathBuf::from(text))),
            other => Err(Error::validation(format!(
                "{} needs a path, got {}",
                key, other
            ))),
        }
    } else {
        match value {
            TagValue::Text(_) => Ok(value),
            other => Ok(TagValue::Text(other.to_text().into_owned())),
        }
    }
}

/// Integer, then float; `None` if neither parses
pub(crate) fn parse_number(text: &str) -> Option<TagValue> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(TagValue::Int(i));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(TagValue::Float)
}

fn lyrics_component(text: &str) -> String {
    text.replace('/', "").chars().take(LYRICS_COMPONENT_MAX).collect()
}
