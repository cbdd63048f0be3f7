//! Ordered track groups
//!
//! A [`Playlist`] is an ordered list of entries that may repeat. An entry is
//! either a live [`Track`] or a placeholder holding the `~filename` of a
//! track whose medium is currently unavailable (masked). Placeholders are
//! turned back into tracks by [`Playlist::add_songs`] once the medium
//! returns.
//!
//! Mutations notify the owning [`Library`] synchronously through
//! [`Library::on_changed`], unless notifications are suppressed with
//! [`Playlist::inhibited`].
//!
//! # Equality
//!
//! Playlists compare and order by name but hash by instance. Two distinct
//! playlists with the same name are equal without being interchangeable,
//! and renaming a playlist changes equality but never its hash bucket.

mod file_backed;
mod library;
mod registry;

pub use file_backed::{escape_name, unescape_name, FileBackedPlaylist, DEFAULT_BASE_NAME};
pub use library::{ChangeRecord, MemoryLibrary};
pub use registry::PlaylistRegistry;

use crate::collection::{Aggregate, Aggregator};
use crate::tags::{TagValue, Track};
use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::borrow::Cow;
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

// ============================================================================
// Library contract
// ============================================================================

/// Why a playlist reported changed tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    Append,
    Extend,
    Clear,
    /// Placeholders were resolved back into tracks
    Add,
    RemoveSongs,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeReason::Append => "append",
            ChangeReason::Extend => "extend",
            ChangeReason::Clear => "clear",
            ChangeReason::Add => "add",
            ChangeReason::RemoveSongs => "remove_songs",
        };
        f.write_str(name)
    }
}

/// The track directory playlists resolve identifiers against
///
/// Identifiers are `~filename` values. A masked identifier belongs to a
/// track whose medium is offline: it cannot be resolved now but may later.
pub trait Library {
    fn contains(&self, id: &str) -> bool;

    fn resolve(&self, id: &str) -> Option<Track>;

    fn is_masked(&self, id: &str) -> bool;

    /// Called after a playlist changed the given tracks
    fn on_changed(&self, _songs: &[Track], _reason: ChangeReason) {}
}

// ============================================================================
// Entries
// ============================================================================

/// One position in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaylistEntry {
    Song(Track),
    /// Identifier of a track on an unavailable medium
    Placeholder(String),
}

impl PlaylistEntry {
    /// The identifier written to disk for this entry
    pub fn key(&self) -> String {
        match self {
            PlaylistEntry::Song(track) => track.key(),
            PlaylistEntry::Placeholder(id) => id.clone(),
        }
    }

    pub fn as_song(&self) -> Option<&Track> {
        match self {
            PlaylistEntry::Song(track) => Some(track),
            PlaylistEntry::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PlaylistEntry::Placeholder(_))
    }

    fn is_song(&self, song: &Track) -> bool {
        matches!(self, PlaylistEntry::Song(track) if track == song)
    }
}

impl From<Track> for PlaylistEntry {
    fn from(track: Track) -> Self {
        PlaylistEntry::Song(track)
    }
}

// ============================================================================
// Playlist
// ============================================================================

/// Resets the inhibit flag to its previous state when dropped
struct InhibitGuard {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl InhibitGuard {
    fn engage(flag: &Rc<Cell<bool>>) -> Self {
        Self {
            flag: Rc::clone(flag),
            previous: flag.replace(true),
        }
    }
}

impl Drop for InhibitGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Named, ordered list of tracks and placeholders
pub struct Playlist {
    id: Uuid,
    name: String,
    entries: Vec<PlaylistEntry>,
    library: Option<Rc<dyn Library>>,
    inhibit: Rc<Cell<bool>>,
    aggregator: Aggregator,
}

impl Playlist {
    /// Empty playlist; fails if `name` is empty
    pub fn new(name: impl Into<String>, library: Option<Rc<dyn Library>>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            entries: Vec::new(),
            library,
            inhibit: Rc::new(Cell::new(false)),
            aggregator: Aggregator::new(),
        })
    }

    /// `"<title>"` for one track, `"<title> and N more"` for several
    ///
    /// Empty when `songs` is empty.
    pub fn suggested_name_for(songs: &[Track]) -> String {
        let Some(first) = songs.first() else {
            return String::new();
        };
        let title = first.comma("title").to_string();
        match songs.len() {
            1 => title,
            n => format!("{} and {} more", title, n - 1),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn library(&self) -> Option<&Rc<dyn Library>> {
        self.library.as_ref()
    }

    /// Change the name; fails if `new_name` is empty
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        if new_name == self.name {
            return Ok(());
        }
        validate_name(new_name)?;
        self.name = new_name.to_string();
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlaylistEntry> {
        self.entries.iter()
    }

    pub fn get_entry(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// Live tracks in order, placeholders skipped
    pub fn songs(&self) -> Vec<Track> {
        self.entries
            .iter()
            .filter_map(PlaylistEntry::as_song)
            .cloned()
            .collect()
    }

    /// Position of the first occurrence of `song`
    pub fn index_of(&self, song: &Track) -> Option<usize> {
        self.entries.iter().position(|e| e.is_song(song))
    }

    pub fn contains(&self, song: &Track) -> bool {
        self.index_of(song).is_some()
    }

    /// Whether any entry appears more than once
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.entries.len());
        !self.entries.iter().all(|e| seen.insert(e))
    }

    /// `(some, all)`: whether any and whether every one of `songs` is present
    ///
    /// Placeholders never match. Stops early once the answer is
    /// `(true, false)`.
    pub fn has_songs(&self, songs: &[Track]) -> (bool, bool) {
        let (mut some, mut all) = (false, true);
        for song in songs {
            let found = self.contains(song);
            some = some || found;
            all = all && found;
            if some && !all {
                break;
            }
        }
        (some, all)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    pub fn append(&mut self, song: Track) {
        self.entries.push(PlaylistEntry::Song(song.clone()));
        self.emit_changed(&[song], ChangeReason::Append);
        self.finalize();
    }

    pub fn extend(&mut self, songs: impl IntoIterator<Item = Track>) {
        let songs: Vec<Track> = songs.into_iter().collect();
        self.entries
            .extend(songs.iter().cloned().map(PlaylistEntry::Song));
        self.finalize();
        self.emit_changed(&songs, ChangeReason::Extend);
    }

    pub fn clear(&mut self) {
        let songs = self.songs();
        self.emit_changed(&songs, ChangeReason::Clear);
        self.entries.clear();
        self.finalize();
    }

    /// Replace the entry at `index`, returning the old one
    pub fn set(&mut self, index: usize, entry: PlaylistEntry) -> Result<PlaylistEntry> {
        let len = self.entries.len();
        let slot = self.entries.get_mut(index).ok_or_else(|| {
            Error::validation(format!(
                "index {} out of range for playlist {:?} of length {}",
                index, self.name, len
            ))
        })?;
        let old = std::mem::replace(slot, entry);
        self.finalize();
        Ok(old)
    }

    pub(crate) fn push_entry(&mut self, entry: PlaylistEntry) {
        self.entries.push(entry);
        self.finalize();
    }

    /// Resolve placeholders whose identifier is in `ids`
    ///
    /// Returns true if any placeholder became a track.
    pub fn add_songs<S: AsRef<str>>(&mut self, ids: &[S], library: &dyn Library) -> bool {
        let mut changed = Vec::new();
        for entry in self.entries.iter_mut() {
            let PlaylistEntry::Placeholder(id) = entry else {
                continue;
            };
            if !ids.iter().any(|wanted| wanted.as_ref() == id.as_str()) {
                continue;
            }
            if let Some(song) = library.resolve(id) {
                *entry = PlaylistEntry::Song(song.clone());
                changed.push(song);
            }
        }
        if changed.is_empty() {
            return false;
        }
        self.finalize();
        self.emit_changed(&changed, ChangeReason::Add);
        true
    }

    /// Remove `songs`
    ///
    /// Every occurrence is removed, or only the first with `leave_dupes`.
    /// Songs whose medium is masked are not removed: their entries become
    /// placeholders in place. Returns true if anything changed.
    pub fn remove_songs(&mut self, songs: &[Track], leave_dupes: bool) -> bool {
        debug!(playlist = %self.name, count = songs.len(), "Removing songs");
        let mut changed = false;

        for song in songs {
            let id = song.key();
            let masked = self.library.as_ref().is_some_and(|lib| lib.is_masked(&id));
            if masked {
                for entry in self.entries.iter_mut().filter(|e| e.is_song(song)) {
                    *entry = PlaylistEntry::Placeholder(id.clone());
                    changed = true;
                }
                debug!(playlist = %self.name, id = %id, "Masked song kept as placeholder");
            } else {
                while let Some(pos) = self.index_of(song) {
                    self.entries.remove(pos);
                    changed = true;
                    if leave_dupes {
                        break;
                    }
                }
            }
        }

        if changed {
            self.finalize();
            if !leave_dupes || songs.iter().any(|s| !self.contains(s)) {
                self.emit_changed(songs, ChangeReason::RemoveSongs);
            }
        }
        changed
    }

    /// Uniformly permute the entries
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.entries.shuffle(rng);
        self.finalize();
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Run `f` with change notifications suppressed
    ///
    /// The previous state is restored when `f` returns or unwinds.
    pub fn inhibited<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let _guard = InhibitGuard::engage(&self.inhibit);
        f(self)
    }

    pub fn is_inhibited(&self) -> bool {
        self.inhibit.get()
    }

    pub(crate) fn inhibit_flag(&self) -> &Rc<Cell<bool>> {
        &self.inhibit
    }

    fn emit_changed(&self, songs: &[Track], reason: ChangeReason) {
        let Some(library) = &self.library else {
            return;
        };
        if self.inhibit.get() || songs.is_empty() {
            return;
        }
        debug!(
            playlist = %self.name,
            count = songs.len(),
            %reason,
            "Emitting changed"
        );
        library.on_changed(songs, reason);
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("Playlists must have a name"));
    }
    Ok(())
}

impl Aggregate for Playlist {
    fn members(&self) -> Cow<'_, [Track]> {
        Cow::Owned(self.songs())
    }

    fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// `~name` is the playlist name; everything else aggregates the tracks
    fn get(&self, key: &str, default: &TagValue, connector: &str) -> TagValue {
        if key == "~name" {
            return TagValue::Text(self.name.clone());
        }
        self.aggregator
            .get(&self.members(), key, default, connector)
    }
}

impl AsRef<Playlist> for Playlist {
    fn as_ref(&self) -> &Playlist {
        self
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a PlaylistEntry;
    type IntoIter = std::slice::Iter<'a, PlaylistEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Playlist {}

impl PartialOrd for Playlist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Playlist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for Playlist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.songs().len();
        let unit = if count == 1 { "song" } else { "songs" };
        write!(f, "\"{}\" ({} {})", self.name, count, unit)
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playlist")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entries", &self.entries)
            .finish()
    }
}
