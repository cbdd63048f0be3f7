use super::{ChangeReason, Library};
use crate::tags::{TagRecord, Track};
use crate::Result;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// File extension of record dumps read by [`MemoryLibrary::load_dumps`]
pub const DUMP_EXTENSION: &str = "dump";

/// One change notification received from a playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// `~filename` of each changed track, in notification order
    pub ids: Vec<String>,
    pub reason: ChangeReason,
}

/// In-memory track directory keyed by `~filename`
///
/// Tracks whose `~mountpoint` is masked move to a separate table: they are
/// no longer resolvable but still known, so playlists keep them as
/// placeholders.
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    tracks: RefCell<BTreeMap<String, Track>>,
    masked: RefCell<BTreeMap<String, Track>>,
    changes: RefCell<Vec<ChangeRecord>>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any track with the same `~filename`
    pub fn add(&self, record: TagRecord) -> Track {
        let track = Track::new(record);
        self.tracks.borrow_mut().insert(track.key(), track.clone());
        track
    }

    pub fn remove(&self, id: &str) -> Option<Track> {
        let removed = self.tracks.borrow_mut().remove(id);
        removed.or_else(|| self.masked.borrow_mut().remove(id))
    }

    /// Available tracks, ordered by `~filename`
    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.borrow().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.borrow().is_empty()
    }

    /// Make every track on `mountpoint` unavailable; returns how many moved
    pub fn mask(&self, mountpoint: impl AsRef<Path>) -> usize {
        let moved = move_matching(&self.tracks, &self.masked, mountpoint.as_ref());
        info!(mountpoint = %mountpoint.as_ref().display(), moved, "Masked mountpoint");
        moved
    }

    /// Make the tracks on `mountpoint` available again
    pub fn unmask(&self, mountpoint: impl AsRef<Path>) -> usize {
        let moved = move_matching(&self.masked, &self.tracks, mountpoint.as_ref());
        info!(mountpoint = %mountpoint.as_ref().display(), moved, "Unmasked mountpoint");
        moved
    }

    /// Notifications received so far, oldest first
    pub fn changes(&self) -> Vec<ChangeRecord> {
        self.changes.borrow().clone()
    }

    pub fn clear_changes(&self) {
        self.changes.borrow_mut().clear();
    }

    /// Add one record per `*.dump` file in `dir`
    ///
    /// Dumps without a `~filename` are skipped with a warning. Returns the
    /// number of records added.
    pub fn load_dumps(&self, dir: &Path) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == DUMP_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut added = 0;
        for path in paths {
            let text = std::fs::read_to_string(&path)?;
            let record = TagRecord::from_dump(&text);
            if record.filename().is_none() {
                warn!(path = %path.display(), "Dump has no ~filename, skipping");
                continue;
            }
            self.add(record);
            added += 1;
        }
        debug!(dir = %dir.display(), added, "Loaded record dumps");
        Ok(added)
    }
}

fn move_matching(
    from: &RefCell<BTreeMap<String, Track>>,
    to: &RefCell<BTreeMap<String, Track>>,
    mountpoint: &Path,
) -> usize {
    let mut from = from.borrow_mut();
    let ids: Vec<String> = from
        .iter()
        .filter(|(_, track)| track.borrow().mountpoint() == Some(mountpoint))
        .map(|(id, _)| id.clone())
        .collect();

    let mut to = to.borrow_mut();
    for id in &ids {
        if let Some(track) = from.remove(id) {
            to.insert(id.clone(), track);
        }
    }
    ids.len()
}

impl Library for MemoryLibrary {
    fn contains(&self, id: &str) -> bool {
        self.tracks.borrow().contains_key(id)
    }

    fn resolve(&self, id: &str) -> Option<Track> {
        self.tracks.borrow().get(id).cloned()
    }

    fn is_masked(&self, id: &str) -> bool {
        self.masked.borrow().contains_key(id)
    }

    fn on_changed(&self, songs: &[Track], reason: ChangeReason) {
        debug!(count = songs.len(), %reason, "Library received change");
        self.changes.borrow_mut().push(ChangeRecord {
            ids: songs.iter().map(Track::key).collect(),
            reason,
        });
    }
}
