//! Subcommand implementations
//!
//! Every command returns a [`Report`]; `main` decides whether it is printed
//! as text or JSON.

use anyhow::{Context, Result};
use serde::Serialize;
use songbook_common::collection::Aggregate;
use songbook_common::playlist::{Library, MemoryLibrary, PlaylistRegistry};
use songbook_common::{FileBackedPlaylist, TagRecord, TagValue, Track};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Keys printed by `show` when none are requested
pub const DEFAULT_SHOW_KEYS: &[&str] = &["~people", "album", "~length", "~tracks", "~rating"];

/// One resolved key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub name: String,
    pub songs: usize,
}

impl PlaylistSummary {
    fn of(playlist: &FileBackedPlaylist) -> Self {
        Self {
            name: playlist.name().to_string(),
            songs: playlist.len(),
        }
    }
}

/// Result of a command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Values(Vec<KeyValue>),
    Playlists(Vec<PlaylistSummary>),
    Playlist(PlaylistSummary),
    Deleted { deleted: String },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Values(values) => {
                for kv in values {
                    writeln!(f, "{}: {}", kv.key, kv.value)?;
                }
                Ok(())
            }
            Report::Playlists(playlists) => {
                for p in playlists {
                    writeln!(f, "{}\t{}", p.name, p.songs)?;
                }
                Ok(())
            }
            Report::Playlist(p) => writeln!(f, "{}\t{}", p.name, p.songs),
            Report::Deleted { deleted } => writeln!(f, "Deleted {}", deleted),
        }
    }
}

/// Playlist directory plus the tracks its playlists may refer to
pub struct Workspace {
    playlist_dir: PathBuf,
    library: Option<Rc<MemoryLibrary>>,
}

impl Workspace {
    /// Build a workspace, loading record dumps from `library_dir` if given
    pub fn new(playlist_dir: PathBuf, library_dir: Option<&Path>) -> Result<Self> {
        let library = match library_dir {
            Some(dir) => {
                let library = MemoryLibrary::new();
                let count = library.load_dumps(dir).with_context(|| {
                    format!("Failed to load record dumps from {}", dir.display())
                })?;
                info!(dir = %dir.display(), count, "Loaded library");
                Some(Rc::new(library))
            }
            None => None,
        };
        Ok(Self {
            playlist_dir,
            library,
        })
    }

    /// Playlist lines only count once resolved, so every command that reads
    /// or rewrites entries needs the library
    fn library(&self) -> Result<&Rc<MemoryLibrary>> {
        self.library
            .as_ref()
            .context("--library is required for this command")
    }

    fn shared(&self) -> Option<Rc<dyn Library>> {
        self.library.clone().map(|l| l as Rc<dyn Library>)
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.playlist_dir).with_context(|| {
            format!(
                "Failed to create playlist directory {}",
                self.playlist_dir.display()
            )
        })
    }

    fn registry(&self) -> Result<PlaylistRegistry> {
        self.ensure_dir()?;
        PlaylistRegistry::<FileBackedPlaylist>::load_all(&self.playlist_dir, self.shared())
            .with_context(|| {
                format!(
                    "Failed to load playlists from {}",
                    self.playlist_dir.display()
                )
            })
    }
}

fn find<'a>(registry: &'a PlaylistRegistry, name: &str) -> Result<&'a FileBackedPlaylist> {
    registry
        .get(name)
        .with_context(|| format!("No playlist named {}", name))
}

fn find_mut<'a>(
    registry: &'a mut PlaylistRegistry,
    name: &str,
) -> Result<&'a mut FileBackedPlaylist> {
    registry
        .get_mut(name)
        .with_context(|| format!("No playlist named {}", name))
}

/// Library tracks for `paths`, in order; unknown paths are skipped
fn resolve_tracks(library: &MemoryLibrary, paths: &[String]) -> Vec<Track> {
    paths
        .iter()
        .filter_map(|path| {
            let track = library.resolve(path);
            if track.is_none() {
                if library.is_masked(path) {
                    warn!(path = %path, "Track is on a masked mountpoint, skipping");
                } else {
                    warn!(path = %path, "Track not in library, skipping");
                }
            }
            track
        })
        .collect()
}

/// `resolve`: look up `keys` on the record stored in `dump`
pub fn resolve(dump: &Path, keys: &[String]) -> Result<Report> {
    let text = std::fs::read_to_string(dump)
        .with_context(|| format!("Failed to read {}", dump.display()))?;
    let record = TagRecord::from_dump(&text);
    debug!(path = %dump.display(), tags = record.len(), "Parsed record dump");

    Ok(Report::Values(
        keys.iter()
            .map(|key| KeyValue {
                key: key.clone(),
                value: record.call(key),
            })
            .collect(),
    ))
}

pub fn list(workspace: &Workspace) -> Result<Report> {
    workspace.library()?;
    let registry = workspace.registry()?;
    Ok(Report::Playlists(
        registry
            .playlists()
            .into_iter()
            .map(PlaylistSummary::of)
            .collect(),
    ))
}

/// `show`: aggregate values of one playlist
pub fn show(workspace: &Workspace, name: &str, keys: &[String]) -> Result<Report> {
    workspace.library()?;
    let registry = workspace.registry()?;
    let playlist = find(&registry, name)?;

    let keys: Vec<String> = if keys.is_empty() {
        DEFAULT_SHOW_KEYS.iter().map(|k| k.to_string()).collect()
    } else {
        keys.to_vec()
    };
    Ok(Report::Values(
        keys.into_iter()
            .map(|key| {
                let value = playlist.call(&key);
                KeyValue { key, value }
            })
            .collect(),
    ))
}

pub fn create(workspace: &Workspace, name: &str, paths: &[String]) -> Result<Report> {
    let library = if paths.is_empty() {
        None
    } else {
        Some(workspace.library()?)
    };
    workspace.ensure_dir()?;
    let mut playlist = FileBackedPlaylist::create(&workspace.playlist_dir, name, workspace.shared())
        .with_context(|| format!("Failed to create playlist {}", name))?;

    if let Some(library) = library {
        playlist.extend(resolve_tracks(library, paths))?;
    }
    info!(playlist = %name, songs = playlist.len(), "Created playlist");
    Ok(Report::Playlist(PlaylistSummary::of(&playlist)))
}

pub fn append(workspace: &Workspace, name: &str, paths: &[String]) -> Result<Report> {
    let library = workspace.library()?;
    let mut registry = workspace.registry()?;
    let playlist = find_mut(&mut registry, name)?;

    let tracks = resolve_tracks(library, paths);
    debug!(playlist = %name, count = tracks.len(), "Appending tracks");
    playlist.extend(tracks)?;
    Ok(Report::Playlist(PlaylistSummary::of(playlist)))
}

pub fn rename(workspace: &Workspace, old: &str, new: &str) -> Result<Report> {
    workspace.library()?;
    let mut registry = workspace.registry()?;
    let playlist = find_mut(&mut registry, old)?;

    playlist
        .rename(new)
        .with_context(|| format!("Failed to rename {} to {}", old, new))?;
    info!(from = %old, to = %new, "Renamed playlist");
    Ok(Report::Playlist(PlaylistSummary::of(playlist)))
}

pub fn shuffle(workspace: &Workspace, name: &str) -> Result<Report> {
    workspace.library()?;
    let mut registry = workspace.registry()?;
    let playlist = find_mut(&mut registry, name)?;

    playlist.shuffle()?;
    Ok(Report::Playlist(PlaylistSummary::of(playlist)))
}

pub fn delete(workspace: &Workspace, name: &str) -> Result<Report> {
    let mut registry = workspace.registry()?;
    registry
        .delete(name)
        .with_context(|| format!("Failed to delete playlist {}", name))?;
    info!(playlist = %name, "Deleted playlist");
    Ok(Report::Deleted {
        deleted: name.to_string(),
    })
}
