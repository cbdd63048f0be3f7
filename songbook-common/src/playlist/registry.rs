use super::{unescape_name, FileBackedPlaylist, Library, Playlist};
use crate::tags::{TagValue, Track};
use crate::{Error, Result};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// The live playlists of one application
///
/// Playlists are registered when created or opened and unregistered when
/// deleted. The registry answers which playlists contain a track, the value
/// of a track's `~playlists`.
#[derive(Debug)]
pub struct PlaylistRegistry<P: AsRef<Playlist> = FileBackedPlaylist> {
    playlists: Vec<P>,
}

impl<P: AsRef<Playlist>> Default for PlaylistRegistry<P> {
    fn default() -> Self {
        Self {
            playlists: Vec::new(),
        }
    }
}

impl<P: AsRef<Playlist>> PlaylistRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `playlist`; returns a handle to it
    pub fn register(&mut self, playlist: P) -> &mut P {
        debug!(playlist = %playlist.as_ref().name(), "Registering playlist");
        self.playlists.push(playlist);
        let last = self.playlists.len() - 1;
        &mut self.playlists[last]
    }

    /// Stop tracking the playlist named `name`
    pub fn unregister(&mut self, name: &str) -> Option<P> {
        let pos = self.position(name)?;
        debug!(playlist = %name, "Unregistering playlist");
        Some(self.playlists.remove(pos))
    }

    pub fn get(&self, name: &str) -> Option<&P> {
        self.position(name).map(|i| &self.playlists[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut P> {
        self.position(name).map(move |i| &mut self.playlists[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.playlists
            .iter()
            .position(|p| p.as_ref().name() == name)
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Registered playlists sorted by name
    pub fn playlists(&self) -> Vec<&P> {
        let mut all: Vec<&P> = self.playlists.iter().collect();
        all.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        all
    }

    /// Playlists holding `song`, in registration order
    pub fn playlists_featuring(&self, song: &Track) -> Vec<&P> {
        self.playlists
            .iter()
            .filter(|p| p.as_ref().contains(song))
            .collect()
    }

    /// Newline-separated names of the playlists holding `song`, or `default`
    pub fn names_featuring(&self, song: &Track, default: &TagValue) -> TagValue {
        let names: Vec<&str> = self
            .playlists_featuring(song)
            .into_iter()
            .map(|p| p.as_ref().name())
            .collect();
        if names.is_empty() {
            default.clone()
        } else {
            TagValue::Text(names.join("\n"))
        }
    }
}

impl PlaylistRegistry<FileBackedPlaylist> {
    /// Open every playlist file in `dir`
    ///
    /// File names that do not unescape to a valid name are skipped, as are
    /// dot files and subdirectories.
    pub fn load_all(dir: &Path, library: Option<Rc<dyn Library>>) -> Result<Self> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                warn!(dir = %dir.display(), "Skipping playlist file with non-UTF-8 name");
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            match unescape_name(file_name) {
                Some(name) if !name.is_empty() => names.push(name),
                _ => warn!(file = %file_name, "Skipping playlist file with invalid name"),
            }
        }
        names.sort();

        let mut registry = Self::new();
        for name in names {
            let playlist = FileBackedPlaylist::open(dir, &name, library.clone())?;
            registry.register(playlist);
        }
        info!(dir = %dir.display(), count = registry.len(), "Loaded playlists");
        Ok(registry)
    }

    /// Create and register a new playlist named `name`
    pub fn create(
        &mut self,
        dir: &Path,
        name: &str,
        library: Option<Rc<dyn Library>>,
    ) -> Result<&mut FileBackedPlaylist> {
        let playlist = FileBackedPlaylist::create(dir, name, library)?;
        Ok(self.register(playlist))
    }

    /// Unregister the playlist `name` and delete its file
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let playlist = self
            .unregister(name)
            .ok_or_else(|| Error::validation(format!("No playlist named {}", name)))?;
        playlist.delete()
    }
}
