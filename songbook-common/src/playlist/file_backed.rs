//! Playlists persisted as one file each
//!
//! # File format
//!
//! UTF-8 text, one entry per line: the `~filename` of a track or the
//! identifier of a placeholder. The file name is the percent-escaped
//! playlist name. Every mutation rewrites the whole file atomically (temp
//! file in the same directory, then rename).

use super::{Library, Playlist, PlaylistEntry};
use crate::collection::{Aggregate, Aggregator};
use crate::tags::{TagValue, Track};
use crate::{Error, Result};
use std::borrow::Cow;
use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Base name used when no name is suggested
pub const DEFAULT_BASE_NAME: &str = "New Playlist";

/// Highest numeric suffix tried by [`FileBackedPlaylist::new`]
const MAX_NAME_SUFFIX: usize = 999;

/// Filesystem-safe file name for a playlist name
pub fn escape_name(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Playlist name for an escaped file name; `None` if it does not decode
pub fn unescape_name(file_name: &str) -> Option<String> {
    urlencoding::decode(file_name).ok().map(Cow::into_owned)
}

/// A [`Playlist`] stored in a directory
///
/// Read access goes through `Deref<Target = Playlist>`; every mutating
/// method rewrites the backing file before returning.
pub struct FileBackedPlaylist {
    playlist: Playlist,
    dir: PathBuf,
    last_path: PathBuf,
}

impl FileBackedPlaylist {
    /// Open the playlist `name` in `dir`, creating an empty file if needed
    ///
    /// Lines that are not UTF-8 are skipped. Lines naming a track in the
    /// library become tracks, masked ones become placeholders, the rest are
    /// dropped.
    pub fn open(
        dir: impl Into<PathBuf>,
        name: &str,
        library: Option<Rc<dyn Library>>,
    ) -> Result<Self> {
        let dir = dir.into();
        let playlist = Playlist::new(name, library)?;
        let path = dir.join(escape_name(name));
        let mut this = Self {
            playlist,
            dir,
            last_path: path,
        };
        this.populate()?;
        Ok(this)
    }

    /// Create a new playlist `name` in `dir`
    ///
    /// Fails with [`Error::Validation`] if the name is empty or a playlist
    /// file of that name already exists.
    pub fn create(
        dir: impl Into<PathBuf>,
        name: &str,
        library: Option<Rc<dyn Library>>,
    ) -> Result<Self> {
        let dir = dir.into();
        validated_name(&dir, name)?;
        Self::open(dir, name, library)
    }

    /// Create a playlist under the first free name among `base`,
    /// `base 1`, ... `base 999`
    pub fn new(
        dir: impl Into<PathBuf>,
        base: &str,
        library: Option<Rc<dyn Library>>,
    ) -> Result<Self> {
        let dir = dir.into();
        if dir.as_os_str().is_empty() || !dir.is_dir() {
            return Err(Error::validation(format!(
                "Invalid playlist directory {:?}",
                dir
            )));
        }

        for i in 0..=MAX_NAME_SUFFIX {
            let name = if i == 0 {
                base.to_string()
            } else {
                format!("{} {}", base, i)
            };
            match Self::create(dir.clone(), &name, library.clone()) {
                Ok(playlist) => return Ok(playlist),
                Err(Error::Validation(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::validation(format!(
            "Couldn't create playlist of name '{}'",
            base
        )))
    }

    /// New playlist named after `songs` and holding them
    pub fn from_songs(
        dir: impl Into<PathBuf>,
        songs: &[Track],
        library: Option<Rc<dyn Library>>,
    ) -> Result<Self> {
        let name = Playlist::suggested_name_for(songs);
        let mut playlist = Self::new(dir, &name, library)?;
        playlist.extend(songs.iter().cloned())?;
        Ok(playlist)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Backing file for the current name
    pub fn filename(&self) -> PathBuf {
        self.dir.join(escape_name(self.playlist.name()))
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    fn populate(&mut self) -> Result<()> {
        let path = self.filename();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(
                    playlist = %self.playlist.name(),
                    error = %e,
                    "Playlist not found, creating new"
                );
                return self.write();
            }
        };

        let library = self.playlist.library().cloned();
        let mut kept = 0usize;
        let mut dropped = 0usize;
        for raw in bytes.split(|b| *b == b'\n') {
            let Ok(line) = std::str::from_utf8(raw) else {
                debug!(playlist = %self.playlist.name(), "Skipping undecodable line");
                continue;
            };
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let entry = library.as_ref().and_then(|lib| {
                if let Some(track) = lib.resolve(line) {
                    Some(PlaylistEntry::Song(track))
                } else if lib.is_masked(line) {
                    Some(PlaylistEntry::Placeholder(line.to_string()))
                } else {
                    None
                }
            });
            match entry {
                Some(entry) => {
                    self.playlist.push_entry(entry);
                    kept += 1;
                }
                None => dropped += 1,
            }
        }
        debug!(playlist = %self.playlist.name(), kept, dropped, "Loaded playlist");
        Ok(())
    }

    /// Rewrite the backing file; removes the file of a previous name
    pub fn write(&mut self) -> Result<()> {
        let path = self.filename();
        let mut contents = String::new();
        for entry in self.playlist.iter() {
            contents.push_str(&entry.key());
            contents.push('\n');
        }

        let mut temp = temp_file_in(&self.dir)?;
        temp.write_all(contents.as_bytes())?;
        temp.persist(&path).map_err(|e| e.error)?;

        if self.last_path != path {
            delete_file(&self.last_path);
            self.last_path = path;
        }
        Ok(())
    }

    /// Rename and rewrite; the old file is removed only after the new one
    /// is written
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        if new_name == self.playlist.name() {
            return Ok(());
        }
        validated_name(&self.dir, new_name)?;
        info!(from = %self.playlist.name(), to = %new_name, "Renaming playlist");
        let old_name = self.playlist.name().to_string();
        self.playlist.set_name(new_name.to_string());
        if let Err(e) = self.write() {
            warn!(playlist = %old_name, error = %e, "Rename failed, keeping old name");
            self.playlist.set_name(old_name);
            return Err(e);
        }
        Ok(())
    }

    /// Clear the playlist and remove its file; a missing file is fine
    pub fn delete(mut self) -> Result<()> {
        self.playlist.clear();
        let path = self.filename();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(playlist = %self.playlist.name(), "Deleted playlist");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ========================================================================
    // Persisted mutations
    // ========================================================================

    pub fn append(&mut self, song: Track) -> Result<()> {
        self.playlist.append(song);
        self.write()
    }

    pub fn extend(&mut self, songs: impl IntoIterator<Item = Track>) -> Result<()> {
        self.playlist.extend(songs);
        self.write()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.playlist.clear();
        self.write()
    }

    pub fn set(&mut self, index: usize, entry: PlaylistEntry) -> Result<PlaylistEntry> {
        let old = self.playlist.set(index, entry)?;
        self.write()?;
        Ok(old)
    }

    pub fn remove_songs(&mut self, songs: &[Track], leave_dupes: bool) -> Result<bool> {
        let changed = self.playlist.remove_songs(songs, leave_dupes);
        if changed {
            self.write()?;
        }
        Ok(changed)
    }

    pub fn add_songs<S: AsRef<str>>(&mut self, ids: &[S], library: &dyn Library) -> Result<bool> {
        let changed = self.playlist.add_songs(ids, library);
        if changed {
            self.write()?;
        }
        Ok(changed)
    }

    pub fn shuffle(&mut self) -> Result<()> {
        self.playlist.shuffle();
        self.write()
    }

    /// Run `f` with change notifications suppressed
    pub fn inhibited<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let _guard = super::InhibitGuard::engage(self.playlist.inhibit_flag());
        f(self)
    }
}

/// Reject empty names and names whose file already exists in `dir`
fn validated_name(dir: &Path, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("Playlists must have a name"));
    }
    if dir.join(escape_name(name)).exists() {
        return Err(Error::validation(format!(
            "A playlist named {} already exists.",
            name
        )));
    }
    Ok(())
}

/// Temp file for an atomic rewrite, created with the mode a plain
/// `fs::write` would give (0666 minus umask) rather than 0600
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(dir)
}

fn delete_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed stale playlist file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Cannot remove stale playlist file"),
    }
}

impl Deref for FileBackedPlaylist {
    type Target = Playlist;

    fn deref(&self) -> &Playlist {
        &self.playlist
    }
}

impl AsRef<Playlist> for FileBackedPlaylist {
    fn as_ref(&self) -> &Playlist {
        &self.playlist
    }
}

impl Aggregate for FileBackedPlaylist {
    fn members(&self) -> Cow<'_, [Track]> {
        self.playlist.members()
    }

    fn aggregator(&self) -> &Aggregator {
        self.playlist.aggregator()
    }

    fn get(&self, key: &str, default: &TagValue, connector: &str) -> TagValue {
        self.playlist.get(key, default, connector)
    }
}

impl std::fmt::Debug for FileBackedPlaylist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackedPlaylist")
            .field("playlist", &self.playlist)
            .field("dir", &self.dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::MemoryLibrary;
    use crate::tags::TagRecord;
    use tempfile::TempDir;

    fn library_with(paths: &[&str]) -> (Rc<MemoryLibrary>, Vec<Track>) {
        let library = Rc::new(MemoryLibrary::new());
        let tracks = paths
            .iter()
            .map(|p| {
                library.add(
                    TagRecord::from_pairs([
                        ("~filename", *p),
                        ("~mountpoint", "/media/usb"),
                        ("title", *p),
                    ])
                    .unwrap(),
                )
            })
            .collect();
        (library, tracks)
    }

    fn shared(library: &Rc<MemoryLibrary>) -> Option<Rc<dyn Library>> {
        Some(library.clone() as Rc<dyn Library>)
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_escape_round_trip() {
        assert_eq!(escape_name("Road Trip"), "Road%20Trip");
        assert_eq!(escape_name("a/b"), "a%2Fb");
        assert_eq!(unescape_name("Road%20Trip").as_deref(), Some("Road Trip"));
    }

    #[test]
    fn test_open_missing_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let p = FileBackedPlaylist::open(dir.path(), "Fresh", None).unwrap();
        assert!(p.is_empty());
        assert_eq!(read(&p.filename()), "");
    }

    #[test]
    fn test_mutations_rewrite_file() {
        let dir = TempDir::new().unwrap();
        let (library, tracks) = library_with(&["/media/usb/a.ogg", "/media/usb/b.ogg"]);
        let mut p = FileBackedPlaylist::create(dir.path(), "Mix", shared(&library)).unwrap();

        p.append(tracks[0].clone()).unwrap();
        p.extend([tracks[1].clone(), tracks[0].clone()]).unwrap();
        assert_eq!(
            read(&p.filename()),
            "/media/usb/a.ogg\n/media/usb/b.ogg\n/media/usb/a.ogg\n"
        );

        p.remove_songs(&[tracks[0].clone()], true).unwrap();
        assert_eq!(read(&p.filename()), "/media/usb/b.ogg\n/media/usb/a.ogg\n");

        p.clear().unwrap();
        assert_eq!(read(&p.filename()), "");
    }

    #[test]
    fn test_populate_resolves_masks_and_drops() {
        let dir = TempDir::new().unwrap();
        let (library, tracks) = library_with(&["/media/usb/a.ogg"]);
        let live = library.add(TagRecord::from_pairs([("~filename", "/home/b.ogg")]).unwrap());
        library.mask("/media/usb");

        let mut contents = b"/home/b.ogg\n/media/usb/a.ogg\n/gone.ogg\n".to_vec();
        contents.extend_from_slice(b"\xff\xfe\n");
        std::fs::write(dir.path().join("Mix"), contents).unwrap();

        let p = FileBackedPlaylist::open(dir.path(), "Mix", shared(&library)).unwrap();
        assert_eq!(
            p.entries(),
            &[
                PlaylistEntry::Song(live),
                PlaylistEntry::Placeholder("/media/usb/a.ogg".to_string())
            ]
        );
        assert!(!p.contains(&tracks[0]));
    }

    #[test]
    fn test_create_rejects_existing_name() {
        let dir = TempDir::new().unwrap();
        FileBackedPlaylist::create(dir.path(), "Mix", None).unwrap();
        let err = FileBackedPlaylist::create(dir.path(), "Mix", None).unwrap_err();
        assert!(err.to_string().contains("A playlist named Mix already exists."));
        assert!(matches!(
            FileBackedPlaylist::create(dir.path(), "", None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_new_picks_first_free_name() {
        let dir = TempDir::new().unwrap();
        let first = FileBackedPlaylist::new(dir.path(), DEFAULT_BASE_NAME, None).unwrap();
        let second = FileBackedPlaylist::new(dir.path(), DEFAULT_BASE_NAME, None).unwrap();
        let third = FileBackedPlaylist::new(dir.path(), DEFAULT_BASE_NAME, None).unwrap();
        assert_eq!(first.name(), "New Playlist");
        assert_eq!(second.name(), "New Playlist 1");
        assert_eq!(third.name(), "New Playlist 2");
    }

    #[test]
    fn test_new_rejects_invalid_directory() {
        assert!(matches!(
            FileBackedPlaylist::new("", "x", None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            FileBackedPlaylist::new("/nonexistent/songbook/playlists", "x", None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_from_songs() {
        let dir = TempDir::new().unwrap();
        let (library, tracks) = library_with(&["/media/usb/a.ogg", "/media/usb/b.ogg"]);
        let p = FileBackedPlaylist::from_songs(dir.path(), &tracks, shared(&library)).unwrap();
        assert_eq!(p.name(), "/media/usb/a.ogg and 1 more");
        assert_eq!(p.len(), 2);
        assert!(p.filename().exists());
    }

    #[test]
    fn test_rename_moves_file() {
        let dir = TempDir::new().unwrap();
        let mut p = FileBackedPlaylist::create(dir.path(), "Old", None).unwrap();
        let old_path = p.filename();

        p.rename("New Name").unwrap();
        assert!(!old_path.exists());
        assert!(dir.path().join("New%20Name").exists());
        assert_eq!(p.name(), "New Name");

        FileBackedPlaylist::create(dir.path(), "Taken", None).unwrap();
        assert!(matches!(p.rename("Taken"), Err(Error::Validation(_))));
        assert_eq!(p.name(), "New Name");
    }

    #[test]
    fn test_failed_rename_keeps_old_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("lists");
        std::fs::create_dir(&root).unwrap();
        let mut p = FileBackedPlaylist::create(&root, "Old", None).unwrap();

        std::fs::remove_dir_all(&root).unwrap();
        assert!(matches!(p.rename("New"), Err(Error::Io(_))));
        assert_eq!(p.name(), "Old");
        assert_eq!(p.filename(), root.join("Old"));
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_has_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let p = FileBackedPlaylist::create(dir.path(), "Shared", None).unwrap();
        let reference = dir.path().join("reference");
        std::fs::write(&reference, "").unwrap();

        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(p.filename().as_path()), mode(reference.as_path()));
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let p = FileBackedPlaylist::create(dir.path(), "Doomed", None).unwrap();
        let path = p.filename();
        p.delete().unwrap();
        assert!(!path.exists());

        let p = FileBackedPlaylist::create(dir.path(), "Twice", None).unwrap();
        std::fs::remove_file(p.filename()).unwrap();
        p.delete().unwrap();
    }

    #[test]
    fn test_name_accessible_as_aggregate() {
        let dir = TempDir::new().unwrap();
        let p = FileBackedPlaylist::create(dir.path(), "Road Trip", None).unwrap();
        assert_eq!(p.call("~name"), TagValue::from("Road Trip"));
    }
}
