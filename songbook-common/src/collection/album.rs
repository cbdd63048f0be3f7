use super::{Aggregate, Aggregator};
use crate::human::{human_sort_key, SortChunk};
use crate::tags::{AlbumKey, Track};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// The tracks sharing one [`AlbumKey`]
///
/// Members are unique by identity; adding a track twice is a no-op.
pub struct Album {
    key: AlbumKey,
    sort: Vec<SortChunk>,
    songs: Vec<Track>,
    index: HashSet<Track>,
    aggregator: Aggregator,
}

impl Album {
    /// Empty album keyed like `song`; `song` itself is not added
    pub fn new(song: &Track) -> Self {
        let record = song.borrow();
        Self {
            key: record.album_key(),
            sort: human_sort_key(&record.call("albumsort").to_text()),
            songs: Vec::new(),
            index: HashSet::new(),
            aggregator: Aggregator::new(),
        }
    }

    pub fn key(&self) -> &AlbumKey {
        &self.key
    }

    /// Album name sort key
    pub fn sort(&self) -> &[SortChunk] {
        &self.sort
    }

    pub fn str_key(&self) -> String {
        format!("{:?}", self.key)
    }

    /// Add `song`; false if it was already a member
    pub fn add(&mut self, song: Track) -> bool {
        if !self.index.insert(song.clone()) {
            return false;
        }
        self.songs.push(song);
        self.aggregator.finalize();
        true
    }

    /// Remove `song`; false if it was not a member
    pub fn remove(&mut self, song: &Track) -> bool {
        if !self.index.remove(song) {
            return false;
        }
        self.songs.retain(|s| s != song);
        self.aggregator.finalize();
        true
    }

    pub fn contains(&self, song: &Track) -> bool {
        self.index.contains(song)
    }

    pub fn songs(&self) -> &[Track] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Album name
    pub fn title(&self) -> String {
        self.call("album").to_string()
    }

    pub fn date(&self) -> String {
        self.call("date").to_string()
    }

    /// Sort key of the most relevant contributor
    pub fn peoplesort(&self) -> Vec<SortChunk> {
        first_line_key(&self.call("~peoplesort").to_text())
    }

    /// Sort key of the most common genre
    pub fn genre(&self) -> Vec<SortChunk> {
        first_line_key(&self.call("genre").to_text())
    }

}

fn first_line_key(value: &str) -> Vec<SortChunk> {
    human_sort_key(value.split('\n').next().unwrap_or(""))
}

impl Aggregate for Album {
    fn members(&self) -> Cow<'_, [Track]> {
        Cow::Borrowed(&self.songs)
    }

    fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}

impl fmt::Debug for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Album({:?})", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{TagRecord, TagValue};

    fn track(pairs: &[(&str, &str)]) -> Track {
        Track::new(TagRecord::from_pairs(pairs.iter().copied()).unwrap())
    }

    #[test]
    fn test_members_are_unique() {
        let song = track(&[("album", "Hits"), ("artist", "Alice")]);
        let mut album = Album::new(&song);
        assert!(album.is_empty());
        assert!(album.add(song.clone()));
        assert!(!album.add(song.clone()));
        assert_eq!(album.len(), 1);
        assert!(album.contains(&song));
    }

    #[test]
    fn test_accessors_follow_members() {
        let first = track(&[
            ("album", "Hits"),
            ("date", "2001"),
            ("genre", "Rock"),
            ("artist", "Zed"),
        ]);
        let second = track(&[("album", "Hits"), ("genre", "Blues\nRock"), ("artist", "Amy")]);
        let mut album = Album::new(&first);
        album.add(first.clone());

        assert_eq!(album.title(), "Hits");
        assert_eq!(album.date(), "2001");
        assert_eq!(album.genre(), human_sort_key("Rock"));
        assert_eq!(album.peoplesort(), human_sort_key("Zed"));

        album.add(second.clone());
        album.add(track(&[("album", "Hits"), ("artist", "Amy")]));
        assert_eq!(album.peoplesort(), human_sort_key("Amy"));
        assert_eq!(album.call("~#tracks"), TagValue::Int(3));

        assert!(album.remove(&second));
        assert!(!album.remove(&second));
        assert_eq!(album.call("~#tracks"), TagValue::Int(2));
    }

    #[test]
    fn test_sort_keys_follow_member_edits() {
        let song = track(&[("album", "Hits"), ("genre", "Rock"), ("artist", "Zed")]);
        let mut album = Album::new(&song);
        album.add(song.clone());
        assert_eq!(album.genre(), human_sort_key("Rock"));

        song.borrow_mut().set("genre", "Ambient").unwrap();
        song.borrow_mut().set("artist", "Amy").unwrap();
        assert_eq!(album.genre(), human_sort_key("Ambient"));
        assert_eq!(album.peoplesort(), human_sort_key("Amy"));
    }

    #[test]
    fn test_key_matches_members() {
        let song = track(&[("album", "Hits"), ("albumartist", "Various")]);
        let album = Album::new(&song);
        assert_eq!(album.key(), &song.borrow().album_key());
        assert_eq!(album.sort(), human_sort_key("hits").as_slice());
    }
}
