//! Aggregation of tag values over a set of tracks
//!
//! An [`Aggregator`] answers the same keys a single record does, but for a
//! whole group: numeric keys are reduced (`~#length` sums, `~#rating` takes
//! a Bayesian average), `~people` ranks contributors across tracks, and any
//! other key lists the distinct values, most common first.
//!
//! Results are kept in a small [`AggregateCache`]. Every change to the member
//! set must call [`Aggregator::finalize`] before the next lookup; the group
//! types in this crate do that themselves.

mod album;
mod cache;

pub use album::Album;
pub use cache::{AggregateCache, Lookup, CACHE_SIZE};

use crate::config::settings;
use crate::human::{format_rating, format_size, format_time_display, format_time_long};
use crate::tags::{
    is_tied, is_zero_default, sort_tag_for, tagsplit, TagKey, TagValue, Track, DEFAULT_CONNECTOR,
};
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// People keys in aggregate priority order; album artists outrank artists
pub const AGGREGATE_PEOPLE: [&str; 9] = [
    "albumartist",
    "artist",
    "author",
    "composer",
    "~performers",
    "originalartist",
    "lyricist",
    "arranger",
    "conductor",
];

/// Maximum number of names in an aggregate `~people`
pub const PEOPLE_LIMIT: usize = 100;

/// Base of the per-role weight used to rank people
const PEOPLE_SCORE_BASE: i128 = 100;

// ============================================================================
// Numeric reductions
// ============================================================================

/// Reduction applied to the per-track values of a numeric key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Min,
    Max,
    Avg,
    /// Bayesian average against the configured default rating
    Bav,
}

impl Reduction {
    /// Parse a `:func` suffix
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(Reduction::Sum),
            "min" => Some(Reduction::Min),
            "max" => Some(Reduction::Max),
            "avg" => Some(Reduction::Avg),
            "bav" => Some(Reduction::Bav),
            _ => None,
        }
    }

    /// Reduction used when a numeric key has no `:func` suffix
    pub fn default_for(name: &str) -> Self {
        match name {
            "length" | "length:real" | "playcount" | "skipcount" | "filesize" => Reduction::Sum,
            "added" | "lastplayed" | "laststarted" | "mtime" => Reduction::Max,
            "year" | "originalyear" => Reduction::Min,
            "rating" => Reduction::Bav,
            _ => Reduction::Avg,
        }
    }

    /// Reduce `values`; `None` if there are none
    ///
    /// Sums of integers stay integers. Min and max return the original value.
    pub fn apply(self, values: &[TagValue]) -> Option<TagValue> {
        if values.is_empty() {
            return None;
        }
        let nums: Vec<f64> = values.iter().filter_map(TagValue::as_f64).collect();
        let total: f64 = nums.iter().sum();
        let count = nums.len() as f64;

        let value = match self {
            Reduction::Sum => {
                if values.iter().all(|v| matches!(v, TagValue::Int(_))) {
                    let sum = values
                        .iter()
                        .filter_map(TagValue::as_i64)
                        .fold(0i64, i64::saturating_add);
                    TagValue::Int(sum)
                } else {
                    TagValue::Float(total)
                }
            }
            Reduction::Min => extreme(values, |a, b| a < b)?,
            Reduction::Max => extreme(values, |a, b| a > b)?,
            Reduction::Avg => TagValue::Float(total / count),
            Reduction::Bav => {
                let current = settings();
                let prior_mean = current.default_rating;
                let prior_weight = current.bayesian_rating_factor;
                TagValue::Float((prior_mean * prior_weight + total) / (prior_weight + count))
            }
        };
        Some(value)
    }
}

/// First value that no later value beats
fn extreme(values: &[TagValue], beats: impl Fn(f64, f64) -> bool) -> Option<TagValue> {
    let mut best: Option<(&TagValue, f64)> = None;
    for value in values {
        let Some(n) = value.as_f64() else { continue };
        match best {
            Some((_, b)) if !beats(n, b) => {}
            _ => best = Some((value, n)),
        }
    }
    best.map(|(v, _)| v.clone())
}

// ============================================================================
// Aggregator
// ============================================================================

/// Cached aggregate lookups over a member list supplied per call
///
/// Membership changes must be reported through [`Aggregator::finalize`].
/// Edits to the members themselves are detected on the next lookup through
/// their [`Track::generation`].
#[derive(Debug, Default)]
pub struct Aggregator {
    cache: RefCell<AggregateCache>,
    /// Newest member generation the cached values have seen
    generation: Cell<u64>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all cached values; call after members are added or removed
    pub fn finalize(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Aggregate `key` over `songs`
    ///
    /// **Algorithm:**
    /// 1. No songs: `default`
    /// 2. Tied key: each part is aggregated on its own, floats are rendered
    ///    with two decimals, empty parts dropped, the rest joined with
    ///    `connector`. A non-text `default` is returned as-is.
    /// 3. Anything else: the cached value, computing it on a miss
    pub fn get(
        &self,
        songs: &[Track],
        key: &str,
        default: &TagValue,
        connector: &str,
    ) -> TagValue {
        if songs.is_empty() {
            return default.clone();
        }
        self.revalidate(songs);
        if !is_tied(key) {
            return self.cached(songs, key).unwrap_or_else(|| default.clone());
        }
        if !matches!(default, TagValue::Text(_)) {
            return default.clone();
        }

        let parts: Vec<String> = tagsplit(key)
            .iter()
            .map(|part| match self.cached(songs, part) {
                None => default.to_text().into_owned(),
                Some(TagValue::Float(f)) => format!("{:.2}", f),
                Some(value) => value.to_text().into_owned(),
            })
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            default.clone()
        } else {
            TagValue::Text(parts.join(connector))
        }
    }

    /// Drop cached values if a member was edited since they were computed
    fn revalidate(&self, songs: &[Track]) {
        let newest = songs.iter().map(Track::generation).max().unwrap_or(0);
        if newest > self.generation.get() {
            trace!(generation = newest, "Member edited, clearing aggregate cache");
            self.cache.borrow_mut().clear();
            self.generation.set(newest);
        }
    }

    fn cached(&self, songs: &[Track], key: &str) -> Option<TagValue> {
        let lookup = self.cache.borrow_mut().lookup(key);
        match lookup {
            Lookup::Hit(value) => Some(value),
            Lookup::Absent => None,
            Lookup::Miss => {
                let value = self.value(songs, key);
                trace!(key, found = value.is_some(), "Computed aggregate value");
                self.cache.borrow_mut().store(key, value.clone());
                value
            }
        }
    }

    /// Uncached aggregate of one (non-tied) key
    fn value(&self, songs: &[Track], key: &str) -> Option<TagValue> {
        match TagKey::parse(key) {
            TagKey::Numeric { name, func } => numeric_value(songs, name, func),
            TagKey::Internal(body) => {
                let numkey = body.split(':').next().unwrap_or(body);
                match (body, numkey) {
                    ("people", _) | ("peoplesort", _) => self.people(songs, body),
                    (_, "length") => self
                        .value(songs, &format!("~#{}", body))
                        .and_then(|v| v.as_f64())
                        .map(|length| TagValue::Text(format_time_display(length))),
                    (_, "long-length") => self
                        .value(songs, &format!("~#{}", &body[5..]))
                        .and_then(|v| v.as_i64())
                        .map(|length| TagValue::Text(format_time_long(length))),
                    (_, "tracks") => self
                        .value(songs, &format!("~#{}", body))
                        .and_then(|v| v.as_i64())
                        .map(|n| TagValue::Text(plural(n, "track", "tracks"))),
                    (_, "discs") => self
                        .value(songs, &format!("~#{}", body))
                        .and_then(|v| v.as_i64())
                        .filter(|n| *n > 1)
                        .map(|n| TagValue::Text(plural(n, "disc", "discs"))),
                    (_, "rating") => self
                        .value(songs, &format!("~#{}", body))
                        .and_then(|v| v.as_f64())
                        .map(|r| TagValue::Text(format_rating(r, settings().rating_stars))),
                    (_, "filesize") => self
                        .value(songs, &format!("~#{}", body))
                        .and_then(|v| v.as_i64())
                        .map(|size| TagValue::Text(format_size(size))),
                    _ => by_frequency(songs, key),
                }
            }
            TagKey::Real(_) | TagKey::Tied(_) => by_frequency(songs, key),
        }
    }

    /// Rank contributors; caches the companion key (`~peoplesort` for
    /// `~people` and the reverse) on the way
    fn people(&self, songs: &[Track], body: &str) -> Option<TagValue> {
        let mut people = Ranking::default();
        let mut people_sort = Ranking::default();

        for song in songs {
            for (weight, key) in AGGREGATE_PEOPLE.iter().rev().enumerate() {
                let score = PEOPLE_SCORE_BASE.pow(weight as u32);
                let persons = song.list(key);
                for person in &persons {
                    people.credit(person, score);
                }
                let sorted = sort_tag_for(key)
                    .map(|sort_key| song.list(sort_key))
                    .filter(|names| !names.is_empty())
                    .unwrap_or(persons);
                for person in &sorted {
                    people_sort.credit(person, score);
                }
            }
        }

        let people = people.into_value();
        let people_sort = people_sort.into_value();
        let (wanted, companion_key, companion) = if body == "people" {
            (people, "~peoplesort", people_sort)
        } else {
            (people_sort, "~people", people)
        };
        self.cache.borrow_mut().store(companion_key, companion);
        wanted
    }
}

/// Reduce a numeric key over `songs`
fn numeric_value(songs: &[Track], name: &str, func: Option<&str>) -> Option<TagValue> {
    let reduction = match func {
        Some(func) => Reduction::from_name(func),
        None => match name {
            "tracks" => return Some(TagValue::Int(songs.len() as i64)),
            "discs" => {
                let first_disc = TagValue::Int(1);
                let discs: HashSet<String> = songs
                    .iter()
                    .map(|song| song.get("~#disc", &first_disc).to_string())
                    .collect();
                return Some(TagValue::Int(discs.len() as i64));
            }
            "bitrate" => return Some(weighted_bitrate(songs)),
            _ => Some(Reduction::default_for(name)),
        },
    };

    let key = format!("~#{}", name);
    match reduction {
        Some(reduction) => {
            let values: Vec<TagValue> = songs
                .iter()
                .map(|song| song.call(&key))
                .filter(TagValue::is_number)
                .collect();
            reduction.apply(&values)
        }
        None if is_zero_default(&key) => Some(TagValue::Int(0)),
        None => None,
    }
}

/// Bitrate weighted by track length; 0 without any length
fn weighted_bitrate(songs: &[Track]) -> TagValue {
    let zero = TagValue::Int(0);
    let mut total_length = 0.0;
    let mut weighted = 0.0;
    for song in songs {
        let length = song.get("~#length", &zero).as_f64().unwrap_or(0.0);
        let bitrate = song.get("~#bitrate", &zero).as_f64().unwrap_or(0.0);
        total_length += length;
        weighted += bitrate * length;
    }
    if total_length == 0.0 {
        return TagValue::Int(0);
    }
    TagValue::Int((weighted / total_length).round() as i64)
}

/// Distinct values across `songs`, most common first, ties by value
fn by_frequency(songs: &[Track], key: &str) -> Option<TagValue> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for song in songs {
        for value in song.list(key) {
            *counts.entry(value).or_default() += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }

    let mut values: Vec<(String, usize)> = counts.into_iter().collect();
    values.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    let joined = values
        .into_iter()
        .map(|(value, _)| value)
        .collect::<Vec<_>>()
        .join("\n");
    Some(TagValue::Text(joined))
}

fn plural(n: i64, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

/// Insertion-ordered score table; lower scores rank first
#[derive(Default)]
struct Ranking {
    scores: Vec<(String, i128)>,
    index: HashMap<String, usize>,
}

impl Ranking {
    fn credit(&mut self, person: &str, score: i128) {
        match self.index.get(person) {
            Some(&i) => self.scores[i].1 -= score,
            None => {
                self.index.insert(person.to_string(), self.scores.len());
                self.scores.push((person.to_string(), -score));
            }
        }
    }

    fn into_value(self) -> Option<TagValue> {
        let mut scores = self.scores;
        scores.sort_by_key(|(_, score)| *score);
        let names: Vec<String> = scores
            .into_iter()
            .take(PEOPLE_LIMIT)
            .map(|(name, _)| name)
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(TagValue::Text(names.join("\n")))
        }
    }
}

// ============================================================================
// Aggregate groups
// ============================================================================

/// A group of tracks answering tag lookups as a whole
pub trait Aggregate {
    /// Current members, in group order
    fn members(&self) -> Cow<'_, [Track]>;

    fn aggregator(&self) -> &Aggregator;

    /// Aggregate `key`, falling back to `default`
    fn get(&self, key: &str, default: &TagValue, connector: &str) -> TagValue {
        self.aggregator()
            .get(&self.members(), key, default, connector)
    }

    /// Aggregate `key` with an empty default
    fn call(&self, key: &str) -> TagValue {
        self.get(key, &TagValue::empty(), DEFAULT_CONNECTOR)
    }

    /// Values joined with `", "`; numbers are returned unchanged
    fn comma(&self, key: &str) -> TagValue {
        match self.call(key) {
            value @ (TagValue::Int(_) | TagValue::Float(_)) => value,
            value => TagValue::Text(value.to_text().replace('\n', ", ")),
        }
    }

    /// Individual values; tied keys give one value per part
    fn list(&self, key: &str) -> Vec<String> {
        if is_tied(key) {
            self.get(key, &TagValue::empty(), "\n").values()
        } else {
            self.call(key).values()
        }
    }

    /// Forget cached values
    fn finalize(&self) {
        self.aggregator().finalize();
    }
}

/// An unordered group with an explicit member list
#[derive(Debug, Default)]
pub struct Collection {
    songs: Vec<Track>,
    aggregator: Aggregator,
}

impl Collection {
    pub fn new(songs: Vec<Track>) -> Self {
        Self {
            songs,
            aggregator: Aggregator::new(),
        }
    }

    pub fn songs(&self) -> &[Track] {
        &self.songs
    }

    pub fn set_songs(&mut self, songs: Vec<Track>) {
        self.songs = songs;
        self.finalize();
    }

    pub fn push(&mut self, song: Track) {
        self.songs.push(song);
        self.finalize();
    }

    /// Remove every occurrence of `song`
    pub fn remove(&mut self, song: &Track) -> bool {
        let before = self.songs.len();
        self.songs.retain(|s| s != song);
        let changed = self.songs.len() != before;
        if changed {
            self.finalize();
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl Aggregate for Collection {
    fn members(&self) -> Cow<'_, [Track]> {
        Cow::Borrowed(&self.songs)
    }

    fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{install, Settings};
    use crate::tags::{TagRecord, PEOPLE};
    use serial_test::serial;

    fn track(pairs: &[(&str, TagValue)]) -> Track {
        Track::new(TagRecord::from_pairs(pairs.iter().cloned()).unwrap())
    }

    fn text(s: &str) -> TagValue {
        TagValue::from(s)
    }

    fn lengths(values: &[i64]) -> Collection {
        Collection::new(
            values
                .iter()
                .map(|l| track(&[("~#length", TagValue::Int(*l))]))
                .collect(),
        )
    }

    #[test]
    fn test_aggregate_people_is_a_reordering() {
        let mut ours = AGGREGATE_PEOPLE.to_vec();
        let mut theirs = PEOPLE.to_vec();
        ours.sort();
        theirs.sort();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn test_empty_collection_returns_default() {
        let c = Collection::default();
        assert_eq!(c.get("~#length", &text("none"), " - "), text("none"));
        assert_eq!(c.call("artist"), TagValue::empty());
    }

    #[test]
    fn test_length_sums() {
        let c = lengths(&[100, 200, 300]);
        assert_eq!(c.call("~#length"), TagValue::Int(600));
        assert_eq!(c.call("~length"), text("10:00"));
        assert_eq!(c.call("~long-length"), text("10 minutes"));
        assert_eq!(c.call("~#length:avg"), TagValue::Float(200.0));
        assert_eq!(c.call("~#length:max"), TagValue::Int(300));
        assert_eq!(c.call("~#length:min"), TagValue::Int(100));
    }

    #[test]
    #[serial]
    fn test_rating_bayesian_average() {
        install(Settings::default());
        let c = Collection::new(
            [3, 4, 5]
                .iter()
                .map(|r| track(&[("~#rating", TagValue::Int(*r))]))
                .collect(),
        );
        assert_eq!(c.call("~#rating"), TagValue::Float(4.0));

        install(Settings {
            bayesian_rating_factor: 2.0,
            ..Settings::default()
        });
        c.finalize();
        // (0.5 * 2 + 12) / (2 + 3)
        assert_eq!(c.call("~#rating"), TagValue::Float(2.6));
        install(Settings::default());
    }

    #[test]
    #[serial]
    fn test_rating_display() {
        install(Settings::default());
        let c = Collection::new(vec![
            track(&[("~#rating", TagValue::Float(1.0))]),
            track(&[("~#rating", TagValue::Float(0.5))]),
        ]);
        assert_eq!(c.call("~rating"), text("★★★☆"));
    }

    #[test]
    fn test_default_functions() {
        let c = Collection::new(vec![
            track(&[
                ("~#lastplayed", TagValue::Int(10)),
                ("date", text("1999")),
                ("~#playcount", TagValue::Int(2)),
            ]),
            track(&[
                ("~#lastplayed", TagValue::Int(30)),
                ("date", text("1995-02-01")),
                ("~#playcount", TagValue::Int(5)),
            ]),
        ]);
        assert_eq!(c.call("~#lastplayed"), TagValue::Int(30));
        assert_eq!(c.call("~#year"), TagValue::Int(1995));
        assert_eq!(c.call("~#playcount"), TagValue::Int(7));
        assert_eq!(c.call("~#skipcount"), TagValue::Int(0));
    }

    #[test]
    fn test_unknown_func_suffix() {
        let c = lengths(&[100]);
        assert_eq!(c.call("~#length:xyz"), TagValue::Int(0));
        assert_eq!(c.get("~#bpm:xyz", &text("?"), " - "), text("?"));
    }

    #[test]
    fn test_numeric_undefined_gives_default() {
        let c = Collection::new(vec![track(&[("title", text("x"))])]);
        assert_eq!(c.get("~#bpm", &text("?"), " - "), text("?"));
        assert_eq!(c.get("~length:real", &text("?"), " - "), text("?"));
    }

    #[test]
    fn test_tracks_and_discs() {
        let c = Collection::new(vec![
            track(&[("discnumber", text("1/2"))]),
            track(&[("discnumber", text("2/2"))]),
            track(&[("discnumber", text("2/2"))]),
        ]);
        assert_eq!(c.call("~#tracks"), TagValue::Int(3));
        assert_eq!(c.call("~tracks"), text("3 tracks"));
        assert_eq!(c.call("~#discs"), TagValue::Int(2));
        assert_eq!(c.call("~discs"), text("2 discs"));

        let single = Collection::new(vec![track(&[("title", text("x"))])]);
        assert_eq!(single.call("~tracks"), text("1 track"));
        assert_eq!(single.call("~#discs"), TagValue::Int(1));
        assert_eq!(single.get("~discs", &text("?"), " - "), text("?"));
    }

    #[test]
    fn test_bitrate_is_length_weighted() {
        let c = Collection::new(vec![
            track(&[("~#bitrate", TagValue::Int(128)), ("~#length", TagValue::Int(100))]),
            track(&[("~#bitrate", TagValue::Int(320)), ("~#length", TagValue::Int(300))]),
        ]);
        assert_eq!(c.call("~#bitrate"), TagValue::Int(272));

        let no_length = Collection::new(vec![track(&[("~#bitrate", TagValue::Int(128))])]);
        assert_eq!(no_length.call("~#bitrate"), TagValue::Int(0));
    }

    #[test]
    fn test_filesize_display() {
        let c = Collection::new(vec![
            track(&[("~#filesize", TagValue::Int(1024))]),
            track(&[("~#filesize", TagValue::Int(1024))]),
        ]);
        assert_eq!(c.call("~filesize"), text("2.00 KB"));
    }

    #[test]
    fn test_people_ranking() {
        let c = Collection::new(vec![
            track(&[("artist", text("Solo")), ("albumartist", text("Band"))]),
            track(&[("artist", text("Often"))]),
            track(&[("artist", text("Often")), ("composer", text("Writer"))]),
        ]);
        assert_eq!(c.call("~people"), text("Band\nOften\nSolo\nWriter"));
    }

    #[test]
    fn test_peoplesort_computed_with_people() {
        let c = Collection::new(vec![track(&[
            ("artist", text("The Band")),
            ("artistsort", text("Band, The")),
        ])]);
        assert_eq!(c.call("~people"), text("The Band"));
        assert!(c.aggregator.cache.borrow().keys().any(|k| k == "~peoplesort"));
        assert_eq!(c.call("~peoplesort"), text("Band, The"));
    }

    #[test]
    fn test_values_by_frequency() {
        let c = Collection::new(vec![
            track(&[("genre", text("Rock"))]),
            track(&[("genre", text("Pop\nRock"))]),
            track(&[("genre", text("Jazz"))]),
        ]);
        assert_eq!(c.call("genre"), text("Rock\nJazz\nPop"));
        assert_eq!(c.comma("genre"), text("Rock, Jazz, Pop"));
        assert_eq!(c.list("genre"), vec!["Rock", "Jazz", "Pop"]);
        assert_eq!(c.get("mood", &text("?"), " - "), text("?"));
    }

    #[test]
    fn test_tied_key() {
        let c = Collection::new(vec![
            track(&[("album", text("Hits")), ("~#length", TagValue::Float(1.5))]),
            track(&[("album", text("Hits")), ("~#length", TagValue::Float(2.0))]),
        ]);
        assert_eq!(c.call("~album~#length"), text("Hits - 3.50"));
        assert_eq!(c.get("~album~genre", &text(""), " / "), text("Hits"));
        assert_eq!(c.list("~album~#length"), vec!["Hits", "3.50"]);
        assert_eq!(c.get("~album~genre", &TagValue::Int(7), " - "), TagValue::Int(7));
    }

    #[test]
    fn test_cache_coherence_after_removal() {
        let a = track(&[("~#length", TagValue::Int(100))]);
        let b = track(&[("~#length", TagValue::Int(50))]);
        let mut c = Collection::new(vec![a]);

        c.push(b.clone());
        assert_eq!(c.call("~#length"), TagValue::Int(150));
        assert!(c.remove(&b));
        assert_eq!(c.call("~#length"), TagValue::Int(100));
    }

    #[test]
    fn test_member_edit_clears_cache() {
        let a = track(&[("~#length", TagValue::Int(100)), ("genre", text("Rock"))]);
        let c = Collection::new(vec![a.clone(), track(&[("~#length", TagValue::Int(20))])]);
        assert_eq!(c.call("~#length"), TagValue::Int(120));
        assert_eq!(c.call("genre"), text("Rock"));

        a.borrow_mut().set("~#length", 250).unwrap();
        a.borrow_mut().set("genre", "Jazz").unwrap();
        assert_eq!(c.call("~#length"), TagValue::Int(270));
        assert_eq!(c.call("genre"), text("Jazz"));

        // Reads alone keep the cache
        assert_eq!(c.aggregator.cache.borrow_mut().lookup("genre"), Lookup::Hit(text("Jazz")));
    }

    #[test]
    fn test_absent_keys_are_remembered() {
        let c = lengths(&[1]);
        assert_eq!(c.get("mood", &text("?"), " - "), text("?"));
        assert_eq!(c.aggregator.cache.borrow_mut().lookup("mood"), Lookup::Absent);
    }
}
