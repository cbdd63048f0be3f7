//! Bounded most-recently-used cache of aggregate values

use crate::tags::TagValue;
use std::collections::{HashSet, VecDeque};

/// Number of values kept per aggregate
pub const CACHE_SIZE: usize = 6;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(TagValue),
    /// The key is known to resolve to nothing
    Absent,
    Miss,
}

/// Values most recently used first, plus the keys known to have no value
///
/// Absent keys do not count against the capacity.
#[derive(Debug, Default)]
pub struct AggregateCache {
    entries: VecDeque<(String, TagValue)>,
    absent: HashSet<String>,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe `key`; a hit becomes the most recently used entry
    pub fn lookup(&mut self, key: &str) -> Lookup {
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == key) {
            if let Some(entry) = self.entries.remove(pos) {
                let value = entry.1.clone();
                self.entries.push_front(entry);
                return Lookup::Hit(value);
            }
        }
        if self.absent.contains(key) {
            Lookup::Absent
        } else {
            Lookup::Miss
        }
    }

    /// Store a computed result; `None` marks the key absent
    pub fn store(&mut self, key: &str, value: Option<TagValue>) {
        match value {
            Some(value) => self.insert(key, value),
            None => {
                self.remove_entry(key);
                self.absent.insert(key.to_string());
            }
        }
    }

    fn insert(&mut self, key: &str, value: TagValue) {
        self.remove_entry(key);
        self.absent.remove(key);
        self.entries.push_front((key.to_string(), value));
        self.entries.truncate(CACHE_SIZE);
    }

    fn remove_entry(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// Drop every value and every absent marker
    pub fn clear(&mut self) {
        self.entries.clear();
        self.absent.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.absent.is_empty()
    }

    /// Cached keys, most recently used first
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}
