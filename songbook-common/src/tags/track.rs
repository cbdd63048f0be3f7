use super::{TagRecord, TagValue, DEFAULT_CONNECTOR, DEFAULT_JOINER};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of edit generations; strictly increasing across all tracks
static LAST_GENERATION: AtomicU64 = AtomicU64::new(0);

struct Shared {
    record: RefCell<TagRecord>,
    generation: Cell<u64>,
}

/// Shared handle to a record held by a library
///
/// Equality and hashing are by identity: two handles are equal only if they
/// point at the same record, so editing `~filename` never moves a track
/// between hash buckets.
///
/// Every [`Track::borrow_mut`] stamps the track with a new generation, newer
/// than any generation handed out before. Aggregators compare the newest
/// generation among their members with the one their cached values were
/// computed at, so an edit through any handle invalidates every group the
/// track belongs to.
#[derive(Clone)]
pub struct Track(Rc<Shared>);

impl Track {
    pub fn new(record: TagRecord) -> Self {
        Self(Rc::new(Shared {
            record: RefCell::new(record),
            generation: Cell::new(0),
        }))
    }

    pub fn borrow(&self) -> Ref<'_, TagRecord> {
        self.0.record.borrow()
    }

    /// Mutable access to the record; counts as an edit
    pub fn borrow_mut(&self) -> RefMut<'_, TagRecord> {
        let record = self.0.record.borrow_mut();
        let generation = LAST_GENERATION.fetch_add(1, Ordering::Relaxed) + 1;
        self.0.generation.set(generation);
        record
    }

    /// Generation of the last edit; 0 if never edited
    pub fn generation(&self) -> u64 {
        self.0.generation.get()
    }

    /// Resolve `key` with an empty default
    pub fn call(&self, key: &str) -> TagValue {
        self.borrow().call(key)
    }

    /// Resolve `key` with `default`
    pub fn get(&self, key: &str, default: &TagValue) -> TagValue {
        self.borrow()
            .resolve(key, default, DEFAULT_CONNECTOR, DEFAULT_JOINER)
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.borrow().list(key)
    }

    pub fn comma(&self, key: &str) -> TagValue {
        self.borrow().comma(key)
    }

    /// `~filename` as text; the identifier libraries and playlists use
    pub fn key(&self) -> String {
        self.borrow()
            .filename()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn ptr_eq(&self, other: &Track) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track({})", self.key())
    }
}
