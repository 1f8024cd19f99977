use crate::entry::{CacheEntry, Source};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use snapname_coords::Coordinate;
use std::collections::VecDeque;
use tracing::{debug, instrument, warn};

pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Default per-axis proximity, in degrees (roughly 100m of latitude).
pub const DEFAULT_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheSettings {
    max_entries: usize,
    tolerance: f64,
}
impl Default for CacheSettings {
    fn default() -> Self {
        Self { max_entries: DEFAULT_MAX_ENTRIES, tolerance: DEFAULT_TOLERANCE }
    }
}
impl CacheSettings {
    /// A zero bound is raised to one; a negative or non-finite tolerance
    /// falls back to exact matching.
    pub fn new(max_entries: usize, tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance >= 0.0 { tolerance } else { 0.0 };
        Self { max_entries: max_entries.max(1), tolerance }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Cumulative counters since the cache was constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub entry_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub max_entries: usize,
    pub tolerance: f64,
}

/// Outcome of [`CityCache::load`] and [`CacheFile::load_into`](crate::CacheFile::load_into).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The payload parsed; `skipped` individual entries were invalid and dropped.
    Loaded { entries: usize, skipped: usize },
    /// There was nothing to load. Not a failure.
    Missing,
    /// The payload could not be read or parsed; the cache is now empty.
    Corrupted,
}
impl LoadStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Corrupted)
    }
}

/// Bounded, insertion-ordered coordinate to city-name cache.
///
/// Lookups match any entry within the configured tolerance on both axes and
/// prefer the most recently inserted match. Eviction is FIFO: reading an
/// entry does not protect it. Entries are never replaced, so two inserts for
/// the same place both occupy a slot until the older one ages out.
#[derive(Debug)]
pub struct CityCache {
    entries: VecDeque<CacheEntry>,
    settings: CacheSettings,
    hits: u64,
    misses: u64,
}
impl Default for CityCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}
impl CityCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self { entries: VecDeque::new(), settings, hits: 0, misses: 0 }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &CacheEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Returns the newest city within tolerance of `coordinate`, counting a
    /// hit or a miss.
    pub fn lookup(&mut self, coordinate: &Coordinate) -> Option<&str> {
        match self.position(coordinate) {
            Some(index) => {
                self.hits += 1;
                let city = self.entries[index].city();
                debug!(%coordinate, city, "City cache hit");
                Some(city)
            },
            None => {
                self.misses += 1;
                debug!(%coordinate, "City cache miss");
                None
            },
        }
    }

    /// Like [`lookup`](Self::lookup) without touching the counters.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.position(coordinate).is_some()
    }

    fn position(&self, coordinate: &Coordinate) -> Option<usize> {
        let tolerance = self.settings.tolerance;
        self.entries.iter().rposition(|entry| entry.coordinate().is_within(coordinate, tolerance))
    }

    /// Appends a new entry, first evicting the oldest one if the cache is full.
    pub fn insert(&mut self, coordinate: Coordinate, city: impl Into<String>, source: Source) {
        self.push(CacheEntry::new(coordinate, city, source));
    }

    fn push(&mut self, entry: CacheEntry) {
        while self.entries.len() >= self.settings.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(coordinate = %evicted.coordinate(), city = evicted.city(), "Evicted oldest city cache entry");
            }
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the contents with the persisted entries in `bytes`.
    ///
    /// A payload that is not a JSON array leaves the cache empty and reports
    /// [`LoadStatus::Corrupted`]; invalid entries inside a valid array are
    /// skipped. When the payload holds more entries than the bound allows the
    /// oldest are evicted, exactly as if they had been inserted one by one.
    #[instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
    pub fn load(&mut self, bytes: &[u8]) -> LoadStatus {
        self.entries.clear();
        let values: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
            Ok(values) => values,
            Err(err) => {
                warn!(error = %err, "City cache payload is corrupted; starting empty");
                return LoadStatus::Corrupted;
            },
        };
        let mut skipped = 0;
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => self.push(entry),
                Err(err) => {
                    warn!(index, error = %err, "Skipping invalid city cache entry");
                    skipped += 1;
                },
            }
        }
        debug!(entries = self.entries.len(), skipped, "City cache loaded");
        LoadStatus::Loaded { entries: self.entries.len(), skipped }
    }

    /// Serializes all entries, oldest first, as pretty-printed JSON.
    pub fn save(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.entries).or_raise(|| ErrorKind::Serialize)
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            entry_count: self.entries.len(),
            hit_count: self.hits,
            miss_count: self.misses,
            max_entries: self.settings.max_entries,
            tolerance: self.settings.tolerance,
        }
    }
}
