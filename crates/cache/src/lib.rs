//! Persistent, proximity-aware coordinate to city-name cache.
//!
//! Reverse geocoding is slow and rate limited, and photos taken on the same
//! walk sit within metres of each other. [`CityCache`] remembers resolved city
//! names and answers for any coordinate within a small per-axis tolerance of
//! one it has already seen.
//!
//! # Persistence
//! The cache serializes to a JSON array, oldest entry first:
//!
//! ```json
//! [
//!   {
//!     "latitude": 38.015,
//!     "longitude": 23.821,
//!     "city": "NeoPsihiko",
//!     "resolvedAt": "2024-06-30T14:32:55Z",
//!     "source": "network"
//!   }
//! ]
//! ```
//!
//! [`CityCache::load`]/[`CityCache::save`] work on bytes; [`CacheFile`] adds
//! the file handling (atomic writes, backups of corrupted files).

mod cache;
mod entry;
pub mod error;
mod file;

pub use crate::cache::{CacheSettings, CityCache, DEFAULT_MAX_ENTRIES, DEFAULT_TOLERANCE, LoadStatus, Statistics};
pub use crate::entry::{CacheEntry, Source};
pub use crate::file::CacheFile;
