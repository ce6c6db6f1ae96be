//! Cache module for storing API responses to disk
//!
//! `CacheManager` persists JSON entries under the XDG cache directory, and
//! `LocalCache` builds the single-slot recipe snapshot on top of it. Cache
//! failures never reach the caller: a failed read is an empty snapshot and a
//! failed write is logged.

mod manager;
mod snapshot;

pub use manager::{CacheError, CacheManager, CachedData};
pub use snapshot::{LocalCache, RecipeCache, SnapshotStream};
