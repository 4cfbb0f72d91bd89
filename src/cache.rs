//! The previous-run package cache.
//!
//! A read-mostly map consulted by the worker loop to decide whether an
//! artifact can be reused unparsed. [`Cache::rebind_location`] is the one
//! place a reused entry's location fields change: it returns a rebound
//! clone rather than mutating the cached `Arc` in place, since a plain map
//! lookup never yields a uniquely owned `Arc` (see the worker loop for the
//! call site).

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::CacheError;
use crate::package::{ChecksumKind, ParsedPackage};

/// Filesystem metadata a fresh [`ArtifactExtractor`] run would also observe,
/// used to decide whether a cache entry is still valid.
///
/// [`ArtifactExtractor`]: crate::artifact::ArtifactParser
#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    /// Modification time, seconds since epoch.
    pub mtime: u64,
    /// Size in bytes.
    pub size: u64,
}

impl FileStat {
    /// Stats the file at `path`.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let meta = fs::metadata(path)?;
        let mtime = meta
            .modified()?
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Ok(FileStat {
            mtime,
            size: meta.len(),
        })
    }
}

/// A previous run's package metadata, keyed by filename.
#[derive(Debug, Default)]
pub struct Cache {
    entries: HashMap<String, Arc<ParsedPackage>>,
}

impl Cache {
    /// An empty cache; every lookup misses.
    pub fn new() -> Self {
        Cache {
            entries: HashMap::new(),
        }
    }

    /// Builds a cache from already-loaded entries, keyed by filename.
    pub fn from_entries(entries: HashMap<String, Arc<ParsedPackage>>) -> Self {
        Cache { entries }
    }

    /// Loads a cache previously written by [`Cache::save`].
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let data = fs::read(path)?;
        let entries: HashMap<String, ParsedPackage> = serde_json::from_slice(&data)?;
        Ok(Cache::from_entries(
            entries.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        ))
    }

    /// Persists the cache for a later run to load.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let entries: HashMap<&String, &ParsedPackage> = self
            .entries
            .iter()
            .map(|(k, v)| (k, v.as_ref()))
            .collect();
        let data = serde_json::to_vec(&entries)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Looks up a cache entry by filename.
    pub fn lookup(&self, filename: &str) -> Option<Arc<ParsedPackage>> {
        self.entries.get(filename).cloned()
    }

    /// True iff `entry` is still valid for the artifact described by
    /// `stat`, under `requested_kind`.
    pub fn is_fresh(entry: &ParsedPackage, stat: FileStat, requested_kind: ChecksumKind) -> bool {
        entry.time_file == stat.mtime
            && entry.size_package == stat.size
            && entry.checksum_kind == requested_kind
    }

    /// Clones `entry` out of the cache and overwrites the clone's location
    /// fields for the new run's layout.
    ///
    /// A clone, not an in-place mutation through the `Arc`, is what keeps
    /// this race-free without requiring exclusive ownership of the shared
    /// cache entry: the worker's copy is independent from the moment it's
    /// made, and the cache's own entry is left untouched for any later
    /// (hypothetical) lookup of the same filename.
    pub fn rebind_location(entry: &ParsedPackage, href: String, base: Option<String>) -> ParsedPackage {
        let mut owned = entry.clone();
        owned.rebind_location(href, base);
        owned
    }
}
