//! Run-wide configuration for the dumper pipeline.

use std::path::PathBuf;

use crate::package::ChecksumKind;

/// Configuration shared by every worker in a run.
///
/// Built with a consuming builder, following this crate's options-struct
/// convention: each method takes and returns `Self` so calls chain from a
/// `Default` baseline.
#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub(crate) checksum_kind: ChecksumKind,
    pub(crate) checksum_cache_dir: Option<PathBuf>,
    pub(crate) location_base: Option<String>,
    pub(crate) changelog_limit: usize,
    pub(crate) skip_stat: bool,
    pub(crate) worker_count: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig {
            checksum_kind: ChecksumKind::Sha256,
            checksum_cache_dir: None,
            location_base: None,
            changelog_limit: 10,
            skip_stat: false,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl DumpConfig {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Which digest algorithm fingerprints each artifact.
    pub fn checksum_kind(mut self, kind: ChecksumKind) -> Self {
        self.checksum_kind = kind;
        self
    }

    /// Directory used to memoize content checksums across runs, keyed by
    /// file identity (mtime, size, path). When unset, every artifact is
    /// rehashed from scratch.
    pub fn checksum_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checksum_cache_dir = Some(dir.into());
        self
    }

    /// Absolute URL prefix prepended to every package's `location_href`.
    pub fn location_base(mut self, base: impl Into<String>) -> Self {
        self.location_base = Some(base.into());
        self
    }

    /// Maximum number of changelog entries retained per package.
    pub fn changelog_limit(mut self, limit: usize) -> Self {
        self.changelog_limit = limit;
        self
    }

    /// When `true`, a cache hit is trusted without stat'ing the artifact.
    pub fn skip_stat(mut self, skip: bool) -> Self {
        self.skip_stat = skip;
        self
    }

    /// Number of worker threads to run.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    pub fn worker_count(mut self, count: usize) -> Self {
        assert!(count > 0, "worker_count must be at least 1");
        self.worker_count = count;
        self
    }
}
