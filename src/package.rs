//! The carrier entity for extracted package metadata.

use serde::{Deserialize, Serialize};

/// Which digest algorithm fingerprints an artifact.
///
/// The textual name (via [`ChecksumKind::name`]) is what gets interned into
/// a [`ParsedPackage`] and compared against a cache entry's recorded kind
/// when deciding freshness.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumKind {
    /// MD5, kept for compatibility with older repository consumers.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256, the recommended default.
    #[default]
    Sha256,
}

impl ChecksumKind {
    /// The textual name recorded alongside a package's checksum.
    pub fn name(self) -> &'static str {
        match self {
            ChecksumKind::Md5 => "md5",
            ChecksumKind::Sha1 => "sha1",
            ChecksumKind::Sha256 => "sha256",
        }
    }
}


/// One changelog entry, as found in an artifact's changelog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Author/name line of the entry.
    pub author: String,
    /// Seconds since epoch.
    pub timestamp: u64,
    /// Free-form changelog text.
    pub description: String,
}

/// One file recorded by an artifact's file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full installed path.
    pub path: String,
    /// `true` when the record refers to a directory, not a regular file.
    pub is_dir: bool,
}

/// A package's extracted metadata, ready for XML formatting.
///
/// Instances are either freshly produced by [`crate::artifact::ArtifactParser`]
/// or reused from a previous run's cache (see [`crate::cache::Cache`]); both
/// paths converge on this same shape, which is what makes cache reuse and
/// fresh extraction produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPackage {
    /// Package name (NEVRA "N").
    pub name: String,
    /// Epoch (NEVRA "E").
    pub epoch: u32,
    /// Version (NEVRA "V").
    pub version: String,
    /// Release (NEVRA "R").
    pub release: String,
    /// Architecture (NEVRA "A").
    pub arch: String,
    /// Content checksum, hex-encoded.
    pub pkg_id: String,
    /// Which digest algorithm produced `pkg_id`.
    pub checksum_kind: ChecksumKind,
    /// Path to the artifact, relative to the repository root.
    pub location_href: String,
    /// Optional absolute URL prefix prepended to `location_href` by
    /// consumers.
    pub location_base: Option<String>,
    /// Artifact modification time, seconds since epoch.
    pub time_file: u64,
    /// Artifact size in bytes.
    pub size_package: u64,
    /// Installed size in bytes, as recorded by the artifact itself.
    pub size_installed: u64,
    /// Byte offset where the artifact's header section begins.
    pub rpm_header_start: u64,
    /// Byte offset where the artifact's header section ends.
    pub rpm_header_end: u64,
    /// Summary line.
    pub summary: String,
    /// Full description.
    pub description: String,
    /// License string.
    pub license: String,
    /// Files recorded by the artifact.
    pub files: Vec<FileRecord>,
    /// Changelog entries, already truncated to the configured limit.
    pub changelog: Vec<ChangelogEntry>,
}

impl ParsedPackage {
    /// Overwrites the location fields in place.
    ///
    /// Used only by [`crate::cache::Cache::rebind_location`], which documents
    /// why this mutation is race-free for cached entries reused across runs.
    pub(crate) fn rebind_location(&mut self, href: String, base: Option<String>) {
        self.location_href = href;
        self.location_base = base;
    }
}
