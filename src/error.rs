//! Error types for the dumper pipeline.
//!
//! Per the pipeline's failure-recovery contract, none of these errors ever
//! unwind past a worker: [`ExtractError`], [`FormatError`], and
//! [`CacheError`] are constructed, logged, and folded into a skipped task.
//! They are still ordinary `std::error::Error` types (via [`thiserror`]) so
//! that callers and tests can match on them directly.

use std::io;

/// Errors produced while extracting metadata from an on-disk artifact.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// Reading file metadata (size, modification time) failed.
    #[error("stat failed for {path}: {source}")]
    Stat {
        /// Path that could not be stat'd.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading or parsing the artifact's own format failed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path of the artifact that failed to parse.
        path: String,
        /// Underlying parser error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Computing the artifact's content checksum failed.
    #[error("checksum of {path} failed: {source}")]
    Checksum {
        /// Path that could not be checksummed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Errors produced while formatting a parsed package into XML.
///
/// A `FormatError` on an already-successfully-parsed package signals a bug
/// in the formatter rather than bad input data; the pipeline still advances
/// the ordering counters for the failed task so later tasks are not stalled.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    /// A required field was missing from the package being formatted.
    #[error("package {pkg_id} is missing required field {field}")]
    MissingField {
        /// Identifier of the offending package.
        pkg_id: String,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Errors produced while loading or saving the previous-run cache.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    /// The cache file's JSON could not be parsed, or a package could not be
    /// serialized back to JSON.
    #[error("cache (de)serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The top-level error type naming the pipeline's five failure classes.
///
/// Constructed at task boundaries purely for logging; the pipeline's public
/// entry point ([`crate::pool::run`]) never returns one of these for a
/// single task's failure, since per-task failures are recovered from (see
/// the module docs). It is still useful as a shared vocabulary for the
/// handful of genuinely fatal setup errors (for example, a stream that
/// cannot be opened at all).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// `stat` on an artifact failed before extraction was attempted.
    #[error("stat failed for task {id} ({filename}): {source}")]
    TaskStatFailure {
        /// Id of the failing task.
        id: u64,
        /// Filename of the failing task.
        filename: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Metadata extraction failed for a task.
    #[error("extraction failed for task {id} ({filename}): {source}")]
    ExtractFailure {
        /// Id of the failing task.
        id: u64,
        /// Filename of the failing task.
        filename: String,
        /// Underlying extraction error.
        #[source]
        source: ExtractError,
    },

    /// XML formatting failed for an otherwise valid package.
    #[error("format failed for task {id} ({filename}): {source}")]
    FormatFailure {
        /// Id of the failing task.
        id: u64,
        /// Filename of the failing task.
        filename: String,
        /// Underlying format error.
        #[source]
        source: FormatError,
    },

    /// Appending a chunk to one of the three XML streams failed.
    ///
    /// The stream's counter is still advanced; the record is lost but the
    /// run continues (see [`crate::sink::OrderedSink`]).
    #[error("append to {stream} stream failed for task {id}: {source}")]
    StreamAppendFailure {
        /// Id of the task whose record could not be appended.
        id: u64,
        /// Which of the three streams failed (`"primary"`, `"filelists"`,
        /// or `"other"`).
        stream: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Inserting a package into a database mirror failed.
    #[error("database insert into {stream} mirror failed for task {id}: {source}")]
    DatabaseInsertFailure {
        /// Id of the task whose record could not be inserted.
        id: u64,
        /// Which mirror failed.
        stream: &'static str,
        /// Underlying database error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The I/O error for genuinely fatal, non-per-task failures (for
    /// example, a stream that cannot be opened before the run starts).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias for the crate's fallible setup operations.
pub type Result<T> = std::result::Result<T, Error>;
