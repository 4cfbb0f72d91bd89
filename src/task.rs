//! The unit of work distributed across the worker pool.

use std::path::Path;

/// An immutable unit of work identifying one artifact and its globally
/// assigned sequence id.
///
/// Tasks are produced by an external collaborator (directory discovery is
/// out of scope for this crate, see [`crate::discover_tasks`] for a test
/// helper) and are dense: for a run of `N` tasks, ids cover exactly
/// `0..N`.
#[derive(Debug, Clone)]
pub struct Task {
    /// Global sequence id, dense over `0..N`.
    pub id: u64,
    /// Absolute path to the artifact.
    pub full_path: String,
    /// Basename of `full_path`.
    pub filename: String,
    /// Directory component of `full_path`.
    pub path: String,
}

impl Task {
    /// Builds a task from a full path and its assigned id.
    ///
    /// # Panics
    ///
    /// Panics if `full_path` has no filename component (e.g. it is `/` or
    /// empty), since such a path could never name an artifact.
    pub fn new(id: u64, full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let p = Path::new(&full_path);
        let filename = p
            .file_name()
            .unwrap_or_else(|| panic!("task path {full_path} has no filename"))
            .to_string_lossy()
            .into_owned();
        let path = p
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
            .unwrap_or_default();
        Task {
            id,
            full_path,
            filename,
            path,
        }
    }
}
