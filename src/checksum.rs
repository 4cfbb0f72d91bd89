//! Content checksum computation for artifact fingerprinting.
//!
//! Mirrors the streaming-digest shape used throughout this crate's checksum
//! kinds: a fixed-size read buffer feeding an incremental hasher, with a
//! one-shot `checksum_file` entry point for callers that don't need to
//! manage the hasher themselves.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use digest::Digest;
use serde::{Deserialize, Serialize};

use crate::cache::FileStat;
use crate::package::ChecksumKind;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Computes the hex-encoded content checksum of the file at `path`.
pub fn checksum_file(path: &Path, kind: ChecksumKind) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    match kind {
        ChecksumKind::Md5 => compute::<md5::Md5>(&mut reader),
        ChecksumKind::Sha1 => compute::<sha1::Sha1>(&mut reader),
        ChecksumKind::Sha256 => compute::<sha2::Sha256>(&mut reader),
    }
}

#[derive(Serialize, Deserialize)]
struct CachedChecksum {
    mtime: u64,
    size: u64,
    kind: ChecksumKind,
    digest: String,
}

/// Filename under `cache_dir` a given artifact path's checksum is stored
/// under: the path's own last component plus a short hash of the full
/// path, so collisions between same-named artifacts from different
/// directories don't clobber each other.
fn cache_entry_path(cache_dir: &Path, path: &Path) -> std::path::PathBuf {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    cache_dir.join(format!("{filename}.{:016x}.json", hasher.finish()))
}

/// Like [`checksum_file`], but consults `cache_dir` first: if a cached
/// digest exists for `path` whose recorded `mtime`/`size`/`kind` match
/// `stat`/`kind` exactly, it is returned without rehashing. Otherwise the
/// file is hashed and the result is written back for the next run.
pub fn checksum_file_cached(
    path: &Path,
    kind: ChecksumKind,
    stat: FileStat,
    cache_dir: Option<&Path>,
) -> io::Result<String> {
    let Some(cache_dir) = cache_dir else {
        return checksum_file(path, kind);
    };

    let entry_path = cache_entry_path(cache_dir, path);
    if let Ok(text) = std::fs::read_to_string(&entry_path) {
        if let Ok(cached) = serde_json::from_str::<CachedChecksum>(&text) {
            if cached.mtime == stat.mtime && cached.size == stat.size && cached.kind == kind {
                return Ok(cached.digest);
            }
        }
    }

    let digest = checksum_file(path, kind)?;
    std::fs::create_dir_all(cache_dir)?;
    let entry = CachedChecksum {
        mtime: stat.mtime,
        size: stat.size,
        kind,
        digest: digest.clone(),
    };
    if let Ok(text) = serde_json::to_string(&entry) {
        let _ = std::fs::write(&entry_path, text);
    }
    Ok(digest)
}

fn compute<D: Digest>(reader: &mut impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
