//! Parsing an on-disk artifact into a [`ParsedPackage`].

use std::path::Path;

use crate::cache::FileStat;
use crate::checksum::checksum_file_cached;
use crate::error::ExtractError;
use crate::package::{ChangelogEntry, ChecksumKind, FileRecord, ParsedPackage};

/// The external collaborator responsible for reading one artifact's own
/// format. [`RpmArtifactParser`] is the production implementation; tests
/// use [`FixtureParser`] to avoid needing to synthesize real RPM byte
/// streams for every case.
pub trait ArtifactParser: Send + Sync {
    /// Parses `path`, truncating the changelog to `changelog_limit` entries.
    ///
    /// `href`/`base` are interned into the resulting package's location
    /// fields; `stat` is reused if already available so the parser does not
    /// need to stat the file a second time. `checksum_cache_dir`, when set,
    /// lets the checksum step skip rehashing a file whose identity matches
    /// an entry recorded on a previous run.
    #[allow(clippy::too_many_arguments)]
    fn parse(
        &self,
        path: &Path,
        checksum_kind: ChecksumKind,
        checksum_cache_dir: Option<&Path>,
        href: String,
        base: Option<String>,
        changelog_limit: usize,
        stat: FileStat,
    ) -> Result<ParsedPackage, ExtractError>;
}

/// Parses real RPM artifacts using the `rpm` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RpmArtifactParser;

impl ArtifactParser for RpmArtifactParser {
    fn parse(
        &self,
        path: &Path,
        checksum_kind: ChecksumKind,
        checksum_cache_dir: Option<&Path>,
        href: String,
        base: Option<String>,
        changelog_limit: usize,
        stat: FileStat,
    ) -> Result<ParsedPackage, ExtractError> {
        let path_str = path.display().to_string();

        let pkg = rpm::Package::open(path).map_err(|e| ExtractError::Parse {
            path: path_str.clone(),
            source: Box::new(e),
        })?;
        let metadata = &pkg.metadata;

        let get = |res: Result<&str, rpm::Error>| -> Result<String, ExtractError> {
            res.map(str::to_owned).map_err(|e| ExtractError::Parse {
                path: path_str.clone(),
                source: Box::new(e),
            })
        };

        let name = get(metadata.get_name())?;
        let version = get(metadata.get_version())?;
        let release = get(metadata.get_release())?;
        let arch = get(metadata.get_arch())?;
        let epoch = metadata.get_epoch().unwrap_or(0);
        let summary = get(metadata.get_summary())?;
        let description = get(metadata.get_description())?;
        let license = get(metadata.get_license())?;
        let size_installed = metadata.get_installed_size().unwrap_or(0);

        let files = metadata
            .get_file_entries()
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|f| FileRecord {
                        is_dir: matches!(f.mode, rpm::FileMode::Dir { .. }),
                        path: f.path.to_string_lossy().into_owned(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let changelog = metadata
            .get_changelog_entries()
            .map(|entries| {
                entries
                    .into_iter()
                    .take(changelog_limit)
                    .map(|c| ChangelogEntry {
                        author: c.name,
                        timestamp: c.timestamp,
                        description: c.description,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let offsets = metadata.get_package_segment_offsets();

        let pkg_id = checksum_file_cached(path, checksum_kind, stat, checksum_cache_dir).map_err(|e| {
            ExtractError::Checksum {
                path: path_str.clone(),
                source: e,
            }
        })?;

        Ok(ParsedPackage {
            name,
            epoch,
            version,
            release,
            arch,
            pkg_id,
            checksum_kind,
            location_href: href,
            location_base: base,
            time_file: stat.mtime,
            size_package: stat.size,
            size_installed,
            rpm_header_start: offsets.header,
            rpm_header_end: offsets.payload,
            summary,
            description,
            license,
            files,
            changelog,
        })
    }
}

/// An in-memory parser for tests: returns a fixed [`ParsedPackage`]
/// regardless of the file's actual content, so property tests can exercise
/// the ordering pipeline without needing real RPM fixtures.
#[derive(Debug, Clone)]
pub struct FixtureParser {
    /// The package every `parse` call returns (with location/stat fields
    /// overwritten to match the call).
    pub template: ParsedPackage,
    /// When set, `parse` fails for artifacts whose `href` is in this list,
    /// simulating an `ExtractFailure`.
    pub fail_for: Vec<String>,
}

impl ArtifactParser for FixtureParser {
    fn parse(
        &self,
        _path: &Path,
        checksum_kind: ChecksumKind,
        _checksum_cache_dir: Option<&Path>,
        href: String,
        base: Option<String>,
        changelog_limit: usize,
        stat: FileStat,
    ) -> Result<ParsedPackage, ExtractError> {
        if self.fail_for.contains(&href) {
            return Err(ExtractError::Parse {
                path: href,
                source: "injected fixture failure".into(),
            });
        }
        let mut pkg = self.template.clone();
        pkg.checksum_kind = checksum_kind;
        pkg.location_href = href;
        pkg.location_base = base;
        pkg.time_file = stat.mtime;
        pkg.size_package = stat.size;
        pkg.changelog.truncate(changelog_limit);
        Ok(pkg)
    }
}
