//! Per-task worker logic: cache consult, extraction, formatting, and the
//! buffer-vs-write decision.

use crate::artifact::ArtifactParser;
use crate::cache::{Cache, FileStat};
use crate::config::DumpConfig;
use crate::error::Error;
use crate::package::ParsedPackage;
use crate::reorder::{BufferedResult, ReorderBuffer};
use crate::sink::OrderedSink;
use crate::task::Task;
use crate::xml::format_package;

/// Shared, read-mostly state every worker consults.
pub struct WorkerContext<'a> {
    /// Run-wide configuration.
    pub config: &'a DumpConfig,
    /// Previous-run cache, if any.
    pub cache: Option<&'a Cache>,
    /// Length of the repository root prefix, stripped from each task's
    /// `full_path` to derive `location_href`.
    pub repo_root_len: usize,
    /// The artifact parser collaborator.
    pub parser: &'a dyn ArtifactParser,
    /// The three-stream serializer.
    pub sink: &'a OrderedSink<'a>,
    /// The bounded reorder buffer.
    pub buffer: &'a ReorderBuffer,
    /// Total task count, used to exclude the last id from deferral: it can
    /// never be skipped ahead of, so it always blocks on the sink directly.
    pub total: u64,
}

fn report(ctx: &WorkerContext<'_>, err: Error) {
    match &err {
        Error::TaskStatFailure { .. } | Error::ExtractFailure { .. } => log::warn!("{err}"),
        _ => log::error!("{err}"),
    }
    let _ = ctx; // failure is reported via logging only; no separate channel.
}

/// Runs one task through the full pipeline, performing a write or a
/// deferral, then draining the buffer. Mirrors the ten ordered steps of the
/// worker loop design.
pub fn run_task(ctx: &WorkerContext<'_>, task: Task) {
    let href = task.full_path[ctx.repo_root_len.min(task.full_path.len())..].to_string();
    let base = ctx.config.location_base.clone();

    let stat = if ctx.cache.is_some() && !ctx.config.skip_stat {
        match FileStat::of(std::path::Path::new(&task.full_path)) {
            Ok(stat) => Some(stat),
            Err(source) => {
                report(
                    ctx,
                    Error::TaskStatFailure {
                        id: task.id,
                        filename: task.filename.clone(),
                        source,
                    },
                );
                ctx.sink.skip(task.id);
                drain(ctx);
                return;
            }
        }
    } else {
        None
    };

    let mut reused_entry = None;
    if let Some(cache) = ctx.cache {
        if let Some(entry) = cache.lookup(&task.filename) {
            let fresh = match stat {
                Some(stat) => Cache::is_fresh(&entry, stat, ctx.config.checksum_kind),
                None => true, // skip_stat trusts any cache hit unconditionally
            };
            if fresh {
                reused_entry = Some(Cache::rebind_location(&entry, href.clone(), base.clone()));
            } else {
                log::warn!("cache entry for {} is obsolete, reparsing", task.filename);
            }
        }
    }

    // Reused entries are cloned out of the cache's `Arc` rather than moved,
    // so the worker always owns an independent `ParsedPackage` that normal
    // `Drop` frees once the sink consumes it; the cache's own copy is never
    // touched, so a reused entry is never freed out from under the cache
    // without any special-casing here.
    let package: ParsedPackage = match reused_entry {
        Some(entry) => entry,
        None => {
            let stat = match stat {
                Some(stat) => stat,
                None => match FileStat::of(std::path::Path::new(&task.full_path)) {
                    Ok(stat) => stat,
                    Err(source) => {
                        report(
                            ctx,
                            Error::TaskStatFailure {
                                id: task.id,
                                filename: task.filename.clone(),
                                source,
                            },
                        );
                        ctx.sink.skip(task.id);
                        drain(ctx);
                        return;
                    }
                },
            };
            match ctx.parser.parse(
                std::path::Path::new(&task.full_path),
                ctx.config.checksum_kind,
                ctx.config.checksum_cache_dir.as_deref(),
                href,
                base,
                ctx.config.changelog_limit,
                stat,
            ) {
                Ok(pkg) => pkg,
                Err(source) => {
                    report(
                        ctx,
                        Error::ExtractFailure {
                            id: task.id,
                            filename: task.filename.clone(),
                            source,
                        },
                    );
                    ctx.sink.skip(task.id);
                    drain(ctx);
                    return;
                }
            }
        }
    };

    let triple = match format_package(&package) {
        Ok(triple) => triple,
        Err(source) => {
            report(
                ctx,
                Error::FormatFailure {
                    id: task.id,
                    filename: task.filename.clone(),
                    source,
                },
            );
            ctx.sink.skip(task.id);
            drain(ctx);
            return;
        }
    };

    let result = BufferedResult {
        id: task.id,
        triple,
        package,
    };

    let is_last = task.id + 1 == ctx.total;
    if !is_last {
        match ctx.buffer.try_defer(result) {
            Ok(()) => {
                drain(ctx);
                return;
            }
            Err(returned) => {
                write_result(ctx, returned);
                drain(ctx);
                return;
            }
        }
    }
    write_result(ctx, result);
    drain(ctx);
}

fn write_result(ctx: &WorkerContext<'_>, result: BufferedResult) {
    ctx.sink.write(result.id, &result.triple, &result.package);
}

fn drain(ctx: &WorkerContext<'_>) {
    loop {
        let ready = ctx.buffer.pop_if_ready(ctx.sink.primary_next_id());
        match ready {
            Some(result) => write_result(ctx, result),
            None => break,
        }
    }
}
