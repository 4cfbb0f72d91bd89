//! The manual OS thread pool driving the worker loop over a task queue.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::artifact::ArtifactParser;
use crate::cache::Cache;
use crate::config::DumpConfig;
use crate::reorder::ReorderBuffer;
use crate::sink::OrderedSink;
use crate::task::Task;
use crate::worker::{run_task, WorkerContext};

/// Runs the dumper pipeline over `tasks`, distributing them across
/// `config.worker_count` OS threads.
///
/// `repo_root_len` is the length of the repository root prefix stripped
/// from each task's `full_path` to derive its `location_href`.
///
/// Blocks until every task has been written or skipped: all three per-stream
/// counters reach `tasks.len()`.
pub fn run(
    tasks: Vec<Task>,
    config: &DumpConfig,
    cache: Option<&Cache>,
    repo_root_len: usize,
    parser: &dyn ArtifactParser,
    sink: &OrderedSink<'_>,
) {
    let total = tasks.len() as u64;
    let buffer = ReorderBuffer::new();
    let queue = Arc::new(Mutex::new(tasks.into_iter()));

    thread::scope(|scope| {
        let worker_count = config.worker_count.max(1);
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let ctx = WorkerContext {
                config,
                cache,
                repo_root_len,
                parser,
                sink,
                buffer: &buffer,
                total,
            };
            scope.spawn(move || loop {
                let next = queue.lock().unwrap().next();
                match next {
                    Some(task) => run_task(&ctx, task),
                    None => break,
                }
            });
        }
    });
}

/// Walks `repo_root` recursively and builds a dense-id [`Task`] list for
/// every `.rpm` file found.
///
/// This is a convenience used by tests and demos; directory discovery
/// itself is an external collaborator and is not part of the ordering
/// pipeline's contract.
pub fn discover_tasks(repo_root: &std::path::Path) -> std::io::Result<Vec<Task>> {
    let mut paths = Vec::new();
    let mut stack = vec![repo_root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rpm") {
                paths.push(path);
            }
        }
    }
    paths.sort();
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(id, path)| Task::new(id as u64, path.to_string_lossy().into_owned()))
        .collect())
}
