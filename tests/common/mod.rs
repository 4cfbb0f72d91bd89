//! Shared test harness: an in-memory [`StreamSink`] and a fixture-backed
//! [`WorkerContext`] that processes tasks in an explicitly chosen
//! completion order, simulating out-of-order worker completion without
//! depending on real thread scheduling.
//!
//! Each `tests/*.rs` binary compiles this module independently and uses a
//! different subset of it, so `dead_code` is expected and not a signal of
//! an actually-unused item.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use repodata_dumper::artifact::FixtureParser;
use repodata_dumper::cache::Cache;
use repodata_dumper::config::DumpConfig;
use repodata_dumper::package::{ChangelogEntry, ChecksumKind, FileRecord, ParsedPackage};
use repodata_dumper::reorder::ReorderBuffer;
use repodata_dumper::sink::{DatabaseSink, OrderedSink, StreamSink};
use repodata_dumper::task::Task;
use repodata_dumper::worker::{run_task, WorkerContext};

pub struct RecordingSink(pub Arc<Mutex<Vec<String>>>);
impl StreamSink for RecordingSink {
    fn append_chunk(&self, chunk: &str) -> std::io::Result<()> {
        self.0.lock().unwrap().push(chunk.to_string());
        Ok(())
    }
}

pub struct FailingSink;
impl StreamSink for FailingSink {
    fn append_chunk(&self, _chunk: &str) -> std::io::Result<()> {
        Err(std::io::Error::other("injected append failure"))
    }
}

pub struct RecordingDb(pub Arc<Mutex<Vec<String>>>);
impl DatabaseSink for RecordingDb {
    fn insert(&self, package: &ParsedPackage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.0.lock().unwrap().push(package.pkg_id.clone());
        Ok(())
    }
}

pub fn blank_template(name: &str) -> ParsedPackage {
    ParsedPackage {
        name: name.to_string(),
        epoch: 0,
        version: "1.0".into(),
        release: "1".into(),
        arch: "x86_64".into(),
        pkg_id: String::new(),
        checksum_kind: ChecksumKind::Sha256,
        location_href: String::new(),
        location_base: None,
        time_file: 0,
        size_package: 0,
        size_installed: 0,
        rpm_header_start: 96,
        rpm_header_end: 500,
        summary: "a package".into(),
        description: "a longer description".into(),
        license: "MIT".into(),
        files: vec![FileRecord {
            path: "/usr/bin/thing".into(),
            is_dir: false,
        }],
        changelog: vec![ChangelogEntry {
            author: "Jane Doe".into(),
            timestamp: 900,
            description: "release".into(),
        }],
    }
}

/// Creates `n` tasks backed by real temp files (so `stat` succeeds), a
/// fixture parser that fails for the ids in `fail_ids`, and three
/// in-memory sinks. Runs `completion_order` (a permutation of `0..n`)
/// through the pipeline sequentially and returns the three streams' final
/// contents plus the failure log.
pub struct Harness {
    pub _dir: tempfile::TempDir,
    pub tasks: Vec<Task>,
    pub primary: Arc<Mutex<Vec<String>>>,
    pub filelists: Arc<Mutex<Vec<String>>>,
    pub other: Arc<Mutex<Vec<String>>>,
    pub failures: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub fn new(n: u64, fail_ids: &[u64]) -> (Self, OrderedSink<'static>, ReorderBuffer, DumpConfig, FixtureParser, Cache) {
        let dir = tempfile::tempdir().unwrap();
        let mut tasks = Vec::new();
        for id in 0..n {
            let path = dir.path().join(format!("pkg{id}-1.0-1.x86_64.rpm"));
            std::fs::write(&path, format!("fake-rpm-{id}")).unwrap();
            tasks.push(Task::new(id, path.to_string_lossy().into_owned()));
        }

        let primary = Arc::new(Mutex::new(Vec::new()));
        let filelists = Arc::new(Mutex::new(Vec::new()));
        let other = Arc::new(Mutex::new(Vec::new()));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let failures_clone = failures.clone();

        let sink = OrderedSink::new(
            Box::new(RecordingSink(primary.clone())),
            Box::new(RecordingSink(filelists.clone())),
            Box::new(RecordingSink(other.clone())),
            None,
            None,
            None,
            move |e| failures_clone.lock().unwrap().push(e.to_string()),
        );

        let fail_for = fail_ids
            .iter()
            .map(|id| format!("pkg{id}-1.0-1.x86_64.rpm"))
            .collect();
        let parser = FixtureParser {
            template: blank_template("pkg"),
            fail_for,
        };

        let harness = Harness {
            _dir: dir,
            tasks,
            primary,
            filelists,
            other,
            failures,
        };
        (harness, sink, ReorderBuffer::new(), DumpConfig::new(), parser, Cache::new())
    }
}

/// Spawns one real thread per entry of `order` (the order tasks *start* in,
/// not the order they necessarily finish in) and runs each through
/// `run_task` concurrently. Real threads are required here, not sequential
/// calls: a task that lands on the current tail of the id space blocks on
/// the sink until its predecessor writes, which only another thread can
/// satisfy.
pub fn run_in_order(
    tasks: &[Task],
    order: &[usize],
    config: &DumpConfig,
    parser: &FixtureParser,
    sink: &OrderedSink<'_>,
    buffer: &ReorderBuffer,
) {
    let total = tasks.len() as u64;
    std::thread::scope(|scope| {
        for (start_rank, &idx) in order.iter().enumerate() {
            let ctx = WorkerContext {
                config,
                cache: None,
                repo_root_len: tasks[idx].path.len() + 1,
                parser,
                sink,
                buffer,
                total,
            };
            let task = tasks[idx].clone();
            scope.spawn(move || {
                // Stagger thread starts so `order` is also the completion
                // order in practice, without pretending real systems are
                // single-threaded.
                std::thread::sleep(std::time::Duration::from_millis(5 * start_rank as u64));
                run_task(&ctx, task);
            });
        }
    });
}
