//! The three-stream serializer enforcing global-id ordering per stream.

use std::sync::{Condvar, Mutex};

use crate::error::Error;
use crate::package::ParsedPackage;
use crate::xml::XmlTriple;

/// A single named output: appends XML chunks and, optionally, mirrors
/// records into a database.
pub trait StreamSink: Send + Sync {
    /// Appends one formatted chunk. Errors are logged by the caller and do
    /// not abort the run.
    fn append_chunk(&self, chunk: &str) -> std::io::Result<()>;
}

/// An optional mirror receiving one row per record written to a
/// [`StreamSink`].
pub trait DatabaseSink: Send + Sync {
    /// Inserts `package`'s fields as one row.
    fn insert(&self, package: &ParsedPackage) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

struct StreamState {
    mutex: Mutex<u64>,
    condvar: Condvar,
}

impl StreamState {
    fn new() -> Self {
        StreamState {
            mutex: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    /// Blocks until this stream's counter equals `id`, runs `action`, then
    /// advances the counter by one and wakes any other waiters.
    ///
    /// `action` is responsible for its own error handling (log-and-continue)
    /// since an append or insert failure must never stall the counter.
    fn advance(&self, id: u64, action: impl FnOnce()) {
        let mut next = self.mutex.lock().unwrap();
        while *next != id {
            next = self.condvar.wait(next).unwrap();
        }
        action();
        *next += 1;
        self.condvar.notify_all();
    }
}

/// Callback invoked whenever a stream-level failure occurs, so the worker
/// pool can surface it (e.g. via `log`) without the sink taking a logging
/// dependency on a concrete subscriber.
pub type FailureHandler<'a> = dyn Fn(Error) + Send + Sync + 'a;

/// Serializes writes to the primary/filelists/other streams, each
/// independently ordered by task id.
pub struct OrderedSink<'a> {
    primary: (StreamState, Box<dyn StreamSink + 'a>, Option<Box<dyn DatabaseSink + 'a>>),
    filelists: (StreamState, Box<dyn StreamSink + 'a>, Option<Box<dyn DatabaseSink + 'a>>),
    other: (StreamState, Box<dyn StreamSink + 'a>, Option<Box<dyn DatabaseSink + 'a>>),
    on_failure: Box<FailureHandler<'a>>,
}

impl<'a> OrderedSink<'a> {
    /// Builds a sink from the three stream writers, each with an optional
    /// database mirror, and a handler invoked on any per-record failure.
    pub fn new(
        primary: Box<dyn StreamSink + 'a>,
        filelists: Box<dyn StreamSink + 'a>,
        other: Box<dyn StreamSink + 'a>,
        primary_db: Option<Box<dyn DatabaseSink + 'a>>,
        filelists_db: Option<Box<dyn DatabaseSink + 'a>>,
        other_db: Option<Box<dyn DatabaseSink + 'a>>,
        on_failure: impl Fn(Error) + Send + Sync + 'a,
    ) -> Self {
        OrderedSink {
            primary: (StreamState::new(), primary, primary_db),
            filelists: (StreamState::new(), filelists, filelists_db),
            other: (StreamState::new(), other, other_db),
            on_failure: Box::new(on_failure),
        }
    }

    /// Writes `triple`/`package` at `id`, blocking each stream until its
    /// turn arrives. Append and insert failures are reported via the
    /// failure handler; the counters still advance.
    pub fn write(&self, id: u64, triple: &XmlTriple, package: &ParsedPackage) {
        self.write_stream(&self.primary, "primary", id, &triple.primary, package);
        self.write_stream(&self.filelists, "filelists", id, &triple.filelists, package);
        self.write_stream(&self.other, "other", id, &triple.other, package);
    }

    /// Advances all three counters past `id` without emitting anything,
    /// used on the failure paths that precede formatting.
    pub fn skip(&self, id: u64) {
        self.primary.0.advance(id, || {});
        self.filelists.0.advance(id, || {});
        self.other.0.advance(id, || {});
    }

    /// The primary stream's current expected id.
    ///
    /// Used only as a heuristic by the reorder buffer's drain loop to
    /// decide whether its head is worth popping; a stale read here can
    /// only under-report readiness (since counters only increase), never
    /// cause an out-of-order pop.
    pub fn primary_next_id(&self) -> u64 {
        *self.primary.0.mutex.lock().unwrap()
    }

    #[allow(clippy::type_complexity)]
    fn write_stream(
        &self,
        stream: &(StreamState, Box<dyn StreamSink + 'a>, Option<Box<dyn DatabaseSink + 'a>>),
        name: &'static str,
        id: u64,
        chunk: &str,
        package: &ParsedPackage,
    ) {
        let (state, sink, db) = stream;
        state.advance(id, || {
            if let Err(source) = sink.append_chunk(chunk) {
                (self.on_failure)(Error::StreamAppendFailure {
                    id,
                    stream: name,
                    source,
                });
            }
            if let Some(db) = db {
                if let Err(source) = db.insert(package) {
                    (self.on_failure)(Error::DatabaseInsertFailure {
                        id,
                        stream: name,
                        source,
                    });
                }
            }
        });
    }
}
