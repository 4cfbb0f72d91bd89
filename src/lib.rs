//! # repodata-dumper
//!
//! A parallel worker-pool pipeline for dumping RPM repository metadata into
//! three ordered XML streams: primary, filelists, and other (changelog).
//!
//! Each artifact is parsed independently on a worker thread, but the three
//! output streams must each see records in the same global order the
//! artifacts were assigned, regardless of which worker finishes first. A
//! bounded reorder buffer absorbs completions that arrive early; a
//! previous-run cache lets unchanged artifacts skip reparsing entirely.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repodata_dumper::{
//!     artifact::RpmArtifactParser,
//!     config::DumpConfig,
//!     discover_tasks,
//!     sink::{OrderedSink, StreamSink},
//!     pool,
//! };
//! use std::fs::File;
//! use std::io::Write;
//! use std::sync::Mutex;
//!
//! struct FileSink(Mutex<File>);
//! impl StreamSink for FileSink {
//!     fn append_chunk(&self, chunk: &str) -> std::io::Result<()> {
//!         self.0.lock().unwrap().write_all(chunk.as_bytes())
//!     }
//! }
//!
//! fn main() -> std::io::Result<()> {
//!     let repo_root = std::path::Path::new("./repo");
//!     let tasks = discover_tasks(repo_root)?;
//!
//!     let sink = OrderedSink::new(
//!         Box::new(FileSink(Mutex::new(File::create("primary.xml")?))),
//!         Box::new(FileSink(Mutex::new(File::create("filelists.xml")?))),
//!         Box::new(FileSink(Mutex::new(File::create("other.xml")?))),
//!         None,
//!         None,
//!         None,
//!         |e| log::error!("{e}"),
//!     );
//!
//!     let config = DumpConfig::new();
//!     let parser = RpmArtifactParser;
//!     let root_len = repo_root.to_string_lossy().len() + 1;
//!     pool::run(tasks, &config, None, root_len, &parser, &sink);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `sqlite` | yes | Mirrors each XML stream into a SQLite database via [`sqlite_sink::SqliteSink`] |

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod artifact;
pub mod cache;
pub mod checksum;
pub mod config;
pub mod error;
pub mod package;
pub mod pool;
pub mod reorder;
pub mod sink;
#[cfg(feature = "sqlite")]
pub mod sqlite_sink;
pub mod task;
pub mod worker;
pub mod xml;

pub use cache::Cache;
pub use config::DumpConfig;
pub use error::{Error, Result};
pub use package::{ChecksumKind, ParsedPackage};
pub use pool::{discover_tasks, run};
pub use task::Task;
pub use xml::XmlTriple;
