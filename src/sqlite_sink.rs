//! An optional SQLite mirror for one output stream.

use rusqlite::{params, Connection};
use std::sync::Mutex;

use crate::package::ParsedPackage;
use crate::sink::DatabaseSink;

/// Mirrors every inserted package into a single SQLite table.
///
/// One `SqliteSink` corresponds to one of the three streams; callers wire
/// up to three independent instances (one per stream) since each stream's
/// [`crate::sink::OrderedSink`] counter advances independently.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens (creating if needed) a SQLite database at `path` with the
    /// mirror table `table_name`.
    pub fn open(path: &std::path::Path, table_name: &str) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    pkg_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    version TEXT NOT NULL,
                    release TEXT NOT NULL,
                    arch TEXT NOT NULL,
                    location_href TEXT NOT NULL,
                    time_file INTEGER NOT NULL,
                    size_package INTEGER NOT NULL
                )"
            ),
            [],
        )?;
        Ok(SqliteSink {
            conn: Mutex::new(conn),
        })
    }

    fn table_insert(&self, table_name: &str, pkg: &ParsedPackage) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {table_name}
                 (pkg_id, name, version, release, arch, location_href, time_file, size_package)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ),
            params![
                pkg.pkg_id,
                pkg.name,
                pkg.version,
                pkg.release,
                pkg.arch,
                pkg.location_href,
                pkg.time_file as i64,
                pkg.size_package as i64,
            ],
        )?;
        Ok(())
    }
}

/// A `SqliteSink` bound to a fixed table name, implementing [`DatabaseSink`].
pub struct TableSink<'a> {
    sink: &'a SqliteSink,
    table_name: &'static str,
}

impl<'a> TableSink<'a> {
    /// Binds `sink` to `table_name`.
    pub fn new(sink: &'a SqliteSink, table_name: &'static str) -> Self {
        TableSink { sink, table_name }
    }
}

impl DatabaseSink for TableSink<'_> {
    fn insert(&self, package: &ParsedPackage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sink
            .table_insert(self.table_name, package)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}
