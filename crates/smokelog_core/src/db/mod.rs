//! Persistence bootstrap for the smoking log.
//!
//! A connection handed out by this module already carries the current
//! schema: `smoking_records` for row storage and `kv_entries` for the
//! prefixed key/value store. Schema revisions are numbered and mirrored to
//! `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The directory meant to hold the database file could not be created.
    CreateDirectory {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// The file was written by a newer build; it is left untouched.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::CreateDirectory { dir, source } => write!(
                f,
                "cannot create database directory `{}`: {source}",
                dir.display()
            ),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "database uses schema revision {found}, this build understands up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDirectory { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
