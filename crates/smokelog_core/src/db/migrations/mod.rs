//! Numbered schema revisions for the smoking log database.
//!
//! Revisions run in one transaction, oldest first, and each bumps
//! `PRAGMA user_version` to its own number. A database already at the
//! newest revision is not touched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Revision {
    number: u32,
    label: &'static str,
    sql: &'static str,
}

const REVISIONS: &[Revision] = &[
    Revision {
        number: 1,
        label: "smoking_records",
        sql: include_str!("0001_smoking_records.sql"),
    },
    Revision {
        number: 2,
        label: "kv_entries",
        sql: include_str!("0002_kv_entries.sql"),
    },
];

/// Newest schema revision this build can create.
pub fn latest_version() -> u32 {
    REVISIONS.last().map_or(0, |revision| revision.number)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// `UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = read_user_version(conn)?;
    let supported = latest_version();

    match found.cmp(&supported) {
        Ordering::Greater => Err(DbError::UnsupportedSchemaVersion { found, supported }),
        Ordering::Equal => {
            debug!("event=db_migrate module=db status=skip version={found}");
            Ok(())
        }
        Ordering::Less => {
            let tx = conn.transaction()?;
            for revision in pending_after(found) {
                tx.execute_batch(revision.sql)?;
                tx.pragma_update(None, "user_version", revision.number)?;
                debug!(
                    "event=db_migrate module=db status=ok version={} label={}",
                    revision.number, revision.label
                );
            }
            tx.commit()?;
            info!(
                "event=db_migrate module=db status=done from_version={found} to_version={supported}"
            );
            Ok(())
        }
    }
}

fn pending_after(version: u32) -> impl Iterator<Item = &'static Revision> {
    REVISIONS
        .iter()
        .filter(move |revision| revision.number > version)
}

fn read_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_after, REVISIONS};

    #[test]
    fn revisions_are_numbered_consecutively_from_one() {
        for (index, revision) in REVISIONS.iter().enumerate() {
            assert_eq!(revision.number as usize, index + 1);
        }
        assert_eq!(latest_version() as usize, REVISIONS.len());
    }

    #[test]
    fn pending_after_skips_applied_revisions() {
        let pending: Vec<u32> = pending_after(1).map(|revision| revision.number).collect();
        assert_eq!(pending, vec![2]);
        assert_eq!(pending_after(latest_version()).count(), 0);
    }
}
