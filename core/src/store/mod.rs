//! SQLite persistence for aggregation output.
//!
//! RULE: Only the store talks to the database.
//! The analysis modules are pure; callers hand their results to the store.

mod antagonist;
mod pairs;

use crate::error::DuelResult;
use rusqlite::Connection;

pub struct DuelStore {
    conn: Connection,
}

impl DuelStore {
    pub fn open(path: &str) -> DuelResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DuelResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order. Safe to call repeatedly.
    pub fn migrate(&self) -> DuelResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_antagonists.sql"))?;
        Ok(())
    }
}
