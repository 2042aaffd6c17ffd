//! SQLite persistence for the cache snapshot.
//!
//! RULE: Only store.rs talks to the database.
//! The cache gate calls store methods; it never executes SQL directly.

use crate::error::LotteryResult;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &str) -> LotteryResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LotteryResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LotteryResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_snapshot.sql"))?;
        Ok(())
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Overwrite the single snapshot row.
    pub fn save_snapshot(&self, written_at: i64, state_json: &str) -> LotteryResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO distribution_snapshot (slot, written_at, state_json)
             VALUES (1, ?1, ?2)",
            params![written_at, state_json],
        )?;
        Ok(())
    }

    /// The snapshot row as `(written_at, state_json)`, if one exists.
    pub fn latest_snapshot(&self) -> LotteryResult<Option<(i64, String)>> {
        let row = self
            .conn
            .query_row(
                "SELECT written_at, state_json FROM distribution_snapshot WHERE slot = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    pub fn clear_snapshot(&self) -> LotteryResult<()> {
        self.conn.execute("DELETE FROM distribution_snapshot", [])?;
        Ok(())
    }
}
