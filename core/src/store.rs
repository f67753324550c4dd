//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine hands it serialized documents under well-known keys.

use crate::{error::GameResult, types::Timestamp};
use rusqlite::{params, Connection, OptionalExtension};

/// Key the game snapshot lives under.
pub const GAME_STATE_KEY: &str = "island_focus.game_state";

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    /// Open (or create) the save database at `path` and apply migrations.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let store = Self { conn: Connection::open_in_memory()? };
        store.migrate()?;
        Ok(store)
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_kv_store.sql"))?;
        Ok(())
    }

    // ── Key-value ──────────────────────────────────────────────

    pub fn get(&self, key: &str) -> GameResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str, now: Timestamp) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> GameResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}
