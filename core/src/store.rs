//! SQLite session journal.
//!
//! RULE: Only store.rs talks to the database.
//! The session calls store methods and never executes SQL directly.

use crate::{
    error::{GameError, GameResult},
    event::{ActionRecord, JournalEntry},
    types::Month,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    /// Open (or create) the journal database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0)) {
            Ok(mode) if mode.eq_ignore_ascii_case("wal") => {}
            Ok(mode) => log::warn!("{path}: journal_mode stayed {mode}, WAL unavailable"),
            Err(e) => log::warn!("{path}: could not enable WAL: {e}"),
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and by default in the runner).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_journal.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    pub fn insert_session(&self, session_id: &str, seed: u64, version: &str) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO session (session_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, seed as i64, version, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn session_seed(&self, session_id: &str) -> GameResult<u64> {
        let seed: Option<i64> = self
            .conn
            .query_row(
                "SELECT seed FROM session WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        seed.map(|s| s as u64).ok_or_else(|| GameError::SessionNotFound {
            session_id: session_id.to_string(),
        })
    }

    // ── Action log ─────────────────────────────────────────────

    pub fn append_action(&self, record: &ActionRecord) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO action_log (session_id, seq, month, action, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.session_id,
                record.seq as i64,
                record.month,
                record.action,
                record.outcome,
            ],
        )?;
        Ok(())
    }

    pub fn actions_for_session(&self, session_id: &str) -> GameResult<Vec<ActionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, seq, month, action, outcome
             FROM action_log WHERE session_id = ?1
             ORDER BY seq ASC, id ASC",
        )?;
        let records = stmt
            .query_map(params![session_id], |row| {
                Ok(ActionRecord {
                    session_id: row.get(0)?,
                    seq:        row.get::<_, i64>(1)? as u64,
                    month:      row.get(2)?,
                    action:     row.get(3)?,
                    outcome:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &JournalEntry) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, seq, month, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.seq as i64,
                entry.month,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> GameResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, seq, month, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(JournalEntry {
                    id:         Some(row.get(0)?),
                    session_id: row.get(1)?,
                    seq:        row.get::<_, i64>(2)? as u64,
                    month:      row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, session_id: &str, event_type: &str) -> GameResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(
        &self,
        session_id: &str,
        month: Month,
        seq: u64,
        state_json: &str,
    ) -> GameResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (session_id, month, seq, state_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![session_id, month, seq as i64, state_json],
        )?;
        Ok(())
    }

    /// Most recent snapshot for a session as (month, state_json).
    pub fn latest_snapshot(&self, session_id: &str) -> GameResult<Option<(Month, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT month, state_json FROM snapshot
                 WHERE session_id = ?1
                 ORDER BY seq DESC LIMIT 1",
                params![session_id],
                |row| Ok((row.get::<_, Month>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}
