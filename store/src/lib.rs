//! SQLite-backed session store.
//!
//! One row per session in `sessions`, one row per live hypothesis in
//! `candidates`. A save replaces a session's rows inside a single
//! transaction, so a crash leaves either the old or the new state.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use countdown_engine::{Candidate, EngineSnapshot, SessionStore};
use countdown_types::{SegmentMask, SessionId};
use rusqlite::{Connection, OptionalExtension, params};

pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS sessions (
            sequence TEXT PRIMARY KEY,
            step INTEGER NOT NULL,
            left_working INTEGER NOT NULL,
            right_working INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS candidates (
            sequence TEXT NOT NULL,
            value INTEGER NOT NULL,
            left_missing INTEGER NOT NULL DEFAULT 0,
            right_missing INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (sequence, value)
        );
    ";

    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let db = Connection::open(path)
            .with_context(|| format!("Failed to open session store at {}", path.display()))?;
        tracing::info!(path = %path.display(), "Session store opened");
        Self::initialize(db)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory session store")?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")
            .context("Failed to set session store pragmas")?;
        db.execute_batch(Self::SCHEMA)
            .context("Failed to create session store schema")?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for SqliteStore {
    fn load(&self, id: &SessionId) -> Result<Option<EngineSnapshot>> {
        let db = self.db();
        let header: Option<(i64, i64, i64)> = db
            .query_row(
                "SELECT step, left_working, right_working FROM sessions WHERE sequence = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .with_context(|| format!("Failed to load session {id}"))?;

        let Some((step, left_working, right_working)) = header else {
            return Ok(None);
        };

        let mut stmt = db
            .prepare(
                "SELECT value, left_missing, right_missing
                 FROM candidates WHERE sequence = ?1 ORDER BY value ASC",
            )
            .context("Failed to prepare candidates query")?;
        let rows = stmt
            .query_map(params![id.as_str()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .context("Failed to query candidates")?;

        let mut candidates = Vec::new();
        for row in rows {
            let (value, left, right) = row?;
            let value = u8::try_from(value)
                .with_context(|| format!("Candidate value {value} out of range in {id}"))?;
            candidates.push(Candidate::restore(
                value,
                mask_column(left, "left_missing")?,
                mask_column(right, "right_missing")?,
            ));
        }

        Ok(Some(EngineSnapshot {
            step: u32::try_from(step).with_context(|| format!("Invalid step {step} in {id}"))?,
            left_working: mask_column(left_working, "left_working")?,
            right_working: mask_column(right_working, "right_working")?,
            candidates,
        }))
    }

    fn save(&self, id: &SessionId, snapshot: &EngineSnapshot) -> Result<()> {
        let mut db = self.db();
        let tx = db
            .transaction()
            .context("Failed to start session save transaction")?;

        tx.execute(
            "INSERT INTO sessions (sequence, step, left_working, right_working)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(sequence) DO UPDATE SET
                step = excluded.step,
                left_working = excluded.left_working,
                right_working = excluded.right_working",
            params![
                id.as_str(),
                snapshot.step,
                snapshot.left_working.bits(),
                snapshot.right_working.bits()
            ],
        )
        .with_context(|| format!("Failed to save session {id}"))?;

        tx.execute(
            "DELETE FROM candidates WHERE sequence = ?1",
            params![id.as_str()],
        )
        .with_context(|| format!("Failed to clear candidates of {id}"))?;

        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO candidates (sequence, value, left_missing, right_missing)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .context("Failed to prepare candidate insert")?;
            for candidate in &snapshot.candidates {
                insert
                    .execute(params![
                        id.as_str(),
                        candidate.value(),
                        candidate.left_missing().bits(),
                        candidate.right_missing().bits()
                    ])
                    .with_context(|| {
                        format!("Failed to insert candidate {} of {id}", candidate.value())
                    })?;
            }
        }

        tx.commit()
            .context("Failed to commit session save transaction")?;
        Ok(())
    }

    fn remove(&self, id: &SessionId) -> Result<bool> {
        let mut db = self.db();
        let tx = db
            .transaction()
            .context("Failed to start session remove transaction")?;
        tx.execute(
            "DELETE FROM candidates WHERE sequence = ?1",
            params![id.as_str()],
        )
        .with_context(|| format!("Failed to remove candidates of {id}"))?;
        let removed = tx
            .execute(
                "DELETE FROM sessions WHERE sequence = ?1",
                params![id.as_str()],
            )
            .with_context(|| format!("Failed to remove session {id}"))?;
        tx.commit()
            .context("Failed to commit session remove transaction")?;
        Ok(removed > 0)
    }

    fn clear(&self) -> Result<()> {
        self.db()
            .execute_batch("DELETE FROM candidates; DELETE FROM sessions;")
            .context("Failed to clear session store")?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db()
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .context("Failed to count sessions")?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn mask_column(raw: i64, column: &str) -> Result<SegmentMask> {
    let bits = u8::try_from(raw).with_context(|| format!("{column} value {raw} out of range"))?;
    SegmentMask::new(bits).with_context(|| format!("{column} value {raw} is not a segment mask"))
}
