//! SQLite storage implementation

use crate::storage::schema::initialize_schema;
use crate::storage::{
    PredictionRecord, RunRecord, SaveSummary, SourceRecord, StorageError, StorageResult,
};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens one transaction covering a whole save: source upserts, the run
    /// row, run-to-source links, and every prediction
    ///
    /// Nothing is visible to readers until [`SaveBatch::commit`]; dropping
    /// the batch rolls everything back.
    pub fn begin_save(
        &mut self,
        sources: &[SourceRecord],
        target_date: NaiveDate,
    ) -> StorageResult<SaveBatch<'_>> {
        let tx = self.conn.transaction()?;

        let mut summary = SaveSummary::default();
        for source in sources {
            tx.execute(
                "INSERT INTO sources (id, name, screen_name, is_closed, kind)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     screen_name = excluded.screen_name,
                     is_closed = excluded.is_closed,
                     kind = excluded.kind",
                params![
                    source.id,
                    source.name,
                    source.screen_name,
                    source.is_closed,
                    source.kind
                ],
            )?;
            summary.sources_upserted += 1;
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO runs (target_date, created_at) VALUES (?1, ?2)",
            params![target_date.format("%Y-%m-%d").to_string(), now],
        )?;
        let run_id = tx.last_insert_rowid();

        let mut batch = SaveBatch {
            tx,
            run_id,
            summary,
        };
        for source in sources {
            batch.link_source(source.id)?;
        }
        Ok(batch)
    }

    // ===== Read Helpers =====

    pub fn run_count(&self) -> StorageResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?)
    }

    pub fn prediction_count(&self) -> StorageResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?)
    }

    pub fn get_source(&self, id: i64) -> StorageResult<Option<SourceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, screen_name, is_closed, kind FROM sources WHERE id = ?1",
        )?;
        let source = stmt
            .query_row(params![id], |row| {
                Ok(SourceRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    screen_name: row.get(2)?,
                    is_closed: row.get(3)?,
                    kind: row.get(4)?,
                })
            })
            .optional()?;
        Ok(source)
    }

    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, target_date, created_at FROM runs WHERE id = ?1")?;
        let run = stmt
            .query_row(params![run_id], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    target_date: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })
            .optional()?;
        run.ok_or(StorageError::RunNotFound(run_id))
    }

    /// Returns the source ids linked to a run, in ascending order
    pub fn linked_sources(&self, run_id: i64) -> StorageResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_id FROM run_sources WHERE run_id = ?1 ORDER BY source_id",
        )?;
        let ids = stmt
            .query_map(params![run_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    pub fn predictions_for_run(&self, run_id: i64) -> StorageResult<Vec<PredictionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, source_id, parent_id, item_id, flagged
             FROM predictions WHERE run_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(PredictionRecord {
                    run_id: row.get(0)?,
                    source_id: row.get(1)?,
                    parent_id: row.get(2)?,
                    item_id: row.get(3)?,
                    flagged: row.get::<_, i64>(4)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// One in-flight transactional save
///
/// Created by [`SqliteStorage::begin_save`]. Predictions accumulate inside
/// the transaction and land atomically on [`commit`](Self::commit).
pub struct SaveBatch<'conn> {
    tx: Transaction<'conn>,
    run_id: i64,
    summary: SaveSummary,
}

impl SaveBatch<'_> {
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Links a source to this run
    ///
    /// A link to a source that is missing from the sources table is logged
    /// and skipped rather than failing the whole save. Returns whether a
    /// row was inserted.
    pub fn link_source(&mut self, source_id: i64) -> StorageResult<bool> {
        let result = self.tx.execute(
            "INSERT OR IGNORE INTO run_sources (run_id, source_id) VALUES (?1, ?2)",
            params![self.run_id, source_id],
        );
        match result {
            Ok(1) => {
                self.summary.links_inserted += 1;
                Ok(true)
            }
            Ok(_) => {
                self.summary.links_skipped += 1;
                Ok(false)
            }
            Err(err) if is_foreign_key_violation(&err) => {
                tracing::warn!(
                    "source {} is missing from the sources table, skipping run link",
                    source_id
                );
                self.summary.links_skipped += 1;
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Stores one risk flag, keyed by publication
    ///
    /// A publication already stored by an earlier run keeps its existing
    /// flag. Returns whether a row was inserted.
    pub fn save_prediction(
        &mut self,
        source_id: i64,
        parent_id: i64,
        item_id: i64,
        flagged: bool,
    ) -> StorageResult<bool> {
        let inserted = self.tx.execute(
            "INSERT OR IGNORE INTO predictions (run_id, source_id, parent_id, item_id, flagged)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.run_id, source_id, parent_id, item_id, flagged as i64],
        )?;
        if inserted == 1 {
            self.summary.predictions_inserted += 1;
            Ok(true)
        } else {
            tracing::debug!(
                "prediction for publication ({}, {}, {}) already stored, skipping",
                source_id,
                parent_id,
                item_id
            );
            self.summary.predictions_skipped += 1;
            Ok(false)
        }
    }

    /// Commits the batch and returns the save counters
    pub fn commit(self) -> StorageResult<SaveSummary> {
        let summary = self.summary;
        self.tx.commit()?;
        Ok(summary)
    }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
