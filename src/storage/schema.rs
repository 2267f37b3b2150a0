//! Database schema definitions

/// SQL schema for the results database
pub const SCHEMA_SQL: &str = r#"
-- Monitored communities
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    screen_name TEXT NOT NULL,
    is_closed INTEGER NOT NULL DEFAULT 0,
    kind TEXT NOT NULL
);

-- Completed pipeline runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target_date TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Which sources fed which run
CREATE TABLE IF NOT EXISTS run_sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    source_id INTEGER NOT NULL REFERENCES sources(id),
    UNIQUE(run_id, source_id)
);

-- One risk flag per classified publication
CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    source_id INTEGER NOT NULL,
    parent_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    flagged INTEGER NOT NULL,
    UNIQUE(source_id, parent_id, item_id)
);

CREATE INDEX IF NOT EXISTS idx_run_sources_run ON run_sources(run_id);
CREATE INDEX IF NOT EXISTS idx_predictions_run ON predictions(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - SQLite connection to initialize
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to execute schema SQL
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
