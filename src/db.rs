// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Leningen", "leningen"));

/// Environment variable that overrides the default database location.
pub const DB_ENV: &str = "LENINGEN_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("leningen.sqlite"))
}

/// Open the database at `path` (or the default location) and make sure the
/// schema exists.
pub fn open_or_init(path: Option<&Path>) -> Result<(Connection, PathBuf)> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok((conn, path))
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS leningen(
        lening_id TEXT PRIMARY KEY,
        kredietverstrekker TEXT NOT NULL,
        type TEXT NOT NULL,
        startdatum TEXT NOT NULL,
        einddatum TEXT,
        bedrag TEXT NOT NULL,
        rentepercentage TEXT NOT NULL,
        rentetype TEXT NOT NULL DEFAULT 'Vast',
        status TEXT NOT NULL DEFAULT 'Lopend',
        opmerkingen TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS betalingen(
        betaling_id TEXT PRIMARY KEY,
        lening_id TEXT NOT NULL,
        datum TEXT NOT NULL,
        termijnbedrag TEXT NOT NULL,
        aflossing TEXT NOT NULL,
        rente TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Betaald',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(lening_id) REFERENCES leningen(lening_id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_betalingen_datum ON betalingen(datum);
    CREATE INDEX IF NOT EXISTS idx_betalingen_lening ON betalingen(lening_id);
    "#,
    )?;
    Ok(())
}
