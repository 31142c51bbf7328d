// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local session store: API settings, the login token and undo snapshots
//! for deleted accounts. Everything else lives on the server.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.carihesap", "Carihesap", "carihesap"));

pub const DB_PATH_ENV: &str = "CARIHESAP_DB_PATH";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_PATH_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("carihesap.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- deleted documents kept so they can be re-created
    CREATE TABLE IF NOT EXISTS undo_snapshots(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        resource TEXT NOT NULL,
        payload TEXT NOT NULL,
        deleted_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn clear_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

pub fn push_snapshot(conn: &Connection, resource: &str, payload: &serde_json::Value) -> Result<i64> {
    conn.execute(
        "INSERT INTO undo_snapshots(resource, payload) VALUES (?1, ?2)",
        params![resource, serde_json::to_string(payload)?],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Latest snapshot for `resource` without removing it.
pub fn peek_snapshot(conn: &Connection, resource: &str) -> Result<Option<(i64, serde_json::Value)>> {
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, payload FROM undo_snapshots WHERE resource=?1 ORDER BY id DESC LIMIT 1",
            params![resource],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    match row {
        Some((id, s)) => {
            let v = serde_json::from_str(&s)
                .with_context(|| format!("Invalid snapshot payload #{}", id))?;
            Ok(Some((id, v)))
        }
        None => Ok(None),
    }
}

pub fn drop_snapshot(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM undo_snapshots WHERE id=?1", params![id])?;
    Ok(())
}
