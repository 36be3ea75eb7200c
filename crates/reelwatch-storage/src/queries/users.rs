// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile operations.

use chrono::Utc;
use reelwatch_core::{ReelwatchError, UserId};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::{User, format_ts, get_ts};

const USER_COLUMNS: &str = "id, api_key, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        api_key: row.get(1)?,
        created_at: get_ts(row, 2)?,
        updated_at: get_ts(row, 3)?,
    })
}

/// List every user, oldest first.
pub async fn list_users(db: &Database) -> Result<Vec<User>, ReelwatchError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Load a user, inserting an empty profile on first contact.
pub async fn get_or_create_user(db: &Database, user_id: UserId) -> Result<User, ReelwatchError> {
    let now = format_ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (id, api_key, created_at, updated_at)
                 VALUES (?1, NULL, ?2, ?2)",
                params![user_id, now],
            )?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                user_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The stored API key for a user. `None` for unknown users too.
pub async fn get_user_credential(
    db: &Database,
    user_id: UserId,
) -> Result<Option<String>, ReelwatchError> {
    db.connection()
        .call(move |conn| {
            let key: Option<Option<String>> = conn
                .query_row(
                    "SELECT api_key FROM users WHERE id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(key.flatten())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store a user's API key, creating the user row if needed.
pub async fn set_user_credential(
    db: &Database,
    user_id: UserId,
    api_key: &str,
) -> Result<(), ReelwatchError> {
    let api_key = api_key.to_string();
    let now = format_ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, api_key, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(id) DO UPDATE SET api_key = excluded.api_key,
                                               updated_at = excluded.updated_at",
                params![user_id, api_key, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
