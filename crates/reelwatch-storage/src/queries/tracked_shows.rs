// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracked show CRUD operations.

use reelwatch_core::{ReelwatchError, UserId};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::TrackedShow;

const SHOW_COLUMNS: &str = "user_id, api_show_id, name, seasons, episodes, runtime, status";

fn show_from_row(row: &Row<'_>) -> rusqlite::Result<TrackedShow> {
    Ok(TrackedShow {
        user_id: row.get(0)?,
        api_show_id: row.get(1)?,
        name: row.get(2)?,
        seasons: row.get(3)?,
        episodes: row.get(4)?,
        runtime: row.get(5)?,
        status: row.get(6)?,
    })
}

/// All shows tracked by a user.
pub async fn list_tracked_shows(
    db: &Database,
    user_id: UserId,
) -> Result<Vec<TrackedShow>, ReelwatchError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SHOW_COLUMNS} FROM tracked_shows WHERE user_id = ?1 ORDER BY name"
            ))?;
            let rows = stmt.query_map(params![user_id], show_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One tracked show, if the user tracks it.
pub async fn get_tracked_show(
    db: &Database,
    api_show_id: i64,
    user_id: UserId,
) -> Result<Option<TrackedShow>, ReelwatchError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {SHOW_COLUMNS} FROM tracked_shows
                     WHERE api_show_id = ?1 AND user_id = ?2"
                ),
                params![api_show_id, user_id],
                show_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a new tracked show. Fails if the user already tracks it.
pub async fn create_tracked_show(db: &Database, show: &TrackedShow) -> Result<(), ReelwatchError> {
    let show = show.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tracked_shows (user_id, api_show_id, name, seasons, episodes, runtime, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    show.user_id,
                    show.api_show_id,
                    show.name,
                    show.seasons,
                    show.episodes,
                    show.runtime,
                    show.status,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite the mutable fields of an existing tracked show.
///
/// Updating a row that does not exist is an error.
pub async fn update_tracked_show(db: &Database, show: &TrackedShow) -> Result<(), ReelwatchError> {
    let show = show.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tracked_shows
                 SET name = ?3, seasons = ?4, episodes = ?5, runtime = ?6, status = ?7,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE user_id = ?1 AND api_show_id = ?2",
                params![
                    show.user_id,
                    show.api_show_id,
                    show.name,
                    show.seasons,
                    show.episodes,
                    show.runtime,
                    show.status,
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(ReelwatchError::storage("tracked show not found"));
    }
    Ok(())
}
