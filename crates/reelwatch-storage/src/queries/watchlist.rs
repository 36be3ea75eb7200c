// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watchlist and watched-movie operations.

use chrono::{DateTime, Utc};
use reelwatch_core::{MovieDetails, ReelwatchError, SearchKind, UserId};
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{WatchedMovie, WatchlistEntry, format_ts, get_enum, get_ts};

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<WatchlistEntry> {
    Ok(WatchlistEntry {
        user_id: row.get(0)?,
        api_id: row.get(1)?,
        media_type: get_enum(row, 2)?,
        title: row.get(3)?,
        added_at: get_ts(row, 4)?,
    })
}

/// Add a title to the watchlist. Adding it twice keeps the first entry.
pub async fn add_to_watchlist(db: &Database, entry: &WatchlistEntry) -> Result<(), ReelwatchError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO watchlist (user_id, api_id, media_type, title, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.user_id,
                    entry.api_id,
                    entry.media_type.to_string(),
                    entry.title,
                    format_ts(&entry.added_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's watchlist, most recently added first.
pub async fn list_watchlist(
    db: &Database,
    user_id: UserId,
) -> Result<Vec<WatchlistEntry>, ReelwatchError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, api_id, media_type, title, added_at
                 FROM watchlist WHERE user_id = ?1 ORDER BY added_at DESC, api_id",
            )?;
            let rows = stmt.query_map(params![user_id], entry_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove a title from the watchlist. Returns whether anything was removed.
pub async fn remove_from_watchlist(
    db: &Database,
    user_id: UserId,
    api_id: i64,
    media_type: SearchKind,
) -> Result<bool, ReelwatchError> {
    let removed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM watchlist WHERE user_id = ?1 AND api_id = ?2 AND media_type = ?3",
                params![user_id, api_id, media_type.to_string()],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(removed > 0)
}

/// Record a movie as watched and drop it from the watchlist atomically.
pub async fn mark_movie_watched(
    db: &Database,
    user_id: UserId,
    movie: &MovieDetails,
    watched_at: DateTime<Utc>,
) -> Result<(), ReelwatchError> {
    let movie_id = movie.id;
    let title = movie.title.clone();
    let runtime = movie.runtime;
    let watched_at = format_ts(&watched_at);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO watched_movies (user_id, api_movie_id, title, runtime, watched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, api_movie_id) DO UPDATE SET watched_at = excluded.watched_at",
                params![user_id, movie_id, title, runtime, watched_at],
            )?;
            tx.execute(
                "DELETE FROM watchlist WHERE user_id = ?1 AND api_id = ?2 AND media_type = 'movie'",
                params![user_id, movie_id],
            )?;
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Movies a user has watched, most recent first.
pub async fn list_watched_movies(
    db: &Database,
    user_id: UserId,
) -> Result<Vec<WatchedMovie>, ReelwatchError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, api_movie_id, title, runtime, watched_at
                 FROM watched_movies WHERE user_id = ?1 ORDER BY watched_at DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(WatchedMovie {
                    user_id: row.get(0)?,
                    api_movie_id: row.get(1)?,
                    title: row.get(2)?,
                    runtime: row.get(3)?,
                    watched_at: get_ts(row, 4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
