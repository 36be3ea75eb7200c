// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable per-worker run state.

use reelwatch_core::ReelwatchError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{WorkerState, format_opt_ts, format_ts, get_enum, get_opt_ts, get_ts};

/// Load the state row for a worker.
pub async fn get_worker_state(
    db: &Database,
    worker_id: &str,
) -> Result<Option<WorkerState>, ReelwatchError> {
    let worker_id = worker_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT worker_id, worker_type, status, last_check_time, next_check_time,
                        shows_checked, updates_found, last_error, created_at, updated_at
                 FROM worker_states WHERE worker_id = ?1",
                params![worker_id],
                |row| {
                    Ok(WorkerState {
                        worker_id: row.get(0)?,
                        worker_type: row.get(1)?,
                        status: get_enum(row, 2)?,
                        last_check_time: get_opt_ts(row, 3)?,
                        next_check_time: get_opt_ts(row, 4)?,
                        shows_checked: row.get(5)?,
                        updates_found: row.get(6)?,
                        last_error: row.get(7)?,
                        created_at: get_ts(row, 8)?,
                        updated_at: get_ts(row, 9)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace the state row. `created_at` of an existing row is kept.
pub async fn upsert_worker_state(db: &Database, state: &WorkerState) -> Result<(), ReelwatchError> {
    let state = state.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO worker_states (worker_id, worker_type, status, last_check_time,
                        next_check_time, shows_checked, updates_found, last_error,
                        created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(worker_id) DO UPDATE SET
                        worker_type = excluded.worker_type,
                        status = excluded.status,
                        last_check_time = excluded.last_check_time,
                        next_check_time = excluded.next_check_time,
                        shows_checked = excluded.shows_checked,
                        updates_found = excluded.updates_found,
                        last_error = excluded.last_error,
                        updated_at = excluded.updated_at",
                params![
                    state.worker_id,
                    state.worker_type,
                    state.status.to_string(),
                    format_opt_ts(&state.last_check_time),
                    format_opt_ts(&state.next_check_time),
                    state.shows_checked,
                    state.updates_found,
                    state.last_error,
                    format_ts(&state.created_at),
                    format_ts(&state.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
