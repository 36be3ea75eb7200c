// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worker task audit log.
//!
//! Every unit of work gets a row created in `running` state and closed once.
//! Rows left in `running` after a crash are swept by [`close_interrupted_tasks`].

use chrono::{DateTime, Utc};
use reelwatch_core::{ReelwatchError, TaskStatus};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::database::Database;
use crate::models::{WorkerTask, format_opt_ts, format_ts, get_enum, get_opt_ts, get_ts};

/// Error message recorded on tasks closed by crash recovery.
pub const INTERRUPTED: &str = "interrupted";

const TASK_COLUMNS: &str = "id, worker_id, task_type, status, start_time, end_time, duration_ms,
                            user_id, show_id, shows_checked, updates_found, error";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<WorkerTask> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    Ok(WorkerTask {
        id,
        worker_id: row.get(1)?,
        task_type: get_enum(row, 2)?,
        status: get_enum(row, 3)?,
        start_time: get_ts(row, 4)?,
        end_time: get_opt_ts(row, 5)?,
        duration_ms: row.get(6)?,
        user_id: row.get(7)?,
        show_id: row.get(8)?,
        shows_checked: row.get(9)?,
        updates_found: row.get(10)?,
        error: row.get(11)?,
    })
}

fn write_closed(conn: &Connection, task: &WorkerTask) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE worker_tasks
         SET status = ?2, end_time = ?3, duration_ms = ?4,
             shows_checked = ?5, updates_found = ?6, error = ?7
         WHERE id = ?1",
        params![
            task.id.to_string(),
            task.status.to_string(),
            format_opt_ts(&task.end_time),
            task.duration_ms,
            task.shows_checked,
            task.updates_found,
            task.error,
        ],
    )
}

/// Insert a new task row.
pub async fn create_task(db: &Database, task: &WorkerTask) -> Result<(), ReelwatchError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO worker_tasks (id, worker_id, task_type, status, start_time, end_time,
                        duration_ms, user_id, show_id, shows_checked, updates_found, error)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    task.id.to_string(),
                    task.worker_id,
                    task.task_type.to_string(),
                    task.status.to_string(),
                    format_ts(&task.start_time),
                    format_opt_ts(&task.end_time),
                    task.duration_ms,
                    task.user_id,
                    task.show_id,
                    task.shows_checked,
                    task.updates_found,
                    task.error,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist the outcome of a task.
///
/// Only rows still in `running` are written, so a closed task is never
/// mutated again.
pub async fn update_task(db: &Database, task: &WorkerTask) -> Result<(), ReelwatchError> {
    let task = task.clone();
    let id = task.id;
    let changed = db
        .connection()
        .call(move |conn| {
            let current: Option<String> = conn
                .query_row(
                    "SELECT status FROM worker_tasks WHERE id = ?1",
                    params![task.id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            match current.as_deref() {
                Some("running") => write_closed(conn, &task),
                _ => Ok(0),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(ReelwatchError::storage(format!(
            "task {id} does not exist or is already closed"
        )));
    }
    Ok(())
}

/// Load a task by id.
pub async fn get_task(db: &Database, id: Uuid) -> Result<Option<WorkerTask>, ReelwatchError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM worker_tasks WHERE id = ?1"),
                params![id.to_string()],
                task_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent tasks of a worker, newest first.
pub async fn list_tasks(
    db: &Database,
    worker_id: &str,
    limit: i64,
) -> Result<Vec<WorkerTask>, ReelwatchError> {
    let worker_id = worker_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM worker_tasks
                 WHERE worker_id = ?1 ORDER BY start_time DESC, rowid DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![worker_id, limit], task_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Close every task a previous process left in `running` as an error.
pub async fn close_interrupted_tasks(
    db: &Database,
    worker_id: &str,
    now: DateTime<Utc>,
) -> Result<usize, ReelwatchError> {
    let worker_id = worker_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let open = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM worker_tasks
                     WHERE worker_id = ?1 AND status = ?2"
                ))?;
                let rows = stmt.query_map(
                    params![worker_id, TaskStatus::Running.to_string()],
                    task_from_row,
                )?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            for mut task in open.iter().cloned() {
                task.close(Some(INTERRUPTED.to_string()), now);
                write_closed(&tx, &task)?;
            }
            tx.commit()?;
            Ok(open.len())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use reelwatch_core::TaskType;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn create_close_and_get() {
        let (db, _dir) = setup_db().await;

        let mut task = WorkerTask::start("w", TaskType::CheckShow, t(0)).for_show(1, 1399);
        create_task(&db, &task).await.unwrap();

        let stored = get_task(&db, task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Running);
        assert_eq!(stored.show_id, Some(1399));

        task.shows_checked = 1;
        task.updates_found = 1;
        task.close(None, t(2));
        update_task(&db, &task).await.unwrap();

        let stored = get_task(&db, task.id).await.unwrap().unwrap();
        assert_eq!(stored, task);
        assert_eq!(stored.duration_ms, Some(120_000));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn closed_task_is_never_rewritten() {
        let (db, _dir) = setup_db().await;

        let mut task = WorkerTask::start("w", TaskType::CheckAllShows, t(0));
        create_task(&db, &task).await.unwrap();
        task.close(None, t(1));
        update_task(&db, &task).await.unwrap();

        let mut forged = task.clone();
        forged.status = TaskStatus::Error;
        forged.error = Some("late".to_string());
        assert!(update_task(&db, &forged).await.is_err());

        let stored = get_task(&db, task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Success);
        assert!(stored.error.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_tasks_newest_first_with_limit() {
        let (db, _dir) = setup_db().await;
        for minute in 0..5 {
            create_task(&db, &WorkerTask::start("w", TaskType::CheckShow, t(minute)))
                .await
                .unwrap();
        }
        create_task(&db, &WorkerTask::start("other", TaskType::CheckShow, t(10)))
            .await
            .unwrap();

        let tasks = list_tasks(&db, "w", 3).await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].start_time, t(4));
        assert_eq!(tasks[2].start_time, t(2));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn interrupted_tasks_are_closed_as_errors() {
        let (db, _dir) = setup_db().await;

        let left_open = WorkerTask::start("w", TaskType::CheckAllShows, t(0));
        create_task(&db, &left_open).await.unwrap();
        let mut done = WorkerTask::start("w", TaskType::CheckShow, t(0));
        create_task(&db, &done).await.unwrap();
        done.close(None, t(1));
        update_task(&db, &done).await.unwrap();
        let other_worker = WorkerTask::start("other", TaskType::CheckShow, t(0));
        create_task(&db, &other_worker).await.unwrap();

        let closed = close_interrupted_tasks(&db, "w", t(30)).await.unwrap();
        assert_eq!(closed, 1);

        let swept = get_task(&db, left_open.id).await.unwrap().unwrap();
        assert_eq!(swept.status, TaskStatus::Error);
        assert_eq!(swept.error.as_deref(), Some(INTERRUPTED));
        assert_eq!(swept.end_time, Some(t(30)));
        assert_eq!(swept.duration_ms, Some(30 * 60 * 1000));

        assert_eq!(get_task(&db, done.id).await.unwrap().unwrap().status, TaskStatus::Success);
        assert_eq!(
            get_task(&db, other_worker.id).await.unwrap().unwrap().status,
            TaskStatus::Running
        );

        assert_eq!(close_interrupted_tasks(&db, "w", t(31)).await.unwrap(), 0);
        db.close().await.unwrap();
    }
}
