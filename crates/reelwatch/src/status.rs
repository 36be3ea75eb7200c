// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reelwatch status` command implementation.
//!
//! Reads the show checker's persisted state and its most recent tasks
//! straight from the database, so it works whether or not `serve` is running.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use reelwatch_config::ReelwatchConfig;
use reelwatch_core::{ReelwatchError, StorageAdapter, WorkerState, WorkerStatus, WorkerTask};
use serde::Serialize;

use crate::serve::open_storage;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub worker_id: String,
    pub state: Option<WorkerState>,
    pub recent_tasks: Vec<WorkerTask>,
}

/// Format a number of seconds as a short human-readable duration.
fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn describe_next_check(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match next {
        None => "not scheduled".to_string(),
        Some(at) if at <= now => "due now".to_string(),
        Some(at) => format!("in {}", format_duration((at - now).num_seconds())),
    }
}

/// Run the `reelwatch status` command.
pub async fn run_status(
    config: &ReelwatchConfig,
    json: bool,
    plain: bool,
    task_limit: i64,
) -> Result<(), ReelwatchError> {
    let storage = open_storage(config).await?;
    let worker_id = config.checker.worker_id.clone();
    let state = storage.get_worker_state(&worker_id).await?;
    let recent_tasks = storage.list_tasks(&worker_id, task_limit.max(0)).await?;
    storage.close().await?;

    let response = StatusResponse {
        worker_id,
        state,
        recent_tasks,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, Utc::now(), use_color);
    }
    Ok(())
}

fn print_status(response: &StatusResponse, now: DateTime<Utc>, use_color: bool) {
    println!();
    println!("  reelwatch status ({})", response.worker_id);
    println!("  {}", "-".repeat(35));

    let Some(state) = &response.state else {
        println!("    State:    never run");
        println!();
        println!("  Start with: reelwatch serve");
        println!();
        return;
    };

    let label = state.status.to_string();
    if use_color {
        use colored::Colorize;
        let shown = match state.status {
            WorkerStatus::Running => label.yellow(),
            WorkerStatus::Idle => label.green(),
        };
        println!("    State:    {shown}");
    } else {
        println!("    State:    {label}");
    }

    let last = state
        .last_check_time
        .map(|t| format!("{} ago", format_duration((now - t).num_seconds())))
        .unwrap_or_else(|| "never".to_string());
    println!("    Last:     {last}");
    println!("    Next:     {}", describe_next_check(state.next_check_time, now));
    println!(
        "    Totals:   {} shows checked, {} updates found",
        state.shows_checked, state.updates_found
    );
    if let Some(err) = &state.last_error {
        if use_color {
            use colored::Colorize;
            println!("    Error:    {}", err.red());
        } else {
            println!("    Error:    {err}");
        }
    }

    if !response.recent_tasks.is_empty() {
        println!();
        println!("  Recent tasks");
        for task in &response.recent_tasks {
            println!("    {}", task_line(task));
        }
    }
    println!();
}

fn task_line(task: &WorkerTask) -> String {
    let mut line = format!(
        "{} {:<16} {:<8}",
        task.start_time.format("%Y-%m-%d %H:%M:%S"),
        task.task_type.to_string(),
        task.status.to_string()
    );
    if let (Some(user), Some(show)) = (task.user_id, task.show_id) {
        line.push_str(&format!(" user={user} show={show}"));
    }
    if let Some(ms) = task.duration_ms {
        line.push_str(&format!(" {ms}ms"));
    }
    if let Some(err) = &task.error {
        line.push_str(&format!(" error={err}"));
    }
    line
}
