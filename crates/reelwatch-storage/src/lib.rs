// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the reelwatch bot.
//!
//! WAL-mode SQLite with embedded migrations and a single writer through
//! `tokio-rusqlite`. Holds user profiles, tracked shows, the watchlist,
//! and the background worker's state and task log.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::*;
