// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod tracked_shows;
pub mod users;
pub mod watchlist;
pub mod worker_state;
pub mod worker_tasks;
