// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the reelwatch bot.
//!
//! This crate provides the trait definitions, error type, and domain types
//! shared by every other crate in the workspace. Storage, the metadata
//! provider, and the chat notifier are consumed through the traits defined
//! here so the caches and the show checker can be tested against mocks.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::ReelwatchError;
pub use types::{
    AdapterType, HealthStatus, InlineAction, MovieDetails, MovieSummary, SearchItem, SearchKind,
    ShowDetails, ShowSummary, TaskStatus, TaskType, TrackedShow, User, UserId, WatchedMovie,
    WatchlistEntry, WorkerState, WorkerStatus, WorkerTask,
};

pub use traits::{MetadataProvider, Notifier, PluginAdapter, StorageAdapter};
