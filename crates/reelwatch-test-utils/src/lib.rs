// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for reelwatch integration tests.
//!
//! Mock adapters and a harness for fast, deterministic tests without
//! external services.
//!
//! # Components
//!
//! - [`MockMetadataProvider`] - scripted show/movie data with injectable failures
//! - [`MockNotifier`] - captures every outbound chat message
//! - [`ManualClock`] - wall clock that only moves when told to
//! - [`TestHarness`] - temp SQLite storage wired to the mocks

pub mod clock;
pub mod harness;
pub mod mock_notifier;
pub mod mock_provider;

pub use clock::ManualClock;
pub use harness::TestHarness;
pub use mock_notifier::{MockNotifier, SentMessage};
pub use mock_provider::MockMetadataProvider;
