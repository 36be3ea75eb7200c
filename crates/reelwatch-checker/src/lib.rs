// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background TV show checker.
//!
//! [`ShowChecker`] periodically compares every tracked show against the
//! metadata provider, notifies owners about new seasons, and persists run
//! bookkeeping so a restart resumes on schedule.

pub mod engine;
pub mod notify;
pub mod pool;
pub mod state;

pub use engine::{CheckerDeps, CycleReport, ShowChecker, startup_delay};
pub use pool::{ShowUnit, Tally, UnitOutcome};
pub use state::WORKER_TYPE;
