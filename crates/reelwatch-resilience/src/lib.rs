// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for reelwatch.
//!
//! Currently a token-bucket [`RateLimiter`] shared by the background show
//! checker's workers to bound the request rate against the metadata provider.

pub mod rate_limiter;

pub use rate_limiter::RateLimiter;
