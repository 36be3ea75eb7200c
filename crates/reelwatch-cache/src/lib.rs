// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory caches backing the interactive bot paths.
//!
//! - [`SessionCache`] - per-user token and search wait state with a TTL
//! - [`PaginationCache`] / [`SearchSessions`] - ranked search results, 3 per page
//! - [`ImageCache`] - bounded cache of transcoded poster JPEGs

pub mod image;
pub mod pagination;
pub mod session;

pub use self::image::{HttpImageSource, ImageCache, ImageCacheError, ImageSource};
pub use pagination::{
    Navigation, PAGE_SIZE, PaginationCache, SearchPage, SearchSession, SearchSessions, max_page,
    paginate, paginate_ranked,
};
pub use session::{AuthTokenState, SearchState, SessionCache, SessionRecord};
