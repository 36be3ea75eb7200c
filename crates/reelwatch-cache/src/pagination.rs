// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search result pagination.
//!
//! [`PaginationCache`] maps 1-based result ranks to payloads. Clearing swaps
//! in a fresh map, so readers holding the previous snapshot keep a consistent
//! view. [`SearchSessions`] owns one cache plus a page pointer per user.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use reelwatch_core::{SearchItem, SearchKind, UserId};

/// Results shown per page.
pub const PAGE_SIZE: usize = 3;

/// Rank-addressed result cache with copy-on-write updates.
pub struct PaginationCache<T> {
    items: ArcSwap<HashMap<usize, T>>,
}

impl<T: Clone> PaginationCache<T> {
    pub fn new() -> Self {
        Self {
            items: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub fn set(&self, rank: usize, item: T) {
        self.items.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(rank, item.clone());
            next
        });
    }

    /// Store results in order, starting at rank 1.
    pub fn fill(&self, items: impl IntoIterator<Item = T>) {
        let mut next = HashMap::clone(&self.items.load());
        next.extend(items.into_iter().enumerate().map(|(i, item)| (i + 1, item)));
        self.items.store(Arc::new(next));
    }

    pub fn get(&self, rank: usize) -> Option<T> {
        self.items.load().get(&rank).cloned()
    }

    /// Replace the backing map with an empty one.
    pub fn clear(&self) {
        self.items.store(Arc::new(HashMap::new()));
    }

    pub fn len(&self) -> usize {
        self.items.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for PaginationCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of pages needed for `total` results, never less than 1.
pub fn max_page(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// The items of `page` (1-based), in rank order. Missing ranks are skipped.
pub fn paginate<T: Clone>(
    cache: &PaginationCache<T>,
    page: usize,
    total: usize,
    page_size: usize,
) -> Vec<T> {
    paginate_ranked(cache, page, total, page_size)
        .into_iter()
        .map(|(_, item)| item)
        .collect()
}

/// Like [`paginate`], keeping each item's rank.
pub fn paginate_ranked<T: Clone>(
    cache: &PaginationCache<T>,
    page: usize,
    total: usize,
    page_size: usize,
) -> Vec<(usize, T)> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total);
    let snapshot = cache.items.load();
    (start + 1..=end)
        .filter_map(|rank| snapshot.get(&rank).map(|item| (rank, item.clone())))
        .collect()
}

/// Page navigation requested from an inline keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Prev,
}

/// One user's current search.
pub struct SearchSession {
    pub kind: SearchKind,
    pub cache: PaginationCache<SearchItem>,
    pub current_page: usize,
    pub total_count: usize,
}

impl SearchSession {
    pub fn max_page(&self) -> usize {
        max_page(self.total_count, PAGE_SIZE)
    }
}

/// A rendered page of a user's search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub kind: SearchKind,
    pub page: usize,
    pub max_page: usize,
    /// `(rank, item)` pairs shown on this page.
    pub items: Vec<(usize, SearchItem)>,
}

/// Per-user search state.
#[derive(Default)]
pub struct SearchSessions {
    sessions: DashMap<UserId, SearchSession>,
}

impl SearchSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the user's search with `results` and return page 1.
    pub fn install(
        &self,
        user_id: UserId,
        kind: SearchKind,
        results: Vec<SearchItem>,
    ) -> SearchPage {
        if let Some(previous) = self.sessions.get(&user_id) {
            previous.cache.clear();
        }
        let total_count = results.len();
        let cache = PaginationCache::new();
        cache.fill(results);
        self.sessions.insert(
            user_id,
            SearchSession {
                kind,
                cache,
                current_page: 1,
                total_count,
            },
        );
        render(user_id, kind, 1, total_count, &self.sessions).unwrap_or(SearchPage {
            kind,
            page: 1,
            max_page: 1,
            items: Vec::new(),
        })
    }

    /// The user's current page, if a search is installed.
    pub fn page(&self, user_id: UserId) -> Option<SearchPage> {
        let (kind, page, total) = {
            let session = self.sessions.get(&user_id)?;
            (session.kind, session.current_page, session.total_count)
        };
        render(user_id, kind, page, total, &self.sessions)
    }

    /// Move the page pointer, clamped to `[1, max_page]`.
    pub fn navigate(&self, user_id: UserId, nav: Navigation) -> Option<SearchPage> {
        {
            let mut session = self.sessions.get_mut(&user_id)?;
            let max = session.max_page();
            session.current_page = match nav {
                Navigation::Next => (session.current_page + 1).min(max),
                Navigation::Prev => session.current_page.saturating_sub(1).max(1),
            };
        }
        self.page(user_id)
    }

    /// The result at `rank` of the user's current search.
    pub fn get_item(&self, user_id: UserId, rank: usize) -> Option<SearchItem> {
        self.sessions.get(&user_id)?.cache.get(rank)
    }

    pub fn clear(&self, user_id: UserId) {
        if let Some((_, session)) = self.sessions.remove(&user_id) {
            session.cache.clear();
        }
    }
}

fn render(
    user_id: UserId,
    kind: SearchKind,
    page: usize,
    total: usize,
    sessions: &DashMap<UserId, SearchSession>,
) -> Option<SearchPage> {
    let session = sessions.get(&user_id)?;
    Some(SearchPage {
        kind,
        page,
        max_page: max_page(total, PAGE_SIZE),
        items: paginate_ranked(&session.cache, page, total, PAGE_SIZE),
    })
}
