// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboard callbacks.
//!
//! Callback data is a short `verb:arg[:arg]` string, well under Telegram's
//! 64-byte limit.

use std::fmt;

use reelwatch_cache::{Navigation, SearchPage};
use reelwatch_core::{InlineAction, SearchItem};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// A decoded inline button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Page(Navigation),
    /// Track the TV show at this search rank.
    Track(usize),
    /// Mark the movie at this search rank as watched.
    Watched(usize),
    /// Add the title at this search rank to the watchlist.
    Later(usize),
    /// Confirm `seasons` watched seasons of a show, from a notification.
    Seen { show_id: i64, seasons: i32 },
}

impl Callback {
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        let verb = parts.next()?;
        let first = parts.next()?;
        let second = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (verb, second) {
            ("page", None) => match first {
                "next" => Some(Callback::Page(Navigation::Next)),
                "prev" => Some(Callback::Page(Navigation::Prev)),
                _ => None,
            },
            ("track", None) => first.parse().ok().map(Callback::Track),
            ("watched", None) => first.parse().ok().map(Callback::Watched),
            ("later", None) => first.parse().ok().map(Callback::Later),
            ("seen", Some(seasons)) => Some(Callback::Seen {
                show_id: first.parse().ok()?,
                seasons: seasons.parse().ok()?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Page(Navigation::Next) => f.write_str("page:next"),
            Callback::Page(Navigation::Prev) => f.write_str("page:prev"),
            Callback::Track(rank) => write!(f, "track:{rank}"),
            Callback::Watched(rank) => write!(f, "watched:{rank}"),
            Callback::Later(rank) => write!(f, "later:{rank}"),
            Callback::Seen { show_id, seasons } => write!(f, "seen:{show_id}:{seasons}"),
        }
    }
}

fn action(label: impl Into<String>, callback: Callback) -> InlineAction {
    InlineAction::new(label, callback.to_string())
}

/// Buttons for one search result page: one row per item, then navigation.
pub fn page_keyboard(page: &SearchPage) -> Vec<Vec<InlineAction>> {
    let mut rows: Vec<Vec<InlineAction>> = page
        .items
        .iter()
        .map(|(rank, item)| match item {
            SearchItem::Movie(_) => vec![
                action(format!("✅ Watched #{rank}"), Callback::Watched(*rank)),
                action(format!("🕒 Later #{rank}"), Callback::Later(*rank)),
            ],
            SearchItem::Show(_) => vec![
                action(format!("📺 Track #{rank}"), Callback::Track(*rank)),
                action(format!("🕒 Later #{rank}"), Callback::Later(*rank)),
            ],
        })
        .collect();

    if page.max_page > 1 {
        let mut nav = Vec::new();
        if page.page > 1 {
            nav.push(action("« Prev", Callback::Page(Navigation::Prev)));
        }
        if page.page < page.max_page {
            nav.push(action("Next »", Callback::Page(Navigation::Next)));
        }
        rows.push(nav);
    }
    rows
}

/// Converts button rows into a Telegram inline keyboard.
pub fn to_markup(rows: &[Vec<InlineAction>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|a| InlineKeyboardButton::callback(a.label.clone(), a.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelwatch_core::{MovieSummary, SearchKind, ShowSummary};

    #[test]
    fn parses_every_callback() {
        assert_eq!(Callback::parse("page:next"), Some(Callback::Page(Navigation::Next)));
        assert_eq!(Callback::parse("page:prev"), Some(Callback::Page(Navigation::Prev)));
        assert_eq!(Callback::parse("track:4"), Some(Callback::Track(4)));
        assert_eq!(Callback::parse("watched:1"), Some(Callback::Watched(1)));
        assert_eq!(Callback::parse("later:2"), Some(Callback::Later(2)));
        assert_eq!(
            Callback::parse("seen:1399:8"),
            Some(Callback::Seen {
                show_id: 1399,
                seasons: 8
            })
        );
    }

    #[test]
    fn rejects_malformed_data() {
        for data in ["", "page", "page:up", "track:x", "seen:1", "seen:a:2", "later:1:2", "x:1"] {
            assert_eq!(Callback::parse(data), None, "{data}");
        }
    }

    #[test]
    fn display_matches_parse() {
        for cb in [
            Callback::Page(Navigation::Next),
            Callback::Track(3),
            Callback::Seen {
                show_id: 5,
                seasons: 2,
            },
        ] {
            assert_eq!(Callback::parse(&cb.to_string()), Some(cb));
        }
    }

    fn page(items: Vec<(usize, SearchItem)>, page: usize, max_page: usize) -> SearchPage {
        SearchPage {
            kind: SearchKind::Movie,
            page,
            max_page,
            items,
        }
    }

    fn movie(id: i64) -> SearchItem {
        SearchItem::Movie(MovieSummary {
            id,
            title: "M".into(),
            release_date: None,
            overview: None,
            poster_path: None,
            vote_average: None,
        })
    }

    #[test]
    fn middle_page_has_both_arrows() {
        let rows = page_keyboard(&page(vec![(4, movie(1))], 2, 3));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].callback_data, "watched:4");
        assert_eq!(rows[0][1].callback_data, "later:4");
        let nav: Vec<_> = rows[1].iter().map(|a| a.callback_data.as_str()).collect();
        assert_eq!(nav, vec!["page:prev", "page:next"]);
    }

    #[test]
    fn single_page_has_no_navigation() {
        let show = SearchItem::Show(ShowSummary {
            id: 9,
            name: "S".into(),
            first_air_date: None,
            overview: None,
            poster_path: None,
            vote_average: None,
        });
        let rows = page_keyboard(&page(vec![(1, show)], 1, 1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].callback_data, "track:1");
    }
}
