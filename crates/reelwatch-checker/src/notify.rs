// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! New-season notifications.

use reelwatch_core::{InlineAction, ShowDetails, TrackedShow};
use tracing::{debug, warn};

use crate::pool::UnitContext;

/// Callback prefix of the "watched" button attached to notifications.
pub const SEEN_PREFIX: &str = "seen";

pub fn new_season_caption(show: &ShowDetails, watched_seasons: i32) -> String {
    let mut caption = format!(
        "New season of {}!\nSeasons available: {} (you have watched {}).",
        show.name, show.seasons, watched_seasons
    );
    if !show.status.is_empty() {
        caption.push_str(&format!("\nStatus: {}", show.status));
    }
    caption
}

pub fn seen_action(show: &ShowDetails) -> InlineAction {
    InlineAction::new(
        format!("Watched season {}", show.seasons),
        format!("{SEEN_PREFIX}:{}:{}", show.id, show.seasons),
    )
}

/// Tell the owner of `stored` that `live` has grown. Delivery failures are
/// logged only.
pub(crate) async fn notify_new_season(ctx: &UnitContext, stored: &TrackedShow, live: &ShowDetails) {
    let caption = new_season_caption(live, stored.seasons);
    let action = Some(seen_action(live));

    let poster = match (&ctx.images, live.poster_path.as_deref()) {
        (Some(images), Some(path)) => {
            let url = ctx.provider.poster_url(path);
            match images.get_or_fetch(&url).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(show_id = live.id, error = %e, "poster unavailable, sending text");
                    None
                }
            }
        }
        _ => None,
    };

    let sent = match poster {
        Some(bytes) => {
            ctx.notifier
                .send_photo(stored.user_id, bytes, &caption, action)
                .await
        }
        None => ctx.notifier.send_text(stored.user_id, &caption, action).await,
    };

    match sent {
        Ok(()) => debug!(user_id = stored.user_id, show_id = live.id, "new season notification sent"),
        Err(e) => warn!(
            user_id = stored.user_id,
            show_id = live.id,
            error = %e,
            "failed to deliver new season notification"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show() -> ShowDetails {
        ShowDetails {
            id: 1399,
            name: "Severance".into(),
            seasons: 3,
            episodes: 29,
            runtime: 50,
            status: "Returning Series".into(),
            poster_path: None,
            overview: None,
        }
    }

    #[test]
    fn caption_mentions_both_counts() {
        let caption = new_season_caption(&show(), 2);
        assert!(caption.starts_with("New season of Severance!"));
        assert!(caption.contains("Seasons available: 3 (you have watched 2)"));
        assert!(caption.ends_with("Status: Returning Series"));
    }

    #[test]
    fn seen_action_encodes_show_and_seasons() {
        let action = seen_action(&show());
        assert_eq!(action.callback_data, "seen:1399:3");
        assert_eq!(action.label, "Watched season 3");
    }
}
