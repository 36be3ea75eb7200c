// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing and update filtering.

use teloxide::types::{ChatKind, Message, User};
use teloxide::utils::command::BotCommands;

/// Bot commands. Arguments are optional; an empty argument makes the bot
/// ask for the value in the next message.
#[derive(BotCommands, Debug, Clone, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "register and check your TMDB token")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "set your TMDB API read access token")]
    Token(String),
    #[command(description = "search for a movie")]
    Movie(String),
    #[command(description = "search for a TV show")]
    Tv(String),
    #[command(description = "list the TV shows you track")]
    Shows,
    #[command(description = "list your watchlist")]
    Watchlist,
}

impl Command {
    /// Parses a `/command args` message, accepting the `@botname` suffix.
    pub fn parse_text(text: &str, bot_name: &str) -> Option<Self> {
        if !text.starts_with('/') {
            return None;
        }
        <Self as BotCommands>::parse(text, bot_name).ok()
    }
}

/// Checks whether `user` may talk to the bot.
///
/// Entries match the numeric user id or the username, with or without the
/// leading `@`, case-insensitively. An empty list admits everyone.
pub fn is_authorized(user: Option<&User>, allowed_users: &[String]) -> bool {
    let Some(user) = user else {
        return false;
    };
    if allowed_users.is_empty() {
        return true;
    }

    let user_id = user.id.0.to_string();
    allowed_users.iter().any(|allowed| {
        if *allowed == user_id {
            return true;
        }
        let wanted = allowed.strip_prefix('@').unwrap_or(allowed);
        user.username
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
    })
}

/// Whether the message comes from a private chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}
