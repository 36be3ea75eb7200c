// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 escaping for Telegram Bot API.
//!
//! Everything interpolated into a reply (titles, overviews, user input) goes
//! through [`escape`]; only the formatting the bot adds itself is left raw.

/// Characters that must be escaped in MarkdownV2.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// Escapes `text` so it renders literally in MarkdownV2.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `text` in bold, escaped.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape(text))
}

/// `text` in italics, escaped.
pub fn italic(text: &str) -> String {
    format!("_{}_", escape(text))
}

/// Shortens `text` to at most `max` characters, ending with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Reverses the formatting of a MarkdownV2 string for a plain-text resend.
///
/// Escaped characters are kept literally; bare `*` and `_` markers are dropped.
pub fn to_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '*' | '_' => {}
            _ => out.push(ch),
        }
    }
    out
}
