// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound chat notifications.

use async_trait::async_trait;

use crate::error::ReelwatchError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InlineAction, UserId};

/// Sends messages to a user's chat.
///
/// Delivery is fire-and-forget from the caller's point of view: failures are
/// returned so they can be logged, but nobody retries them.
#[async_trait]
pub trait Notifier: PluginAdapter {
    async fn send_photo(
        &self,
        chat_id: UserId,
        photo: Vec<u8>,
        caption: &str,
        action: Option<InlineAction>,
    ) -> Result<(), ReelwatchError>;

    async fn send_text(
        &self,
        chat_id: UserId,
        text: &str,
        action: Option<InlineAction>,
    ) -> Result<(), ReelwatchError>;
}
