// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier capturing outbound messages.

use async_trait::async_trait;
use tokio::sync::Mutex;

use reelwatch_core::traits::adapter::PluginAdapter;
use reelwatch_core::traits::notifier::Notifier;
use reelwatch_core::types::{AdapterType, HealthStatus, InlineAction, UserId};
use reelwatch_core::ReelwatchError;

/// One captured outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: UserId,
    /// Photo bytes, `None` for text messages.
    pub photo: Option<Vec<u8>>,
    pub text: String,
    pub action: Option<InlineAction>,
}

/// A notifier that records every send, optionally failing them all.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<bool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages delivered so far.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, chat_id: UserId) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    /// Make every subsequent send fail (nothing is recorded while failing).
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    async fn record(&self, message: SentMessage) -> Result<(), ReelwatchError> {
        if *self.failing.lock().await {
            return Err(ReelwatchError::channel("mock notifier failure"));
        }
        self.sent.lock().await.push(message);
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelwatchError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelwatchError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_photo(
        &self,
        chat_id: UserId,
        photo: Vec<u8>,
        caption: &str,
        action: Option<InlineAction>,
    ) -> Result<(), ReelwatchError> {
        self.record(SentMessage {
            chat_id,
            photo: Some(photo),
            text: caption.to_string(),
            action,
        })
        .await
    }

    async fn send_text(
        &self,
        chat_id: UserId,
        text: &str,
        action: Option<InlineAction>,
    ) -> Result<(), ReelwatchError> {
        self.record(SentMessage {
            chat_id,
            photo: None,
            text: text.to_string(),
            action,
        })
        .await
    }
}
