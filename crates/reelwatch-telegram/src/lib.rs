// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram front end for reelwatch.
//!
//! [`TelegramBot`] long-polls for updates and routes them through
//! [`BotFlows`]; [`TelegramNotifier`] implements [`Notifier`] for the
//! background checker.

pub mod flows;
pub mod handler;
pub mod keyboard;
pub mod markdown;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reelwatch_config::model::TelegramConfig;
use reelwatch_core::{
    AdapterType, HealthStatus, InlineAction, Notifier, PluginAdapter, ReelwatchError, UserId,
};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId, ParseMode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use flows::{BotFlows, Reply};
pub use handler::Command;
pub use keyboard::Callback;

struct BotContext {
    flows: BotFlows,
    allowed_users: Vec<String>,
    bot_name: String,
}

fn bot_from_config(config: &TelegramConfig) -> Result<Bot, ReelwatchError> {
    let token = config.bot_token.as_deref().ok_or_else(|| {
        ReelwatchError::Config("telegram.bot_token is required to run the bot".into())
    })?;
    if token.is_empty() {
        return Err(ReelwatchError::Config(
            "telegram.bot_token cannot be empty".into(),
        ));
    }
    Ok(Bot::new(token))
}

/// The interactive bot: long polling plus command routing.
pub struct TelegramBot {
    bot: Bot,
    config: TelegramConfig,
}

impl TelegramBot {
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, ReelwatchError> {
        let bot = bot_from_config(&config)?;
        Ok(Self { bot, config })
    }

    /// A notifier sharing this bot's connection.
    pub fn notifier(&self) -> TelegramNotifier {
        TelegramNotifier {
            bot: self.bot.clone(),
        }
    }

    /// Polls for updates until `cancel` fires.
    pub async fn run(
        &self,
        flows: BotFlows,
        cancel: CancellationToken,
    ) -> Result<(), ReelwatchError> {
        let me = self.bot.get_me().await.map_err(|e| ReelwatchError::Channel {
            message: format!("failed to reach Telegram: {e}"),
            source: Some(Box::new(e)),
        })?;
        let bot_name = me.username().to_string();
        info!(bot = %bot_name, "starting Telegram long polling");

        let ctx = Arc::new(BotContext {
            flows,
            allowed_users: self.config.allowed_users.clone(),
            bot_name,
        });

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![ctx])
            .default_handler(|_| async {})
            .build();

        let shutdown = dispatcher.shutdown_token();
        let watcher = tokio::spawn(async move {
            cancel.cancelled().await;
            // Fails while the dispatcher is still starting up; retry until it runs.
            loop {
                match shutdown.shutdown() {
                    Ok(stopped) => {
                        stopped.await;
                        break;
                    }
                    Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
                }
            }
        });

        dispatcher.dispatch().await;
        watcher.abort();
        info!("Telegram long polling stopped");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelwatchError> {
        Ok(ping(&self.bot).await)
    }

    async fn shutdown(&self) -> Result<(), ReelwatchError> {
        debug!("Telegram bot shutting down");
        Ok(())
    }
}

async fn ping(bot: &Bot) -> HealthStatus {
    match bot.get_me().await {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => HealthStatus::Unhealthy(format!("Telegram bot unreachable: {e}")),
    }
}

async fn on_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    if !handler::is_dm(&msg) {
        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
        return Ok(());
    }
    if !handler::is_authorized(msg.from.as_ref(), &ctx.allowed_users) {
        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
        return Ok(());
    }
    let Some(text) = msg.text() else {
        debug!(msg_id = msg.id.0, "ignoring non-text message");
        return Ok(());
    };

    let user_id: UserId = msg.chat.id.0;
    let reply = match Command::parse_text(text, &ctx.bot_name) {
        Some(command) => {
            debug!(user_id, ?command, "command received");
            ctx.flows.handle_command(user_id, command).await
        }
        None if text.starts_with('/') => ctx.flows.handle_command(user_id, Command::Help).await,
        None => ctx.flows.handle_text(user_id, text).await,
    };
    deliver(&bot, msg.chat.id, None, reply).await;
    Ok(())
}

async fn on_callback(bot: Bot, query: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, "failed to answer callback query");
    }
    if !handler::is_authorized(Some(&query.from), &ctx.allowed_users) {
        debug!(user = query.from.id.0, "ignoring unauthorized callback");
        return Ok(());
    }
    let (Some(data), Some(message)) = (query.data.as_deref(), query.message.as_ref()) else {
        return Ok(());
    };

    let chat_id = message.chat().id;
    let reply = ctx.flows.handle_callback(chat_id.0, data).await;
    deliver(&bot, chat_id, Some(message.id()), reply).await;
    Ok(())
}

/// Sends or edits a reply as MarkdownV2, retrying as plain text when
/// Telegram rejects the markup.
async fn deliver(bot: &Bot, chat_id: ChatId, origin: Option<MessageId>, reply: Reply) {
    let markup = keyboard::to_markup(&reply.keyboard);

    let result = match origin.filter(|_| reply.edit) {
        Some(message_id) => {
            let formatted = bot
                .edit_message_text(chat_id, message_id, &reply.text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(markup.clone())
                .await;
            match formatted {
                Ok(_) => Ok(()),
                Err(e) if e.to_string().contains("message is not modified") => Ok(()),
                Err(e) => {
                    warn!(error = %e, "MarkdownV2 edit failed, retrying as plain text");
                    bot.edit_message_text(chat_id, message_id, markdown::to_plain(&reply.text))
                        .reply_markup(markup)
                        .await
                        .map(|_| ())
                }
            }
        }
        None => {
            let formatted = bot
                .send_message(chat_id, &reply.text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(markup.clone())
                .await;
            match formatted {
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!(error = %e, "MarkdownV2 failed, sending as plain text");
                    bot.send_message(chat_id, markdown::to_plain(&reply.text))
                        .reply_markup(markup)
                        .await
                        .map(|_| ())
                }
            }
        }
    };

    if let Err(e) = result {
        warn!(chat_id = chat_id.0, error = %e, "failed to deliver reply");
    }
}

/// [`Notifier`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, ReelwatchError> {
        Ok(Self {
            bot: bot_from_config(config)?,
        })
    }
}

fn channel_error(what: &str, e: teloxide::RequestError) -> ReelwatchError {
    ReelwatchError::Channel {
        message: format!("failed to send {what}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelwatchError> {
        Ok(ping(&self.bot).await)
    }

    async fn shutdown(&self) -> Result<(), ReelwatchError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_photo(
        &self,
        chat_id: UserId,
        photo: Vec<u8>,
        caption: &str,
        action: Option<InlineAction>,
    ) -> Result<(), ReelwatchError> {
        let request = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::memory(photo))
            .caption(caption);
        let result = match action {
            Some(action) => request.reply_markup(keyboard::to_markup(&[vec![action]])).await,
            None => request.await,
        };
        result.map(|_| ()).map_err(|e| channel_error("photo", e))
    }

    async fn send_text(
        &self,
        chat_id: UserId,
        text: &str,
        action: Option<InlineAction>,
    ) -> Result<(), ReelwatchError> {
        let request = self.bot.send_message(ChatId(chat_id), text);
        let result = match action {
            Some(action) => request.reply_markup(keyboard::to_markup(&[vec![action]])).await,
            None => request.await,
        };
        result.map(|_| ()).map_err(|e| channel_error("message", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
            allowed_users: vec![],
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramBot::new(config(None)).is_err());
        assert!(TelegramNotifier::new(&config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramBot::new(config(Some(""))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let bot = TelegramBot::new(config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11")))
            .unwrap();
        assert_eq!(bot.name(), "telegram");
        assert_eq!(bot.adapter_type(), AdapterType::Channel);
        assert_eq!(bot.notifier().name(), "telegram-notifier");
    }
}
