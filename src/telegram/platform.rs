//! Chat-platform client seam
//!
//! The dispatcher talks to Telegram only through [`ChatPlatform`]; tests swap in a
//! recording implementation.

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, FileId, InlineKeyboardMarkup, InputFile, MessageId, ParseMode};
use teloxide::RequestError;

use super::keyboard::Keyboard;
use super::Bot;
use crate::core::error::{AppError, AppResult};

/// Optional parts of an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub caption: Option<String>,
    pub keyboard: Option<Keyboard>,
    /// Send text with HTML parse mode
    pub html: bool,
}

impl SendOptions {
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Downloads a file by its platform reference.
    async fn fetch_file_bytes(&self, file_ref: &str) -> AppResult<Vec<u8>>;

    async fn send_text(&self, chat: ChatId, text: &str, opts: SendOptions) -> AppResult<()>;

    async fn send_photo(&self, chat: ChatId, photo: Vec<u8>, opts: SendOptions) -> AppResult<()>;

    /// Replaces the inline keyboard of an already sent message.
    async fn edit_buttons(&self, chat: ChatId, message: MessageId, keyboard: Keyboard) -> AppResult<()>;

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> AppResult<()>;

    /// Answers a button press. Fails with `AcknowledgmentExpired` when the query
    /// was already answered or timed out.
    async fn acknowledge_callback(&self, callback: &CallbackQueryId, text: Option<&str>) -> AppResult<()>;
}

/// [`ChatPlatform`] over the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
}

impl TelegramPlatform {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn fetch_file_bytes(&self, file_ref: &str) -> AppResult<Vec<u8>> {
        let file = self
            .bot
            .get_file(FileId(file_ref.to_string()))
            .await
            .map_err(|e| AppError::FileFetch(format!("getFile {}: {}", file_ref, e)))?;

        let mut bytes = Vec::new();
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .map_err(|e| AppError::FileFetch(format!("download {}: {}", file.path, e)))?;

        log::debug!("Fetched {} ({} bytes)", file_ref, bytes.len());
        Ok(bytes)
    }

    async fn send_text(&self, chat: ChatId, text: &str, opts: SendOptions) -> AppResult<()> {
        let mut request = self.bot.send_message(chat, text);
        if opts.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = opts.keyboard.as_ref() {
            request = request.reply_markup(InlineKeyboardMarkup::from(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, photo: Vec<u8>, opts: SendOptions) -> AppResult<()> {
        let mut request = self
            .bot
            .send_photo(chat, InputFile::memory(photo).file_name("watermarked.jpg"));
        if let Some(caption) = opts.caption {
            request = request.caption(caption);
        }
        if opts.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = opts.keyboard.as_ref() {
            request = request.reply_markup(InlineKeyboardMarkup::from(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn edit_buttons(&self, chat: ChatId, message: MessageId, keyboard: Keyboard) -> AppResult<()> {
        self.bot
            .edit_message_reply_markup(chat, message)
            .reply_markup(InlineKeyboardMarkup::from(&keyboard))
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> AppResult<()> {
        self.bot.delete_message(chat, message).await?;
        Ok(())
    }

    async fn acknowledge_callback(&self, callback: &CallbackQueryId, text: Option<&str>) -> AppResult<()> {
        let mut request = self.bot.answer_callback_query(callback.clone());
        if let Some(text) = text {
            request = request.text(text);
        }
        request.await.map_err(classify_ack_error)?;
        Ok(())
    }
}

fn classify_ack_error(err: RequestError) -> AppError {
    if is_expired_ack(&err.to_string()) {
        AppError::AcknowledgmentExpired(err.to_string())
    } else {
        AppError::Telegram(err)
    }
}

/// Bot API wording for callback queries that can no longer be answered.
fn is_expired_ack(description: &str) -> bool {
    let description = description.to_lowercase();
    description.contains("query is too old")
        || description.contains("query id is invalid")
        || description.contains("response timeout expired")
}
