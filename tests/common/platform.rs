//! Recording [`ChatPlatform`] double

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use teloxide::types::{CallbackQueryId, ChatId, MessageId};
use watermark_bot::telegram::{ChatPlatform, Keyboard, SendOptions};
use watermark_bot::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Text {
        chat: ChatId,
        text: String,
    },
    Photo {
        chat: ChatId,
        bytes: Vec<u8>,
        caption: Option<String>,
        keyboard: Option<Keyboard>,
    },
    EditButtons {
        chat: ChatId,
        message: MessageId,
        keyboard: Keyboard,
    },
    Delete {
        chat: ChatId,
        message: MessageId,
    },
    Ack {
        id: String,
        text: Option<String>,
    },
}

/// Serves files from an in-memory map and records every outgoing call.
#[derive(Default)]
pub struct RecordingPlatform {
    files: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<PlatformCall>>,
    fetches: Mutex<Vec<String>>,
    pub ack_expired: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expired_acks() -> Self {
        Self {
            ack_expired: true,
            ..Self::default()
        }
    }

    pub fn add_file(&self, file_ref: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(file_ref.to_string(), bytes);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn photos(&self) -> Vec<(Vec<u8>, Option<String>, Option<Keyboard>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Photo {
                    bytes,
                    caption,
                    keyboard,
                    ..
                } => Some((bytes, caption, keyboard)),
                _ => None,
            })
            .collect()
    }

    pub fn acks(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Ack { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.fetches.lock().unwrap().clear();
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn fetch_file_bytes(&self, file_ref: &str) -> AppResult<Vec<u8>> {
        self.fetches.lock().unwrap().push(file_ref.to_string());
        self.files
            .lock()
            .unwrap()
            .get(file_ref)
            .cloned()
            .ok_or_else(|| AppError::FileFetch(format!("no such file: {}", file_ref)))
    }

    async fn send_text(&self, chat: ChatId, text: &str, _opts: SendOptions) -> AppResult<()> {
        self.record(PlatformCall::Text {
            chat,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, photo: Vec<u8>, opts: SendOptions) -> AppResult<()> {
        self.record(PlatformCall::Photo {
            chat,
            bytes: photo,
            caption: opts.caption,
            keyboard: opts.keyboard,
        });
        Ok(())
    }

    async fn edit_buttons(&self, chat: ChatId, message: MessageId, keyboard: Keyboard) -> AppResult<()> {
        self.record(PlatformCall::EditButtons { chat, message, keyboard });
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> AppResult<()> {
        self.record(PlatformCall::Delete { chat, message });
        Ok(())
    }

    async fn acknowledge_callback(&self, callback: &CallbackQueryId, text: Option<&str>) -> AppResult<()> {
        if self.ack_expired {
            return Err(AppError::AcknowledgmentExpired("query is too old".to_string()));
        }
        self.record(PlatformCall::Ack {
            id: callback.0.clone(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
