//! Inbound events, reduced from teloxide updates to what the dispatcher needs

use teloxide::types::{CallbackQuery, CallbackQueryId, ChatId, Document, Message, MessageId, PhotoSize, UserId};

#[derive(Debug, Clone)]
pub enum InboundEvent {
    Message(InboundMessage),
    Callback(InboundCallback),
}

impl InboundEvent {
    pub fn user(&self) -> UserId {
        match self {
            InboundEvent::Message(msg) => msg.user,
            InboundEvent::Callback(cb) => cb.user,
        }
    }

    /// Short description for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Message(msg) if msg.photo.is_some() => "photo",
            InboundEvent::Message(_) => "text",
            InboundEvent::Callback(_) => "callback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user: UserId,
    pub chat: ChatId,
    pub text: Option<String>,
    /// File reference of the image carried by the message
    pub photo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InboundCallback {
    pub id: CallbackQueryId,
    pub user: UserId,
    pub chat: Option<ChatId>,
    /// Message the pressed button belongs to
    pub message_id: Option<MessageId>,
    pub data: String,
}

impl InboundMessage {
    /// `None` for messages without a sender or without text and image.
    pub fn from_telegram(msg: &Message) -> Option<Self> {
        let user = msg.from.as_ref()?.id;
        let photo = msg
            .photo()
            .and_then(largest_photo)
            .or_else(|| msg.document().and_then(image_document));
        let text = msg.text().map(str::to_string);

        if photo.is_none() && text.is_none() {
            return None;
        }

        Some(Self {
            user,
            chat: msg.chat.id,
            text,
            photo,
        })
    }
}

impl InboundCallback {
    pub fn from_telegram(q: &CallbackQuery) -> Self {
        Self {
            id: q.id.clone(),
            user: q.from.id,
            chat: q.message.as_ref().map(|m| m.chat().id),
            message_id: q.message.as_ref().map(|m| m.id()),
            data: q.data.clone().unwrap_or_default(),
        }
    }
}

/// Picks the highest-resolution variant of a photo.
pub fn largest_photo(variants: &[PhotoSize]) -> Option<String> {
    variants
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
        .map(|p| p.file.id.0.clone())
}

/// Images sent "as file" keep their alpha channel, so they count as photos too.
fn image_document(doc: &Document) -> Option<String> {
    let is_image = doc
        .mime_type
        .as_ref()
        .is_some_and(|mime| mime.type_() == "image");
    is_image.then(|| doc.file.id.0.clone())
}
