//! Test fixtures
//!
//! [`Harness`] wires a [`WatermarkDispatcher`] to in-memory stores and a
//! [`RecordingPlatform`], so scenarios can run without Telegram or SQLite.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use teloxide::types::{CallbackQueryId, ChatId, MessageId, UserId};
use watermark_bot::session::{PendingPhotoCache, SessionState, SessionStore};
use watermark_bot::telegram::{InboundCallback, InboundEvent, InboundMessage};
use watermark_bot::{InMemoryPendingPhotos, InMemorySessionStore, WatermarkDispatcher};

use super::{MemoryUserStore, RecordingPlatform};

pub const USER: UserId = UserId(42);
pub const CHAT: ChatId = ChatId(4242);

/// PNG of the given size filled with one color.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn text_message(text: &str) -> InboundEvent {
    InboundEvent::Message(InboundMessage {
        user: USER,
        chat: CHAT,
        text: Some(text.to_string()),
        photo: None,
    })
}

pub fn photo_message(file_ref: &str) -> InboundEvent {
    InboundEvent::Message(InboundMessage {
        user: USER,
        chat: CHAT,
        text: None,
        photo: Some(file_ref.to_string()),
    })
}

/// Callback pressed on message `message_id` of the test chat.
pub fn callback(data: &str, message_id: i32) -> InboundEvent {
    InboundEvent::Callback(InboundCallback {
        id: CallbackQueryId(format!("cb-{}", data)),
        user: USER,
        chat: Some(CHAT),
        message_id: Some(MessageId(message_id)),
        data: data.to_string(),
    })
}

pub struct Harness {
    pub platform: Arc<RecordingPlatform>,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub pending: Arc<InMemoryPendingPhotos>,
    pub dispatcher: WatermarkDispatcher,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_platform(RecordingPlatform::new())
    }

    pub fn with_platform(platform: RecordingPlatform) -> Self {
        let platform = Arc::new(platform);
        let users = Arc::new(MemoryUserStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let pending = Arc::new(InMemoryPendingPhotos::default());
        let dispatcher = WatermarkDispatcher::new(platform.clone(), users.clone(), sessions.clone(), pending.clone());

        // 400x300 photo, 200x50 watermark: the band is 400x100.
        platform.add_file("photo-1", png_bytes(400, 300, [0, 0, 255, 255]));
        platform.add_file("photo-2", png_bytes(400, 300, [0, 255, 0, 255]));
        platform.add_file("mark-1", png_bytes(200, 50, [255, 0, 0, 255]));
        platform.add_file("mark-2", png_bytes(200, 50, [255, 255, 0, 255]));

        Self {
            platform,
            users,
            sessions,
            pending,
            dispatcher,
        }
    }

    pub async fn send(&self, event: InboundEvent) {
        self.dispatcher.dispatch(event).await;
    }

    pub async fn state(&self) -> SessionState {
        self.sessions.get(USER).await
    }

    /// Runs `/start` and uploads `mark_ref` as the watermark.
    pub async fn onboard(&self, mark_ref: &str) {
        self.send(text_message("/start")).await;
        self.send(photo_message(mark_ref)).await;
        self.platform.clear();
    }

    /// Sends a photo and returns the token carried by its result buttons.
    pub async fn watermark_photo(&self, photo_ref: &str) -> String {
        self.send(photo_message(photo_ref)).await;
        let (_, _, keyboard) = self.platform.photos().pop().expect("no photo was sent");
        let keyboard = keyboard.expect("result has no buttons");
        keyboard.callback_data()[0].trim_start_matches("customize_").to_string()
    }

    pub async fn pending_photo(&self, token: &str) -> Option<String> {
        self.pending.get(&token.into()).await
    }
}

impl Harness {
    /// Puts the user mid-way through a watermark change for `token`.
    pub async fn sessions_set_changing(&self, token: &str) {
        self.sessions
            .set(USER, SessionState::ChangingWatermark(token.into()))
            .await;
    }
}
