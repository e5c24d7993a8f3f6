//! Conversation state machine
//!
//! Routes every inbound event on (event kind, current session state), talks to the
//! user-record store and the chat platform, and renders watermarked photos. All
//! failures stop at [`WatermarkDispatcher::dispatch`]: they are logged and answered
//! with an apology, never propagated.
//!
//! Events of one user are serialized with a per-user async mutex; different users
//! are handled fully in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::{ChatId, UserId};
use tokio::sync::Mutex;

use super::callback::CallbackAction;
use super::event::{InboundCallback, InboundEvent, InboundMessage};
use super::keyboard::Keyboard;
use super::messages;
use super::platform::{ChatPlatform, SendOptions};
use crate::core::error::{AppError, AppResult};
use crate::session::{PendingPhotoCache, PhotoToken, SessionState, SessionStore};
use crate::storage::{UserRecord, UserStore};
use crate::watermark::{self, Anchor};

pub struct WatermarkDispatcher {
    platform: Arc<dyn ChatPlatform>,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    pending: Arc<dyn PendingPhotoCache>,
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl WatermarkDispatcher {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        pending: Arc<dyn PendingPhotoCache>,
    ) -> Self {
        Self {
            platform,
            users,
            sessions,
            pending,
            user_locks: DashMap::new(),
        }
    }

    /// Handles one inbound event to completion.
    pub async fn dispatch(&self, event: InboundEvent) {
        let user = event.user();
        let lock = self.user_lock(user);
        {
            let _guard = lock.lock().await;
            let state = self.sessions.get(user).await;
            log::info!("Event from user {}: {} (state: {:?})", user, event.kind(), state);

            match event {
                InboundEvent::Message(msg) => {
                    if let Err(e) = self.handle_message(&msg).await {
                        self.report_message_failure(&msg, e).await;
                    }
                }
                InboundEvent::Callback(cb) => {
                    if let Err(e) = self.handle_callback(&cb).await {
                        self.report_callback_failure(&cb, e).await;
                    }
                }
            }
        }
        drop(lock);
        self.release_lock(user);
    }

    fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        Arc::clone(self.user_locks.entry(user).or_default().value())
    }

    fn release_lock(&self, user: UserId) {
        // Only the map holds it now: nobody is waiting for this user.
        self.user_locks.remove_if(&user, |_, lock| Arc::strong_count(lock) == 1);
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    async fn handle_message(&self, msg: &InboundMessage) -> AppResult<()> {
        if let Some(file_ref) = msg.photo.as_deref() {
            self.handle_photo(msg, file_ref).await
        } else if let Some(text) = msg.text.as_deref() {
            self.handle_text(msg, text).await
        } else {
            Ok(())
        }
    }

    async fn handle_text(&self, msg: &InboundMessage, text: &str) -> AppResult<()> {
        if is_start_command(text) {
            return self.handle_start(msg).await;
        }

        let reply = match self.sessions.get(msg.user).await {
            SessionState::AwaitingWatermark => messages::SEND_WATERMARK_IMAGE,
            SessionState::ChangingWatermark(_) => messages::SEND_NEW_WATERMARK_IMAGE,
            SessionState::None | SessionState::Customizing(_) => messages::HELP,
        };
        self.send_text(msg.chat, reply).await
    }

    async fn handle_start(&self, msg: &InboundMessage) -> AppResult<()> {
        match self.watermark_record(msg.user).await? {
            Some(record) => {
                self.platform
                    .send_text(
                        msg.chat,
                        &messages::welcome_back(record.watermark_position),
                        SendOptions::default().html(),
                    )
                    .await
            }
            None => {
                self.sessions.set(msg.user, SessionState::AwaitingWatermark).await;
                self.send_text(msg.chat, messages::ONBOARDING).await
            }
        }
    }

    async fn handle_photo(&self, msg: &InboundMessage, file_ref: &str) -> AppResult<()> {
        match self.sessions.get(msg.user).await {
            SessionState::AwaitingWatermark => {
                let anchor = self.current_anchor(msg.user).await?;
                self.users.upsert_watermark(msg.user, file_ref, anchor).await?;
                self.sessions.clear(msg.user).await;
                self.send_text(msg.chat, messages::WATERMARK_SAVED).await
            }
            SessionState::ChangingWatermark(token) => self.replace_watermark(msg, file_ref, token).await,
            SessionState::None | SessionState::Customizing(_) => self.watermark_new_photo(msg, file_ref).await,
        }
    }

    /// New watermark for a photo the user already had marked.
    ///
    /// The stored anchor is kept: the re-render and later photos use the position
    /// the user picked, not a reset to `bottom`. Users without a record get `bottom`.
    async fn replace_watermark(&self, msg: &InboundMessage, watermark_ref: &str, token: PhotoToken) -> AppResult<()> {
        let Some(photo_ref) = self.pending.get(&token).await else {
            log::warn!("User {} changed watermark for evicted photo {}", msg.user, token);
            self.sessions.clear(msg.user).await;
            return self.send_text(msg.chat, messages::ORIGINAL_PHOTO_MISSING).await;
        };

        let anchor = self.current_anchor(msg.user).await?;
        self.users.upsert_watermark(msg.user, watermark_ref, anchor).await?;
        self.sessions.clear(msg.user).await;

        let rendered = self.render(&photo_ref, watermark_ref, anchor).await?;
        self.platform
            .send_photo(
                msg.chat,
                rendered,
                SendOptions::default()
                    .caption(messages::caption_new_watermark(anchor))
                    .keyboard(Keyboard::result_actions(&token)),
            )
            .await?;
        self.send_text(msg.chat, messages::WATERMARK_UPDATED).await
    }

    async fn watermark_new_photo(&self, msg: &InboundMessage, photo_ref: &str) -> AppResult<()> {
        // A fresh photo always supersedes an unfinished customization.
        self.sessions.clear(msg.user).await;

        let Some(record) = self.watermark_record(msg.user).await? else {
            self.sessions.set(msg.user, SessionState::AwaitingWatermark).await;
            return self.send_text(msg.chat, messages::WATERMARK_REQUIRED).await;
        };
        let watermark_ref = record.watermark_file_id.as_deref().unwrap_or_default();
        let anchor = record.watermark_position;

        let rendered = self.render(photo_ref, watermark_ref, anchor).await?;
        let token = self.pending.put(photo_ref.to_string()).await;
        log::info!("Watermarked photo for user {} stored as {}", msg.user, token);

        self.platform
            .send_photo(
                msg.chat,
                rendered,
                SendOptions::default()
                    .caption(messages::caption_result(anchor))
                    .keyboard(Keyboard::result_actions(&token)),
            )
            .await
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    async fn handle_callback(&self, cb: &InboundCallback) -> AppResult<()> {
        let Some(action) = CallbackAction::parse(&cb.data) else {
            log::warn!("Ignoring unknown callback data {:?} from user {}", cb.data, cb.user);
            self.acknowledge(cb, None).await;
            return Ok(());
        };

        let Some(photo_ref) = self.pending.get(action.token()).await else {
            log::warn!("Callback {:?} from user {} references unknown photo", cb.data, cb.user);
            self.acknowledge(cb, Some(messages::ACK_PHOTO_MISSING)).await;
            return Ok(());
        };

        let (Some(chat), Some(message_id)) = (cb.chat, cb.message_id) else {
            return Err(AppError::StaleReference(format!(
                "callback {:?} has no originating message",
                cb.data
            )));
        };

        match action {
            CallbackAction::Customize { token } => {
                self.sessions.set(cb.user, SessionState::Customizing(token.clone())).await;
                self.platform
                    .edit_buttons(chat, message_id, Keyboard::anchor_grid(&token))
                    .await?;
                self.acknowledge(cb, Some(messages::ACK_CHOOSE_POSITION)).await;
            }
            CallbackAction::SetPosition { anchor, token } => {
                self.users.update_position(cb.user, anchor).await?;
                let Some(record) = self.watermark_record(cb.user).await? else {
                    self.acknowledge(cb, Some(messages::USER_DATA_MISSING)).await;
                    return Ok(());
                };
                let watermark_ref = record.watermark_file_id.as_deref().unwrap_or_default();

                let rendered = self.render(&photo_ref, watermark_ref, anchor).await?;
                self.platform
                    .send_photo(
                        chat,
                        rendered,
                        SendOptions::default()
                            .caption(messages::caption_repositioned(anchor))
                            .keyboard(Keyboard::result_actions(&token)),
                    )
                    .await?;

                if let Err(e) = self.platform.delete_message(chat, message_id).await {
                    log::warn!(
                        "Failed to delete superseded message {} in chat {}: {}",
                        message_id.0,
                        chat,
                        e
                    );
                }
                self.sessions.clear(cb.user).await;
                self.acknowledge(cb, Some(messages::ACK_POSITION_UPDATED)).await;
            }
            CallbackAction::ChangeWatermark { token } => {
                self.sessions.set(cb.user, SessionState::ChangingWatermark(token)).await;
                self.acknowledge(cb, Some(messages::ACK_SEND_NEW_WATERMARK)).await;
                self.send_text(chat, messages::NEW_WATERMARK_PROMPT).await?;
            }
        }
        Ok(())
    }

    /// Best-effort: failures are logged, never retried or shown to the user.
    async fn acknowledge(&self, cb: &InboundCallback, text: Option<&str>) {
        match self.platform.acknowledge_callback(&cb.id, text).await {
            Ok(()) => {}
            Err(e) if e.is_silent() => {
                log::warn!("Callback query already answered or timed out, continuing: {}", e);
            }
            Err(e) => log::warn!("Failed to answer callback query from user {}: {}", cb.user, e),
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// The user's record, only if it carries a watermark.
    async fn watermark_record(&self, user: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.get(user).await?.filter(UserRecord::has_watermark))
    }

    async fn current_anchor(&self, user: UserId) -> AppResult<Anchor> {
        Ok(self
            .users
            .get(user)
            .await?
            .map(|record| record.watermark_position)
            .unwrap_or_default())
    }

    /// Downloads photo and watermark concurrently, then composites off the async runtime.
    async fn render(&self, photo_ref: &str, watermark_ref: &str, anchor: Anchor) -> AppResult<Vec<u8>> {
        let (photo, mark) = tokio::try_join!(
            self.platform.fetch_file_bytes(photo_ref),
            self.platform.fetch_file_bytes(watermark_ref)
        )?;
        Ok(watermark::render_blocking(photo, mark, anchor).await?)
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> AppResult<()> {
        self.platform.send_text(chat, text, SendOptions::default()).await
    }

    async fn report_message_failure(&self, msg: &InboundMessage, err: AppError) {
        log::error!("Error handling message from user {}: {}", msg.user, err);
        if err.is_silent() {
            return;
        }
        if let Err(send_err) = self.send_text(msg.chat, err.user_message()).await {
            log::error!("Error sending error message to chat {}: {}", msg.chat, send_err);
        }
    }

    async fn report_callback_failure(&self, cb: &InboundCallback, err: AppError) {
        log::error!("Error handling callback {:?} from user {}: {}", cb.data, cb.user, err);
        if err.is_silent() {
            return;
        }
        let text = match err {
            AppError::ImageDecode(_) | AppError::InvalidDimensions(_) | AppError::FileFetch(_) => err.user_message(),
            _ => messages::ACK_FAILED,
        };
        self.acknowledge(cb, Some(text)).await;
    }
}

/// `/start`, `/start@bot_name` and `/start <payload>` all count.
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|command| command.split('@').next())
        .is_some_and(|command| command == "/start")
}
