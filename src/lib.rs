//! Watermark Bot - Telegram bot that stamps a personal watermark onto photos
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `storage`: user-record persistence (SQLite)
//! - `watermark`: anchor placement math and image composition
//! - `session`: ephemeral per-user conversation state and pending photos
//! - `telegram`: inbound events, the conversation state machine and the Bot API client

pub mod cli;
pub mod core;
pub mod session;
pub mod storage;
pub mod telegram;
pub mod watermark;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use session::{InMemoryPendingPhotos, InMemorySessionStore};
pub use storage::{create_pool, SqliteUserStore, UserStore};
pub use telegram::{schema, TelegramPlatform, WatermarkDispatcher};
pub use watermark::Anchor;
