//! Telegram bot integration and handlers

pub mod bot;
pub mod callback;
pub mod dispatcher;
pub mod event;
pub mod handlers;
pub mod keyboard;
pub mod messages;
pub mod platform;

/// Bot type used throughout the crate
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use callback::CallbackAction;
pub use dispatcher::WatermarkDispatcher;
pub use event::{InboundCallback, InboundEvent, InboundMessage};
pub use handlers::{schema, HandlerError};
pub use keyboard::{Button, Keyboard};
pub use platform::{ChatPlatform, SendOptions, TelegramPlatform};
