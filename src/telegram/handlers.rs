//! Dispatcher schema
//!
//! Thin teloxide handler tree: converts updates into [`InboundEvent`]s and hands
//! them to the [`WatermarkDispatcher`]. Kept separate so integration tests can
//! drive the state machine without teloxide types.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::dispatcher::WatermarkDispatcher;
use super::event::{InboundCallback, InboundEvent, InboundMessage};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Creates the main dispatcher schema for the Telegram bot.
pub fn schema(dispatcher: Arc<WatermarkDispatcher>) -> UpdateHandler<HandlerError> {
    let for_messages = Arc::clone(&dispatcher);
    let for_callbacks = dispatcher;

    dptree::entry()
        .branch(message_handler(for_messages))
        .branch(callback_handler(for_callbacks))
}

fn message_handler(dispatcher: Arc<WatermarkDispatcher>) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |msg: Message| {
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            match InboundMessage::from_telegram(&msg) {
                Some(inbound) => dispatcher.dispatch(InboundEvent::Message(inbound)).await,
                None => log::debug!("Ignoring message {} in chat {}", msg.id.0, msg.chat.id),
            }
            Ok(())
        }
    })
}

fn callback_handler(dispatcher: Arc<WatermarkDispatcher>) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            dispatcher
                .dispatch(InboundEvent::Callback(InboundCallback::from_telegram(&q)))
                .await;
            Ok(())
        }
    })
}
