use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tokio::time::sleep;

use watermark_bot::cli::{Cli, Commands};
use watermark_bot::core::{config, init_logger};
use watermark_bot::session::{InMemoryPendingPhotos, InMemorySessionStore};
use watermark_bot::storage::{create_pool, SqliteUserStore};
use watermark_bot::telegram::{create_bot, schema, setup_bot_commands, Bot, HandlerError, TelegramPlatform};
use watermark_bot::WatermarkDispatcher;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    let cli = Cli::parse_args();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run { webhook }) => {
            log::info!("Running bot (webhook: {})", webhook);
            run_bot(webhook).await
        }
        Some(Commands::Migrate) => {
            create_pool(&config::DATABASE_PATH)?;
            log::info!("Database at {} is up to date", *config::DATABASE_PATH);
            Ok(())
        }
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(false).await
        }
    }
}

async fn run_bot(use_webhook: bool) -> Result<()> {
    log::info!("Starting bot...");

    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let dispatcher = Arc::new(WatermarkDispatcher::new(
        Arc::new(TelegramPlatform::new(bot.clone())),
        Arc::new(SqliteUserStore::new(Arc::clone(&db_pool))),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(InMemoryPendingPhotos::new(*config::pending::CAPACITY)),
    ));
    let handler = schema(dispatcher);

    let webhook_url = if use_webhook { config::WEBHOOK_URL.clone() } else { None };
    if use_webhook && webhook_url.is_none() {
        log::warn!("--webhook given but WEBHOOK_URL is not set, falling back to long polling");
    }

    if let Some(base_url) = webhook_url {
        run_webhook(bot, handler, &base_url).await
    } else {
        run_polling(bot, handler).await;
        Ok(())
    }
}

async fn run_webhook(
    bot: Bot,
    handler: teloxide::dispatching::UpdateHandler<HandlerError>,
    base_url: &str,
) -> Result<()> {
    let address: SocketAddr = config::WEBHOOK_ADDR.parse()?;
    let url = url::Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), config::WEBHOOK_PATH))?;
    log::info!("Starting bot in webhook mode at {} (listening on {})", url, address);

    let listener = webhooks::axum(bot.clone(), webhooks::Options::new(address, url)).await?;

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Long polling with restart after a dispatcher panic.
async fn run_polling(bot: Bot, handler: teloxide::dispatching::UpdateHandler<HandlerError>) {
    log::info!("Starting bot in long polling mode");
    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Panics inside the dispatcher surface through the JoinHandle
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= max_retries {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                log::info!(
                    "Restarting dispatcher after panic (attempt {}/{})...",
                    retry_count,
                    max_retries
                );
                sleep(config::retry::dispatcher_delay()).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }
    }
}
