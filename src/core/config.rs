use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: watermark.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "watermark.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: watermark-bot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "watermark-bot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server (local telegram-bot-api)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("BOT_API_URL"));

/// Public base URL for Telegram updates
/// Read from WEBHOOK_URL environment variable; updates are delivered to `<url>/api/webhook`
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("WEBHOOK_URL"));

/// Local address the webhook listener binds to
/// Read from WEBHOOK_ADDR environment variable
/// Default: 0.0.0.0:8080
pub static WEBHOOK_ADDR: Lazy<String> =
    Lazy::new(|| env::var("WEBHOOK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()));

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Webhook path appended to WEBHOOK_URL
pub const WEBHOOK_PATH: &str = "/api/webhook";

/// Watermark rendering configuration
pub mod render {
    /// JPEG quality of the composited result (1-100)
    pub const JPEG_QUALITY: u8 = 90;
}

/// Pending-photo cache configuration
pub mod pending {
    use once_cell::sync::Lazy;
    use std::env;

    /// Default number of pending photos kept for follow-up buttons
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Read from PENDING_PHOTO_CAPACITY environment variable
    pub static CAPACITY: Lazy<usize> = Lazy::new(|| {
        env::var("PENDING_PHOTO_CAPACITY")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|capacity| *capacity > 0)
            .unwrap_or(DEFAULT_CAPACITY)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher restarts after a panic
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert_eq!(network::timeout(), Duration::from_secs(60));
        assert_eq!(retry::dispatcher_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_pending_capacity_default() {
        assert_eq!(pending::DEFAULT_CAPACITY, 100);
        assert!(*pending::CAPACITY > 0);
    }
}
