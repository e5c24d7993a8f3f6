use thiserror::Error;

use crate::watermark::WatermarkError;

/// Centralized error types for the application
///
/// Every failure inside an event handler is converted to this enum and caught at the
/// dispatcher's per-event boundary, where it is logged and turned into a user-facing reply.
///
/// # Example
///
/// ```no_run
/// use watermark_bot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {} (user sees: {})", err, err.user_message());
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Input bytes could not be decoded as an image
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Decoded image has zero or unavailable width/height
    #[error("Invalid image dimensions: {0}")]
    InvalidDimensions(String),

    /// Downloading a file from the chat platform failed
    #[error("File fetch error: {0}")]
    FileFetch(String),

    /// User-record persistence failed
    #[error("Store error: {0}")]
    Store(String),

    /// A photo token is no longer (or never was) in the pending-photo cache
    #[error("Stale photo reference: {0}")]
    StaleReference(String),

    /// The callback query was already answered or timed out
    #[error("Callback acknowledgment expired: {0}")]
    AcknowledgmentExpired(String),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Text shown to the end user when handling of an event ends with this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::ImageDecode(_) | AppError::InvalidDimensions(_) | AppError::FileFetch(_) => {
                "Sorry, there was an error processing your photo. Please try again."
            }
            AppError::StaleReference(_) => "Photo not found. Please try again.",
            AppError::Store(_) | AppError::AcknowledgmentExpired(_) | AppError::Telegram(_) | AppError::Io(_) => {
                "Sorry, something went wrong. Please try again."
            }
        }
    }

    /// Errors that are logged but never surfaced to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, AppError::AcknowledgmentExpired(_))
    }
}

impl From<WatermarkError> for AppError {
    fn from(err: WatermarkError) -> Self {
        match err {
            WatermarkError::Decode { .. } | WatermarkError::Encode(_) | WatermarkError::Aborted(_) => {
                AppError::ImageDecode(err.to_string())
            }
            WatermarkError::InvalidDimensions { .. } => AppError::InvalidDimensions(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Store(format!("pool: {}", err))
    }
}

impl From<refinery::Error> for AppError {
    fn from(err: refinery::Error) -> Self {
        AppError::Store(format!("migrations: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_and_fetch_errors_share_processing_message() {
        let decode = AppError::ImageDecode("bad".into());
        let fetch = AppError::FileFetch("timeout".into());
        assert_eq!(decode.user_message(), fetch.user_message());
        assert!(decode.user_message().contains("processing your photo"));
    }

    #[test]
    fn test_store_error_is_generic_apology() {
        let err = AppError::Store("disk full".into());
        assert!(err.user_message().starts_with("Sorry, something went wrong"));
        assert!(!err.is_silent());
    }

    #[test]
    fn test_only_ack_expiry_is_silent() {
        assert!(AppError::AcknowledgmentExpired("query is too old".into()).is_silent());
        assert!(!AppError::StaleReference("p1".into()).is_silent());
    }

    #[test]
    fn test_invalid_dimensions_conversion() {
        let err: AppError = WatermarkError::InvalidDimensions { which: "watermark" }.into();
        assert!(matches!(err, AppError::InvalidDimensions(ref m) if m.contains("watermark")));
    }
}
