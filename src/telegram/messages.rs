//! User-facing texts

use indoc::indoc;

use crate::watermark::Anchor;

pub const ONBOARDING: &str = indoc! {"
    Welcome to the Watermark Bot! 🖼️

    I'll help you add watermarks to your photos.

    To get started, please send me an image that you'd like to use as your watermark \
    (preferably a PNG with transparent background)."};

pub const WATERMARK_SAVED: &str = indoc! {"
    Perfect! ✅ Your watermark has been set.

    Now send me any photo and I'll add your watermark to it!"};

pub const WATERMARK_REQUIRED: &str =
    "You don't have a watermark set yet. Please send me an image to use as your watermark first.";

pub const SEND_WATERMARK_IMAGE: &str = "Please send me an image file to use as your watermark.";
pub const SEND_NEW_WATERMARK_IMAGE: &str = "Please send me an image file to use as your new watermark.";
pub const HELP: &str = "Send me a photo to add your watermark, or use /start to see your options.";

pub const NEW_WATERMARK_PROMPT: &str =
    "Please send me a new image to use as your watermark (preferably a PNG with transparent background).";
pub const WATERMARK_UPDATED: &str = "✅ Watermark updated successfully!";

pub const ORIGINAL_PHOTO_MISSING: &str = "Original photo not found. Please try processing a new photo.";
pub const USER_DATA_MISSING: &str = "User data not found. Please try /start again.";

pub const ACK_CHOOSE_POSITION: &str = "Choose watermark position:";
pub const ACK_POSITION_UPDATED: &str = "Position updated!";
pub const ACK_SEND_NEW_WATERMARK: &str = "Please send me a new watermark image.";
pub const ACK_PHOTO_MISSING: &str = "Photo not found. Please try again.";
pub const ACK_FAILED: &str = "Error occurred. Please try again.";

pub const BUTTON_CUSTOMIZE: &str = "🎨 Customize Position";
pub const BUTTON_CHANGE_WATERMARK: &str = "🔄 Change Watermark";

/// HTML-formatted greeting for users who already have a watermark.
pub fn welcome_back(anchor: Anchor) -> String {
    format!(
        "Welcome back! 🎉\n\nYour watermark is set to position: <b>{}</b>\n\n\
         Send me a photo to add your watermark, or send a new image to update your watermark.",
        anchor
    )
}

pub fn caption_result(anchor: Anchor) -> String {
    format!("Here's your photo with watermark! Position: {}", anchor)
}

pub fn caption_repositioned(anchor: Anchor) -> String {
    format!("Updated! Watermark position: {}", anchor)
}

pub fn caption_new_watermark(anchor: Anchor) -> String {
    format!("Updated! New watermark applied. Position: {}", anchor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_back_names_anchor() {
        assert!(welcome_back(Anchor::TopRight).contains("<b>top-right</b>"));
    }

    #[test]
    fn test_onboarding_mentions_png() {
        assert!(ONBOARDING.starts_with("Welcome to the Watermark Bot!"));
        assert!(ONBOARDING.contains("PNG with transparent background"));
    }
}
