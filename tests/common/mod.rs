//! Common test utilities
//!
//! Shared across the dispatcher integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod platform;
pub mod users;

#[allow(unused_imports)]
pub use fixtures::{callback, photo_message, png_bytes, text_message, Harness, CHAT, USER};
#[allow(unused_imports)]
pub use platform::{PlatformCall, RecordingPlatform};
#[allow(unused_imports)]
pub use users::MemoryUserStore;
