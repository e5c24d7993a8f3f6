//! User-record persistence
//!
//! The dispatcher only sees the [`UserStore`] trait; [`SqliteUserStore`] is the
//! production backend on an r2d2 pool of SQLite connections.

pub mod db;
pub mod migrations;

use async_trait::async_trait;
use teloxide::types::UserId;

use crate::core::error::AppResult;
use crate::watermark::Anchor;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool, SqliteUserStore, UserRecord};

/// Persistent per-user watermark settings. At most one record per user.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates the record or replaces its watermark and anchor.
    async fn upsert_watermark(&self, user: UserId, file_ref: &str, anchor: Anchor) -> AppResult<()>;

    /// Changes the anchor of an existing record; a missing record is left missing.
    async fn update_position(&self, user: UserId, anchor: Anchor) -> AppResult<()>;

    async fn has_watermark(&self, user: UserId) -> AppResult<bool> {
        Ok(self.get(user).await?.is_some_and(|record| record.has_watermark()))
    }
}
