use std::sync::Arc;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use teloxide::types::UserId;

use super::migrations::run_migrations;
use super::UserStore;
use crate::core::error::AppResult;
use crate::watermark::Anchor;

/// A user's watermark settings as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Telegram user id, stored as text
    pub user_id: String,
    /// Telegram file id of the watermark image
    pub watermark_file_id: Option<String>,
    /// Current anchor; unknown stored values read back as `bottom`
    pub watermark_position: Anchor,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRecord {
    pub fn has_watermark(&self) -> bool {
        self.watermark_file_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and applies the
/// embedded migrations on the first connection.
///
/// # Example
///
/// ```no_run
/// use watermark_bot::storage::create_pool;
///
/// let pool = create_pool("watermark.sqlite")?;
/// # Ok::<(), watermark_bot::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

/// [`UserStore`] backed by SQLite.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: Arc<DbPool>,
}

impl SqliteUserStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn get(&self, user: UserId) -> AppResult<Option<UserRecord>> {
        let conn = get_connection(&self.pool)?;
        let record = conn
            .query_row(
                "SELECT user_id, watermark_file_id, watermark_position, created_at, updated_at
                 FROM users WHERE user_id = ?1",
                [user.0.to_string()],
                |row| {
                    let position: Option<String> = row.get(2)?;
                    Ok(UserRecord {
                        user_id: row.get(0)?,
                        watermark_file_id: row.get(1)?,
                        watermark_position: position.as_deref().map(Anchor::from_tag_lossy).unwrap_or_default(),
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    async fn upsert_watermark(&self, user: UserId, file_ref: &str, anchor: Anchor) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO users (user_id, watermark_file_id, watermark_position, updated_at)
             VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
             ON CONFLICT(user_id) DO UPDATE SET
                 watermark_file_id = excluded.watermark_file_id,
                 watermark_position = excluded.watermark_position,
                 updated_at = CURRENT_TIMESTAMP",
            params![user.0.to_string(), file_ref, anchor.as_ref()],
        )?;
        log::info!("Watermark set for user {}", user);
        Ok(())
    }

    async fn update_position(&self, user: UserId, anchor: Anchor) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        let updated = conn.execute(
            "UPDATE users SET watermark_position = ?1, updated_at = CURRENT_TIMESTAMP WHERE user_id = ?2",
            params![anchor.as_ref(), user.0.to_string()],
        )?;
        if updated == 0 {
            log::warn!("Position update for user {} matched no record", user);
        } else {
            log::info!("Position updated for user {} to {}", user, anchor);
        }
        Ok(())
    }
}
