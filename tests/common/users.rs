//! In-memory [`UserStore`]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use teloxide::types::UserId;
use watermark_bot::storage::UserRecord;
use watermark_bot::{Anchor, AppError, AppResult, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    records: Mutex<HashMap<UserId, UserRecord>>,
    failing: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a store error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn record(&self, user: UserId) -> Option<UserRecord> {
        self.records.lock().unwrap().get(&user).cloned()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Store("database is locked".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, user: UserId) -> AppResult<Option<UserRecord>> {
        self.check()?;
        Ok(self.record(user))
    }

    async fn upsert_watermark(&self, user: UserId, file_ref: &str, anchor: Anchor) -> AppResult<()> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let record = records.entry(user).or_insert_with(|| UserRecord {
            user_id: user.0.to_string(),
            watermark_file_id: None,
            watermark_position: Anchor::Bottom,
            created_at: "2026-01-01 00:00:00".to_string(),
            updated_at: "2026-01-01 00:00:00".to_string(),
        });
        record.watermark_file_id = Some(file_ref.to_string());
        record.watermark_position = anchor;
        Ok(())
    }

    async fn update_position(&self, user: UserId, anchor: Anchor) -> AppResult<()> {
        self.check()?;
        if let Some(record) = self.records.lock().unwrap().get_mut(&user) {
            record.watermark_position = anchor;
        }
        Ok(())
    }
}
