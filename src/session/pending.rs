use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;

/// Short opaque id tying a sent result message back to its source photo.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoToken(String);

impl PhotoToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PhotoToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for PhotoToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PhotoToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Photos waiting for a follow-up action (re-position or new watermark).
#[async_trait]
pub trait PendingPhotoCache: Send + Sync {
    /// Stores `file_ref` under a fresh token that is never handed out again.
    async fn put(&self, file_ref: String) -> PhotoToken;
    async fn get(&self, token: &PhotoToken) -> Option<String>;
}

struct PendingInner {
    entries: HashMap<PhotoToken, String>,
    order: VecDeque<PhotoToken>,
    next_id: u64,
}

/// Bounded in-memory cache evicting in insertion order once `capacity` is exceeded.
///
/// Tokens are `p1`, `p2`, … from a process-lifetime counter.
pub struct InMemoryPendingPhotos {
    inner: Mutex<PendingInner>,
    capacity: usize,
}

impl InMemoryPendingPhotos {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(PendingInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                next_id: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PendingInner> {
        // The map stays consistent even if a holder panicked mid-operation.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Pending photo cache lock was poisoned, recovering...");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for InMemoryPendingPhotos {
    fn default() -> Self {
        Self::new(crate::core::config::pending::DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl PendingPhotoCache for InMemoryPendingPhotos {
    async fn put(&self, file_ref: String) -> PhotoToken {
        let mut inner = self.lock();
        inner.next_id += 1;
        let token = PhotoToken(format!("p{}", inner.next_id));

        inner.entries.insert(token.clone(), file_ref);
        inner.order.push_back(token.clone());

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }

        token
    }

    async fn get(&self, token: &PhotoToken) -> Option<String> {
        self.lock().entries.get(token).cloned()
    }
}
