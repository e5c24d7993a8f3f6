use async_trait::async_trait;
use dashmap::DashMap;
use teloxide::types::UserId;

use super::PhotoToken;

/// Which multi-step flow the user is currently inside.
///
/// `None` is never stored; clearing the entry means "no flow".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    None,
    AwaitingWatermark,
    Customizing(PhotoToken),
    ChangingWatermark(PhotoToken),
}

/// Per-user session state, single-key atomic operations only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user: UserId) -> SessionState;
    async fn set(&self, user: UserId, state: SessionState);
    async fn clear(&self, user: UserId);
}

#[derive(Default)]
pub struct InMemorySessionStore {
    states: DashMap<UserId, SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: UserId) -> SessionState {
        self.states.get(&user).map(|s| s.value().clone()).unwrap_or_default()
    }

    async fn set(&self, user: UserId, state: SessionState) {
        if state == SessionState::None {
            self.states.remove(&user);
        } else {
            self.states.insert(user, state);
        }
    }

    async fn clear(&self, user: UserId) {
        self.states.remove(&user);
    }
}
