//! Ephemeral per-process conversation state
//!
//! Both stores are injected into the dispatcher as trait objects so a shared
//! backend can replace the in-memory versions without touching the state machine.
//! Nothing here survives a restart.

pub mod pending;
pub mod state;

pub use pending::{InMemoryPendingPhotos, PendingPhotoCache, PhotoToken};
pub use state::{InMemorySessionStore, SessionState, SessionStore};
