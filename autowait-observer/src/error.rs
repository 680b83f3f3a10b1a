//! Error types for the observer facade
//!
//! The taxonomy is deliberately narrow: the player and item are trusted
//! collaborators, partial availability surfaces as unknown values, and
//! a teardown race is an invariant rather than an error path.

use thiserror::Error;

/// Errors the [`PlaybackObserver`](crate::PlaybackObserver) facade can return
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverError {
    /// The observer has been torn down
    #[error("observer has been torn down")]
    Detached,

    /// No target has been attached yet
    #[error("no target attached")]
    NoTarget,

    /// The background worker stopped unexpectedly
    #[error("observer worker is gone")]
    WorkerGone,
}

/// Result type for observer operations
pub type Result<T> = std::result::Result<T, ObserverError>;
