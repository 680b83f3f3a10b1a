//! Error types for the player handle boundary

use thiserror::Error;

use crate::attribute::Attribute;

/// Failure to register a push subscription on a handle
///
/// Always per-attribute and non-fatal: the observer logs it, leaves the
/// attribute unknown, and retries on the next re-target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// The handle rejected the subscription
    #[error("handle rejected subscription for {0}")]
    Rejected(Attribute),

    /// The attribute cannot notify on change; it must be polled
    #[error("{0} is poll-only and cannot be subscribed")]
    NotPushCapable(Attribute),
}

/// Result type for handle operations
pub type Result<T> = std::result::Result<T, SubscribeError>;
