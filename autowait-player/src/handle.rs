//! Handle contract for the external player and item
//!
//! The player and its current item are black boxes to the observer.
//! Each exposes the same narrow capability surface: read the current
//! value of a watched attribute synchronously, and register a change
//! subscription for a push-capable attribute. Subscriptions are guard
//! objects that unregister on drop; a handle must never deliver to a
//! sink after the guard's drop has returned.

use std::sync::Arc;

use crate::attribute::Attribute;
use crate::error::Result;
use crate::value::AttributeValue;

/// Sink a handle delivers change notifications into
///
/// Called synchronously by the handle with the attribute identifier and
/// the newly read value (the value rides along so the consumer never
/// has to re-read and race a second change).
pub type ChangeSink = Arc<dyn Fn(Attribute, AttributeValue) + Send + Sync>;

/// One observable collaborator: a player or an item
pub trait ObservableHandle: Send + Sync {
    /// Read the current value of an attribute
    ///
    /// Returns `None` when the handle has no value for the attribute
    /// yet (or the attribute is not in this handle's scope).
    fn read(&self, attribute: Attribute) -> Option<AttributeValue>;

    /// Register a change subscription for a push-capable attribute
    ///
    /// The returned guard keeps the subscription alive; dropping it
    /// unregisters. A handle may reject individual attributes, which
    /// the caller treats as non-fatal.
    fn subscribe(&self, attribute: Attribute, sink: ChangeSink) -> Result<Subscription>;
}

/// Guard for one registered subscription; unregisters on drop
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap an unregister action
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
