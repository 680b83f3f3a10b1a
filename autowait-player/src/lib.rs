//! Player handle contracts for the autowait demo
//!
//! The media player and its current item are external collaborators.
//! This crate defines the narrow surface the observer core sees:
//!
//! - [`Attribute`]: the closed set of watched properties, each either
//!   push-capable or poll-only and owned by the player or the item
//! - [`AttributeValue`]: the tagged union of attribute values
//! - [`ObservableHandle`]: read-a-value plus register-a-subscription,
//!   with RAII [`Subscription`] guards
//! - [`Target`]: the (player, optional item) pair under observation
//!
//! It also ships [`SimulatedPlayer`] and [`SimulatedItem`], in-memory
//! handles with automatic-waiting transport semantics, used by the demo
//! binary and by tests, and the [`SettingsProvider`] trait for the
//! single persisted user preference.

pub mod attribute;
pub mod error;
pub mod handle;
pub mod settings;
pub mod sim;
pub mod target;
pub mod value;

pub use attribute::{Attribute, Scope};
pub use error::SubscribeError;
pub use handle::{ChangeSink, ObservableHandle, Subscription};
pub use settings::{MemorySettings, SettingsProvider, DISABLE_AUTO_WAIT_KEY};
pub use sim::{SimulatedItem, SimulatedPlayer};
pub use target::Target;
pub use value::{AttributeValue, TimeControlStatus, TimeRange, WaitingReason};
