//! Playback state model for the autowait demo
//!
//! The data side of the observer core:
//!
//! - [`Snapshot`]: immutable, total mapping from watched attribute to
//!   its latest observed state ([`Observed::Unknown`] before first
//!   observation)
//! - [`Reconciler`]: the single funnel every update flows through,
//!   deduplicating by value equality so each real change is reported
//!   exactly once
//!
//! # Architecture
//!
//! ```text
//! push deliveries ─┐
//!                  ├─→ Reconciler ─→ Snapshot ─→ change notification
//! poll samples ────┘
//! ```

pub mod logging;
pub mod reconciler;
pub mod snapshot;

pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use reconciler::Reconciler;
pub use snapshot::{Observed, Snapshot};
