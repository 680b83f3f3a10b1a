//! Playback state observation for the autowait demo
//!
//! Watches an external player and its current item, merging two
//! notification styles into one consistent snapshot:
//!
//! - push: the player/item notify on change for most attributes
//! - poll: `current_time` and `timebase_rate` cannot notify and are
//!   sampled every 100 ms
//!
//! # Architecture
//!
//! ```text
//! player/item sinks ──→ delivery channel ─┐
//!                                         ├─→ worker task ─→ Reconciler
//! poll tick ──────────────────────────────┘        │
//!                                                  ├─→ watch::Sender<Snapshot>
//!                                                  └─→ on_change callback
//! ```
//!
//! Everything that mutates the snapshot runs on one worker task, so the
//! reconciler needs no locking; push sources hand off through a channel
//! and are never blocked on reconciliation. Re-targeting bumps a
//! generation counter per scope so deliveries from a replaced player or
//! item are dropped, and teardown flips a closed flag checked at the
//! callback invocation point.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autowait_observer::PlaybackObserver;
//!
//! let observer = PlaybackObserver::new(|attribute, observed, _snapshot| {
//!     println!("{attribute}: {observed}");
//! });
//! observer.set_target(player, Some(item))?;
//!
//! // Presentation reads the merged state at any time
//! let snapshot = observer.snapshot();
//!
//! observer.teardown().await;
//! ```

pub mod error;
pub mod observer;
pub mod poll;
mod push;
mod worker;

pub use error::{ObserverError, Result};
pub use observer::{ObserverState, PlaybackObserver};
pub use poll::{PollScheduler, POLL_INTERVAL};
pub use worker::ChangeCallback;
