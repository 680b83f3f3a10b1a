//! Playback observer facade
//!
//! [`PlaybackObserver`] is the public core: it owns the background
//! worker, accepts re-target commands, exposes the latest merged
//! snapshot, and guarantees that the change callback falls silent the
//! moment [`teardown`](PlaybackObserver::teardown) completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use autowait_player::{Attribute, ObservableHandle, Target};
use autowait_state::{Observed, Snapshot};

use crate::error::{ObserverError, Result};
use crate::worker::{self, ChangeCallback, Command, Worker};

/// Lifecycle of the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    /// Created, no target yet
    Uninitialized,
    /// Observing a target
    Attached,
    /// Torn down; terminal
    Detached,
}

/// Watches a player and its current item, merging push notifications
/// and polled samples into one snapshot
///
/// Created inside a Tokio runtime; all snapshot mutation and every
/// `on_change` invocation happen on the background worker task.
///
/// # Example
///
/// ```rust,ignore
/// let observer = PlaybackObserver::new(|attribute, observed, _snapshot| {
///     println!("{attribute}: {observed}");
/// });
/// observer.set_target(player, Some(item))?;
/// // ... later, swap just the item
/// observer.set_item(Some(other_item))?;
/// observer.teardown().await;
/// ```
pub struct PlaybackObserver {
    command_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
    closed: Arc<AtomicBool>,
    state: Mutex<ObserverState>,
    _worker: JoinHandle<()>,
}

impl PlaybackObserver {
    /// Spawn the worker; `on_change` fires for every real change
    pub fn new(
        on_change: impl Fn(Attribute, Observed, Snapshot) + Send + Sync + 'static,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::new());
        let closed = Arc::new(AtomicBool::new(false));

        let callback: ChangeCallback = Arc::new(on_change);
        let worker = Worker::new(callback, snapshot_tx, delivery_tx, Arc::clone(&closed));
        let handle = tokio::spawn(worker::run(command_rx, delivery_rx, worker));

        Self {
            command_tx,
            snapshot_rx,
            closed,
            state: Mutex::new(ObserverState::Uninitialized),
            _worker: handle,
        }
    }

    /// Observe a new (player, item) pair
    ///
    /// Tears down subscriptions bound to the previous target first.
    /// When only the item differs, player-scoped subscriptions are
    /// left untouched.
    pub fn set_target(
        &self,
        player: Arc<dyn ObservableHandle>,
        item: Option<Arc<dyn ObservableHandle>>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if *state == ObserverState::Detached {
            tracing::warn!("set_target after teardown ignored");
            return Err(ObserverError::Detached);
        }
        self.command_tx
            .send(Command::SetTarget(Target::new(player, item)))
            .map_err(|_| ObserverError::WorkerGone)?;
        *state = ObserverState::Attached;
        Ok(())
    }

    /// Swap only the current item; `None` unloads it
    pub fn set_item(&self, item: Option<Arc<dyn ObservableHandle>>) -> Result<()> {
        let state = self.state.lock();
        match *state {
            ObserverState::Detached => return Err(ObserverError::Detached),
            ObserverState::Uninitialized => return Err(ObserverError::NoTarget),
            ObserverState::Attached => {}
        }
        self.command_tx
            .send(Command::SetItem(item))
            .map_err(|_| ObserverError::WorkerGone)
    }

    /// Latest merged state; never blocks
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Reactive access to the snapshot stream
    pub fn watch_snapshot(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    pub fn state(&self) -> ObserverState {
        *self.state.lock()
    }

    /// Stop observing; after this returns, `on_change` never fires again
    ///
    /// Idempotent, and safe to call while pushes and polls are in
    /// flight: the closed flag silences the callback immediately, and
    /// the returned future resolves once the worker has detached every
    /// subscription and exited.
    pub async fn teardown(&self) {
        // Set before the state check so a concurrent caller that
        // observes Detached also observes a silenced callback.
        self.closed.store(true, Ordering::SeqCst);

        {
            let mut state = self.state.lock();
            if *state == ObserverState::Detached {
                return;
            }
            *state = ObserverState::Detached;
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.command_tx.send(Command::Teardown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

impl Drop for PlaybackObserver {
    fn drop(&mut self) {
        // Cannot await the acknowledgment here; the flag alone keeps
        // the callback quiet while the worker winds down on its own.
        self.closed.store(true, Ordering::SeqCst);
        let (ack_tx, _) = oneshot::channel();
        let _ = self.command_tx.send(Command::Teardown(ack_tx));
    }
}
