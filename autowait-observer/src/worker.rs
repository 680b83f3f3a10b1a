//! Background worker task
//!
//! One task serializes every mutation of the snapshot: re-target
//! commands from the facade, push deliveries, and poll ticks all meet
//! in a single `select!` loop, so the reconciler never needs a lock.
//! The external change callback runs here too, gated by the closed
//! flag at the invocation point so nothing reaches the presentation
//! layer after teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use autowait_player::{Attribute, ObservableHandle, Scope, Target};
use autowait_state::{Observed, Reconciler, Snapshot};

use crate::poll::PollScheduler;
use crate::push::{Delivery, Generations, PushSubscriptions};

/// Callback invoked on the worker context for every real change
pub type ChangeCallback = Arc<dyn Fn(Attribute, Observed, Snapshot) + Send + Sync>;

/// Commands sent from the facade to the worker
pub(crate) enum Command {
    /// Observe a new (player, item) pair
    SetTarget(Target),
    /// Swap only the item; the player keeps its subscriptions
    SetItem(Option<Arc<dyn ObservableHandle>>),
    /// Detach everything and exit; acknowledged once done
    Teardown(oneshot::Sender<()>),
}

pub(crate) struct Worker {
    delivery_tx: mpsc::UnboundedSender<Delivery>,
    subscriptions: PushSubscriptions,
    reconciler: Reconciler,
    snapshot_tx: watch::Sender<Snapshot>,
    generations: Generations,
    target: Option<Target>,
    callback: ChangeCallback,
    closed: Arc<AtomicBool>,
}

/// Worker loop; exits on teardown or when the facade is dropped
pub(crate) async fn run(
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    mut delivery_rx: mpsc::UnboundedReceiver<Delivery>,
    mut worker: Worker,
) {
    let mut poll = PollScheduler::new();
    tracing::debug!("observer worker started");

    loop {
        tokio::select! {
            // Re-target commands outrun queued deliveries, so a stale
            // delivery can never be applied under a fresh generation.
            biased;

            command = command_rx.recv() => match command {
                Some(Command::SetTarget(target)) => worker.retarget(target, &mut poll),
                Some(Command::SetItem(item)) => worker.swap_item(item, &mut poll),
                Some(Command::Teardown(ack)) => {
                    poll.stop();
                    worker.subscriptions.detach();
                    tracing::debug!("observer worker torn down");
                    let _ = ack.send(());
                    return;
                }
                None => {
                    poll.stop();
                    worker.subscriptions.detach();
                    tracing::debug!("facade dropped, observer worker exiting");
                    return;
                }
            },
            Some(delivery) = delivery_rx.recv() => worker.on_delivery(delivery),
            _ = poll.tick(), if poll.is_active() => worker.sample_polled(),
        }
    }
}

impl Worker {
    pub fn new(
        callback: ChangeCallback,
        snapshot_tx: watch::Sender<Snapshot>,
        delivery_tx: mpsc::UnboundedSender<Delivery>,
        closed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            delivery_tx,
            subscriptions: PushSubscriptions::new(),
            reconciler: Reconciler::new(),
            snapshot_tx,
            generations: Generations::default(),
            target: None,
            callback,
            closed,
        }
    }

    /// Bind to a new target and bring the snapshot in line with it
    fn retarget(&mut self, target: Target, poll: &mut PollScheduler) {
        let player_changed = !self
            .target
            .as_ref()
            .is_some_and(|current| current.same_player(&target));

        if player_changed {
            self.generations.bump_player();
        }
        // The item scope rebinds on every retarget, even to the same
        // item: dropping and re-registering keeps attach idempotent.
        self.generations.bump_item();

        let fresh = self
            .subscriptions
            .attach(&target, self.generations, &self.delivery_tx);
        tracing::debug!(
            has_item = target.has_item(),
            player_changed,
            resubscribed = fresh.len(),
            "observer re-targeted"
        );

        // Prime every rebound attribute from a direct read so the
        // snapshot reflects the new target before its first change
        // fires. Attributes whose subscription was rejected fall back
        // to unknown until the next retarget retries them.
        for attribute in Attribute::ALL {
            let scope_rebound = match attribute.scope() {
                Scope::Player => player_changed,
                Scope::Item => true,
            };
            // A previously rejected player subscription may have been
            // retried and bound even though the player handle itself is
            // unchanged; it needs priming too.
            if !scope_rebound && !fresh.contains(&attribute) {
                continue;
            }
            let observed = if attribute.is_polled() || fresh.contains(&attribute) {
                target.read(attribute).into()
            } else {
                Observed::Unknown
            };
            self.apply(attribute, observed);
        }

        self.target = Some(target);
        poll.start();
    }

    /// Item swap: same player, new (or no) item
    fn swap_item(&mut self, item: Option<Arc<dyn ObservableHandle>>, poll: &mut PollScheduler) {
        match &self.target {
            Some(current) => {
                let target = Target::new(Arc::clone(current.player()), item);
                self.retarget(target, poll);
            }
            None => tracing::warn!("item swap ignored, no target attached"),
        }
    }

    /// A push delivery crossed the hand-off boundary
    fn on_delivery(&mut self, delivery: Delivery) {
        let current = self.generations.for_scope(delivery.attribute.scope());
        if delivery.generation != current {
            tracing::trace!(
                attribute = %delivery.attribute,
                generation = delivery.generation,
                current,
                "stale delivery dropped"
            );
            return;
        }
        self.apply(delivery.attribute, Observed::Known(delivery.value));
    }

    /// Sample every poll-only attribute from the current target
    fn sample_polled(&mut self) {
        let Some(target) = self.target.clone() else {
            return;
        };
        for attribute in Attribute::POLLED {
            let observed = target.read(attribute).into();
            self.apply(attribute, observed);
        }
    }

    /// Route one observation through the reconciler and notify on change
    fn apply(&mut self, attribute: Attribute, observed: Observed) {
        let changed = match observed.clone() {
            Observed::Known(value) => self.reconciler.apply(attribute, value),
            Observed::Unknown => self.reconciler.clear(attribute),
        };
        if !changed {
            return;
        }

        let snapshot = self.reconciler.snapshot().clone();
        self.snapshot_tx.send_replace(snapshot.clone());

        // A delivery that was already past the hand-off when teardown
        // began may still update the snapshot, but it must not reach
        // the presentation layer.
        if !self.closed.load(Ordering::SeqCst) {
            (self.callback)(attribute, observed, snapshot);
        }
    }
}
