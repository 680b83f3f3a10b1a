//! Push subscription management
//!
//! [`PushSubscriptions`] owns one subscription guard per push-capable
//! attribute of the current target. Fired subscriptions do not touch
//! the snapshot themselves; they post a [`Delivery`] into the worker's
//! channel, which is the single hand-off boundary between the player's
//! own execution context and the observer's.
//!
//! Deliveries carry the generation of the scope they were subscribed
//! under. The worker drops any delivery whose generation is no longer
//! current, so a notification queued by an already-replaced target can
//! never corrupt the snapshot.

use std::sync::Arc;

use tokio::sync::mpsc;

use autowait_player::{
    Attribute, AttributeValue, ChangeSink, ObservableHandle, Scope, Subscription, Target,
};

/// One push-reported update crossing the hand-off boundary
#[derive(Debug)]
pub(crate) struct Delivery {
    pub generation: u64,
    pub attribute: Attribute,
    pub value: AttributeValue,
}

/// Generation counters, one per subscription scope
///
/// Bumped whenever the corresponding handle is (re)bound; deliveries
/// from earlier bindings are stale and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Generations {
    pub player: u64,
    pub item: u64,
}

impl Generations {
    pub fn bump_player(&mut self) {
        self.player += 1;
    }

    pub fn bump_item(&mut self) {
        self.item += 1;
    }

    pub fn for_scope(&self, scope: Scope) -> u64 {
        match scope {
            Scope::Player => self.player,
            Scope::Item => self.item,
        }
    }
}

/// Subscription guards for every push-capable attribute of one target
pub(crate) struct PushSubscriptions {
    player_guards: Vec<(Attribute, Subscription)>,
    item_guards: Vec<(Attribute, Subscription)>,
    bound_player: Option<Arc<dyn ObservableHandle>>,
    /// Whether the last player-scope bind registered every attribute;
    /// an incomplete bind is retried even for the same player instance
    player_fully_bound: bool,
}

impl PushSubscriptions {
    pub fn new() -> Self {
        Self {
            player_guards: Vec::new(),
            item_guards: Vec::new(),
            bound_player: None,
            player_fully_bound: false,
        }
    }

    /// (Re)subscribe against a target; returns the attributes freshly bound
    ///
    /// Superseded guards are dropped before new ones register, so
    /// attaching twice to the same target never duplicates deliveries.
    /// Player-scoped guards survive when the player handle is the same
    /// instance (item-only swap) and every player attribute registered
    /// last time. A registration the handle rejects is logged and
    /// skipped; the attribute is simply not in the returned set and
    /// will be retried on the next attach.
    pub fn attach(
        &mut self,
        target: &Target,
        generations: Generations,
        delivery_tx: &mpsc::UnboundedSender<Delivery>,
    ) -> Vec<Attribute> {
        let rebind_player = !self.player_fully_bound
            || !self
                .bound_player
                .as_ref()
                .is_some_and(|bound| Arc::ptr_eq(bound, target.player()));

        let mut fresh = Vec::new();

        if rebind_player {
            self.player_guards.clear();
            for attribute in Attribute::PUSH {
                if attribute.scope() != Scope::Player {
                    continue;
                }
                match register(target.player(), attribute, generations.player, delivery_tx) {
                    Ok(guard) => {
                        self.player_guards.push((attribute, guard));
                        fresh.push(attribute);
                    }
                    Err(err) => {
                        tracing::warn!(%attribute, %err, "player subscription failed");
                    }
                }
            }
            let player_push_count = Attribute::PUSH
                .iter()
                .filter(|a| a.scope() == Scope::Player)
                .count();
            self.player_fully_bound = self.player_guards.len() == player_push_count;
            self.bound_player = Some(Arc::clone(target.player()));
        }

        // Item scope always rebinds; with no item there is nothing to
        // register and item attributes stay unknown.
        self.item_guards.clear();
        if let Some(item) = target.item() {
            for attribute in Attribute::PUSH {
                if attribute.scope() != Scope::Item {
                    continue;
                }
                match register(item, attribute, generations.item, delivery_tx) {
                    Ok(guard) => {
                        self.item_guards.push((attribute, guard));
                        fresh.push(attribute);
                    }
                    Err(err) => {
                        tracing::warn!(%attribute, %err, "item subscription failed");
                    }
                }
            }
        }

        fresh
    }

    /// Drop every guard; safe to call repeatedly and during teardown
    pub fn detach(&mut self) {
        self.player_guards.clear();
        self.item_guards.clear();
        self.bound_player = None;
        self.player_fully_bound = false;
    }

    #[cfg(test)]
    fn guard_count(&self) -> usize {
        self.player_guards.len() + self.item_guards.len()
    }
}

fn register(
    handle: &Arc<dyn ObservableHandle>,
    attribute: Attribute,
    generation: u64,
    delivery_tx: &mpsc::UnboundedSender<Delivery>,
) -> autowait_player::error::Result<Subscription> {
    let tx = delivery_tx.clone();
    let sink: ChangeSink = Arc::new(move |attribute, value| {
        // Hand-off, never a blocking call: the player's context must
        // not wait on reconciliation.
        let _ = tx.send(Delivery {
            generation,
            attribute,
            value,
        });
    });
    handle.subscribe(attribute, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autowait_player::{SimulatedItem, SimulatedPlayer};

    fn channel() -> (
        mpsc::UnboundedSender<Delivery>,
        mpsc::UnboundedReceiver<Delivery>,
    ) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn test_attach_without_item_registers_player_scope_only() {
        let (tx, _rx) = channel();
        let mut subscriptions = PushSubscriptions::new();
        let target = Target::new(Arc::new(SimulatedPlayer::new()), None);

        let fresh = subscriptions.attach(&target, Generations::default(), &tx);

        assert_eq!(fresh.len(), 3);
        assert!(fresh.iter().all(|a| a.scope() == Scope::Player));
    }

    #[test]
    fn test_reattach_does_not_duplicate_deliveries() {
        let (tx, mut rx) = channel();
        let mut subscriptions = PushSubscriptions::new();
        let player = Arc::new(SimulatedPlayer::new());
        let item = Arc::new(SimulatedItem::new());
        let target = Target::new(player.clone(), Some(item.clone()));

        subscriptions.attach(&target, Generations::default(), &tx);
        subscriptions.attach(&target, Generations::default(), &tx);
        assert_eq!(subscriptions.guard_count(), Attribute::PUSH.len());

        item.set_buffer_full(true);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_player_guards_survive_item_swap() {
        let (tx, mut rx) = channel();
        let mut subscriptions = PushSubscriptions::new();
        let player = Arc::new(SimulatedPlayer::new());
        let first = Target::new(player.clone(), Some(Arc::new(SimulatedItem::new())));
        let second = Target::new(player.clone(), Some(Arc::new(SimulatedItem::new())));

        subscriptions.attach(&first, Generations::default(), &tx);
        let fresh = subscriptions.attach(&second, Generations::default(), &tx);

        // Only item attributes rebound
        assert_eq!(fresh.len(), 4);
        assert!(fresh.iter().all(|a| a.scope() == Scope::Item));

        // The surviving player subscriptions still deliver, without
        // duplicates: play_immediately moves rate and status once each.
        player.play_immediately(1.0);
        let mut delivered = Vec::new();
        while let Ok(delivery) = rx.try_recv() {
            delivered.push(delivery.attribute);
        }
        assert!(delivered.contains(&Attribute::Rate));
        assert!(delivered.contains(&Attribute::TimeControlStatus));
        assert_eq!(delivered.len(), 2);
    }

    #[test]
    fn test_incomplete_player_bind_is_retried_on_reattach() {
        let (tx, _rx) = channel();
        let mut subscriptions = PushSubscriptions::new();
        let player = Arc::new(SimulatedPlayer::new());
        player.fail_subscriptions_for([Attribute::Rate]);
        let target = Target::new(player.clone(), None);

        let fresh = subscriptions.attach(&target, Generations::default(), &tx);
        assert!(!fresh.contains(&Attribute::Rate));
        assert_eq!(subscriptions.guard_count(), 2);

        // Same player instance, but the incomplete bind must be redone
        player.clear_subscription_failures();
        let fresh = subscriptions.attach(&target, Generations::default(), &tx);
        assert!(fresh.contains(&Attribute::Rate));
        assert_eq!(subscriptions.guard_count(), 3);

        // Now complete; a third attach leaves the player scope alone
        let fresh = subscriptions.attach(&target, Generations::default(), &tx);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_rejected_attribute_is_skipped_not_fatal() {
        let (tx, _rx) = channel();
        let mut subscriptions = PushSubscriptions::new();
        let item = Arc::new(SimulatedItem::new());
        item.fail_subscriptions_for([Attribute::BufferEmpty]);
        let target = Target::new(Arc::new(SimulatedPlayer::new()), Some(item));

        let fresh = subscriptions.attach(&target, Generations::default(), &tx);

        assert!(!fresh.contains(&Attribute::BufferEmpty));
        assert!(fresh.contains(&Attribute::BufferFull));
        assert_eq!(fresh.len(), Attribute::PUSH.len() - 1);
    }

    #[test]
    fn test_detach_is_idempotent_and_silences_sources() {
        let (tx, mut rx) = channel();
        let mut subscriptions = PushSubscriptions::new();
        let item = Arc::new(SimulatedItem::new());
        let target = Target::new(Arc::new(SimulatedPlayer::new()), Some(item.clone()));

        subscriptions.attach(&target, Generations::default(), &tx);
        subscriptions.detach();
        subscriptions.detach();

        item.set_buffer_full(true);
        assert!(rx.try_recv().is_err());
    }
}
