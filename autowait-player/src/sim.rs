//! Simulated player and item
//!
//! In-memory implementations of [`ObservableHandle`] so the demo binary
//! and tests have a concrete collaborator without a real media stack.
//! The player mimics automatic-waiting transport behavior: `play()`
//! holds playback in a waiting state until the item's buffer is ready,
//! while `play_immediately()` starts regardless.
//!
//! Push-capable attributes fire registered sinks synchronously from the
//! mutating call, like a real player notifying from its own context.
//! `current_time` and `timebase_rate` never fire; they must be polled.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::attribute::{Attribute, Scope};
use crate::error::{Result, SubscribeError};
use crate::handle::{ChangeSink, ObservableHandle, Subscription};
use crate::value::{AttributeValue, TimeControlStatus, TimeRange, WaitingReason};

// ============================================================================
// Sink table (shared by player and item)
// ============================================================================

/// Registered sinks, keyed by subscription id
///
/// Firing and cancellation take the same lock, so once a guard's drop
/// has returned no further delivery can reach its sink.
#[derive(Default)]
struct SinkTable {
    next_id: u64,
    sinks: HashMap<u64, (Attribute, ChangeSink)>,
}

impl SinkTable {
    fn register(&mut self, attribute: Attribute, sink: ChangeSink) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.sinks.insert(id, (attribute, sink));
        id
    }

    fn fire(&self, attribute: Attribute, value: &AttributeValue) {
        for (registered, sink) in self.sinks.values() {
            if *registered == attribute {
                sink(attribute, value.clone());
            }
        }
    }
}

fn guard_for(table: &Arc<Mutex<SinkTable>>, id: u64) -> Subscription {
    let weak: Weak<Mutex<SinkTable>> = Arc::downgrade(table);
    Subscription::new(move || {
        if let Some(table) = weak.upgrade() {
            table.lock().sinks.remove(&id);
        }
    })
}

// ============================================================================
// SimulatedPlayer
// ============================================================================

struct PlayerState {
    rate: f32,
    status: TimeControlStatus,
    waiting: Option<WaitingReason>,
    auto_wait: bool,
    current_item: Option<Arc<SimulatedItem>>,
}

/// In-memory player with automatic-waiting transport semantics
pub struct SimulatedPlayer {
    state: Mutex<PlayerState>,
    sinks: Arc<Mutex<SinkTable>>,
    /// Attributes whose subscription attempts are rejected (fault hook)
    rejected: Mutex<HashSet<Attribute>>,
}

impl SimulatedPlayer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlayerState {
                rate: 0.0,
                status: TimeControlStatus::Paused,
                waiting: None,
                auto_wait: true,
                current_item: None,
            }),
            sinks: Arc::new(Mutex::new(SinkTable::default())),
            rejected: Mutex::new(HashSet::new()),
        }
    }

    /// Make `subscribe` fail for the given attributes (fault hook)
    pub fn fail_subscriptions_for(&self, attributes: impl IntoIterator<Item = Attribute>) {
        self.rejected.lock().extend(attributes);
    }

    /// Accept all subscription attempts again
    pub fn clear_subscription_failures(&self) {
        self.rejected.lock().clear();
    }

    /// Start playback, waiting for the buffer when auto-wait is on
    pub fn play(&self) {
        tracing::debug!("play requested");
        self.transition(|state| {
            state.rate = 1.0;
            match &state.current_item {
                None => {
                    state.status = TimeControlStatus::WaitingToPlayAtRate;
                    state.waiting = Some(WaitingReason::NoItemToPlay);
                }
                Some(item) if state.auto_wait && !item.buffer_ready() => {
                    state.status = TimeControlStatus::WaitingToPlayAtRate;
                    state.waiting = Some(WaitingReason::MinimizingStalls);
                }
                Some(_) => {
                    state.status = TimeControlStatus::Playing;
                    state.waiting = None;
                }
            }
        });
    }

    /// Pause playback
    pub fn pause(&self) {
        tracing::debug!("pause requested");
        self.transition(|state| {
            state.rate = 0.0;
            state.status = TimeControlStatus::Paused;
            state.waiting = None;
        });
    }

    /// Start playback at the given rate without waiting for the buffer
    pub fn play_immediately(&self, rate: f32) {
        tracing::debug!(rate, "immediate playback requested");
        self.transition(|state| {
            state.rate = rate;
            state.status = TimeControlStatus::Playing;
            state.waiting = None;
        });
    }

    /// Re-check the waiting condition against the current buffer state
    ///
    /// A real player does this internally as the buffer fills; the demo
    /// calls it after mutating the item.
    pub fn reevaluate_waiting(&self) {
        self.transition(|state| {
            if state.status != TimeControlStatus::WaitingToPlayAtRate {
                return;
            }
            match &state.current_item {
                Some(item) if !state.auto_wait || item.buffer_ready() => {
                    state.status = TimeControlStatus::Playing;
                    state.waiting = None;
                }
                Some(_) => {}
                None => {
                    state.waiting = Some(WaitingReason::NoItemToPlay);
                }
            }
        });
    }

    /// Toggle whether `play()` waits for the buffer to minimize stalls
    pub fn set_automatically_waits(&self, auto_wait: bool) {
        self.state.lock().auto_wait = auto_wait;
        self.reevaluate_waiting();
    }

    pub fn automatically_waits(&self) -> bool {
        self.state.lock().auto_wait
    }

    /// Swap the loaded item; `None` unloads
    ///
    /// Observers watching the old item keep their stale subscriptions
    /// until they re-target, exactly like the real collaborator.
    pub fn replace_current_item(&self, item: Option<Arc<SimulatedItem>>) {
        tracing::debug!(loaded = item.is_some(), "current item replaced");
        self.state.lock().current_item = item;
        self.reevaluate_waiting();
    }

    pub fn current_item(&self) -> Option<Arc<SimulatedItem>> {
        self.state.lock().current_item.clone()
    }

    pub fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    /// Apply a state change and fire sinks for every attribute it moved
    fn transition(&self, mutate: impl FnOnce(&mut PlayerState)) {
        let mut fired: Vec<(Attribute, AttributeValue)> = Vec::new();
        {
            let mut state = self.state.lock();
            let before = (state.rate, state.status, state.waiting);
            mutate(&mut state);

            if state.rate != before.0 {
                fired.push((Attribute::Rate, AttributeValue::Rate(state.rate)));
            }
            if state.status != before.1 {
                fired.push((
                    Attribute::TimeControlStatus,
                    AttributeValue::Status(state.status),
                ));
            }
            if state.waiting != before.2 {
                fired.push((
                    Attribute::WaitingReason,
                    AttributeValue::Waiting(state.waiting),
                ));
            }
        }

        let sinks = self.sinks.lock();
        for (attribute, value) in &fired {
            tracing::trace!(%attribute, %value, "player attribute changed");
            sinks.fire(*attribute, value);
        }
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservableHandle for SimulatedPlayer {
    fn read(&self, attribute: Attribute) -> Option<AttributeValue> {
        let state = self.state.lock();
        match attribute {
            Attribute::Rate => Some(AttributeValue::Rate(state.rate)),
            Attribute::TimeControlStatus => Some(AttributeValue::Status(state.status)),
            Attribute::WaitingReason => Some(AttributeValue::Waiting(state.waiting)),
            _ => None,
        }
    }

    fn subscribe(&self, attribute: Attribute, sink: ChangeSink) -> Result<Subscription> {
        if !attribute.is_push() {
            return Err(SubscribeError::NotPushCapable(attribute));
        }
        if attribute.scope() != Scope::Player || self.rejected.lock().contains(&attribute) {
            return Err(SubscribeError::Rejected(attribute));
        }
        let id = self.sinks.lock().register(attribute, sink);
        Ok(guard_for(&self.sinks, id))
    }
}

// ============================================================================
// SimulatedItem
// ============================================================================

struct ItemState {
    likely_to_keep_up: bool,
    buffer_full: bool,
    buffer_empty: bool,
    loaded: Vec<TimeRange>,
    current_time: f64,
    timebase_rate: f64,
}

/// In-memory item exposing buffer flags, loaded ranges, and clock state
pub struct SimulatedItem {
    state: Mutex<ItemState>,
    sinks: Arc<Mutex<SinkTable>>,
    /// Attributes whose subscription attempts are rejected (fault hook)
    rejected: Mutex<HashSet<Attribute>>,
}

impl SimulatedItem {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ItemState {
                likely_to_keep_up: false,
                buffer_full: false,
                buffer_empty: true,
                loaded: Vec::new(),
                current_time: 0.0,
                timebase_rate: 0.0,
            }),
            sinks: Arc::new(Mutex::new(SinkTable::default())),
            rejected: Mutex::new(HashSet::new()),
        }
    }

    pub fn set_likely_to_keep_up(&self, likely: bool) {
        self.set_flag(Attribute::BufferLikelyToKeepUp, likely, |s, v| {
            s.likely_to_keep_up = v
        });
    }

    pub fn set_buffer_full(&self, full: bool) {
        self.set_flag(Attribute::BufferFull, full, |s, v| s.buffer_full = v);
    }

    pub fn set_buffer_empty(&self, empty: bool) {
        self.set_flag(Attribute::BufferEmpty, empty, |s, v| s.buffer_empty = v);
    }

    pub fn set_loaded_time_ranges(&self, ranges: Vec<TimeRange>) {
        let value = {
            let mut state = self.state.lock();
            if state.loaded == ranges {
                return;
            }
            state.loaded = ranges.clone();
            AttributeValue::TimeRanges(ranges)
        };
        tracing::trace!(%value, "loaded time ranges changed");
        self.sinks.lock().fire(Attribute::LoadedTimeRanges, &value);
    }

    /// Advance the playback clock; never notifies (poll-only)
    pub fn advance_time(&self, seconds: f64) {
        self.state.lock().current_time += seconds;
    }

    /// Set the timebase rate; never notifies (poll-only)
    pub fn set_timebase_rate(&self, rate: f64) {
        self.state.lock().timebase_rate = rate;
    }

    pub fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    /// Whether playback can proceed without stalling
    pub fn buffer_ready(&self) -> bool {
        let state = self.state.lock();
        state.likely_to_keep_up || state.buffer_full
    }

    /// Make `subscribe` fail for the given attributes (fault hook)
    pub fn fail_subscriptions_for(&self, attributes: impl IntoIterator<Item = Attribute>) {
        self.rejected.lock().extend(attributes);
    }

    /// Accept all subscription attempts again
    pub fn clear_subscription_failures(&self) {
        self.rejected.lock().clear();
    }

    fn set_flag(
        &self,
        attribute: Attribute,
        value: bool,
        write: impl FnOnce(&mut ItemState, bool),
    ) {
        {
            let mut state = self.state.lock();
            let before = match attribute {
                Attribute::BufferLikelyToKeepUp => state.likely_to_keep_up,
                Attribute::BufferFull => state.buffer_full,
                Attribute::BufferEmpty => state.buffer_empty,
                _ => unreachable!("not a flag attribute"),
            };
            if before == value {
                return;
            }
            write(&mut state, value);
        }
        tracing::trace!(%attribute, value, "item flag changed");
        self.sinks.lock().fire(attribute, &AttributeValue::Flag(value));
    }
}

impl Default for SimulatedItem {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservableHandle for SimulatedItem {
    fn read(&self, attribute: Attribute) -> Option<AttributeValue> {
        let state = self.state.lock();
        match attribute {
            Attribute::BufferLikelyToKeepUp => Some(AttributeValue::Flag(state.likely_to_keep_up)),
            Attribute::BufferFull => Some(AttributeValue::Flag(state.buffer_full)),
            Attribute::BufferEmpty => Some(AttributeValue::Flag(state.buffer_empty)),
            Attribute::LoadedTimeRanges => Some(AttributeValue::TimeRanges(state.loaded.clone())),
            Attribute::CurrentTime => Some(AttributeValue::Seconds(state.current_time)),
            Attribute::TimebaseRate => Some(AttributeValue::Seconds(state.timebase_rate)),
            _ => None,
        }
    }

    fn subscribe(&self, attribute: Attribute, sink: ChangeSink) -> Result<Subscription> {
        if !attribute.is_push() {
            return Err(SubscribeError::NotPushCapable(attribute));
        }
        if attribute.scope() != Scope::Item || self.rejected.lock().contains(&attribute) {
            return Err(SubscribeError::Rejected(attribute));
        }
        let id = self.sinks.lock().register(attribute, sink);
        Ok(guard_for(&self.sinks, id))
    }
}

// ============================================================================
// Tests
// ============================================================================
