//! Reconciliation funnel
//!
//! Every attribute update, push-delivered or poll-sampled, lands here.
//! The [`Reconciler`] owns the single mutable [`Snapshot`] and is its
//! only writer. It deduplicates by value equality: an update carrying
//! the value already stored is reported as no change, so consumers see
//! exactly one notification per real change whatever the source mix.

use autowait_player::{Attribute, AttributeValue};

use crate::snapshot::{Observed, Snapshot};

/// Single writer of the merged attribute snapshot
#[derive(Debug, Default)]
pub struct Reconciler {
    snapshot: Snapshot,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an observed value; returns whether the snapshot changed
    ///
    /// Last write wins per attribute. Returns `false` iff the incoming
    /// value equals the stored one.
    pub fn apply(&mut self, attribute: Attribute, value: AttributeValue) -> bool {
        if self.snapshot.get(attribute).value() == Some(&value) {
            tracing::trace!(%attribute, %value, "update suppressed, value unchanged");
            return false;
        }
        tracing::debug!(%attribute, %value, "attribute changed");
        self.snapshot = self.snapshot.with(attribute, Observed::Known(value));
        true
    }

    /// Mark an attribute unknown again (owning handle went away)
    ///
    /// Returns whether the snapshot changed.
    pub fn clear(&mut self, attribute: Attribute) -> bool {
        if !self.snapshot.get(attribute).is_known() {
            return false;
        }
        tracing::debug!(%attribute, "attribute cleared to unknown");
        self.snapshot = self.snapshot.with(attribute, Observed::Unknown);
        true
    }

    /// The latest merged state
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autowait_player::{TimeControlStatus, TimeRange};
    use proptest::prelude::*;

    #[test]
    fn test_apply_reports_change_then_suppresses_repeat() {
        let mut reconciler = Reconciler::new();

        assert!(reconciler.apply(Attribute::BufferFull, AttributeValue::Flag(true)));
        assert!(!reconciler.apply(Attribute::BufferFull, AttributeValue::Flag(true)));
        assert!(reconciler.apply(Attribute::BufferFull, AttributeValue::Flag(false)));
    }

    #[test]
    fn test_apply_is_per_attribute() {
        let mut reconciler = Reconciler::new();

        assert!(reconciler.apply(Attribute::BufferFull, AttributeValue::Flag(true)));
        // Equal value under a different attribute is still a change there
        assert!(reconciler.apply(Attribute::BufferEmpty, AttributeValue::Flag(true)));
    }

    #[test]
    fn test_clear_round_trip() {
        let mut reconciler = Reconciler::new();

        // Clearing an unknown attribute is a no-op
        assert!(!reconciler.clear(Attribute::CurrentTime));

        assert!(reconciler.apply(Attribute::CurrentTime, AttributeValue::Seconds(1.0)));
        assert!(reconciler.clear(Attribute::CurrentTime));
        assert!(!reconciler.clear(Attribute::CurrentTime));
        assert_eq!(reconciler.snapshot().get(Attribute::CurrentTime), &Observed::Unknown);

        // A value equal to the one cleared is a fresh change
        assert!(reconciler.apply(Attribute::CurrentTime, AttributeValue::Seconds(1.0)));
    }

    #[test]
    fn test_advancing_time_samples_always_report_change() {
        let mut reconciler = Reconciler::new();
        for tick in 0..3 {
            let seconds = tick as f64 * 0.1;
            assert!(reconciler.apply(Attribute::CurrentTime, AttributeValue::Seconds(seconds)));
        }
    }

    #[test]
    fn test_mixed_sources_single_funnel() {
        let mut reconciler = Reconciler::new();

        // Push-style updates
        reconciler.apply(
            Attribute::TimeControlStatus,
            AttributeValue::Status(TimeControlStatus::Playing),
        );
        reconciler.apply(
            Attribute::LoadedTimeRanges,
            AttributeValue::TimeRanges(vec![TimeRange::new(0.0, 4.2)]),
        );
        // Poll-style update
        reconciler.apply(Attribute::CurrentTime, AttributeValue::Seconds(0.1));

        let snapshot = reconciler.snapshot();
        assert_eq!(snapshot.known_count(), 3);
        assert_eq!(
            snapshot.get(Attribute::CurrentTime).value(),
            Some(&AttributeValue::Seconds(0.1))
        );
    }

    // Arbitrary update streams: the snapshot always holds the most
    // recently applied value per attribute, and apply() returns false
    // exactly when the incoming value equals the stored one.
    fn arbitrary_update() -> impl Strategy<Value = (Attribute, AttributeValue)> {
        let attribute = prop::sample::select(Attribute::ALL.to_vec());
        let value = prop_oneof![
            prop::bool::ANY.prop_map(AttributeValue::Flag),
            (0u32..600).prop_map(|t| AttributeValue::Seconds(t as f64 / 10.0)),
            (0u8..4).prop_map(|r| AttributeValue::Rate(r as f32 / 2.0)),
        ];
        (attribute, value)
    }

    proptest! {
        #[test]
        fn prop_last_write_wins(updates in prop::collection::vec(arbitrary_update(), 1..64)) {
            let mut reconciler = Reconciler::new();
            let mut expected: std::collections::HashMap<Attribute, AttributeValue> =
                std::collections::HashMap::new();

            for (attribute, value) in updates {
                let stored = expected.get(&attribute);
                let changed = reconciler.apply(attribute, value.clone());
                prop_assert_eq!(changed, stored != Some(&value));
                expected.insert(attribute, value);
            }

            for (attribute, value) in &expected {
                prop_assert_eq!(reconciler.snapshot().get(*attribute).value(), Some(value));
            }
        }
    }
}
