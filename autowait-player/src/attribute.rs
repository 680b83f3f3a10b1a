//! Watched attribute identifiers
//!
//! Every independently observable property of the player or its current
//! item is named by an [`Attribute`]. The set is closed: the observer
//! tracks exactly these attributes and nothing else. Each attribute
//! belongs to a [`Scope`] (the handle that owns it) and is either
//! push-capable (the handle notifies on change) or poll-only (it must
//! be sampled on a timer because no change notification exists).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which handle an attribute is read from and subscribed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Attribute lives on the player itself (e.g., rate)
    Player,
    /// Attribute lives on the currently loaded item (e.g., buffer flags)
    Item,
}

/// Identifier for one tracked playback property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Current playback rate
    Rate,
    /// Whether playback is paused, playing, or waiting
    TimeControlStatus,
    /// Why the player is waiting to play, if it is
    WaitingReason,
    /// Whether the buffer is likely to keep up with playback
    BufferLikelyToKeepUp,
    /// Whether the buffer is full
    BufferFull,
    /// Whether the buffer is empty
    BufferEmpty,
    /// Buffered time ranges of the current item
    LoadedTimeRanges,
    /// Elapsed playback time (poll-only)
    CurrentTime,
    /// Rate of the item's timebase (poll-only)
    TimebaseRate,
}

impl Attribute {
    /// Every watched attribute, in declaration order
    pub const ALL: [Attribute; 9] = [
        Attribute::Rate,
        Attribute::TimeControlStatus,
        Attribute::WaitingReason,
        Attribute::BufferLikelyToKeepUp,
        Attribute::BufferFull,
        Attribute::BufferEmpty,
        Attribute::LoadedTimeRanges,
        Attribute::CurrentTime,
        Attribute::TimebaseRate,
    ];

    /// Attributes whose owning handle notifies on change
    pub const PUSH: [Attribute; 7] = [
        Attribute::Rate,
        Attribute::TimeControlStatus,
        Attribute::WaitingReason,
        Attribute::BufferLikelyToKeepUp,
        Attribute::BufferFull,
        Attribute::BufferEmpty,
        Attribute::LoadedTimeRanges,
    ];

    /// Attributes that must be sampled on a timer
    pub const POLLED: [Attribute; 2] = [Attribute::CurrentTime, Attribute::TimebaseRate];

    /// Number of watched attributes
    pub const COUNT: usize = Self::ALL.len();

    /// Stable string key for logging and display
    pub const fn key(self) -> &'static str {
        match self {
            Attribute::Rate => "rate",
            Attribute::TimeControlStatus => "time_control_status",
            Attribute::WaitingReason => "waiting_reason",
            Attribute::BufferLikelyToKeepUp => "buffer_likely_to_keep_up",
            Attribute::BufferFull => "buffer_full",
            Attribute::BufferEmpty => "buffer_empty",
            Attribute::LoadedTimeRanges => "loaded_time_ranges",
            Attribute::CurrentTime => "current_time",
            Attribute::TimebaseRate => "timebase_rate",
        }
    }

    /// The handle this attribute is resolved against
    pub const fn scope(self) -> Scope {
        match self {
            Attribute::Rate | Attribute::TimeControlStatus | Attribute::WaitingReason => {
                Scope::Player
            }
            Attribute::BufferLikelyToKeepUp
            | Attribute::BufferFull
            | Attribute::BufferEmpty
            | Attribute::LoadedTimeRanges
            | Attribute::CurrentTime
            | Attribute::TimebaseRate => Scope::Item,
        }
    }

    /// Whether the owning handle can notify on change
    pub const fn is_push(self) -> bool {
        !self.is_polled()
    }

    /// Whether this attribute must be read on a timer
    pub const fn is_polled(self) -> bool {
        matches!(self, Attribute::CurrentTime | Attribute::TimebaseRate)
    }

    /// Dense index for array-backed storage
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_polled_partition_all() {
        assert_eq!(Attribute::PUSH.len() + Attribute::POLLED.len(), Attribute::COUNT);

        for attribute in Attribute::ALL {
            assert_ne!(attribute.is_push(), attribute.is_polled());
        }

        for attribute in Attribute::PUSH {
            assert!(attribute.is_push());
        }
        for attribute in Attribute::POLLED {
            assert!(attribute.is_polled());
        }
    }

    #[test]
    fn test_polled_attributes_are_item_scoped() {
        for attribute in Attribute::POLLED {
            assert_eq!(attribute.scope(), Scope::Item);
        }
    }

    #[test]
    fn test_indexes_are_dense_and_unique() {
        for (expected, attribute) in Attribute::ALL.into_iter().enumerate() {
            assert_eq!(attribute.index(), expected);
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = Attribute::ALL.iter().map(|a| a.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Attribute::COUNT);
    }
}
