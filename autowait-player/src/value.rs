//! Attribute value types
//!
//! [`AttributeValue`] is the tagged union carried by change
//! notifications and stored in snapshots. Display renderings follow the
//! demo's on-screen formatting: times as `2.4s`, ranges as
//! `[2.4s, 2.8s]`, absent waiting reasons as `-`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Playback status of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeControlStatus {
    Paused,
    Playing,
    /// Playback was requested but the player is waiting (e.g., buffering)
    WaitingToPlayAtRate,
}

impl fmt::Display for TimeControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeControlStatus::Paused => f.write_str("Paused"),
            TimeControlStatus::Playing => f.write_str("Playing"),
            TimeControlStatus::WaitingToPlayAtRate => f.write_str("Waiting"),
        }
    }
}

/// Why the player is waiting to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitingReason {
    /// Holding back playback to avoid a stall
    MinimizingStalls,
    /// Measuring whether the buffer fills fast enough
    EvaluatingBufferingRate,
    /// No item is loaded
    NoItemToPlay,
    /// A reason this demo does not recognize
    Other,
}

impl WaitingReason {
    /// Short human-readable description
    pub const fn abbreviated(self) -> &'static str {
        match self {
            WaitingReason::MinimizingStalls => "Minimizing Stalls",
            WaitingReason::EvaluatingBufferingRate => "Evaluating Buffering Rate",
            WaitingReason::NoItemToPlay => "No Item",
            WaitingReason::Other => "Unknown",
        }
    }
}

impl fmt::Display for WaitingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviated())
    }
}

/// A buffered span of media time, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}s, {:.1}s]", self.start, self.end)
    }
}

/// Current value of one watched attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Playback rate
    Rate(f32),
    /// Player status
    Status(TimeControlStatus),
    /// Waiting reason; `None` when the player is not waiting
    Waiting(Option<WaitingReason>),
    /// Boolean buffer flag
    Flag(bool),
    /// Ordered buffered ranges
    TimeRanges(Vec<TimeRange>),
    /// Elapsed time or timebase rate, in seconds resp. seconds/second
    Seconds(f64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Rate(rate) => write!(f, "{}", rate),
            AttributeValue::Status(status) => write!(f, "{}", status),
            AttributeValue::Waiting(Some(reason)) => write!(f, "{}", reason),
            AttributeValue::Waiting(None) => f.write_str("-"),
            AttributeValue::Flag(flag) => write!(f, "{}", flag),
            AttributeValue::TimeRanges(ranges) => {
                let rendered: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            AttributeValue::Seconds(seconds) => write!(f, "{:.1}s", seconds),
        }
    }
}
