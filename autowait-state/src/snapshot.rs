//! Immutable attribute snapshot
//!
//! A [`Snapshot`] is the current merged belief about every watched
//! attribute. It is total: every attribute has an entry from the moment
//! a snapshot exists, [`Observed::Unknown`] until first observed.
//! Storage is an array indexed by the attribute enum, so there is no
//! key to miss and no key to remove.

use std::fmt;

use autowait_player::{Attribute, AttributeValue};

/// Latest known state of one attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Observed {
    /// Never observed, or the owning handle is absent
    #[default]
    Unknown,
    /// Most recently observed value
    Known(AttributeValue),
}

impl Observed {
    pub fn is_known(&self) -> bool {
        matches!(self, Observed::Known(_))
    }

    /// The value, when one has been observed
    pub fn value(&self) -> Option<&AttributeValue> {
        match self {
            Observed::Unknown => None,
            Observed::Known(value) => Some(value),
        }
    }
}

impl From<Option<AttributeValue>> for Observed {
    fn from(value: Option<AttributeValue>) -> Self {
        match value {
            None => Observed::Unknown,
            Some(value) => Observed::Known(value),
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Unknown => f.write_str("-"),
            Observed::Known(value) => write!(f, "{}", value),
        }
    }
}

/// Value bag holding the latest known value of each watched attribute
///
/// Value semantics throughout: [`Snapshot::with`] returns a new
/// snapshot, equality is attribute-wise, nothing is shared or mutable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    values: [Observed; Attribute::COUNT],
}

impl Snapshot {
    /// A snapshot with every attribute unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest state of an attribute
    pub fn get(&self, attribute: Attribute) -> &Observed {
        &self.values[attribute.index()]
    }

    /// Copy with exactly one attribute replaced
    pub fn with(&self, attribute: Attribute, observed: Observed) -> Snapshot {
        let mut values = self.values.clone();
        values[attribute.index()] = observed;
        Snapshot { values }
    }

    /// Iterate all attributes with their observed state
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &Observed)> {
        Attribute::ALL
            .into_iter()
            .map(move |attribute| (attribute, self.get(attribute)))
    }

    /// Number of attributes observed at least once
    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|o| o.is_known()).count()
    }
}
