//! The (player, item) pair under observation

use std::sync::Arc;

use crate::attribute::{Attribute, Scope};
use crate::handle::ObservableHandle;
use crate::value::AttributeValue;

/// The pair of handles currently being observed
///
/// The item is optional: nothing may be loaded. Item-scoped attributes
/// then have no handle to resolve against and read as absent. Handle
/// identity is pointer identity; two targets share a player iff they
/// hold the same `Arc`.
#[derive(Clone)]
pub struct Target {
    player: Arc<dyn ObservableHandle>,
    item: Option<Arc<dyn ObservableHandle>>,
}

impl Target {
    pub fn new(player: Arc<dyn ObservableHandle>, item: Option<Arc<dyn ObservableHandle>>) -> Self {
        Self { player, item }
    }

    pub fn player(&self) -> &Arc<dyn ObservableHandle> {
        &self.player
    }

    pub fn item(&self) -> Option<&Arc<dyn ObservableHandle>> {
        self.item.as_ref()
    }

    pub fn has_item(&self) -> bool {
        self.item.is_some()
    }

    /// Resolve the handle that owns an attribute
    ///
    /// `None` for item-scoped attributes while no item is loaded.
    pub fn handle_for(&self, attribute: Attribute) -> Option<&Arc<dyn ObservableHandle>> {
        match attribute.scope() {
            Scope::Player => Some(&self.player),
            Scope::Item => self.item.as_ref(),
        }
    }

    /// Read an attribute from whichever handle owns it
    pub fn read(&self, attribute: Attribute) -> Option<AttributeValue> {
        self.handle_for(attribute)?.read(attribute)
    }

    /// Whether both targets observe the same player instance
    pub fn same_player(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.player, &other.player)
    }

    /// Whether both targets observe the same item instance (or both none)
    pub fn same_item(&self, other: &Target) -> bool {
        match (&self.item, &other.item) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("has_item", &self.has_item())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimulatedItem, SimulatedPlayer};

    #[test]
    fn test_handle_resolution_without_item() {
        let player = Arc::new(SimulatedPlayer::new());
        let target = Target::new(player, None);

        assert!(target.handle_for(Attribute::Rate).is_some());
        assert!(target.handle_for(Attribute::BufferFull).is_none());
        assert!(target.read(Attribute::BufferFull).is_none());
    }

    #[test]
    fn test_same_player_is_pointer_identity() {
        let player = Arc::new(SimulatedPlayer::new());
        let item = Arc::new(SimulatedItem::new());

        let a = Target::new(player.clone(), None);
        let b = Target::new(player.clone(), Some(item));
        let c = Target::new(Arc::new(SimulatedPlayer::new()), None);

        assert!(a.same_player(&b));
        assert!(!a.same_player(&c));
        assert!(!a.same_item(&b));
    }
}
