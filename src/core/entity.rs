//! Card instance identification.
//!
//! Every physical card dealt into a match gets a unique `EntityId`
//! (the card's uuid in summaries). Ids are allocated sequentially by the
//! match when decks are loaded and are never reused, so cards moved out of
//! game keep their identity.
//!
//! ## Usage
//!
//! ```
//! use thrones_engine::core::{EntityId, EntityAllocator};
//!
//! let mut ids = EntityAllocator::new();
//! let first = ids.allocate();
//! let second = ids.allocate();
//!
//! assert_eq!(first, EntityId(0));
//! assert_ne!(first, second);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Sequential allocator for card instance ids.
#[derive(Clone, Debug, Default)]
pub struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    /// Create an allocator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.next as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_sequential() {
        let mut ids = EntityAllocator::new();

        assert_eq!(ids.allocate(), EntityId(0));
        assert_eq!(ids.allocate(), EntityId(1));
        assert_eq!(ids.allocate(), EntityId(2));
        assert_eq!(ids.allocated(), 3);
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        assert!(EntityId(3) < EntityId(10));
        assert_eq!(EntityId::new(7).raw(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Card(42)");
    }

    #[test]
    fn test_serialization() {
        let id = EntityId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
