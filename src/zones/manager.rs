//! Pile manager for card ordering.
//!
//! A `Card` knows its own location; the `ZoneManager` tracks the *order* of
//! cards inside each player's piles so draws come off the top of the draw
//! deck and plots can be placed on the bottom. It supports:
//! - One ordered pile per (owner, location)
//! - Explicit position control (top, bottom, index)
//! - Shuffling with the match RNG
//!
//! Every card sits in its owner's pile for its location, attachments and
//! duplicates included. Their host is recorded on the cards themselves, and
//! play-area queries go through the cards (controller, parent) rather than
//! pile order.

use rustc_hash::FxHashMap;

use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;

use super::location::Location;

use serde::{Deserialize, Serialize};

/// Position for inserting a card into a pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of pile (e.g., top of draw deck).
    Top,
    /// Add to bottom of pile.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Key of a single pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pile {
    pub owner: PlayerId,
    pub location: Location,
}

impl Pile {
    /// Create a pile key.
    #[must_use]
    pub const fn new(owner: PlayerId, location: Location) -> Self {
        Self { owner, location }
    }
}

/// Tracks pile membership and order.
///
/// ## Usage
///
/// ```
/// use thrones_engine::zones::{Location, Pile, ZoneManager, ZonePosition};
/// use thrones_engine::core::{EntityId, PlayerId};
///
/// let mut manager = ZoneManager::new();
/// let deck = Pile::new(PlayerId(0), Location::DrawDeck);
///
/// manager.add_to_pile(EntityId(10), deck, ZonePosition::Top);
/// manager.add_to_pile(EntityId(11), deck, ZonePosition::Bottom);
///
/// assert_eq!(manager.top_card(deck), Some(EntityId(10)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Card membership: entity_id -> pile
    membership: FxHashMap<EntityId, Pile>,

    /// Ordered card lists, bottom to top.
    piles: FxHashMap<Pile, Vec<EntityId>>,
}

impl ZoneManager {
    /// Create a new empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card to a pile.
    ///
    /// A card already tracked elsewhere is moved instead of duplicated.
    pub fn add_to_pile(&mut self, entity: EntityId, pile: Pile, position: ZonePosition) {
        self.remove(entity);
        self.membership.insert(entity, pile);

        let order = self.piles.entry(pile).or_default();
        match position {
            ZonePosition::Top => order.push(entity),
            ZonePosition::Bottom => order.insert(0, entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    /// Remove a card from whatever pile holds it.
    ///
    /// Returns the pile it was in, or `None` if it was not tracked.
    pub fn remove(&mut self, entity: EntityId) -> Option<Pile> {
        let pile = self.membership.remove(&entity)?;

        if let Some(order) = self.piles.get_mut(&pile) {
            order.retain(|&e| e != entity);
        }

        Some(pile)
    }

    /// Get the pile a card is in.
    #[must_use]
    pub fn pile_of(&self, entity: EntityId) -> Option<Pile> {
        self.membership.get(&entity).copied()
    }

    /// Cards in a pile, bottom to top.
    #[must_use]
    pub fn cards(&self, pile: Pile) -> &[EntityId] {
        self.piles.get(&pile).map_or(&[], |v| v.as_slice())
    }

    /// Number of cards in a pile.
    #[must_use]
    pub fn pile_size(&self, pile: Pile) -> usize {
        self.cards(pile).len()
    }

    /// Top card of a pile (last in the vec).
    #[must_use]
    pub fn top_card(&self, pile: Pile) -> Option<EntityId> {
        self.piles.get(&pile)?.last().copied()
    }

    /// Top `count` cards, topmost first.
    #[must_use]
    pub fn top_cards(&self, pile: Pile, count: usize) -> Vec<EntityId> {
        self.cards(pile).iter().rev().take(count).copied().collect()
    }

    /// Shuffle a pile.
    pub fn shuffle_pile(&mut self, pile: Pile, rng: &mut GameRng) {
        if let Some(order) = self.piles.get_mut(&pile) {
            rng.shuffle(order);
        }
    }

    /// Check if the manager tracks an entity.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.membership.contains_key(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Pile {
        Pile::new(PlayerId(0), Location::DrawDeck)
    }

    #[test]
    fn test_ordered_pile() {
        let mut manager = ZoneManager::new();

        manager.add_to_pile(EntityId(10), deck(), ZonePosition::Top);
        manager.add_to_pile(EntityId(11), deck(), ZonePosition::Bottom);
        manager.add_to_pile(EntityId(12), deck(), ZonePosition::Top);

        // Order should be: [11, 10, 12] (bottom to top)
        assert_eq!(manager.cards(deck()), &[EntityId(11), EntityId(10), EntityId(12)]);
        assert_eq!(manager.top_card(deck()), Some(EntityId(12)));
        assert_eq!(manager.top_cards(deck(), 2), vec![EntityId(12), EntityId(10)]);
    }

    #[test]
    fn test_add_moves_between_piles() {
        let mut manager = ZoneManager::new();
        let hand = Pile::new(PlayerId(0), Location::Hand);

        manager.add_to_pile(EntityId(10), deck(), ZonePosition::Top);
        manager.add_to_pile(EntityId(10), hand, ZonePosition::Top);

        assert_eq!(manager.pile_of(EntityId(10)), Some(hand));
        assert_eq!(manager.pile_size(deck()), 0);
        assert_eq!(manager.pile_size(hand), 1);
    }

    #[test]
    fn test_remove() {
        let mut manager = ZoneManager::new();

        manager.add_to_pile(EntityId(10), deck(), ZonePosition::Top);

        assert_eq!(manager.remove(EntityId(10)), Some(deck()));
        assert!(!manager.contains(EntityId(10)));
        assert_eq!(manager.remove(EntityId(10)), None);
    }

    #[test]
    fn test_position_index() {
        let mut manager = ZoneManager::new();

        manager.add_to_pile(EntityId(10), deck(), ZonePosition::Top);
        manager.add_to_pile(EntityId(11), deck(), ZonePosition::Top);
        manager.add_to_pile(EntityId(12), deck(), ZonePosition::Index(1));

        assert_eq!(manager.cards(deck()), &[EntityId(10), EntityId(12), EntityId(11)]);
    }

    #[test]
    fn test_shuffle() {
        let mut manager = ZoneManager::new();
        for i in 0..20 {
            manager.add_to_pile(EntityId(i), deck(), ZonePosition::Top);
        }

        let before: Vec<_> = manager.cards(deck()).to_vec();
        let mut rng = GameRng::new(42);
        manager.shuffle_pile(deck(), &mut rng);
        let after: Vec<_> = manager.cards(deck()).to_vec();

        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }
}
