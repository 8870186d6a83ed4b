//! Per-seat match state.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// A player's selected and selectable cards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub selected: Vec<EntityId>,
    pub selectable: Vec<EntityId>,
}

/// One seat at the table.
///
/// Selection state lives here so prompts and summaries read the same
/// source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,

    /// Gold in the player's pool.
    pub gold: u32,

    /// The player's faction card, once the deck is loaded.
    pub faction: Option<EntityId>,

    pub agendas: Vec<EntityId>,

    pub selected_cards: Vec<EntityId>,
    pub selectable_cards: Vec<EntityId>,

    /// Took a mulligan during setup.
    pub mulliganed: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gold: 0,
            faction: None,
            agendas: Vec::new(),
            selected_cards: Vec::new(),
            selectable_cards: Vec::new(),
            mulliganed: false,
        }
    }

    /// Add or remove gold. The pool never goes below zero.
    pub fn modify_gold(&mut self, amount: i32) {
        self.gold = self.gold.saturating_add_signed(amount);
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection {
            selected: self.selected_cards.clone(),
            selectable: self.selectable_cards.clone(),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_cards.clear();
        self.selectable_cards.clear();
    }

    pub fn restore_selection(&mut self, selection: Selection) {
        self.selected_cards = selection.selected;
        self.selectable_cards = selection.selectable;
    }

    #[must_use]
    pub fn is_selected(&self, card: EntityId) -> bool {
        self.selected_cards.contains(&card)
    }

    #[must_use]
    pub fn is_selectable(&self, card: EntityId) -> bool {
        self.selectable_cards.contains(&card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gold_never_negative() {
        let mut player = Player::new(PlayerId(0), "alice");
        player.modify_gold(3);
        player.modify_gold(-5);
        assert_eq!(player.gold, 0);
    }

    #[test]
    fn test_selection_round_trip() {
        let mut player = Player::new(PlayerId(0), "alice");
        player.selected_cards = vec![EntityId(1)];
        player.selectable_cards = vec![EntityId(1), EntityId(2)];

        let saved = player.selection();
        player.clear_selection();
        assert!(!player.is_selected(EntityId(1)));

        player.restore_selection(saved);
        assert!(player.is_selected(EntityId(1)));
        assert!(player.is_selectable(EntityId(2)));
    }
}
