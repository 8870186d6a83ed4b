//! Card selectors.
//!
//! A [`CardSelector`] describes which cards an ability or prompt may pick
//! and how many:
//! - `Single`: one card, fired as soon as it is clicked
//! - `ExactlyX(n)`: exactly `n` cards
//! - `UpToX(n)`: between one and `n` cards
//! - `Unlimited`: any number of cards
//!
//! `optional` selectors also accept an empty selection.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::cards::{ActionKind, Card, CardType};
use crate::core::EntityId;
use crate::game::Game;
use crate::zones::Location;

use super::action::ActionContext;

/// How many cards a selector picks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorMode {
    Single,
    ExactlyX(usize),
    UpToX(usize),
    Unlimited,
}

/// Extra predicate over candidate cards.
pub type CardCondition = Rc<dyn Fn(&Game, &Card, &ActionContext) -> bool>;

/// Which cards can be selected, and how many.
#[derive(Clone)]
pub struct CardSelector {
    pub mode: SelectorMode,
    pub optional: bool,

    /// Allowed card types. Empty allows every type.
    pub card_types: Vec<CardType>,

    /// Allowed locations. Empty allows every location.
    pub locations: Vec<Location>,

    pub condition: Option<CardCondition>,

    /// Action the selected cards must be able to receive.
    pub game_action: Option<ActionKind>,
}

impl fmt::Debug for CardSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSelector")
            .field("mode", &self.mode)
            .field("optional", &self.optional)
            .field("card_types", &self.card_types)
            .field("locations", &self.locations)
            .field("game_action", &self.game_action)
            .finish_non_exhaustive()
    }
}

impl CardSelector {
    fn new(mode: SelectorMode) -> Self {
        Self {
            mode,
            optional: false,
            card_types: Vec::new(),
            locations: Vec::new(),
            condition: None,
            game_action: None,
        }
    }

    #[must_use]
    pub fn single() -> Self {
        Self::new(SelectorMode::Single)
    }

    #[must_use]
    pub fn exactly(count: usize) -> Self {
        Self::new(SelectorMode::ExactlyX(count))
    }

    #[must_use]
    pub fn up_to(count: usize) -> Self {
        Self::new(SelectorMode::UpToX(count))
    }

    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(SelectorMode::Unlimited)
    }

    /// Accept an empty selection (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_card_type(mut self, card_type: CardType) -> Self {
        self.card_types.push(card_type);
        self
    }

    #[must_use]
    pub fn in_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn with_condition(
        mut self,
        condition: impl Fn(&Game, &Card, &ActionContext) -> bool + 'static,
    ) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    #[must_use]
    pub fn with_game_action(mut self, action: ActionKind) -> Self {
        self.game_action = Some(action);
        self
    }

    /// Whether `card` may be selected.
    #[must_use]
    pub fn can_target(&self, game: &Game, card: &Card, context: &ActionContext) -> bool {
        if !self.card_types.is_empty() && !self.card_types.contains(&card.card_type()) {
            return false;
        }
        if !self.locations.is_empty() && !self.locations.contains(&card.location) {
            return false;
        }
        if let Some(action) = self.game_action {
            if !card.allow_game_action(ActionKind::Target, context.stage)
                || !card.allow_game_action(action, context.stage)
            {
                return false;
            }
        }
        self.condition
            .as_ref()
            .is_none_or(|condition| condition(game, card, context))
    }

    /// Every card in the match that may be selected.
    #[must_use]
    pub fn eligible_cards(&self, game: &Game, context: &ActionContext) -> Vec<EntityId> {
        let mut cards: Vec<EntityId> = game
            .cards()
            .filter(|card| self.can_target(game, card, context))
            .map(|card| card.id)
            .collect();
        cards.sort();
        cards
    }

    /// Cards the selector needs, if bounded.
    #[must_use]
    pub fn number_of_cards(&self) -> Option<usize> {
        match self.mode {
            SelectorMode::Single => Some(1),
            SelectorMode::ExactlyX(count) | SelectorMode::UpToX(count) => Some(count),
            SelectorMode::Unlimited => None,
        }
    }

    /// Whether the selection can be submitted.
    #[must_use]
    pub fn has_enough_selected(&self, selected: &[EntityId]) -> bool {
        match self.mode {
            SelectorMode::ExactlyX(count) => {
                (selected.is_empty() && self.optional) || selected.len() == count
            }
            _ => self.optional || !selected.is_empty(),
        }
    }

    /// Whether enough selectable cards exist for the selector to be
    /// satisfiable. Abilities failing this are not offered.
    #[must_use]
    pub fn has_enough_targets(&self, game: &Game, context: &ActionContext) -> bool {
        if self.optional {
            return true;
        }
        let matching = game
            .cards()
            .filter(|card| self.can_target(game, card, context))
            .count();
        match self.mode {
            SelectorMode::ExactlyX(count) => matching >= count,
            _ => matching > 0,
        }
    }

    /// Whether no further cards need to be selected.
    #[must_use]
    pub fn has_reached_limit(&self, selected: &[EntityId]) -> bool {
        self.number_of_cards()
            .is_some_and(|count| selected.len() >= count)
    }

    /// Whether more cards are selected than allowed.
    #[must_use]
    pub fn has_exceeded_limit(&self, selected: &[EntityId]) -> bool {
        self.number_of_cards()
            .is_some_and(|count| selected.len() > count)
    }

    /// Whether clicking a card completes the selection immediately.
    #[must_use]
    pub fn automatic_fire_on_select(&self) -> bool {
        self.mode == SelectorMode::Single
    }

    #[must_use]
    pub fn default_active_prompt_title(&self) -> String {
        match self.mode {
            SelectorMode::Single | SelectorMode::ExactlyX(1) => "Select a character".to_string(),
            SelectorMode::ExactlyX(count) => format!("Select {count} characters"),
            SelectorMode::UpToX(count) => format!("Select up to {count} cards"),
            SelectorMode::Unlimited => "Select cards".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: u32) -> Vec<EntityId> {
        (0..count).map(EntityId).collect()
    }

    #[test]
    fn test_exactly_two_has_enough_selected() {
        let selector = CardSelector::exactly(2);
        assert!(!selector.has_enough_selected(&ids(0)));
        assert!(!selector.has_enough_selected(&ids(1)));
        assert!(selector.has_enough_selected(&ids(2)));
        assert!(!selector.has_enough_selected(&ids(3)));
    }

    #[test]
    fn test_optional_exactly_accepts_empty() {
        let selector = CardSelector::exactly(2).optional();
        assert!(selector.has_enough_selected(&ids(0)));
        assert!(!selector.has_enough_selected(&ids(1)));
    }

    #[test]
    fn test_limits() {
        let selector = CardSelector::up_to(2);
        assert!(!selector.has_reached_limit(&ids(1)));
        assert!(selector.has_reached_limit(&ids(2)));
        assert!(!selector.has_exceeded_limit(&ids(2)));
        assert!(selector.has_exceeded_limit(&ids(3)));

        let unlimited = CardSelector::unlimited();
        assert!(!unlimited.has_reached_limit(&ids(30)));
        assert!(!unlimited.has_exceeded_limit(&ids(30)));
    }

    #[test]
    fn test_single_fires_on_select() {
        assert!(CardSelector::single().automatic_fire_on_select());
        assert!(!CardSelector::exactly(1).automatic_fire_on_select());
    }

    #[test]
    fn test_prompt_titles() {
        assert_eq!(CardSelector::exactly(1).default_active_prompt_title(), "Select a character");
        assert_eq!(CardSelector::exactly(3).default_active_prompt_title(), "Select 3 characters");
    }
}
