//! Which cards each player may see.
//!
//! Public locations show face-up cards to everyone. A player always sees
//! their own hand, shadows, plot deck and face-down cards in play. Extra
//! rules (revealed cards) are added and removed at runtime.

use std::fmt;
use std::rc::Rc;

use crate::cards::Card;
use crate::core::PlayerId;
use crate::zones::Location;

use super::Game;

pub type VisibilityRule = Rc<dyn Fn(&Game, &Card, PlayerId) -> bool>;

/// Handle for removing a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RuleId(u32);

#[derive(Clone, Default)]
pub struct Visibility {
    rules: Vec<(RuleId, VisibilityRule)>,
    next_id: u32,
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visibility")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Visibility {
    pub fn add_rule(&mut self, rule: impl Fn(&Game, &Card, PlayerId) -> bool + 'static) -> RuleId {
        let id = RuleId(self.next_id);
        self.next_id += 1;
        self.rules.push((id, Rc::new(rule)));
        id
    }

    pub fn remove_rule(&mut self, id: RuleId) {
        self.rules.retain(|(rule, _)| *rule != id);
    }

    #[must_use]
    pub fn is_visible(&self, game: &Game, card: &Card, viewer: PlayerId) -> bool {
        let own = card.owner == viewer || card.controller() == viewer;
        let base = if card.facedown {
            own && card.location == Location::PlayArea
        } else if card.location.is_public() {
            true
        } else {
            own && matches!(card.location, Location::Hand | Location::Shadows | Location::PlotDeck)
        };
        base || self.rules.iter().any(|(_, rule)| rule(game, card, viewer))
    }
}
