//! Ability restrictions ("cannot be knelt by card effects").
//!
//! A restriction names a kind of game action and optionally the stage of
//! ability resolution it applies to. Cards check their restrictions in
//! `Card::allow_game_action`.

use serde::{Deserialize, Serialize};

use crate::core::EntityId;

/// Kinds of game action a card can be protected from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Kneel,
    Stand,
    GainPower,
    DiscardPower,
    RemoveFromGame,
    Reveal,
    Discard,
    ReturnToHand,
    ReturnToDeck,
    PutIntoPlay,
    Save,
    Target,
}

/// Where in ability resolution an action happens.
///
/// "Cannot be knelt by card effects" only blocks kneels paid as part of
/// an effect, not kneels paid as costs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStage {
    Cost,
    #[default]
    Effect,
    /// Actions taken by the game rules, outside any ability.
    Framework,
}

/// A restriction placed on a card by a persistent effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRestriction {
    /// The effect source that placed it, used to remove it again.
    pub source: EntityId,

    /// Blocked action.
    pub action: ActionKind,

    /// Only block during this stage. `None` blocks at every stage.
    pub stage: Option<ResolutionStage>,

    /// Aspect name; a card that loses this aspect ignores the restriction.
    pub name: Option<String>,
}

impl AbilityRestriction {
    /// Create a restriction blocking `action` at every stage.
    #[must_use]
    pub fn new(source: EntityId, action: ActionKind) -> Self {
        Self {
            source,
            action,
            stage: None,
            name: None,
        }
    }

    /// Only block during the given stage (builder pattern).
    #[must_use]
    pub fn during(mut self, stage: ResolutionStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Name the restriction after an aspect (builder pattern).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this restriction blocks `action` at `stage`.
    #[must_use]
    pub fn is_match(&self, action: ActionKind, stage: ResolutionStage) -> bool {
        self.action == action && self.stage.is_none_or(|required| required == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstaged_restriction_matches_all_stages() {
        let restriction = AbilityRestriction::new(EntityId(1), ActionKind::Kneel);
        assert!(restriction.is_match(ActionKind::Kneel, ResolutionStage::Cost));
        assert!(restriction.is_match(ActionKind::Kneel, ResolutionStage::Effect));
        assert!(!restriction.is_match(ActionKind::Stand, ResolutionStage::Effect));
    }

    #[test]
    fn test_staged_restriction() {
        let restriction =
            AbilityRestriction::new(EntityId(1), ActionKind::Kneel).during(ResolutionStage::Effect);
        assert!(restriction.is_match(ActionKind::Kneel, ResolutionStage::Effect));
        assert!(!restriction.is_match(ActionKind::Kneel, ResolutionStage::Cost));
    }
}
