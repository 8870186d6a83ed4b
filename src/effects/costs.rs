//! Ability costs.
//!
//! Costs are checked before an ability is offered and paid after targets
//! are chosen. Paying a cost resolves a game action at the `Cost` stage, so
//! "cannot be knelt by card effects" does not block kneeling to pay.

use serde::{Deserialize, Serialize};

use crate::cards::ResolutionStage;
use crate::game::Game;
use crate::triggers::AbilityContext;

use super::action::GameAction;

/// A cost an ability requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    /// Kneel the ability's source card.
    KneelSelf,
    /// Kneel the controller's faction card.
    KneelFactionCard,
    /// Pay gold from the controller's pool.
    PayGold(u32),
    /// Discard the source card from play.
    SacrificeSelf,
}

impl Cost {
    /// Whether the cost could be paid right now.
    #[must_use]
    pub fn can_pay(&self, game: &Game, context: &AbilityContext) -> bool {
        let action_context = context.action_context().at_stage(ResolutionStage::Cost);
        match self {
            Self::KneelSelf => GameAction::kneel(context.source).allow(game, &action_context),
            Self::KneelFactionCard => game
                .faction_card(context.player)
                .is_some_and(|card| GameAction::kneel(card).allow(game, &action_context)),
            Self::PayGold(amount) => game.player(context.player).gold >= *amount,
            Self::SacrificeSelf => GameAction::discard(context.source).allow(game, &action_context),
        }
    }

    /// Pay the cost, recording the cards used on the context.
    pub fn pay(&self, game: &mut Game, context: &mut AbilityContext) {
        let action_context = context.action_context().at_stage(ResolutionStage::Cost);
        match self {
            Self::KneelSelf => {
                context.cost_cards.push(context.source);
                game.resolve_game_action(&GameAction::kneel(context.source), &action_context);
            }
            Self::KneelFactionCard => {
                if let Some(card) = game.faction_card(context.player) {
                    context.cost_cards.push(card);
                    game.resolve_game_action(&GameAction::kneel(card), &action_context);
                }
            }
            Self::PayGold(amount) => {
                let amount = *amount as i32;
                game.player_mut(context.player).modify_gold(-amount);
            }
            Self::SacrificeSelf => {
                context.cost_cards.push(context.source);
                game.resolve_game_action(&GameAction::discard(context.source), &action_context);
            }
        }
    }
}
