//! Acknowledgement of revealed cards.

use crate::core::{EntityId, PlayerId};
use crate::game::Game;
use crate::stack::{Step, StepStatus};

use super::prompt::{PromptButton, PromptState};

/// Keeps revealed cards on screen until the revealing player clicks Done.
#[derive(Clone, Debug)]
pub struct AcknowledgeRevealCardsPrompt {
    cards: Vec<EntityId>,
    player: PlayerId,
    acknowledged: bool,
}

impl AcknowledgeRevealCardsPrompt {
    #[must_use]
    pub fn new(cards: Vec<EntityId>, player: PlayerId) -> Self {
        Self {
            cards,
            player,
            acknowledged: false,
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[EntityId] {
        &self.cards
    }
}

impl Step for AcknowledgeRevealCardsPrompt {
    fn name(&self) -> &str {
        "acknowledge reveal prompt"
    }

    fn continue_step(&mut self, _game: &mut Game) -> StepStatus {
        if self.acknowledged {
            StepStatus::Complete
        } else {
            StepStatus::Waiting
        }
    }

    fn on_menu_command(&mut self, _game: &mut Game, player: PlayerId, arg: &str, _method: &str) -> bool {
        if player != self.player || arg != "done" {
            return false;
        }
        self.acknowledged = true;
        true
    }

    fn prompt_for(&self, _game: &Game, player: PlayerId) -> Option<PromptState> {
        if player == self.player {
            Some(PromptState::menu(
                "Acknowledge revealed cards",
                vec![PromptButton::new("Done", "done")],
            ))
        } else {
            Some(PromptState::waiting("Waiting for opponent to acknowledge revealed cards"))
        }
    }
}
