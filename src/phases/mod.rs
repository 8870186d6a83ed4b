//! Phases and prompts.
//!
//! A round is a fixed sequence of [`Phase`]s, each a nested pipeline built
//! when the round starts. Prompts are steps that wait until the players
//! they ask have answered.
//!
//! ## Key Components
//!
//! - [`Phase`]: Start marker, the phase's steps, end-of-phase cleanup
//! - [`setup_phase`]: Opening hands, mulligans and setup cards
//! - [`NextRound`]: Queues the seven round phases, then itself
//! - [`SelectCardPrompt`]: Pick cards matching a selector
//! - [`ActionWindow`]: Players take actions in turn until all pass

mod prompt;
mod reveal;
mod round;
mod select_card;
mod setup;

pub use prompt::{PlayerCompletion, PromptButton, PromptOutcome, PromptState};
pub use reveal::AcknowledgeRevealCardsPrompt;
pub use round::{round_phases, ActionWindow, NextRound, SelectPlotPrompt};
pub use select_card::SelectCardPrompt;
pub use setup::{setup_phase, CheckAttachmentsPrompt, KeepOrMulliganPrompt, SetupCardsPrompt};

use tracing::info;

use crate::core::{EntityId, PhaseKind, PlayerId};
use crate::effects::{DelayedTiming, Duration, EffectEngine};
use crate::game::{Game, MessageArg};
use crate::stack::{GamePipeline, SimpleStep, Step, StepStatus};
use crate::triggers::{EventKind, EventParams, LimitPeriod};

/// One phase of the match.
pub struct Phase {
    kind: PhaseKind,
    pipeline: GamePipeline,
}

impl Phase {
    #[must_use]
    pub fn new(kind: PhaseKind, steps: Vec<Box<dyn Step>>) -> Self {
        let mut all: Vec<Box<dyn Step>> = Vec::with_capacity(steps.len() + 3);
        all.push(Box::new(SimpleStep::new("start phase", move |game| start_phase(game, kind))));
        all.extend(steps);
        all.push(Box::new(SimpleStep::new("end phase", move |game| {
            game.raise_event(EventKind::PhaseEnded, EventParams::new().phase(kind));
        })));
        all.push(Box::new(SimpleStep::new("clean up phase", move |game| cleanup_phase(game, kind))));
        Self {
            kind,
            pipeline: GamePipeline::with_steps(all),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        self.kind
    }
}

fn start_phase(game: &mut Game, kind: PhaseKind) {
    game.set_phase(kind);
    info!(phase = %kind, round = game.round(), "phase started");
    if kind != PhaseKind::Setup {
        game.add_message("{0} phase", vec![MessageArg::Text(capitalize(kind.name()))]);
    }
    game.raise_event(EventKind::PhaseStarted, EventParams::new().phase(kind));
}

/// Lasting effects and limits scoped to the phase end with it.
fn cleanup_phase(game: &mut Game, kind: PhaseKind) {
    EffectEngine::expire(game, |_, duration| matches!(duration, Duration::UntilEndOfPhase));
    for delayed in game.effects_mut().take_delayed(DelayedTiming::EndOfPhase) {
        game.resolve_game_action(&delayed.action, &delayed.context);
    }
    game.abilities_mut().reset_limits(LimitPeriod::Phase);
    info!(phase = %kind, "phase ended");
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

impl Step for Phase {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        self.pipeline.continue_pipeline(game)
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        self.pipeline.on_card_clicked(game, player, card)
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, method: &str) -> bool {
        self.pipeline.on_menu_command(game, player, arg, method)
    }

    fn prompt_for(&self, game: &Game, player: PlayerId) -> Option<PromptState> {
        self.pipeline.prompt_for(game, player)
    }

    fn allows_actions(&self, player: PlayerId) -> bool {
        self.pipeline.allows_actions(player)
    }

    fn action_taken(&mut self, player: PlayerId) {
        self.pipeline.action_taken(player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("marshal"), "Marshal");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_phase_sets_current_phase() {
        use crate::core::GameConfig;

        let mut game = Game::new(GameConfig::head_to_head("a", "b"));
        let mut phase = Phase::new(PhaseKind::Draw, Vec::new());
        assert_eq!(phase.continue_step(&mut game), StepStatus::Complete);
        assert_eq!(game.current_phase(), PhaseKind::Draw);
        assert_eq!(game.messages()[0].text, "Draw phase");
    }
}
