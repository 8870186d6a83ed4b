//! Event windows.
//!
//! An [`EventWindow`] resolves one event tree:
//!
//! 1. forced interrupts, then interrupts
//! 2. default effects, for the tree and then for attached events
//! 3. forced reactions, then reactions
//! 4. follow-ups registered with `then_execute`
//! 5. persistent effect recalculation
//!
//! Cancelled events skip their default effect and are invisible to
//! reactions; sibling events are unaffected.

use tracing::debug;

use crate::core::{EntityId, PlayerId};
use crate::effects::EffectEngine;
use crate::game::Game;
use crate::phases::PromptState;
use crate::triggers::{EventId, TimingClass};

use super::{GamePipeline, SimpleStep, Step, StepStatus, TriggeredAbilityWindow};

pub struct EventWindow {
    root: EventId,
    pipeline: GamePipeline,
}

impl EventWindow {
    #[must_use]
    pub fn new(root: EventId) -> Self {
        let trigger = |timing: TimingClass| -> Box<dyn Step> {
            Box::new(TriggeredAbilityWindow::new(timing, root))
        };
        let pipeline = GamePipeline::with_steps(vec![
            trigger(TimingClass::ForcedInterrupt),
            trigger(TimingClass::Interrupt),
            Box::new(SimpleStep::new("execute handlers", move |game| {
                execute_handlers(game, root);
            })),
            trigger(TimingClass::ForcedReaction),
            trigger(TimingClass::Reaction),
            Box::new(SimpleStep::new("post handlers", move |game| {
                for (event, handler) in game.events_mut().take_post_handlers(root) {
                    handler(game, event);
                }
            })),
            Box::new(SimpleStep::new("recalculate effects", move |game| {
                EffectEngine::recalculate(game);
                game.events_mut().release(root);
            })),
        ]);
        Self { root, pipeline }
    }

    #[must_use]
    pub fn root(&self) -> EventId {
        self.root
    }
}

fn execute_handlers(game: &mut Game, root: EventId) {
    loop {
        let pending: Vec<EventId> = game
            .events()
            .concurrent(root)
            .into_iter()
            .filter(|&id| {
                game.events()
                    .get(id)
                    .is_some_and(|event| !event.is_resolved() && !event.is_cancelled())
            })
            .collect();
        if pending.is_empty() {
            break;
        }

        for id in pending {
            // An earlier handler in this pass may have cancelled it.
            if game.events().is_cancelled(id) {
                continue;
            }
            let handler = game.events_mut().take_handler(id);
            if let Some(event) = game.events().get(id) {
                debug!(event = %id, kind = %event.kind, "resolving event");
            }
            if let Some(handler) = handler {
                handler(game, id);
            }
            if let Some(event) = game.events().get(id).cloned() {
                EffectEngine::expire_for_event(game, &event);
            }
        }
    }
}

impl Step for EventWindow {
    fn name(&self) -> &str {
        "event window"
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
}
