//! Ability resolution.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::core::{EntityId, PlayerId};
use crate::game::Game;
use crate::phases::{PromptOutcome, PromptState, SelectCardPrompt};
use crate::triggers::{AbilityContext, AbilityId};

use super::{GamePipeline, SimpleStep, Step, StepStatus};

/// Resolves one ability.
///
/// Steps, sharing one [`AbilityContext`]:
/// 1. re-check the ability can still resolve
/// 2. choose targets
/// 3. re-check then pay costs; if any cost can no longer be paid, nothing
///    is paid and the resolution is cancelled
/// 4. count the use against the limit, send the message, run the handler
///
/// Any step can cancel the resolution; later steps then do nothing.
pub struct AbilityResolver {
    context: Rc<RefCell<AbilityContext>>,
    pipeline: GamePipeline,
}

impl AbilityResolver {
    #[must_use]
    pub fn new(ability: AbilityId, context: AbilityContext) -> Self {
        let context = Rc::new(RefCell::new(context));

        let check = {
            let context = Rc::clone(&context);
            SimpleStep::new("check ability", move |game: &mut Game| {
                let snapshot = context.borrow().clone();
                let can_resolve = game.abilities().get(ability).is_some_and(|trigger| {
                    trigger.meets_requirements(game, &snapshot)
                        && !game.abilities().limit_reached(ability)
                        && (snapshot.events.is_empty()
                            || snapshot.events.iter().any(|&event| !game.events().is_cancelled(event)))
                });
                if !can_resolve {
                    debug!(%ability, "ability can no longer resolve");
                    context.borrow_mut().cancelled = true;
                }
            })
        };

        let targets = {
            let context = Rc::clone(&context);
            SimpleStep::new("choose targets", move |game: &mut Game| {
                if context.borrow().cancelled {
                    return;
                }
                let Some(selector) = game.abilities().get(ability).and_then(|trigger| trigger.target.clone())
                else {
                    return;
                };
                let (player, action_context) = {
                    let context = context.borrow();
                    (context.player, context.action_context())
                };
                let on_select = Rc::clone(&context);
                let on_cancel = Rc::clone(&context);
                let prompt = SelectCardPrompt::new(player, selector, action_context)
                    .on_select(move |_game, _player, cards| {
                        on_select.borrow_mut().targets = cards.to_vec();
                        PromptOutcome::Complete
                    })
                    .on_cancel(move |_game, _player| {
                        on_cancel.borrow_mut().cancelled = true;
                    });
                game.queue_step(Box::new(prompt));
            })
        };

        let costs = {
            let context = Rc::clone(&context);
            SimpleStep::new("pay costs", move |game: &mut Game| {
                if context.borrow().cancelled {
                    return;
                }
                let costs = game
                    .abilities()
                    .get(ability)
                    .map(|trigger| trigger.costs.clone())
                    .unwrap_or_default();
                let mut paying = context.borrow().clone();
                if !costs.iter().all(|cost| cost.can_pay(game, &paying)) {
                    debug!(%ability, "costs can no longer be paid");
                    context.borrow_mut().cancelled = true;
                    return;
                }
                for cost in &costs {
                    cost.pay(game, &mut paying);
                }
                context.borrow_mut().cost_cards = paying.cost_cards;
            })
        };

        let resolve = {
            let context = Rc::clone(&context);
            SimpleStep::new("resolve ability", move |game: &mut Game| {
                let snapshot = context.borrow().clone();
                if snapshot.cancelled {
                    return;
                }
                let Some(trigger) = game.abilities().get(ability).cloned() else {
                    return;
                };
                game.abilities_mut().increment_use(ability);
                if let Some(message) = &trigger.message {
                    game.add_context_message(
                        message,
                        snapshot.player,
                        Some(snapshot.source),
                        &snapshot.targets,
                    );
                }
                info!(%ability, card = %snapshot.source, player = %snapshot.player, "ability resolved");
                if let Some(handler) = &trigger.handler {
                    handler(game, &snapshot);
                }
            })
        };

        let pipeline = GamePipeline::with_steps(vec![
            Box::new(check),
            Box::new(targets),
            Box::new(costs),
            Box::new(resolve),
        ]);
        Self { context, pipeline }
    }

    /// The context shared by the resolution steps.
    #[must_use]
    pub fn context(&self) -> AbilityContext {
        self.context.borrow().clone()
    }
}

impl Step for AbilityResolver {
    fn name(&self) -> &str {
        "ability resolver"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{register_catalog, CardData, CardRegistry, CardType, Faction};
    use crate::core::GameConfig;
    use crate::zones::Location;

    const ALICE: PlayerId = PlayerId(0);

    /// The Eyrie and a knight in play for alice, with the Eyrie's action
    /// waiting on its target.
    fn eyrie_waiting_for_target() -> (Game, EntityId, EntityId) {
        let mut registry = CardRegistry::new();
        register_catalog(&mut registry).unwrap();
        let mut game = Game::new(GameConfig::head_to_head("alice", "bob"));
        let eyrie = game
            .create_card(&registry, ALICE, registry.data("01156").unwrap(), Location::PlayArea)
            .unwrap();
        let knight = CardData::new("k", "Winterfell Knight", CardType::Character, Faction::Stark);
        let knight = game
            .create_card(&registry, ALICE, Rc::new(knight), Location::PlayArea)
            .unwrap();

        let ability = game.abilities().actions_of(eyrie)[0];
        game.queue_step(Box::new(AbilityResolver::new(ability, AbilityContext::new(ability, eyrie, ALICE))));
        game.continue_game();
        assert!(game.player(ALICE).is_selectable(knight));
        (game, eyrie, knight)
    }

    fn resolved_messages(game: &Game) -> usize {
        game.messages().iter().filter(|message| message.text.contains("+2 STR")).count()
    }

    #[test]
    fn test_costs_paid_after_targeting() {
        let (mut game, eyrie, knight) = eyrie_waiting_for_target();
        assert!(!game.card(eyrie).unwrap().kneeled);
        assert!(game.card_clicked(ALICE, knight));

        assert!(game.card(eyrie).unwrap().kneeled);
        assert_eq!(resolved_messages(&game), 1);
    }

    #[test]
    fn test_cost_unpayable_after_targeting_cancels() {
        let (mut game, eyrie, knight) = eyrie_waiting_for_target();
        game.card_mut(eyrie).unwrap().kneeled = true;

        assert!(game.card_clicked(ALICE, knight));
        assert_eq!(resolved_messages(&game), 0);
        assert!(game.player(ALICE).selectable_cards.is_empty());
    }
}
