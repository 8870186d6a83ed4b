//! Trigger windows for reactions and interrupts.

use tracing::{debug, warn};

use crate::core::{EntityId, PlayerId};
use crate::game::Game;
use crate::phases::{PromptButton, PromptState};
use crate::triggers::{collect_triggers, AbilityContext, EventId, TimingClass, TriggerChoice};

use super::{AbilityResolver, Step, StepStatus};

const METHOD: &str = "triggered";

/// Offers the triggers of one timing class for an event tree.
///
/// Forced triggers resolve automatically, one at a time, in player
/// priority order. Optional triggers are offered to each player in
/// priority order until every player with a choice has passed. The list is
/// rebuilt after every resolution, so a reaction whose source has left its
/// listening locations is no longer offered.
pub struct TriggeredAbilityWindow {
    timing: TimingClass,
    root: EventId,
    used: Vec<TriggerChoice>,
    passed: Vec<PlayerId>,
    prompt: Option<(PlayerId, Vec<TriggerChoice>)>,
}

impl TriggeredAbilityWindow {
    #[must_use]
    pub fn new(timing: TimingClass, root: EventId) -> Self {
        Self {
            timing,
            root,
            used: Vec::new(),
            passed: Vec::new(),
            prompt: None,
        }
    }

    fn available(&self, game: &Game) -> Vec<TriggerChoice> {
        let events = game.events().concurrent(self.root);
        collect_triggers(game, self.timing, &events)
            .into_iter()
            .filter(|choice| game.abilities().is_listening(choice.ability))
            .filter(|choice| !self.used.contains(choice))
            .collect()
    }

    fn resolve(&mut self, game: &mut Game, choice: TriggerChoice) {
        let Some(source) = game.abilities().get(choice.ability).map(|ability| ability.source) else {
            return;
        };
        debug!(ability = %choice.ability, card = %source, timing = ?self.timing, "trigger chosen");
        let context = AbilityContext::new(choice.ability, source, choice.player)
            .with_events(choice.events.clone());
        self.used.push(choice.clone());
        game.queue_step(Box::new(AbilityResolver::new(choice.ability, context)));
    }

    fn title(&self) -> &'static str {
        if self.timing.is_interrupt() {
            "Any interrupts?"
        } else {
            "Any reactions?"
        }
    }

    fn button_text(game: &Game, choice: &TriggerChoice) -> String {
        let Some(ability) = game.abilities().get(choice.ability) else {
            return String::new();
        };
        let label = game.card(ability.source).map(|card| card.label().to_string()).unwrap_or_default();
        if ability.title.is_empty() {
            label
        } else {
            format!("{label} - {}", ability.title)
        }
    }
}

impl Step for TriggeredAbilityWindow {
    fn name(&self) -> &str {
        "triggered ability window"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        self.prompt = None;
        let choices = self.available(game);
        if choices.is_empty() {
            return StepStatus::Complete;
        }

        if self.timing.is_forced() {
            if let Some(choice) = choices.into_iter().next() {
                self.resolve(game, choice);
            }
            return StepStatus::Waiting;
        }

        for player in game.players_in_priority_order() {
            if self.passed.contains(&player) {
                continue;
            }
            let mine: Vec<TriggerChoice> = choices
                .iter()
                .filter(|choice| choice.player == player)
                .cloned()
                .collect();
            if !mine.is_empty() {
                self.prompt = Some((player, mine));
                return StepStatus::Waiting;
            }
        }
        StepStatus::Complete
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, method: &str) -> bool {
        if method != METHOD {
            return false;
        }
        let Some((prompted, choices)) = self.prompt.take() else {
            return false;
        };
        if prompted != player {
            warn!(%player, "trigger choice from a player without the prompt");
            self.prompt = Some((prompted, choices));
            return false;
        }

        if arg == "pass" {
            debug!(%player, "passed trigger window");
            self.passed.push(player);
            return true;
        }

        let choice = arg.parse::<usize>().ok().and_then(|index| choices.get(index).cloned());
        match choice {
            Some(choice) if game.abilities().is_listening(choice.ability) => {
                self.resolve(game, choice);
                true
            }
            _ => {
                self.prompt = Some((prompted, choices));
                false
            }
        }
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        let index = self.prompt.as_ref().and_then(|(prompted, choices)| {
            if *prompted != player {
                return None;
            }
            choices.iter().position(|choice| {
                game.abilities()
                    .get(choice.ability)
                    .is_some_and(|ability| ability.source == card)
            })
        });
        match index {
            Some(index) => self.on_menu_command(game, player, &index.to_string(), METHOD),
            None => false,
        }
    }

    fn prompt_for(&self, game: &Game, player: PlayerId) -> Option<PromptState> {
        let (prompted, choices) = self.prompt.as_ref()?;
        if *prompted != player {
            return Some(PromptState::waiting("Waiting for opponent"));
        }
        let mut buttons: Vec<PromptButton> = choices
            .iter()
            .enumerate()
            .map(|(index, choice)| {
                PromptButton::new(Self::button_text(game, choice), index.to_string()).with_method(METHOD)
            })
            .collect();
        buttons.push(PromptButton::new("Pass", "pass").with_method(METHOD));
        Some(PromptState::menu(self.title(), buttons))
    }
}
