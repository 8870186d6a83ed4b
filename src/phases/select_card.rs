//! Card selection prompt.
//!
//! One player picks cards matching a [`CardSelector`]. On start the
//! player's selection is saved and cleared; on completion it is restored,
//! so a selection nested inside another (reveal, then select) leaves the
//! outer one intact.
//!
//! - Clicking an eligible card toggles it.
//! - Single-card selectors fire as soon as a card is clicked.
//! - `Done` with nothing selected cancels.
//! - Must-select cards start selected when they fit within the limit and
//!   then cannot be deselected. When they do not fit, only must-select
//!   cards can be picked.

use tracing::{debug, warn};

use crate::core::{EntityId, PlayerId};
use crate::effects::{ActionContext, CardSelector};
use crate::game::{Game, Selection};
use crate::stack::{Step, StepStatus};

use super::prompt::{PromptButton, PromptOutcome, PromptState};

type SelectHandler = Box<dyn Fn(&mut Game, PlayerId, &[EntityId]) -> PromptOutcome>;
type CancelHandler = Box<dyn Fn(&mut Game, PlayerId)>;
type MenuHandler = Box<dyn Fn(&mut Game, PlayerId, &str) -> PromptOutcome>;

pub struct SelectCardPrompt {
    player: PlayerId,
    selector: CardSelector,
    context: ActionContext,
    title: Option<String>,
    buttons: Vec<PromptButton>,
    must_select: Vec<EntityId>,
    must_select_locked: bool,
    selected: Vec<EntityId>,
    previous: Option<Selection>,
    complete: bool,
    on_select: Option<SelectHandler>,
    on_cancel: Option<CancelHandler>,
    on_menu_command: Option<MenuHandler>,
}

impl SelectCardPrompt {
    #[must_use]
    pub fn new(player: PlayerId, selector: CardSelector, context: ActionContext) -> Self {
        Self {
            player,
            selector,
            context,
            title: None,
            buttons: Vec::new(),
            must_select: Vec::new(),
            must_select_locked: false,
            selected: Vec::new(),
            previous: None,
            complete: false,
            on_select: None,
            on_cancel: None,
            on_menu_command: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a button routed to the menu command handler (builder pattern).
    #[must_use]
    pub fn with_button(mut self, text: impl Into<String>, arg: impl Into<String>) -> Self {
        self.buttons.push(PromptButton::new(text, arg));
        self
    }

    #[must_use]
    pub fn must_select(mut self, cards: Vec<EntityId>) -> Self {
        self.must_select = cards;
        self
    }

    #[must_use]
    pub fn on_select(
        mut self,
        handler: impl Fn(&mut Game, PlayerId, &[EntityId]) -> PromptOutcome + 'static,
    ) -> Self {
        self.on_select = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_cancel(mut self, handler: impl Fn(&mut Game, PlayerId) + 'static) -> Self {
        self.on_cancel = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_menu_command(
        mut self,
        handler: impl Fn(&mut Game, PlayerId, &str) -> PromptOutcome + 'static,
    ) -> Self {
        self.on_menu_command = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    fn start(&mut self, game: &mut Game) {
        let player = game.player_mut(self.player);
        self.previous = Some(player.selection());
        player.clear_selection();

        let fits = self
            .selector
            .number_of_cards()
            .is_none_or(|limit| self.must_select.len() <= limit);
        if fits {
            self.selected = self.must_select.clone();
        }
        self.must_select_locked = fits && !self.must_select.is_empty();
        self.refresh(game);
    }

    fn refresh(&self, game: &mut Game) {
        let eligible = self.selector.eligible_cards(game, &self.context);
        let player = game.player_mut(self.player);
        player.selectable_cards = eligible;
        player.selected_cards = self.selected.clone();
    }

    fn finish(&mut self, game: &mut Game) {
        if let Some(previous) = self.previous.take() {
            game.player_mut(self.player).restore_selection(previous);
        }
        self.complete = true;
    }

    fn cancel(&mut self, game: &mut Game) {
        debug!(player = %self.player, "selection cancelled");
        if let Some(on_cancel) = &self.on_cancel {
            on_cancel(game, self.player);
        }
        self.finish(game);
    }

    fn fire_select(&mut self, game: &mut Game) {
        let selected = self.selected.clone();
        let outcome = match &self.on_select {
            Some(on_select) => on_select(game, self.player, &selected),
            None => PromptOutcome::Complete,
        };
        match outcome {
            PromptOutcome::Complete => self.finish(game),
            PromptOutcome::Continue => {
                self.selected.clear();
                self.refresh(game);
            }
        }
    }
}

impl Step for SelectCardPrompt {
    fn name(&self) -> &str {
        "select card prompt"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if self.complete {
            return StepStatus::Complete;
        }
        if self.previous.is_none() {
            if !self.selector.has_enough_targets(game, &self.context) {
                self.cancel(game);
                return StepStatus::Complete;
            }
            self.start(game);
        }
        StepStatus::Waiting
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        if player != self.player || self.complete {
            return false;
        }
        let eligible = game
            .card(card)
            .is_some_and(|c| self.selector.can_target(game, c, &self.context));
        if !eligible {
            warn!(%player, %card, "card cannot be selected");
            return false;
        }

        if !self.must_select_locked && !self.must_select.is_empty() && !self.must_select.contains(&card) {
            warn!(%player, %card, "card is not one of the required choices");
            return false;
        }

        if let Some(index) = self.selected.iter().position(|&c| c == card) {
            if self.must_select_locked && self.must_select.contains(&card) {
                return false;
            }
            self.selected.remove(index);
        } else {
            if !self.selector.automatic_fire_on_select() && self.selector.has_reached_limit(&self.selected) {
                return false;
            }
            if self.selector.automatic_fire_on_select() {
                self.selected.clear();
            }
            self.selected.push(card);
        }

        if self.selector.automatic_fire_on_select() {
            self.fire_select(game);
        } else {
            self.refresh(game);
        }
        true
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, _method: &str) -> bool {
        if player != self.player || self.complete {
            return false;
        }
        if arg == "done" {
            if self.selected.is_empty() {
                self.cancel(game);
            } else if self.selector.has_enough_selected(&self.selected) {
                self.fire_select(game);
            } else {
                return false;
            }
            return true;
        }

        let Some(handler) = &self.on_menu_command else {
            return false;
        };
        if handler(game, player, arg) == PromptOutcome::Complete {
            self.finish(game);
        }
        true
    }

    fn prompt_for(&self, _game: &Game, player: PlayerId) -> Option<PromptState> {
        if player != self.player {
            return Some(PromptState::waiting("Waiting for opponent"));
        }
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| self.selector.default_active_prompt_title());
        let mut buttons = vec![PromptButton::new("Done", "done")];
        buttons.extend(self.buttons.iter().cloned());
        Some(PromptState::menu(title, buttons).selecting())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::cards::{CardData, CardRegistry, CardType, Faction};
    use crate::core::GameConfig;
    use crate::zones::Location;

    const ALICE: PlayerId = PlayerId(0);

    /// A match with `count` characters in play for alice.
    fn game_with_characters(count: usize) -> (Game, Vec<EntityId>) {
        let registry = CardRegistry::new();
        let mut game = Game::new(GameConfig::head_to_head("alice", "bob"));
        let cards = (0..count)
            .map(|n| {
                let data = CardData::new(format!("c{n}"), format!("Knight {n}"), CardType::Character, Faction::Stark);
                game.create_card(&registry, ALICE, Rc::new(data), Location::PlayArea).unwrap()
            })
            .collect();
        (game, cards)
    }

    fn prompt(selector: CardSelector) -> SelectCardPrompt {
        SelectCardPrompt::new(ALICE, selector.in_location(Location::PlayArea), ActionContext::new(ALICE))
    }

    #[test]
    fn test_must_select_cards_that_fit_stay_selected() {
        let (mut game, cards) = game_with_characters(3);
        let mut prompt = prompt(CardSelector::up_to(2)).must_select(vec![cards[0], cards[1]]);
        assert_eq!(prompt.continue_step(&mut game), StepStatus::Waiting);
        assert_eq!(prompt.selected(), &[cards[0], cards[1]]);
        assert_eq!(game.player(ALICE).selected_cards, vec![cards[0], cards[1]]);

        assert!(!prompt.on_card_clicked(&mut game, ALICE, cards[0]));
        assert_eq!(prompt.selected(), &[cards[0], cards[1]]);
    }

    #[test]
    fn test_must_select_cards_that_do_not_fit_can_be_toggled() {
        let (mut game, cards) = game_with_characters(3);
        let mut prompt = prompt(CardSelector::up_to(1)).must_select(vec![cards[0], cards[1]]);
        prompt.continue_step(&mut game);
        assert!(prompt.selected().is_empty());

        assert!(!prompt.on_card_clicked(&mut game, ALICE, cards[2]));
        assert!(prompt.on_card_clicked(&mut game, ALICE, cards[0]));
        assert_eq!(prompt.selected(), &[cards[0]]);
        assert!(prompt.on_card_clicked(&mut game, ALICE, cards[0]));
        assert!(prompt.selected().is_empty());
        assert!(prompt.on_card_clicked(&mut game, ALICE, cards[1]));
        assert_eq!(prompt.selected(), &[cards[1]]);
    }

    #[test]
    fn test_single_selector_fires_on_click() {
        let (mut game, cards) = game_with_characters(2);
        let chosen = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&chosen);
        let mut prompt = prompt(CardSelector::single()).on_select(move |_game, _player, selected| {
            record.borrow_mut().extend_from_slice(selected);
            PromptOutcome::Complete
        });
        prompt.continue_step(&mut game);

        assert!(prompt.on_card_clicked(&mut game, ALICE, cards[1]));
        assert_eq!(*chosen.borrow(), vec![cards[1]]);
        assert_eq!(prompt.continue_step(&mut game), StepStatus::Complete);
    }

    #[test]
    fn test_done_with_too_few_cards_is_rejected() {
        let (mut game, cards) = game_with_characters(3);
        let mut prompt = prompt(CardSelector::exactly(2));
        prompt.continue_step(&mut game);

        assert!(prompt.on_card_clicked(&mut game, ALICE, cards[0]));
        assert!(!Step::on_menu_command(&mut prompt, &mut game, ALICE, "done", "menuButton"));
        assert_eq!(prompt.continue_step(&mut game), StepStatus::Waiting);

        assert!(prompt.on_card_clicked(&mut game, ALICE, cards[2]));
        assert!(!prompt.on_card_clicked(&mut game, ALICE, cards[1]), "limit reached");
        assert!(Step::on_menu_command(&mut prompt, &mut game, ALICE, "done", "menuButton"));
        assert_eq!(prompt.continue_step(&mut game), StepStatus::Complete);
    }

    #[test]
    fn test_done_with_nothing_cancels_and_restores_selection() {
        let (mut game, cards) = game_with_characters(2);
        game.player_mut(ALICE).selected_cards = vec![cards[1]];
        let cancelled = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&cancelled);
        let mut prompt = prompt(CardSelector::up_to(2)).on_cancel(move |_game, _player| *flag.borrow_mut() = true);

        prompt.continue_step(&mut game);
        assert!(game.player(ALICE).selected_cards.is_empty());
        assert!(Step::on_menu_command(&mut prompt, &mut game, ALICE, "done", "menuButton"));

        assert!(*cancelled.borrow());
        assert_eq!(game.player(ALICE).selected_cards, vec![cards[1]]);
        assert_eq!(prompt.continue_step(&mut game), StepStatus::Complete);
    }
}
