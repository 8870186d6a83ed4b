//! The setup phase.
//!
//! 1. announce factions and agendas
//! 2. shuffle draw decks and pick a random first player
//! 3. activate effects that work from any location, draw opening hands
//! 4. keep or mulligan
//! 5. place setup cards facedown within the setup gold
//! 6. draw back up, return gold, reveal setup cards (`SetupFinished`)
//! 7. attach setup attachments, then activate every persistent effect

use tracing::{debug, info};

use crate::cards::{Card, CardType};
use crate::core::{EntityId, PhaseKind, PlayerId};
use crate::effects::{Activation, EffectEngine};
use crate::game::{Game, MessageArg};
use crate::stack::{SimpleStep, Step, StepStatus};
use crate::triggers::{EventKind, EventParams};
use crate::zones::{Location, ZonePosition};

use super::prompt::{PlayerCompletion, PromptButton, PromptState};
use super::Phase;

/// The setup phase pipeline.
#[must_use]
pub fn setup_phase() -> Phase {
    Phase::new(
        PhaseKind::Setup,
        vec![
            Box::new(SimpleStep::new("announce decks", announce_decks)),
            Box::new(SimpleStep::new("prepare decks", |game| {
                let players: Vec<PlayerId> = game.player_ids().collect();
                for player in players {
                    game.shuffle_deck(player);
                }
            })),
            Box::new(SimpleStep::new("choose first player", choose_first_player)),
            Box::new(SimpleStep::new("activate any-location effects", |game| {
                game.effects_mut().activate(Activation::AnyLocation);
                EffectEngine::recalculate(game);
            })),
            Box::new(SimpleStep::new("draw opening hands", |game| {
                let size = game.config().starting_hand_size;
                for player in game.players_in_priority_order() {
                    game.draw_cards(player, size);
                }
            })),
            Box::new(KeepOrMulliganPrompt::default()),
            Box::new(SimpleStep::new("start game", |game| {
                let gold = game.config().setup_gold;
                let players: Vec<PlayerId> = game.player_ids().collect();
                for player in players {
                    game.player_mut(player).gold = gold;
                }
            })),
            Box::new(SetupCardsPrompt::default()),
            Box::new(SimpleStep::new("announce setup", |game| {
                for player in game.players_in_priority_order() {
                    let cards = game.cards_in(player, Location::PlayArea);
                    game.add_message(
                        "{0} sets up {1} cards",
                        vec![MessageArg::Player(player), MessageArg::Number(cards.len() as i64)],
                    );
                }
            })),
            Box::new(SimpleStep::new("finalize setup", finalize_setup)),
            Box::new(CheckAttachmentsPrompt::default()),
            Box::new(SimpleStep::new("activate persistent effects", |game| {
                game.effects_mut().activate(Activation::All);
                EffectEngine::recalculate(game);
                info!("setup complete");
            })),
        ],
    )
}

fn announce_decks(game: &mut Game) {
    for player in game.players_in_priority_order() {
        let seat = game.player(player);
        let mut args = vec![MessageArg::Player(player)];
        args.push(seat.faction.map_or(MessageArg::Text("no faction".into()), MessageArg::Card));
        if seat.agendas.is_empty() {
            game.add_message("{0} announces {1}", args);
        } else {
            args.push(MessageArg::Cards(seat.agendas.clone()));
            game.add_message("{0} announces {1} with {2}", args);
        }
    }
}

fn choose_first_player(game: &mut Game) {
    let count = game.player_count();
    let index = game.rng_mut().gen_range_usize(0..count);
    let player = PlayerId(index as u8);
    game.set_first_player(player);
    info!(%player, "first player chosen");
    game.add_message("{0} has been randomly selected to be first player", vec![MessageArg::Player(player)]);
}

fn finalize_setup(game: &mut Game) {
    let size = game.config().starting_hand_size;
    for player in game.players_in_priority_order() {
        let in_hand = game.pile_size(player, Location::Hand);
        game.draw_cards(player, size.saturating_sub(in_hand));
        game.player_mut(player).gold = 0;

        let setup: Vec<EntityId> = [Location::PlayArea, Location::Duplicate]
            .into_iter()
            .flat_map(|location| game.cards_in(player, location))
            .collect();
        for card in setup {
            if let Some(card) = game.card_mut(card) {
                card.facedown = false;
            }
        }
    }
    game.raise_event(EventKind::SetupFinished, EventParams::new());
}

/// Every player keeps their opening hand or redraws it once.
#[derive(Debug, Default)]
pub struct KeepOrMulliganPrompt {
    completion: PlayerCompletion,
}

impl KeepOrMulliganPrompt {
    fn mulligan(game: &mut Game, player: PlayerId) {
        let hand = game.cards_in(player, Location::Hand);
        for &card in &hand {
            game.move_card(card, Location::DrawDeck, None, ZonePosition::Top);
        }
        game.shuffle_deck(player);
        game.draw_cards(player, hand.len());
        game.player_mut(player).mulliganed = true;
    }
}

impl Step for KeepOrMulliganPrompt {
    fn name(&self) -> &str {
        "keep or mulligan"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if self.completion.all_complete(game) {
            StepStatus::Complete
        } else {
            StepStatus::Waiting
        }
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, _method: &str) -> bool {
        if self.completion.is_complete(player) {
            return false;
        }
        match arg {
            "keep" => game.add_message("{0} has kept their hand", vec![MessageArg::Player(player)]),
            "mulligan" => {
                Self::mulligan(game, player);
                game.add_message("{0} has taken a mulligan", vec![MessageArg::Player(player)]);
            }
            _ => return false,
        }
        self.completion.complete(player);
        true
    }

    fn prompt_for(&self, _game: &Game, player: PlayerId) -> Option<PromptState> {
        if self.completion.is_complete(player) {
            return Some(PromptState::waiting("Waiting for opponent to keep hand or mulligan"));
        }
        Some(PromptState::menu(
            "Keep or mulligan?",
            vec![
                PromptButton::new("Keep Hand", "keep"),
                PromptButton::new("Mulligan", "mulligan"),
            ],
        ))
    }
}

/// Players place cards from hand facedown, paying their cost from the
/// setup gold. A copy of a unique card already set up goes on it as a
/// free duplicate. Clicking a placed card takes it back.
#[derive(Debug, Default)]
pub struct SetupCardsPrompt {
    completion: PlayerCompletion,
}

impl SetupCardsPrompt {
    fn can_set_up(card: &Card) -> bool {
        matches!(
            card.card_type(),
            CardType::Character | CardType::Location | CardType::Attachment
        )
    }

    fn duplicate_host(game: &Game, player: PlayerId, card: &Card) -> Option<EntityId> {
        if !card.is_unique() {
            return None;
        }
        game.cards_in(player, Location::PlayArea)
            .into_iter()
            .find(|&other| game.card(other).is_some_and(|other| other.is_copy_of(card)))
    }

    fn place(game: &mut Game, player: PlayerId, id: EntityId) -> bool {
        let Some(card) = game.card(id) else {
            return false;
        };
        if !Self::can_set_up(card) {
            return false;
        }
        if let Some(host) = Self::duplicate_host(game, player, card) {
            game.move_card(id, Location::Duplicate, Some(host), ZonePosition::Top);
        } else {
            let cost = card.data().cost.unwrap_or(0);
            if cost > game.player(player).gold {
                return false;
            }
            game.player_mut(player).gold -= cost;
            game.move_card(id, Location::PlayArea, None, ZonePosition::Top);
        }
        if let Some(card) = game.card_mut(id) {
            card.facedown = true;
        }
        debug!(%player, card = %id, "setup card placed");
        true
    }

    fn take_back(game: &mut Game, player: PlayerId, id: EntityId) {
        let Some(card) = game.card(id) else {
            return;
        };
        let refund = match card.location {
            Location::PlayArea => card.data().cost.unwrap_or(0),
            _ => 0,
        };
        let dupes = card.dupes.clone();
        for dupe in dupes {
            game.move_card(dupe, Location::Hand, None, ZonePosition::Top);
        }
        game.move_card(id, Location::Hand, None, ZonePosition::Top);
        game.player_mut(player).gold += refund;
    }
}

impl Step for SetupCardsPrompt {
    fn name(&self) -> &str {
        "setup cards"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if self.completion.all_complete(game) {
            StepStatus::Complete
        } else {
            StepStatus::Waiting
        }
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        if self.completion.is_complete(player) {
            return false;
        }
        let Some(location) = game.card(card).filter(|c| c.owner == player).map(|c| c.location) else {
            return false;
        };
        match location {
            Location::Hand => Self::place(game, player, card),
            Location::PlayArea | Location::Duplicate => {
                Self::take_back(game, player, card);
                true
            }
            _ => false,
        }
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, _method: &str) -> bool {
        if arg != "setupdone" || self.completion.is_complete(player) {
            return false;
        }
        info!(%player, gold_left = game.player(player).gold, "setup cards chosen");
        self.completion.complete(player);
        true
    }

    fn prompt_for(&self, _game: &Game, player: PlayerId) -> Option<PromptState> {
        if self.completion.is_complete(player) {
            return Some(PromptState::waiting("Waiting for opponent to finish setup"));
        }
        Some(
            PromptState::menu("Select setup cards", vec![PromptButton::new("Done", "setupdone")])
                .selecting(),
        )
    }
}

/// Players attach their setup attachments. Attachments left unattached
/// when a player clicks Done are discarded.
#[derive(Debug, Default)]
pub struct CheckAttachmentsPrompt {
    completion: PlayerCompletion,
    selected: Vec<(PlayerId, EntityId)>,
    started: bool,
}

impl CheckAttachmentsPrompt {
    fn unattached(game: &Game, player: PlayerId) -> Vec<EntityId> {
        game.cards_in(player, Location::PlayArea)
            .into_iter()
            .filter(|&id| {
                game.card(id)
                    .is_some_and(|card| card.card_type() == CardType::Attachment && card.parent.is_none())
            })
            .collect()
    }

    fn selected_for(&self, player: PlayerId) -> Option<EntityId> {
        self.selected
            .iter()
            .find(|(owner, _)| *owner == player)
            .map(|&(_, card)| card)
    }
}

impl Step for CheckAttachmentsPrompt {
    fn name(&self) -> &str {
        "check attachments"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if !self.started {
            self.started = true;
            let players: Vec<PlayerId> = game.player_ids().collect();
            for player in players {
                if Self::unattached(game, player).is_empty() {
                    self.completion.complete(player);
                }
            }
        }
        if self.completion.all_complete(game) {
            StepStatus::Complete
        } else {
            StepStatus::Waiting
        }
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        if self.completion.is_complete(player) {
            return false;
        }
        if Self::unattached(game, player).contains(&card) {
            self.selected.retain(|(owner, _)| *owner != player);
            self.selected.push((player, card));
            game.player_mut(player).selected_cards = vec![card];
            return true;
        }

        let Some(attachment) = self.selected_for(player) else {
            return false;
        };
        let is_character = game
            .card(card)
            .is_some_and(|c| c.location == Location::PlayArea && c.card_type() == CardType::Character);
        if !is_character {
            return false;
        }
        game.attach(attachment, card);
        self.selected.retain(|(owner, _)| *owner != player);
        game.player_mut(player).selected_cards.clear();
        true
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, _method: &str) -> bool {
        if arg != "mapattachments" || self.completion.is_complete(player) {
            return false;
        }
        for attachment in Self::unattached(game, player) {
            game.move_card(attachment, Location::DiscardPile, None, ZonePosition::Top);
        }
        self.selected.retain(|(owner, _)| *owner != player);
        self.completion.complete(player);
        true
    }

    fn prompt_for(&self, _game: &Game, player: PlayerId) -> Option<PromptState> {
        if self.completion.is_complete(player) {
            return Some(PromptState::waiting("Waiting for opponent to finish setup"));
        }
        Some(
            PromptState::menu("Select attachment locations", vec![PromptButton::new("Done", "mapattachments")])
                .selecting(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardData, CardRegistry, Faction};
    use crate::core::GameConfig;
    use crate::deck::{Deck, DeckCard};

    fn deck() -> Deck {
        let knight = CardData::new("k", "Knight", CardType::Character, Faction::Stark).with_cost(3);
        let mut deck = Deck::new("test", Faction::Stark);
        deck.draw_cards.push(DeckCard::new(10, knight));
        deck
    }

    fn started() -> Game {
        let registry = CardRegistry::new();
        let mut game = Game::new(GameConfig::head_to_head("a", "b").with_starting_hand_size(3));
        for player in [PlayerId(0), PlayerId(1)] {
            game.load_deck(&registry, player, &deck()).unwrap();
        }
        game.begin();
        game
    }

    #[test]
    fn test_opening_hands_drawn() {
        let game = started();
        assert_eq!(game.pile_size(PlayerId(0), Location::Hand), 3);
        assert_eq!(game.pile_size(PlayerId(1), Location::DrawDeck), 7);
        assert!(game.first_player().is_some());
    }

    #[test]
    fn test_keep_then_setup_prompt() {
        let mut game = started();
        assert!(game.menu_button(PlayerId(0), "keep", "menuButton"));
        assert!(!game.menu_button(PlayerId(0), "keep", "menuButton"));
        assert_eq!(
            game.prompt_for(PlayerId(0)).unwrap().menu_title,
            "Waiting for opponent to keep hand or mulligan"
        );
        assert!(game.menu_button(PlayerId(1), "mulligan", "menuButton"));
        assert!(game.player(PlayerId(1)).mulliganed);
        assert_eq!(game.pile_size(PlayerId(1), Location::Hand), 3);
        assert_eq!(game.player(PlayerId(0)).gold, 8);
        assert_eq!(game.prompt_for(PlayerId(0)).unwrap().menu_title, "Select setup cards");
    }

    #[test]
    fn test_setup_cards_cost_gold() {
        let mut game = started();
        game.menu_button(PlayerId(0), "keep", "menuButton");
        game.menu_button(PlayerId(1), "keep", "menuButton");

        let hand = game.cards_in(PlayerId(0), Location::Hand);
        assert!(game.card_clicked(PlayerId(0), hand[0]));
        assert!(game.card_clicked(PlayerId(0), hand[1]));
        assert!(!game.card_clicked(PlayerId(0), hand[2]), "only 2 gold left");
        assert_eq!(game.player(PlayerId(0)).gold, 2);
        assert!(game.card(hand[0]).unwrap().facedown);

        assert!(game.card_clicked(PlayerId(0), hand[1]));
        assert_eq!(game.player(PlayerId(0)).gold, 5);
    }
}
