//! Game actions.
//!
//! A [`GameAction`] is a parameterised operation on the match. Each action
//! can say whether it would change anything ([`GameAction::allow`]) and
//! builds the event that performs the change when it resolves
//! ([`GameAction::create_event`]). Nothing is mutated until the event
//! window runs the event's handler, so interrupts can cancel it.
//!
//! ## Composition
//!
//! - `Simultaneously`: one parent event with a child per allowed action.
//!   Children resolve independently; cancelling one leaves the others.
//! - `Atomic`: all members resolve as one unit. Cancelling any member
//!   cancels the whole bundle.
//! - `Then`: a follow-up action resolved in a new window after the first
//!   one, if its event was not cancelled.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::cards::{ActionKind, Card, ResolutionStage};
use crate::core::{EntityId, PlayerId};
use crate::game::{Game, MessageArg};
use crate::phases::AcknowledgeRevealCardsPrompt;
use crate::triggers::{EventId, EventKind, EventParams};
use crate::zones::{Location, ZonePosition};

/// Who is taking an action, for what, and at which stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    pub player: PlayerId,
    pub source: Option<EntityId>,
    pub stage: ResolutionStage,
}

impl ActionContext {
    /// Context for an action taken by the game rules on behalf of `player`.
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            source: None,
            stage: ResolutionStage::Framework,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn at_stage(mut self, stage: ResolutionStage) -> Self {
        self.stage = stage;
        self
    }
}

/// Custom action body for card scripts.
#[derive(Clone)]
pub struct ActionHandler(pub Rc<dyn Fn(&mut Game, &ActionContext)>);

impl ActionHandler {
    pub fn new(handler: impl Fn(&mut Game, &ActionContext) + 'static) -> Self {
        Self(Rc::new(handler))
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionHandler")
    }
}

/// A state-changing operation.
#[derive(Clone, Debug)]
pub enum GameAction {
    RemoveFromGame {
        card: EntityId,
        allow_save: bool,
    },
    RevealCards {
        cards: Vec<EntityId>,
        player: PlayerId,
        is_cost: bool,
        /// Resolved while the cards are revealed. Defaults to a prompt
        /// asking the revealing player to acknowledge the reveal.
        while_revealed: Option<Box<GameAction>>,
    },
    GainPower {
        card: EntityId,
        amount: u32,
    },
    DiscardPower {
        card: EntityId,
        amount: u32,
    },
    DrawCards {
        player: PlayerId,
        amount: u32,
    },
    GainGold {
        player: PlayerId,
        amount: u32,
    },
    /// Return gold from a player's pool to the treasury.
    ReturnGold {
        player: PlayerId,
        amount: u32,
    },
    PlaceCard {
        card: EntityId,
        player: PlayerId,
        location: Location,
        position: ZonePosition,
    },
    AddToHand {
        card: EntityId,
    },
    /// Put a card into play under `player`'s control.
    PutIntoPlay {
        card: EntityId,
        player: PlayerId,
    },
    ReturnCardToDeck {
        card: EntityId,
        bottom: bool,
    },
    LeavePlay {
        card: EntityId,
        destination: Location,
        allow_save: bool,
    },
    Kneel {
        card: EntityId,
    },
    Stand {
        card: EntityId,
    },
    Simultaneously(Vec<GameAction>),
    Atomic(Vec<GameAction>),
    Then {
        action: Box<GameAction>,
        then: Box<GameAction>,
        message: Option<String>,
    },
    Handler(ActionHandler),
}

impl GameAction {
    // === Constructors ===

    pub fn remove_from_game(card: EntityId) -> Self {
        Self::RemoveFromGame {
            card,
            allow_save: true,
        }
    }

    pub fn reveal_cards(cards: Vec<EntityId>, player: PlayerId) -> Self {
        Self::RevealCards {
            cards,
            player,
            is_cost: false,
            while_revealed: None,
        }
    }

    pub fn gain_power(card: EntityId, amount: u32) -> Self {
        Self::GainPower { card, amount }
    }

    pub fn discard_power(card: EntityId, amount: u32) -> Self {
        Self::DiscardPower { card, amount }
    }

    pub fn draw_cards(player: PlayerId, amount: u32) -> Self {
        Self::DrawCards { player, amount }
    }

    pub fn gain_gold(player: PlayerId, amount: u32) -> Self {
        Self::GainGold { player, amount }
    }

    pub fn return_gold(player: PlayerId, amount: u32) -> Self {
        Self::ReturnGold { player, amount }
    }

    pub fn add_to_hand(card: EntityId) -> Self {
        Self::AddToHand { card }
    }

    pub fn put_into_play(card: EntityId, player: PlayerId) -> Self {
        Self::PutIntoPlay { card, player }
    }

    pub fn place_card(card: EntityId, player: PlayerId, location: Location) -> Self {
        Self::PlaceCard {
            card,
            player,
            location,
            position: ZonePosition::Top,
        }
    }

    pub fn return_card_to_deck(card: EntityId) -> Self {
        Self::ReturnCardToDeck { card, bottom: false }
    }

    pub fn discard(card: EntityId) -> Self {
        Self::LeavePlay {
            card,
            destination: Location::DiscardPile,
            allow_save: true,
        }
    }

    pub fn kneel(card: EntityId) -> Self {
        Self::Kneel { card }
    }

    pub fn stand(card: EntityId) -> Self {
        Self::Stand { card }
    }

    pub fn handler(handler: impl Fn(&mut Game, &ActionContext) + 'static) -> Self {
        Self::Handler(ActionHandler::new(handler))
    }

    /// Resolve `then` after this action (builder pattern).
    #[must_use]
    pub fn then(self, then: GameAction) -> Self {
        Self::Then {
            action: Box::new(self),
            then: Box::new(then),
            message: None,
        }
    }

    /// Resolve `then` after this action, announcing it (builder pattern).
    #[must_use]
    pub fn then_with_message(self, then: GameAction, message: impl Into<String>) -> Self {
        Self::Then {
            action: Box::new(self),
            then: Box::new(then),
            message: Some(message.into()),
        }
    }

    // === Validation ===

    /// Whether resolving the action would change the game state.
    #[must_use]
    pub fn allow(&self, game: &Game, context: &ActionContext) -> bool {
        let allows = |card: EntityId, kind: ActionKind, check: &dyn Fn(&Card) -> bool| {
            game.card(card)
                .is_some_and(|c| c.allow_game_action(kind, context.stage) && check(c))
        };

        match self {
            Self::RemoveFromGame { card, .. } => {
                allows(*card, ActionKind::RemoveFromGame, &|c| c.location != Location::OutOfGame)
            }
            Self::RevealCards { cards, .. } => {
                !cards.is_empty() && cards.iter().any(|&card| allows(card, ActionKind::Reveal, &|_| true))
            }
            Self::GainPower { card, amount } => {
                *amount > 0
                    && allows(*card, ActionKind::GainPower, &|c| {
                        matches!(c.location, Location::PlayArea | Location::Faction)
                    })
            }
            Self::DiscardPower { card, amount } => {
                *amount > 0 && allows(*card, ActionKind::DiscardPower, &|c| c.power() > 0)
            }
            Self::DrawCards { player, amount } => {
                *amount > 0 && game.pile_size(*player, Location::DrawDeck) > 0
            }
            Self::GainGold { amount, .. } => *amount > 0,
            Self::ReturnGold { player, amount } => *amount > 0 && game.player(*player).gold > 0,
            Self::PlaceCard { card, .. } => game.card(*card).is_some(),
            Self::AddToHand { card } => {
                allows(*card, ActionKind::ReturnToHand, &|c| c.location != Location::Hand)
            }
            Self::PutIntoPlay { card, .. } => {
                allows(*card, ActionKind::PutIntoPlay, &|c| c.location != Location::PlayArea)
            }
            Self::ReturnCardToDeck { card, .. } => {
                allows(*card, ActionKind::ReturnToDeck, &|c| c.location != Location::DrawDeck)
            }
            Self::LeavePlay { card, destination, .. } => {
                let kind = match destination {
                    Location::DiscardPile => ActionKind::Discard,
                    Location::Hand => ActionKind::ReturnToHand,
                    Location::DrawDeck => ActionKind::ReturnToDeck,
                    _ => ActionKind::RemoveFromGame,
                };
                allows(*card, kind, &|c| {
                    matches!(c.location, Location::PlayArea | Location::Duplicate)
                })
            }
            Self::Kneel { card } => allows(*card, ActionKind::Kneel, &|c| {
                !c.kneeled && c.location.handles_events()
            }),
            Self::Stand { card } => allows(*card, ActionKind::Stand, &|c| {
                c.kneeled && c.location.handles_events()
            }),
            Self::Simultaneously(actions) => actions.iter().any(|action| action.allow(game, context)),
            Self::Atomic(actions) => {
                !actions.is_empty() && actions.iter().all(|action| action.allow(game, context))
            }
            Self::Then { action, .. } => action.allow(game, context),
            Self::Handler(_) => true,
        }
    }

    // === Events ===

    /// Build the event (tree) that performs this action.
    pub fn create_event(&self, game: &mut Game, context: &ActionContext) -> EventId {
        match self {
            Self::RemoveFromGame { card, allow_save } => remove_from_game_event(game, *card, *allow_save),
            Self::RevealCards {
                cards,
                player,
                is_cost,
                while_revealed,
            } => reveal_cards_event(game, context, cards, *player, *is_cost, while_revealed.as_deref()),
            Self::GainPower { card, amount } => {
                let params = EventParams::new()
                    .card(*card)
                    .source(context.source)
                    .amount(*amount as i32);
                game.events_mut().create(
                    EventKind::CardPowerGained,
                    params,
                    Some(Rc::new(|game: &mut Game, event: EventId| {
                        let Some((card, amount)) = card_and_amount(game, event) else {
                            return;
                        };
                        if let Some(card) = game.card_mut(card) {
                            card.modify_power(amount);
                        }
                        game.check_win_condition();
                    })),
                )
            }
            Self::DiscardPower { card, amount } => {
                let available = game.card(*card).map_or(0, Card::power);
                let params = EventParams::new()
                    .card(*card)
                    .source(context.source)
                    .amount((*amount).min(available) as i32);
                game.events_mut().create(
                    EventKind::CardPowerDiscarded,
                    params,
                    Some(Rc::new(|game: &mut Game, event: EventId| {
                        if let Some((card, amount)) = card_and_amount(game, event) {
                            if let Some(card) = game.card_mut(card) {
                                card.modify_power(-amount);
                            }
                        }
                    })),
                )
            }
            Self::DrawCards { player, amount } => {
                let params = EventParams::new()
                    .player(*player)
                    .source(context.source)
                    .amount(*amount as i32);
                game.events_mut().create(
                    EventKind::CardsDrawn,
                    params,
                    Some(Rc::new(|game: &mut Game, event: EventId| {
                        let Some((player, amount)) = player_and_amount(game, event) else {
                            return;
                        };
                        let drawn = game.draw_cards(player, amount.max(0) as usize);
                        if let Some(event) = game.events_mut().get_mut(event) {
                            event.params.amount = drawn.len() as i32;
                            event.params.cards = drawn;
                        }
                    })),
                )
            }
            Self::GainGold { player, amount } => {
                let params = EventParams::new()
                    .player(*player)
                    .source(context.source)
                    .amount(*amount as i32);
                game.events_mut().create(
                    EventKind::GoldGained,
                    params,
                    Some(Rc::new(|game: &mut Game, event: EventId| {
                        if let Some((player, amount)) = player_and_amount(game, event) {
                            game.player_mut(player).modify_gold(amount);
                        }
                    })),
                )
            }
            Self::ReturnGold { player, amount } => {
                let available = game.player(*player).gold;
                let params = EventParams::new()
                    .player(*player)
                    .source(context.source)
                    .amount((*amount).min(available) as i32);
                game.events_mut().create(
                    EventKind::GoldReturned,
                    params,
                    Some(Rc::new(|game: &mut Game, event: EventId| {
                        if let Some((player, amount)) = player_and_amount(game, event) {
                            game.player_mut(player).modify_gold(-amount);
                        }
                    })),
                )
            }
            Self::PlaceCard {
                card,
                player,
                location,
                position,
            } => place_card_event(game, *card, *player, *location, *position),
            Self::AddToHand { card } => {
                let owner = game.card(*card).map(|c| c.owner).unwrap_or(context.player);
                let in_play = is_in_play(game, *card);
                let params = EventParams::new().card(*card).player(owner).source(context.source);
                let card = *card;
                let add = game.events_mut().create(
                    EventKind::CardAddedToHand,
                    params,
                    Some(Rc::new(move |game: &mut Game, event: EventId| {
                        let place = place_card_event(game, card, owner, Location::Hand, ZonePosition::Top);
                        game.events_mut().then_attach(event, place);
                    })),
                );
                bundle_with_leave_play(game, add, card, in_play, true)
            }
            Self::PutIntoPlay { card, player } => {
                let params = EventParams::new().card(*card).player(*player).source(context.source);
                let (card, player) = (*card, *player);
                game.events_mut().create(
                    EventKind::CardEntersPlay,
                    params,
                    Some(Rc::new(move |game: &mut Game, _event: EventId| {
                        game.move_card(card, Location::PlayArea, None, ZonePosition::Top);
                        if let Some(card) = game.card_mut(card) {
                            if card.owner != player {
                                card.take_control(player, None);
                            }
                            card.new = true;
                        }
                    })),
                )
            }
            Self::ReturnCardToDeck { card, bottom } => {
                let owner = game.card(*card).map(|c| c.owner).unwrap_or(context.player);
                let in_play = is_in_play(game, *card);
                let position = if *bottom { ZonePosition::Bottom } else { ZonePosition::Top };
                let params = EventParams::new().card(*card).player(owner).source(context.source);
                let card = *card;
                let returned = game.events_mut().create(
                    EventKind::CardReturnedToDeck,
                    params,
                    Some(Rc::new(move |game: &mut Game, event: EventId| {
                        let place = place_card_event(game, card, owner, Location::DrawDeck, position);
                        game.events_mut().then_attach(event, place);
                    })),
                );
                bundle_with_leave_play(game, returned, card, in_play, true)
            }
            Self::LeavePlay {
                card,
                destination,
                allow_save,
            } => {
                let owner = game.card(*card).map(|c| c.owner).unwrap_or(context.player);
                let leave = leave_play_event(game, *card, *allow_save);
                let place = place_card_event(game, *card, owner, *destination, ZonePosition::Top);
                game.events_mut().atomic(vec![leave, place])
            }
            Self::Kneel { card } => {
                let params = EventParams::new()
                    .card(*card)
                    .source(context.source)
                    .is_cost(context.stage == ResolutionStage::Cost);
                let card = *card;
                game.events_mut().create(
                    EventKind::CardKneeled,
                    params,
                    Some(Rc::new(move |game: &mut Game, _event: EventId| {
                        if let Some(card) = game.card_mut(card) {
                            card.kneeled = true;
                        }
                    })),
                )
            }
            Self::Stand { card } => {
                let params = EventParams::new().card(*card).source(context.source);
                let card = *card;
                game.events_mut().create(
                    EventKind::CardStood,
                    params,
                    Some(Rc::new(move |game: &mut Game, _event: EventId| {
                        if let Some(card) = game.card_mut(card) {
                            card.kneeled = false;
                        }
                    })),
                )
            }
            Self::Simultaneously(actions) => {
                let allowed: Vec<&GameAction> = actions.iter().filter(|action| action.allow(game, context)).collect();
                let children: Vec<EventId> = allowed
                    .into_iter()
                    .map(|action| action.create_event(game, context))
                    .collect();
                game.events_mut().simultaneous(children)
            }
            Self::Atomic(actions) => {
                let members: Vec<EventId> = actions
                    .iter()
                    .map(|action| action.create_event(game, context))
                    .collect();
                game.events_mut().atomic(members)
            }
            Self::Then {
                action,
                then,
                message,
            } => {
                let event = action.create_event(game, context);
                let then = then.as_ref().clone();
                let message = message.clone();
                let context = *context;
                game.events_mut().then_execute(
                    event,
                    Rc::new(move |game: &mut Game, event: EventId| {
                        if game.events().is_cancelled(event) || !then.allow(game, &context) {
                            return;
                        }
                        if let Some(message) = &message {
                            game.add_context_message(message, context.player, context.source, &[]);
                        }
                        game.resolve_game_action(&then, &context);
                    }),
                );
                event
            }
            Self::Handler(handler) => {
                let handler = handler.clone();
                let context = *context;
                game.events_mut().create(
                    EventKind::Generic,
                    EventParams::new().player(context.player).source(context.source),
                    Some(Rc::new(move |game: &mut Game, _event: EventId| {
                        (handler.0)(game, &context);
                    })),
                )
            }
        }
    }
}

// === Event builders ===

fn card_and_amount(game: &Game, event: EventId) -> Option<(EntityId, i32)> {
    let event = game.events().get(event)?;
    Some((event.params.card?, event.params.amount))
}

fn player_and_amount(game: &Game, event: EventId) -> Option<(PlayerId, i32)> {
    let event = game.events().get(event)?;
    Some((event.params.player?, event.params.amount))
}

fn is_in_play(game: &Game, card: EntityId) -> bool {
    game.card(card)
        .is_some_and(|c| matches!(c.location, Location::PlayArea | Location::Duplicate))
}

/// Event moving a card to a pile.
pub(crate) fn place_card_event(
    game: &mut Game,
    card: EntityId,
    player: PlayerId,
    location: Location,
    position: ZonePosition,
) -> EventId {
    let params = EventParams::new().card(card).player(player);
    game.events_mut().create(
        EventKind::CardPlaced,
        params,
        Some(Rc::new(move |game: &mut Game, _event: EventId| {
            game.move_card(card, location, None, position);
        })),
    )
}

/// `CardLeftPlay` event: discards attachments and duplicates and clears
/// in-play state. The destination move is added by the caller.
pub(crate) fn leave_play_event(game: &mut Game, card: EntityId, allow_save: bool) -> EventId {
    let mut params = EventParams::new().card(card).allow_save(allow_save);
    if let Some(snapshot) = game.card(card) {
        params = params.player(snapshot.controller()).snapshot(snapshot);
    }
    game.events_mut().create(
        EventKind::CardLeftPlay,
        params,
        Some(Rc::new(move |game: &mut Game, _event: EventId| {
            let children = game
                .card(card)
                .map(|c| c.attachments.iter().chain(&c.dupes).copied().collect::<Vec<_>>())
                .unwrap_or_default();
            for child in children {
                game.move_card(child, Location::DiscardPile, None, ZonePosition::Top);
            }
            if let Some(card) = game.card_mut(card) {
                card.kneeled = false;
                card.new = false;
            }
            debug!(%card, "card left play");
        })),
    )
}

fn bundle_with_leave_play(
    game: &mut Game,
    event: EventId,
    card: EntityId,
    in_play: bool,
    allow_save: bool,
) -> EventId {
    if !in_play {
        return event;
    }
    let leave = leave_play_event(game, card, allow_save);
    game.events_mut().atomic(vec![event, leave])
}

fn remove_from_game_event(game: &mut Game, card: EntityId, allow_save: bool) -> EventId {
    let player = game.card(card).map_or(PlayerId(0), Card::controller);
    let in_play = is_in_play(game, card);

    let mut params = EventParams::new().card(card).player(player).allow_save(allow_save);
    if let Some(snapshot) = game.card(card) {
        params = params.snapshot(snapshot);
    }

    let remove = game.events_mut().create(
        EventKind::CardRemovedFromGame,
        params,
        Some(Rc::new(move |game: &mut Game, event: EventId| {
            let place = place_card_event(game, card, player, Location::OutOfGame, ZonePosition::Top);
            game.events_mut().then_attach(event, place);
        })),
    );

    bundle_with_leave_play(game, remove, card, in_play, allow_save)
}

fn reveal_cards_event(
    game: &mut Game,
    context: &ActionContext,
    cards: &[EntityId],
    player: PlayerId,
    is_cost: bool,
    while_revealed: Option<&GameAction>,
) -> EventId {
    let params = EventParams::new()
        .cards(cards.to_vec())
        .player(player)
        .source(context.source)
        .is_cost(is_cost);
    let while_revealed = while_revealed.cloned();
    let context = *context;

    game.events_mut().create(
        EventKind::CardsRevealed,
        params,
        Some(Rc::new(move |game: &mut Game, event: EventId| {
            let Some((cards, source, is_cost)) = game
                .events()
                .get(event)
                .map(|e| (e.params.cards.clone(), e.params.source, e.params.is_cost))
            else {
                return;
            };

            let revealed: Vec<EntityId> = cards
                .into_iter()
                .filter(|&card| {
                    game.card(card)
                        .is_some_and(|c| c.allow_game_action(ActionKind::Reveal, context.stage))
                })
                .collect();
            let shared = Rc::new(RefCell::new(revealed.clone()));

            let rule = {
                let shared = Rc::clone(&shared);
                game.visibility_mut()
                    .add_rule(move |_game, card, _viewer| shared.borrow().contains(&card.id))
            };
            let saved = game.highlight_cards(&revealed);

            let mut args = vec![MessageArg::Player(player), MessageArg::Cards(revealed.clone())];
            match source.filter(|_| is_cost) {
                Some(source) => {
                    args.push(MessageArg::Card(source));
                    game.add_message("{0} reveals {1} for {2}", args);
                }
                None => game.add_message("{0} reveals {1}", args),
            }

            for &card in &revealed {
                let mut params = EventParams::new().card(card).player(player).source(source);
                if let Some(snapshot) = game.card(card) {
                    params = params.snapshot(snapshot);
                }
                let shared = Rc::clone(&shared);
                let reveal = game.events_mut().create(
                    EventKind::CardRevealed,
                    params,
                    Some(Rc::new(move |game: &mut Game, reveal: EventId| {
                        let moved = game.events().get(reveal).is_some_and(|e| {
                            let original = e.params.snapshot.as_ref().map(|s| s.location);
                            let current = game.card(card).map(|c| c.location);
                            original != current
                        });
                        if moved {
                            shared.borrow_mut().retain(|&c| c != card);
                            let remaining = shared.borrow().clone();
                            game.set_all_selectable(&remaining);
                        }
                    })),
                );
                game.events_mut().then_attach(event, reveal);
            }

            let while_action = while_revealed.clone().unwrap_or_else(|| {
                let shared = Rc::clone(&shared);
                GameAction::handler(move |game, _context| {
                    let revealed = shared.borrow().clone();
                    if !revealed.is_empty() {
                        game.queue_step(Box::new(AcknowledgeRevealCardsPrompt::new(revealed, player)));
                    }
                })
            });
            let while_event = while_action.create_event(game, &context);
            game.events_mut().then_attach(event, while_event);

            let saved = RefCell::new(Some(saved));
            game.events_mut().then_execute(
                while_event,
                Rc::new(move |game: &mut Game, _event: EventId| {
                    if let Some(saved) = saved.borrow_mut().take() {
                        game.restore_selections(saved);
                    }
                    game.visibility_mut().remove_rule(rule);
                }),
            );
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_context_defaults_to_framework() {
        let context = ActionContext::new(PlayerId(1));
        assert_eq!(context.stage, ResolutionStage::Framework);
        assert_eq!(context.source, None);

        let context = context.with_source(EntityId(4)).at_stage(ResolutionStage::Cost);
        assert_eq!(context.source, Some(EntityId(4)));
        assert_eq!(context.stage, ResolutionStage::Cost);
    }

    #[test]
    fn test_then_builder() {
        let action = GameAction::draw_cards(PlayerId(0), 1).then(GameAction::gain_gold(PlayerId(0), 2));
        assert!(matches!(action, GameAction::Then { message: None, .. }));
    }
}
