//! Event window tests.
//!
//! These tests drive events through full windows:
//! - Moves that change nothing raise nothing
//! - Aggregate triggers fire once per key group
//! - Cancelled events skip their default effect, siblings still resolve
//! - Interrupts can save a card from leaving play

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use thrones_engine::cards::{register_catalog, CardData, CardType, Faction};
use thrones_engine::core::{GameConfig, PlayerId};
use thrones_engine::effects::{ActionContext, GameAction};
use thrones_engine::triggers::{AbilityTrigger, EventId, EventKind, EventParams, WhenCondition};
use thrones_engine::zones::{Location, ZonePosition};
use thrones_engine::{CardRegistry, EntityId, Game};

fn character(code: &str, name: &str) -> Rc<CardData> {
    Rc::new(
        CardData::new(code, name, CardType::Character, Faction::Lannister)
            .with_cost(3)
            .with_strength(2)
            .with_trait("Lord"),
    )
}

fn game() -> Game {
    Game::new(GameConfig::head_to_head("alice", "bob"))
}

/// Event whose default effect records `label`.
fn recording_event(game: &mut Game, log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str, amount: i32) -> EventId {
    let log = Rc::clone(log);
    game.events_mut().create(
        EventKind::CardKneeled,
        EventParams::new().amount(amount),
        Some(Rc::new(move |_game: &mut Game, _event: EventId| {
            log.borrow_mut().push(label);
        })),
    )
}

/// Test that moving a card onto its current location raises nothing.
#[test]
fn test_noop_move_raises_no_event() {
    let registry = CardRegistry::new();
    let mut game = game();
    let card = game
        .create_card(&registry, PlayerId(0), character("c1", "Lannisport Merchant"), Location::Hand)
        .unwrap();

    let outcome = game.move_card(card, Location::Hand, None, ZonePosition::Top).unwrap();
    assert!(!outcome.is_change());
    assert!(game.events().is_empty());

    let outcome = game.move_card(card, Location::DiscardPile, None, ZonePosition::Top).unwrap();
    assert!(outcome.is_change());
    assert_eq!(game.events().len(), 1);

    game.continue_game();
    assert!(game.events().is_empty());
}

/// Test that an aggregate trigger groups three children by key into two
/// resolutions.
#[test]
fn test_aggregate_trigger_groups_by_key() {
    let registry = CardRegistry::new();
    let mut game = game();
    let source = game
        .create_card(&registry, PlayerId(0), character("c1", "Tyrion Lannister"), Location::PlayArea)
        .unwrap();

    let groups: Rc<RefCell<Vec<Vec<EventId>>>> = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&groups);
    let ability = AbilityTrigger::forced_reaction(source)
        .when(
            EventKind::CardKneeled,
            WhenCondition::aggregate(|_game, event| json!(event.params.amount), |_game, _key| true),
        )
        .in_locations([Location::PlayArea])
        .with_handler(move |_game, context| {
            seen.borrow_mut().push(context.events.clone());
        });
    game.abilities_mut().register(ability);
    game.abilities_mut().update_for_location(source, None, Location::PlayArea);

    let log = Rc::new(RefCell::new(Vec::new()));
    let first = recording_event(&mut game, &log, "first", 1);
    let second = recording_event(&mut game, &log, "second", 2);
    let third = recording_event(&mut game, &log, "third", 2);
    let parent = game.events_mut().simultaneous(vec![first, second, third]);
    game.open_window(parent);
    game.continue_game();

    let groups = groups.borrow();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0], vec![first]);
    assert_eq!(groups[1], vec![second, third]);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

/// Test that a cancelled child skips its handler while siblings resolve.
#[test]
fn test_cancelled_event_keeps_sibling_effects() {
    let mut game = game();
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = recording_event(&mut game, &log, "first", 1);
    let second = recording_event(&mut game, &log, "second", 1);
    let third = recording_event(&mut game, &log, "third", 1);
    let parent = game.events_mut().simultaneous(vec![first, second, third]);

    game.events_mut().cancel(second);
    game.open_window(parent);
    game.continue_game();

    assert_eq!(*log.borrow(), vec!["first", "third"]);
}

/// Test that a forced interrupt cancelling one child stops only that child.
#[test]
fn test_interrupt_cancels_one_child() {
    let registry = CardRegistry::new();
    let mut game = game();
    let source = game
        .create_card(&registry, PlayerId(0), character("c1", "Cersei Lannister"), Location::PlayArea)
        .unwrap();

    let ability = AbilityTrigger::forced_interrupt(source)
        .when(
            EventKind::CardKneeled,
            WhenCondition::single(|_game, event| event.params.amount == 2),
        )
        .in_locations([Location::PlayArea])
        .with_handler(|game, context| {
            if let Some(event) = context.event() {
                game.events_mut().cancel(event);
            }
        });
    game.abilities_mut().register(ability);
    game.abilities_mut().update_for_location(source, None, Location::PlayArea);

    let log = Rc::new(RefCell::new(Vec::new()));
    let first = recording_event(&mut game, &log, "first", 1);
    let second = recording_event(&mut game, &log, "second", 2);
    let parent = game.events_mut().simultaneous(vec![first, second]);
    game.open_window(parent);
    game.continue_game();

    assert_eq!(*log.borrow(), vec!["first"]);
}

/// Test that a follow-up registered with `then_execute` runs after the
/// window's default effects.
#[test]
fn test_then_execute_runs_after_handlers() {
    let mut game = game();
    let log = Rc::new(RefCell::new(Vec::new()));
    let event = recording_event(&mut game, &log, "handler", 1);
    let after = Rc::clone(&log);
    game.events_mut().then_execute(
        event,
        Rc::new(move |_game: &mut Game, _event: EventId| {
            after.borrow_mut().push("then");
        }),
    );

    game.open_window(event);
    game.continue_game();
    assert_eq!(*log.borrow(), vec!["handler", "then"]);
}

/// Test that Bodyguard is sacrificed to save its character from discard.
#[test]
fn test_bodyguard_saves_attached_character() {
    let mut registry = CardRegistry::new();
    register_catalog(&mut registry).unwrap();
    let mut game = game();

    let lord = game
        .create_card(&registry, PlayerId(0), character("c1", "Ser Kevan Lannister"), Location::PlayArea)
        .unwrap();
    let bodyguard = game
        .create_card(&registry, PlayerId(0), registry.data("01034").unwrap(), Location::Hand)
        .unwrap();
    game.attach(bodyguard, lord);
    game.continue_game();
    assert_eq!(game.card(bodyguard).unwrap().parent, Some(lord));

    let discarded = game.resolve_game_action(&GameAction::discard(lord), &ActionContext::new(PlayerId(1)));
    assert!(discarded.is_some());
    game.continue_game();

    let prompt = game.prompt_for(PlayerId(0)).unwrap();
    assert_eq!(prompt.menu_title, "Any interrupts?");
    assert_eq!(prompt.buttons.len(), 2);

    assert!(game.menu_button(PlayerId(0), "0", "triggered"));

    assert_eq!(game.card(lord).unwrap().location, Location::PlayArea);
    assert_eq!(game.card(bodyguard).unwrap().location, Location::DiscardPile);
    assert!(game.card(lord).unwrap().attachments.is_empty());
    assert!(game.prompt_for(PlayerId(0)).is_none());
}

/// Test that passing on Bodyguard lets the character be discarded along
/// with its attachment.
#[test]
fn test_passing_bodyguard_discards_character() {
    let mut registry = CardRegistry::new();
    register_catalog(&mut registry).unwrap();
    let mut game = game();

    let lord = game
        .create_card(&registry, PlayerId(0), character("c1", "Ser Kevan Lannister"), Location::PlayArea)
        .unwrap();
    let bodyguard = game
        .create_card(&registry, PlayerId(0), registry.data("01034").unwrap(), Location::Hand)
        .unwrap();
    game.attach(bodyguard, lord);
    game.continue_game();

    game.resolve_game_action(&GameAction::discard(lord), &ActionContext::new(PlayerId(1)));
    game.continue_game();
    assert!(game.menu_button(PlayerId(0), "pass", "triggered"));

    assert_eq!(game.card(lord).unwrap().location, Location::DiscardPile);
    assert_eq!(game.card(bodyguard).unwrap().location, Location::DiscardPile);
}

/// Test that Littlefinger's reaction draws two cards once he enters play.
#[test]
fn test_littlefinger_reaction_draws() {
    let mut registry = CardRegistry::new();
    register_catalog(&mut registry).unwrap();
    let mut game = game();

    for index in 0..5 {
        game.create_card(
            &registry,
            PlayerId(0),
            character(&format!("d{index}"), "Deck Filler"),
            Location::DrawDeck,
        )
        .unwrap();
    }
    let littlefinger = game
        .create_card(&registry, PlayerId(0), registry.data("01029").unwrap(), Location::Hand)
        .unwrap();

    game.resolve_game_action(
        &GameAction::put_into_play(littlefinger, PlayerId(0)),
        &ActionContext::new(PlayerId(0)),
    );
    game.continue_game();
    assert_eq!(game.card(littlefinger).unwrap().location, Location::PlayArea);

    let prompt = game.prompt_for(PlayerId(0)).unwrap();
    assert_eq!(prompt.menu_title, "Any reactions?");
    assert!(game.menu_button(PlayerId(0), "0", "triggered"));

    assert_eq!(game.pile_size(PlayerId(0), Location::Hand), 2);
    assert_eq!(game.pile_size(PlayerId(0), Location::DrawDeck), 3);
}

/// Test that an unknown card id is not moved.
#[test]
fn test_move_unknown_card() {
    let mut game = game();
    assert!(game
        .move_card(EntityId(999), Location::Hand, None, ZonePosition::Top)
        .is_none());
}
