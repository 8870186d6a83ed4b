//! Card state tests.
//!
//! These tests cover the state a card carries between events:
//! - Token counts, which never go negative and prune empty entries
//! - Reference-counted traits granted by several sources
//! - The control stack and its reset to the owner

use std::rc::Rc;

use proptest::prelude::*;
use thrones_engine::cards::{register_catalog, Card, CardData, CardType, Faction, ReferenceCountedSet, Token};
use thrones_engine::core::{EntityId, GameConfig, PlayerId};
use thrones_engine::effects::Activation;
use thrones_engine::zones::{Location, ZonePosition};
use thrones_engine::{CardRegistry, Game};

const TOKENS: [Token; 9] = [
    Token::Gold,
    Token::Poison,
    Token::Betrayal,
    Token::Vengeance,
    Token::Kiss,
    Token::Bell,
    Token::Ear,
    Token::Journey,
    Token::Ghost,
];

fn character(code: &str, name: &str) -> CardData {
    CardData::new(code, name, CardType::Character, Faction::Stark)
        .with_cost(2)
        .with_strength(3)
}

fn card() -> Card {
    Card::new(EntityId(1), PlayerId(0), Rc::new(character("c1", "Winterfell Steward")))
}

proptest! {
    /// Token counts track the clamped running total and zero entries are
    /// removed from the map.
    #[test]
    fn token_counts_never_negative(ops in prop::collection::vec((0usize..9, -5i32..6), 0..40)) {
        let mut card = card();
        let mut expected = [0i64; 9];

        for (index, amount) in ops {
            card.modify_token(TOKENS[index], amount);
            expected[index] = (expected[index] + i64::from(amount)).max(0);

            for (slot, token) in TOKENS.iter().enumerate() {
                prop_assert_eq!(i64::from(card.token_count(*token)), expected[slot]);
                prop_assert_eq!(card.has_token(*token), expected[slot] > 0);
            }
            prop_assert!(card.tokens().values().all(|&count| count > 0));
        }
    }

    /// A value stays present while any of its grants is active.
    #[test]
    fn reference_counted_set_tracks_grants(grants in 1u32..6, removals in 0u32..8) {
        let mut set = ReferenceCountedSet::new();
        for _ in 0..grants {
            set.add("Knight".to_string());
        }
        for _ in 0..removals {
            set.remove(&"Knight".to_string());
        }

        let remaining = grants.saturating_sub(removals);
        prop_assert_eq!(set.count(&"Knight".to_string()), remaining);
        prop_assert_eq!(set.contains(&"Knight".to_string()), remaining > 0);
    }

    /// Taking control for the owner without a source always restores the
    /// owner, however deep the stack was.
    #[test]
    fn control_resets_to_owner(layers in prop::collection::vec((0u8..3, prop::option::of(1u32..50)), 0..12)) {
        let mut card = card();
        for (controller, source) in layers {
            card.take_control(PlayerId(controller), source.map(EntityId));
        }

        card.take_control(PlayerId(0), None);
        prop_assert_eq!(card.controller(), PlayerId(0));
        prop_assert!(card.control_stack().is_empty());
    }
}

/// Test that layered control is reverted per source.
#[test]
fn test_layered_control_reverts_by_source() {
    let mut card = card();
    card.take_control(PlayerId(1), Some(EntityId(10)));
    card.take_control(PlayerId(2), Some(EntityId(11)));
    assert_eq!(card.controller(), PlayerId(2));

    card.revert_control(EntityId(11));
    assert_eq!(card.controller(), PlayerId(1));

    card.revert_control(EntityId(10));
    assert_eq!(card.controller(), PlayerId(0));
}

/// Test that permanent control by another player replaces the stack.
#[test]
fn test_permanent_control_replaces_stack() {
    let mut card = card();
    card.take_control(PlayerId(1), Some(EntityId(10)));
    card.take_control(PlayerId(2), None);

    assert_eq!(card.controller(), PlayerId(2));
    assert_eq!(card.control_stack().len(), 1);

    card.revert_control(EntityId(10));
    assert_eq!(card.controller(), PlayerId(2));
}

/// Test that a printed trait survives an attachment granting and then
/// losing the same trait.
#[test]
fn test_granted_trait_overlaps_printed_trait() {
    let mut registry = CardRegistry::new();
    register_catalog(&mut registry).unwrap();

    let mut game = Game::new(GameConfig::head_to_head("alice", "bob"));
    game.effects_mut().activate(Activation::All);

    let knight = game
        .create_card(
            &registry,
            PlayerId(0),
            Rc::new(character("c1", "Ser Rodrik Cassel").with_trait("Knight")),
            Location::PlayArea,
        )
        .unwrap();
    let knighted = game
        .create_card(&registry, PlayerId(0), registry.data("02036").unwrap(), Location::Hand)
        .unwrap();

    game.attach(knighted, knight);
    game.continue_game();

    let card = game.card(knight).unwrap();
    assert!(card.has_trait("Knight"));
    assert_eq!(card.strength(), 4);

    game.move_card(knighted, Location::DiscardPile, None, ZonePosition::Top);
    game.continue_game();

    let card = game.card(knight).unwrap();
    assert!(card.has_trait("Knight"), "printed trait must remain");
    assert_eq!(card.strength(), 3);
    assert!(card.attachments.is_empty());
}

/// Test that an attachment's granted trait goes away with the attachment.
#[test]
fn test_granted_trait_removed_with_source() {
    let mut registry = CardRegistry::new();
    register_catalog(&mut registry).unwrap();

    let mut game = Game::new(GameConfig::head_to_head("alice", "bob"));
    game.effects_mut().activate(Activation::All);

    let squire = game
        .create_card(&registry, PlayerId(0), Rc::new(character("c2", "Squire")), Location::PlayArea)
        .unwrap();
    let knighted = game
        .create_card(&registry, PlayerId(0), registry.data("02036").unwrap(), Location::Hand)
        .unwrap();

    game.attach(knighted, squire);
    game.continue_game();
    assert!(game.card(squire).unwrap().has_trait("Knight"));

    game.move_card(knighted, Location::DiscardPile, None, ZonePosition::Top);
    game.continue_game();
    assert!(!game.card(squire).unwrap().has_trait("Knight"));
}
