//! Round flow tests.
//!
//! These tests play a match from setup into the second round:
//! - Setup cards cost gold and are revealed when setup finishes
//! - The higher initiative plot wins first player
//! - Marshaling pays for cards, dominance awards power, taxation returns gold

use thrones_engine::cards::{CardData, CardType, Faction, PlotStats};
use thrones_engine::core::{GameConfig, PhaseKind, PlayerId};
use thrones_engine::deck::{Deck, DeckCard};
use thrones_engine::zones::Location;
use thrones_engine::{CardRegistry, Game};

const ALICE: PlayerId = PlayerId(0);
const BOB: PlayerId = PlayerId(1);

fn deck(initiative: i32) -> Deck {
    let knight = CardData::new("k", "Winterfell Knight", CardType::Character, Faction::Stark)
        .with_cost(3)
        .with_strength(2);
    let plot = CardData::new(format!("p{initiative}"), "A Noble Cause", CardType::Plot, Faction::Neutral)
        .with_plot_stats(PlotStats {
            income: 5,
            initiative,
            claim: 1,
            reserve: 6,
        });

    let mut deck = Deck::new("Winter is Coming", Faction::Stark);
    deck.draw_cards.push(DeckCard::new(10, knight));
    deck.plot_cards.push(DeckCard::new(2, plot));
    deck
}

/// Both players keep; alice sets up one knight and bob sets up nothing.
fn after_setup() -> Game {
    let registry = CardRegistry::new();
    let mut game = Game::new(GameConfig::head_to_head("alice", "bob").with_seed(3).with_starting_hand_size(3));
    game.load_deck(&registry, ALICE, &deck(1)).unwrap();
    game.load_deck(&registry, BOB, &deck(4)).unwrap();
    game.begin();

    assert!(game.menu_button(ALICE, "keep", "menuButton"));
    assert!(game.menu_button(BOB, "keep", "menuButton"));

    let hand = game.cards_in(ALICE, Location::Hand);
    assert!(game.card_clicked(ALICE, hand[0]));
    assert_eq!(game.player(ALICE).gold, 5);

    assert!(game.menu_button(ALICE, "setupdone", "menuButton"));
    assert!(game.menu_button(BOB, "setupdone", "menuButton"));
    game
}

fn select_plots(game: &mut Game) {
    for player in [ALICE, BOB] {
        let plot = game.cards_in(player, Location::PlotDeck)[0];
        assert!(game.card_clicked(player, plot));
    }
}

/// Test that finishing setup reveals setup cards and refills hands.
#[test]
fn test_setup_finishes_into_plot_phase() {
    let game = after_setup();

    let placed = game.cards_in(ALICE, Location::PlayArea);
    assert_eq!(placed.len(), 1);
    assert!(!game.card(placed[0]).unwrap().facedown);

    assert_eq!(game.pile_size(ALICE, Location::Hand), 3);
    assert_eq!(game.pile_size(ALICE, Location::DrawDeck), 6);
    assert_eq!(game.player(ALICE).gold, 0);
    assert_eq!(game.player(BOB).gold, 0);

    assert_eq!(game.round(), 1);
    assert_eq!(game.current_phase(), PhaseKind::Plot);
    assert_eq!(game.prompt_for(ALICE).unwrap().menu_title, "Select a plot");
}

/// Test that revealing plots sets first player, draws and collects income.
#[test]
fn test_plots_lead_into_marshaling() {
    let mut game = after_setup();
    select_plots(&mut game);

    assert_eq!(game.first_player(), Some(BOB));
    assert!(game.active_plot(ALICE).is_some());
    assert_eq!(game.pile_size(ALICE, Location::PlotDeck), 1);

    assert_eq!(game.pile_size(ALICE, Location::Hand), 5);
    assert_eq!(game.pile_size(BOB, Location::Hand), 5);
    assert_eq!(game.player(ALICE).gold, 5);
    assert_eq!(game.player(BOB).gold, 5);

    assert_eq!(game.current_phase(), PhaseKind::Marshal);
    assert_eq!(game.prompt_for(BOB).unwrap().menu_title, "Initiate an action");
    assert_eq!(
        game.prompt_for(ALICE).unwrap().menu_title,
        "Waiting for opponent to take an action or pass"
    );
}

/// Test a whole round: marshal, pass through challenges, win dominance and
/// pay taxes.
#[test]
fn test_round_awards_dominance_and_returns_gold() {
    let mut game = after_setup();
    select_plots(&mut game);

    let knight = game.cards_in(BOB, Location::Hand)[0];
    let other = game.cards_in(ALICE, Location::Hand)[0];
    assert!(!game.card_clicked(ALICE, other), "not alice's turn");
    assert!(game.card_clicked(BOB, knight));
    assert_eq!(game.card(knight).unwrap().location, Location::PlayArea);
    assert_eq!(game.player(BOB).gold, 2);

    // marshaling resumes with alice after bob's action
    assert!(game.menu_button(ALICE, "pass", "menuButton"));
    assert!(game.menu_button(BOB, "pass", "menuButton"));
    assert_eq!(game.current_phase(), PhaseKind::Challenge);
    assert!(game.menu_button(BOB, "pass", "menuButton"));
    assert!(game.menu_button(ALICE, "pass", "menuButton"));

    assert_eq!(game.total_power(ALICE), 1);
    assert_eq!(game.total_power(BOB), 0);
    assert_eq!(game.player(ALICE).gold, 0);
    assert_eq!(game.player(BOB).gold, 0);

    assert_eq!(game.round(), 2);
    assert_eq!(game.current_phase(), PhaseKind::Plot);
}
