//! Deck validation tests.
//!
//! These tests validate whole decks the way the deck builder does:
//! - Plot and draw deck sizes for every restricted list and format pair
//! - Unreleased cards in constructed formats versus draft
//! - Banner agendas and restricted list entries

use chrono::NaiveDate;
use thrones_engine::cards::{CardData, CardType, Faction};
use thrones_engine::deck::{
    Deck, DeckValidator, Format, FormatRestrictions, Pack, Pod, RestrictedList, UNRESTRICTED,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn packs() -> Vec<Pack> {
    vec![
        Pack::new("Core", "Core Set", Some(date(2015, 10, 2))),
        Pack::new("TRtW", "Taking the Black", Some(date(2016, 2, 11))),
        Pack::new("Future", "Coming Soon", Some(date(2099, 1, 1))),
        Pack::new("Unscheduled", "No Date Yet", None),
    ]
}

fn validator(lists: Vec<RestrictedList>) -> DeckValidator {
    DeckValidator::with_now(&packs(), Format::defaults(), lists, date(2024, 6, 1))
}

fn plot(index: u32) -> CardData {
    CardData::new(format!("p{index}"), format!("Plot {index}"), CardType::Plot, Faction::Neutral).with_pack("Core")
}

fn stark(index: u32) -> CardData {
    CardData::new(format!("s{index}"), format!("Stark {index}"), CardType::Character, Faction::Stark).with_pack("Core")
}

fn stark_deck(plots: u32) -> Deck {
    let mut deck = Deck::new("Winter is Coming", Faction::Stark);
    for index in 0..plots {
        deck = deck.with_plot(1, plot(index));
    }
    for index in 0..20 {
        deck = deck.with_draw_card(3, stark(index));
    }
    deck
}

fn lists() -> Vec<RestrictedList> {
    vec![
        RestrictedList::new("rl-1", "FAQ 1.0", "1.0")
            .with_format(FormatRestrictions {
                name: "joust".into(),
                restricted: vec!["s1".into(), "s2".into()],
                ..FormatRestrictions::default()
            })
            .with_format(FormatRestrictions {
                name: "melee".into(),
                ..FormatRestrictions::default()
            }),
        RestrictedList::new("rl-2", "FAQ 2.0", "2.0").with_format(FormatRestrictions {
            name: "joust".into(),
            banned: vec!["s3".into()],
            ..FormatRestrictions::default()
        }),
    ]
}

/// Test that eight plots fail every restricted list and format pair that
/// requires seven.
#[test]
fn test_too_many_plots_everywhere() {
    let report = validator(lists()).validate_deck(&stark_deck(8));

    assert_eq!(report.len(), 2);
    for (list, formats) in &report {
        for (format, status) in formats {
            assert!(!status.basic_rules, "{list}/{format}");
            assert!(!status.valid, "{list}/{format}");
            assert!(status.extended_status.contains(&"Too many plot cards".to_string()));
        }
    }
}

/// Test that too few plots and draw cards are both reported.
#[test]
fn test_too_few_cards() {
    let mut deck = stark_deck(6);
    deck.draw_cards.truncate(10);
    let status = validator(Vec::new()).validate_format(&deck, "joust");

    assert_eq!(
        status.extended_status,
        vec!["Too few plot cards".to_string(), "Too few draw cards".to_string()]
    );
}

/// Test that a future pack's card fails joust but passes draft.
#[test]
fn test_unreleased_card_joust_versus_draft() {
    let upcoming = CardData::new("f1", "Jon Snow", CardType::Character, Faction::Stark)
        .with_label("Jon Snow (Future)")
        .with_pack("Future");
    let deck = stark_deck(7).with_draw_card(1, upcoming);
    let validator = validator(Vec::new());

    let joust = validator.validate_format(&deck, "joust");
    assert!(!joust.no_unreleased_cards);
    assert!(!joust.basic_rules);
    assert!(!joust.valid);
    assert!(joust.extended_status.iter().any(|message| message.contains("Jon Snow (Future)")));

    let draft = validator.validate_format(&deck, "draft");
    assert!(draft.no_unreleased_cards);
    assert!(draft.extended_status.iter().all(|message| !message.contains("Jon Snow (Future)")));
}

/// Test that packs without a release date count as unreleased.
#[test]
fn test_undated_pack_is_unreleased() {
    let validator = validator(Vec::new());
    assert!(validator.is_released("Core"));
    assert!(validator.is_released("TRtW"));
    assert!(!validator.is_released("Future"));
    assert!(!validator.is_released("Unscheduled"));
    assert!(!validator.is_released(""));
}

/// Test the report shape with and without restricted lists.
#[test]
fn test_report_keys() {
    let deck = stark_deck(7);

    let report = validator(Vec::new()).validate_deck(&deck);
    assert_eq!(report.keys().collect::<Vec<_>>(), vec![UNRESTRICTED]);
    assert!(report[UNRESTRICTED]["joust"].valid);

    let report = validator(lists()).validate_deck(&deck);
    assert_eq!(report["rl-1"].len(), 3);
    assert_eq!(report["rl-1"]["joust"].faq_version, "1.0");
    assert!(!report["rl-2"]["joust"].restricted_list);
    assert!(report["rl-2"]["joust"].basic_rules);
}

/// Test that a list naming only joust still reports every format, with the
/// unnamed formats unrestricted.
#[test]
fn test_every_format_checked_under_every_list() {
    let report = validator(lists()).validate_deck(&stark_deck(7));

    let formats: Vec<&str> = report["rl-2"].keys().map(String::as_str).collect();
    assert_eq!(formats, vec!["draft", "joust", "melee"]);
    assert!(!report["rl-2"]["joust"].valid);
    for format in ["melee", "draft"] {
        let status = &report["rl-2"][format];
        assert!(status.valid, "{format}: {:?}", status.extended_status);
        assert_eq!(status.faq_version, "2.0");
    }
}

/// Test restricted, banned and pod violations.
#[test]
fn test_restricted_list_violations() {
    let deck = stark_deck(7);
    let report = validator(lists()).validate_deck(&deck);

    let joust = &report["rl-1"]["joust"];
    assert!(joust.basic_rules);
    assert!(!joust.restricted_list);
    assert_eq!(
        joust.extended_status,
        vec!["Contains more than 1 card on the joust restricted list: Stark 1, Stark 2".to_string()]
    );
    assert!(report["rl-1"]["melee"].valid);

    let list = RestrictedList::new("rl-3", "FAQ 3.0", "3.0").with_format(FormatRestrictions {
        name: "joust".into(),
        banned: vec!["s3".into()],
        pods: vec![Pod {
            restricted: Some("s4".into()),
            cards: vec!["s5".into(), "s6".into()],
        }],
        ..FormatRestrictions::default()
    });
    let result = list.validate(&deck, "joust");
    assert!(!result.valid);
    assert_eq!(
        result.errors,
        vec![
            "Contains cards that are banned in joust: Stark 3".to_string(),
            "Contains cards that cannot be played together: Stark 4, Stark 5, Stark 6".to_string(),
        ]
    );
}

/// Test that a banner agenda allows its faction's non-loyal cards and
/// requires twelve of them.
#[test]
fn test_banner_agenda() {
    let banner = CardData::new("01200", "Banner of the Lion", CardType::Agenda, Faction::Neutral).with_pack("Core");
    let lannister = CardData::new("l1", "Lannisport Merchant", CardType::Character, Faction::Lannister).with_pack("Core");
    let loyal = CardData::new("l2", "Tywin Lannister", CardType::Character, Faction::Lannister)
        .with_pack("Core")
        .loyal();

    let deck = stark_deck(7).with_agenda(banner.clone()).with_draw_card(3, lannister);
    let status = validator(Vec::new()).validate_format(&deck, "joust");
    assert_eq!(
        status.extended_status,
        vec!["Must contain 12 or more lannister cards".to_string()]
    );

    let mut deck = stark_deck(7).with_agenda(banner);
    for index in 0..4 {
        let card = CardData::new(format!("lx{index}"), format!("Lannister {index}"), CardType::Character, Faction::Lannister)
            .with_pack("Core");
        deck = deck.with_draw_card(3, card);
    }
    let status = validator(Vec::new()).validate_format(&deck, "joust");
    assert!(status.valid, "{:?}", status.extended_status);

    let deck = deck.with_draw_card(1, loyal);
    let status = validator(Vec::new()).validate_format(&deck, "joust");
    assert_eq!(
        status.extended_status,
        vec!["Cards not allowed by faction or agenda: Tywin Lannister".to_string()]
    );
}

/// Test that an unknown format name is validated as joust.
#[test]
fn test_unknown_format_falls_back_to_joust() {
    let status = validator(Vec::new()).validate_format(&stark_deck(8), "sealed");
    assert!(status.extended_status.contains(&"Too many plot cards".to_string()));
}
