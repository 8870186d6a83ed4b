//! Deck validation.
//!
//! Validation is pure: the validator snapshots which packs are released
//! when it is built and never looks at the clock again.
//!
//! ## Checks
//!
//! In the order their messages appear:
//! 1. plot deck size
//! 2. draw deck size
//! 3. deck rules of the format, agendas and any custom rules
//! 4. inclusion by format, faction and agenda
//! 5. unreleased cards (not checked in draft)
//! 6. doubled plots
//! 7. per-card copy limits
//! 8. the restricted list

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::CardData;

use super::agendas::{deck_rules, DeckRules};
use super::formats::{find_format, Format};
use super::restricted_list::RestrictedList;
use super::wrapper::Deck;

/// Key used when validating without any restricted list.
pub const UNRESTRICTED: &str = "none";

/// A card pack and its release date. Packs without a date are unreleased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

impl Pack {
    pub fn new(code: impl Into<String>, name: impl Into<String>, release_date: Option<NaiveDate>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            release_date,
        }
    }
}

/// Result of validating one deck for one format under one restricted list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatus {
    /// Every check except the restricted list passed.
    pub basic_rules: bool,
    pub faq_version: String,
    pub no_unreleased_cards: bool,
    pub restricted_list: bool,
    pub valid: bool,
    /// Every failure message, in check order.
    pub extended_status: Vec<String>,
}

/// `status[restricted_list_id][format]`.
pub type ValidationReport = BTreeMap<String, BTreeMap<String, DeckStatus>>;

#[derive(Clone, Debug)]
pub struct DeckValidator {
    released_packs: FxHashSet<String>,
    formats: Vec<Format>,
    restricted_lists: Vec<RestrictedList>,
    custom_rules: DeckRules,
}

impl DeckValidator {
    /// Build a validator, treating packs released on or before today as
    /// released.
    pub fn new(packs: &[Pack], formats: Vec<Format>, restricted_lists: Vec<RestrictedList>) -> Self {
        Self::with_now(packs, formats, restricted_lists, Utc::now().date_naive())
    }

    /// Build a validator as of `now`.
    pub fn with_now(
        packs: &[Pack],
        formats: Vec<Format>,
        restricted_lists: Vec<RestrictedList>,
        now: NaiveDate,
    ) -> Self {
        let released_packs = packs
            .iter()
            .filter(|pack| pack.release_date.is_some_and(|date| date <= now))
            .map(|pack| pack.code.clone())
            .collect();
        Self {
            released_packs,
            formats,
            restricted_lists,
            custom_rules: DeckRules::default(),
        }
    }

    /// Add deck rules checked for every deck on top of the format,
    /// faction and agenda rules (builder pattern).
    #[must_use]
    pub fn with_rules(mut self, rules: DeckRules) -> Self {
        self.custom_rules = self.custom_rules.combine(rules);
        self
    }

    #[must_use]
    pub fn is_released(&self, pack_code: &str) -> bool {
        self.released_packs.contains(pack_code)
    }

    /// Validate `deck` for every known format under every restricted list.
    /// Without restricted lists the formats are checked under
    /// [`UNRESTRICTED`].
    #[must_use]
    pub fn validate_deck(&self, deck: &Deck) -> ValidationReport {
        let by_format = |list: Option<&RestrictedList>| -> BTreeMap<String, DeckStatus> {
            self.formats
                .iter()
                .map(|format| (format.name.clone(), self.status(deck, &format.name, list)))
                .collect()
        };

        let mut report = ValidationReport::new();
        if self.restricted_lists.is_empty() {
            report.insert(UNRESTRICTED.to_string(), by_format(None));
        }
        for list in &self.restricted_lists {
            report.insert(list.id.clone(), by_format(Some(list)));
        }
        report
    }

    /// Validate `deck` for one format with no restricted list.
    #[must_use]
    pub fn validate_format(&self, deck: &Deck, format: &str) -> DeckStatus {
        self.status(deck, format, None)
    }

    fn status(&self, deck: &Deck, format_name: &str, list: Option<&RestrictedList>) -> DeckStatus {
        let format = find_format(&self.formats, format_name).cloned().unwrap_or_else(Format::joust);
        let rules = format.rules.clone().combine(deck_rules(deck)).combine(self.custom_rules.clone());
        let mut messages = Vec::new();

        let plots = deck.plot_count();
        if plots < format.required_plots {
            messages.push("Too few plot cards".to_string());
        } else if plots > format.required_plots {
            messages.push("Too many plot cards".to_string());
        }
        if deck.draw_count() < format.required_draw {
            messages.push("Too few draw cards".to_string());
        }
        for rule in &rules.rules {
            if !(rule.condition)(deck) {
                messages.push(rule.message.clone());
            }
        }
        let not_allowed = labels(deck.cards().map(|entry| &entry.card).filter(|card| !rules.allows(card)));
        if !not_allowed.is_empty() {
            messages.push(format!("Cards not allowed by faction or agenda: {}", not_allowed.join(", ")));
        }

        let mut no_unreleased_cards = true;
        if !format.is_draft() {
            let unreleased = labels(deck.all_cards().map(|(_, card)| card).filter(|card| !self.is_released(&card.pack_code)));
            if !unreleased.is_empty() {
                no_unreleased_cards = false;
                messages.push(format!("Cards are not yet released: {}", unreleased.join(", ")));
            }
        }

        let mut plot_copies: FxHashMap<&str, u32> = FxHashMap::default();
        for entry in &deck.plot_cards {
            *plot_copies.entry(entry.card.code.as_str()).or_default() += entry.count;
        }
        let doubled = plot_copies.values().filter(|&&count| count == 2).count();
        if u32::try_from(doubled).unwrap_or(u32::MAX) > format.max_doubled_plots {
            messages.push(format!("Maximum allowed number of doubled plots: {}", format.max_doubled_plots));
        }

        let mut seen = FxHashSet::default();
        for entry in deck.cards() {
            let card = &entry.card;
            if !seen.insert(card.code.as_str()) {
                continue;
            }
            if deck.count_of(&card.code) > card.deck_limit {
                messages.push(format!("{} has limit {}", card.display_label(), card.deck_limit));
            }
        }

        let basic_rules = messages.is_empty();

        let (restricted_list, faq_version) = match list {
            Some(list) => {
                let result = list.validate(deck, format_name);
                messages.extend(result.errors);
                (result.valid, list.version.clone())
            }
            None => (true, String::new()),
        };

        debug!(deck = %deck.name, format = %format.name, problems = messages.len(), "deck validated");

        DeckStatus {
            basic_rules,
            faq_version,
            no_unreleased_cards,
            restricted_list,
            valid: basic_rules && restricted_list,
            extended_status: messages,
        }
    }
}

/// Distinct labels in first-seen order.
fn labels<'a>(cards: impl Iterator<Item = &'a CardData>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    cards
        .filter(|card| seen.insert(card.code.clone()))
        .map(|card| card.display_label().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardType, Faction};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn validator() -> DeckValidator {
        let packs = vec![
            Pack::new("Core", "Core Set", Some(date(2015, 10, 2))),
            Pack::new("Next", "Upcoming", Some(date(2030, 1, 1))),
        ];
        DeckValidator::with_now(&packs, Format::defaults(), Vec::new(), date(2020, 1, 1))
    }

    fn plot(index: u32) -> CardData {
        CardData::new(format!("p{index}"), format!("Plot {index}"), CardType::Plot, Faction::Neutral).with_pack("Core")
    }

    fn legal_deck() -> Deck {
        let mut deck = Deck::new("legal", Faction::Stark);
        for index in 0..7 {
            deck = deck.with_plot(1, plot(index));
        }
        for index in 0..20 {
            let card = CardData::new(format!("c{index}"), format!("Card {index}"), CardType::Character, Faction::Stark)
                .with_pack("Core");
            deck = deck.with_draw_card(3, card);
        }
        deck
    }

    #[test]
    fn test_legal_deck() {
        let status = validator().validate_format(&legal_deck(), "joust");
        assert!(status.valid, "{:?}", status.extended_status);
    }

    #[test]
    fn test_release_snapshot() {
        let validator = validator();
        assert!(validator.is_released("Core"));
        assert!(!validator.is_released("Next"));
        assert!(!validator.is_released("Unknown"));
    }

    #[test]
    fn test_doubled_plots() {
        let mut deck = legal_deck();
        deck.plot_cards.truncate(5);
        deck.plot_cards[0].count = 2;
        deck.plot_cards[1].count = 2;
        let status = validator().validate_format(&deck, "joust");
        assert_eq!(status.extended_status, vec!["Maximum allowed number of doubled plots: 1".to_string()]);
        assert!(!status.basic_rules);
        assert!(validator().validate_format(&deck, "draft").extended_status.iter().all(|m| !m.contains("doubled")));
    }

    #[test]
    fn test_card_limit() {
        let mut deck = legal_deck();
        deck.draw_cards[0].count = 4;
        let status = validator().validate_format(&deck, "joust");
        assert_eq!(status.extended_status, vec!["Card 0 has limit 3".to_string()]);
    }

    #[test]
    fn test_out_of_faction_card() {
        let deck = legal_deck().with_draw_card(
            1,
            CardData::new("l1", "Tywin Lannister", CardType::Character, Faction::Lannister).with_pack("Core"),
        );
        let status = validator().validate_format(&deck, "joust");
        assert_eq!(
            status.extended_status,
            vec!["Cards not allowed by faction or agenda: Tywin Lannister".to_string()]
        );
    }

    #[test]
    fn test_unreleased_card_fails_basic_rules() {
        let deck = legal_deck().with_draw_card(
            1,
            CardData::new("n1", "Arya Stark", CardType::Character, Faction::Stark).with_pack("Next"),
        );
        let status = validator().validate_format(&deck, "joust");
        assert!(!status.no_unreleased_cards);
        assert!(!status.basic_rules);
        assert!(status.restricted_list);
        assert!(!status.valid);
        assert_eq!(status.extended_status, vec!["Cards are not yet released: Arya Stark".to_string()]);
    }

    #[test]
    fn test_format_and_custom_rules_combine() {
        let mut formats = Format::defaults();
        formats[0] = Format::joust().with_rules(DeckRules::default().cannot_include(|card| card.code == "c0"));
        let validator = DeckValidator::with_now(&[Pack::new("Core", "Core Set", Some(date(2015, 10, 2)))], formats, Vec::new(), date(2020, 1, 1))
            .with_rules(DeckRules::default().rule("Must contain Card 19", |deck| deck.count_of("c19") > 0));

        let joust = validator.validate_format(&legal_deck(), "joust");
        assert_eq!(
            joust.extended_status,
            vec!["Cards not allowed by faction or agenda: Card 0".to_string()]
        );

        let mut deck = legal_deck();
        deck.draw_cards.retain(|entry| entry.card.code != "c19");
        deck = deck.with_draw_card(3, CardData::new("x", "Extra", CardType::Character, Faction::Stark).with_pack("Core"));
        let melee = validator.validate_format(&deck, "melee");
        assert_eq!(melee.extended_status, vec!["Must contain Card 19".to_string()]);
        assert!(!melee.basic_rules);
    }

    #[test]
    fn test_report_without_lists_covers_every_format() {
        let report = validator().validate_deck(&legal_deck());
        let formats: Vec<_> = report[UNRESTRICTED].keys().cloned().collect();
        assert_eq!(formats, vec!["draft", "joust", "melee"]);
    }
}
