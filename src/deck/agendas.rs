//! Deck-building rules from factions and agendas.
//!
//! A deck's rules are the union of its faction's rules and each agenda's:
//! a card may be included if any rule set allows it, is excluded if any
//! rule set forbids it, and every extra deck rule must hold.

use std::fmt;
use std::rc::Rc;

use crate::cards::{CardData, Faction};

use super::wrapper::Deck;

pub type CardPredicate = Rc<dyn Fn(&CardData) -> bool>;
pub type DeckPredicate = Rc<dyn Fn(&Deck) -> bool>;

/// A whole-deck requirement with the message shown when it fails.
#[derive(Clone)]
pub struct DeckRule {
    pub message: String,
    pub condition: DeckPredicate,
}

impl fmt::Debug for DeckRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckRule").field("message", &self.message).finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
pub struct DeckRules {
    pub may_include: Vec<CardPredicate>,
    pub cannot_include: Vec<CardPredicate>,
    pub rules: Vec<DeckRule>,
}

impl fmt::Debug for DeckRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckRules")
            .field("may_include", &self.may_include.len())
            .field("cannot_include", &self.cannot_include.len())
            .field("rules", &self.rules)
            .finish()
    }
}

impl DeckRules {
    #[must_use]
    pub fn may_include(mut self, predicate: impl Fn(&CardData) -> bool + 'static) -> Self {
        self.may_include.push(Rc::new(predicate));
        self
    }

    #[must_use]
    pub fn cannot_include(mut self, predicate: impl Fn(&CardData) -> bool + 'static) -> Self {
        self.cannot_include.push(Rc::new(predicate));
        self
    }

    #[must_use]
    pub fn rule(mut self, message: impl Into<String>, condition: impl Fn(&Deck) -> bool + 'static) -> Self {
        self.rules.push(DeckRule {
            message: message.into(),
            condition: Rc::new(condition),
        });
        self
    }

    /// Union of two rule sets.
    #[must_use]
    pub fn combine(mut self, other: DeckRules) -> Self {
        self.may_include.extend(other.may_include);
        self.cannot_include.extend(other.cannot_include);
        self.rules.extend(other.rules);
        self
    }

    /// A forbidding rule wins over any allowing one.
    #[must_use]
    pub fn allows(&self, card: &CardData) -> bool {
        self.may_include.iter().any(|may| may(card)) && !self.cannot_include.iter().any(|cannot| cannot(card))
    }
}

/// In-faction and neutral cards.
#[must_use]
pub fn faction_rules(faction: Faction) -> DeckRules {
    DeckRules::default().may_include(move |card| card.faction == faction || card.faction == Faction::Neutral)
}

const BANNERS: [(&str, Faction); 8] = [
    ("01198", Faction::Baratheon),
    ("01199", Faction::Greyjoy),
    ("01200", Faction::Lannister),
    ("01201", Faction::Martell),
    ("01202", Faction::NightsWatch),
    ("01203", Faction::Stark),
    ("01204", Faction::Targaryen),
    ("01205", Faction::Tyrell),
];

const THE_FREE_FOLK: &str = "11079";

/// Banner agendas need this many cards of the banner's faction.
pub const BANNER_MINIMUM: u32 = 12;

/// Rules an agenda adds. Agendas without deck-building text add none.
#[must_use]
pub fn agenda_rules(agenda: &CardData) -> DeckRules {
    if let Some(&(_, faction)) = BANNERS.iter().find(|(code, _)| *code == agenda.code) {
        return banner_rules(faction);
    }
    if agenda.code == THE_FREE_FOLK {
        return DeckRules::default().cannot_include(|card| card.faction != Faction::Neutral);
    }
    DeckRules::default()
}

fn banner_rules(faction: Faction) -> DeckRules {
    DeckRules::default()
        .may_include(move |card| card.faction == faction && !card.loyal)
        .rule(
            format!("Must contain {BANNER_MINIMUM} or more {faction} cards"),
            move |deck| deck.count_draw_cards(|card| card.faction == faction) >= BANNER_MINIMUM,
        )
}

/// The faction's rules combined with every agenda's.
#[must_use]
pub fn deck_rules(deck: &Deck) -> DeckRules {
    deck.agendas
        .iter()
        .fold(faction_rules(deck.faction), |rules, agenda| rules.combine(agenda_rules(agenda)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;

    fn character(code: &str, faction: Faction) -> CardData {
        CardData::new(code, code, CardType::Character, faction)
    }

    fn agenda(code: &str) -> CardData {
        CardData::new(code, code, CardType::Agenda, Faction::Neutral)
    }

    #[test]
    fn test_faction_allows_own_and_neutral() {
        let rules = faction_rules(Faction::Stark);
        assert!(rules.allows(&character("a", Faction::Stark)));
        assert!(rules.allows(&character("b", Faction::Neutral)));
        assert!(!rules.allows(&character("c", Faction::Lannister)));
    }

    #[test]
    fn test_banner_allows_non_loyal_out_of_faction() {
        let deck = Deck::new("d", Faction::Stark).with_agenda(agenda("01200"));
        let rules = deck_rules(&deck);
        assert!(rules.allows(&character("a", Faction::Lannister)));
        assert!(!rules.allows(&character("b", Faction::Lannister).loyal()));
        assert_eq!(rules.rules.len(), 1);
        assert_eq!(rules.rules[0].message, "Must contain 12 or more lannister cards");
    }

    #[test]
    fn test_cannot_include_overrides_may_include() {
        let deck = Deck::new("d", Faction::Stark).with_agenda(agenda(THE_FREE_FOLK));
        let rules = deck_rules(&deck);
        assert!(!rules.allows(&character("a", Faction::Stark)));
        assert!(rules.allows(&character("b", Faction::Neutral)));
    }
}
