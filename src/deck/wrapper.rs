//! Deck lists.

use serde::{Deserialize, Serialize};

use crate::cards::{CardData, CardType, Faction};

/// A quantity of one card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckCard {
    pub count: u32,
    pub card: CardData,
}

impl DeckCard {
    pub fn new(count: u32, card: CardData) -> Self {
        Self { count, card }
    }
}

/// A player's deck: faction, agendas, plot deck and draw deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub name: String,
    pub faction: Faction,
    #[serde(default)]
    pub agendas: Vec<CardData>,
    #[serde(default)]
    pub plot_cards: Vec<DeckCard>,
    #[serde(default)]
    pub draw_cards: Vec<DeckCard>,
}

impl Deck {
    /// An empty deck for `faction`.
    pub fn new(name: impl Into<String>, faction: Faction) -> Self {
        Self {
            name: name.into(),
            faction,
            agendas: Vec::new(),
            plot_cards: Vec::new(),
            draw_cards: Vec::new(),
        }
    }

    /// Add an agenda (builder pattern).
    #[must_use]
    pub fn with_agenda(mut self, agenda: CardData) -> Self {
        self.agendas.push(agenda);
        self
    }

    /// Add plots (builder pattern).
    #[must_use]
    pub fn with_plot(mut self, count: u32, card: CardData) -> Self {
        self.plot_cards.push(DeckCard::new(count, card));
        self
    }

    /// Add draw cards (builder pattern).
    #[must_use]
    pub fn with_draw_card(mut self, count: u32, card: CardData) -> Self {
        self.draw_cards.push(DeckCard::new(count, card));
        self
    }

    #[must_use]
    pub fn plot_count(&self) -> u32 {
        self.plot_cards.iter().map(|entry| entry.count).sum()
    }

    #[must_use]
    pub fn draw_count(&self) -> u32 {
        self.draw_cards.iter().map(|entry| entry.count).sum()
    }

    /// Every plot and draw card entry.
    pub fn cards(&self) -> impl Iterator<Item = &DeckCard> {
        self.plot_cards.iter().chain(&self.draw_cards)
    }

    /// Total copies of `code` across plot and draw decks.
    #[must_use]
    pub fn count_of(&self, code: &str) -> u32 {
        self.cards()
            .filter(|entry| entry.card.code == code)
            .map(|entry| entry.count)
            .sum()
    }

    /// Copies of draw cards matching `predicate`.
    #[must_use]
    pub fn count_draw_cards(&self, predicate: impl Fn(&CardData) -> bool) -> u32 {
        self.draw_cards
            .iter()
            .filter(|entry| predicate(&entry.card))
            .map(|entry| entry.count)
            .sum()
    }

    /// Whether any agenda has `code`.
    #[must_use]
    pub fn has_agenda(&self, code: &str) -> bool {
        self.agendas.iter().any(|agenda| agenda.code == code)
    }

    /// Every card including agendas, agendas counted once.
    pub fn all_cards(&self) -> impl Iterator<Item = (u32, &CardData)> {
        self.agendas
            .iter()
            .filter(|agenda| agenda.card_type == CardType::Agenda)
            .map(|agenda| (1, agenda))
            .chain(self.cards().map(|entry| (entry.count, &entry.card)))
    }
}
