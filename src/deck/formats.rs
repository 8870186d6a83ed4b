//! Tournament formats.
//!
//! Formats are plain data so new ones can be loaded alongside card data.
//! A name the validator does not know is checked as joust.

use serde::{Deserialize, Serialize};

use super::agendas::DeckRules;

/// Deck-size rules of one format, plus any inclusion rules it adds on
/// top of the faction and agenda.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub name: String,
    pub required_plots: u32,
    /// How many plots may appear twice.
    pub max_doubled_plots: u32,
    pub required_draw: u32,
    #[serde(skip)]
    pub rules: DeckRules,
}

impl Format {
    pub fn new(name: impl Into<String>, required_plots: u32, max_doubled_plots: u32, required_draw: u32) -> Self {
        Self {
            name: name.into(),
            required_plots,
            max_doubled_plots,
            required_draw,
            rules: DeckRules::default(),
        }
    }

    /// Add inclusion and deck rules (builder pattern).
    #[must_use]
    pub fn with_rules(mut self, rules: DeckRules) -> Self {
        self.rules = self.rules.combine(rules);
        self
    }

    #[must_use]
    pub fn joust() -> Self {
        Self::new("joust", 7, 1, 60)
    }

    #[must_use]
    pub fn melee() -> Self {
        Self::new("melee", 7, 1, 60)
    }

    /// Draft decks are smaller and may contain unreleased cards.
    #[must_use]
    pub fn draft() -> Self {
        Self::new("draft", 7, 2, 40)
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.name == "draft"
    }

    /// The standard formats.
    #[must_use]
    pub fn defaults() -> Vec<Format> {
        vec![Self::joust(), Self::melee(), Self::draft()]
    }
}

/// Look up `name`, falling back to the joust rules.
#[must_use]
pub fn find_format<'a>(formats: &'a [Format], name: &str) -> Option<&'a Format> {
    formats
        .iter()
        .find(|format| format.name == name)
        .or_else(|| formats.iter().find(|format| format.name == "joust"))
}
