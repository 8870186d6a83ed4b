//! Restricted and banned lists.
//!
//! A restricted list carries per-format rules: banned cards, a restricted
//! list of which a deck may hold at most one, and pods. A pod names cards
//! that cannot be played together, optionally keyed on one restricted card.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::wrapper::Deck;

/// Cards that may not be combined.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    /// When set, the pod only applies if this card is in the deck and then
    /// forbids all of `cards`. When unset, at most one of `cards` is allowed.
    #[serde(default)]
    pub restricted: Option<String>,
    pub cards: Vec<String>,
}

/// One format's entries on a restricted list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRestrictions {
    pub name: String,
    #[serde(default)]
    pub restricted: Vec<String>,
    #[serde(default)]
    pub banned: Vec<String>,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedList {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// FAQ version the list belongs to.
    pub version: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub formats: Vec<FormatRestrictions>,
}

/// Outcome of checking one deck against one format's restrictions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RestrictedListResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl RestrictedList {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            date: None,
            formats: Vec::new(),
        }
    }

    /// Add a format's entries (builder pattern).
    #[must_use]
    pub fn with_format(mut self, format: FormatRestrictions) -> Self {
        self.formats.push(format);
        self
    }

    #[must_use]
    pub fn format(&self, name: &str) -> Option<&FormatRestrictions> {
        self.formats.iter().find(|format| format.name == name)
    }

    /// Check `deck` under `format`. A format the list does not mention has
    /// no restrictions.
    #[must_use]
    pub fn validate(&self, deck: &Deck, format: &str) -> RestrictedListResult {
        let Some(rules) = self.format(format) else {
            return RestrictedListResult {
                valid: true,
                errors: Vec::new(),
            };
        };
        let includes = |code: &str| deck.count_of(code) > 0 || deck.has_agenda(code);
        let name_of = |code: &str| {
            deck.all_cards()
                .find(|(_, card)| card.code == code)
                .map_or_else(|| code.to_string(), |(_, card)| card.display_label().to_string())
        };

        let mut errors = Vec::new();

        let banned: Vec<String> = rules.banned.iter().filter(|code| includes(code)).map(|code| name_of(code)).collect();
        if !banned.is_empty() {
            errors.push(format!("Contains cards that are banned in {}: {}", rules.name, banned.join(", ")));
        }

        let restricted: Vec<String> = rules
            .restricted
            .iter()
            .filter(|code| includes(code))
            .map(|code| name_of(code))
            .collect();
        if restricted.len() > 1 {
            errors.push(format!(
                "Contains more than 1 card on the {} restricted list: {}",
                rules.name,
                restricted.join(", ")
            ));
        }

        for pod in &rules.pods {
            let present: Vec<&String> = pod.cards.iter().filter(|code| includes(code)).collect();
            let violated = match &pod.restricted {
                Some(key) => includes(key) && !present.is_empty(),
                None => present.len() > 1,
            };
            if violated {
                let mut names: Vec<String> = pod.restricted.iter().filter(|key| includes(key)).map(|key| name_of(key)).collect();
                names.extend(present.iter().map(|code| name_of(code)));
                errors.push(format!("Contains cards that cannot be played together: {}", names.join(", ")));
            }
        }

        RestrictedListResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardData, CardType, Faction};

    fn card(code: &str) -> CardData {
        CardData::new(code, format!("Card {code}"), CardType::Character, Faction::Stark)
    }

    fn list() -> RestrictedList {
        RestrictedList::new("rl-1", "Joust RL", "2.0").with_format(FormatRestrictions {
            name: "joust".into(),
            restricted: vec!["r1".into(), "r2".into()],
            banned: vec!["b1".into()],
            pods: vec![Pod {
                restricted: Some("r1".into()),
                cards: vec!["p1".into()],
            }],
        })
    }

    #[test]
    fn test_one_restricted_card_is_fine() {
        let deck = Deck::new("d", Faction::Stark).with_draw_card(1, card("r1"));
        assert!(list().validate(&deck, "joust").valid);
    }

    #[test]
    fn test_two_restricted_cards() {
        let deck = Deck::new("d", Faction::Stark)
            .with_draw_card(1, card("r1"))
            .with_draw_card(1, card("r2"));
        let result = list().validate(&deck, "joust");
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["Contains more than 1 card on the joust restricted list: Card r1, Card r2".to_string()]
        );
    }

    #[test]
    fn test_banned_and_pod() {
        let deck = Deck::new("d", Faction::Stark)
            .with_draw_card(1, card("b1"))
            .with_draw_card(1, card("r1"))
            .with_draw_card(1, card("p1"));
        let result = list().validate(&deck, "joust");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[1].ends_with("Card r1, Card p1"));
    }

    #[test]
    fn test_unlisted_format_is_unrestricted() {
        let deck = Deck::new("d", Faction::Stark).with_draw_card(1, card("b1"));
        assert!(list().validate(&deck, "melee").valid);
    }
}
