//! Client-facing card snapshots.
//!
//! A summary is what one viewer may know about a card. Cards the viewer
//! cannot see collapse to [`CardSummary::Hidden`]: facing, id, tokens and
//! selection state only.

use im::OrdMap;
use serde::Serialize;

use super::data::CardType;
use super::instance::{Card, Token};
use crate::core::{EntityId, PlayerId};
use crate::game::Game;

/// Badge shown when a card's implementation is missing or stale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlertStatus {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Warning,
}

/// One entry of a card's action menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub text: String,
    /// Argument sent back with `menuItemClick`.
    pub arg: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenCard {
    pub facedown: bool,
    pub uuid: EntityId,
    pub tokens: OrdMap<Token, u32>,
    pub selected: bool,
    pub selectable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleCard {
    pub facedown: bool,
    pub uuid: EntityId,
    pub code: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Controlled by someone other than the owner.
    pub controlled: bool,
    pub kneeled: bool,
    pub power: u32,
    pub strength: i32,
    pub tokens: OrdMap<Token, u32>,
    pub menu: Vec<MenuItem>,
    pub alert_status: Option<AlertStatus>,
    pub selected: bool,
    pub selectable: bool,
    pub attachments: Vec<CardSummary>,
    pub dupes: Vec<CardSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardSummary {
    Hidden(HiddenCard),
    Visible(Box<VisibleCard>),
}

impl CardSummary {
    #[must_use]
    pub fn uuid(&self) -> EntityId {
        match self {
            Self::Hidden(card) => card.uuid,
            Self::Visible(card) => card.uuid,
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden(_))
    }
}

/// Summary without game context, for deck and pile listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortSummary {
    pub facedown: bool,
    pub uuid: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub card_type: Option<CardType>,
}

impl Card {
    /// Implementation badge: an error when the card has printed abilities
    /// but no implementation, a warning when the implementation targets a
    /// different version of the card data.
    #[must_use]
    pub fn alert_status(&self) -> Option<AlertStatus> {
        if !self.is_implemented() && self.data().text.contains("<b>") {
            return Some(AlertStatus {
                kind: AlertKind::Error,
                message: "Card not implemented".to_string(),
            });
        }
        let data_version = self.data().version.as_deref();
        if self.is_implemented() && data_version.is_some() && data_version != self.implementation_version() {
            return Some(AlertStatus {
                kind: AlertKind::Warning,
                message: format!(
                    "Implementation is for version {} of this card",
                    self.implementation_version().unwrap_or("(none)")
                ),
            });
        }
        None
    }

    /// What `viewer` may know about this card.
    #[must_use]
    pub fn summary(&self, game: &Game, viewer: PlayerId) -> CardSummary {
        let player = game.player(viewer);
        let selected = player.is_selected(self.id);
        let selectable = player.is_selectable(self.id);

        if !game.visibility().is_visible(game, self, viewer) {
            return CardSummary::Hidden(HiddenCard {
                facedown: true,
                uuid: self.id,
                tokens: self.tokens().clone(),
                selected,
                selectable,
            });
        }

        let menu = game
            .available_actions(viewer, self.id)
            .into_iter()
            .enumerate()
            .filter_map(|(index, ability)| {
                let title = &game.abilities().get(ability)?.title;
                Some(MenuItem {
                    text: title.clone(),
                    arg: index.to_string(),
                })
            })
            .collect();
        let children = |ids: &[EntityId]| -> Vec<CardSummary> {
            ids.iter()
                .filter_map(|&id| game.card(id))
                .map(|card| card.summary(game, viewer))
                .collect()
        };

        CardSummary::Visible(Box::new(VisibleCard {
            facedown: self.facedown,
            uuid: self.id,
            code: self.code().to_string(),
            name: self.name().to_string(),
            label: self.label().to_string(),
            card_type: self.card_type(),
            controlled: self.owner != self.controller(),
            kneeled: self.kneeled,
            power: self.power(),
            strength: self.strength(),
            tokens: self.tokens().clone(),
            menu,
            alert_status: self.alert_status(),
            selected,
            selectable,
            attachments: children(&self.attachments),
            dupes: children(&self.dupes),
        }))
    }

    #[must_use]
    pub fn short_summary(&self, visible: bool) -> ShortSummary {
        if !visible {
            return ShortSummary {
                facedown: true,
                uuid: self.id,
                code: None,
                label: None,
                card_type: None,
            };
        }
        ShortSummary {
            facedown: self.facedown,
            uuid: self.id,
            code: Some(self.code().to_string()),
            label: Some(self.label().to_string()),
            card_type: Some(self.card_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardData, Faction};
    use std::rc::Rc;

    fn card(text: &str) -> Card {
        let data = CardData::new("01001", "Ser Jaime", CardType::Character, Faction::Lannister).with_text(text);
        Card::new(EntityId(1), PlayerId(0), Rc::new(data))
    }

    #[test]
    fn test_unimplemented_ability_text_is_an_error() {
        let alert = card("<b>Reaction:</b> After...").alert_status().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.message, "Card not implemented");
    }

    #[test]
    fn test_vanilla_card_needs_no_implementation() {
        assert_eq!(card("Renown.").alert_status(), None);
    }

    #[test]
    fn test_version_mismatch_is_a_warning() {
        let mut data = CardData::new("01001", "Ser Jaime", CardType::Character, Faction::Lannister);
        data.version = Some("2.0".into());
        let card = Card::new(EntityId(1), PlayerId(0), Rc::new(data)).with_implementation(Some("1.0".into()));
        assert_eq!(card.alert_status().map(|alert| alert.kind), Some(AlertKind::Warning));
    }

    #[test]
    fn test_hidden_short_summary() {
        let json = serde_json::to_value(card("").short_summary(false)).unwrap();
        assert_eq!(json, serde_json::json!({"facedown": true, "uuid": 1}));
    }
}
