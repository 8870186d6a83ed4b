//! Chat log messages.
//!
//! Templates use positional placeholders (`{0}`, `{1}`) filled from
//! [`MessageArg`]s, or the ability placeholders `{player}`, `{source}` and
//! `{target}` when written from an ability context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

use super::Game;

/// A value substituted into a message template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageArg {
    Player(PlayerId),
    Card(EntityId),
    Cards(Vec<EntityId>),
    Text(String),
    Number(i64),
}

impl From<&str> for MessageArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<PlayerId> for MessageArg {
    fn from(player: PlayerId) -> Self {
        Self::Player(player)
    }
}

impl From<EntityId> for MessageArg {
    fn from(card: EntityId) -> Self {
        Self::Card(card)
    }
}

/// One rendered chat line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub date: DateTime<Utc>,
    pub text: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            date: Utc::now(),
            text: text.into(),
        }
    }
}

fn join_labels(labels: &[String]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Text for one argument.
#[must_use]
pub fn render_arg(game: &Game, arg: &MessageArg) -> String {
    let label = |card: EntityId| {
        game.card(card)
            .map_or_else(|| card.to_string(), |c| c.label().to_string())
    };
    match arg {
        MessageArg::Player(player) => game.player(*player).name.clone(),
        MessageArg::Card(card) => label(*card),
        MessageArg::Cards(cards) => {
            let labels: Vec<String> = cards.iter().map(|&card| label(card)).collect();
            join_labels(&labels)
        }
        MessageArg::Text(text) => text.clone(),
        MessageArg::Number(number) => number.to_string(),
    }
}

/// Fill positional placeholders.
#[must_use]
pub fn render(game: &Game, template: &str, args: &[MessageArg]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (index, arg)| {
            text.replace(&format!("{{{index}}}"), &render_arg(game, arg))
        })
}

/// Fill `{player}`, `{source}` and `{target}`.
#[must_use]
pub fn render_context(
    game: &Game,
    template: &str,
    player: PlayerId,
    source: Option<EntityId>,
    targets: &[EntityId],
) -> String {
    let mut text = template.replace("{player}", &render_arg(game, &MessageArg::Player(player)));
    if let Some(source) = source {
        text = text.replace("{source}", &render_arg(game, &MessageArg::Card(source)));
    }
    text.replace("{target}", &render_arg(game, &MessageArg::Cards(targets.to_vec())))
}
