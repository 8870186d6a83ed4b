//! Player command representation: verb + arguments.
//!
//! Commands arrive from the (external) transport as `{command, args}`.
//! The engine routes them to the current step of the pipeline:
//! - `cardClicked(card)` goes to `Step::on_card_clicked`
//! - `menuButton(arg, method)` goes to `Step::on_menu_command`
//! - `menuItemClick(card, item)` selects a card ability from its menu

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::EntityId;
use super::player::PlayerId;

/// A single command argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandArg {
    /// A card instance reference.
    Card(EntityId),
    /// A free-form string (button arg, prompt method, menu item).
    Text(String),
}

impl From<EntityId> for CommandArg {
    fn from(card: EntityId) -> Self {
        Self::Card(card)
    }
}

impl From<&str> for CommandArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A player command.
///
/// ## Example
///
/// ```
/// use thrones_engine::core::{Command, EntityId};
///
/// let click = Command::card_clicked(EntityId(5));
/// assert_eq!(click.command, "cardClicked");
/// assert_eq!(click.card_arg(0), Some(EntityId(5)));
///
/// let done = Command::menu_button("done", "");
/// assert_eq!(done.text_arg(0), Some("done"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// The command verb.
    pub command: String,

    /// Command arguments.
    /// SmallVec optimizes for 0-3 arguments without heap allocation.
    pub args: SmallVec<[CommandArg; 3]>,
}

impl Command {
    /// Create a command with no arguments.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: SmallVec::new(),
        }
    }

    /// Add an argument (builder pattern).
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<CommandArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// A click on a card.
    #[must_use]
    pub fn card_clicked(card: EntityId) -> Self {
        Self::new("cardClicked").with_arg(card)
    }

    /// A prompt button press.
    #[must_use]
    pub fn menu_button(arg: &str, method: &str) -> Self {
        Self::new("menuButton").with_arg(arg).with_arg(method)
    }

    /// A card menu item selection.
    #[must_use]
    pub fn menu_item_click(card: EntityId, item: &str) -> Self {
        Self::new("menuItemClick").with_arg(card).with_arg(item)
    }

    /// Card argument at `index`, if that argument is a card.
    #[must_use]
    pub fn card_arg(&self, index: usize) -> Option<EntityId> {
        match self.args.get(index) {
            Some(CommandArg::Card(card)) => Some(*card),
            _ => None,
        }
    }

    /// Text argument at `index`, if that argument is text.
    #[must_use]
    pub fn text_arg(&self, index: usize) -> Option<&str> {
        match self.args.get(index) {
            Some(CommandArg::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// A recorded command with metadata for replay and debugging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// The player who sent this command.
    pub player: PlayerId,

    /// The command sent.
    pub command: Command,

    /// Round number when it was received (0 during setup).
    pub round: u32,

    /// Whether the current step accepted it.
    pub accepted: bool,
}

impl CommandRecord {
    /// Create a new command record.
    #[must_use]
    pub fn new(player: PlayerId, command: Command, round: u32, accepted: bool) -> Self {
        Self {
            player,
            command,
            round,
            accepted,
        }
    }
}
