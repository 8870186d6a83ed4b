//! Prompt state shared by every prompting step.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::game::Game;

/// What a prompt callback wants to happen next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptOutcome {
    /// Close the prompt.
    Complete,
    /// Keep the prompt open with a fresh selection.
    Continue,
}

/// One button of a prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptButton {
    pub text: String,
    pub arg: String,
    pub method: String,

    /// Card the button stands for, highlighted by the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<EntityId>,
}

impl PromptButton {
    pub fn new(text: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            arg: arg.into(),
            method: "menuButton".to_string(),
            card: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[must_use]
    pub fn for_card(mut self, card: EntityId) -> Self {
        self.card = Some(card);
        self
    }
}

/// The prompt one player sees.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptState {
    pub menu_title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_title: Option<String>,

    pub buttons: Vec<PromptButton>,

    /// Clicking cards makes a selection.
    pub select_card: bool,

    /// The player is waiting for someone else.
    pub waiting: bool,
}

impl PromptState {
    pub fn menu(title: impl Into<String>, buttons: Vec<PromptButton>) -> Self {
        Self {
            menu_title: title.into(),
            buttons,
            ..Self::default()
        }
    }

    pub fn waiting(text: impl Into<String>) -> Self {
        Self {
            menu_title: text.into(),
            waiting: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_prompt_title(mut self, title: impl Into<String>) -> Self {
        self.prompt_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn selecting(mut self) -> Self {
        self.select_card = true;
        self
    }
}

/// Which players have finished a prompt every player answers.
#[derive(Clone, Debug, Default)]
pub struct PlayerCompletion {
    done: FxHashSet<PlayerId>,
}

impl PlayerCompletion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&mut self, player: PlayerId) {
        self.done.insert(player);
    }

    #[must_use]
    pub fn is_complete(&self, player: PlayerId) -> bool {
        self.done.contains(&player)
    }

    /// Whether every seat in the match has finished.
    #[must_use]
    pub fn all_complete(&self, game: &Game) -> bool {
        game.player_ids().all(|player| self.done.contains(&player))
    }
}
