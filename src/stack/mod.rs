//! Step pipelines and resolution windows.
//!
//! The match advances by running [`Step`]s in order. A step either
//! completes or waits; a waiting step suspends the whole pipeline until a
//! player command lets it make progress.
//!
//! ## Key Components
//!
//! - [`GamePipeline`]: Ordered steps; itself a step, so phases nest
//! - [`SimpleStep`]: Runs a closure once
//! - [`EventWindow`]: Resolves one event tree with its trigger windows
//! - [`TriggeredAbilityWindow`]: Offers reactions or interrupts in
//!   player priority order
//! - [`AbilityResolver`]: Targets, costs, limit and handler of one ability
//!
//! ## Queued steps
//!
//! Steps queued with [`Game::queue_step`] while a step runs are collected
//! in a staging frame. When the step completes they run before the next
//! step; when it waits they run before the step itself is retried.
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use thrones_engine::core::GameConfig;
//! use thrones_engine::game::Game;
//! use thrones_engine::stack::{GamePipeline, SimpleStep, StepStatus};
//!
//! let mut game = Game::new(GameConfig::head_to_head("alice", "bob"));
//! let order = Rc::new(Cell::new(0));
//!
//! let first = Rc::clone(&order);
//! let second = Rc::clone(&order);
//! let mut pipeline = GamePipeline::with_steps(vec![
//!     Box::new(SimpleStep::new("first", move |_| first.set(first.get() * 10 + 1))),
//!     Box::new(SimpleStep::new("second", move |_| second.set(second.get() * 10 + 2))),
//! ]);
//!
//! assert_eq!(pipeline.continue_pipeline(&mut game), StepStatus::Complete);
//! assert_eq!(order.get(), 12);
//! ```

mod pipeline;
mod resolver;
mod triggered;
mod window;

pub use pipeline::GamePipeline;
pub use resolver::AbilityResolver;
pub use triggered::TriggeredAbilityWindow;
pub use window::EventWindow;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::game::Game;
use crate::phases::PromptState;

/// Result of advancing a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// The step is finished and can be dropped.
    Complete,

    /// The step needs player input (or queued steps) before it can finish.
    Waiting,
}

/// One element of a pipeline.
///
/// Command handlers return `true` when the command was accepted. Rejected
/// commands change nothing.
pub trait Step {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Advance the step as far as it can go.
    fn continue_step(&mut self, game: &mut Game) -> StepStatus;

    fn on_card_clicked(&mut self, _game: &mut Game, _player: PlayerId, _card: EntityId) -> bool {
        false
    }

    fn on_menu_command(
        &mut self,
        _game: &mut Game,
        _player: PlayerId,
        _arg: &str,
        _method: &str,
    ) -> bool {
        false
    }

    /// The prompt `player` currently sees, if this step is prompting.
    fn prompt_for(&self, _game: &Game, _player: PlayerId) -> Option<PromptState> {
        None
    }

    /// Whether `player` may trigger action abilities now.
    fn allows_actions(&self, _player: PlayerId) -> bool {
        false
    }

    /// `player` started resolving an action ability.
    fn action_taken(&mut self, _player: PlayerId) {}
}

impl fmt::Debug for dyn Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step({})", self.name())
    }
}

/// A step that runs a closure once and completes.
pub struct SimpleStep {
    name: String,
    action: Option<Box<dyn FnOnce(&mut Game)>>,
}

impl SimpleStep {
    pub fn new(name: impl Into<String>, action: impl FnOnce(&mut Game) + 'static) -> Self {
        Self {
            name: name.into(),
            action: Some(Box::new(action)),
        }
    }
}

impl Step for SimpleStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if let Some(action) = self.action.take() {
            action(game);
        }
        StepStatus::Complete
    }
}
