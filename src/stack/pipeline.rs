//! Ordered step pipeline.

use std::collections::VecDeque;

use tracing::debug;

use crate::core::{EntityId, PlayerId};
use crate::game::Game;
use crate::phases::PromptState;

use super::{Step, StepStatus};

/// Steps run front to back.
///
/// A pipeline is itself a [`Step`]: a phase is a pipeline nested in the
/// match pipeline, and event windows nest pipelines of their own.
#[derive(Default)]
pub struct GamePipeline {
    steps: VecDeque<Box<dyn Step>>,
}

impl GamePipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_steps(steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Add a step at the end.
    pub fn push(&mut self, step: Box<dyn Step>) {
        self.steps.push_back(step);
    }

    /// Insert steps at the front, keeping their order.
    pub fn prepend(&mut self, steps: Vec<Box<dyn Step>>) {
        for step in steps.into_iter().rev() {
            self.steps.push_front(step);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step currently at the front.
    #[must_use]
    pub fn current(&self) -> Option<&dyn Step> {
        self.steps.front().map(|step| step.as_ref())
    }

    /// Run steps until one waits for input or the pipeline is empty.
    pub fn continue_pipeline(&mut self, game: &mut Game) -> StepStatus {
        while let Some(mut step) = self.steps.pop_front() {
            game.begin_staging();
            let status = step.continue_step(game);
            let staged = game.end_staging();

            match status {
                StepStatus::Complete => {
                    self.prepend(staged);
                }
                StepStatus::Waiting => {
                    let retry = !staged.is_empty();
                    self.steps.push_front(step);
                    self.prepend(staged);
                    if !retry {
                        return StepStatus::Waiting;
                    }
                }
            }

            if game.is_finished() {
                debug!("match finished, pipeline stopped");
                self.steps.clear();
                return StepStatus::Complete;
            }
        }
        StepStatus::Complete
    }
}

impl Step for GamePipeline {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        self.continue_pipeline(game)
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        self.steps
            .front_mut()
            .is_some_and(|step| step.on_card_clicked(game, player, card))
    }

    fn on_menu_command(&mut self, game: &mut Game, player: PlayerId, arg: &str, method: &str) -> bool {
        self.steps
            .front_mut()
            .is_some_and(|step| step.on_menu_command(game, player, arg, method))
    }

    fn prompt_for(&self, game: &Game, player: PlayerId) -> Option<PromptState> {
        self.steps.front().and_then(|step| step.prompt_for(game, player))
    }

    fn allows_actions(&self, player: PlayerId) -> bool {
        self.steps
            .front()
            .is_some_and(|step| step.allows_actions(player))
    }

    fn action_taken(&mut self, player: PlayerId) {
        if let Some(step) = self.steps.front_mut() {
            step.action_taken(player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::stack::SimpleStep;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct WaitOnce {
        waited: bool,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Step for WaitOnce {
        fn name(&self) -> &str {
            "wait once"
        }

        fn continue_step(&mut self, game: &mut Game) -> StepStatus {
            if self.waited {
                self.log.borrow_mut().push("resumed");
                return StepStatus::Complete;
            }
            self.waited = true;
            let log = Rc::clone(&self.log);
            game.queue_step(Box::new(SimpleStep::new("queued", move |_| {
                log.borrow_mut().push("queued");
            })));
            StepStatus::Waiting
        }
    }

    #[test]
    fn test_steps_queued_by_waiting_step_run_before_it() {
        let mut game = Game::new(GameConfig::head_to_head("a", "b"));
        let log = Rc::new(RefCell::new(Vec::new()));
        let tail = Rc::clone(&log);
        let mut pipeline = GamePipeline::with_steps(vec![
            Box::new(WaitOnce {
                waited: false,
                log: Rc::clone(&log),
            }),
            Box::new(SimpleStep::new("tail", move |_| tail.borrow_mut().push("tail"))),
        ]);

        assert_eq!(pipeline.continue_pipeline(&mut game), StepStatus::Complete);
        assert_eq!(*log.borrow(), vec!["queued", "resumed", "tail"]);
    }

    #[test]
    fn test_steps_queued_by_completed_step_run_next() {
        let mut game = Game::new(GameConfig::head_to_head("a", "b"));
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let last = Rc::clone(&log);
        let mut pipeline = GamePipeline::with_steps(vec![
            Box::new(SimpleStep::new("first", move |game| {
                first.borrow_mut().push("first");
                let inner = Rc::clone(&first);
                game.queue_step(Box::new(SimpleStep::new("inner", move |_| {
                    inner.borrow_mut().push("inner");
                })));
            })),
            Box::new(SimpleStep::new("last", move |_| last.borrow_mut().push("last"))),
        ]);

        pipeline.continue_pipeline(&mut game);
        assert_eq!(*log.borrow(), vec!["first", "inner", "last"]);
    }

    #[test]
    fn test_empty_pipeline_completes() {
        let mut game = Game::new(GameConfig::head_to_head("a", "b"));
        let mut pipeline = GamePipeline::new();
        assert_eq!(pipeline.continue_pipeline(&mut game), StepStatus::Complete);
        assert!(pipeline.current().is_none());
    }
}
