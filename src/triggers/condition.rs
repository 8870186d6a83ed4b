//! Trigger conditions.
//!
//! A `when` clause maps an [`EventKind`] to either a plain predicate or an
//! aggregate condition. Aggregates see every matching event of one window
//! at once, grouped by a key.

use std::rc::Rc;

use serde_json::Value;

use crate::game::Game;

use super::event::{Event, EventId};

/// Predicate over a single event.
pub type EventPredicate = Rc<dyn Fn(&Game, &Event) -> bool>;

/// Key function for aggregate triggers. Keys compare by deep equality.
pub type AggregateBy = Rc<dyn Fn(&Game, &Event) -> Value>;

/// Condition over one aggregate group.
pub type AggregateCondition = Rc<dyn Fn(&Game, &Value) -> bool>;

/// Condition attached to one event kind of a `when` clause.
#[derive(Clone)]
pub enum WhenCondition {
    /// Fires once per matching event.
    Single(EventPredicate),

    /// Groups matching events by key and fires once per satisfied group.
    Aggregate {
        aggregate_by: AggregateBy,
        condition: AggregateCondition,
    },
}

impl std::fmt::Debug for WhenCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Single"),
            Self::Aggregate { .. } => f.write_str("Aggregate"),
        }
    }
}

impl WhenCondition {
    /// Plain predicate condition.
    pub fn single(predicate: impl Fn(&Game, &Event) -> bool + 'static) -> Self {
        Self::Single(Rc::new(predicate))
    }

    /// Aggregate condition.
    pub fn aggregate(
        aggregate_by: impl Fn(&Game, &Event) -> Value + 'static,
        condition: impl Fn(&Game, &Value) -> bool + 'static,
    ) -> Self {
        Self::Aggregate {
            aggregate_by: Rc::new(aggregate_by),
            condition: Rc::new(condition),
        }
    }

    /// Evaluate against every candidate event of the window.
    ///
    /// Returns the event groups the trigger fires for. A single condition
    /// yields one group per passing event; an aggregate condition groups
    /// events by key in first-seen order and keeps the groups whose key
    /// passes.
    #[must_use]
    pub fn evaluate(&self, game: &Game, events: &[&Event]) -> Vec<Vec<EventId>> {
        match self {
            Self::Single(predicate) => events
                .iter()
                .filter(|event| predicate(game, event))
                .map(|event| vec![event.id])
                .collect(),
            Self::Aggregate {
                aggregate_by,
                condition,
            } => {
                let mut groups: Vec<(Value, Vec<EventId>)> = Vec::new();
                for event in events {
                    let key = aggregate_by(game, event);
                    match groups.iter_mut().find(|(existing, _)| *existing == key) {
                        Some((_, members)) => members.push(event.id),
                        None => groups.push((key, vec![event.id])),
                    }
                }
                groups
                    .into_iter()
                    .filter(|(key, _)| condition(game, key))
                    .map(|(_, members)| members)
                    .collect()
            }
        }
    }
}
