//! Events and the abilities that respond to them.
//!
//! ## Key Components
//!
//! - [`EventKind`]: Tagged kinds of event the engine raises
//! - [`EventArena`]: Storage for events with children, attached events
//!   and atomic bundles
//! - [`WhenCondition`]: Single or aggregate trigger conditions
//! - [`AbilityTrigger`]: One card ability with its timing class
//! - [`AbilityRegistry`]: Storage, listening index and limits
//!
//! ## Example
//!
//! ```
//! use thrones_engine::core::EntityId;
//! use thrones_engine::triggers::{AbilityTrigger, EventKind, TimingClass, WhenCondition};
//!
//! let source = EntityId(7);
//! let reaction = AbilityTrigger::reaction(source)
//!     .when(
//!         EventKind::CardKneeled,
//!         WhenCondition::single(move |_, event| event.params.card == Some(source)),
//!     )
//!     .with_message("{player} uses {source} to gain 1 gold");
//!
//! assert_eq!(reaction.timing, TimingClass::Reaction);
//! assert!(!reaction.capabilities().has_cost);
//! ```

mod ability;
mod condition;
mod event;
mod registry;

pub use ability::{
    AbilityCondition, AbilityContext, AbilityHandler, AbilityId, AbilityLimit, AbilityTrigger,
    Capabilities, LimitPeriod, TimingClass,
};
pub use condition::{AggregateBy, AggregateCondition, EventPredicate, WhenCondition};
pub use event::{Event, EventArena, EventHandler, EventId, EventKind, EventParams};
pub use registry::{collect_triggers, AbilityRegistry, TriggerChoice};
