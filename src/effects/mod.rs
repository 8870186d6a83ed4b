//! Game actions, costs, selectors and persistent effects.
//!
//! - [`GameAction`]: Parameterised state changes, resolved through events
//! - [`Cost`]: What an ability requires before it resolves
//! - [`CardSelector`]: Which cards an ability or prompt may pick
//! - [`EffectEngine`]: Persistent and lasting effects kept in sync with
//!   the match
//!
//! Actions never mutate the match directly. `create_event` builds an event
//! whose handler performs the change, and the event window decides whether
//! that handler runs.

mod action;
mod costs;
mod persistent;
mod targeting;

pub use action::{ActionContext, ActionHandler, GameAction};
pub(crate) use action::{leave_play_event, place_card_event};
pub use costs::Cost;
pub use persistent::{
    Activation, CardMatch, DelayedEffect, DelayedTiming, Duration, DynamicValue, EffectCondition,
    EffectEngine, EffectId, EffectSpec, EffectTarget, Modifier, TargetController,
};
pub use targeting::{CardCondition, CardSelector, SelectorMode};
