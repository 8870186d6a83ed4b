//! Ability triggers.
//!
//! Every card ability is one [`AbilityTrigger`] record. The
//! [`TimingClass`] tag says when it resolves relative to the event
//! timeline; everything else (costs, limit, target, handler) is data.
//!
//! | Timing            | Resolves                         | Optional |
//! |-------------------|----------------------------------|----------|
//! | `Action`          | on player request in a window    | yes      |
//! | `PlayAction`      | on player request, from hand     | yes      |
//! | `ForcedInterrupt` | before the event, automatically  | no       |
//! | `Interrupt`       | before the event                 | yes      |
//! | `ForcedReaction`  | after the event, automatically   | no       |
//! | `Reaction`        | after the event                  | yes      |
//! | `PersistentEffect`| continuously while active        | no       |

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, ResolutionStage};
use crate::core::{EntityId, PhaseKind, PlayerId};
use crate::effects::{ActionContext, Cost, CardSelector, EffectSpec};
use crate::game::Game;
use crate::zones::Location;

use super::condition::WhenCondition;
use super::event::{EventId, EventKind};

/// Registered ability identifier, unique within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// When an ability resolves relative to the event timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimingClass {
    Action,
    Reaction,
    Interrupt,
    ForcedReaction,
    ForcedInterrupt,
    PersistentEffect,
    PlayAction,
}

impl TimingClass {
    /// Resolves without the player opting in.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::ForcedReaction | Self::ForcedInterrupt)
    }

    /// Listens for events.
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        matches!(
            self,
            Self::Reaction | Self::Interrupt | Self::ForcedReaction | Self::ForcedInterrupt
        )
    }

    /// Resolves before the event's default effect.
    #[must_use]
    pub const fn is_interrupt(self) -> bool {
        matches!(self, Self::Interrupt | Self::ForcedInterrupt)
    }

    /// Started by a player from a menu or click.
    #[must_use]
    pub const fn is_player_initiated(self) -> bool {
        matches!(self, Self::Action | Self::PlayAction)
    }
}

/// Which optional parts an ability has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub has_cost: bool,
    pub has_limit: bool,
    pub has_target: bool,
}

/// Period after which an ability's use count resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPeriod {
    Phase,
    Round,
    Game,
}

/// Usage cap on an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLimit {
    pub max: u32,
    pub period: LimitPeriod,
}

impl AbilityLimit {
    #[must_use]
    pub const fn per_phase(max: u32) -> Self {
        Self {
            max,
            period: LimitPeriod::Phase,
        }
    }

    #[must_use]
    pub const fn per_round(max: u32) -> Self {
        Self {
            max,
            period: LimitPeriod::Round,
        }
    }

    #[must_use]
    pub const fn per_game(max: u32) -> Self {
        Self {
            max,
            period: LimitPeriod::Game,
        }
    }
}

/// State of one ability resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityContext {
    pub ability: AbilityId,
    pub source: EntityId,
    pub player: PlayerId,

    /// Events that triggered the ability (one, or an aggregate group).
    pub events: Vec<EventId>,

    /// Chosen targets.
    pub targets: Vec<EntityId>,

    /// Cards used to pay costs.
    pub cost_cards: Vec<EntityId>,

    pub stage: ResolutionStage,
    pub cancelled: bool,
}

impl AbilityContext {
    #[must_use]
    pub fn new(ability: AbilityId, source: EntityId, player: PlayerId) -> Self {
        Self {
            ability,
            source,
            player,
            events: Vec::new(),
            targets: Vec::new(),
            cost_cards: Vec::new(),
            stage: ResolutionStage::Effect,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Vec<EventId>) -> Self {
        self.events = events;
        self
    }

    /// First triggering event.
    #[must_use]
    pub fn event(&self) -> Option<EventId> {
        self.events.first().copied()
    }

    /// First chosen target.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.targets.first().copied()
    }

    /// Context for game actions taken by this ability at its current stage.
    #[must_use]
    pub fn action_context(&self) -> ActionContext {
        ActionContext::new(self.player)
            .with_source(self.source)
            .at_stage(self.stage)
    }
}

pub type AbilityHandler = Rc<dyn Fn(&mut Game, &AbilityContext)>;
pub type AbilityCondition = Rc<dyn Fn(&Game, &AbilityContext) -> bool>;

/// One card ability.
#[derive(Clone)]
pub struct AbilityTrigger {
    pub source: EntityId,
    pub title: String,
    pub timing: TimingClass,

    /// Event kinds listened for, each with its condition.
    pub when: Vec<(EventKind, WhenCondition)>,

    /// Locations the source must be in for the ability to be live.
    /// Empty means the default for the source's card type.
    pub locations: Vec<Location>,

    /// Only usable during this phase.
    pub phase: Option<PhaseKind>,

    pub condition: Option<AbilityCondition>,
    pub costs: Vec<Cost>,
    pub limit: Option<AbilityLimit>,
    pub target: Option<CardSelector>,

    /// Chat message on resolution. `{player}`, `{source}` and `{target}`
    /// are substituted.
    pub message: Option<String>,

    pub handler: Option<AbilityHandler>,

    /// Effect definition for `PersistentEffect` abilities.
    pub effect: Option<EffectSpec>,
}

impl fmt::Debug for AbilityTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityTrigger")
            .field("source", &self.source)
            .field("title", &self.title)
            .field("timing", &self.timing)
            .field("when", &self.when)
            .field("locations", &self.locations)
            .field("phase", &self.phase)
            .field("costs", &self.costs)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl AbilityTrigger {
    fn new(source: EntityId, timing: TimingClass, title: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            timing,
            when: Vec::new(),
            locations: Vec::new(),
            phase: None,
            condition: None,
            costs: Vec::new(),
            limit: None,
            target: None,
            message: None,
            handler: None,
            effect: None,
        }
    }

    /// `Action:` ability with a menu title.
    pub fn action(source: EntityId, title: impl Into<String>) -> Self {
        Self::new(source, TimingClass::Action, title)
    }

    /// Action printed on an event card, played from hand.
    pub fn play_action(source: EntityId, title: impl Into<String>) -> Self {
        Self::new(source, TimingClass::PlayAction, title)
    }

    pub fn reaction(source: EntityId) -> Self {
        Self::new(source, TimingClass::Reaction, "")
    }

    pub fn interrupt(source: EntityId) -> Self {
        Self::new(source, TimingClass::Interrupt, "")
    }

    pub fn forced_reaction(source: EntityId) -> Self {
        Self::new(source, TimingClass::ForcedReaction, "")
    }

    pub fn forced_interrupt(source: EntityId) -> Self {
        Self::new(source, TimingClass::ForcedInterrupt, "")
    }

    /// Persistent effect ability.
    pub fn persistent(source: EntityId, effect: EffectSpec) -> Self {
        let mut trigger = Self::new(source, TimingClass::PersistentEffect, "");
        trigger.effect = Some(effect);
        trigger
    }

    /// Listen for an event kind (builder pattern).
    #[must_use]
    pub fn when(mut self, kind: EventKind, condition: WhenCondition) -> Self {
        self.when.push((kind, condition));
        self
    }

    /// Override the listening locations (builder pattern).
    #[must_use]
    pub fn in_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations = locations.into_iter().collect();
        self
    }

    #[must_use]
    pub fn during_phase(mut self, phase: PhaseKind) -> Self {
        self.phase = Some(phase);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Fn(&Game, &AbilityContext) -> bool + 'static) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.costs.push(cost);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: AbilityLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: CardSelector) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: impl Fn(&mut Game, &AbilityContext) + 'static) -> Self {
        self.handler = Some(Rc::new(handler));
        self
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            has_cost: !self.costs.is_empty(),
            has_limit: self.limit.is_some(),
            has_target: self.target.is_some(),
        }
    }

    /// Fill in default listening locations for a source of `card_type`.
    pub(crate) fn resolve_locations(&mut self, card_type: CardType) {
        if !self.locations.is_empty() {
            return;
        }
        self.locations = match (self.timing, card_type) {
            (TimingClass::PlayAction, _) => vec![Location::Hand, Location::Shadows],
            (_, CardType::Agenda) => vec![Location::Agenda],
            (_, CardType::Plot) => vec![Location::ActivePlot],
            (_, CardType::Title) => vec![Location::Title],
            (_, CardType::Faction) => vec![Location::Faction],
            _ => vec![Location::PlayArea],
        };
    }

    /// Whether the ability is live while its source is at `location`.
    #[must_use]
    pub fn is_event_listening_location(&self, location: Location) -> bool {
        self.locations.contains(&location)
    }

    /// Whether the ability may currently start for `context`: the phase
    /// matches, the condition holds, costs can be paid and enough targets
    /// exist. Limits are checked by the registry.
    #[must_use]
    pub fn meets_requirements(&self, game: &Game, context: &AbilityContext) -> bool {
        if self.phase.is_some_and(|phase| game.current_phase() != phase) {
            return false;
        }
        if let Some(condition) = &self.condition {
            if !condition(game, context) {
                return false;
            }
        }
        if !self.costs.iter().all(|cost| cost.can_pay(game, context)) {
            return false;
        }
        self.target
            .as_ref()
            .is_none_or(|selector| selector.has_enough_targets(game, &context.action_context()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let ability = AbilityTrigger::action(EntityId(1), "Stand location")
            .with_limit(AbilityLimit::per_round(1))
            .with_cost(Cost::KneelSelf);
        assert_eq!(
            ability.capabilities(),
            Capabilities {
                has_cost: true,
                has_limit: true,
                has_target: false
            }
        );
    }

    #[test]
    fn test_default_locations() {
        let mut reaction = AbilityTrigger::reaction(EntityId(1));
        reaction.resolve_locations(CardType::Plot);
        assert_eq!(reaction.locations, vec![Location::ActivePlot]);

        let mut play = AbilityTrigger::play_action(EntityId(2), "Play");
        play.resolve_locations(CardType::Event);
        assert!(play.is_event_listening_location(Location::Hand));
        assert!(!play.is_event_listening_location(Location::PlayArea));

        let mut custom = AbilityTrigger::reaction(EntityId(3)).in_locations([Location::DeadPile]);
        custom.resolve_locations(CardType::Character);
        assert_eq!(custom.locations, vec![Location::DeadPile]);
    }

    #[test]
    fn test_timing_flags() {
        assert!(TimingClass::ForcedInterrupt.is_forced());
        assert!(TimingClass::ForcedInterrupt.is_interrupt());
        assert!(!TimingClass::Reaction.is_interrupt());
        assert!(TimingClass::PlayAction.is_player_initiated());
        assert!(!TimingClass::PersistentEffect.is_triggered());
    }
}
