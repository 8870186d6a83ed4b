//! Persistent and lasting effects.
//!
//! A persistent effect continuously applies modifiers to the cards it
//! targets while its source is in the right location and its condition
//! holds. The [`EffectEngine`] keeps, for every effect, the set of cards it
//! currently affects and the values it applied; recalculation diffs that
//! set against the desired one and applies or unapplies modifiers for the
//! difference.
//!
//! Lasting effects ("until the end of the phase") are the same record with
//! a non-persistent [`Duration`]. They stay active wherever their source
//! goes and are removed when their duration expires.
//!
//! ## Recalculation
//!
//! [`EffectEngine::recalculate`] takes the engine out of the match while it
//! runs so effect conditions can read the match freely. It repeats until no
//! target set changes, so effects depending on other effects (strength
//! thresholds) settle in one call.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::cards::{
    AbilityRestriction, ActionKind, BlankKind, Card, CardType, Faction, Keyword, PrintedKeyword,
    ResolutionStage,
};
use crate::core::{DefinitionError, EntityId};
use crate::game::Game;
use crate::triggers::{Event, EventKind, EventParams, EventPredicate};
use crate::zones::{EffectLocation, Location};

use super::action::{ActionContext, GameAction};

const MAX_PASSES: usize = 8;

/// Effect identifier, unique within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u32);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

pub type CardMatch = Rc<dyn Fn(&Game, &Card) -> bool>;
pub type EffectCondition = Rc<dyn Fn(&Game) -> bool>;
pub type DynamicValue = Rc<dyn Fn(&Game, EntityId) -> i32>;

/// Whose cards a matching effect may target, relative to the source's
/// controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetController {
    #[default]
    Current,
    Opponent,
    Any,
}

/// Which cards an effect applies to.
#[derive(Clone)]
pub enum EffectTarget {
    /// The source card itself.
    SourceCard,
    /// The card the source is attached to.
    Parent,
    /// Face-up cards in play matching a predicate.
    Matching(CardMatch),
    /// Active plots.
    ActivePlot,
    /// A fixed set of cards, while they remain in play.
    Cards(Vec<EntityId>),
}

impl fmt::Debug for EffectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceCard => f.write_str("SourceCard"),
            Self::Parent => f.write_str("Parent"),
            Self::Matching(_) => f.write_str("Matching"),
            Self::ActivePlot => f.write_str("ActivePlot"),
            Self::Cards(cards) => f.debug_tuple("Cards").field(cards).finish(),
        }
    }
}

/// One change an effect makes to a card.
#[derive(Clone)]
pub enum Modifier {
    AddTrait(String),
    AddKeyword(Keyword),
    AddPrintedKeyword(PrintedKeyword),
    AddFaction(Faction),
    Blank,
    BlankExcludingTraits,
    LoseAspect(String),
    ModifyStrength(i32),
    /// Strength bonus recomputed on every recalculation.
    DynamicStrength(DynamicValue),
    /// Give control of the target to the source's controller.
    TakeControl,
    /// Block kneeling, optionally only at one resolution stage.
    CannotBeKneeled(Option<ResolutionStage>),
    /// Change the gold value of a plot.
    ModifyGold(i32),
    ModifyKeywordTriggerAmount(Keyword, i32),
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddTrait(name) => f.debug_tuple("AddTrait").field(name).finish(),
            Self::AddKeyword(keyword) => f.debug_tuple("AddKeyword").field(keyword).finish(),
            Self::AddPrintedKeyword(printed) => f.debug_tuple("AddPrintedKeyword").field(printed).finish(),
            Self::AddFaction(faction) => f.debug_tuple("AddFaction").field(faction).finish(),
            Self::Blank => f.write_str("Blank"),
            Self::BlankExcludingTraits => f.write_str("BlankExcludingTraits"),
            Self::LoseAspect(aspect) => f.debug_tuple("LoseAspect").field(aspect).finish(),
            Self::ModifyStrength(amount) => f.debug_tuple("ModifyStrength").field(amount).finish(),
            Self::DynamicStrength(_) => f.write_str("DynamicStrength"),
            Self::TakeControl => f.write_str("TakeControl"),
            Self::CannotBeKneeled(stage) => f.debug_tuple("CannotBeKneeled").field(stage).finish(),
            Self::ModifyGold(amount) => f.debug_tuple("ModifyGold").field(amount).finish(),
            Self::ModifyKeywordTriggerAmount(keyword, amount) => f
                .debug_tuple("ModifyKeywordTriggerAmount")
                .field(keyword)
                .field(amount)
                .finish(),
        }
    }
}

impl Modifier {
    /// Value the modifier would apply to `target` now.
    fn value(&self, game: &Game, target: EntityId) -> i32 {
        match self {
            Self::DynamicStrength(value) => value(game, target),
            Self::ModifyStrength(amount) | Self::ModifyGold(amount) => *amount,
            Self::ModifyKeywordTriggerAmount(_, amount) => *amount,
            _ => 0,
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::DynamicStrength(_))
    }

    fn restriction(source: EntityId, stage: Option<ResolutionStage>) -> AbilityRestriction {
        let restriction = AbilityRestriction::new(source, ActionKind::Kneel);
        match stage {
            Some(stage) => restriction.during(stage),
            None => restriction,
        }
    }

    fn apply(&self, game: &mut Game, source: EntityId, target: EntityId, value: i32) {
        let source_controller = game.card(source).map(Card::controller);
        let Some(card) = game.card_mut(target) else {
            return;
        };
        let toggled = match self {
            Self::AddTrait(name) => {
                card.add_trait(name.clone());
                None
            }
            Self::AddKeyword(keyword) => {
                card.add_keyword(*keyword);
                None
            }
            Self::AddPrintedKeyword(printed) => {
                card.add_printed_keyword(*printed);
                None
            }
            Self::AddFaction(faction) => {
                card.add_faction(*faction);
                None
            }
            Self::Blank => card.set_blank(BlankKind::Full).then_some(true),
            Self::BlankExcludingTraits => card.set_blank(BlankKind::ExcludingTraits).then_some(true),
            Self::LoseAspect(aspect) => {
                card.lose_aspect(aspect.clone());
                None
            }
            Self::ModifyStrength(_) | Self::DynamicStrength(_) => {
                card.modify_strength(value);
                None
            }
            Self::TakeControl => {
                if let Some(controller) = source_controller {
                    card.take_control(controller, Some(source));
                }
                None
            }
            Self::CannotBeKneeled(stage) => {
                card.add_restriction(Self::restriction(source, *stage));
                None
            }
            Self::ModifyGold(_) => {
                card.modify_gold_income(value);
                None
            }
            Self::ModifyKeywordTriggerAmount(keyword, _) => {
                card.modify_keyword_trigger_amount(*keyword, value);
                None
            }
        };
        if let Some(is_blank) = toggled {
            raise_blank_toggled(game, target, is_blank);
        }
    }

    fn unapply(&self, game: &mut Game, source: EntityId, target: EntityId, value: i32) {
        let Some(card) = game.card_mut(target) else {
            return;
        };
        let toggled = match self {
            Self::AddTrait(name) => {
                card.remove_trait(name);
                None
            }
            Self::AddKeyword(keyword) => {
                card.remove_keyword(*keyword);
                None
            }
            Self::AddPrintedKeyword(printed) => {
                card.remove_printed_keyword(*printed);
                None
            }
            Self::AddFaction(faction) => {
                card.remove_faction(*faction);
                None
            }
            Self::Blank => card.clear_blank(BlankKind::Full).then_some(false),
            Self::BlankExcludingTraits => card.clear_blank(BlankKind::ExcludingTraits).then_some(false),
            Self::LoseAspect(aspect) => {
                card.restore_aspect(aspect);
                None
            }
            Self::ModifyStrength(_) | Self::DynamicStrength(_) => {
                card.modify_strength(-value);
                None
            }
            Self::TakeControl => {
                card.revert_control(source);
                None
            }
            Self::CannotBeKneeled(stage) => {
                card.remove_restriction(&Self::restriction(source, *stage));
                None
            }
            Self::ModifyGold(_) => {
                card.modify_gold_income(-value);
                None
            }
            Self::ModifyKeywordTriggerAmount(keyword, _) => {
                card.modify_keyword_trigger_amount(*keyword, -value);
                None
            }
        };
        if let Some(is_blank) = toggled {
            raise_blank_toggled(game, target, is_blank);
        }
    }
}

fn raise_blank_toggled(game: &mut Game, card: EntityId, is_blank: bool) {
    let mut params = EventParams::new().card(card);
    params.is_blank = is_blank;
    game.raise_event(EventKind::CardBlankToggled, params);
}

/// How long an effect lasts.
#[derive(Clone)]
pub enum Duration {
    /// While the source is active.
    Persistent,
    UntilEndOfPhase,
    UntilEndOfRound,
    /// Until an event of `kind` passing `condition` resolves.
    UntilEvent {
        kind: EventKind,
        condition: Option<EventPredicate>,
    },
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent => f.write_str("Persistent"),
            Self::UntilEndOfPhase => f.write_str("UntilEndOfPhase"),
            Self::UntilEndOfRound => f.write_str("UntilEndOfRound"),
            Self::UntilEvent { kind, .. } => f.debug_struct("UntilEvent").field("kind", kind).finish(),
        }
    }
}

impl Duration {
    fn is_lasting(&self) -> bool {
        !matches!(self, Self::Persistent)
    }
}

/// Definition of a persistent or lasting effect.
#[derive(Clone)]
pub struct EffectSpec {
    /// Required source location. `None` uses the default for the source's
    /// card type.
    pub location: Option<EffectLocation>,
    pub condition: Option<EffectCondition>,
    pub target: EffectTarget,
    pub target_controller: TargetController,
    pub modifiers: Vec<Modifier>,
    pub duration: Duration,
}

impl fmt::Debug for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectSpec")
            .field("location", &self.location)
            .field("target", &self.target)
            .field("target_controller", &self.target_controller)
            .field("modifiers", &self.modifiers)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl EffectSpec {
    fn new(target: EffectTarget, modifier: Modifier) -> Self {
        Self {
            location: None,
            condition: None,
            target,
            target_controller: TargetController::Current,
            modifiers: vec![modifier],
            duration: Duration::Persistent,
        }
    }

    /// Apply to the source card.
    pub fn on_self(modifier: Modifier) -> Self {
        Self::new(EffectTarget::SourceCard, modifier)
    }

    /// Apply to the card the source is attached to.
    pub fn on_parent(modifier: Modifier) -> Self {
        Self::new(EffectTarget::Parent, modifier)
    }

    /// Apply to face-up cards in play matching `predicate`.
    pub fn matching(predicate: impl Fn(&Game, &Card) -> bool + 'static, modifier: Modifier) -> Self {
        Self::new(EffectTarget::Matching(Rc::new(predicate)), modifier)
    }

    /// Apply to active plots.
    pub fn on_active_plot(modifier: Modifier) -> Self {
        Self::new(EffectTarget::ActivePlot, modifier)
    }

    /// Apply to specific cards.
    pub fn on_cards(cards: Vec<EntityId>, modifier: Modifier) -> Self {
        Self::new(EffectTarget::Cards(cards), modifier)
    }

    /// Add another modifier (builder pattern).
    #[must_use]
    pub fn and(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Fn(&Game) -> bool + 'static) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    #[must_use]
    pub fn target_controller(mut self, controller: TargetController) -> Self {
        self.target_controller = controller;
        self
    }

    /// Keep the effect active wherever the source is (builder pattern).
    #[must_use]
    pub fn anywhere(mut self) -> Self {
        self.location = Some(EffectLocation::Any);
        self
    }

    /// Bind the effect to a source location.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnsupportedEffectLocation`] for locations
    /// an effect can never be active in.
    pub fn at_location(mut self, location: Location) -> Result<Self, DefinitionError> {
        let checked = EffectLocation::checked(location)
            .ok_or(DefinitionError::UnsupportedEffectLocation(location))?;
        self.location = Some(checked);
        Ok(self)
    }

    /// Make this a lasting effect (builder pattern).
    #[must_use]
    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Fill in the default source location for `card_type`.
    pub(crate) fn resolve_location(&mut self, card_type: CardType) {
        if self.location.is_some() {
            return;
        }
        let location = if self.duration.is_lasting() {
            EffectLocation::Any
        } else {
            match card_type {
                CardType::Agenda => EffectLocation::In(Location::Agenda),
                CardType::Plot => EffectLocation::In(Location::ActivePlot),
                CardType::Title => EffectLocation::In(Location::Title),
                _ => EffectLocation::In(Location::PlayArea),
            }
        };
        self.location = Some(location);
    }
}

/// When a delayed effect fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedTiming {
    EndOfPhase,
    EndOfRound,
}

/// A game action to resolve at the end of the phase or round.
#[derive(Clone, Debug)]
pub struct DelayedEffect {
    pub timing: DelayedTiming,
    pub context: ActionContext,
    pub action: GameAction,
}

/// Which persistent effects setup has switched on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    Inactive,
    /// Effects that work in any location (printed keywords, agendas).
    AnyLocation,
    All,
}

#[derive(Clone, Debug)]
struct ActiveEffect {
    id: EffectId,
    source: EntityId,
    spec: EffectSpec,
    /// Current targets with the value applied per modifier.
    targets: BTreeMap<EntityId, Vec<i32>>,
}

/// Holds every effect of a match and keeps their targets up to date.
#[derive(Clone, Debug, Default)]
pub struct EffectEngine {
    effects: Vec<ActiveEffect>,
    delayed: Vec<DelayedEffect>,
    activation: Activation,
    next_id: u32,
}

impl EffectEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect of `source`. It applies on the next recalculation.
    pub fn add(&mut self, source: EntityId, spec: EffectSpec) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects.push(ActiveEffect {
            id,
            source,
            spec,
            targets: BTreeMap::new(),
        });
        id
    }

    pub fn add_delayed(&mut self, effect: DelayedEffect) {
        self.delayed.push(effect);
    }

    /// Remove and return the delayed effects firing at `timing`.
    pub fn take_delayed(&mut self, timing: DelayedTiming) -> Vec<DelayedEffect> {
        let (fire, keep) = std::mem::take(&mut self.delayed)
            .into_iter()
            .partition(|effect| effect.timing == timing);
        self.delayed = keep;
        fire
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn activate(&mut self, activation: Activation) {
        self.activation = activation;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Cards an effect currently applies to.
    #[must_use]
    pub fn targets_of(&self, id: EffectId) -> Vec<EntityId> {
        self.effects
            .iter()
            .find(|effect| effect.id == id)
            .map(|effect| effect.targets.keys().copied().collect())
            .unwrap_or_default()
    }

    fn is_switched_on(&self, effect: &ActiveEffect) -> bool {
        if effect.spec.duration.is_lasting() {
            return true;
        }
        match self.activation {
            Activation::Inactive => false,
            Activation::AnyLocation => effect.spec.location == Some(EffectLocation::Any),
            Activation::All => true,
        }
    }

    fn desired_targets(&self, game: &Game, effect: &ActiveEffect) -> Vec<EntityId> {
        if !self.is_switched_on(effect) {
            return Vec::new();
        }
        let Some(source) = game.card(effect.source) else {
            return Vec::new();
        };
        let location = effect.spec.location.unwrap_or(EffectLocation::In(Location::PlayArea));
        let lasting = effect.spec.duration.is_lasting();

        if !lasting {
            if !location.is_active_in(source.location) {
                return Vec::new();
            }
            if location != EffectLocation::Any && (source.facedown || source.is_any_blank()) {
                return Vec::new();
            }
            if location == EffectLocation::Any && source.is_full_blank() {
                return Vec::new();
            }
        }
        if let Some(condition) = &effect.spec.condition {
            if !condition(game) {
                return Vec::new();
            }
        }

        let controller = source.controller();
        let controller_matches = |card: &Card| match effect.spec.target_controller {
            TargetController::Current => card.controller() == controller,
            TargetController::Opponent => card.controller() != controller,
            TargetController::Any => true,
        };

        let mut targets: Vec<EntityId> = match &effect.spec.target {
            EffectTarget::SourceCard => vec![source.id],
            EffectTarget::Parent => source.parent.into_iter().collect(),
            EffectTarget::Matching(predicate) => game
                .cards()
                .filter(|card| card.location == Location::PlayArea && !card.facedown)
                .filter(|card| controller_matches(card))
                .filter(|card| predicate(game, card))
                .map(|card| card.id)
                .collect(),
            EffectTarget::ActivePlot => game
                .cards()
                .filter(|card| card.location == Location::ActivePlot)
                .filter(|card| controller_matches(card))
                .map(|card| card.id)
                .collect(),
            EffectTarget::Cards(cards) => cards
                .iter()
                .copied()
                .filter(|&id| game.card(id).is_some_and(|card| card.location.handles_events()))
                .collect(),
        };
        targets.sort();
        targets
    }

    /// Bring every effect's targets up to date.
    pub fn recalculate(game: &mut Game) {
        let mut engine = std::mem::take(game.effects_mut());

        for _ in 0..MAX_PASSES {
            let mut changed = false;
            for index in 0..engine.effects.len() {
                let desired = engine.desired_targets(game, &engine.effects[index]);
                changed |= update_targets(game, &mut engine.effects[index], &desired);
            }
            if !changed {
                break;
            }
        }

        let added = std::mem::replace(game.effects_mut(), engine);
        game.effects_mut().absorb(added);
    }

    fn absorb(&mut self, other: EffectEngine) {
        for effect in other.effects {
            self.add(effect.source, effect.spec);
        }
        self.delayed.extend(other.delayed);
    }

    /// Remove lasting effects whose duration matches, unapplying them.
    pub fn expire(game: &mut Game, expired: impl Fn(&Game, &Duration) -> bool) {
        let mut engine = std::mem::take(game.effects_mut());

        let (gone, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut engine.effects)
            .into_iter()
            .partition(|effect| expired(game, &effect.spec.duration));
        engine.effects = keep;

        for mut effect in gone {
            debug!(effect = %effect.id, source = %effect.source, "effect expired");
            update_targets(game, &mut effect, &[]);
        }

        let added = std::mem::replace(game.effects_mut(), engine);
        game.effects_mut().absorb(added);
    }

    /// Expire effects lasting until `event` resolves.
    pub fn expire_for_event(game: &mut Game, event: &Event) {
        let kind = event.kind;
        let event = event.clone();
        Self::expire(game, move |game, duration| match duration {
            Duration::UntilEvent {
                kind: until,
                condition,
            } => *until == kind && condition.as_ref().is_none_or(|condition| condition(game, &event)),
            _ => false,
        });
    }
}

fn update_targets(game: &mut Game, effect: &mut ActiveEffect, desired: &[EntityId]) -> bool {
    let mut changed = false;
    let source = effect.source;

    let removed: Vec<EntityId> = effect
        .targets
        .keys()
        .copied()
        .filter(|target| !desired.contains(target))
        .collect();
    for target in removed {
        if let Some(values) = effect.targets.remove(&target) {
            for (modifier, value) in effect.spec.modifiers.iter().zip(values) {
                modifier.unapply(game, source, target, value);
            }
            changed = true;
        }
    }

    for &target in desired {
        match effect.targets.get(&target).cloned() {
            None => {
                let values: Vec<i32> = effect
                    .spec
                    .modifiers
                    .iter()
                    .map(|modifier| modifier.value(game, target))
                    .collect();
                for (modifier, &value) in effect.spec.modifiers.iter().zip(&values) {
                    modifier.apply(game, source, target, value);
                }
                effect.targets.insert(target, values);
                changed = true;
            }
            Some(mut values) => {
                for (index, modifier) in effect.spec.modifiers.iter().enumerate() {
                    if !modifier.is_dynamic() {
                        continue;
                    }
                    let value = modifier.value(game, target);
                    if value != values[index] {
                        modifier.unapply(game, source, target, values[index]);
                        modifier.apply(game, source, target, value);
                        values[index] = value;
                        changed = true;
                    }
                }
                effect.targets.insert(target, values);
            }
        }
    }

    changed
}
