//! Ability registry.
//!
//! The registry stores every triggered and player-initiated ability of a
//! match and indexes the live ones by event kind, so an event window only
//! looks at abilities that can respond to it. Abilities become live and go
//! quiet as their source card moves in and out of their listening
//! locations.
//!
//! Persistent effects are not stored here; they belong to the
//! [`EffectEngine`](crate::effects::EffectEngine).

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::core::{EntityId, PlayerId};
use crate::game::Game;
use crate::zones::Location;

use super::ability::{AbilityContext, AbilityId, AbilityTrigger, LimitPeriod, TimingClass};
use super::event::{Event, EventId, EventKind};

/// An ability ready to be offered or resolved in a window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerChoice {
    pub ability: AbilityId,
    pub player: PlayerId,
    pub events: Vec<EventId>,
}

/// Storage and lookup for abilities.
#[derive(Clone, Debug, Default)]
pub struct AbilityRegistry {
    abilities: FxHashMap<AbilityId, AbilityTrigger>,

    /// Abilities per source card, in registration order.
    by_source: FxHashMap<EntityId, Vec<AbilityId>>,

    /// Live triggered abilities per event kind, in registration order.
    by_event: FxHashMap<EventKind, Vec<AbilityId>>,

    listening: FxHashSet<AbilityId>,
    uses: FxHashMap<AbilityId, u32>,
    next_id: u32,
}

impl AbilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an ability. It starts quiet; see [`Self::update_for_location`].
    pub fn register(&mut self, ability: AbilityTrigger) -> AbilityId {
        let id = AbilityId(self.next_id);
        self.next_id += 1;
        self.by_source.entry(ability.source).or_default().push(id);
        self.abilities.insert(id, ability);
        id
    }

    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&AbilityTrigger> {
        self.abilities.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// All abilities of a card, in registration order.
    #[must_use]
    pub fn abilities_of(&self, source: EntityId) -> &[AbilityId] {
        self.by_source.get(&source).map_or(&[], Vec::as_slice)
    }

    /// Player-initiated abilities of a card, in printed order.
    #[must_use]
    pub fn actions_of(&self, source: EntityId) -> Vec<AbilityId> {
        self.abilities_of(source)
            .iter()
            .copied()
            .filter(|id| {
                self.abilities
                    .get(id)
                    .is_some_and(|ability| ability.timing.is_player_initiated())
            })
            .collect()
    }

    #[must_use]
    pub fn is_listening(&self, id: AbilityId) -> bool {
        self.listening.contains(&id)
    }

    fn set_listening(&mut self, id: AbilityId, listening: bool) {
        let Some(ability) = self.abilities.get(&id) else {
            return;
        };

        if listening {
            if !self.listening.insert(id) {
                return;
            }
            for (kind, _) in &ability.when {
                let ids = self.by_event.entry(*kind).or_default();
                let position = ids.partition_point(|&other| other < id);
                ids.insert(position, id);
            }
        } else {
            if !self.listening.remove(&id) {
                return;
            }
            for (kind, _) in &ability.when {
                if let Some(ids) = self.by_event.get_mut(kind) {
                    ids.retain(|&other| other != id);
                }
            }
        }
    }

    /// Toggle each ability of `source` for a move from `from` to `to`.
    ///
    /// Returns the abilities that stopped listening.
    pub fn update_for_location(
        &mut self,
        source: EntityId,
        from: Option<Location>,
        to: Location,
    ) -> Vec<AbilityId> {
        let ids = self.abilities_of(source).to_vec();
        let mut stopped = Vec::new();

        for id in ids {
            let Some(ability) = self.abilities.get(&id) else {
                continue;
            };
            let was = from.is_some_and(|location| ability.is_event_listening_location(location));
            let now = ability.is_event_listening_location(to);

            if now && !was {
                self.set_listening(id, true);
            } else if was && !now {
                self.set_listening(id, false);
                stopped.push(id);
            }
        }

        if !stopped.is_empty() {
            debug!(card = %source, count = stopped.len(), "abilities stopped listening");
        }
        stopped
    }

    /// Live abilities of `timing` listening for `kind`.
    #[must_use]
    pub fn listeners(&self, kind: EventKind, timing: TimingClass) -> Vec<AbilityId> {
        self.by_event
            .get(&kind)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| self.abilities.get(id).is_some_and(|a| a.timing == timing))
                    .collect()
            })
            .unwrap_or_default()
    }

    // === Limits ===

    #[must_use]
    pub fn uses(&self, id: AbilityId) -> u32 {
        self.uses.get(&id).copied().unwrap_or(0)
    }

    /// Whether the ability has used up its limit.
    #[must_use]
    pub fn limit_reached(&self, id: AbilityId) -> bool {
        self.abilities
            .get(&id)
            .and_then(|ability| ability.limit)
            .is_some_and(|limit| self.uses(id) >= limit.max)
    }

    /// Count one use of a limited ability.
    pub fn increment_use(&mut self, id: AbilityId) {
        let limited = self
            .abilities
            .get(&id)
            .is_some_and(|ability| ability.limit.is_some());
        if limited {
            *self.uses.entry(id).or_insert(0) += 1;
        }
    }

    /// Reset use counts of abilities limited per `period`.
    pub fn reset_limits(&mut self, period: LimitPeriod) {
        let abilities = &self.abilities;
        self.uses.retain(|id, _| {
            abilities
                .get(id)
                .and_then(|ability| ability.limit)
                .is_none_or(|limit| limit.period != period)
        });
    }
}

/// Collect the abilities of one timing class triggered by a window.
///
/// Candidates are the window's events. Interrupts only see uncancelled,
/// unresolved events; reactions only see uncancelled, resolved ones.
/// Choices are ordered by player priority, then registration order.
#[must_use]
pub fn collect_triggers(game: &Game, timing: TimingClass, events: &[EventId]) -> Vec<TriggerChoice> {
    let candidates: Vec<&Event> = events
        .iter()
        .filter_map(|&id| game.events().get(id))
        .filter(|event| !event.is_cancelled())
        .filter(|event| {
            if timing.is_interrupt() {
                !event.is_resolved()
            } else {
                event.is_resolved()
            }
        })
        .collect();

    let mut kinds: Vec<EventKind> = candidates.iter().map(|event| event.kind).collect();
    kinds.sort();
    kinds.dedup();

    let registry = game.abilities();
    let mut ids: Vec<AbilityId> = kinds
        .iter()
        .flat_map(|&kind| registry.listeners(kind, timing))
        .collect();
    ids.sort();
    ids.dedup();

    let mut choices = Vec::new();
    for id in ids {
        let Some(ability) = registry.get(id) else {
            continue;
        };
        let Some(card) = game.card(ability.source) else {
            continue;
        };
        if registry.limit_reached(id) {
            continue;
        }
        let player = card.controller();

        for (kind, condition) in &ability.when {
            let matching: Vec<&Event> = candidates
                .iter()
                .copied()
                .filter(|event| event.kind == *kind)
                .collect();
            if matching.is_empty() {
                continue;
            }

            for group in condition.evaluate(game, &matching) {
                let context = AbilityContext::new(id, ability.source, player).with_events(group.clone());
                if ability.meets_requirements(game, &context) {
                    choices.push(TriggerChoice {
                        ability: id,
                        player,
                        events: group,
                    });
                }
            }
        }
    }

    let order = game.players_in_priority_order();
    choices.sort_by_key(|choice| {
        (
            order.iter().position(|&p| p == choice.player).unwrap_or(usize::MAX),
            choice.ability,
        )
    });

    debug!(?timing, count = choices.len(), "collected triggers");
    choices
}
