//! Game events.
//!
//! Events describe things that happen during a match. Game actions build
//! them, [`EventWindow`](crate::stack::EventWindow) resolves them, and
//! abilities listen for them by [`EventKind`].
//!
//! ## Storage
//!
//! Events live in an [`EventArena`] owned by the match and are referred to
//! by [`EventId`]. Handlers therefore never hold borrows of the event they
//! resolve: they receive `(&mut Game, EventId)` and look things up.
//!
//! ## Structure
//!
//! - **children**: simultaneous events raised together (one per revealed
//!   card, one per action of a `simultaneously`). Aggregate triggers group
//!   over these.
//! - **attached**: follow-up events added while the handler runs
//!   (`then_attach`). They resolve in the same window.
//! - **atomic**: members of an atomic bundle share a group. Cancelling any
//!   member cancels every member.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::{EntityId, PhaseKind, PlayerId};
use crate::game::Game;
use crate::zones::Location;

/// Index of an event in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl EventId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self.0)
    }
}

/// Every kind of event the engine raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    // === Cards ===
    CardMoved,
    CardEntersPlay,
    CardLeftPlay,
    CardPlaced,
    CardsRevealed,
    CardRevealed,
    CardRemovedFromGame,
    CardReturnedToDeck,
    CardAddedToHand,
    CardKneeled,
    CardStood,
    CardPowerGained,
    CardPowerDiscarded,
    CardBlankToggled,
    CardsDrawn,

    // === Players ===
    GoldGained,
    GoldReturned,
    PlotRevealed,

    // === Flow ===
    SetupFinished,
    PhaseStarted,
    PhaseEnded,
    RoundEnded,

    // === Composition ===
    /// Parent of a `simultaneously` bundle.
    Simultaneous,
    /// Parent of an atomic bundle.
    Atomic,
    /// Event of a bare handler action (`whileRevealed`, card scripts).
    Generic,
}

impl EventKind {
    /// Name used in logs and messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CardMoved => "onCardMoved",
            Self::CardEntersPlay => "onCardEntersPlay",
            Self::CardLeftPlay => "onCardLeftPlay",
            Self::CardPlaced => "onCardPlaced",
            Self::CardsRevealed => "onCardsRevealed",
            Self::CardRevealed => "onCardRevealed",
            Self::CardRemovedFromGame => "onCardRemovedFromGame",
            Self::CardReturnedToDeck => "onCardReturnedToDeck",
            Self::CardAddedToHand => "onCardAddedToHand",
            Self::CardKneeled => "onCardKneeled",
            Self::CardStood => "onCardStood",
            Self::CardPowerGained => "onCardPowerGained",
            Self::CardPowerDiscarded => "onCardPowerDiscarded",
            Self::CardBlankToggled => "onCardBlankToggled",
            Self::CardsDrawn => "onCardsDrawn",
            Self::GoldGained => "onGoldGained",
            Self::GoldReturned => "onGoldReturned",
            Self::PlotRevealed => "onPlotRevealed",
            Self::SetupFinished => "onSetupFinished",
            Self::PhaseStarted => "onPhaseStarted",
            Self::PhaseEnded => "onPhaseEnded",
            Self::RoundEnded => "onRoundEnded",
            Self::Simultaneous => "simultaneous",
            Self::Atomic => "atomic",
            Self::Generic => "genericHandler",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event parameters.
///
/// One flat record covers every kind; each kind fills the fields it needs.
#[derive(Clone, Debug, Default)]
pub struct EventParams {
    /// The card the event is about.
    pub card: Option<EntityId>,

    /// Cards for multi-card events (reveals).
    pub cards: Vec<EntityId>,

    pub player: Option<PlayerId>,

    /// Card whose ability caused the event.
    pub source: Option<EntityId>,

    pub amount: i32,

    pub original_location: Option<Location>,
    pub new_location: Option<Location>,
    pub parent_changed: bool,
    pub facedown_changed: bool,

    /// Whether the card may be saved from leaving play.
    pub allow_save: bool,

    /// Raised while paying a cost.
    pub is_cost: bool,

    pub is_blank: bool,

    pub phase: Option<PhaseKind>,

    /// How a card entered play ("marshal", "setup", "put").
    pub playing_type: Option<&'static str>,

    /// Card state when the event was created.
    pub snapshot: Option<Box<Card>>,
}

impl EventParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn card(mut self, card: EntityId) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn cards(mut self, cards: Vec<EntityId>) -> Self {
        self.cards = cards;
        self
    }

    #[must_use]
    pub fn player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn source(mut self, source: Option<EntityId>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn locations(mut self, original: Location, new: Location) -> Self {
        self.original_location = Some(original);
        self.new_location = Some(new);
        self
    }

    #[must_use]
    pub fn allow_save(mut self, allow_save: bool) -> Self {
        self.allow_save = allow_save;
        self
    }

    #[must_use]
    pub fn is_cost(mut self, is_cost: bool) -> Self {
        self.is_cost = is_cost;
        self
    }

    #[must_use]
    pub fn phase(mut self, phase: PhaseKind) -> Self {
        self.phase = Some(phase);
        self
    }

    #[must_use]
    pub fn playing_type(mut self, playing_type: &'static str) -> Self {
        self.playing_type = Some(playing_type);
        self
    }

    #[must_use]
    pub fn snapshot(mut self, card: &Card) -> Self {
        self.snapshot = Some(Box::new(card.create_snapshot()));
        self
    }
}

/// Default effect of an event, run by the window unless cancelled.
pub type EventHandler = Rc<dyn Fn(&mut Game, EventId)>;

/// A raised event.
#[derive(Clone)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub params: EventParams,

    pub parent: Option<EventId>,
    pub children: Vec<EventId>,
    pub attached: Vec<EventId>,

    atomic_group: Option<EventId>,
    cancelled: bool,
    resolved: bool,

    handler: Option<EventHandler>,
    post_handlers: Vec<EventHandler>,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("card", &self.params.card)
            .field("player", &self.params.player)
            .field("children", &self.children)
            .field("attached", &self.attached)
            .field("cancelled", &self.cancelled)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}

impl Event {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    #[must_use]
    pub fn atomic_group(&self) -> Option<EventId> {
        self.atomic_group
    }
}

/// Storage for every event raised in a match.
#[derive(Default)]
pub struct EventArena {
    events: FxHashMap<EventId, Event>,
    next_id: u32,
}

impl EventArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event with an optional default effect.
    pub fn create(
        &mut self,
        kind: EventKind,
        params: EventParams,
        handler: Option<EventHandler>,
    ) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.insert(
            id,
            Event {
                id,
                kind,
                params,
                parent: None,
                children: Vec::new(),
                attached: Vec::new(),
                atomic_group: None,
                cancelled: false,
                resolved: false,
                handler,
                post_handlers: Vec::new(),
            },
        );
        id
    }

    /// Create a parent event resolving `children` together.
    pub fn simultaneous(&mut self, children: Vec<EventId>) -> EventId {
        let parent = self.create(EventKind::Simultaneous, EventParams::new(), None);
        for &child in &children {
            self.add_child(parent, child);
        }
        parent
    }

    /// Create an atomic bundle of `members`.
    pub fn atomic(&mut self, members: Vec<EventId>) -> EventId {
        let parent = self.create(EventKind::Atomic, EventParams::new(), None);
        for &member in &members {
            self.add_child(parent, member);
            if let Some(event) = self.events.get_mut(&member) {
                event.atomic_group = Some(parent);
            }
        }
        if let Some(event) = self.events.get_mut(&parent) {
            event.atomic_group = Some(parent);
        }
        parent
    }

    pub fn add_child(&mut self, parent: EventId, child: EventId) {
        if let Some(event) = self.events.get_mut(&child) {
            event.parent = Some(parent);
        }
        if let Some(event) = self.events.get_mut(&parent) {
            event.children.push(child);
        }
    }

    /// Attach a follow-up event resolving after `event`'s handler.
    pub fn then_attach(&mut self, event: EventId, attached: EventId) {
        if let Some(child) = self.events.get_mut(&attached) {
            child.parent = Some(event);
        }
        if let Some(parent) = self.events.get_mut(&event) {
            parent.attached.push(attached);
        }
    }

    /// Run `handler` once the event's window has finished.
    pub fn then_execute(&mut self, event: EventId, handler: EventHandler) {
        if let Some(event) = self.events.get_mut(&event) {
            event.post_handlers.push(handler);
        }
    }

    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.get_mut(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Cancel an event.
    ///
    /// Members of an atomic bundle are cancelled as a unit. Children of a
    /// plain simultaneous parent are not affected.
    pub fn cancel(&mut self, id: EventId) {
        let group = self.events.get(&id).and_then(|event| event.atomic_group);
        match group {
            Some(root) => {
                let members = self
                    .events
                    .get(&root)
                    .map(|event| event.children.clone())
                    .unwrap_or_default();
                for member in std::iter::once(root).chain(members) {
                    if let Some(event) = self.events.get_mut(&member) {
                        event.cancelled = true;
                    }
                }
            }
            None => {
                if let Some(event) = self.events.get_mut(&id) {
                    event.cancelled = true;
                }
            }
        }
    }

    #[must_use]
    pub fn is_cancelled(&self, id: EventId) -> bool {
        self.events.get(&id).is_some_and(Event::is_cancelled)
    }

    /// The event and every child, depth first, parents before children.
    #[must_use]
    pub fn flatten(&self, root: EventId) -> Vec<EventId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(event) = self.events.get(&id) else {
                continue;
            };
            result.push(id);
            for &child in event.children.iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Events that resolved in this window: the tree plus attached events.
    #[must_use]
    pub fn concurrent(&self, root: EventId) -> Vec<EventId> {
        let mut result = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            for event_id in self.flatten(id) {
                result.push(event_id);
                if let Some(event) = self.events.get(&event_id) {
                    pending.extend(event.attached.iter().rev().copied());
                }
            }
        }
        result
    }

    /// Take the default effect of an event, marking it resolved.
    pub(crate) fn take_handler(&mut self, id: EventId) -> Option<EventHandler> {
        let event = self.events.get_mut(&id)?;
        event.resolved = true;
        event.handler.clone()
    }

    /// Collect the post handlers of a whole window, in event order.
    pub(crate) fn take_post_handlers(&mut self, root: EventId) -> Vec<(EventId, EventHandler)> {
        let mut handlers = Vec::new();
        for id in self.concurrent(root) {
            if let Some(event) = self.events.get_mut(&id) {
                for handler in event.post_handlers.drain(..) {
                    handlers.push((id, handler));
                }
            }
        }
        handlers
    }

    /// Drop a finished window's events.
    pub(crate) fn release(&mut self, root: EventId) {
        for id in self.concurrent(root) {
            self.events.remove(&id);
        }
    }
}
