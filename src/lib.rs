//! # thrones-engine
//!
//! Rules and ability engine for the "A Game of Thrones" living card game.
//!
//! ## Design Principles
//!
//! 1. **The match owns everything**: Cards, events and abilities live in
//!    arenas on [`Game`] and refer to each other by id. Operations take
//!    `&Game` or `&mut Game` explicitly.
//!
//! 2. **Card behaviour is data**: A card implementation is a function from
//!    the card's id to a list of [`AbilityTrigger`]s. The engine knows no
//!    individual card.
//!
//! 3. **Every change is an event**: Game actions build events; event
//!    windows give interrupts and reactions their chance and decide
//!    whether the change happens.
//!
//! ## Architecture
//!
//! - **Step pipeline**: The match is a queue of steps. Prompts wait for
//!   player commands; everything else runs straight through.
//!
//! - **Persistent data structures**: Card snapshots are O(1) via `im`, so
//!   events can carry the card as it was.
//!
//! - **Deterministic**: Shuffles and the first-player draw use a seeded
//!   ChaCha RNG.
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, RNG, configuration, commands, errors
//! - `zones`: Locations and per-player piles
//! - `cards`: Card data, instances, registry and summaries
//! - `effects`: Game actions, costs, selectors and persistent effects
//! - `triggers`: Events, ability triggers and their registry
//! - `stack`: Step pipelines, event windows and ability resolution
//! - `phases`: Prompts, setup and the round phases
//! - `game`: The match itself
//! - `deck`: Decks and deck validation
//! - `router`: Game worker dispatcher
//! - `services`: Services over external stores

pub mod core;
pub mod zones;
pub mod cards;
pub mod effects;
pub mod triggers;
pub mod stack;
pub mod phases;
pub mod game;
pub mod deck;
pub mod router;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    Command, CommandArg, DefinitionError, EntityId, GameConfig, GameRng, PhaseKind, PlayerConfig, PlayerId,
    PlayerMap,
};

pub use crate::zones::{Location, ZoneManager, ZonePosition};

pub use crate::cards::{Card, CardData, CardRegistry, CardSummary, CardType, Faction, Keyword, Token};

pub use crate::effects::{CardSelector, Cost, EffectSpec, GameAction, Modifier};

pub use crate::triggers::{AbilityContext, AbilityTrigger, EventKind, TimingClass, WhenCondition};

pub use crate::stack::{GamePipeline, SimpleStep, Step, StepStatus};

pub use crate::phases::{PromptOutcome, SelectCardPrompt};

pub use crate::game::{Game, GameSummary};

pub use crate::deck::{Deck, DeckValidator};

pub use crate::router::{GameRouter, Publisher, RouterConfig};
