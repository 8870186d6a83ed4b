//! Core engine types: card ids, players, RNG, configuration, commands, errors.
//!
//! This module contains the building blocks every other subsystem shares.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod error;

pub use entity::{EntityAllocator, EntityId};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{GameConfig, PhaseKind, PlayerConfig};
pub use action::{Command, CommandArg, CommandRecord};
pub use error::DefinitionError;
