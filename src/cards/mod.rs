//! Cards: printed data, runtime instances and the code → implementation
//! registry.
//!
//! ## Key Types
//!
//! - [`CardData`]: What is printed on a card, shared by every copy
//! - [`Card`]: One physical copy in a match (location, facing, control,
//!   tokens, effect-modified properties)
//! - [`CardRegistry`]: Card data and implementations by code
//! - [`AbilityRestriction`]: "Cannot be X'd" rules checked by game actions
//! - [`CardSummary`]: What one viewer may know about a card
//!
//! Properties that several effects may add and remove independently
//! (traits, factions, keywords, blanking) are reference-counted, so a card
//! keeps a trait until the last effect granting it goes away.

mod catalog;
mod data;
mod instance;
mod properties;
mod registry;
mod restriction;
mod summary;

pub use catalog::{catalog_data, register_catalog};
pub use data::{parse_keywords, CardData, CardType, Faction, Keyword, PlotStats, PrintedKeyword};
pub use instance::{
    BlankKind, Card, ControlEntry, FactionChange, FactionStatus, MoveOutcome, RegistrationChange, Token,
};
pub use properties::{KeywordsProperty, ReferenceCountedSet};
pub use registry::{CardEntry, CardImplementation, CardRegistry};
pub use restriction::{AbilityRestriction, ActionKind, ResolutionStage};
pub use summary::{
    AlertKind, AlertStatus, CardSummary, HiddenCard, MenuItem, ShortSummary, VisibleCard,
};
