//! Card locations and pile ordering.
//!
//! ## Key Types
//!
//! - `Location`: The fixed set of places a card can be
//! - `EffectLocation`: Where a persistent effect's source must be
//! - `ZoneManager`: Per-player pile ordering
//! - `ZonePosition`: Position specifier for piles

pub mod location;
pub mod manager;

pub use location::{EffectLocation, Location};
pub use manager::{Pile, ZoneManager, ZonePosition};
