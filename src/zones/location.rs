//! Card locations.
//!
//! The location set is fixed by the game rules. Two derived sets matter to
//! the engine:
//!
//! - **Event-handling locations**: a card's own event registrations are
//!   live only while it sits in one of these.
//! - **Effect locations**: where a persistent effect's source must be for
//!   the effect to apply. `Any` covers printed keywords and agenda text
//!   active from the start of setup.

use serde::{Deserialize, Serialize};

/// Where a card currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "hand")]
    Hand,
    #[serde(rename = "draw deck")]
    DrawDeck,
    #[serde(rename = "discard pile")]
    DiscardPile,
    #[serde(rename = "dead pile")]
    DeadPile,
    #[serde(rename = "play area")]
    PlayArea,
    #[serde(rename = "out of game")]
    OutOfGame,
    #[serde(rename = "shadows")]
    Shadows,
    #[serde(rename = "active plot")]
    ActivePlot,
    #[serde(rename = "revealed plots")]
    RevealedPlots,
    #[serde(rename = "plot deck")]
    PlotDeck,
    #[serde(rename = "agenda")]
    Agenda,
    #[serde(rename = "faction")]
    Faction,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "being played")]
    BeingPlayed,
    #[serde(rename = "duplicate")]
    Duplicate,
}

impl Location {
    /// Locations in which a card's own event registrations are active.
    pub const EVENT_HANDLING: [Location; 5] = [
        Location::PlayArea,
        Location::ActivePlot,
        Location::Faction,
        Location::Agenda,
        Location::Title,
    ];

    /// Display name, as used by the client and chat.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hand => "hand",
            Self::DrawDeck => "draw deck",
            Self::DiscardPile => "discard pile",
            Self::DeadPile => "dead pile",
            Self::PlayArea => "play area",
            Self::OutOfGame => "out of game",
            Self::Shadows => "shadows",
            Self::ActivePlot => "active plot",
            Self::RevealedPlots => "revealed plots",
            Self::PlotDeck => "plot deck",
            Self::Agenda => "agenda",
            Self::Faction => "faction",
            Self::Title => "title",
            Self::BeingPlayed => "being played",
            Self::Duplicate => "duplicate",
        }
    }

    /// Whether card-level events are registered in this location.
    #[must_use]
    pub fn handles_events(self) -> bool {
        Self::EVENT_HANDLING.contains(&self)
    }

    /// Whether the location is open information for every player.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(
            self,
            Self::PlayArea
                | Self::DiscardPile
                | Self::DeadPile
                | Self::OutOfGame
                | Self::ActivePlot
                | Self::RevealedPlots
                | Self::Agenda
                | Self::Faction
                | Self::Title
                | Self::BeingPlayed
                | Self::Duplicate
        )
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a persistent effect's source must be for the effect to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectLocation {
    /// Active regardless of where the source is.
    Any,
    /// Active while the source is in one specific location.
    In(Location),
}

impl EffectLocation {
    /// Locations a persistent effect may be bound to.
    pub const SUPPORTED: [Location; 5] = [
        Location::ActivePlot,
        Location::Agenda,
        Location::PlayArea,
        Location::RevealedPlots,
        Location::Title,
    ];

    /// Validate a location for use as an effect location.
    ///
    /// Returns `None` for locations an effect can never be active in.
    #[must_use]
    pub fn checked(location: Location) -> Option<Self> {
        Self::SUPPORTED
            .contains(&location)
            .then_some(Self::In(location))
    }

    /// Whether a source card in `location` keeps this effect active.
    #[must_use]
    pub fn is_active_in(self, location: Location) -> bool {
        match self {
            Self::Any => true,
            Self::In(required) => required == location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_handling_set() {
        assert!(Location::PlayArea.handles_events());
        assert!(Location::Agenda.handles_events());
        assert!(Location::Title.handles_events());
        assert!(!Location::Hand.handles_events());
        assert!(!Location::RevealedPlots.handles_events());
    }

    #[test]
    fn test_location_names_match_serde() {
        for location in [Location::PlayArea, Location::OutOfGame, Location::DrawDeck] {
            let json = serde_json::to_string(&location).unwrap();
            assert_eq!(json, format!("\"{}\"", location.name()));
        }
    }

    #[test]
    fn test_effect_location_checked() {
        assert_eq!(
            EffectLocation::checked(Location::PlayArea),
            Some(EffectLocation::In(Location::PlayArea))
        );
        assert!(EffectLocation::checked(Location::Hand).is_none());
        assert!(EffectLocation::checked(Location::DiscardPile).is_none());
    }

    #[test]
    fn test_effect_location_any() {
        assert!(EffectLocation::Any.is_active_in(Location::DrawDeck));
        assert!(!EffectLocation::In(Location::PlayArea).is_active_in(Location::Hand));
    }
}
