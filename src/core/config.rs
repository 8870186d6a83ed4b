//! Match configuration types.
//!
//! - `PhaseKind`: The phases a round moves through
//! - `PlayerConfig`: Seat name and deck reference
//! - `GameConfig`: Combines all configuration
//!
//! Rule constants (hand size, setup gold) live here instead of being
//! scattered through the phase code so tests can shrink them.

use serde::{Deserialize, Serialize};

/// Phase identifier.
///
/// Persistent effects with phase durations and action abilities gated on a
/// phase compare against the current `PhaseKind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Setup,
    Plot,
    Draw,
    Marshal,
    Challenge,
    Dominance,
    Standing,
    Taxation,
}

impl PhaseKind {
    /// Phase name as shown in chat.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Plot => "plot",
            Self::Draw => "draw",
            Self::Marshal => "marshal",
            Self::Challenge => "challenge",
            Self::Dominance => "dominance",
            Self::Standing => "standing",
            Self::Taxation => "taxation",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one seat.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name used in chat messages.
    pub name: String,
}

impl PlayerConfig {
    /// Create a seat with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Complete match configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seats, in table order.
    pub players: Vec<PlayerConfig>,

    /// Seed for shuffles and the first player coin flip.
    pub seed: u64,

    /// Cards drawn for the opening hand, and the hand refilled to after setup.
    pub starting_hand_size: usize,

    /// Gold available for placing setup cards.
    pub setup_gold: u32,

    /// Cards each player draws in the draw phase.
    pub draw_phase_cards: usize,

    /// Power on faction cards needed to win.
    pub winning_power: u32,
}

impl GameConfig {
    /// Create a configuration with default rule constants.
    pub fn new(players: Vec<PlayerConfig>) -> Self {
        assert!(!players.is_empty(), "Must have at least 1 player");
        assert!(players.len() <= 255, "At most 255 players supported");

        Self {
            players,
            seed: 0,
            starting_hand_size: 7,
            setup_gold: 8,
            draw_phase_cards: 2,
            winning_power: 15,
        }
    }

    /// Two seats named after the arguments.
    pub fn head_to_head(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::new(vec![PlayerConfig::new(first), PlayerConfig::new(second)])
    }

    /// Set the RNG seed (builder pattern).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the starting hand size (builder pattern).
    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set the setup gold (builder pattern).
    #[must_use]
    pub fn with_setup_gold(mut self, gold: u32) -> Self {
        self.setup_gold = gold;
        self
    }

    /// Set the number of cards drawn in the draw phase (builder pattern).
    #[must_use]
    pub fn with_draw_phase_cards(mut self, cards: usize) -> Self {
        self.draw_phase_cards = cards;
        self
    }

    /// Set the power needed to win (builder pattern).
    #[must_use]
    pub fn with_winning_power(mut self, power: u32) -> Self {
        self.winning_power = power;
        self
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::head_to_head("alice", "bob");

        assert_eq!(config.player_count(), 2);
        assert_eq!(config.starting_hand_size, 7);
        assert_eq!(config.setup_gold, 8);
        assert_eq!(config.draw_phase_cards, 2);
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::head_to_head("alice", "bob")
            .with_seed(99)
            .with_starting_hand_size(3)
            .with_setup_gold(4)
            .with_draw_phase_cards(1);

        assert_eq!(config.seed, 99);
        assert_eq!(config.starting_hand_size, 3);
        assert_eq!(config.setup_gold, 4);
        assert_eq!(config.draw_phase_cards, 1);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(PhaseKind::Marshal.to_string(), "marshal");
        let json = serde_json::to_string(&PhaseKind::Challenge).unwrap();
        assert_eq!(json, "\"challenge\"");
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_no_players() {
        let _ = GameConfig::new(Vec::new());
    }
}
