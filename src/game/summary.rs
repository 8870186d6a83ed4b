//! Per-viewer match snapshots.

use serde::Serialize;

use crate::cards::{Card, CardSummary};
use crate::core::{EntityId, PhaseKind, PlayerId};
use crate::phases::PromptState;
use crate::zones::Location;

use super::{ChatMessage, Game};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub gold: u32,
    pub total_power: u32,
    pub first_player: bool,
    pub faction: Option<CardSummary>,
    pub agendas: Vec<CardSummary>,
    pub active_plot: Option<CardSummary>,
    pub cards_in_play: Vec<CardSummary>,
    pub hand: Vec<CardSummary>,
    pub shadows: Vec<CardSummary>,
    pub plot_deck: Vec<CardSummary>,
    pub revealed_plots: Vec<CardSummary>,
    pub discard_pile: Vec<CardSummary>,
    pub dead_pile: Vec<CardSummary>,
    pub out_of_game: Vec<CardSummary>,
    pub draw_deck_size: usize,
    /// Only filled in for the viewer's own seat.
    pub prompt: Option<PromptState>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub phase: PhaseKind,
    pub round: u32,
    pub winner: Option<PlayerId>,
    pub finished: bool,
    pub players: Vec<PlayerSummary>,
    pub messages: Vec<ChatMessage>,
}

impl Game {
    fn pile_summary(&self, player: PlayerId, location: Location, viewer: PlayerId) -> Vec<CardSummary> {
        self.cards_in(player, location)
            .into_iter()
            .filter_map(|id| self.card(id))
            .map(|card| card.summary(self, viewer))
            .collect()
    }

    fn player_summary(&self, player: PlayerId, viewer: PlayerId) -> PlayerSummary {
        let summarize = |id: EntityId| self.card(id).map(|card: &Card| card.summary(self, viewer));
        let seat = self.player(player);

        let cards_in_play = self
            .cards_in(player, Location::PlayArea)
            .into_iter()
            .filter_map(|id| self.card(id))
            .filter(|card| card.parent.is_none())
            .map(|card| card.summary(self, viewer))
            .collect();

        PlayerSummary {
            id: player,
            name: seat.name.clone(),
            gold: seat.gold,
            total_power: self.total_power(player),
            first_player: self.first_player() == Some(player),
            faction: seat.faction.and_then(summarize),
            agendas: seat.agendas.iter().filter_map(|&id| summarize(id)).collect(),
            active_plot: self.active_plot(player).and_then(summarize),
            cards_in_play,
            hand: self.pile_summary(player, Location::Hand, viewer),
            shadows: self.pile_summary(player, Location::Shadows, viewer),
            plot_deck: self.pile_summary(player, Location::PlotDeck, viewer),
            revealed_plots: self.pile_summary(player, Location::RevealedPlots, viewer),
            discard_pile: self.pile_summary(player, Location::DiscardPile, viewer),
            dead_pile: self.pile_summary(player, Location::DeadPile, viewer),
            out_of_game: self.pile_summary(player, Location::OutOfGame, viewer),
            draw_deck_size: self.pile_size(player, Location::DrawDeck),
            prompt: (player == viewer).then(|| self.prompt_for(player)).flatten(),
        }
    }

    /// The match as `viewer` sees it.
    #[must_use]
    pub fn summary(&self, viewer: PlayerId) -> GameSummary {
        GameSummary {
            phase: self.current_phase(),
            round: self.round(),
            winner: self.winner(),
            finished: self.is_finished(),
            players: self
                .player_ids()
                .map(|player| self.player_summary(player, viewer))
                .collect(),
            messages: self.messages().to_vec(),
        }
    }
}
