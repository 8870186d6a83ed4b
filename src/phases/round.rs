//! Round phases after setup.
//!
//! Each round runs plot, draw, marshaling, challenges, dominance,
//! standing and taxation, then ends. Challenges themselves are not
//! resolved: the challenges phase is an action window.

use tracing::{debug, info};

use crate::cards::{Card, CardType};
use crate::core::{EntityId, PhaseKind, PlayerId};
use crate::effects::{ActionContext, CardSelector, DelayedTiming, Duration, EffectEngine, GameAction};
use crate::game::{Game, MessageArg};
use crate::stack::{SimpleStep, Step, StepStatus};
use crate::triggers::{EventKind, EventParams, LimitPeriod};
use crate::zones::{Location, ZonePosition};

use super::prompt::{PlayerCompletion, PromptButton, PromptOutcome, PromptState};
use super::select_card::SelectCardPrompt;
use super::Phase;

/// Starts a round: queues its phases and the next round.
#[derive(Debug, Default)]
pub struct NextRound;

impl Step for NextRound {
    fn name(&self) -> &str {
        "next round"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        let round = game.begin_round();
        info!(round, "round started");
        game.add_message("Round {0} begins", vec![MessageArg::Number(i64::from(round))]);

        for phase in round_phases() {
            game.queue_step(Box::new(phase));
        }
        game.queue_step(Box::new(SimpleStep::new("end round", end_round)));
        game.queue_step(Box::new(NextRound));
        StepStatus::Complete
    }
}

/// The seven phases of a round, in order.
#[must_use]
pub fn round_phases() -> Vec<Phase> {
    vec![
        Phase::new(PhaseKind::Plot, vec![Box::new(SelectPlotPrompt::default())]),
        Phase::new(
            PhaseKind::Draw,
            vec![Box::new(SimpleStep::new("draw cards", draw_cards))],
        ),
        Phase::new(
            PhaseKind::Marshal,
            vec![
                Box::new(SimpleStep::new("collect income", collect_income)),
                Box::new(ActionWindow::marshaling()),
            ],
        ),
        Phase::new(PhaseKind::Challenge, vec![Box::new(ActionWindow::new())]),
        Phase::new(
            PhaseKind::Dominance,
            vec![Box::new(SimpleStep::new("determine dominance", determine_dominance))],
        ),
        Phase::new(
            PhaseKind::Standing,
            vec![Box::new(SimpleStep::new("stand cards", stand_cards))],
        ),
        Phase::new(
            PhaseKind::Taxation,
            vec![
                Box::new(SimpleStep::new("return gold", return_gold)),
                Box::new(SimpleStep::new("discard to reserve", discard_to_reserve)),
            ],
        ),
    ]
}

// === Plot ===

/// Every player with plots left picks one; all are revealed together.
#[derive(Debug, Default)]
pub struct SelectPlotPrompt {
    completion: PlayerCompletion,
    chosen: Vec<(PlayerId, EntityId)>,
    started: bool,
}

impl SelectPlotPrompt {
    #[must_use]
    pub fn chosen(&self) -> &[(PlayerId, EntityId)] {
        &self.chosen
    }
}

impl Step for SelectPlotPrompt {
    fn name(&self) -> &str {
        "select plot"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if !self.started {
            self.started = true;
            let players: Vec<PlayerId> = game.player_ids().collect();
            for player in players {
                if game.pile_size(player, Location::PlotDeck) == 0 {
                    self.completion.complete(player);
                }
            }
        }
        if !self.completion.all_complete(game) {
            return StepStatus::Waiting;
        }
        reveal_plots(game, &self.chosen);
        StepStatus::Complete
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        if self.completion.is_complete(player) {
            return false;
        }
        let in_plot_deck = game
            .card(card)
            .is_some_and(|c| c.owner == player && c.location == Location::PlotDeck);
        if !in_plot_deck {
            return false;
        }
        debug!(%player, plot = %card, "plot selected");
        self.chosen.push((player, card));
        self.completion.complete(player);
        true
    }

    fn prompt_for(&self, _game: &Game, player: PlayerId) -> Option<PromptState> {
        if self.completion.is_complete(player) {
            return Some(PromptState::waiting("Waiting for opponent to select plot"));
        }
        Some(PromptState::menu("Select a plot", Vec::new()).selecting())
    }
}

fn reveal_plots(game: &mut Game, chosen: &[(PlayerId, EntityId)]) {
    for &(player, plot) in chosen {
        if let Some(previous) = game.active_plot(player) {
            game.move_card(previous, Location::RevealedPlots, None, ZonePosition::Top);
        }
        game.move_card(plot, Location::ActivePlot, None, ZonePosition::Top);

        if game.pile_size(player, Location::PlotDeck) == 0 {
            for used in game.cards_in(player, Location::RevealedPlots) {
                game.move_card(used, Location::PlotDeck, None, ZonePosition::Top);
            }
        }
        game.add_message("{0} reveals {1}", vec![MessageArg::Player(player), MessageArg::Card(plot)]);
        game.raise_event(EventKind::PlotRevealed, EventParams::new().card(plot).player(player));
    }

    if let Some(winner) = initiative_winner(game, chosen) {
        game.set_first_player(winner);
        game.add_message("{0} wins initiative and is first player", vec![MessageArg::Player(winner)]);
    }
}

/// Highest initiative wins; ties go to the player with less power, then
/// to the earlier player in priority order.
fn initiative_winner(game: &Game, chosen: &[(PlayerId, EntityId)]) -> Option<PlayerId> {
    let order = game.players_in_priority_order();
    chosen
        .iter()
        .map(|&(player, plot)| {
            let initiative = game.card(plot).map_or(0, Card::initiative);
            let seat = order.iter().position(|&p| p == player).unwrap_or(usize::MAX);
            (player, initiative, game.total_power(player), seat)
        })
        .max_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| b.3.cmp(&a.3))
        })
        .map(|(player, ..)| player)
}

// === Draw and marshaling ===

fn draw_cards(game: &mut Game) {
    let amount = game.config().draw_phase_cards as u32;
    for player in game.players_in_priority_order() {
        game.resolve_game_action(&GameAction::draw_cards(player, amount), &ActionContext::new(player));
    }
}

fn collect_income(game: &mut Game) {
    for player in game.players_in_priority_order() {
        let income = game
            .active_plot(player)
            .and_then(|plot| game.card(plot))
            .map_or(0, Card::income);
        if income > 0 {
            game.resolve_game_action(&GameAction::gain_gold(player, income as u32), &ActionContext::new(player));
        }
    }
}

/// Players take actions in priority order until every player passes in
/// a row.
///
/// During marshaling, clicking a character or location in hand pays its
/// cost and puts it into play.
#[derive(Debug, Default)]
pub struct ActionWindow {
    order: Vec<PlayerId>,
    current: usize,
    passes: usize,
    marshaling: bool,
}

impl ActionWindow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn marshaling() -> Self {
        Self {
            marshaling: true,
            ..Self::default()
        }
    }

    fn current_player(&self) -> Option<PlayerId> {
        self.order.get(self.current).copied()
    }

    fn advance(&mut self) {
        if !self.order.is_empty() {
            self.current = (self.current + 1) % self.order.len();
        }
    }

    fn marshal(game: &mut Game, player: PlayerId, id: EntityId) -> bool {
        let Some(card) = game.card(id) else {
            return false;
        };
        let marshalable = card.owner == player
            && card.location == Location::Hand
            && matches!(card.card_type(), CardType::Character | CardType::Location);
        let cost = card.data().cost.unwrap_or(0);
        if !marshalable || cost > game.player(player).gold {
            return false;
        }

        let action = GameAction::put_into_play(id, player);
        let context = ActionContext::new(player);
        if !action.allow(game, &context) {
            return false;
        }
        game.player_mut(player).gold -= cost;
        game.add_message(
            "{0} marshals {1} costing {2}",
            vec![MessageArg::Player(player), MessageArg::Card(id), MessageArg::Number(i64::from(cost))],
        );
        game.resolve_game_action(&action, &context);
        true
    }
}

impl Step for ActionWindow {
    fn name(&self) -> &str {
        "action window"
    }

    fn continue_step(&mut self, game: &mut Game) -> StepStatus {
        if self.order.is_empty() {
            self.order = game.players_in_priority_order();
        }
        if self.passes >= self.order.len() {
            StepStatus::Complete
        } else {
            StepStatus::Waiting
        }
    }

    fn on_card_clicked(&mut self, game: &mut Game, player: PlayerId, card: EntityId) -> bool {
        if !self.marshaling || self.current_player() != Some(player) {
            return false;
        }
        if !Self::marshal(game, player, card) {
            return false;
        }
        self.action_taken(player);
        true
    }

    fn on_menu_command(&mut self, _game: &mut Game, player: PlayerId, arg: &str, _method: &str) -> bool {
        if arg != "pass" || self.current_player() != Some(player) {
            return false;
        }
        debug!(%player, "action window passed");
        self.passes += 1;
        self.advance();
        true
    }

    fn prompt_for(&self, game: &Game, player: PlayerId) -> Option<PromptState> {
        if self.current_player() != Some(player) {
            return Some(PromptState::waiting("Waiting for opponent to take an action or pass"));
        }
        let phase = game.current_phase().name();
        Some(
            PromptState::menu("Initiate an action", vec![PromptButton::new("Pass", "pass")])
                .with_prompt_title(format!("{phase} phase")),
        )
    }

    fn allows_actions(&self, player: PlayerId) -> bool {
        self.current_player() == Some(player)
    }

    fn action_taken(&mut self, _player: PlayerId) {
        self.passes = 0;
        self.advance();
    }
}

// === Dominance and standing ===

fn dominance_total(game: &Game, player: PlayerId) -> i64 {
    let strength: i64 = game
        .cards_in(player, Location::PlayArea)
        .into_iter()
        .filter_map(|id| game.card(id))
        .filter(|card| card.card_type() == CardType::Character && !card.kneeled)
        .map(|card| i64::from(card.strength()))
        .sum();
    strength + i64::from(game.player(player).gold)
}

fn determine_dominance(game: &mut Game) {
    let totals: Vec<(PlayerId, i64)> = game
        .players_in_priority_order()
        .into_iter()
        .map(|player| (player, dominance_total(game, player)))
        .collect();
    let Some(&(leader, best)) = totals.iter().max_by_key(|(_, total)| *total) else {
        return;
    };
    let tied = totals.iter().filter(|(_, total)| *total == best).count() > 1;

    match game.faction_card(leader).filter(|_| !tied) {
        Some(faction) => {
            info!(player = %leader, total = best, "dominance won");
            game.add_message("{0} wins dominance", vec![MessageArg::Player(leader)]);
            game.resolve_game_action(&GameAction::gain_power(faction, 1), &ActionContext::new(leader));
        }
        None => game.add_message("No one wins dominance", Vec::new()),
    }
}

fn stand_cards(game: &mut Game) {
    let kneeling: Vec<GameAction> = game
        .cards()
        .filter(|card| card.kneeled && card.location.handles_events())
        .map(|card| GameAction::stand(card.id))
        .collect();
    if kneeling.is_empty() {
        return;
    }
    let player = game.first_player().unwrap_or(PlayerId(0));
    game.resolve_game_action(&GameAction::Simultaneously(kneeling), &ActionContext::new(player));
}

// === Taxation ===

fn return_gold(game: &mut Game) {
    for player in game.players_in_priority_order() {
        let gold = game.player(player).gold;
        if gold > 0 {
            game.resolve_game_action(&GameAction::return_gold(player, gold), &ActionContext::new(player));
        }
    }
}

fn discard_to_reserve(game: &mut Game) {
    for player in game.players_in_priority_order() {
        let reserve = game
            .active_plot(player)
            .and_then(|plot| game.card(plot))
            .map_or(0, Card::reserve)
            .max(0) as usize;
        let excess = game.pile_size(player, Location::Hand).saturating_sub(reserve);
        if reserve == 0 || excess == 0 {
            continue;
        }

        let selector = CardSelector::exactly(excess)
            .in_location(Location::Hand)
            .with_condition(move |_, card, _| card.owner == player);
        let prompt = SelectCardPrompt::new(player, selector, ActionContext::new(player))
            .with_title(format!("Select {excess} cards to discard down to reserve"))
            .on_select(|game, player, cards| {
                for &card in cards {
                    let discard = GameAction::place_card(card, player, Location::DiscardPile);
                    game.resolve_game_action(&discard, &ActionContext::new(player));
                }
                game.add_message(
                    "{0} discards {1} to meet reserve",
                    vec![MessageArg::Player(player), MessageArg::Cards(cards.to_vec())],
                );
                PromptOutcome::Complete
            });
        game.queue_step(Box::new(prompt));
    }
}

fn end_round(game: &mut Game) {
    let round = game.round();
    game.raise_event(EventKind::RoundEnded, EventParams::new());
    EffectEngine::expire(game, |_, duration| matches!(duration, Duration::UntilEndOfRound));
    for delayed in game.effects_mut().take_delayed(DelayedTiming::EndOfRound) {
        game.resolve_game_action(&delayed.action, &delayed.context);
    }
    game.abilities_mut().reset_limits(LimitPeriod::Round);
    let ids: Vec<EntityId> = game.cards().map(|card| card.id).collect();
    for id in ids {
        if let Some(card) = game.card_mut(id) {
            card.new = false;
        }
    }
    info!(round, "round ended");
}
