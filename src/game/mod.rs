//! The match.
//!
//! [`Game`] owns every card, player, event and effect of one match, and
//! the pipeline of steps that drives it. Cards do not point back at the
//! match: anything needing game-wide state takes `&Game` or `&mut Game`
//! and looks cards up by id.
//!
//! ## Commands
//!
//! Player input enters through [`Game::card_clicked`],
//! [`Game::menu_button`] and [`Game::menu_item_click`] (or
//! [`Game::handle_command`]). Each is routed to the step at the front of
//! the pipeline; accepted input advances the pipeline until it waits
//! again. Rejected input changes nothing and returns `false`.
//!
//! ## Example
//!
//! ```
//! use thrones_engine::cards::CardRegistry;
//! use thrones_engine::core::{GameConfig, PhaseKind, PlayerId};
//! use thrones_engine::deck::Deck;
//! use thrones_engine::cards::Faction;
//! use thrones_engine::game::Game;
//!
//! let registry = CardRegistry::new();
//! let mut game = Game::new(GameConfig::head_to_head("alice", "bob").with_seed(3));
//! for player in [PlayerId(0), PlayerId(1)] {
//!     game.load_deck(&registry, player, &Deck::new("empty", Faction::Stark)).unwrap();
//! }
//! game.begin();
//!
//! assert_eq!(game.current_phase(), PhaseKind::Setup);
//! let prompt = game.prompt_for(PlayerId(0)).unwrap();
//! assert_eq!(prompt.menu_title, "Keep or mulligan?");
//! ```

mod message;
mod player;
mod summary;
mod visibility;

pub use message::{render, render_arg, render_context, ChatMessage, MessageArg};
pub use player::{Player, Selection};
pub use summary::{GameSummary, PlayerSummary};
pub use visibility::{RuleId, Visibility, VisibilityRule};

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::cards::{Card, CardData, CardRegistry, CardType, MoveOutcome};
use crate::core::{
    Command, CommandRecord, DefinitionError, EntityAllocator, EntityId, GameConfig, GameRng,
    PhaseKind, PlayerId, PlayerMap,
};
use crate::deck::Deck;
use crate::effects::{ActionContext, EffectEngine, EffectId, EffectSpec, GameAction, Modifier};
use crate::phases::{setup_phase, NextRound, PromptState};
use crate::stack::{AbilityResolver, EventWindow, GamePipeline, Step};
use crate::triggers::{
    AbilityContext, AbilityId, AbilityRegistry, EventArena, EventId, EventKind, EventParams,
    TimingClass,
};
use crate::zones::{Location, Pile, ZoneManager, ZonePosition};

/// One match.
pub struct Game {
    config: GameConfig,
    rng: GameRng,
    allocator: EntityAllocator,

    cards: FxHashMap<EntityId, Card>,
    zones: ZoneManager,
    players: PlayerMap<Player>,

    events: EventArena,
    abilities: AbilityRegistry,
    effects: EffectEngine,
    visibility: Visibility,
    messages: Vec<ChatMessage>,

    pipeline: GamePipeline,
    /// One frame per running step, collecting the steps it queues.
    step_staging: Vec<Vec<Box<dyn Step>>>,
    /// Steps queued while no step is running.
    pending_steps: Vec<Box<dyn Step>>,

    phase: PhaseKind,
    round: u32,
    first_player: Option<PlayerId>,
    winner: Option<PlayerId>,
    finished: bool,
    history: Vec<CommandRecord>,
}

impl Game {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let players = PlayerMap::from_vec(
            config
                .players
                .iter()
                .enumerate()
                .map(|(index, seat)| Player::new(PlayerId(index as u8), seat.name.clone()))
                .collect(),
        );
        let rng = GameRng::new(config.seed);

        Self {
            config,
            rng,
            allocator: EntityAllocator::new(),
            cards: FxHashMap::default(),
            zones: ZoneManager::new(),
            players,
            events: EventArena::new(),
            abilities: AbilityRegistry::new(),
            effects: EffectEngine::new(),
            visibility: Visibility::default(),
            messages: Vec::new(),
            pipeline: GamePipeline::new(),
            step_staging: Vec::new(),
            pending_steps: Vec::new(),
            phase: PhaseKind::Setup,
            round: 0,
            first_player: None,
            winner: None,
            finished: false,
            history: Vec::new(),
        }
    }

    // === Match state ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    #[must_use]
    pub fn current_phase(&self) -> PhaseKind {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: PhaseKind) {
        self.phase = phase;
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    pub(crate) fn begin_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    #[must_use]
    pub fn first_player(&self) -> Option<PlayerId> {
        self.first_player
    }

    pub fn set_first_player(&mut self, player: PlayerId) {
        self.first_player = Some(player);
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn history(&self) -> &[CommandRecord] {
        &self.history
    }

    // === Players ===

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.player_ids()
    }

    /// Seats starting with the first player, then in table order.
    #[must_use]
    pub fn players_in_priority_order(&self) -> Vec<PlayerId> {
        PlayerId::in_priority_order(self.first_player.unwrap_or(PlayerId(0)), self.player_count())
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &Player {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut Player {
        &mut self.players[player]
    }

    #[must_use]
    pub fn faction_card(&self, player: PlayerId) -> Option<EntityId> {
        self.players[player].faction
    }

    /// Power on the player's faction card plus power on cards they control
    /// in play.
    #[must_use]
    pub fn total_power(&self, player: PlayerId) -> u32 {
        self.cards
            .values()
            .filter(|card| card.controller() == player)
            .filter(|card| matches!(card.location, Location::PlayArea | Location::Faction))
            .map(Card::power)
            .sum()
    }

    // === Cards ===

    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut Card> {
        self.cards.get_mut(&id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Cards a player has in a location.
    ///
    /// Ordered piles come back bottom to top. The play area and other
    /// unordered locations list the cards the player controls, by id.
    #[must_use]
    pub fn cards_in(&self, player: PlayerId, location: Location) -> Vec<EntityId> {
        match location {
            Location::PlayArea | Location::Duplicate => {
                let mut cards: Vec<EntityId> = self
                    .cards
                    .values()
                    .filter(|card| card.location == location && card.controller() == player)
                    .map(|card| card.id)
                    .collect();
                cards.sort();
                cards
            }
            _ => self.zones.cards(Pile::new(player, location)).to_vec(),
        }
    }

    #[must_use]
    pub fn pile_size(&self, player: PlayerId, location: Location) -> usize {
        self.cards_in(player, location).len()
    }

    /// The player's active plot.
    #[must_use]
    pub fn active_plot(&self, player: PlayerId) -> Option<EntityId> {
        self.zones.top_card(Pile::new(player, Location::ActivePlot))
    }

    pub fn shuffle_deck(&mut self, player: PlayerId) {
        self.zones
            .shuffle_pile(Pile::new(player, Location::DrawDeck), &mut self.rng);
    }

    /// Create a card for `owner` in `location`, registering its abilities
    /// and effects.
    ///
    /// # Errors
    ///
    /// Returns the card implementation's [`DefinitionError`], if any.
    pub fn create_card(
        &mut self,
        registry: &CardRegistry,
        owner: PlayerId,
        data: Rc<CardData>,
        location: Location,
    ) -> Result<EntityId, DefinitionError> {
        let id = self.allocator.allocate();
        let entry = registry.get(&data.code);
        let abilities = match entry {
            Some(_) => registry.abilities_for(&data.code, id)?,
            None => Vec::new(),
        };

        let mut card = Card::new(id, owner, data).in_location(location);
        if let Some(entry) = entry.filter(|entry| entry.implementation.is_some()) {
            card = card.with_implementation(entry.version.clone());
        }
        let card_type = card.card_type();
        let printed: Vec<Modifier> = card
            .printed_keywords()
            .iter()
            .map(|&printed| Modifier::AddPrintedKeyword(printed))
            .collect();

        self.zones.add_to_pile(id, Pile::new(owner, location), ZonePosition::Top);
        self.cards.insert(id, card);

        let mut printed = printed.into_iter();
        if let Some(first) = printed.next() {
            let spec = printed
                .fold(EffectSpec::on_self(first), EffectSpec::and)
                .anywhere();
            self.effects.add(id, spec);
        }

        for mut ability in abilities {
            if ability.timing == TimingClass::PersistentEffect {
                if let Some(mut spec) = ability.effect.take() {
                    spec.resolve_location(card_type);
                    self.effects.add(id, spec);
                }
                continue;
            }
            ability.resolve_locations(card_type);
            self.abilities.register(ability);
        }
        self.abilities.update_for_location(id, None, location);

        Ok(id)
    }

    /// Create every card of a deck for `player`.
    ///
    /// Card data is taken from the registry when it knows the code, so
    /// registered implementations apply; otherwise the deck's record is
    /// used as is.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] raised by a card
    /// implementation.
    pub fn load_deck(&mut self, registry: &CardRegistry, player: PlayerId, deck: &Deck) -> Result<(), DefinitionError> {
        let resolve = |data: &CardData| registry.data(&data.code).unwrap_or_else(|| Rc::new(data.clone()));

        let faction = CardData::new(
            format!("faction-{}", deck.faction.code()),
            deck.faction.to_string(),
            CardType::Faction,
            deck.faction,
        );
        let faction = self.create_card(registry, player, Rc::new(faction), Location::Faction)?;
        self.players[player].faction = Some(faction);

        for agenda in &deck.agendas {
            let agenda = self.create_card(registry, player, resolve(agenda), Location::Agenda)?;
            self.players[player].agendas.push(agenda);
        }
        for entry in &deck.plot_cards {
            for _ in 0..entry.count {
                self.create_card(registry, player, resolve(&entry.card), Location::PlotDeck)?;
            }
        }
        for entry in &deck.draw_cards {
            for _ in 0..entry.count {
                self.create_card(registry, player, resolve(&entry.card), Location::DrawDeck)?;
            }
        }

        info!(%player, deck = %deck.name, cards = self.cards.len(), "deck loaded");
        Ok(())
    }

    /// Move a card, keeping piles, hosts and ability registrations in step.
    ///
    /// Raises `CardMoved` only when location, parent or facing changed.
    pub fn move_card(
        &mut self,
        id: EntityId,
        location: Location,
        parent: Option<EntityId>,
        position: ZonePosition,
    ) -> Option<MoveOutcome> {
        let card = self.cards.get_mut(&id)?;
        let was_facedown = card.facedown;
        let owner = card.owner;
        let outcome = card.move_to(location, parent, was_facedown);

        if outcome.parent_changed {
            if let Some(host) = outcome.original_parent.and_then(|old| self.cards.get_mut(&old)) {
                host.remove_child(id);
            }
            if let Some(host) = parent.and_then(|new| self.cards.get_mut(&new)) {
                if location == Location::Duplicate {
                    host.dupes.push(id);
                } else {
                    host.attachments.push(id);
                }
            }
        }

        self.zones.add_to_pile(id, Pile::new(owner, location), position);

        self.abilities
            .update_for_location(id, Some(outcome.original_location), location);

        if outcome.is_change() {
            let mut params = EventParams::new()
                .card(id)
                .player(owner)
                .locations(outcome.original_location, location);
            params.parent_changed = outcome.parent_changed;
            params.facedown_changed = outcome.facedown_changed;
            self.raise_event(EventKind::CardMoved, params);
        }
        Some(outcome)
    }

    /// Attach `attachment` to `host` in play.
    pub fn attach(&mut self, attachment: EntityId, host: EntityId) -> Option<MoveOutcome> {
        self.move_card(attachment, Location::PlayArea, Some(host), ZonePosition::Top)
    }

    /// Draw up to `count` cards from the top of the player's deck.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> Vec<EntityId> {
        let drawn = self
            .zones
            .top_cards(Pile::new(player, Location::DrawDeck), count);
        for &card in &drawn {
            self.move_card(card, Location::Hand, None, ZonePosition::Top);
        }
        debug!(%player, count = drawn.len(), "cards drawn");
        drawn
    }

    // === Events, abilities and effects ===

    #[must_use]
    pub fn events(&self) -> &EventArena {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventArena {
        &mut self.events
    }

    #[must_use]
    pub fn abilities(&self) -> &AbilityRegistry {
        &self.abilities
    }

    pub fn abilities_mut(&mut self) -> &mut AbilityRegistry {
        &mut self.abilities
    }

    #[must_use]
    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectEngine {
        &mut self.effects
    }

    #[must_use]
    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn visibility_mut(&mut self) -> &mut Visibility {
        &mut self.visibility
    }

    /// Resolve an event tree in a new window.
    pub fn open_window(&mut self, root: EventId) {
        self.queue_step(Box::new(EventWindow::new(root)));
    }

    /// Raise an event with no default effect.
    pub fn raise_event(&mut self, kind: EventKind, params: EventParams) -> EventId {
        let id = self.events.create(kind, params, None);
        self.open_window(id);
        id
    }

    /// Resolve a game action, if it would change anything.
    pub fn resolve_game_action(&mut self, action: &GameAction, context: &ActionContext) -> Option<EventId> {
        if !action.allow(self, context) {
            debug!(?action, "game action not allowed");
            return None;
        }
        let event = action.create_event(self, context);
        self.open_window(event);
        Some(event)
    }

    /// Add a lasting effect from `source` and apply it.
    pub fn add_lasting_effect(&mut self, source: EntityId, mut spec: EffectSpec) -> EffectId {
        let card_type = self.card(source).map_or(CardType::Event, Card::card_type);
        spec.resolve_location(card_type);
        let id = self.effects.add(source, spec);
        EffectEngine::recalculate(self);
        id
    }

    // === Steps ===

    /// Queue a step to run next.
    ///
    /// While a step runs, queued steps go before the step after it (or
    /// before the step itself if it is still waiting).
    pub fn queue_step(&mut self, step: Box<dyn Step>) {
        debug!(step = step.name(), "step queued");
        match self.step_staging.last_mut() {
            Some(frame) => frame.push(step),
            None => self.pending_steps.push(step),
        }
    }

    pub(crate) fn begin_staging(&mut self) {
        self.step_staging.push(Vec::new());
    }

    pub(crate) fn end_staging(&mut self) -> Vec<Box<dyn Step>> {
        self.step_staging.pop().unwrap_or_default()
    }

    /// Start the match: setup, then rounds until someone wins.
    pub fn begin(&mut self) {
        info!(players = self.player_count(), seed = self.config.seed, "match starting");
        self.pipeline = GamePipeline::with_steps(vec![Box::new(setup_phase()), Box::new(NextRound)]);
        self.continue_game();
    }

    /// Run queued steps and the pipeline until it waits for input.
    pub fn continue_game(&mut self) {
        let mut pipeline = std::mem::take(&mut self.pipeline);
        loop {
            pipeline.prepend(std::mem::take(&mut self.pending_steps));
            pipeline.continue_pipeline(self);
            if self.pending_steps.is_empty() || self.finished {
                break;
            }
        }
        self.pipeline = pipeline;
    }

    /// The prompt `player` currently sees.
    #[must_use]
    pub fn prompt_for(&self, player: PlayerId) -> Option<PromptState> {
        self.pipeline.prompt_for(self, player)
    }

    // === Commands ===

    fn with_pipeline(&mut self, route: impl FnOnce(&mut Self, &mut GamePipeline) -> bool) -> bool {
        if self.finished {
            return false;
        }
        let mut pipeline = std::mem::take(&mut self.pipeline);
        let handled = route(self, &mut pipeline);
        self.pipeline = pipeline;
        if handled {
            self.continue_game();
        }
        handled
    }

    pub fn card_clicked(&mut self, player: PlayerId, card: EntityId) -> bool {
        self.with_pipeline(|game, pipeline| {
            pipeline.on_card_clicked(game, player, card)
                || game.trigger_action(pipeline, player, card, 0)
        })
    }

    pub fn menu_button(&mut self, player: PlayerId, arg: &str, method: &str) -> bool {
        self.with_pipeline(|game, pipeline| pipeline.on_menu_command(game, player, arg, method))
    }

    /// Use the card menu item `item` (an action index).
    pub fn menu_item_click(&mut self, player: PlayerId, card: EntityId, item: &str) -> bool {
        let Ok(index) = item.parse::<usize>() else {
            warn!(%player, %card, item, "unknown menu item");
            return false;
        };
        self.with_pipeline(|game, pipeline| game.trigger_action(pipeline, player, card, index))
    }

    /// Dispatch a `{command, args}` message.
    pub fn handle_command(&mut self, player: PlayerId, command: &Command) -> bool {
        let accepted = match command.command.as_str() {
            "cardClicked" => command
                .card_arg(0)
                .is_some_and(|card| self.card_clicked(player, card)),
            "menuButton" => {
                let method = command
                    .text_arg(1)
                    .filter(|method| !method.is_empty())
                    .unwrap_or("menuButton");
                command
                    .text_arg(0)
                    .is_some_and(|arg| self.menu_button(player, arg, method))
            }
            "menuItemClick" => match (command.card_arg(0), command.text_arg(1)) {
                (Some(card), Some(item)) => self.menu_item_click(player, card, item),
                _ => false,
            },
            other => {
                warn!(%player, command = other, "unknown command");
                false
            }
        };
        if !accepted {
            debug!(%player, command = %command.command, "command rejected");
        }
        self.history
            .push(CommandRecord::new(player, command.clone(), self.round, accepted));
        accepted
    }

    /// Actions `player` could use on `card` right now.
    #[must_use]
    pub fn available_actions(&self, player: PlayerId, card: EntityId) -> Vec<AbilityId> {
        let Some(source) = self.card(card) else {
            return Vec::new();
        };
        let controls = match source.location {
            Location::Hand | Location::Shadows => source.owner == player,
            _ => source.controller() == player,
        };
        if !controls {
            return Vec::new();
        }
        self.abilities
            .actions_of(card)
            .into_iter()
            .filter(|&id| self.abilities.is_listening(id) && !self.abilities.limit_reached(id))
            .filter(|&id| {
                let context = AbilityContext::new(id, card, player);
                self.abilities
                    .get(id)
                    .is_some_and(|ability| ability.meets_requirements(self, &context))
            })
            .collect()
    }

    fn trigger_action(&mut self, pipeline: &mut GamePipeline, player: PlayerId, card: EntityId, index: usize) -> bool {
        if !pipeline.allows_actions(player) {
            return false;
        }
        let Some(ability) = self.available_actions(player, card).get(index).copied() else {
            return false;
        };
        info!(%player, %card, %ability, "action triggered");
        self.queue_step(Box::new(AbilityResolver::new(
            ability,
            AbilityContext::new(ability, card, player),
        )));
        pipeline.action_taken(player);
        true
    }

    // === Messages and selection ===

    pub fn add_message(&mut self, template: &str, args: Vec<MessageArg>) {
        let text = render(self, template, &args);
        debug!(message = %text, "chat");
        self.messages.push(ChatMessage::new(text));
    }

    /// Add a message written with `{player}`, `{source}` and `{target}`.
    pub fn add_context_message(
        &mut self,
        template: &str,
        player: PlayerId,
        source: Option<EntityId>,
        targets: &[EntityId],
    ) {
        let text = render_context(self, template, player, source, targets);
        debug!(message = %text, "chat");
        self.messages.push(ChatMessage::new(text));
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Highlight `cards` for every player: they become the only selectable
    /// cards and nothing is selected. Returns the previous selections.
    pub fn highlight_cards(&mut self, cards: &[EntityId]) -> Vec<(PlayerId, Selection)> {
        self.players
            .iter_mut()
            .map(|(id, player)| {
                let saved = player.selection();
                player.selected_cards.clear();
                player.selectable_cards = cards.to_vec();
                (id, saved)
            })
            .collect()
    }

    pub fn restore_selections(&mut self, saved: Vec<(PlayerId, Selection)>) {
        for (player, selection) in saved {
            self.players[player].restore_selection(selection);
        }
    }

    /// Make `cards` the selectable set for every player.
    pub fn set_all_selectable(&mut self, cards: &[EntityId]) {
        for (_, player) in self.players.iter_mut() {
            player.selectable_cards = cards.to_vec();
            player.selected_cards.retain(|card| cards.contains(card));
        }
    }

    // === Winning ===

    /// End the match if a player has reached the winning power total.
    pub fn check_win_condition(&mut self) {
        if self.winner.is_some() {
            return;
        }
        let winner = self
            .players_in_priority_order()
            .into_iter()
            .find(|&player| self.total_power(player) >= self.config.winning_power);
        if let Some(player) = winner {
            self.record_winner(player);
        }
    }

    pub fn record_winner(&mut self, player: PlayerId) {
        if self.winner.is_some() {
            return;
        }
        info!(%player, round = self.round, "match won");
        self.winner = Some(player);
        self.finished = true;
        self.add_message("{0} has won the game", vec![MessageArg::Player(player)]);
    }
}
