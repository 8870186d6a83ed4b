//! Least-loaded game dispatcher.

use chrono::{DateTime, TimeDelta, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::error::RouterError;
use super::protocol::{ConnectFailed, InboundMessage, RouterMessage, SpectatorJoin, WorkerHello, WorkerMessage};

/// Outbound transport. Each worker listens on a channel named after it.
pub trait Publisher {
    fn publish(&mut self, channel: &str, payload: String);
}

/// Records every publish, for tests and replay.
impl Publisher for Vec<(String, String)> {
    fn publish(&mut self, channel: &str, payload: String) {
        self.push((channel.to_string(), payload));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Seconds of silence before a worker is pinged, and seconds an
    /// unanswered ping waits before the worker is marked disconnected.
    pub ping_timeout_secs: i64,
    /// Capacity of workers that do not announce one.
    pub default_max_games: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ping_timeout_secs: 60,
            default_max_games: 100,
        }
    }
}

impl RouterConfig {
    #[must_use]
    pub fn with_ping_timeout_secs(mut self, secs: i64) -> Self {
        self.ping_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_default_max_games(mut self, max_games: usize) -> Self {
        self.default_max_games = max_games;
        self
    }

    #[must_use]
    pub fn ping_timeout(&self) -> TimeDelta {
        TimeDelta::seconds(self.ping_timeout_secs)
    }
}

/// A connected game worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Worker {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub protocol: String,
    pub max_games: usize,
    pub games: Vec<String>,
    pub last_seen: DateTime<Utc>,
    /// When the outstanding ping went out. Cleared by any message.
    pub ping_sent: Option<DateTime<Utc>>,
    /// Timed out and not heard from since. Disconnected workers get no
    /// new games.
    pub disconnected: bool,
}

impl Worker {
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.games.len() >= self.max_games
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.disconnected && !self.is_full()
    }

    #[must_use]
    pub fn address(&self) -> WorkerAddress {
        WorkerAddress {
            name: self.name.clone(),
            address: self.address.clone(),
            port: self.port,
            protocol: self.protocol.clone(),
        }
    }
}

/// Where clients connect to reach a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkerAddress {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub protocol: String,
}

/// Something the caller should act on after a message or timeout check.
#[derive(Clone, Debug, PartialEq)]
pub enum RouterEvent {
    WorkerConnected(String),
    /// The worker did not answer a ping; its games are gone.
    WorkerTimedOut {
        worker: String,
        games: Vec<String>,
    },
    GameOver(Value),
    Rematch(Value),
    GameClosed(String),
    PlayerLeft {
        game_id: String,
        player: String,
    },
}

/// Assigns games to workers and relays the worker protocol.
///
/// The router keeps no clock: callers pass `now` with each message and
/// call [`GameRouter::check_timeouts`] periodically.
pub struct GameRouter<P: Publisher> {
    config: RouterConfig,
    publisher: P,
    workers: FxHashMap<String, Worker>,
}

impl<P: Publisher> GameRouter<P> {
    pub fn new(config: RouterConfig, publisher: P) -> Self {
        Self {
            config,
            publisher,
            workers: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    #[must_use]
    pub fn worker(&self, name: &str) -> Option<&Worker> {
        self.workers.get(name)
    }

    /// Connected workers, by name.
    #[must_use]
    pub fn workers(&self) -> Vec<&Worker> {
        let mut workers: Vec<_> = self.workers.values().collect();
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        workers
    }

    /// The worker hosting `game_id`.
    #[must_use]
    pub fn worker_for_game(&self, game_id: &str) -> Option<&Worker> {
        self.workers
            .values()
            .find(|worker| worker.games.iter().any(|game| game == game_id))
    }

    // === Inbound ===

    /// Handle one raw worker message.
    ///
    /// # Errors
    ///
    /// [`RouterError::Decode`] for malformed messages and
    /// [`RouterError::UnknownWorker`] for messages from workers that never
    /// said `HELLO`.
    pub fn on_message(&mut self, raw: &str, now: DateTime<Utc>) -> Result<Vec<RouterEvent>, RouterError> {
        let inbound = InboundMessage::parse(raw).map_err(|err| {
            warn!(%err, "dropping invalid worker message");
            RouterError::Decode(err)
        })?;
        self.handle(inbound, now)
    }

    /// Handle one parsed worker message.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownWorker`] for messages from workers that never
    /// said `HELLO`.
    pub fn handle(&mut self, inbound: InboundMessage, now: DateTime<Utc>) -> Result<Vec<RouterEvent>, RouterError> {
        let InboundMessage { identity, message } = inbound;
        debug!(worker = %identity, command = message.command(), "worker message");

        if let WorkerMessage::Hello(hello) = message {
            return Ok(vec![self.register(&identity, hello, now)]);
        }

        let Some(worker) = self.workers.get_mut(&identity) else {
            warn!(worker = %identity, "message from unknown worker");
            return Err(RouterError::UnknownWorker(identity));
        };
        if worker.disconnected {
            info!(worker = %identity, "worker came back");
            worker.disconnected = false;
        }
        worker.last_seen = now;
        worker.ping_sent = None;

        let event = match message {
            WorkerMessage::Hello(_) | WorkerMessage::Pong => None,
            WorkerMessage::GameOver(game) => {
                if let Some(id) = game_id_of(&game) {
                    worker.games.retain(|hosted| *hosted != id);
                }
                Some(RouterEvent::GameOver(game))
            }
            WorkerMessage::Rematch(game) => {
                if let Some(id) = game_id_of(&game) {
                    worker.games.retain(|hosted| *hosted != id);
                }
                Some(RouterEvent::Rematch(game))
            }
            WorkerMessage::GameClosed(game_id) => {
                worker.games.retain(|hosted| *hosted != game_id);
                Some(RouterEvent::GameClosed(game_id))
            }
            WorkerMessage::PlayerLeft(left) => (!left.spectator).then_some(RouterEvent::PlayerLeft {
                game_id: left.game_id,
                player: left.player,
            }),
        };
        Ok(event.into_iter().collect())
    }

    /// A later `HELLO` from the same name replaces the earlier worker.
    fn register(&mut self, identity: &str, hello: WorkerHello, now: DateTime<Utc>) -> RouterEvent {
        let worker = Worker {
            name: identity.to_string(),
            address: hello.address,
            port: hello.port,
            protocol: hello.protocol,
            max_games: hello.max_games.unwrap_or(self.config.default_max_games),
            games: hello.games,
            last_seen: now,
            ping_sent: None,
            disconnected: false,
        };
        info!(worker = %identity, address = %worker.address, games = worker.games.len(), "worker connected");
        self.workers.insert(identity.to_string(), worker);
        RouterEvent::WorkerConnected(identity.to_string())
    }

    /// Run the heartbeat.
    ///
    /// A worker silent for longer than the ping timeout is pinged. A worker
    /// whose ping has gone unanswered for longer than the timeout is marked
    /// disconnected and its games reported lost. The record is kept so a
    /// later message can bring it back.
    pub fn check_timeouts(&mut self, now: DateTime<Utc>) -> Vec<RouterEvent> {
        let timeout = self.config.ping_timeout();
        let mut names: Vec<String> = self.workers.keys().cloned().collect();
        names.sort();

        let mut events = Vec::new();
        let mut to_ping = Vec::new();
        for name in names {
            let Some(worker) = self.workers.get_mut(&name) else {
                continue;
            };
            if worker.disconnected {
                continue;
            }
            let ping_sent = worker.ping_sent;
            match ping_sent {
                Some(sent) if now - sent > timeout => {
                    warn!(worker = %name, games = worker.games.len(), "worker timed out");
                    worker.disconnected = true;
                    worker.ping_sent = None;
                    events.push(RouterEvent::WorkerTimedOut {
                        worker: name,
                        games: std::mem::take(&mut worker.games),
                    });
                }
                Some(_) => {}
                None if now - worker.last_seen > timeout => {
                    worker.ping_sent = Some(now);
                    to_ping.push(name);
                }
                None => {}
            }
        }

        for name in to_ping {
            // Ping failures are already logged and retried on the next check.
            if self.send(&name, &RouterMessage::Ping).is_err() {
                if let Some(worker) = self.workers.get_mut(&name) {
                    worker.ping_sent = None;
                }
            }
        }
        events
    }

    // === Outbound ===

    /// Start a game on the least-loaded worker with room for it.
    ///
    /// Returns `Ok(None)` when every worker is full or none are connected.
    ///
    /// # Errors
    ///
    /// [`RouterError::Encode`] if `game` cannot be encoded; the game is not
    /// assigned.
    pub fn start_game<G: Serialize>(&mut self, game_id: &str, game: &G) -> Result<Option<WorkerAddress>, RouterError> {
        let Some(name) = self.least_loaded().map(|worker| worker.name.clone()) else {
            warn!(game = %game_id, "no workers available to start game");
            return Ok(None);
        };
        let details = serde_json::to_value(game).map_err(|source| {
            error!(game = %game_id, %source, "could not encode game details");
            RouterError::Encode {
                command: "STARTGAME",
                source,
            }
        })?;
        self.send(&name, &RouterMessage::StartGame(details))?;

        let Some(worker) = self.workers.get_mut(&name) else {
            return Ok(None);
        };
        worker.games.push(game_id.to_string());
        info!(game = %game_id, worker = %name, load = worker.games.len(), "game assigned");
        Ok(Some(worker.address()))
    }

    fn least_loaded(&self) -> Option<&Worker> {
        self.workers
            .values()
            .filter(|worker| worker.is_available())
            .min_by(|a, b| a.games.len().cmp(&b.games.len()).then_with(|| a.name.cmp(&b.name)))
    }

    /// Tell the game's worker a spectator is joining.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownGame`] if no worker hosts the game.
    pub fn add_spectator(&mut self, game_id: &str, user: &str) -> Result<(), RouterError> {
        let message = RouterMessage::Spectator(SpectatorJoin {
            game_id: game_id.to_string(),
            user: user.to_string(),
        });
        self.send_to_game(game_id, &message)
    }

    /// Tell the game's worker a player could not connect.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownGame`] if no worker hosts the game.
    pub fn notify_failed_connect(&mut self, game_id: &str, username: &str) -> Result<(), RouterError> {
        let message = RouterMessage::ConnectFailed(ConnectFailed {
            game_id: game_id.to_string(),
            username: username.to_string(),
        });
        self.send_to_game(game_id, &message)
    }

    /// Ask the game's worker to close it.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownGame`] if no worker hosts the game.
    pub fn close_game(&mut self, game_id: &str) -> Result<(), RouterError> {
        self.send_to_game(game_id, &RouterMessage::CloseGame(game_id.to_string()))?;
        for worker in self.workers.values_mut() {
            worker.games.retain(|hosted| hosted != game_id);
        }
        Ok(())
    }

    /// Ask a worker to restart.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownWorker`] for names never registered.
    pub fn restart_worker(&mut self, name: &str) -> Result<(), RouterError> {
        if !self.workers.contains_key(name) {
            return Err(RouterError::UnknownWorker(name.to_string()));
        }
        self.send(name, &RouterMessage::Restart)
    }

    fn send_to_game(&mut self, game_id: &str, message: &RouterMessage) -> Result<(), RouterError> {
        let Some(name) = self.worker_for_game(game_id).map(|worker| worker.name.clone()) else {
            warn!(game = %game_id, command = message.command(), "no worker hosts game");
            return Err(RouterError::UnknownGame(game_id.to_string()));
        };
        self.send(&name, message)
    }

    /// Encode and publish. Messages that fail to encode are logged and
    /// dropped.
    fn send(&mut self, worker: &str, message: &RouterMessage) -> Result<(), RouterError> {
        let payload = serde_json::to_string(message).map_err(|source| {
            error!(worker, command = message.command(), %source, "could not encode router message");
            RouterError::Encode {
                command: message.command(),
                source,
            }
        })?;
        debug!(worker, command = message.command(), "publishing");
        self.publisher.publish(worker, payload);
        Ok(())
    }
}

fn game_id_of(game: &Value) -> Option<String> {
    game.get("id")
        .or_else(|| game.get("gameId"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn hello(name: &str, games: &[&str]) -> String {
        json!({
            "identity": name,
            "command": "HELLO",
            "arg": {"name": name, "address": "127.0.0.1", "port": 9000, "games": games}
        })
        .to_string()
    }

    fn router() -> GameRouter<Vec<(String, String)>> {
        GameRouter::new(RouterConfig::default(), Vec::new())
    }

    #[test]
    fn test_hello_registers_worker() {
        let mut router = router();
        let events = router.on_message(&hello("w1", &["g1"]), at(0)).unwrap();
        assert_eq!(events, vec![RouterEvent::WorkerConnected("w1".into())]);
        assert_eq!(router.worker("w1").unwrap().games, vec!["g1".to_string()]);
        assert_eq!(router.worker("w1").unwrap().max_games, 100);
    }

    #[test]
    fn test_least_loaded_worker_gets_the_game() {
        let mut router = router();
        router.on_message(&hello("w1", &["a", "b"]), at(0)).unwrap();
        router.on_message(&hello("w2", &["c"]), at(0)).unwrap();

        let address = router.start_game("g9", &json!({"id": "g9"})).unwrap().unwrap();
        assert_eq!(address.name, "w2");
        assert_eq!(router.publisher().len(), 1);
        assert_eq!(router.publisher()[0].0, "w2");
        assert!(router.publisher()[0].1.contains("STARTGAME"));
    }

    #[test]
    fn test_no_workers() {
        let mut router = router();
        assert_eq!(router.start_game("g1", &json!({})).unwrap(), None);
    }

    #[test]
    fn test_message_from_unknown_worker() {
        let mut router = router();
        let result = router.on_message(r#"{"identity": "ghost", "command": "PONG"}"#, at(0));
        assert!(matches!(result, Err(RouterError::UnknownWorker(name)) if name == "ghost"));
    }

    #[test]
    fn test_game_closed_frees_capacity() {
        let mut router = router();
        router.on_message(&hello("w1", &["g1"]), at(0)).unwrap();
        let events = router
            .on_message(r#"{"identity": "w1", "command": "GAMECLOSED", "arg": "g1"}"#, at(1))
            .unwrap();
        assert_eq!(events, vec![RouterEvent::GameClosed("g1".into())]);
        assert!(router.worker("w1").unwrap().games.is_empty());
    }

    #[test]
    fn test_spectators_leaving_are_ignored() {
        let mut router = router();
        router.on_message(&hello("w1", &[]), at(0)).unwrap();
        let raw = r#"{"identity": "w1", "command": "PLAYERLEFT", "arg": {"gameId": "g1", "player": "bob", "spectator": true}}"#;
        assert!(router.on_message(raw, at(1)).unwrap().is_empty());
    }

    #[test]
    fn test_timeouts_ping_only_silent_workers() {
        let mut router = router();
        router.on_message(&hello("old", &["g1"]), at(0)).unwrap();
        router.on_message(&hello("fresh", &[]), at(50)).unwrap();

        assert!(router.check_timeouts(at(61)).is_empty());
        assert_eq!(router.worker("old").unwrap().ping_sent, Some(at(61)));
        assert!(!router.worker("old").unwrap().disconnected);
        assert_eq!(router.worker("fresh").unwrap().ping_sent, None);
        assert_eq!(router.publisher().as_slice(), &[("old".to_string(), r#"{"command":"PING"}"#.to_string())]);

        // an outstanding ping is not repeated
        assert!(router.check_timeouts(at(100)).is_empty());
        assert_eq!(router.publisher().len(), 1);
    }

    #[test]
    fn test_unanswered_ping_disconnects_worker() {
        let mut router = router();
        router.on_message(&hello("w1", &["g1"]), at(0)).unwrap();
        router.check_timeouts(at(61));

        let events = router.check_timeouts(at(122));
        assert_eq!(
            events,
            vec![RouterEvent::WorkerTimedOut {
                worker: "w1".into(),
                games: vec!["g1".into()],
            }]
        );
        let worker = router.worker("w1").unwrap();
        assert!(worker.disconnected);
        assert!(worker.games.is_empty());
        assert_eq!(router.start_game("g2", &json!({})).unwrap(), None);
        assert!(router.check_timeouts(at(300)).is_empty());
    }

    #[test]
    fn test_pong_keeps_worker_alive() {
        let mut router = router();
        router.on_message(&hello("w1", &[]), at(0)).unwrap();
        router.check_timeouts(at(61));
        router.on_message(r#"{"identity": "w1", "command": "PONG"}"#, at(70)).unwrap();
        assert_eq!(router.worker("w1").unwrap().ping_sent, None);

        assert!(router.check_timeouts(at(122)).is_empty());
        assert!(!router.worker("w1").unwrap().disconnected);
    }

    #[test]
    fn test_message_brings_disconnected_worker_back() {
        let mut router = router();
        router.on_message(&hello("w1", &[]), at(0)).unwrap();
        router.check_timeouts(at(61));
        router.check_timeouts(at(122));
        assert!(router.worker("w1").unwrap().disconnected);

        router.on_message(r#"{"identity": "w1", "command": "PONG"}"#, at(130)).unwrap();
        assert!(!router.worker("w1").unwrap().disconnected);
        assert_eq!(router.start_game("g1", &json!({})).unwrap().unwrap().name, "w1");
    }

    #[test]
    fn test_close_game_routes_to_host() {
        let mut router = router();
        router.on_message(&hello("w1", &["g1"]), at(0)).unwrap();
        router.close_game("g1").unwrap();
        assert_eq!(router.publisher()[0].0, "w1");
        assert!(router.worker("w1").unwrap().games.is_empty());
        assert!(matches!(router.close_game("g1"), Err(RouterError::UnknownGame(_))));
    }
}
