//! Worker protocol messages.
//!
//! Every message is JSON `{"command": NAME, "arg": ...}`. Workers also send
//! their `identity` with each message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connection details a worker announces in `HELLO`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerHello {
    pub name: String,
    pub address: String,
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Games the worker already hosts, e.g. after a router restart.
    #[serde(default)]
    pub games: Vec<String>,
    #[serde(default)]
    pub max_games: Option<usize>,
}

fn default_protocol() -> String {
    "https".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeft {
    pub game_id: String,
    pub player: String,
    #[serde(default)]
    pub spectator: bool,
}

/// Messages workers send to the router.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "UPPERCASE")]
pub enum WorkerMessage {
    Hello(WorkerHello),
    Pong,
    /// Finished game, as the worker saved it.
    #[serde(rename = "GAMEOVER")]
    GameOver(Value),
    Rematch(Value),
    #[serde(rename = "GAMECLOSED")]
    GameClosed(String),
    #[serde(rename = "PLAYERLEFT")]
    PlayerLeft(PlayerLeft),
}

impl WorkerMessage {
    #[must_use]
    pub fn command(&self) -> &'static str {
        match self {
            Self::Hello(_) => "HELLO",
            Self::Pong => "PONG",
            Self::GameOver(_) => "GAMEOVER",
            Self::Rematch(_) => "REMATCH",
            Self::GameClosed(_) => "GAMECLOSED",
            Self::PlayerLeft(_) => "PLAYERLEFT",
        }
    }
}

/// A worker message with the sender's name.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundMessage {
    pub identity: String,
    pub message: WorkerMessage,
}

#[derive(Deserialize)]
struct Identity {
    identity: String,
}

impl InboundMessage {
    /// Parse a raw worker message.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON, a missing identity or an
    /// unknown command.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        let Identity { identity } = serde_json::from_value(value.clone())?;
        let message = serde_json::from_value(value)?;
        Ok(Self { identity, message })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectatorJoin {
    pub game_id: String,
    pub user: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectFailed {
    pub game_id: String,
    pub username: String,
}

/// Messages the router sends to a worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "UPPERCASE")]
pub enum RouterMessage {
    /// Game details, opaque to the router.
    #[serde(rename = "STARTGAME")]
    StartGame(Value),
    Spectator(SpectatorJoin),
    #[serde(rename = "CONNECTFAILED")]
    ConnectFailed(ConnectFailed),
    #[serde(rename = "CLOSEGAME")]
    CloseGame(String),
    Restart,
    Ping,
}

impl RouterMessage {
    #[must_use]
    pub fn command(&self) -> &'static str {
        match self {
            Self::StartGame(_) => "STARTGAME",
            Self::Spectator(_) => "SPECTATOR",
            Self::ConnectFailed(_) => "CONNECTFAILED",
            Self::CloseGame(_) => "CLOSEGAME",
            Self::Restart => "RESTART",
            Self::Ping => "PING",
        }
    }
}
