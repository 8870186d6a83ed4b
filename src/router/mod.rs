//! Game worker dispatcher.
//!
//! Matches run on worker processes. Workers announce themselves with
//! `HELLO`, answer `PING` with `PONG`, and report finished or abandoned
//! games. The router assigns new games to the least-loaded worker and
//! forwards spectator and connection notices to the worker hosting a game.
//!
//! The transport is abstract: outbound messages go through a
//! [`Publisher`], inbound messages are fed to [`GameRouter::on_message`].

mod dispatcher;
mod error;
mod protocol;

pub use dispatcher::{GameRouter, Publisher, RouterConfig, RouterEvent, Worker, WorkerAddress};
pub use error::RouterError;
pub use protocol::{ConnectFailed, InboundMessage, PlayerLeft, RouterMessage, SpectatorJoin, WorkerHello, WorkerMessage};
