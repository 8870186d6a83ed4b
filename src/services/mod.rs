//! Services over external stores.
//!
//! Stores are traits; the engine ships no backing implementation. Store
//! failures are logged and wrapped into [`ServiceError`].

mod banlist;

pub use banlist::{BanlistEntry, BanlistService, BanlistStore};

use thiserror::Error;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Error occured fetching banlist")]
    Fetch(#[source] StoreError),

    #[error("Error occured saving banlist entry")]
    Save(#[source] StoreError),

    #[error("Error occured removing banlist entry")]
    Remove(#[source] StoreError),

    #[error("{0} is already banned")]
    AlreadyBanned(String),
}
