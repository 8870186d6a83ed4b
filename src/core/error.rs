//! Card definition errors.
//!
//! These describe bugs in card implementations, not game conditions. They
//! are returned while abilities are built, so a bad definition fails when
//! content is loaded instead of in the middle of a match.

use thiserror::Error;

use crate::zones::Location;

/// A card implementation that cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A persistent effect declared a location it can never be active in.
    #[error("'{0}' is not a supported effect location.")]
    UnsupportedEffectLocation(Location),

    /// An implementation refers to a card code missing from the card data.
    #[error("no card data for code {0}")]
    UnknownCard(String),

    /// An ability was declared without a required part.
    #[error("ability '{title}' on {code} is invalid: {reason}")]
    InvalidAbility {
        code: String,
        title: String,
        reason: String,
    },
}
