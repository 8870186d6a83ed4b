//! Decks and deck validation.
//!
//! - [`Deck`]: Faction, agendas, plot and draw cards with counts
//! - [`DeckValidator`]: Checks a deck against formats and restricted lists
//! - [`Format`]: Deck-size rules per tournament format
//! - [`RestrictedList`]: Banned cards, restricted cards and pods

mod agendas;
mod formats;
mod restricted_list;
mod validator;
mod wrapper;

pub use agendas::{agenda_rules, deck_rules, faction_rules, DeckRule, DeckRules, BANNER_MINIMUM};
pub use formats::{find_format, Format};
pub use restricted_list::{FormatRestrictions, Pod, RestrictedList, RestrictedListResult};
pub use validator::{DeckStatus, DeckValidator, Pack, ValidationReport, UNRESTRICTED};
pub use wrapper::{Deck, DeckCard};
