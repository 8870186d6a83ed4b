//! Card registry for data and implementation lookup.
//!
//! The `CardRegistry` maps a card code to its printed data and, for cards
//! with abilities, the function that builds the card's ability triggers.
//! Card behaviour is a table rather than one type per card: the catalog
//! registers `code → implementation` pairs.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::{DefinitionError, EntityId};
use crate::triggers::AbilityTrigger;

use super::data::CardData;

/// Builds the abilities of one card instance.
pub type CardImplementation = fn(EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError>;

/// One registered card code.
#[derive(Clone, Debug)]
pub struct CardEntry {
    pub data: Rc<CardData>,
    pub implementation: Option<CardImplementation>,

    /// Version the implementation was written against.
    pub version: Option<String>,
}

/// Registry of card data and implementations.
///
/// ## Example
///
/// ```
/// use thrones_engine::cards::{CardData, CardRegistry, CardType, Faction};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardData::new("01001", "A Clash of Kings", CardType::Plot, Faction::Neutral));
///
/// let found = registry.get("01001").unwrap();
/// assert_eq!(found.data.name, "A Clash of Kings");
/// assert!(found.implementation.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, CardEntry>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load card data from a JSON array of card records.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the input is not a list of card records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<CardData> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for data in records {
            registry.register(data);
        }
        Ok(registry)
    }

    /// Register card data. Re-registering a code replaces its data and keeps
    /// any implementation.
    pub fn register(&mut self, data: CardData) {
        let code = data.code.clone();
        let data = Rc::new(data);
        match self.cards.get_mut(&code) {
            Some(entry) => entry.data = data,
            None => {
                self.cards.insert(
                    code,
                    CardEntry {
                        data,
                        implementation: None,
                        version: None,
                    },
                );
            }
        }
    }

    /// Attach an implementation to a registered code.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownCard`] if the code has no data.
    pub fn implement(
        &mut self,
        code: &str,
        version: Option<&str>,
        implementation: CardImplementation,
    ) -> Result<(), DefinitionError> {
        let entry = self
            .cards
            .get_mut(code)
            .ok_or_else(|| DefinitionError::UnknownCard(code.to_string()))?;
        entry.implementation = Some(implementation);
        entry.version = version.map(str::to_string);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&CardEntry> {
        self.cards.get(code)
    }

    #[must_use]
    pub fn data(&self, code: &str) -> Option<Rc<CardData>> {
        self.cards.get(code).map(|entry| Rc::clone(&entry.data))
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.cards.contains_key(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardEntry> {
        self.cards.values()
    }

    /// Build the abilities of a new instance of `code`.
    ///
    /// Cards without an implementation have no abilities.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownCard`] for unregistered codes, or
    /// whatever the implementation reports.
    pub fn abilities_for(&self, code: &str, source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
        let entry = self
            .cards
            .get(code)
            .ok_or_else(|| DefinitionError::UnknownCard(code.to_string()))?;
        match entry.implementation {
            Some(implementation) => implementation(source),
            None => Ok(Vec::new()),
        }
    }
}
