//! Reference-counted property containers.
//!
//! Several effects can grant the same trait, keyword, faction or blank to
//! a card independently. Each grant bumps a count and each removal drops
//! it; a value is present while its count is above zero. Booleans are never
//! stored directly, so one effect ending cannot strip a value another
//! effect still provides.
//!
//! Both containers are backed by `im::OrdMap`, making `clone` O(1). Card
//! snapshots copy these on every reveal and leave-play event.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::data::Keyword;

/// Multiset of values where membership means "at least one grant".
///
/// ```
/// use thrones_engine::cards::ReferenceCountedSet;
///
/// let mut traits = ReferenceCountedSet::new();
/// traits.add("Knight".to_string());
/// traits.add("Knight".to_string());
/// traits.remove(&"Knight".to_string());
/// assert!(traits.contains(&"Knight".to_string()));
///
/// traits.remove(&"Knight".to_string());
/// assert!(!traits.contains(&"Knight".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCountedSet<T: Ord + Clone> {
    counts: OrdMap<T, u32>,
}

impl<T: Ord + Clone> Default for ReferenceCountedSet<T> {
    fn default() -> Self {
        Self {
            counts: OrdMap::new(),
        }
    }
}

impl<T: Ord + Clone> ReferenceCountedSet<T> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one grant of `value`.
    pub fn add(&mut self, value: T) {
        let count = self.counts.get(&value).copied().unwrap_or(0);
        self.counts.insert(value, count + 1);
    }

    /// Retract one grant of `value`. Removing an absent value is a no-op.
    pub fn remove(&mut self, value: &T) {
        match self.counts.get(value).copied() {
            Some(count) if count > 1 => {
                self.counts.insert(value.clone(), count - 1);
            }
            Some(_) => {
                self.counts.remove(value);
            }
            None => {}
        }
    }

    /// Whether at least one grant of `value` is active.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.counts.contains_key(value)
    }

    /// Number of active grants for `value`.
    #[must_use]
    pub fn count(&self, value: &T) -> u32 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Distinct active values, in order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.counts.keys()
    }

    /// Number of distinct active values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Keyword container with trigger modifiers and prized values.
///
/// Keywords are reference counted like traits. Two extra facets ride along:
/// - trigger modifiers ("renown gains 1 additional power") keyed by keyword
/// - prized values, one per active `Prized X` grant
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsProperty {
    keywords: ReferenceCountedSet<Keyword>,
    trigger_modifiers: OrdMap<Keyword, i32>,
    prized: ReferenceCountedSet<u32>,
}

impl KeywordsProperty {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a keyword.
    pub fn add(&mut self, keyword: Keyword) {
        self.keywords.add(keyword);
    }

    /// Grant `Prized X`.
    pub fn add_prized(&mut self, value: u32) {
        self.keywords.add(Keyword::Prized);
        self.prized.add(value);
    }

    /// Retract a keyword grant.
    pub fn remove(&mut self, keyword: Keyword) {
        self.keywords.remove(&keyword);
    }

    /// Retract a `Prized X` grant.
    pub fn remove_prized(&mut self, value: u32) {
        self.keywords.remove(&Keyword::Prized);
        self.prized.remove(&value);
    }

    #[must_use]
    pub fn contains(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Active keywords, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.values()
    }

    /// Total prized value across active grants.
    ///
    /// Each grant contributes its value once, however many sources share it.
    #[must_use]
    pub fn prized_value(&self) -> u32 {
        self.prized.values().sum()
    }

    /// Adjust how many times a keyword triggers.
    pub fn modify_trigger_amount(&mut self, keyword: Keyword, amount: i32) {
        let current = self.trigger_modifiers.get(&keyword).copied().unwrap_or(0);
        let next = current + amount;
        if next == 0 {
            self.trigger_modifiers.remove(&keyword);
        } else {
            self.trigger_modifiers.insert(keyword, next);
        }
    }

    /// Extra triggers for a keyword (may be negative).
    #[must_use]
    pub fn trigger_modifier(&self, keyword: Keyword) -> i32 {
        self.trigger_modifiers.get(&keyword).copied().unwrap_or(0)
    }
}
