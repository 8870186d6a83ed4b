//! Card instances - runtime card state.
//!
//! `Card` is one physical card in a match: identity, location, control,
//! tokens and every property effects can change. It does not hold a
//! reference back to the match; operations needing game-wide state live on
//! [`Game`](crate::game::Game) and receive the card by id.
//!
//! ## Moving
//!
//! [`Card::move_to`] is the single entry point for location changes. It
//! updates the card and reports what changed in a [`MoveOutcome`]; the match
//! applies registration changes and raises `CardMoved` from that outcome.
//!
//! ## Snapshots
//!
//! All collections are persistent (`im`) or small, so
//! [`Card::create_snapshot`] is a cheap independent copy used to compare
//! "state when revealed" against the present.

use std::rc::Rc;

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::data::{CardData, CardType, Faction, Keyword, PrintedKeyword};
use super::properties::{KeywordsProperty, ReferenceCountedSet};
use super::restriction::{AbilityRestriction, ActionKind, ResolutionStage};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::zones::Location;

/// Named token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    Gold,
    Poison,
    Betrayal,
    Vengeance,
    Kiss,
    Bell,
    Ear,
    Journey,
    Ghost,
}

/// Blank flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlankKind {
    Full,
    ExcludingTraits,
}

/// One entry of the control stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEntry {
    pub controller: PlayerId,
    /// Effect source for layered control; `None` for permanent control.
    pub source: Option<EntityId>,
}

/// A faction the card gained or lost relative to its printing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionStatus {
    pub faction: Faction,
    pub status: FactionChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactionChange {
    Gained,
    Lost,
}

/// How a move changes the card's event registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationChange {
    Register,
    Unregister,
    Unchanged,
}

/// Everything a `move_to` changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub card: EntityId,
    pub original_location: Location,
    pub new_location: Location,
    pub original_parent: Option<EntityId>,
    pub parent_changed: bool,
    pub facedown_changed: bool,
    pub registration: RegistrationChange,
}

impl MoveOutcome {
    /// Whether the move is observable and `CardMoved` must be raised.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.original_location != self.new_location
            || self.parent_changed
            || self.facedown_changed
    }
}

/// A card instance in a match.
#[derive(Clone, Debug)]
pub struct Card {
    /// Unique instance id.
    pub id: EntityId,

    /// Player who started the match with this card.
    pub owner: PlayerId,

    data: Rc<CardData>,

    /// Abilities were loaded from an implementation.
    implemented: bool,

    /// Version of the loaded implementation, if any.
    implementation_version: Option<String>,

    control_stack: Vec<ControlEntry>,

    pub location: Location,
    pub parent: Option<EntityId>,

    /// Attachments hosted by this card.
    pub attachments: Vec<EntityId>,

    /// Duplicates hosted by this card.
    pub dupes: Vec<EntityId>,

    pub facedown: bool,
    pub kneeled: bool,

    /// Entered play this round.
    pub new: bool,

    power: u32,
    tokens: OrdMap<Token, u32>,

    traits: ReferenceCountedSet<String>,
    keywords: KeywordsProperty,
    factions: ReferenceCountedSet<Faction>,
    blanks: ReferenceCountedSet<BlankKind>,
    loses_aspects: ReferenceCountedSet<String>,
    restrictions: Vec<AbilityRestriction>,

    printed_keywords: Vec<PrintedKeyword>,
    strength_modifier: i32,
    gold_modifier: i32,
    card_type_override: Option<CardType>,
}

impl Card {
    /// Create a card in its owner's draw deck.
    ///
    /// Printed traits and faction are granted once each; printed keywords
    /// are parsed here but applied by an any-location persistent effect.
    #[must_use]
    pub fn new(id: EntityId, owner: PlayerId, data: Rc<CardData>) -> Self {
        let mut traits = ReferenceCountedSet::new();
        for name in &data.traits {
            traits.add(name.clone());
        }

        let mut factions = ReferenceCountedSet::new();
        factions.add(data.faction);

        let printed_keywords = super::data::parse_keywords(&data.text);

        Self {
            id,
            owner,
            data,
            implemented: false,
            implementation_version: None,
            control_stack: Vec::new(),
            location: Location::DrawDeck,
            parent: None,
            attachments: Vec::new(),
            dupes: Vec::new(),
            facedown: false,
            kneeled: false,
            new: false,
            power: 0,
            tokens: OrdMap::new(),
            traits,
            keywords: KeywordsProperty::new(),
            factions,
            blanks: ReferenceCountedSet::new(),
            loses_aspects: ReferenceCountedSet::new(),
            restrictions: Vec::new(),
            printed_keywords,
            strength_modifier: 0,
            gold_modifier: 0,
            card_type_override: None,
        }
    }

    /// Mark the card as implemented at `version` (builder pattern).
    #[must_use]
    pub fn with_implementation(mut self, version: Option<String>) -> Self {
        self.implemented = true;
        self.implementation_version = version;
        self
    }

    /// Start the card in a given location (builder pattern).
    #[must_use]
    pub fn in_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    // === Printed data ===

    #[must_use]
    pub fn data(&self) -> &CardData {
        &self.data
    }

    #[must_use]
    pub fn shared_data(&self) -> Rc<CardData> {
        Rc::clone(&self.data)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.data.code
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.name
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.data.display_label()
    }

    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.data.unique
    }

    #[must_use]
    pub fn is_loyal(&self) -> bool {
        self.data.loyal
    }

    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.implemented
    }

    #[must_use]
    pub fn implementation_version(&self) -> Option<&str> {
        self.implementation_version.as_deref()
    }

    /// Current type, honouring "treated as a ..." effects.
    #[must_use]
    pub fn card_type(&self) -> CardType {
        self.card_type_override.unwrap_or(self.data.card_type)
    }

    #[must_use]
    pub fn printed_type(&self) -> CardType {
        self.data.card_type
    }

    pub fn set_card_type(&mut self, card_type: Option<CardType>) {
        self.card_type_override = card_type;
    }

    #[must_use]
    pub fn printed_keywords(&self) -> &[PrintedKeyword] {
        &self.printed_keywords
    }

    /// Same name, so the two count as copies.
    #[must_use]
    pub fn is_copy_of(&self, other: &Card) -> bool {
        self.data.name == other.data.name
    }

    // === Location ===

    /// Move this card to `target` under `parent`.
    ///
    /// In order: clear tokens and power unless the location is unchanged,
    /// update location and parent, compute the registration change, and
    /// turn the card face up unless it stays in the play area. Detaching
    /// from the old parent's attachment list and raising `CardMoved` are
    /// done by the match from the returned outcome.
    pub fn move_to(
        &mut self,
        target: Location,
        parent: Option<EntityId>,
        was_facedown: bool,
    ) -> MoveOutcome {
        let original_location = self.location;
        let original_parent = self.parent;

        if original_location != target {
            self.clear_tokens();
        }

        self.location = target;
        self.parent = parent;

        let registration = match (original_location.handles_events(), target.handles_events()) {
            (false, true) => RegistrationChange::Register,
            (true, false) => RegistrationChange::Unregister,
            _ => RegistrationChange::Unchanged,
        };

        if target != Location::PlayArea {
            self.facedown = false;
        }

        MoveOutcome {
            card: self.id,
            original_location,
            new_location: target,
            original_parent,
            parent_changed: original_parent != parent,
            facedown_changed: was_facedown != self.facedown,
            registration,
        }
    }

    /// Detach a child card from this host.
    pub fn remove_child(&mut self, child: EntityId) {
        self.attachments.retain(|&c| c != child);
        self.dupes.retain(|&c| c != child);
    }

    /// Independent copy of the card's current state.
    #[must_use]
    pub fn create_snapshot(&self) -> Card {
        self.clone()
    }

    // === Control ===

    /// Current controller: top of the control stack, or the owner.
    #[must_use]
    pub fn controller(&self) -> PlayerId {
        self.control_stack
            .last()
            .map_or(self.owner, |entry| entry.controller)
    }

    #[must_use]
    pub fn control_stack(&self) -> &[ControlEntry] {
        &self.control_stack
    }

    /// Take control of this card.
    ///
    /// Without a source, control by the owner resets the stack and control by
    /// anyone else replaces it. With a source the entry is layered on top and
    /// can be reverted by that source.
    pub fn take_control(&mut self, controller: PlayerId, source: Option<EntityId>) {
        match source {
            None if controller == self.owner => self.control_stack.clear(),
            None => {
                self.control_stack = vec![ControlEntry {
                    controller,
                    source: None,
                }];
            }
            Some(_) => self.control_stack.push(ControlEntry { controller, source }),
        }
    }

    /// Remove every control entry placed by `source`.
    pub fn revert_control(&mut self, source: EntityId) {
        self.control_stack
            .retain(|entry| entry.source != Some(source));
    }

    // === Power and tokens ===

    #[must_use]
    pub fn power(&self) -> u32 {
        self.power
    }

    /// Add (or with a negative amount remove) power, never below zero.
    pub fn modify_power(&mut self, amount: i32) {
        self.power = (self.power as i64 + amount as i64).max(0) as u32;
    }

    #[must_use]
    pub fn tokens(&self) -> &OrdMap<Token, u32> {
        &self.tokens
    }

    /// Adjust a token count, clamping at zero and pruning empty entries.
    pub fn modify_token(&mut self, token: Token, amount: i32) {
        let current = self.tokens.get(&token).copied().unwrap_or(0) as i64;
        let next = (current + amount as i64).max(0) as u32;
        if next == 0 {
            self.tokens.remove(&token);
        } else {
            self.tokens.insert(token, next);
        }
    }

    #[must_use]
    pub fn has_token(&self, token: Token) -> bool {
        self.tokens.contains_key(&token)
    }

    #[must_use]
    pub fn token_count(&self, token: Token) -> u32 {
        self.tokens.get(&token).copied().unwrap_or(0)
    }

    /// Gold tokens placed on this card.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.token_count(Token::Gold)
    }

    /// Remove all tokens and power.
    pub fn clear_tokens(&mut self) {
        self.tokens = OrdMap::new();
        self.power = 0;
    }

    // === Traits ===

    pub fn add_trait(&mut self, name: impl Into<String>) {
        self.traits.add(name.into());
    }

    pub fn remove_trait(&mut self, name: &str) {
        self.traits.remove(&name.to_string());
    }

    /// Trait check, false on a full blank or after losing the traits aspect.
    #[must_use]
    pub fn has_trait(&self, name: &str) -> bool {
        if self.loses_aspects.contains(&"traits".to_string()) {
            return false;
        }
        !self.is_full_blank() && self.traits.contains(&name.to_string())
    }

    #[must_use]
    pub fn traits(&self) -> Vec<&str> {
        if self.loses_aspects.contains(&"traits".to_string()) {
            return Vec::new();
        }
        self.traits.values().map(String::as_str).collect()
    }

    // === Keywords ===

    pub fn add_keyword(&mut self, keyword: Keyword) {
        self.keywords.add(keyword);
    }

    pub fn remove_keyword(&mut self, keyword: Keyword) {
        self.keywords.remove(keyword);
    }

    /// Apply a printed keyword grant, including its prized value.
    pub fn add_printed_keyword(&mut self, printed: PrintedKeyword) {
        match printed.keyword {
            Keyword::Prized => self.keywords.add_prized(printed.value),
            keyword => self.keywords.add(keyword),
        }
    }

    pub fn remove_printed_keyword(&mut self, printed: PrintedKeyword) {
        match printed.keyword {
            Keyword::Prized => self.keywords.remove_prized(printed.value),
            keyword => self.keywords.remove(keyword),
        }
    }

    /// Keyword check, false after losing the keywords aspect.
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        if self.loses_aspects.contains(&"keywords".to_string()) {
            return false;
        }
        self.keywords.contains(keyword)
    }

    #[must_use]
    pub fn keywords(&self) -> Vec<Keyword> {
        self.keywords.values().copied().collect()
    }

    #[must_use]
    pub fn prized_value(&self) -> u32 {
        self.keywords.prized_value()
    }

    pub fn modify_keyword_trigger_amount(&mut self, keyword: Keyword, amount: i32) {
        self.keywords.modify_trigger_amount(keyword, amount);
    }

    #[must_use]
    pub fn keyword_trigger_modifier(&self, keyword: Keyword) -> i32 {
        self.keywords.trigger_modifier(keyword)
    }

    // === Factions ===

    pub fn add_faction(&mut self, faction: Faction) {
        self.factions.add(faction);
    }

    pub fn remove_faction(&mut self, faction: Faction) {
        self.factions.remove(&faction);
    }

    /// Faction check honouring lost aspects.
    ///
    /// Neutral means holding none of the eight factions once lost
    /// `factions.<name>` aspects are taken into account.
    #[must_use]
    pub fn is_faction(&self, faction: Faction) -> bool {
        if self.loses_aspects.contains(&"factions".to_string()) {
            return faction == Faction::Neutral;
        }

        if faction == Faction::Neutral {
            return Faction::ALL
                .iter()
                .all(|&f| !self.factions.contains(&f) || self.lost_faction(f));
        }

        self.factions.contains(&faction) && !self.lost_faction(faction)
    }

    fn lost_faction(&self, faction: Faction) -> bool {
        self.loses_aspects
            .contains(&format!("factions.{}", faction.code()))
    }

    /// Current factions, or `[Neutral]` when it has none.
    #[must_use]
    pub fn factions(&self) -> Vec<Faction> {
        let factions: Vec<_> = Faction::ALL
            .into_iter()
            .filter(|&f| self.is_faction(f))
            .collect();
        if factions.is_empty() {
            vec![Faction::Neutral]
        } else {
            factions
        }
    }

    /// Factions gained or lost relative to the printed faction.
    #[must_use]
    pub fn faction_status(&self) -> Vec<FactionStatus> {
        let printed = self.data.faction;
        let mut status: Vec<_> = Faction::ALL
            .into_iter()
            .filter(|&f| f != printed && self.is_faction(f))
            .map(|faction| FactionStatus {
                faction,
                status: FactionChange::Gained,
            })
            .collect();

        if printed != Faction::Neutral && !self.is_faction(printed) {
            status.push(FactionStatus {
                faction: printed,
                status: FactionChange::Lost,
            });
        }

        status
    }

    // === Blanks and aspects ===

    /// Add a blank grant. Returns `true` if the card just became blank.
    pub fn set_blank(&mut self, kind: BlankKind) -> bool {
        let before = self.is_any_blank();
        self.blanks.add(kind);
        !before && self.is_any_blank()
    }

    /// Remove a blank grant. Returns `true` if the card is no longer blank.
    pub fn clear_blank(&mut self, kind: BlankKind) -> bool {
        let before = self.is_any_blank();
        self.blanks.remove(&kind);
        before && !self.is_any_blank()
    }

    #[must_use]
    pub fn is_full_blank(&self) -> bool {
        self.blanks.contains(&BlankKind::Full)
    }

    #[must_use]
    pub fn is_blank_excluding_traits(&self) -> bool {
        self.blanks.contains(&BlankKind::ExcludingTraits)
    }

    #[must_use]
    pub fn is_any_blank(&self) -> bool {
        self.is_full_blank() || self.is_blank_excluding_traits()
    }

    /// Lose an aspect (`"traits"`, `"keywords"`, `"factions"`,
    /// `"factions.stark"`, or a restriction name).
    pub fn lose_aspect(&mut self, aspect: impl Into<String>) {
        self.loses_aspects.add(aspect.into());
    }

    pub fn restore_aspect(&mut self, aspect: &str) {
        self.loses_aspects.remove(&aspect.to_string());
    }

    #[must_use]
    pub fn has_lost_aspect(&self, aspect: &str) -> bool {
        self.loses_aspects.contains(&aspect.to_string())
    }

    // === Restrictions ===

    pub fn add_restriction(&mut self, restriction: AbilityRestriction) {
        self.restrictions.push(restriction);
    }

    /// Remove the first restriction equal to `restriction`.
    pub fn remove_restriction(&mut self, restriction: &AbilityRestriction) {
        if let Some(index) = self.restrictions.iter().position(|r| r == restriction) {
            self.restrictions.remove(index);
        }
    }

    /// Whether `action` may affect this card at `stage`.
    ///
    /// A restriction named after an aspect the card lost is ignored.
    #[must_use]
    pub fn allow_game_action(&self, action: ActionKind, stage: ResolutionStage) -> bool {
        !self.restrictions.iter().any(|restriction| {
            let lost = restriction
                .name
                .as_deref()
                .is_some_and(|name| self.has_lost_aspect(name));
            !lost && restriction.is_match(action, stage)
        })
    }

    // === Stats ===

    /// Current strength, never below zero.
    #[must_use]
    pub fn strength(&self) -> i32 {
        (self.data.strength.unwrap_or(0) + self.strength_modifier).max(0)
    }

    pub fn modify_strength(&mut self, amount: i32) {
        self.strength_modifier += amount;
    }

    /// Plot income after modifiers.
    #[must_use]
    pub fn income(&self) -> i32 {
        self.data.plot_stats.map_or(0, |stats| stats.income) + self.gold_modifier
    }

    pub fn modify_gold_income(&mut self, amount: i32) {
        self.gold_modifier += amount;
    }

    #[must_use]
    pub fn initiative(&self) -> i32 {
        self.data.plot_stats.map_or(0, |stats| stats.initiative)
    }

    #[must_use]
    pub fn reserve(&self) -> i32 {
        self.data.plot_stats.map_or(0, |stats| stats.reserve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::data::CardData;

    fn character() -> Card {
        let data = CardData::new("01105", "Doran Martell", CardType::Character, Faction::Martell)
            .with_trait("Lord")
            .with_strength(5);
        Card::new(EntityId(1), PlayerId(0), Rc::new(data))
    }

    #[test]
    fn test_modify_token_clamps_and_prunes() {
        let mut card = character();
        card.modify_token(Token::Gold, 2);
        card.modify_token(Token::Gold, -5);

        assert!(!card.has_token(Token::Gold));
        assert!(card.tokens().is_empty());
    }

    #[test]
    fn test_move_to_same_location_is_not_a_change() {
        let mut card = character().in_location(Location::PlayArea);
        card.modify_power(2);

        let outcome = card.move_to(Location::PlayArea, None, false);
        assert!(!outcome.is_change());
        assert_eq!(outcome.registration, RegistrationChange::Unchanged);
        assert_eq!(card.power(), 2);
    }

    #[test]
    fn test_move_out_of_play_clears_tokens() {
        let mut card = character().in_location(Location::PlayArea);
        card.modify_power(3);
        card.modify_token(Token::Gold, 1);
        card.facedown = true;

        let outcome = card.move_to(Location::DiscardPile, None, true);
        assert!(outcome.is_change());
        assert_eq!(outcome.registration, RegistrationChange::Unregister);
        assert_eq!(card.power(), 0);
        assert!(card.tokens().is_empty());
        assert!(!card.facedown);
    }

    #[test]
    fn test_move_into_play_registers() {
        let mut card = character().in_location(Location::Hand);
        let outcome = card.move_to(Location::PlayArea, None, false);
        assert_eq!(outcome.registration, RegistrationChange::Register);
    }

    #[test]
    fn test_take_control_layers() {
        let mut card = character();
        card.take_control(PlayerId(1), Some(EntityId(50)));
        card.take_control(PlayerId(2), Some(EntityId(51)));
        assert_eq!(card.controller(), PlayerId(2));

        card.revert_control(EntityId(51));
        assert_eq!(card.controller(), PlayerId(1));

        card.take_control(PlayerId(0), None);
        assert!(card.control_stack().is_empty());
        assert_eq!(card.controller(), PlayerId(0));
    }

    #[test]
    fn test_permanent_control_replaces_stack() {
        let mut card = character();
        card.take_control(PlayerId(1), Some(EntityId(50)));
        card.take_control(PlayerId(2), None);

        assert_eq!(card.control_stack().len(), 1);
        assert_eq!(card.controller(), PlayerId(2));
        card.revert_control(EntityId(50));
        assert_eq!(card.controller(), PlayerId(2));
    }

    #[test]
    fn test_lost_trait_aspect() {
        let mut card = character();
        assert!(card.has_trait("Lord"));

        card.lose_aspect("traits");
        assert!(!card.has_trait("Lord"));
        assert!(card.traits().is_empty());

        card.restore_aspect("traits");
        assert!(card.has_trait("Lord"));
    }

    #[test]
    fn test_full_blank_hides_traits() {
        let mut card = character();
        assert!(card.set_blank(BlankKind::Full));
        assert!(!card.has_trait("Lord"));
        assert!(!card.set_blank(BlankKind::ExcludingTraits));
        assert!(!card.clear_blank(BlankKind::Full));
        assert!(card.clear_blank(BlankKind::ExcludingTraits));
    }

    #[test]
    fn test_neutral_faction_checks() {
        let mut card = character();
        assert!(card.is_faction(Faction::Martell));
        assert!(!card.is_faction(Faction::Neutral));

        card.lose_aspect("factions.martell");
        assert!(!card.is_faction(Faction::Martell));
        assert!(card.is_faction(Faction::Neutral));
        assert_eq!(card.factions(), vec![Faction::Neutral]);

        let status = card.faction_status();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].status, FactionChange::Lost);
    }

    #[test]
    fn test_lost_factions_aspect() {
        let mut card = character();
        card.add_faction(Faction::Stark);
        card.lose_aspect("factions");
        assert!(!card.is_faction(Faction::Stark));
        assert!(card.is_faction(Faction::Neutral));
    }

    #[test]
    fn test_gained_faction_status() {
        let mut card = character();
        card.add_faction(Faction::Stark);
        let status = card.faction_status();
        assert_eq!(
            status,
            vec![FactionStatus {
                faction: Faction::Stark,
                status: FactionChange::Gained
            }]
        );
    }

    #[test]
    fn test_lost_keywords_aspect() {
        let mut card = character();
        card.add_keyword(Keyword::Renown);
        assert!(card.has_keyword(Keyword::Renown));
        card.lose_aspect("keywords");
        assert!(!card.has_keyword(Keyword::Renown));
    }

    #[test]
    fn test_restriction_ignored_after_losing_named_aspect() {
        let mut card = character();
        let restriction = AbilityRestriction::new(EntityId(9), ActionKind::Kneel).named("immunity");
        card.add_restriction(restriction.clone());
        assert!(!card.allow_game_action(ActionKind::Kneel, ResolutionStage::Effect));

        card.lose_aspect("immunity");
        assert!(card.allow_game_action(ActionKind::Kneel, ResolutionStage::Effect));

        card.restore_aspect("immunity");
        card.remove_restriction(&restriction);
        assert!(card.allow_game_action(ActionKind::Kneel, ResolutionStage::Effect));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut card = character();
        card.modify_power(1);
        let snapshot = card.create_snapshot();

        card.modify_power(2);
        card.add_trait("Knight");

        assert_eq!(snapshot.power(), 1);
        assert!(!snapshot.has_trait("Knight"));
    }

    #[test]
    fn test_strength_floor() {
        let mut card = character();
        card.modify_strength(-10);
        assert_eq!(card.strength(), 0);
    }
}
