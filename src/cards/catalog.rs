//! Built-in card implementations.
//!
//! Each entry pairs a card's printed data with the function that builds
//! its abilities. The engine itself knows nothing about individual cards;
//! [`register_catalog`] is how a registry learns them.

use std::rc::Rc;

use tracing::debug;

use crate::core::{DefinitionError, EntityId};
use crate::effects::{CardSelector, Cost, Duration, EffectSpec, GameAction, Modifier};
use crate::game::Game;
use crate::triggers::{AbilityTrigger, EventKind, WhenCondition};
use crate::zones::Location;

use super::data::{CardData, CardType, Faction, PlotStats};
use super::registry::{CardImplementation, CardRegistry};
use super::restriction::ResolutionStage;

struct CatalogEntry {
    data: fn() -> CardData,
    implementation: CardImplementation,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry { data: littlefinger_data, implementation: littlefinger },
    CatalogEntry { data: pentoshi_data, implementation: trading_with_the_pentoshi },
    CatalogEntry { data: roseroad_data, implementation: the_roseroad },
    CatalogEntry { data: knighted_data, implementation: knighted },
    CatalogEntry { data: ygritte_data, implementation: ygritte },
    CatalogEntry { data: priest_data, implementation: priest_of_the_drowned_god },
    CatalogEntry { data: bodyguard_data, implementation: bodyguard },
    CatalogEntry { data: eyrie_data, implementation: the_eyrie },
];

/// Printed data of every built-in card.
#[must_use]
pub fn catalog_data() -> Vec<CardData> {
    CATALOG.iter().map(|entry| (entry.data)()).collect()
}

/// Attach the built-in implementations to `registry`.
///
/// Codes the registry has no data for are registered with the built-in
/// data first; existing data is kept.
///
/// # Errors
///
/// Returns the registry's error if an implementation cannot be attached.
pub fn register_catalog(registry: &mut CardRegistry) -> Result<(), DefinitionError> {
    for entry in CATALOG {
        let data = (entry.data)();
        let code = data.code.clone();
        if !registry.contains(&code) {
            registry.register(data);
        }
        registry.implement(&code, None, entry.implementation)?;
        debug!(%code, "card implementation registered");
    }
    Ok(())
}

// === Characters ===

fn littlefinger_data() -> CardData {
    CardData::new("01029", "Littlefinger", CardType::Character, Faction::Baratheon)
        .with_cost(5)
        .with_strength(4)
        .with_trait("Lord")
        .with_trait("Small Council")
        .with_text("<b>Reaction:</b> After Littlefinger enters play, draw 2 cards.")
        .unique()
}

fn littlefinger(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::reaction(source)
        .when(
            EventKind::CardEntersPlay,
            WhenCondition::single(move |_game, event| event.params.card == Some(source)),
        )
        .with_message("{player} uses {source} to draw 2 cards")
        .with_handler(|game, context| {
            game.resolve_game_action(
                &GameAction::draw_cards(context.player, 2),
                &context.action_context(),
            );
        })])
}

fn ygritte_data() -> CardData {
    CardData::new("01128", "Ygritte", CardType::Character, Faction::Stark)
        .with_cost(5)
        .with_strength(3)
        .with_trait("Wildling")
        .with_text("Stealth.\nYgritte cannot be knelt by card effects.")
        .unique()
}

fn ygritte(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::persistent(
        source,
        EffectSpec::on_self(Modifier::CannotBeKneeled(Some(ResolutionStage::Effect))),
    )])
}

fn priest_data() -> CardData {
    CardData::new("01070", "Priest of the Drowned God", CardType::Character, Faction::Greyjoy)
        .with_cost(3)
        .with_strength(1)
        .with_trait("Drowned God")
        .with_text("Priest of the Drowned God gets +1 STR for each other <i>Drowned God</i> character you control.")
}

fn priest_of_the_drowned_god(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    let bonus = move |game: &Game, target: EntityId| -> i32 {
        let Some(card) = game.card(target) else {
            return 0;
        };
        let others = game
            .cards_in(card.controller(), Location::PlayArea)
            .into_iter()
            .filter(|&id| id != source)
            .filter_map(|id| game.card(id))
            .filter(|other| other.card_type() == CardType::Character && other.has_trait("Drowned God"))
            .count();
        i32::try_from(others).unwrap_or(i32::MAX)
    };
    Ok(vec![AbilityTrigger::persistent(
        source,
        EffectSpec::on_self(Modifier::DynamicStrength(Rc::new(bonus))),
    )])
}

// === Plots ===

fn pentoshi_data() -> CardData {
    CardData::new("01018", "Trading with the Pentoshi", CardType::Plot, Faction::Neutral)
        .with_plot_stats(PlotStats {
            income: 12,
            initiative: 0,
            claim: 1,
            reserve: 4,
        })
        .with_trait("Scheme")
        .with_text("<b>When Revealed:</b> Each opponent gains 6 gold.")
}

fn trading_with_the_pentoshi(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::forced_reaction(source)
        .when(
            EventKind::PlotRevealed,
            WhenCondition::single(move |_game, event| event.params.card == Some(source)),
        )
        .with_message("Each opponent of {player} gains 6 gold from {source}")
        .with_handler(|game, context| {
            let opponents: Vec<_> = game.player_ids().filter(|&player| player != context.player).collect();
            for opponent in opponents {
                game.resolve_game_action(&GameAction::gain_gold(opponent, 6), &context.action_context());
            }
        })])
}

// === Locations ===

fn roseroad_data() -> CardData {
    CardData::new("01040", "The Roseroad", CardType::Location, Faction::Neutral)
        .with_cost(0)
        .with_trait("Westeros")
        .with_text("Limited.\nIncrease the gold value on your revealed plot card by 1.")
}

fn the_roseroad(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::persistent(
        source,
        EffectSpec::on_active_plot(Modifier::ModifyGold(1)),
    )])
}

fn eyrie_data() -> CardData {
    CardData::new("01156", "The Eyrie", CardType::Location, Faction::Neutral)
        .with_cost(3)
        .with_trait("Stronghold")
        .with_trait("The Vale")
        .with_text("<b>Action:</b> Kneel The Eyrie to choose a character. Until the end of the phase, that character gets +2 STR.")
        .unique()
}

fn the_eyrie(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::action(source, "Give +2 STR")
        .with_cost(Cost::KneelSelf)
        .with_target(
            CardSelector::single()
                .with_card_type(CardType::Character)
                .in_location(Location::PlayArea),
        )
        .with_message("{player} kneels {source} to give {target} +2 STR until the end of the phase")
        .with_handler(|game, context| {
            let spec = EffectSpec::on_cards(context.targets.clone(), Modifier::ModifyStrength(2))
                .lasting(Duration::UntilEndOfPhase);
            game.add_lasting_effect(context.source, spec);
        })])
}

// === Attachments ===

fn knighted_data() -> CardData {
    CardData::new("02036", "Knighted", CardType::Attachment, Faction::Neutral)
        .with_cost(1)
        .with_trait("Title")
        .with_text("Attached character gains the <i>Knight</i> trait and gets +1 STR.")
}

fn knighted(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::persistent(
        source,
        EffectSpec::on_parent(Modifier::AddTrait("Knight".to_string())).and(Modifier::ModifyStrength(1)),
    )])
}

fn bodyguard_data() -> CardData {
    CardData::new("01034", "Bodyguard", CardType::Attachment, Faction::Neutral)
        .with_cost(0)
        .with_trait("Item")
        .with_text(
            "Attach only to a <i>Lord</i> or <i>Lady</i> character.\n<b>Interrupt:</b> When attached character would be \
             killed or discarded, sacrifice Bodyguard to save it.",
        )
}

fn bodyguard(source: EntityId) -> Result<Vec<AbilityTrigger>, DefinitionError> {
    Ok(vec![AbilityTrigger::interrupt(source)
        .when(
            EventKind::CardLeftPlay,
            WhenCondition::single(move |game, event| {
                event.params.allow_save
                    && event.params.card.is_some()
                    && game.card(source).and_then(|card| card.parent) == event.params.card
            }),
        )
        .with_cost(Cost::SacrificeSelf)
        .with_message("{player} sacrifices {source} to save its character")
        .with_handler(|game, context| {
            if let Some(event) = context.event() {
                game.events_mut().cancel(event);
            }
        })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::TimingClass;

    #[test]
    fn test_catalog_codes_are_unique() {
        let mut codes: Vec<_> = catalog_data().into_iter().map(|data| data.code).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_register_catalog_into_empty_registry() {
        let mut registry = CardRegistry::new();
        register_catalog(&mut registry).unwrap();
        assert_eq!(registry.len(), CATALOG.len());
        assert!(registry.iter().all(|entry| entry.implementation.is_some()));
    }

    #[test]
    fn test_register_catalog_keeps_existing_data() {
        let mut registry = CardRegistry::new();
        registry.register(
            CardData::new("01029", "Littlefinger", CardType::Character, Faction::Baratheon).with_pack("Core"),
        );
        register_catalog(&mut registry).unwrap();
        let entry = registry.get("01029").unwrap();
        assert_eq!(entry.data.pack_code, "Core");
        assert!(entry.implementation.is_some());
    }

    #[test]
    fn test_ability_timings() {
        let mut registry = CardRegistry::new();
        register_catalog(&mut registry).unwrap();

        let littlefinger = registry.abilities_for("01029", EntityId(1)).unwrap();
        assert_eq!(littlefinger[0].timing, TimingClass::Reaction);

        let pentoshi = registry.abilities_for("01018", EntityId(2)).unwrap();
        assert_eq!(pentoshi[0].timing, TimingClass::ForcedReaction);

        let eyrie = registry.abilities_for("01156", EntityId(3)).unwrap();
        assert_eq!(eyrie[0].timing, TimingClass::Action);
        assert_eq!(eyrie[0].title, "Give +2 STR");
        assert!(eyrie[0].target.is_some());
    }
}
