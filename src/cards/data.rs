//! Printed card data.
//!
//! `CardData` is the static catalog record for a card code ("what is
//! printed"). Runtime state lives in [`Card`](super::Card). The shape
//! follows the card database export so records deserialize directly.
//!
//! Factions and keywords are closed sets in the game rules and are typed
//! enums here; traits are open-ended and stay strings.

use serde::{Deserialize, Serialize};

/// Printed card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Character,
    Location,
    Attachment,
    Event,
    Plot,
    Agenda,
    Title,
    Faction,
}

impl CardType {
    /// Type name as printed.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Location => "location",
            Self::Attachment => "attachment",
            Self::Event => "event",
            Self::Plot => "plot",
            Self::Agenda => "agenda",
            Self::Title => "title",
            Self::Faction => "faction",
        }
    }

    /// Whether cards of this type go into the draw deck.
    #[must_use]
    pub const fn is_draw_card(self) -> bool {
        matches!(
            self,
            Self::Character | Self::Location | Self::Attachment | Self::Event
        )
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The great houses, plus neutral.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Stark,
    Lannister,
    #[serde(rename = "thenightswatch")]
    NightsWatch,
    Tyrell,
    Baratheon,
    Targaryen,
    Martell,
    Greyjoy,
    Neutral,
}

impl Faction {
    /// The eight real factions. `Neutral` is the absence of all of them.
    pub const ALL: [Faction; 8] = [
        Faction::Stark,
        Faction::Lannister,
        Faction::NightsWatch,
        Faction::Tyrell,
        Faction::Baratheon,
        Faction::Targaryen,
        Faction::Martell,
        Faction::Greyjoy,
    ];

    /// Faction code as used in card data and aspect names.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Stark => "stark",
            Self::Lannister => "lannister",
            Self::NightsWatch => "thenightswatch",
            Self::Tyrell => "tyrell",
            Self::Baratheon => "baratheon",
            Self::Targaryen => "targaryen",
            Self::Martell => "martell",
            Self::Greyjoy => "greyjoy",
            Self::Neutral => "neutral",
        }
    }

    /// Parse a faction code, case-insensitively.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let lower = code.to_lowercase();
        Self::ALL
            .into_iter()
            .chain(std::iter::once(Self::Neutral))
            .find(|faction| faction.code() == lower)
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Printed keywords the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Ambush,
    Assault,
    Bestow,
    Insight,
    Intimidate,
    Limited,
    #[serde(rename = "no attachments")]
    NoAttachments,
    Pillage,
    Prized,
    Renown,
    Shadow,
    Stealth,
    Terminal,
}

impl Keyword {
    pub const ALL: [Keyword; 13] = [
        Keyword::Ambush,
        Keyword::Assault,
        Keyword::Bestow,
        Keyword::Insight,
        Keyword::Intimidate,
        Keyword::Limited,
        Keyword::NoAttachments,
        Keyword::Pillage,
        Keyword::Prized,
        Keyword::Renown,
        Keyword::Shadow,
        Keyword::Stealth,
        Keyword::Terminal,
    ];

    /// Keyword as printed in rules text, lowercase.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Ambush => "ambush",
            Self::Assault => "assault",
            Self::Bestow => "bestow",
            Self::Insight => "insight",
            Self::Intimidate => "intimidate",
            Self::Limited => "limited",
            Self::NoAttachments => "no attachments",
            Self::Pillage => "pillage",
            Self::Prized => "prized",
            Self::Renown => "renown",
            Self::Shadow => "shadow",
            Self::Stealth => "stealth",
            Self::Terminal => "terminal",
        }
    }

    /// Parse a keyword name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|keyword| keyword.text() == lower)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// A keyword found in rules text, with any trailing value.
///
/// `Prized 2` parses to `{ keyword: Prized, value: 2 }`; keywords printed
/// without a number carry a value of 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintedKeyword {
    pub keyword: Keyword,
    pub value: u32,
}

/// Parse the keywords printed on a card.
///
/// Text is lowercased and split into sentences on `.`; lines containing
/// bold ability timing markers (`<b>`) are ability text and skipped. A
/// sentence counts when it starts with a known keyword.
///
/// ```
/// use thrones_engine::cards::{parse_keywords, Keyword};
///
/// let printed = parse_keywords("Renown. Stealth.\n<b>Reaction:</b> After you win a challenge...");
/// let keywords: Vec<_> = printed.iter().map(|p| p.keyword).collect();
/// assert_eq!(keywords, vec![Keyword::Renown, Keyword::Stealth]);
/// ```
#[must_use]
pub fn parse_keywords(text: &str) -> Vec<PrintedKeyword> {
    let lower = text.to_lowercase();
    lower
        .lines()
        .filter(|line| !line.contains("<b>"))
        .flat_map(|line| line.split('.'))
        .map(str::trim)
        .filter_map(|sentence| {
            Keyword::ALL
                .into_iter()
                .find(|keyword| sentence.starts_with(keyword.text()))
                .map(|keyword| {
                    let value = sentence[keyword.text().len()..]
                        .trim()
                        .parse()
                        .unwrap_or(0);
                    PrintedKeyword { keyword, value }
                })
        })
        .collect()
}

/// Printed plot statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotStats {
    pub income: i32,
    pub initiative: i32,
    pub claim: i32,
    pub reserve: i32,
}

fn default_deck_limit() -> u32 {
    3
}

/// Static catalog record for one card code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    /// Card code, e.g. `"01105"`.
    pub code: String,

    pub name: String,

    /// Name disambiguated by pack, e.g. `"Ser Jon Fossoway (WotW)"`.
    #[serde(default)]
    pub label: String,

    #[serde(rename = "type")]
    pub card_type: CardType,

    pub faction: Faction,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub traits: Vec<String>,

    #[serde(default)]
    pub loyal: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub cost: Option<u32>,

    #[serde(default)]
    pub strength: Option<i32>,

    #[serde(default)]
    pub plot_stats: Option<PlotStats>,

    #[serde(default = "default_deck_limit")]
    pub deck_limit: u32,

    #[serde(default)]
    pub pack_code: String,

    /// Set while a card is in development; compared against the
    /// implementation's version for the alert badge.
    #[serde(default)]
    pub version: Option<String>,
}

impl CardData {
    /// Create a minimal card record (builder pattern entry point).
    pub fn new(code: impl Into<String>, name: impl Into<String>, card_type: CardType, faction: Faction) -> Self {
        let name = name.into();
        Self {
            code: code.into(),
            label: name.clone(),
            name,
            card_type,
            faction,
            text: String::new(),
            traits: Vec::new(),
            loyal: false,
            unique: false,
            cost: None,
            strength: None,
            plot_stats: None,
            deck_limit: default_deck_limit(),
            pack_code: String::new(),
            version: None,
        }
    }

    /// Set the label (builder pattern).
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the rules text (builder pattern).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add a printed trait (builder pattern).
    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }

    /// Set the cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Set the strength (builder pattern).
    #[must_use]
    pub fn with_strength(mut self, strength: i32) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Set plot stats (builder pattern).
    #[must_use]
    pub fn with_plot_stats(mut self, stats: PlotStats) -> Self {
        self.plot_stats = Some(stats);
        self
    }

    /// Set the pack code (builder pattern).
    #[must_use]
    pub fn with_pack(mut self, pack_code: impl Into<String>) -> Self {
        self.pack_code = pack_code.into();
        self
    }

    /// Set the deck limit (builder pattern).
    #[must_use]
    pub fn with_deck_limit(mut self, limit: u32) -> Self {
        self.deck_limit = limit;
        self
    }

    /// Mark as unique (builder pattern).
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as loyal (builder pattern).
    #[must_use]
    pub fn loyal(mut self) -> Self {
        self.loyal = true;
        self
    }

    /// Label, falling back to the name for records without one.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords_skips_ability_lines() {
        let printed = parse_keywords("Insight.\n<b>Action:</b> Stealth something.");
        assert_eq!(printed.len(), 1);
        assert_eq!(printed[0].keyword, Keyword::Insight);
    }

    #[test]
    fn test_parse_keywords_with_value() {
        let printed = parse_keywords("Prized 2. No attachments.");
        assert_eq!(
            printed,
            vec![
                PrintedKeyword { keyword: Keyword::Prized, value: 2 },
                PrintedKeyword { keyword: Keyword::NoAttachments, value: 0 },
            ]
        );
    }

    #[test]
    fn test_parse_keywords_ignores_other_sentences() {
        assert!(parse_keywords("Each player draws 1 card.").is_empty());
    }

    #[test]
    fn test_faction_parse() {
        assert_eq!(Faction::parse("TheNightsWatch"), Some(Faction::NightsWatch));
        assert_eq!(Faction::parse("neutral"), Some(Faction::Neutral));
        assert_eq!(Faction::parse("dothraki"), None);
    }

    #[test]
    fn test_card_data_deserialize() {
        let json = r#"{
            "code": "01105",
            "name": "Doran Martell",
            "type": "character",
            "faction": "martell",
            "traits": ["Lord"],
            "unique": true,
            "packCode": "Core"
        }"#;
        let data: CardData = serde_json::from_str(json).unwrap();

        assert_eq!(data.card_type, CardType::Character);
        assert_eq!(data.faction, Faction::Martell);
        assert_eq!(data.deck_limit, 3);
        assert_eq!(data.display_label(), "Doran Martell");
        assert_eq!(data.pack_code, "Core");
    }
}
