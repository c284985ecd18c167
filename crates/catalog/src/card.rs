use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bindery_core::{CardId, Entity};

use crate::collector::CollectorNumber;

/// Card rarity tiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    HoloRare,
    UltraRare,
    SecretRare,
    Promo,
}

/// Card supertype (the broad gameplay role).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Supertype {
    Creature,
    Trainer,
    Energy,
}

/// Catalog entity: one printable card.
///
/// Cards belong to a parent group (the expansion/set they were printed in)
/// and carry the printed collector number plus the set's printed total,
/// both optional - promos frequently lack one or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Parent group name (the expansion the card belongs to).
    pub group_name: String,
    pub rarity: Rarity,
    pub supertype: Supertype,
    pub collector_number: Option<CollectorNumber>,
    pub printed_total: Option<u32>,
    pub released_at: DateTime<Utc>,
}

impl Entity for Card {
    type Id = CardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Card {
    /// Display form of the collector number (`"007/182"`, `"007"`, or `"—"`).
    pub fn display_number(&self) -> String {
        crate::collector::format_collector_number(
            self.collector_number.as_ref().map(|n| n.as_str()),
            self.printed_total,
        )
    }
}

/// Structural catalog filter: group / rarity / supertype membership.
///
/// Empty sets mean "no constraint on that axis".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub groups: Vec<String>,
    pub rarities: Vec<Rarity>,
    pub supertypes: Vec<Supertype>,
}

impl CardFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, card: &Card) -> bool {
        (self.groups.is_empty() || self.groups.iter().any(|g| g == &card.group_name))
            && (self.rarities.is_empty() || self.rarities.contains(&card.rarity))
            && (self.supertypes.is_empty() || self.supertypes.contains(&card.supertype))
    }
}
