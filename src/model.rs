//! Domain structs returned by the storage layer.
//!
//! Every struct is an independent copy: nothing here borrows from or points
//! back at the database. Optional foreign keys are `Option`s, never
//! zero-valued sentinels. Timestamps are Unix milliseconds.

use serde::{Deserialize, Serialize};

/// Category of a generic named reference record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EveEntityCategory {
    Alliance,
    Character,
    Constellation,
    Corporation,
    Faction,
    InventoryType,
    MailList,
    Region,
    SolarSystem,
    Station,
}

impl EveEntityCategory {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            EveEntityCategory::Alliance => "alliance",
            EveEntityCategory::Character => "character",
            EveEntityCategory::Constellation => "constellation",
            EveEntityCategory::Corporation => "corporation",
            EveEntityCategory::Faction => "faction",
            EveEntityCategory::InventoryType => "inventory_type",
            EveEntityCategory::MailList => "mail_list",
            EveEntityCategory::Region => "region",
            EveEntityCategory::SolarSystem => "solar_system",
            EveEntityCategory::Station => "station",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        Some(match value {
            "alliance" => EveEntityCategory::Alliance,
            "character" => EveEntityCategory::Character,
            "constellation" => EveEntityCategory::Constellation,
            "corporation" => EveEntityCategory::Corporation,
            "faction" => EveEntityCategory::Faction,
            "inventory_type" => EveEntityCategory::InventoryType,
            "mail_list" => EveEntityCategory::MailList,
            "region" => EveEntityCategory::Region,
            "solar_system" => EveEntityCategory::SolarSystem,
            "station" => EveEntityCategory::Station,
            _ => return None,
        })
    }
}

/// A named, categorized reference record used to resolve IDs to display
/// names. IDs are globally unique across all categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveEntity {
    pub id: i64,
    pub category: EveEntityCategory,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveCategory {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveGroup {
    pub id: i64,
    pub category: EveCategory,
    pub name: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveType {
    pub id: i64,
    pub group: EveGroup,
    pub name: String,
    pub description: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveRace {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveRegion {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveConstellation {
    pub id: i64,
    pub region: EveRegion,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EveSolarSystem {
    pub id: i64,
    pub constellation: EveConstellation,
    pub name: String,
    pub security_status: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvePlanet {
    pub id: i64,
    pub solar_system: EveSolarSystem,
    pub kind: EveType,
    pub name: String,
}

/// Immutable-ish descriptive data for a character, as published by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EveCharacter {
    pub id: i64,
    pub alliance: Option<EveEntity>,
    pub birthday: i64,
    pub corporation: EveEntity,
    pub description: String,
    pub faction: Option<EveEntity>,
    pub gender: String,
    pub name: String,
    pub race: EveRace,
    pub security_status: f64,
    pub title: String,
}

/// A character owned by the local user, with mutable sync state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub eve_character: EveCharacter,
    pub home: Option<EveSolarSystem>,
    pub last_login_at: Option<i64>,
    pub location: Option<EveSolarSystem>,
    pub ship: Option<EveType>,
    pub total_sp: Option<i64>,
    pub unallocated_sp: Option<i64>,
    pub wallet_balance: Option<f64>,
    pub asset_value: Option<f64>,
    pub is_training_watched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterShort {
    pub id: i64,
    pub name: String,
}

/// OAuth token for a character, with its granted scopes sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterToken {
    pub character_id: i64,
    pub access_token: String,
    pub expires_at: i64,
    pub refresh_token: String,
    pub token_type: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAsset {
    pub id: i64,
    pub character_id: i64,
    pub item_id: i64,
    pub eve_type: EveType,
    pub is_blueprint_copy: bool,
    pub is_singleton: bool,
    pub location_flag: String,
    pub location_id: i64,
    pub location_type: String,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterImplant {
    pub id: i64,
    pub character_id: i64,
    pub eve_type: EveType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterJumpClone {
    pub id: i64,
    pub character_id: i64,
    pub jump_clone_id: i64,
    pub location: EveSolarSystem,
    pub name: String,
    pub implants: Vec<EveType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMailLabel {
    pub id: i64,
    pub character_id: i64,
    pub label_id: i64,
    pub color: String,
    pub name: String,
    pub unread_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMail {
    pub id: i64,
    pub character_id: i64,
    pub mail_id: i64,
    pub from: EveEntity,
    pub subject: String,
    pub body: String,
    pub is_processed: bool,
    pub is_read: bool,
    pub timestamp: i64,
    pub labels: Vec<CharacterMailLabel>,
    pub recipients: Vec<EveEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPlanet {
    pub id: i64,
    pub character_id: i64,
    pub planet: EvePlanet,
    pub last_update: i64,
    pub upgrade_level: i64,
    pub pins: Vec<PlanetPin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPin {
    pub id: i64,
    pub pin_id: i64,
    pub kind: EveType,
    pub schematic_id: Option<i64>,
    pub expiry_time: Option<i64>,
    pub contents: Vec<PlanetPinContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetPinContent {
    pub eve_type_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSkill {
    pub id: i64,
    pub character_id: i64,
    pub eve_type: EveType,
    pub active_skill_level: i64,
    pub trained_skill_level: i64,
    pub skill_points_in_skill: i64,
}

/// Logical data sections synced per character, tracked independently for
/// freshness and error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterSection {
    Assets,
    Implants,
    JumpClones,
    Mails,
    Planets,
    Skills,
    WalletBalance,
}

impl CharacterSection {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            CharacterSection::Assets => "assets",
            CharacterSection::Implants => "implants",
            CharacterSection::JumpClones => "jump_clones",
            CharacterSection::Mails => "mails",
            CharacterSection::Planets => "planets",
            CharacterSection::Skills => "skills",
            CharacterSection::WalletBalance => "wallet_balance",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        Some(match value {
            "assets" => CharacterSection::Assets,
            "implants" => CharacterSection::Implants,
            "jump_clones" => CharacterSection::JumpClones,
            "mails" => CharacterSection::Mails,
            "planets" => CharacterSection::Planets,
            "skills" => CharacterSection::Skills,
            "wallet_balance" => CharacterSection::WalletBalance,
            _ => return None,
        })
    }
}

/// Sections that are not owned by a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralSection {
    Entities,
    Types,
}

impl GeneralSection {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            GeneralSection::Entities => "entities",
            GeneralSection::Types => "types",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        Some(match value {
            "entities" => GeneralSection::Entities,
            "types" => GeneralSection::Types,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSectionStatus {
    pub character_id: i64,
    pub section: CharacterSection,
    pub completed_at: Option<i64>,
    pub content_hash: String,
    pub error: String,
    pub started_at: Option<i64>,
    pub updated_at: i64,
}

impl CharacterSectionStatus {
    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSectionStatus {
    pub section: GeneralSection,
    pub completed_at: Option<i64>,
    pub content_hash: String,
    pub error: String,
    pub started_at: Option<i64>,
    pub updated_at: i64,
}

impl GeneralSectionStatus {
    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_category_round_trips_through_db_repr() {
        for c in [
            EveEntityCategory::Alliance,
            EveEntityCategory::Character,
            EveEntityCategory::Corporation,
            EveEntityCategory::MailList,
            EveEntityCategory::SolarSystem,
        ] {
            assert_eq!(EveEntityCategory::from_db(c.as_db()), Some(c));
        }
        assert_eq!(EveEntityCategory::from_db("moon"), None);
    }

    #[test]
    fn section_names_are_stable() {
        assert_eq!(CharacterSection::JumpClones.as_db(), "jump_clones");
        assert_eq!(
            CharacterSection::from_db("wallet_balance"),
            Some(CharacterSection::WalletBalance)
        );
    }
}
