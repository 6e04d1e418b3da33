//! Local SQLite persistence for a player's mirrored account state.
//!
//! [`Storage`] is the single entry point: it owns a serialized write pool
//! and a read pool over one database file, applies migrations on open, and
//! exposes typed operations per entity family. All timestamps are Unix
//! milliseconds.

mod cache;
mod character;
mod character_asset;
mod character_clone;
mod character_mail;
mod character_planet;
mod character_skill;
mod character_token;
mod db;
mod error;
mod eve_entity;
mod eve_universe;
mod migrate;
mod model;
mod section_status;
mod storage;
mod time;

pub use cache::CacheSetParams;
pub use character::{CreateEveCharacterParams, UpdateOrCreateCharacterParams};
pub use character_asset::{CreateCharacterAssetParams, UpdateCharacterAssetParams};
pub use character_clone::CreateCharacterJumpCloneParams;
pub use character_mail::{CreateCharacterMailParams, UpdateOrCreateCharacterMailLabelParams};
pub use character_planet::{CreateCharacterPlanetParams, CreatePlanetPinParams};
pub use character_skill::UpdateOrCreateCharacterSkillParams;
pub use character_token::UpdateOrCreateCharacterTokenParams;
pub use error::{Error, Result};
pub use migrate::apply_migrations;
pub use model::{
    Character, CharacterAsset, CharacterImplant, CharacterJumpClone, CharacterMail,
    CharacterMailLabel, CharacterPlanet, CharacterSection, CharacterSectionStatus, CharacterShort,
    CharacterSkill, CharacterToken, EveCategory, EveCharacter, EveConstellation, EveEntity,
    EveEntityCategory, EveGroup, EvePlanet, EveRace, EveRegion, EveSolarSystem, EveType,
    GeneralSection, GeneralSectionStatus, PlanetPin, PlanetPinContent,
};
pub use section_status::{
    UpdateOrCreateCharacterSectionStatusParams, UpdateOrCreateGeneralSectionStatusParams,
};
pub use storage::Storage;
pub use time::now_ms;
