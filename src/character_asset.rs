//! Character assets, keyed by the game's globally unique item ID.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{map_create_err, map_db_err, map_get_err, Error, Result};
use crate::model::{CharacterAsset, EveType};
use crate::storage::{require_id, Storage};

#[derive(Debug, Clone, Default)]
pub struct CreateCharacterAssetParams {
    pub character_id: i64,
    pub eve_type_id: i64,
    pub item_id: i64,
    pub is_blueprint_copy: bool,
    pub is_singleton: bool,
    pub location_flag: String,
    pub location_id: i64,
    pub location_type: String,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCharacterAssetParams {
    pub character_id: i64,
    pub item_id: i64,
    pub location_flag: String,
    pub location_id: i64,
    pub location_type: String,
    pub name: String,
    pub quantity: i64,
}

impl Storage {
    pub async fn create_character_asset(&self, arg: CreateCharacterAssetParams) -> Result<()> {
        const OP: &str = "create character asset";
        require_id(OP, "character_id", arg.character_id)?;
        require_id(OP, "eve_type_id", arg.eve_type_id)?;
        require_id(OP, "item_id", arg.item_id)?;
        sqlx::query(
            "INSERT INTO character_assets \
             (character_id, eve_type_id, item_id, is_blueprint_copy, is_singleton, \
              location_flag, location_id, location_type, name, quantity) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(arg.character_id)
        .bind(arg.eve_type_id)
        .bind(arg.item_id)
        .bind(arg.is_blueprint_copy)
        .bind(arg.is_singleton)
        .bind(&arg.location_flag)
        .bind(arg.location_id)
        .bind(&arg.location_type)
        .bind(&arg.name)
        .bind(arg.quantity)
        .execute(self.writer())
        .await
        .map_err(map_create_err(OP))?;
        Ok(())
    }

    pub async fn get_character_asset(
        &self,
        character_id: i64,
        item_id: i64,
    ) -> Result<CharacterAsset> {
        const OP: &str = "get character asset";
        let row = sqlx::query(
            "SELECT id, character_id, eve_type_id, item_id, is_blueprint_copy, is_singleton, \
                    location_flag, location_id, location_type, name, quantity \
             FROM character_assets WHERE character_id = ?1 AND item_id = ?2",
        )
        .bind(character_id)
        .bind(item_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        let eve_type = self.get_eve_type(row.get("eve_type_id")).await?;
        Ok(asset_from_row(&row, eve_type))
    }

    /// Refreshes the mutable columns of an existing asset row.
    pub async fn update_character_asset(&self, arg: UpdateCharacterAssetParams) -> Result<()> {
        const OP: &str = "update character asset";
        require_id(OP, "character_id", arg.character_id)?;
        require_id(OP, "item_id", arg.item_id)?;
        let res = sqlx::query(
            "UPDATE character_assets SET \
               location_flag = ?1, location_id = ?2, location_type = ?3, name = ?4, quantity = ?5 \
             WHERE character_id = ?6 AND item_id = ?7",
        )
        .bind(&arg.location_flag)
        .bind(arg.location_id)
        .bind(&arg.location_type)
        .bind(&arg.name)
        .bind(arg.quantity)
        .bind(arg.character_id)
        .bind(arg.item_id)
        .execute(self.writer())
        .await
        .map_err(map_db_err(OP))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn list_character_assets(&self, character_id: i64) -> Result<Vec<CharacterAsset>> {
        const OP: &str = "list character assets";
        let rows = sqlx::query(
            "SELECT id, character_id, eve_type_id, item_id, is_blueprint_copy, is_singleton, \
                    location_flag, location_id, location_type, name, quantity \
             FROM character_assets WHERE character_id = ? ORDER BY item_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut assets = Vec::with_capacity(rows.len());
        for row in rows {
            let eve_type = self.get_eve_type(row.get("eve_type_id")).await?;
            assets.push(asset_from_row(&row, eve_type));
        }
        Ok(assets)
    }

    pub async fn list_character_asset_ids(&self, character_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT item_id FROM character_assets WHERE character_id = ? ORDER BY item_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err("list character asset ids"))
    }

    /// Removes assets by item ID, used to prune items that disappeared from
    /// the upstream inventory.
    pub async fn delete_character_assets(
        &self,
        character_id: i64,
        item_ids: &[i64],
    ) -> Result<()> {
        const OP: &str = "delete character assets";
        if item_ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM character_assets WHERE character_id = ? AND item_id IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql).bind(character_id);
        for item_id in item_ids {
            query = query.bind(item_id);
        }
        query
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        Ok(())
    }
}

fn asset_from_row(row: &SqliteRow, eve_type: EveType) -> CharacterAsset {
    CharacterAsset {
        id: row.get("id"),
        character_id: row.get("character_id"),
        item_id: row.get("item_id"),
        eve_type,
        is_blueprint_copy: row.get("is_blueprint_copy"),
        is_singleton: row.get("is_singleton"),
        location_flag: row.get("location_flag"),
        location_id: row.get("location_id"),
        location_type: row.get("location_type"),
        name: row.get("name"),
        quantity: row.get("quantity"),
    }
}
