//! Characters owned by the local user and their static descriptive data.

use sqlx::Row;
use tracing::debug;

use crate::error::{map_create_err, map_db_err, map_get_err, Error, Result};
use crate::model::{Character, CharacterShort, EveCharacter};
use crate::storage::{require_id, Storage};

#[derive(Debug, Clone, Default)]
pub struct CreateEveCharacterParams {
    pub id: i64,
    pub alliance_id: Option<i64>,
    pub birthday: i64,
    pub corporation_id: i64,
    pub description: String,
    pub faction_id: Option<i64>,
    pub gender: String,
    pub name: String,
    pub race_id: i64,
    pub security_status: f64,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrCreateCharacterParams {
    pub id: i64,
    pub home_id: Option<i64>,
    pub last_login_at: Option<i64>,
    pub location_id: Option<i64>,
    pub ship_id: Option<i64>,
    pub total_sp: Option<i64>,
    pub unallocated_sp: Option<i64>,
    pub wallet_balance: Option<f64>,
    pub asset_value: Option<f64>,
    pub is_training_watched: bool,
}

impl Storage {
    pub async fn create_eve_character(&self, arg: CreateEveCharacterParams) -> Result<()> {
        const OP: &str = "create eve character";
        require_id(OP, "id", arg.id)?;
        require_id(OP, "corporation_id", arg.corporation_id)?;
        require_id(OP, "race_id", arg.race_id)?;
        sqlx::query(
            "INSERT INTO eve_characters \
             (id, alliance_id, birthday, corporation_id, description, faction_id, gender, name, race_id, security_status, title) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(arg.id)
        .bind(arg.alliance_id)
        .bind(arg.birthday)
        .bind(arg.corporation_id)
        .bind(&arg.description)
        .bind(arg.faction_id)
        .bind(&arg.gender)
        .bind(&arg.name)
        .bind(arg.race_id)
        .bind(arg.security_status)
        .bind(&arg.title)
        .execute(self.writer())
        .await
        .map_err(map_create_err(OP))?;
        debug!(target = "evevault", event = "eve_character_created", id = arg.id);
        Ok(())
    }

    pub async fn get_eve_character(&self, id: i64) -> Result<EveCharacter> {
        const OP: &str = "get eve character";
        let row = sqlx::query(
            "SELECT id, alliance_id, birthday, corporation_id, description, faction_id, \
                    gender, name, race_id, security_status, title \
             FROM eve_characters WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;

        let corporation = self.get_eve_entity(row.get("corporation_id")).await?;
        let race = self.get_eve_race(row.get("race_id")).await?;
        let alliance = match row.get::<Option<i64>, _>("alliance_id") {
            Some(id) => Some(self.get_eve_entity(id).await?),
            None => None,
        };
        let faction = match row.get::<Option<i64>, _>("faction_id") {
            Some(id) => Some(self.get_eve_entity(id).await?),
            None => None,
        };
        Ok(EveCharacter {
            id: row.get("id"),
            alliance,
            birthday: row.get("birthday"),
            corporation,
            description: row.get("description"),
            faction,
            gender: row.get("gender"),
            name: row.get("name"),
            race,
            security_status: row.get("security_status"),
            title: row.get("title"),
        })
    }

    /// Creates the character row or refreshes every supplied field.
    pub async fn update_or_create_character(
        &self,
        arg: UpdateOrCreateCharacterParams,
    ) -> Result<()> {
        const OP: &str = "update or create character";
        require_id(OP, "id", arg.id)?;
        sqlx::query(
            "INSERT INTO characters \
             (id, home_id, last_login_at, location_id, ship_id, total_sp, unallocated_sp, \
              wallet_balance, asset_value, is_training_watched) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             ON CONFLICT (id) DO UPDATE SET \
               home_id = excluded.home_id, \
               last_login_at = excluded.last_login_at, \
               location_id = excluded.location_id, \
               ship_id = excluded.ship_id, \
               total_sp = excluded.total_sp, \
               unallocated_sp = excluded.unallocated_sp, \
               wallet_balance = excluded.wallet_balance, \
               asset_value = excluded.asset_value, \
               is_training_watched = excluded.is_training_watched",
        )
        .bind(arg.id)
        .bind(arg.home_id)
        .bind(arg.last_login_at)
        .bind(arg.location_id)
        .bind(arg.ship_id)
        .bind(arg.total_sp)
        .bind(arg.unallocated_sp)
        .bind(arg.wallet_balance)
        .bind(arg.asset_value)
        .bind(arg.is_training_watched)
        .execute(self.writer())
        .await
        .map_err(map_db_err(OP))?;
        debug!(target = "evevault", event = "character_upserted", id = arg.id);
        Ok(())
    }

    pub async fn get_character(&self, id: i64) -> Result<Character> {
        const OP: &str = "get character";
        let row = sqlx::query(
            "SELECT id, home_id, last_login_at, location_id, ship_id, total_sp, \
                    unallocated_sp, wallet_balance, asset_value, is_training_watched \
             FROM characters WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;

        let eve_character = self.get_eve_character(row.get("id")).await?;
        let home = match row.get::<Option<i64>, _>("home_id") {
            Some(id) => Some(self.get_eve_solar_system(id).await?),
            None => None,
        };
        let location = match row.get::<Option<i64>, _>("location_id") {
            Some(id) => Some(self.get_eve_solar_system(id).await?),
            None => None,
        };
        let ship = match row.get::<Option<i64>, _>("ship_id") {
            Some(id) => Some(self.get_eve_type(id).await?),
            None => None,
        };
        Ok(Character {
            id: row.get("id"),
            eve_character,
            home,
            last_login_at: row.get("last_login_at"),
            location,
            ship,
            total_sp: row.get("total_sp"),
            unallocated_sp: row.get("unallocated_sp"),
            wallet_balance: row.get("wallet_balance"),
            asset_value: row.get("asset_value"),
            is_training_watched: row.get("is_training_watched"),
        })
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        let ids = self.list_character_ids().await?;
        let mut cc = Vec::with_capacity(ids.len());
        for id in ids {
            cc.push(self.get_character(id).await?);
        }
        Ok(cc)
    }

    pub async fn list_characters_short(&self) -> Result<Vec<CharacterShort>> {
        let rows = sqlx::query(
            "SELECT c.id AS id, ec.name AS name \
             FROM characters c JOIN eve_characters ec ON ec.id = c.id \
             ORDER BY ec.name",
        )
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err("list characters short"))?;
        Ok(rows
            .iter()
            .map(|row| CharacterShort {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    pub async fn list_character_ids(&self) -> Result<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM characters ORDER BY id")
            .fetch_all(self.reader())
            .await
            .map_err(map_db_err("list character ids"))
    }

    /// Removes the character and, through FK cascades, every owned child row
    /// (assets, mail, clones, planets, skills, token, section status).
    pub async fn delete_character(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM eve_characters WHERE id = ?")
            .bind(id)
            .execute(self.writer())
            .await
            .map_err(map_db_err("delete character"))?;
        debug!(target = "evevault", event = "character_deleted", id = id);
        Ok(())
    }

    pub async fn update_character_home(&self, id: i64, home_id: Option<i64>) -> Result<()> {
        self.update_character_field("update character home", "home_id", id, home_id)
            .await
    }

    pub async fn update_character_location(&self, id: i64, location_id: Option<i64>) -> Result<()> {
        self.update_character_field("update character location", "location_id", id, location_id)
            .await
    }

    pub async fn update_character_ship(&self, id: i64, ship_id: Option<i64>) -> Result<()> {
        self.update_character_field("update character ship", "ship_id", id, ship_id)
            .await
    }

    pub async fn update_character_last_login(
        &self,
        id: i64,
        last_login_at: Option<i64>,
    ) -> Result<()> {
        self.update_character_field(
            "update character last login",
            "last_login_at",
            id,
            last_login_at,
        )
        .await
    }

    pub async fn update_character_skill_points(
        &self,
        id: i64,
        total_sp: Option<i64>,
        unallocated_sp: Option<i64>,
    ) -> Result<()> {
        const OP: &str = "update character skill points";
        let res = sqlx::query("UPDATE characters SET total_sp = ?1, unallocated_sp = ?2 WHERE id = ?3")
            .bind(total_sp)
            .bind(unallocated_sp)
            .bind(id)
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn update_character_wallet_balance(
        &self,
        id: i64,
        balance: Option<f64>,
    ) -> Result<()> {
        const OP: &str = "update character wallet balance";
        let res = sqlx::query("UPDATE characters SET wallet_balance = ?1 WHERE id = ?2")
            .bind(balance)
            .bind(id)
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn update_character_asset_value(&self, id: i64, value: Option<f64>) -> Result<()> {
        const OP: &str = "update character asset value";
        let res = sqlx::query("UPDATE characters SET asset_value = ?1 WHERE id = ?2")
            .bind(value)
            .bind(id)
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn update_character_is_training_watched(
        &self,
        id: i64,
        is_watched: bool,
    ) -> Result<()> {
        const OP: &str = "update character is training watched";
        let res = sqlx::query("UPDATE characters SET is_training_watched = ?1 WHERE id = ?2")
            .bind(is_watched)
            .bind(id)
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn update_character_field(
        &self,
        op: &'static str,
        column: &'static str,
        id: i64,
        value: Option<i64>,
    ) -> Result<()> {
        // `column` is a compile-time constant at every call site.
        let sql = format!("UPDATE characters SET {column} = ?1 WHERE id = ?2");
        let res = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(self.writer())
            .await
            .map_err(map_db_err(op))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
