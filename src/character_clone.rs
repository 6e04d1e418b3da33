//! Implants and jump clones.
//!
//! Both collections are sync snapshots: each refresh deletes the prior child
//! set for the character and inserts the fresh one inside a single
//! transaction, so readers never observe a mix of old and new rows.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use crate::error::{map_db_err, map_get_err, Error, Result};
use crate::model::{CharacterImplant, CharacterJumpClone, EveSolarSystem};
use crate::storage::{require_id, Storage};

#[derive(Debug, Clone, Default)]
pub struct CreateCharacterJumpCloneParams {
    pub character_id: i64,
    pub jump_clone_id: i64,
    pub location_id: i64,
    pub name: String,
    /// Implant type IDs installed in this clone.
    pub implants: Vec<i64>,
}

impl Storage {
    /// Replaces the character's implant set with `type_ids`.
    pub async fn replace_character_implants(
        &self,
        character_id: i64,
        type_ids: &[i64],
    ) -> Result<()> {
        const OP: &str = "replace character implants";
        require_id(OP, "character_id", character_id)?;
        for type_id in type_ids {
            require_id(OP, "eve_type_id", *type_id)?;
        }
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        sqlx::query("DELETE FROM character_implants WHERE character_id = ?")
            .bind(character_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        for type_id in type_ids {
            sqlx::query(
                "INSERT INTO character_implants (character_id, eve_type_id) VALUES (?1, ?2)",
            )
            .bind(character_id)
            .bind(type_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        debug!(
            target = "evevault",
            event = "implants_replaced",
            character_id = character_id,
            count = type_ids.len()
        );
        Ok(())
    }

    pub async fn list_character_implants(
        &self,
        character_id: i64,
    ) -> Result<Vec<CharacterImplant>> {
        const OP: &str = "list character implants";
        let rows = sqlx::query(
            "SELECT id, character_id, eve_type_id FROM character_implants \
             WHERE character_id = ? ORDER BY eve_type_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut implants = Vec::with_capacity(rows.len());
        for row in rows {
            let eve_type = self.get_eve_type(row.get("eve_type_id")).await?;
            implants.push(CharacterImplant {
                id: row.get("id"),
                character_id: row.get("character_id"),
                eve_type,
            });
        }
        Ok(implants)
    }

    /// Replaces the character's jump clones, including each clone's nested
    /// implant list, in one transaction.
    pub async fn replace_character_jump_clones(
        &self,
        character_id: i64,
        args: &[CreateCharacterJumpCloneParams],
    ) -> Result<()> {
        const OP: &str = "replace character jump clones";
        require_id(OP, "character_id", character_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        sqlx::query("DELETE FROM character_jump_clones WHERE character_id = ?")
            .bind(character_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        for arg in args {
            insert_jump_clone(&mut tx, arg).await?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        debug!(
            target = "evevault",
            event = "jump_clones_replaced",
            character_id = character_id,
            count = args.len()
        );
        Ok(())
    }

    pub async fn get_character_jump_clone(
        &self,
        character_id: i64,
        jump_clone_id: i64,
    ) -> Result<CharacterJumpClone> {
        const OP: &str = "get character jump clone";
        let row = sqlx::query(
            "SELECT id, character_id, jump_clone_id, location_id, name \
             FROM character_jump_clones WHERE character_id = ?1 AND jump_clone_id = ?2",
        )
        .bind(character_id)
        .bind(jump_clone_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        self.jump_clone_from_row(&row).await
    }

    pub async fn list_character_jump_clones(
        &self,
        character_id: i64,
    ) -> Result<Vec<CharacterJumpClone>> {
        const OP: &str = "list character jump clones";
        let rows = sqlx::query(
            "SELECT id, character_id, jump_clone_id, location_id, name \
             FROM character_jump_clones WHERE character_id = ? ORDER BY jump_clone_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut clones = Vec::with_capacity(rows.len());
        for row in rows {
            clones.push(self.jump_clone_from_row(&row).await?);
        }
        Ok(clones)
    }

    async fn jump_clone_from_row(&self, row: &SqliteRow) -> Result<CharacterJumpClone> {
        let location: EveSolarSystem = self.get_eve_solar_system(row.get("location_id")).await?;
        let clone_pk: i64 = row.get("id");
        let implant_type_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT eve_type_id FROM character_jump_clone_implants \
             WHERE clone_id = ? ORDER BY eve_type_id",
        )
        .bind(clone_pk)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err("list jump clone implants"))?;
        let mut implants = Vec::with_capacity(implant_type_ids.len());
        for type_id in implant_type_ids {
            implants.push(self.get_eve_type(type_id).await?);
        }
        Ok(CharacterJumpClone {
            id: clone_pk,
            character_id: row.get("character_id"),
            jump_clone_id: row.get("jump_clone_id"),
            location,
            name: row.get("name"),
            implants,
        })
    }
}

async fn insert_jump_clone(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    arg: &CreateCharacterJumpCloneParams,
) -> Result<()> {
    const OP: &str = "create character jump clone";
    if arg.character_id == 0 || arg.jump_clone_id == 0 || arg.location_id == 0 {
        return Err(Error::InvalidArgument(format!(
            "{OP}: IDs must not be zero: {arg:?}"
        )));
    }
    let conn: &mut SqliteConnection = &mut *tx;
    let clone_pk: i64 = sqlx::query_scalar(
        "INSERT INTO character_jump_clones (character_id, jump_clone_id, location_id, name) \
         VALUES (?1, ?2, ?3, ?4) RETURNING id",
    )
    .bind(arg.character_id)
    .bind(arg.jump_clone_id)
    .bind(arg.location_id)
    .bind(&arg.name)
    .fetch_one(conn)
    .await
    .map_err(map_db_err(OP))?;
    for type_id in &arg.implants {
        sqlx::query(
            "INSERT INTO character_jump_clone_implants (clone_id, eve_type_id) VALUES (?1, ?2)",
        )
        .bind(clone_pk)
        .bind(type_id)
        .execute(&mut **tx)
        .await
        .map_err(map_db_err(OP))?;
    }
    Ok(())
}
