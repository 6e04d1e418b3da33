//! Planetary industry colonies.
//!
//! A colony snapshot is three levels deep: planets own pins, pins own
//! contents. Refreshes replace the whole tree for a character in one
//! transaction so the three tables always describe the same sync pass.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use crate::error::{map_db_err, map_get_err, Error, Result};
use crate::model::{CharacterPlanet, PlanetPin, PlanetPinContent};
use crate::storage::{require_id, Storage};

#[derive(Debug, Clone, Default)]
pub struct CreateCharacterPlanetParams {
    pub character_id: i64,
    pub eve_planet_id: i64,
    pub last_update: i64,
    pub upgrade_level: i64,
    pub pins: Vec<CreatePlanetPinParams>,
}

#[derive(Debug, Clone, Default)]
pub struct CreatePlanetPinParams {
    pub pin_id: i64,
    pub eve_type_id: i64,
    pub schematic_id: Option<i64>,
    pub expiry_time: Option<i64>,
    pub contents: Vec<PlanetPinContent>,
}

impl Storage {
    /// Replaces the character's colonies with the supplied snapshot.
    pub async fn replace_character_planets(
        &self,
        character_id: i64,
        args: &[CreateCharacterPlanetParams],
    ) -> Result<()> {
        const OP: &str = "replace character planets";
        require_id(OP, "character_id", character_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        sqlx::query("DELETE FROM character_planets WHERE character_id = ?")
            .bind(character_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        for arg in args {
            insert_planet(&mut tx, character_id, arg).await?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        debug!(
            target = "evevault",
            event = "planets_replaced",
            character_id = character_id,
            count = args.len()
        );
        Ok(())
    }

    pub async fn get_character_planet(
        &self,
        character_id: i64,
        eve_planet_id: i64,
    ) -> Result<CharacterPlanet> {
        const OP: &str = "get character planet";
        let row = sqlx::query(
            "SELECT id, character_id, eve_planet_id, last_update, upgrade_level \
             FROM character_planets WHERE character_id = ?1 AND eve_planet_id = ?2",
        )
        .bind(character_id)
        .bind(eve_planet_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        self.planet_from_row(&row).await
    }

    pub async fn list_character_planets(&self, character_id: i64) -> Result<Vec<CharacterPlanet>> {
        const OP: &str = "list character planets";
        let rows = sqlx::query(
            "SELECT id, character_id, eve_planet_id, last_update, upgrade_level \
             FROM character_planets WHERE character_id = ? ORDER BY eve_planet_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut planets = Vec::with_capacity(rows.len());
        for row in rows {
            planets.push(self.planet_from_row(&row).await?);
        }
        Ok(planets)
    }

    async fn planet_from_row(&self, row: &SqliteRow) -> Result<CharacterPlanet> {
        const OP: &str = "resolve character planet";
        let planet = self.get_eve_planet(row.get("eve_planet_id")).await?;
        let planet_pk: i64 = row.get("id");
        let pin_rows = sqlx::query(
            "SELECT id, pin_id, eve_type_id, schematic_id, expiry_time \
             FROM planet_pins WHERE character_planet_id = ? ORDER BY pin_id",
        )
        .bind(planet_pk)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut pins = Vec::with_capacity(pin_rows.len());
        for pin_row in pin_rows {
            let kind = self.get_eve_type(pin_row.get("eve_type_id")).await?;
            let pin_pk: i64 = pin_row.get("id");
            let content_rows = sqlx::query(
                "SELECT eve_type_id, amount FROM planet_pin_contents \
                 WHERE pin_id = ? ORDER BY eve_type_id",
            )
            .bind(pin_pk)
            .fetch_all(self.reader())
            .await
            .map_err(map_db_err(OP))?;
            let contents = content_rows
                .iter()
                .map(|c| PlanetPinContent {
                    eve_type_id: c.get("eve_type_id"),
                    amount: c.get("amount"),
                })
                .collect();
            pins.push(PlanetPin {
                id: pin_pk,
                pin_id: pin_row.get("pin_id"),
                kind,
                schematic_id: pin_row.get("schematic_id"),
                expiry_time: pin_row.get("expiry_time"),
                contents,
            });
        }
        Ok(CharacterPlanet {
            id: planet_pk,
            character_id: row.get("character_id"),
            planet,
            last_update: row.get("last_update"),
            upgrade_level: row.get("upgrade_level"),
            pins,
        })
    }
}

async fn insert_planet(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    character_id: i64,
    arg: &CreateCharacterPlanetParams,
) -> Result<()> {
    const OP: &str = "create character planet";
    if arg.eve_planet_id == 0 {
        return Err(Error::InvalidArgument(format!(
            "{OP}: eve_planet_id must not be zero"
        )));
    }
    let planet_pk: i64 = sqlx::query_scalar(
        "INSERT INTO character_planets (character_id, eve_planet_id, last_update, upgrade_level) \
         VALUES (?1, ?2, ?3, ?4) RETURNING id",
    )
    .bind(character_id)
    .bind(arg.eve_planet_id)
    .bind(arg.last_update)
    .bind(arg.upgrade_level)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_db_err(OP))?;
    for pin in &arg.pins {
        if pin.pin_id == 0 || pin.eve_type_id == 0 {
            return Err(Error::InvalidArgument(format!(
                "{OP}: IDs must not be zero: {pin:?}"
            )));
        }
        let pin_pk: i64 = sqlx::query_scalar(
            "INSERT INTO planet_pins \
             (character_planet_id, pin_id, eve_type_id, schematic_id, expiry_time) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        )
        .bind(planet_pk)
        .bind(pin.pin_id)
        .bind(pin.eve_type_id)
        .bind(pin.schematic_id)
        .bind(pin.expiry_time)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_db_err(OP))?;
        for content in &pin.contents {
            sqlx::query(
                "INSERT INTO planet_pin_contents (pin_id, eve_type_id, amount) \
                 VALUES (?1, ?2, ?3)",
            )
            .bind(pin_pk)
            .bind(content.eve_type_id)
            .bind(content.amount)
            .execute(&mut **tx)
            .await
            .map_err(map_db_err(OP))?;
        }
    }
    Ok(())
}
