//! Static reference data from the game universe: the inventory chain
//! (category > group > type), races, and the map chain
//! (region > constellation > solar system > planet).
//!
//! Reference rows are populated with get-or-create idioms so overlapping
//! sync runs never trip over duplicate keys, and existing rows are never
//! overwritten.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

use crate::error::{map_db_err, map_get_err, Result};
use crate::model::{
    EveCategory, EveConstellation, EveGroup, EvePlanet, EveRace, EveRegion, EveSolarSystem,
    EveType,
};
use crate::storage::{require_id, Storage};

async fn row_exists<'e, E>(executor: E, table: &str, id: i64) -> sqlx::Result<bool>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    // `table` is a compile-time constant at every call site.
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?");
    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

impl Storage {
    // -- inventory chain ---------------------------------------------------

    pub async fn get_eve_category(&self, id: i64) -> Result<EveCategory> {
        let row = sqlx::query("SELECT id, name, is_published FROM eve_categories WHERE id = ?")
            .bind(id)
            .fetch_one(self.reader())
            .await
            .map_err(map_get_err("get eve category"))?;
        Ok(category_from_row(&row))
    }

    pub async fn get_or_create_eve_category(
        &self,
        id: i64,
        name: &str,
        is_published: bool,
    ) -> Result<EveCategory> {
        const OP: &str = "get or create eve category";
        require_id(OP, "id", id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_categories", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query("INSERT INTO eve_categories (id, name, is_published) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(name)
                .bind(is_published)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_category(id).await
    }

    pub async fn get_eve_group(&self, id: i64) -> Result<EveGroup> {
        let row = sqlx::query(
            "SELECT id, eve_category_id, name, is_published FROM eve_groups WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err("get eve group"))?;
        let category = self.get_eve_category(row.get("eve_category_id")).await?;
        Ok(EveGroup {
            id: row.get("id"),
            category,
            name: row.get("name"),
            is_published: row.get("is_published"),
        })
    }

    pub async fn get_or_create_eve_group(
        &self,
        id: i64,
        category_id: i64,
        name: &str,
        is_published: bool,
    ) -> Result<EveGroup> {
        const OP: &str = "get or create eve group";
        require_id(OP, "id", id)?;
        require_id(OP, "category_id", category_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_groups", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query(
                "INSERT INTO eve_groups (id, eve_category_id, name, is_published) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(category_id)
            .bind(name)
            .bind(is_published)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_group(id).await
    }

    pub async fn get_eve_type(&self, id: i64) -> Result<EveType> {
        let row = sqlx::query(
            "SELECT id, eve_group_id, name, description, is_published FROM eve_types WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err("get eve type"))?;
        let group = self.get_eve_group(row.get("eve_group_id")).await?;
        Ok(EveType {
            id: row.get("id"),
            group,
            name: row.get("name"),
            description: row.get("description"),
            is_published: row.get("is_published"),
        })
    }

    pub async fn get_or_create_eve_type(
        &self,
        id: i64,
        group_id: i64,
        name: &str,
        description: &str,
        is_published: bool,
    ) -> Result<EveType> {
        const OP: &str = "get or create eve type";
        require_id(OP, "id", id)?;
        require_id(OP, "group_id", group_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_types", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query(
                "INSERT INTO eve_types (id, eve_group_id, name, description, is_published) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(id)
            .bind(group_id)
            .bind(name)
            .bind(description)
            .bind(is_published)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_type(id).await
    }

    // -- races -------------------------------------------------------------

    pub async fn get_eve_race(&self, id: i64) -> Result<EveRace> {
        let row = sqlx::query("SELECT id, name, description FROM eve_races WHERE id = ?")
            .bind(id)
            .fetch_one(self.reader())
            .await
            .map_err(map_get_err("get eve race"))?;
        Ok(EveRace {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
        })
    }

    pub async fn get_or_create_eve_race(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<EveRace> {
        const OP: &str = "get or create eve race";
        require_id(OP, "id", id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_races", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query("INSERT INTO eve_races (id, name, description) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(name)
                .bind(description)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_race(id).await
    }

    // -- map chain ---------------------------------------------------------

    pub async fn get_eve_region(&self, id: i64) -> Result<EveRegion> {
        let row = sqlx::query("SELECT id, name, description FROM eve_regions WHERE id = ?")
            .bind(id)
            .fetch_one(self.reader())
            .await
            .map_err(map_get_err("get eve region"))?;
        Ok(EveRegion {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
        })
    }

    pub async fn get_or_create_eve_region(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<EveRegion> {
        const OP: &str = "get or create eve region";
        require_id(OP, "id", id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_regions", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query("INSERT INTO eve_regions (id, name, description) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(name)
                .bind(description)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_region(id).await
    }

    pub async fn get_eve_constellation(&self, id: i64) -> Result<EveConstellation> {
        let row =
            sqlx::query("SELECT id, eve_region_id, name FROM eve_constellations WHERE id = ?")
                .bind(id)
                .fetch_one(self.reader())
                .await
                .map_err(map_get_err("get eve constellation"))?;
        let region = self.get_eve_region(row.get("eve_region_id")).await?;
        Ok(EveConstellation {
            id: row.get("id"),
            region,
            name: row.get("name"),
        })
    }

    pub async fn get_or_create_eve_constellation(
        &self,
        id: i64,
        region_id: i64,
        name: &str,
    ) -> Result<EveConstellation> {
        const OP: &str = "get or create eve constellation";
        require_id(OP, "id", id)?;
        require_id(OP, "region_id", region_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_constellations", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query(
                "INSERT INTO eve_constellations (id, eve_region_id, name) VALUES (?1, ?2, ?3)",
            )
            .bind(id)
            .bind(region_id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_constellation(id).await
    }

    pub async fn get_eve_solar_system(&self, id: i64) -> Result<EveSolarSystem> {
        let row = sqlx::query(
            "SELECT id, eve_constellation_id, name, security_status \
             FROM eve_solar_systems WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err("get eve solar system"))?;
        let constellation = self
            .get_eve_constellation(row.get("eve_constellation_id"))
            .await?;
        Ok(EveSolarSystem {
            id: row.get("id"),
            constellation,
            name: row.get("name"),
            security_status: row.get("security_status"),
        })
    }

    pub async fn get_or_create_eve_solar_system(
        &self,
        id: i64,
        constellation_id: i64,
        name: &str,
        security_status: f64,
    ) -> Result<EveSolarSystem> {
        const OP: &str = "get or create eve solar system";
        require_id(OP, "id", id)?;
        require_id(OP, "constellation_id", constellation_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_solar_systems", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query(
                "INSERT INTO eve_solar_systems (id, eve_constellation_id, name, security_status) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(constellation_id)
            .bind(name)
            .bind(security_status)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_solar_system(id).await
    }

    pub async fn get_eve_planet(&self, id: i64) -> Result<EvePlanet> {
        let row = sqlx::query(
            "SELECT id, eve_solar_system_id, eve_type_id, name FROM eve_planets WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err("get eve planet"))?;
        let solar_system = self
            .get_eve_solar_system(row.get("eve_solar_system_id"))
            .await?;
        let kind = self.get_eve_type(row.get("eve_type_id")).await?;
        Ok(EvePlanet {
            id: row.get("id"),
            solar_system,
            kind,
            name: row.get("name"),
        })
    }

    pub async fn get_or_create_eve_planet(
        &self,
        id: i64,
        solar_system_id: i64,
        type_id: i64,
        name: &str,
    ) -> Result<EvePlanet> {
        const OP: &str = "get or create eve planet";
        require_id(OP, "id", id)?;
        require_id(OP, "solar_system_id", solar_system_id)?;
        require_id(OP, "type_id", type_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        if !row_exists(&mut *tx, "eve_planets", id)
            .await
            .map_err(map_db_err(OP))?
        {
            sqlx::query(
                "INSERT INTO eve_planets (id, eve_solar_system_id, eve_type_id, name) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(solar_system_id)
            .bind(type_id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        self.get_eve_planet(id).await
    }
}

fn category_from_row(row: &SqliteRow) -> EveCategory {
    EveCategory {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
    }
}
