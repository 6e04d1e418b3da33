//! Generic named+categorized reference records (characters, corporations,
//! alliances, mail lists, ...) used wherever IDs need display names.

use std::collections::HashSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

use crate::error::{decode_err, map_create_err, map_db_err, map_get_err, Result};
use crate::model::{EveEntity, EveEntityCategory};
use crate::storage::{require_id, Storage};

fn entity_from_row(op: &'static str, row: &SqliteRow) -> Result<EveEntity> {
    let category: String = row.get("category");
    let category = EveEntityCategory::from_db(&category)
        .ok_or_else(|| decode_err(op, format!("unknown eve entity category: {category}")))?;
    Ok(EveEntity {
        id: row.get("id"),
        category,
        name: row.get("name"),
    })
}

async fn fetch_entity<'e, E>(executor: E, id: i64) -> sqlx::Result<SqliteRow>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("SELECT id, category, name FROM eve_entities WHERE id = ?")
        .bind(id)
        .fetch_one(executor)
        .await
}

async fn insert_entity<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    category: EveEntityCategory,
) -> sqlx::Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO eve_entities (id, category, name) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(category.as_db())
        .bind(name)
        .execute(executor)
        .await
        .map(|_| ())
}

impl Storage {
    pub async fn create_eve_entity(
        &self,
        id: i64,
        name: &str,
        category: EveEntityCategory,
    ) -> Result<EveEntity> {
        require_id("create eve entity", "id", id)?;
        insert_entity(self.writer(), id, name, category)
            .await
            .map_err(map_create_err("create eve entity"))?;
        Ok(EveEntity {
            id,
            category,
            name: name.to_string(),
        })
    }

    pub async fn get_eve_entity(&self, id: i64) -> Result<EveEntity> {
        let row = fetch_entity(self.reader(), id)
            .await
            .map_err(map_get_err("get eve entity"))?;
        entity_from_row("get eve entity", &row)
    }

    /// Returns the existing row or creates it, without ever overwriting
    /// existing values. Safe against duplicate-key races from overlapping
    /// sync runs.
    pub async fn get_or_create_eve_entity(
        &self,
        id: i64,
        name: &str,
        category: EveEntityCategory,
    ) -> Result<EveEntity> {
        const OP: &str = "get or create eve entity";
        require_id(OP, "id", id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        let row = match fetch_entity(&mut *tx, id).await {
            Ok(row) => row,
            Err(sqlx::Error::RowNotFound) => {
                insert_entity(&mut *tx, id, name, category)
                    .await
                    .map_err(map_db_err(OP))?;
                fetch_entity(&mut *tx, id).await.map_err(map_db_err(OP))?
            }
            Err(err) => return Err(map_db_err(OP)(err)),
        };
        tx.commit().await.map_err(map_db_err(OP))?;
        entity_from_row(OP, &row)
    }

    /// Creates the row or refreshes its name and category in place.
    pub async fn update_or_create_eve_entity(
        &self,
        id: i64,
        name: &str,
        category: EveEntityCategory,
    ) -> Result<EveEntity> {
        const OP: &str = "update or create eve entity";
        require_id(OP, "id", id)?;
        sqlx::query(
            "INSERT INTO eve_entities (id, category, name) VALUES (?1, ?2, ?3) \
             ON CONFLICT (id) DO UPDATE SET category = excluded.category, name = excluded.name",
        )
        .bind(id)
        .bind(category.as_db())
        .bind(name)
        .execute(self.writer())
        .await
        .map_err(map_db_err(OP))?;
        Ok(EveEntity {
            id,
            category,
            name: name.to_string(),
        })
    }

    pub async fn list_eve_entities_by_partial_name(&self, partial: &str) -> Result<Vec<EveEntity>> {
        const OP: &str = "list eve entities by partial name";
        let rows = sqlx::query(
            "SELECT id, category, name FROM eve_entities WHERE name LIKE ? ORDER BY name",
        )
        .bind(format!("%{partial}%"))
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        rows.iter().map(|row| entity_from_row(OP, row)).collect()
    }

    pub async fn list_eve_entity_ids(&self) -> Result<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM eve_entities ORDER BY id")
            .fetch_all(self.reader())
            .await
            .map_err(map_db_err("list eve entity ids"))
    }

    /// IDs from `ids` that have no entity row yet, sorted ascending.
    pub async fn missing_eve_entity_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let current: HashSet<i64> = self.list_eve_entity_ids().await?.into_iter().collect();
        let mut missing: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| !current.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        Ok(missing)
    }
}
