//! Sync bookkeeping for data sections.
//!
//! Updates are patches: a `None` field keeps the stored value, a `Some`
//! overwrites it. `updated_at` is refreshed on every write so staleness
//! checks never depend on which fields a sync pass happened to touch.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{decode_err, map_db_err, map_get_err, Result};
use crate::model::{CharacterSection, CharacterSectionStatus, GeneralSection, GeneralSectionStatus};
use crate::storage::{require_id, Storage};
use crate::time::now_ms;

#[derive(Debug, Clone, Default)]
pub struct UpdateOrCreateCharacterSectionStatusParams {
    pub character_id: i64,
    /// Outer `None` keeps the stored value; `Some(None)` clears it.
    pub completed_at: Option<Option<i64>>,
    pub content_hash: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<Option<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrCreateGeneralSectionStatusParams {
    pub completed_at: Option<Option<i64>>,
    pub content_hash: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<Option<i64>>,
}

impl Storage {
    pub async fn update_or_create_character_section_status(
        &self,
        section: CharacterSection,
        arg: UpdateOrCreateCharacterSectionStatusParams,
    ) -> Result<CharacterSectionStatus> {
        const OP: &str = "update or create character section status";
        require_id(OP, "character_id", arg.character_id)?;
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;

        let existing = sqlx::query(
            "SELECT completed_at, content_hash, error, started_at \
             FROM character_section_status WHERE character_id = ?1 AND section_id = ?2",
        )
        .bind(arg.character_id)
        .bind(section.as_db())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err(OP))?;

        let (completed_at, content_hash, error, started_at) =
            patch_fields(existing.as_ref(), &arg.completed_at, &arg.content_hash, &arg.error, &arg.started_at);
        let updated_at = now_ms();

        sqlx::query(
            "INSERT INTO character_section_status \
             (character_id, section_id, completed_at, content_hash, error, started_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT (character_id, section_id) DO UPDATE SET \
               completed_at = excluded.completed_at, \
               content_hash = excluded.content_hash, \
               error = excluded.error, \
               started_at = excluded.started_at, \
               updated_at = excluded.updated_at",
        )
        .bind(arg.character_id)
        .bind(section.as_db())
        .bind(completed_at)
        .bind(&content_hash)
        .bind(&error)
        .bind(started_at)
        .bind(updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err(OP))?;
        tx.commit().await.map_err(map_db_err(OP))?;

        Ok(CharacterSectionStatus {
            character_id: arg.character_id,
            section,
            completed_at,
            content_hash,
            error,
            started_at,
            updated_at,
        })
    }

    pub async fn get_character_section_status(
        &self,
        character_id: i64,
        section: CharacterSection,
    ) -> Result<CharacterSectionStatus> {
        const OP: &str = "get character section status";
        let row = sqlx::query(
            "SELECT character_id, section_id, completed_at, content_hash, error, \
                    started_at, updated_at \
             FROM character_section_status WHERE character_id = ?1 AND section_id = ?2",
        )
        .bind(character_id)
        .bind(section.as_db())
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        character_status_from_row(OP, &row)
    }

    pub async fn list_character_section_status(
        &self,
        character_id: i64,
    ) -> Result<Vec<CharacterSectionStatus>> {
        const OP: &str = "list character section status";
        let rows = sqlx::query(
            "SELECT character_id, section_id, completed_at, content_hash, error, \
                    started_at, updated_at \
             FROM character_section_status WHERE character_id = ? ORDER BY section_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        rows.iter().map(|row| character_status_from_row(OP, row)).collect()
    }

    pub async fn update_or_create_general_section_status(
        &self,
        section: GeneralSection,
        arg: UpdateOrCreateGeneralSectionStatusParams,
    ) -> Result<GeneralSectionStatus> {
        const OP: &str = "update or create general section status";
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;

        let existing = sqlx::query(
            "SELECT completed_at, content_hash, error, started_at \
             FROM general_section_status WHERE section_id = ?",
        )
        .bind(section.as_db())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err(OP))?;

        let (completed_at, content_hash, error, started_at) =
            patch_fields(existing.as_ref(), &arg.completed_at, &arg.content_hash, &arg.error, &arg.started_at);
        let updated_at = now_ms();

        sqlx::query(
            "INSERT INTO general_section_status \
             (section_id, completed_at, content_hash, error, started_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT (section_id) DO UPDATE SET \
               completed_at = excluded.completed_at, \
               content_hash = excluded.content_hash, \
               error = excluded.error, \
               started_at = excluded.started_at, \
               updated_at = excluded.updated_at",
        )
        .bind(section.as_db())
        .bind(completed_at)
        .bind(&content_hash)
        .bind(&error)
        .bind(started_at)
        .bind(updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err(OP))?;
        tx.commit().await.map_err(map_db_err(OP))?;

        Ok(GeneralSectionStatus {
            section,
            completed_at,
            content_hash,
            error,
            started_at,
            updated_at,
        })
    }

    pub async fn get_general_section_status(
        &self,
        section: GeneralSection,
    ) -> Result<GeneralSectionStatus> {
        const OP: &str = "get general section status";
        let row = sqlx::query(
            "SELECT section_id, completed_at, content_hash, error, started_at, updated_at \
             FROM general_section_status WHERE section_id = ?",
        )
        .bind(section.as_db())
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        general_status_from_row(OP, &row)
    }

    pub async fn list_general_section_status(&self) -> Result<Vec<GeneralSectionStatus>> {
        const OP: &str = "list general section status";
        let rows = sqlx::query(
            "SELECT section_id, completed_at, content_hash, error, started_at, updated_at \
             FROM general_section_status ORDER BY section_id",
        )
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        rows.iter().map(|row| general_status_from_row(OP, row)).collect()
    }
}

/// Merges patch fields over the stored row. A missing row falls back to
/// empty strings and absent timestamps.
fn patch_fields(
    existing: Option<&SqliteRow>,
    completed_at: &Option<Option<i64>>,
    content_hash: &Option<String>,
    error: &Option<String>,
    started_at: &Option<Option<i64>>,
) -> (Option<i64>, String, String, Option<i64>) {
    let (cur_completed, cur_hash, cur_error, cur_started) = match existing {
        Some(row) => (
            row.get::<Option<i64>, _>("completed_at"),
            row.get::<String, _>("content_hash"),
            row.get::<String, _>("error"),
            row.get::<Option<i64>, _>("started_at"),
        ),
        None => (None, String::new(), String::new(), None),
    };
    (
        completed_at.unwrap_or(cur_completed),
        content_hash.clone().unwrap_or(cur_hash),
        error.clone().unwrap_or(cur_error),
        started_at.unwrap_or(cur_started),
    )
}

fn character_status_from_row(op: &'static str, row: &SqliteRow) -> Result<CharacterSectionStatus> {
    let section_id: String = row.get("section_id");
    let section = CharacterSection::from_db(&section_id)
        .ok_or_else(|| decode_err(op, format!("unknown section: {section_id}")))?;
    Ok(CharacterSectionStatus {
        character_id: row.get("character_id"),
        section,
        completed_at: row.get("completed_at"),
        content_hash: row.get("content_hash"),
        error: row.get("error"),
        started_at: row.get("started_at"),
        updated_at: row.get("updated_at"),
    })
}

fn general_status_from_row(op: &'static str, row: &SqliteRow) -> Result<GeneralSectionStatus> {
    let section_id: String = row.get("section_id");
    let section = GeneralSection::from_db(&section_id)
        .ok_or_else(|| decode_err(op, format!("unknown section: {section_id}")))?;
    Ok(GeneralSectionStatus {
        section,
        completed_at: row.get("completed_at"),
        content_hash: row.get("content_hash"),
        error: row.get("error"),
        started_at: row.get("started_at"),
        updated_at: row.get("updated_at"),
    })
}
