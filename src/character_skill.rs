//! Trained skills, one row per character and skill type.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{map_db_err, map_get_err, Result};
use crate::model::{CharacterSkill, EveType};
use crate::storage::{require_id, Storage};

#[derive(Debug, Clone, Default)]
pub struct UpdateOrCreateCharacterSkillParams {
    pub character_id: i64,
    pub eve_type_id: i64,
    pub active_skill_level: i64,
    pub trained_skill_level: i64,
    pub skill_points_in_skill: i64,
}

impl Storage {
    pub async fn update_or_create_character_skill(
        &self,
        arg: UpdateOrCreateCharacterSkillParams,
    ) -> Result<()> {
        const OP: &str = "update or create character skill";
        require_id(OP, "character_id", arg.character_id)?;
        require_id(OP, "eve_type_id", arg.eve_type_id)?;
        sqlx::query(
            "INSERT INTO character_skills \
             (character_id, eve_type_id, active_skill_level, trained_skill_level, \
              skill_points_in_skill) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (character_id, eve_type_id) DO UPDATE SET \
               active_skill_level = excluded.active_skill_level, \
               trained_skill_level = excluded.trained_skill_level, \
               skill_points_in_skill = excluded.skill_points_in_skill",
        )
        .bind(arg.character_id)
        .bind(arg.eve_type_id)
        .bind(arg.active_skill_level)
        .bind(arg.trained_skill_level)
        .bind(arg.skill_points_in_skill)
        .execute(self.writer())
        .await
        .map_err(map_db_err(OP))?;
        Ok(())
    }

    pub async fn get_character_skill(
        &self,
        character_id: i64,
        eve_type_id: i64,
    ) -> Result<CharacterSkill> {
        const OP: &str = "get character skill";
        let row = sqlx::query(
            "SELECT id, character_id, eve_type_id, active_skill_level, trained_skill_level, \
                    skill_points_in_skill \
             FROM character_skills WHERE character_id = ?1 AND eve_type_id = ?2",
        )
        .bind(character_id)
        .bind(eve_type_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        let eve_type = self.get_eve_type(row.get("eve_type_id")).await?;
        Ok(skill_from_row(&row, eve_type))
    }

    pub async fn list_character_skills(&self, character_id: i64) -> Result<Vec<CharacterSkill>> {
        const OP: &str = "list character skills";
        let rows = sqlx::query(
            "SELECT id, character_id, eve_type_id, active_skill_level, trained_skill_level, \
                    skill_points_in_skill \
             FROM character_skills WHERE character_id = ? ORDER BY eve_type_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut skills = Vec::with_capacity(rows.len());
        for row in rows {
            let eve_type = self.get_eve_type(row.get("eve_type_id")).await?;
            skills.push(skill_from_row(&row, eve_type));
        }
        Ok(skills)
    }

    pub async fn list_character_skill_ids(&self, character_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT eve_type_id FROM character_skills WHERE character_id = ? ORDER BY eve_type_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err("list character skill ids"))
    }

    /// Removes skills by type ID, used to prune skills no longer reported
    /// upstream. An empty slice is a no-op.
    pub async fn delete_character_skills(
        &self,
        character_id: i64,
        eve_type_ids: &[i64],
    ) -> Result<()> {
        const OP: &str = "delete character skills";
        if eve_type_ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; eve_type_ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM character_skills \
             WHERE character_id = ? AND eve_type_id IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql).bind(character_id);
        for type_id in eve_type_ids {
            query = query.bind(type_id);
        }
        query
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        Ok(())
    }
}

fn skill_from_row(row: &SqliteRow, eve_type: EveType) -> CharacterSkill {
    CharacterSkill {
        id: row.get("id"),
        character_id: row.get("character_id"),
        eve_type,
        active_skill_level: row.get("active_skill_level"),
        trained_skill_level: row.get("trained_skill_level"),
        skill_points_in_skill: row.get("skill_points_in_skill"),
    }
}
