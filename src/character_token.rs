//! OAuth tokens and their scope lists.
//!
//! The scope list is replaced atomically with the token itself so a token
//! row can never be observed with a stale grant set.

use sqlx::Row;
use tracing::debug;

use crate::error::{map_db_err, map_get_err, Result};
use crate::model::CharacterToken;
use crate::storage::{require_id, require_str, Storage};

#[derive(Debug, Clone, Default)]
pub struct UpdateOrCreateCharacterTokenParams {
    pub character_id: i64,
    pub access_token: String,
    pub expires_at: i64,
    pub refresh_token: String,
    pub token_type: String,
    pub scopes: Vec<String>,
}

impl Storage {
    pub async fn update_or_create_character_token(
        &self,
        arg: UpdateOrCreateCharacterTokenParams,
    ) -> Result<()> {
        const OP: &str = "update or create character token";
        require_id(OP, "character_id", arg.character_id)?;
        require_str(OP, "access_token", &arg.access_token)?;

        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        sqlx::query(
            "INSERT INTO character_tokens \
             (character_id, access_token, expires_at, refresh_token, token_type) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (character_id) DO UPDATE SET \
               access_token = excluded.access_token, \
               expires_at = excluded.expires_at, \
               refresh_token = excluded.refresh_token, \
               token_type = excluded.token_type",
        )
        .bind(arg.character_id)
        .bind(&arg.access_token)
        .bind(arg.expires_at)
        .bind(&arg.refresh_token)
        .bind(&arg.token_type)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err(OP))?;

        sqlx::query("DELETE FROM character_token_scopes WHERE character_id = ?")
            .bind(arg.character_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;

        for scope in &arg.scopes {
            require_str(OP, "scope name", scope)?;
            let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM scopes WHERE name = ?")
                .bind(scope)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err(OP))?;
            let scope_id = match existing {
                Some(id) => id,
                None => sqlx::query_scalar("INSERT INTO scopes (name) VALUES (?) RETURNING id")
                    .bind(scope)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(map_db_err(OP))?,
            };
            sqlx::query(
                "INSERT INTO character_token_scopes (character_id, scope_id) VALUES (?1, ?2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(arg.character_id)
            .bind(scope_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        tx.commit().await.map_err(map_db_err(OP))?;
        debug!(
            target = "evevault",
            event = "token_upserted",
            character_id = arg.character_id,
            scopes = arg.scopes.len()
        );
        Ok(())
    }

    /// Returns the token with its granted scope names, sorted.
    pub async fn get_character_token(&self, character_id: i64) -> Result<CharacterToken> {
        const OP: &str = "get character token";
        let row = sqlx::query(
            "SELECT character_id, access_token, expires_at, refresh_token, token_type \
             FROM character_tokens WHERE character_id = ?",
        )
        .bind(character_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;

        let scopes: Vec<String> = sqlx::query_scalar(
            "SELECT s.name FROM scopes s \
             JOIN character_token_scopes cts ON cts.scope_id = s.id \
             WHERE cts.character_id = ? ORDER BY s.name",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;

        Ok(CharacterToken {
            character_id: row.get("character_id"),
            access_token: row.get("access_token"),
            expires_at: row.get("expires_at"),
            refresh_token: row.get("refresh_token"),
            token_type: row.get("token_type"),
            scopes,
        })
    }
}
