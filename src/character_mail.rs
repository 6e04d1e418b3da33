//! Character mail, mail labels, and recipients.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use crate::error::{map_create_err, map_db_err, map_get_err, Error, Result};
use crate::model::{CharacterMail, CharacterMailLabel, EveEntity};
use crate::storage::{require_id, Storage};

#[derive(Debug, Clone, Default)]
pub struct UpdateOrCreateCharacterMailLabelParams {
    pub character_id: i64,
    pub label_id: i64,
    pub color: String,
    pub name: String,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CreateCharacterMailParams {
    pub character_id: i64,
    pub mail_id: i64,
    pub from_id: i64,
    pub label_ids: Vec<i64>,
    pub is_processed: bool,
    pub is_read: bool,
    pub recipient_ids: Vec<i64>,
    pub subject: String,
    pub body: String,
    pub timestamp: i64,
}

impl Storage {
    // -- labels ------------------------------------------------------------

    pub async fn update_or_create_character_mail_label(
        &self,
        arg: UpdateOrCreateCharacterMailLabelParams,
    ) -> Result<CharacterMailLabel> {
        const OP: &str = "update or create character mail label";
        require_id(OP, "character_id", arg.character_id)?;
        require_id(OP, "label_id", arg.label_id)?;
        sqlx::query(
            "INSERT INTO character_mail_labels \
             (character_id, label_id, color, name, unread_count) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (character_id, label_id) DO UPDATE SET \
               color = excluded.color, name = excluded.name, unread_count = excluded.unread_count",
        )
        .bind(arg.character_id)
        .bind(arg.label_id)
        .bind(&arg.color)
        .bind(&arg.name)
        .bind(arg.unread_count)
        .execute(self.writer())
        .await
        .map_err(map_db_err(OP))?;
        self.get_character_mail_label(arg.character_id, arg.label_id)
            .await
    }

    pub async fn get_character_mail_label(
        &self,
        character_id: i64,
        label_id: i64,
    ) -> Result<CharacterMailLabel> {
        let row = sqlx::query(
            "SELECT id, character_id, label_id, color, name, unread_count \
             FROM character_mail_labels WHERE character_id = ?1 AND label_id = ?2",
        )
        .bind(character_id)
        .bind(label_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err("get character mail label"))?;
        Ok(label_from_row(&row))
    }

    pub async fn list_character_mail_labels(
        &self,
        character_id: i64,
    ) -> Result<Vec<CharacterMailLabel>> {
        let rows = sqlx::query(
            "SELECT id, character_id, label_id, color, name, unread_count \
             FROM character_mail_labels WHERE character_id = ? ORDER BY label_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err("list character mail labels"))?;
        Ok(rows.iter().map(label_from_row).collect())
    }

    // -- mail --------------------------------------------------------------

    /// Creates a mail with its recipient and label associations; returns the
    /// mail's storage key.
    pub async fn create_character_mail(&self, arg: CreateCharacterMailParams) -> Result<i64> {
        const OP: &str = "create character mail";
        require_id(OP, "character_id", arg.character_id)?;
        require_id(OP, "mail_id", arg.mail_id)?;
        require_id(OP, "from_id", arg.from_id)?;
        if arg.recipient_ids.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "{OP}: missing recipients for mail {}",
                arg.mail_id
            )));
        }
        // The sender must already be resolvable to a named entity.
        self.get_eve_entity(arg.from_id).await?;

        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        let mail_pk: i64 = sqlx::query_scalar(
            "INSERT INTO character_mails \
             (character_id, body, from_id, is_processed, is_read, mail_id, subject, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
        )
        .bind(arg.character_id)
        .bind(&arg.body)
        .bind(arg.from_id)
        .bind(arg.is_processed)
        .bind(arg.is_read)
        .bind(arg.mail_id)
        .bind(&arg.subject)
        .bind(arg.timestamp)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_create_err(OP))?;

        for recipient_id in &arg.recipient_ids {
            sqlx::query(
                "INSERT INTO character_mail_recipients (mail_id, eve_entity_id) VALUES (?1, ?2)",
            )
            .bind(mail_pk)
            .bind(recipient_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err(OP))?;
        }
        set_mail_labels(&mut tx, arg.character_id, mail_pk, &arg.label_ids).await?;
        tx.commit().await.map_err(map_db_err(OP))?;
        debug!(
            target = "evevault",
            event = "mail_created",
            character_id = arg.character_id,
            mail_id = arg.mail_id
        );
        Ok(mail_pk)
    }

    pub async fn get_character_mail(
        &self,
        character_id: i64,
        mail_id: i64,
    ) -> Result<CharacterMail> {
        const OP: &str = "get character mail";
        let row = sqlx::query(
            "SELECT id, character_id, body, from_id, is_processed, is_read, mail_id, \
                    subject, timestamp \
             FROM character_mails WHERE character_id = ?1 AND mail_id = ?2",
        )
        .bind(character_id)
        .bind(mail_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_get_err(OP))?;
        let mail_pk: i64 = row.get("id");

        let from = self.get_eve_entity(row.get("from_id")).await?;

        let label_rows = sqlx::query(
            "SELECT l.id, l.character_id, l.label_id, l.color, l.name, l.unread_count \
             FROM character_mail_labels l \
             JOIN character_mail_mail_labels ml ON ml.character_mail_label_id = l.id \
             WHERE ml.character_mail_id = ? ORDER BY l.label_id",
        )
        .bind(mail_pk)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let labels = label_rows.iter().map(label_from_row).collect();

        let recipient_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT eve_entity_id FROM character_mail_recipients WHERE mail_id = ? \
             ORDER BY eve_entity_id",
        )
        .bind(mail_pk)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err(OP))?;
        let mut recipients: Vec<EveEntity> = Vec::with_capacity(recipient_ids.len());
        for id in recipient_ids {
            recipients.push(self.get_eve_entity(id).await?);
        }

        Ok(CharacterMail {
            id: mail_pk,
            character_id: row.get("character_id"),
            mail_id: row.get("mail_id"),
            from,
            subject: row.get("subject"),
            body: row.get("body"),
            is_processed: row.get("is_processed"),
            is_read: row.get("is_read"),
            timestamp: row.get("timestamp"),
            labels,
            recipients,
        })
    }

    /// Replaces the mail's label associations with `label_ids`, atomically.
    pub async fn update_character_mail_set_labels(
        &self,
        character_id: i64,
        mail_pk: i64,
        label_ids: &[i64],
    ) -> Result<()> {
        const OP: &str = "update character mail set labels";
        let mut tx = self.writer().begin().await.map_err(map_db_err(OP))?;
        set_mail_labels(&mut tx, character_id, mail_pk, label_ids).await?;
        tx.commit().await.map_err(map_db_err(OP))?;
        Ok(())
    }

    pub async fn update_character_mail(
        &self,
        character_id: i64,
        mail_pk: i64,
        is_read: bool,
        label_ids: &[i64],
    ) -> Result<()> {
        const OP: &str = "update character mail";
        let res = sqlx::query("UPDATE character_mails SET is_read = ?1 WHERE id = ?2")
            .bind(is_read)
            .bind(mail_pk)
            .execute(self.writer())
            .await
            .map_err(map_db_err(OP))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        self.update_character_mail_set_labels(character_id, mail_pk, label_ids)
            .await
    }

    pub async fn update_character_mail_set_processed(&self, mail_pk: i64) -> Result<()> {
        let res = sqlx::query("UPDATE character_mails SET is_processed = TRUE WHERE id = ?")
            .bind(mail_pk)
            .execute(self.writer())
            .await
            .map_err(map_db_err("update character mail set processed"))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn delete_character_mail(&self, character_id: i64, mail_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM character_mails WHERE character_id = ?1 AND mail_id = ?2")
            .bind(character_id)
            .bind(mail_id)
            .execute(self.writer())
            .await
            .map_err(map_db_err("delete character mail"))?;
        Ok(())
    }

    pub async fn list_character_mail_ids(&self, character_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT mail_id FROM character_mails WHERE character_id = ? ORDER BY mail_id",
        )
        .bind(character_id)
        .fetch_all(self.reader())
        .await
        .map_err(map_db_err("list character mail ids"))
    }

    pub async fn get_character_mail_count(&self, character_id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM character_mails WHERE character_id = ?")
            .bind(character_id)
            .fetch_one(self.reader())
            .await
            .map_err(map_db_err("get character mail count"))
    }

    pub async fn get_character_mail_unread_count(&self, character_id: i64) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM character_mails WHERE character_id = ? AND is_read = FALSE",
        )
        .bind(character_id)
        .fetch_one(self.reader())
        .await
        .map_err(map_db_err("get character mail unread count"))
    }
}

/// Rewrites the label links for one mail. Runs inside the caller's
/// transaction; every label must already exist for the character.
async fn set_mail_labels(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    character_id: i64,
    mail_pk: i64,
    label_ids: &[i64],
) -> Result<()> {
    const OP: &str = "set character mail labels";
    sqlx::query("DELETE FROM character_mail_mail_labels WHERE character_mail_id = ?")
        .bind(mail_pk)
        .execute(&mut **tx)
        .await
        .map_err(map_db_err(OP))?;
    for label_id in label_ids {
        let label_pk: i64 = sqlx::query_scalar(
            "SELECT id FROM character_mail_labels WHERE character_id = ?1 AND label_id = ?2",
        )
        .bind(character_id)
        .bind(label_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_get_err(OP))?;
        sqlx::query(
            "INSERT INTO character_mail_mail_labels \
             (character_mail_id, character_mail_label_id) VALUES (?1, ?2)",
        )
        .bind(mail_pk)
        .bind(label_pk)
        .execute(&mut **tx)
        .await
        .map_err(map_db_err(OP))?;
    }
    Ok(())
}

fn label_from_row(row: &SqliteRow) -> CharacterMailLabel {
    CharacterMailLabel {
        id: row.get("id"),
        character_id: row.get("character_id"),
        label_id: row.get("label_id"),
        color: row.get("color"),
        name: row.get("name"),
        unread_count: row.get("unread_count"),
    }
}
