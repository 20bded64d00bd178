use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{CredentialRepository, StorageError, StoredCredential};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CredentialRepository for SqliteRepository {
    async fn load_credential(&self) -> Result<Option<StoredCredential>, StorageError> {
        let row = sqlx::query("SELECT token, saved_at FROM credentials WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token: String = row.try_get("token").map_err(ser)?;
        let saved_at: DateTime<Utc> = row.try_get("saved_at").map_err(ser)?;
        Ok(Some(StoredCredential { token, saved_at }))
    }

    async fn save_credential(&self, credential: &StoredCredential) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO credentials (id, token, saved_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                saved_at = excluded.saved_at
            ",
        )
        .bind(&credential.token)
        .bind(credential.saved_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(saved_at = %credential.saved_at, "credential saved");
        Ok(())
    }

    async fn clear_credential(&self) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM credentials WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        tracing::debug!(removed = res.rows_affected(), "credential cleared");
        Ok(())
    }

    async fn discard_credential(&self, token: &str) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM credentials WHERE id = 1 AND token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        tracing::debug!(removed = res.rows_affected(), "credential discarded");
        Ok(res.rows_affected() > 0)
    }
}
