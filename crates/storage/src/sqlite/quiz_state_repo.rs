use async_trait::async_trait;
use quiz_core::model::{PersistedState, QuizId};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{
    QuizStateRepository, StorageError, decode_state, encode_state, state_key,
};

#[async_trait]
impl QuizStateRepository for SqliteRepository {
    async fn load_state(&self, quiz_id: &QuizId) -> Result<Option<PersistedState>, StorageError> {
        let row = sqlx::query("SELECT payload FROM quiz_state WHERE key = ?1")
            .bind(state_key(quiz_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        decode_state(&payload).map(Some)
    }

    async fn save_state(
        &self,
        quiz_id: &QuizId,
        state: &PersistedState,
    ) -> Result<(), StorageError> {
        let payload = encode_state(state)?;
        sqlx::query(
            r"
            INSERT INTO quiz_state (key, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            ",
        )
        .bind(state_key(quiz_id))
        .bind(payload)
        .bind(state.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
