use crate::models::registration_token::RegistrationToken;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub use super::user_repository::{RepositoryError, RepositoryResult};

/// Persistence for registration tokens. The schema enforces at most one
/// token row per user; issuance policy (reuse vs. replace) lives in the
/// service layer.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait RegistrationTokenRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
    ) -> RepositoryResult<RegistrationToken>;
    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<RegistrationToken>>;
    async fn find_by_user(&self, user_id: i64) -> RepositoryResult<Option<RegistrationToken>>;
    async fn delete(&self, token: &str) -> RepositoryResult<()>;
    /// Removes every row past its expiration. Housekeeping only; never
    /// called on the request path.
    async fn delete_expired(&self, now: &str) -> RepositoryResult<u64>;
}

pub struct SqliteRegistrationTokenRepository {
    pool: SqlitePool,
}

impl SqliteRegistrationTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationTokenRepository for SqliteRegistrationTokenRepository {
    async fn insert(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
    ) -> RepositoryResult<RegistrationToken> {
        let result = sqlx::query(
            "INSERT INTO registration_tokens (user_id, token, expires_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => self
                .find_by_token(token)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => {
                if e.to_string().contains("UNIQUE") {
                    Err(RepositoryError::AlreadyExists)
                } else {
                    Err(RepositoryError::Database(e))
                }
            }
        }
    }

    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<RegistrationToken>> {
        let row = sqlx::query_as::<_, RegistrationToken>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM registration_tokens
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_user(&self, user_id: i64) -> RepositoryResult<Option<RegistrationToken>> {
        let row = sqlx::query_as::<_, RegistrationToken>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM registration_tokens
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, token: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM registration_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_expired(&self, now: &str) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM registration_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
