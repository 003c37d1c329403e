//! PostgreSQL implementation of ContextProfileRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::column;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::profile::UserContextProfile;
use crate::ports::ContextProfileRepository;

/// PostgreSQL implementation of ContextProfileRepository.
#[derive(Clone)]
pub struct PostgresContextProfileRepository {
    pool: PgPool,
}

impl PostgresContextProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContextProfileRepository for PostgresContextProfileRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserContextProfile>, DomainError> {
        let row = sqlx::query(
            "SELECT profile_data, last_updated FROM user_context_profiles WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch context profile", e))?;

        match row {
            Some(row) => {
                let last_updated: DateTime<Utc> = column(&row, "last_updated")?;
                Ok(Some(UserContextProfile {
                    user_id: user_id.clone(),
                    profile_data: column(&row, "profile_data")?,
                    last_updated: Timestamp::from_datetime(last_updated),
                }))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, profile: &UserContextProfile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_context_profiles (user_id, profile_data, last_updated)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                profile_data = EXCLUDED.profile_data,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(profile.user_id.as_str())
        .bind(&profile.profile_data)
        .bind(profile.last_updated.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to save context profile", e))?;

        Ok(())
    }
}
