//! Bearer-token repository.
//!
//! Tokens are opaque random strings stored server-side with an expiry;
//! resolving one yields the `{subject id, role}` pair the auth gate hands
//! to route guards. Expired rows are ignored on lookup.
//!
//! TODO: sweep expired tokens periodically; they currently accumulate until
//! their user is deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use saltbox_core::{Role, UserId};

use super::RepositoryError;
use crate::models::CurrentUser;

/// Repository for bearer-token database operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO auth_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id.as_uuid())
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Resolve a bearer token to its authenticated actor, or `None` if the
    /// token is unknown or expired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is
    /// outside the closed enumeration.
    pub async fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct ActorRow {
            id: Uuid,
            name: String,
            role: String,
        }

        let row = sqlx::query_as::<_, ActorRow>(
            r"
            SELECT u.id, u.name, u.role
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1 AND t.expires_at > now()
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let role: Role = r.role.parse().map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
                })?;
                Ok(Some(CurrentUser {
                    id: UserId::new(r.id),
                    name: r.name,
                    role,
                }))
            }
            None => Ok(None),
        }
    }
}
