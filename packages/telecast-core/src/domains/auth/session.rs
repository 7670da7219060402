use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::kernel::BaseSessionStore;

/// How long intermediate login material survives between steps.
pub const PENDING_AUTH_TTL_SECONDS: u64 = 300;

/// Mint an opaque bearer token (random UUID)
pub fn mint_token() -> String {
    Uuid::new_v4().to_string()
}

/// Postgres-backed session store.
///
/// Every call is a fresh query - no in-process caching - so independent
/// request lifetimes always observe the durable state. Expiry is enforced
/// in the read query; expired rows are left in place (lazy invalidation).
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSessionStore for PgSessionStore {
    async fn put(&self, token: &str, auth_blob: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let expires_at: Option<DateTime<Utc>> =
            ttl_seconds.map(|ttl| Utc::now() + Duration::seconds(ttl as i64));

        sqlx::query(
            r#"
            INSERT INTO telegram_sessions (token, auth_blob, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (token) DO UPDATE
            SET auth_blob = EXCLUDED.auth_blob,
                expires_at = EXCLUDED.expires_at,
                updated_at = now()
            "#,
        )
        .bind(token)
        .bind(auth_blob)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        let auth_blob: Option<String> = sqlx::query_scalar(
            r#"
            SELECT auth_blob FROM telegram_sessions
            WHERE token = $1
              AND (expires_at IS NULL OR expires_at > now())
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(auth_blob)
    }

    async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM telegram_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_tokens_are_unique() {
        let a = mint_token();
        let b = mint_token();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }
}
