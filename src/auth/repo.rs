use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::{NewUser, User};

/// Narrow persistence seam for user records. The auth service only ever
/// needs lookup-by-unique-field plus create/save, so storage stays swappable.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_verification_code(&self, code: &str) -> anyhow::Result<Option<User>>;
    /// Lookup by reset-token hash, ignoring tokens whose expiry is at or before `now`.
    async fn find_by_reset_token_hash(
        &self,
        hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, full_name, email, password_hash, is_verified, \
     verification_code, reset_token_hash, reset_token_expiry, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_verification_code(&self, code: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE verification_code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_reset_token_hash(
        &self,
        hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE reset_token_hash = $1 AND reset_token_expiry > $2"
        ))
        .bind(hash)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (full_name, email, password_hash, is_verified, verification_code) \
             VALUES ($1, $2, $3, FALSE, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.verification_code)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET full_name = $2, email = $3, password_hash = $4, \
             is_verified = $5, verification_code = $6, reset_token_hash = $7, \
             reset_token_expiry = $8 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(&user.verification_code)
        .bind(&user.reset_token_hash)
        .bind(user.reset_token_expiry)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
