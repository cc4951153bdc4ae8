use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                                  // unique user ID
    pub full_name: String,                         // display name
    pub email: String,                             // unique, stored as given
    #[serde(skip_serializing)]
    pub password_hash: String,                     // Argon2 hash, not exposed in JSON
    pub is_verified: bool,                         // email ownership confirmed
    pub verification_code: Option<String>,         // 6-digit code, present while unverified
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,          // SHA-256 hex of an outstanding reset token
    pub reset_token_expiry: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a fresh, unverified user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub verification_code: String,
}

impl User {
    /// True while a reset token pair is stored; both fields move together.
    pub fn has_pending_reset(&self) -> bool {
        self.reset_token_hash.is_some() && self.reset_token_expiry.is_some()
    }
}
