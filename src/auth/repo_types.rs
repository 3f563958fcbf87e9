use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::Subscription;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub subscription: Subscription,
    /// The single currently-valid bearer token, or None when logged out.
    /// A new login overwrites it, invalidating any prior session.
    pub token: Option<String>,
    pub avatar_url: String,
    pub verify: bool,
    /// Present exactly while unverified; cleared to None when consumed.
    pub verification_token: Option<String>,
    pub created_at: OffsetDateTime,
}
