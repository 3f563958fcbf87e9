use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::dto::Subscription;
use crate::auth::repo_types::User;

const USER_COLUMNS: &str = "id, email, password_hash, subscription, token, avatar_url, verify, \
                            verification_token, created_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new unverified user with hashed password, default avatar and
    /// a pending verification token.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        avatar_url: &str,
        verification_token: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, avatar_url, verification_token) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(avatar_url)
        .bind(verification_token)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Overwrite the stored bearer token. `None` logs the user out; a new
    /// login stores a fresh token, invalidating any prior session. Relies on
    /// the store's atomic update-by-id, not on application locking.
    pub async fn set_token(db: &PgPool, id: Uuid, token: Option<&str>) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_subscription(
        db: &PgPool,
        id: Uuid,
        subscription: Subscription,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET subscription = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(subscription)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn set_avatar_url(db: &PgPool, id: Uuid, avatar_url: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET avatar_url = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar_url)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Consume a verification token. A single atomic update flips the user
    /// to verified and clears the token, so a second call with the same
    /// token matches no row: consumption is exactly-once, and a spent token
    /// is indistinguishable from one that never existed.
    pub async fn consume_verification(
        db: &PgPool,
        token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET verify = TRUE, verification_token = NULL \
             WHERE verification_token = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
