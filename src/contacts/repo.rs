use sqlx::PgPool;
use uuid::Uuid;

use crate::contacts::repo_types::Contact;

const CONTACT_COLUMNS: &str = "id, name, email, phone, favorite, owner, created_at";

impl Contact {
    pub async fn list_by_owner(db: &PgPool, owner: Uuid) -> anyhow::Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE owner = $1 ORDER BY created_at DESC"
        ))
        .bind(owner)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(
        db: &PgPool,
        owner: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND owner = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    pub async fn create(
        db: &PgPool,
        owner: Uuid,
        name: &str,
        email: &str,
        phone: &str,
    ) -> anyhow::Result<Contact> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "INSERT INTO contacts (name, email, phone, owner) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(owner)
        .fetch_one(db)
        .await?;
        Ok(contact)
    }

    /// Partial update; absent fields keep their stored value.
    pub async fn update(
        db: &PgPool,
        owner: Uuid,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        favorite: Option<bool>,
    ) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "UPDATE contacts SET \
                 name = COALESCE($3, name), \
                 email = COALESCE($4, email), \
                 phone = COALESCE($5, phone), \
                 favorite = COALESCE($6, favorite) \
             WHERE id = $1 AND owner = $2 \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(favorite)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    pub async fn set_favorite(
        db: &PgPool,
        owner: Uuid,
        id: Uuid,
        favorite: bool,
    ) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "UPDATE contacts SET favorite = $3 WHERE id = $1 AND owner = $2 \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(favorite)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    /// Delete and return the removed row, or None if it was not the
    /// caller's contact.
    pub async fn delete(db: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "DELETE FROM contacts WHERE id = $1 AND owner = $2 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }
}
