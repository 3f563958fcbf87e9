use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Contact record, always owned by a user. Every query is scoped by `owner`
/// so one tenant can never see or touch another tenant's contacts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub favorite: bool,
    #[serde(skip_serializing)]
    pub owner: Uuid,
    pub created_at: OffsetDateTime,
}
