use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthedUser,
    contacts::{
        dto::{CreateContactRequest, FavoriteRequest, UpdateContactRequest},
        repo_types::Contact,
    },
    error::{ApiError, ApiResult},
    extract::Json,
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contacts", get(list_contacts))
        .route("/api/contacts", post(create_contact))
        .route("/api/contacts/:id", get(get_contact))
        .route("/api/contacts/:id", put(update_contact))
        .route("/api/contacts/:id", delete(delete_contact))
        .route("/api/contacts/:id/favorite", patch(update_favorite))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

#[instrument(skip(state, user))]
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = Contact::list_by_owner(&state.db, user.id).await?;
    Ok(Json(contacts))
}

#[instrument(skip(state, user))]
pub async fn get_contact(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Contact>> {
    let contact = Contact::find_by_id(&state.db, user.id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(contact))
}

#[instrument(skip(state, user, payload))]
pub async fn create_contact(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Json(payload): Json<CreateContactRequest>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    payload.validate().map_err(ApiError::Validation)?;

    let contact = Contact::create(
        &state.db,
        user.id,
        &payload.name,
        &payload.email,
        &payload.phone,
    )
    .await?;
    info!(contact_id = %contact.id, owner = %user.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_contact(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> ApiResult<Json<Contact>> {
    payload.validate().map_err(ApiError::Validation)?;

    let contact = Contact::update(
        &state.db,
        user.id,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.phone.as_deref(),
        payload.favorite,
    )
    .await?
    .ok_or_else(not_found)?;
    Ok(Json(contact))
}

#[instrument(skip(state, user))]
pub async fn delete_contact(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Contact>> {
    let removed = Contact::delete(&state.db, user.id, id)
        .await?
        .ok_or_else(not_found)?;
    info!(contact_id = %removed.id, owner = %user.id, "contact deleted");
    Ok(Json(removed))
}

#[instrument(skip(state, user, payload))]
pub async fn update_favorite(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FavoriteRequest>,
) -> ApiResult<Json<Contact>> {
    let contact = Contact::set_favorite(&state.db, user.id, id, payload.favorite)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(contact))
}
