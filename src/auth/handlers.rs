use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AvatarResponse, LoginRequest, LoginResponse, MessageResponse, PublicUser,
            RegisterRequest, RegisterResponse, RegisteredUser, ResendVerifyRequest, Subscription,
            SubscriptionRequest,
        },
        extractors::AuthedUser,
        repo_types::User,
        services::{hash_password, is_valid_email, verify_password, JwtKeys},
    },
    avatars::{ext_from_mime, gravatar_url},
    error::{ApiError, ApiResult},
    extract::Json,
    mailer::send_verification,
    state::AppState,
};

const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/current", get(current))
        .route("/api/auth/subscription", patch(subscription))
        .route(
            "/api/auth/avatars",
            patch(update_avatar).layer(DefaultBodyLimit::max(2 * AVATAR_MAX_BYTES)),
        )
        .route("/api/auth/verify/:token", get(verify_email))
        .route("/api/auth/verify", post(resend_verification))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if payload.password.len() < 6 {
        warn!("password too short");
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    // Pre-check; the unique index on email backstops concurrent registrations.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email in use".into()));
    }

    let hash = hash_password(&payload.password)?;
    let avatar_url = gravatar_url(&payload.email);
    let verification_token = Uuid::new_v4().to_string();

    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        &avatar_url,
        &verification_token,
    )
    .await?;

    // Best-effort dispatch: a mail failure is logged, never fails signup.
    if let Err(err) = send_verification(
        state.mailer.as_ref(),
        &state.config.mailer.base_url,
        &user.email,
        &verification_token,
    )
    .await
    {
        warn!(error = %err, email = %user.email, "verification email dispatch failed");
    }

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: RegisteredUser {
                email: user.email,
                subscription: user.subscription,
                avatar_url: user.avatar_url,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email format".into()));
    }

    // Unknown email and wrong password share one message and status so a
    // caller cannot enumerate registered addresses.
    let bad_credentials = || ApiError::Unauthorized("Email or password is wrong".into());

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(bad_credentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(bad_credentials());
    }

    if !user.verify {
        warn!(user_id = %user.id, "login before email verification");
        return Err(ApiError::Forbidden("Email is not verified".into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    // Overwrites any previous token: one active session per account.
    User::set_token(&state.db, user.id, Some(&token)).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser {
            email: user.email,
            subscription: user.subscription,
        },
    }))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> ApiResult<StatusCode> {
    User::set_token(&state.db, user.id, None).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(user))]
pub async fn current(AuthedUser(user): AuthedUser) -> Json<PublicUser> {
    Json(PublicUser {
        email: user.email,
        subscription: user.subscription,
    })
}

#[instrument(skip(state, user, payload))]
pub async fn subscription(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Json(payload): Json<SubscriptionRequest>,
) -> ApiResult<Json<PublicUser>> {
    if payload.subscription.is_empty() {
        return Err(ApiError::Validation("Subscription is required".into()));
    }
    let subscription: Subscription = payload.subscription.parse().map_err(|_| {
        ApiError::Validation("Subscription must be one of [starter, pro, business]".into())
    })?;

    let user = User::set_subscription(&state.db, user.id, subscription).await?;
    info!(user_id = %user.id, subscription = %user.subscription, "subscription updated");
    Ok(Json(PublicUser {
        email: user.email,
        subscription: user.subscription,
    }))
}

#[instrument(skip(state, user, multipart))]
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Malformed multipart body".into()))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let Some(ext) = ext_from_mime(&content_type) else {
            return Err(ApiError::Validation("Unsupported avatar file type".into()));
        };

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("Failed to read avatar upload".into()))?;
        if data.len() > AVATAR_MAX_BYTES {
            return Err(ApiError::Validation("Avatar file is too large".into()));
        }

        let staged = state.avatars.stage(user.id, ext, &data).await?;
        let avatar_url = state.avatars.relocate(&staged).await?;
        User::set_avatar_url(&state.db, user.id, &avatar_url).await?;

        info!(user_id = %user.id, %avatar_url, "avatar updated");
        return Ok(Json(AvatarResponse {
            message: "Avatar updated".into(),
            avatar_url,
        }));
    }

    Err(ApiError::Validation("avatar file is required".into()))
}

#[instrument(skip(state))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    // One atomic update; a spent token matches nothing, same as an unknown
    // one, so the response never confirms whether a token ever existed.
    let user = User::consume_verification(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "email verified");
    Ok(Json(MessageResponse {
        message: "Verification successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(mut payload): Json<ResendVerifyRequest>,
) -> ApiResult<Json<MessageResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() {
        return Err(ApiError::Validation("missing required field email".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Email not found".into()))?;

    if user.verify {
        return Err(ApiError::Validation(
            "Verification has already been passed".into(),
        ));
    }

    // The original token is re-sent as-is, never rotated.
    let token = user
        .verification_token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("unverified user has no verification token"))?;

    send_verification(
        state.mailer.as_ref(),
        &state.config.mailer.base_url,
        &user.email,
        token,
    )
    .await?;

    info!(user_id = %user.id, "verification email re-sent");
    Ok(Json(MessageResponse {
        message: "Verification email sent".into(),
    }))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn login_response_shape() {
        let json = serde_json::to_value(LoginResponse {
            token: "jwt".into(),
            user: PublicUser {
                email: "a@x.com".into(),
                subscription: Subscription::Starter,
            },
        })
        .unwrap();
        assert_eq!(json["token"], "jwt");
        assert_eq!(json["user"]["email"], "a@x.com");
        assert_eq!(json["user"]["subscription"], "starter");
        assert!(json["user"].get("avatarURL").is_none());
    }

    #[test]
    fn message_response_shape() {
        let json = serde_json::to_value(MessageResponse {
            message: "Verification successful".into(),
        })
        .unwrap();
        assert_eq!(json["message"], "Verification successful");
    }
}
