use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::repo_types::User;
use crate::auth::services::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Request guard for protected routes. Verifies the bearer token, loads the
/// user it names and requires the stored token to still match the presented
/// one, so logout and re-login invalidate earlier tokens immediately.
///
/// Every auth failure collapses to 401 "Not authorized"; the reason is never
/// surfaced to the client. A store failure is not an auth failure and
/// propagates as a 500.
pub struct AuthedUser(pub User);

/// Resolve the store lookup into an authenticated user. Unknown user and
/// stale token collapse to 401; a lookup error stays an error.
fn require_active_session(
    lookup: anyhow::Result<Option<User>>,
    presented: &str,
) -> Result<User, ApiError> {
    let user = lookup?.ok_or_else(ApiError::not_authorized)?;
    if user.token.as_deref() != Some(presented) {
        warn!(user_id = %user.id, "stale or revoked token");
        return Err(ApiError::not_authorized());
    }
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::not_authorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(ApiError::not_authorized)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::not_authorized()
        })?;

        let lookup = User::find_by_id(&state.db, claims.sub).await;
        let user = require_active_session(lookup, token)?;

        Ok(AuthedUser(user))
    }
}

#[cfg(test)]
mod gate_tests {
    use super::*;
    use crate::auth::dto::Subscription;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user_with_token(token: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "hash".into(),
            subscription: Subscription::Starter,
            token: token.map(str::to_string),
            avatar_url: "/avatars/a.png".into(),
            verify: true,
            verification_token: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn matching_token_passes() {
        let user = user_with_token(Some("jwt"));
        let ok = require_active_session(Ok(Some(user)), "jwt").unwrap();
        assert_eq!(ok.token.as_deref(), Some("jwt"));
    }

    #[test]
    fn unknown_user_collapses_to_401() {
        let err = require_active_session(Ok(None), "jwt").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Not authorized");
    }

    #[test]
    fn logged_out_and_superseded_tokens_collapse_to_401() {
        let err = require_active_session(Ok(Some(user_with_token(None))), "jwt").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err =
            require_active_session(Ok(Some(user_with_token(Some("newer")))), "jwt").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Not authorized");
    }

    #[test]
    fn store_failure_stays_a_server_error() {
        let err =
            require_active_session(Err(anyhow::anyhow!("connection refused")), "jwt").unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
