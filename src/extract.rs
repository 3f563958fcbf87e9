use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json` with this crate's error contract: any body rejection
/// (malformed JSON, missing field, wrong content type) becomes a 400
/// `{"message": ...}` response. Deserializer detail is never echoed back.
#[derive(Debug)]
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(_) => Err(ApiError::Validation("Invalid request body".into())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod json_tests {
    use super::*;
    use crate::auth::dto::RegisterRequest;
    use axum::http::StatusCode;

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn missing_field_yields_400_message_shape() {
        let req = json_request(r#"{"email":"a@x.com"}"#);
        let err = Json::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap_err();

        let (status, json) = response_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid request body");
        // No deserializer internals in the body.
        assert!(!json.to_string().contains("password"));
    }

    #[tokio::test]
    async fn malformed_json_yields_400() {
        let req = json_request("{not json");
        let err = Json::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap_err();
        let (status, json) = response_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn missing_content_type_yields_400() {
        let req = axum::http::Request::builder()
            .method("POST")
            .body(axum::body::Body::from(
                r#"{"email":"a@x.com","password":"secret1"}"#,
            ))
            .unwrap();
        let err = Json::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap_err();
        let (status, _) = response_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let req = json_request(r#"{"email":"a@x.com","password":"secret1"}"#);
        let Json(payload) = Json::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(payload.email, "a@x.com");
        assert_eq!(payload.password, "secret1");
    }
}
