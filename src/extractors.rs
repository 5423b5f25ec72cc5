use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::error_body;

/// JSON extractor that reports parse failures as `{"error": ...}` bodies
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let (status, message) = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        let text = err.body_text();
                        let status = if is_enum_violation(&text) {
                            StatusCode::UNPROCESSABLE_ENTITY
                        } else {
                            StatusCode::BAD_REQUEST
                        };
                        (status, format!("Invalid JSON data: {}", text))
                    }
                    JsonRejection::JsonSyntaxError(err) => (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to parse the request body as JSON: {}", err.body_text()),
                    ),
                    JsonRejection::MissingJsonContentType(_) => (
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        "Expected request with `Content-Type: application/json`".to_string(),
                    ),
                    JsonRejection::BytesRejection(err) => (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read request body: {}", err.body_text()),
                    ),
                    _ => (StatusCode::BAD_REQUEST, "Failed to parse JSON".to_string()),
                };

                tracing::debug!(status = %status, "Rejected JSON body: {}", message);

                Err((status, Json(error_body(&message))).into_response())
            }
        }
    }
}

/// A well-formed value outside an enum's variants (e.g. an unknown `role`) is a
/// field constraint violation rather than a malformed body. serde only
/// reports it through the message text.
fn is_enum_violation(message: &str) -> bool {
    message.contains("unknown variant")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use axum::body::{to_bytes, Body};
    use axum::http;
    use serde_json::Value;

    async fn extract_user(body: &str) -> Result<ApiJson<NewUser>, Response> {
        let req = http::Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        ApiJson::<NewUser>::from_request(req, &()).await
    }

    async fn error_message(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_unknown_role_is_unprocessable() {
        let rejection = extract_user(
            r#"{"username":"u","password":"p","first_name":"F","age":1,"role":"superuser"}"#,
        )
        .await
        .err()
        .unwrap();

        assert_eq!(rejection.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error_message(rejection).await.contains("superuser"));
    }

    #[tokio::test]
    async fn test_wrong_type_and_syntax_are_bad_requests() {
        let rejection = extract_user(r#"{"username":"u","password":"p","first_name":"F","age":"old"}"#)
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);

        let rejection = extract_user("{not json").await.err().unwrap();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_body_extracts() {
        let ApiJson(user) = extract_user(
            r#"{"username":"u","password":"p","first_name":"F","age":1,"role":"admin"}"#,
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(user.username, "u");
    }
}
