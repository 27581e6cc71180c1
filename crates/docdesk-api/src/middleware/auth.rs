//! Session Authentication Middleware
//!
//! Extracts the session JWT from the `session_token` cookie or an
//! `Authorization: Bearer` header, validates it, and makes the member id
//! available to handlers via Axum's Extension. Role and status are resolved
//! by the handlers from the identity store, not from the token.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use docdesk_auth::JwtValidator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::models::ErrorResponse;

/// Member behind a validated session token
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionMember {
    pub member_id: i32,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
        }
    }
}

fn unauthorized(error: impl Into<String>, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: error.into(),
            code: Some(code.to_string()),
        }),
    )
}

/// Reject requests without a valid session token
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - The Authorization header is not a Bearer token
/// - Token is malformed, badly signed or expired
pub async fn require_auth(
    state: axum::extract::State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let cookie_token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix("session_token="))
        })
        .map(str::to_string);

    let token = match cookie_token {
        Some(token) => token,
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    unauthorized(
                        "Missing authentication token (cookie or Authorization header)",
                        "MISSING_AUTH",
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    unauthorized(
                        "Invalid Authorization header format. Expected 'Bearer <token>'",
                        "INVALID_AUTH_FORMAT",
                    )
                })?
                .to_string()
        }
    };

    let claims = state.validator.validate(&token).map_err(|e| {
        debug!(error = %e, "Rejected session token");
        unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN")
    })?;

    request.extensions_mut().insert(SessionMember {
        member_id: claims.member_id,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use chrono::Duration;
    use docdesk_auth::SessionClaims;
    use tower::ServiceExt; // For oneshot()

    async fn protected_handler(
        axum::Extension(member): axum::Extension<SessionMember>,
    ) -> Json<SessionMember> {
        Json(member)
    }

    fn create_test_app(jwt_secret: &[u8]) -> Router {
        let jwt_state = Arc::new(JwtState::new(jwt_secret));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_auth,
            ))
            .with_state(jwt_state)
    }

    async fn error_body(response: Response) -> ErrorResponse {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_valid_bearer_token() {
        let jwt_secret = b"test-secret-key";
        let app = create_test_app(jwt_secret);

        let claims = SessionClaims::new(42, Duration::hours(1));
        let token = JwtValidator::encode(jwt_secret, &claims).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let member: SessionMember = serde_json::from_slice(&body).unwrap();
        assert_eq!(member.member_id, 42);
    }

    #[tokio::test]
    async fn test_valid_cookie_token() {
        let jwt_secret = b"test-secret-key";
        let app = create_test_app(jwt_secret);

        let token =
            JwtValidator::encode(jwt_secret, &SessionClaims::new(5, Duration::hours(1))).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Cookie", format!("theme=dark; session_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let app = create_test_app(b"test-secret-key");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert_eq!(error.code.as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        let app = create_test_app(b"test-secret-key");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", "Token abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert!(error.error.contains("Invalid Authorization header format"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let jwt_secret = b"test-secret-key";
        let app = create_test_app(jwt_secret);

        let claims = SessionClaims::new(42, Duration::seconds(-120));
        let token = JwtValidator::encode(jwt_secret, &claims).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert!(error.error.contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let app = create_test_app(b"test-secret-key");

        let claims = SessionClaims::new(42, Duration::hours(1));
        let token = JwtValidator::encode(b"wrong-secret-key", &claims).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
