//! Login route handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use gatehouse_core::{LoginRequest, LoginSuccess};

use crate::error::{AppError, Result};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Handle `POST /api/auth/login`.
///
/// Returns 200 with the token and user summary, 401 when the email is
/// unknown or the password is wrong, 400 for an unreadable body, 500 when
/// the store or signer fails.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginSuccess>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let outcome = match state
        .authenticator()
        .authenticate(&request.email, &request.password)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) if e.is_rejection() => {
            tracing::warn!(email = %request.email, reason = %e, "Login failed");
            return Err(conceal(e, state.auth_config().uniform_errors).into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        user_id = %outcome.user.id,
        role = %outcome.user.role,
        expires_at = %outcome.expires_at,
        "Login successful"
    );

    Ok(Json(LoginSuccess::new(outcome.token, outcome.user)))
}

/// Report an unknown email as a wrong password when `uniform` is set.
fn conceal(err: AuthError, uniform: bool) -> AuthError {
    match err {
        AuthError::UserNotFound if uniform => AuthError::InvalidCredentials,
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use gatehouse_core::{Email, ErrorBody, Role};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::config::AuthConfig;
    use crate::db::{CredentialStore, MemoryUserStore};
    use crate::models::user::NewUser;
    use crate::routes::{app, cors_layer};
    use crate::services::auth::hash_password;
    use crate::state::AppState;

    async fn test_app(uniform_errors: bool) -> (Router, AppState) {
        let store = MemoryUserStore::new();
        store
            .create(NewUser {
                name: Some("admin".to_owned()),
                email: Email::parse("admin@gmail.com").unwrap(),
                password_hash: hash_password("admin", 4).await.unwrap(),
                address: Some("admin address".to_owned()),
                role: Role::Admin,
            })
            .await
            .unwrap();

        let auth = AuthConfig {
            jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            token_ttl: chrono::Duration::days(90),
            uniform_errors,
        };
        let state = AppState::new(auth, Arc::new(store));
        (app(state.clone(), cors_layer(None).unwrap()), state)
    }

    async fn post_login(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_seeded_admin_logs_in() {
        let (app, state) = test_app(false).await;
        let (status, body) = post_login(
            app,
            r#"{"email":"admin@gmail.com","password":"admin"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["role"], "admin");
        assert_eq!(body["user"]["email"], "admin@gmail.com");
        assert_eq!(body["user"]["name"], "admin");

        let token = body["token"].as_str().unwrap();
        let claims = state.authenticator().signer().verify(token).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(body["user"]["id"], claims.id.as_i32());
    }

    #[tokio::test]
    async fn test_unknown_email_is_401() {
        let (app, _) = test_app(false).await;
        let (status, body) = post_login(
            app,
            r#"{"email":"nobody@gmail.com","password":"admin"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            serde_json::from_value::<ErrorBody>(body).unwrap(),
            ErrorBody::new("User not found")
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let (app, _) = test_app(false).await;
        let (status, body) = post_login(
            app,
            r#"{"email":"admin@gmail.com","password":"nope"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid credentials");
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn test_uniform_errors_hide_unknown_email() {
        let (app, _) = test_app(true).await;
        let (status, body) = post_login(
            app,
            r#"{"email":"nobody@gmail.com","password":"admin"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _) = test_app(false).await;
        let (status, body) = post_login(app, r#"{"email":"admin@gmail.com"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _) = test_app(false).await;

        for path in ["/health", "/health/ready"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }
}
