use axum::{middleware, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::auth;
use super::health;
use super::middleware::{logging_middleware, require_jwt, security_headers_middleware};
use super::state::AppState;
use super::types::ApiError;
use super::users;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    // Routes behind the access gate
    let protected = Router::new()
        .route("/users", get(users::list_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_jwt));

    Router::new()
        .route("/", get(health::service_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .merge(auth::create_auth_router())
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::domain::user::UserId;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::user::{
        BcryptHasher, CreateUserRequest, InMemoryUserRepository, UserService,
    };

    const SECRET: &str = "router-test-secret";

    async fn create_app() -> Router {
        let users = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(BcryptHasher::with_cost(4).unwrap()),
        ));
        for (username, password) in [("admin", "admin123"), ("user1", "password1")] {
            users
                .create(CreateUserRequest {
                    username: username.to_string(),
                    email: format!("{}@example.com", username),
                    password: password.to_string(),
                })
                .await
                .unwrap();
        }

        let tokens = Arc::new(JwtService::new(JwtConfig::new(SECRET, 24).unwrap()));
        create_router(AppState::new(users, tokens))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login_token(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(login_request(json!({"username": "admin", "password": "admin123"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_app().await;

        let response = app.oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "user-service");
    }

    #[tokio::test]
    async fn test_ready_and_service_info() {
        let app = create_app().await;

        let response = app.clone().oneshot(get_request("/ready", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["checks"][0]["name"], "credential_store");

        let response = app.oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["service"], "user-service");
        assert!(body["endpoints"].as_array().unwrap().len() >= 4);
    }

    #[tokio::test]
    async fn test_login_success() {
        let app = create_app().await;

        let response = app
            .oneshot(login_request(json!({"username": "admin", "password": "admin123"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["id"], 1);
        assert_eq!(body["user"]["username"], "admin");
        assert_eq!(body["user"]["email"], "admin@example.com");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_login_failures_share_response() {
        let app = create_app().await;

        let wrong = app
            .clone()
            .oneshot(login_request(json!({"username": "admin", "password": "wrong"})))
            .await
            .unwrap();
        let ghost = app
            .oneshot(login_request(json!({"username": "ghost", "password": "x"})))
            .await
            .unwrap();

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ghost.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong).await, body_json(ghost).await);
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = create_app().await;

        let response = app
            .clone()
            .oneshot(login_request(json!({"username": "admin"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_query_and_header() {
        let app = create_app().await;
        let token = login_token(&app).await;

        let response = app
            .clone()
            .oneshot(get_request(&format!("/verify?token={}", token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["payload"]["user_id"], "1");
        assert_eq!(body["payload"]["username"], "admin");

        let response = app
            .oneshot(get_request("/verify", Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verify_failures() {
        let app = create_app().await;

        let response = app
            .clone()
            .oneshot(get_request("/verify?token=not-a-jwt", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["error"], "invalid token");

        let expired = JwtService::new(JwtConfig::new(SECRET, 24).unwrap())
            .issue_at(UserId::new(1), "admin", Utc::now() - Duration::hours(25))
            .unwrap()
            .token;
        let response = app
            .clone()
            .oneshot(get_request(&format!("/verify?token={}", expired), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "token has expired");

        let response = app.oneshot(get_request("/verify", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["valid"], false);
    }

    #[tokio::test]
    async fn test_users_requires_token() {
        let app = create_app().await;

        let response = app.clone().oneshot(get_request("/users", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["error"],
            "authorization header required"
        );

        let response = app
            .oneshot(get_request("/users", Some("Token abc")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["error"],
            "invalid authorization format. Use: Bearer <token>"
        );
    }

    #[tokio::test]
    async fn test_users_with_token() {
        let app = create_app().await;
        let token = login_token(&app).await;

        let response = app
            .oneshot(get_request("/users", Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["requested_by"], "admin");
        assert_eq!(body["users"][1]["username"], "user1");
        assert!(body["users"][0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_app().await;

        let response = app.oneshot(get_request("/nope", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "resource not found");
    }

    #[tokio::test]
    async fn test_response_headers() {
        let app = create_app().await;

        let response = app.oneshot(get_request("/health", None)).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert_eq!(headers["cache-control"], "no-store");
        assert!(headers.contains_key("x-request-id"));
    }
}
