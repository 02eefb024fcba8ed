use axum::extract::DefaultBodyLimit;

pub use crate::app::auth::AdminSession;
use crate::prelude::*;
use crate::utils::relay::Relay;

mod admin;
mod auth;
mod contact;

pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub relay: Relay,
}

pub async fn build(config: Config) -> Result<axum::Router<()>> {
    let state = Arc::new(AppState {
        config: config.clone(),
        db: crate::db::init(&config.db).await?,
        relay: Relay::new(config.relay.as_ref())?,
    });

    crate::jobs::init(Arc::clone(&state)).await;

    Ok(routes(state))
}

/// Assemble the full router for `state`.
fn routes(state: SharedAppState) -> axum::Router<()> {
    // Register business logic routes
    let r = AppRouter::new(&state);
    let r = contact::add_routes(r);
    let r = auth::add_routes(r);
    let r = admin::add_routes(r);
    let (r, state) = r.finish();

    // The portfolio frontend is a static export served alongside the API
    let r = match &state.config.app.static_dir {
        Some(dir) => r.fallback_service(tower_http::services::ServeDir::new(dir)),
        None => r.fallback(|| async { AppError::NotFound }),
    };

    // Register middleware
    let r = auth::add_middleware(r, Arc::clone(&state));
    let r = crate::utils::tracing::add_middleware(r);
    let r = r.layer(DefaultBodyLimit::max(64 * 1024)); // 64KB limit
    r.with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use sha2::{Digest as _, Sha256};
    use tower::ServiceExt as _;

    use super::*;
    use crate::utils::config::*;

    fn test_config() -> Config {
        Config {
            app: AppConfig {
                domain: "test.local".into(),
                url: "http://test.local".into(),
                tz: chrono_tz::UTC,
                static_dir: None,
            },
            db: DbConfig { file: ":memory:".into() },
            net: NetConfig {
                http_addr: "127.0.0.1:0".parse().unwrap(),
                https_addr: "127.0.0.1:0".parse().unwrap(),
            },
            acme: None,
            admin: AdminConfig {
                username: "admin".into(),
                password_sha256: hex::encode(Sha256::digest(b"admin123")),
                session_ttl_hours: 24,
            },
            relay: None,
        }
    }

    async fn test_router() -> axum::Router<()> {
        let state = Arc::new(AppState {
            config: test_config(),
            db: crate::db::test_db().await,
            relay: Relay::new(None).unwrap(),
        });
        routes(state)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Login with the test credentials and return the `name=value` cookie pair.
    async fn login(router: &axum::Router<()>) -> String {
        let response = router
            .clone()
            .oneshot(json_request(
                "/admin/login",
                json!({"username": "admin", "password": "admin123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn contact_accepts_and_stores_a_submission() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(json_request(
                "/contact",
                json!({
                    "name": "  Jane Doe ",
                    "email": "Jane@Example.COM",
                    "subject": "Hello",
                    "message": "Nice site!",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert!(!body["id"].as_str().unwrap().is_empty());

        let cookie = login(&router).await;
        let response = router
            .clone()
            .oneshot(get_request("/admin/submissions", Some(&cookie)))
            .await
            .unwrap();
        let body = body_json(response).await;

        let submissions = body["submissions"].as_array().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0]["name"], json!("Jane Doe"));
        assert_eq!(submissions[0]["email"], json!("jane@example.com"));
        assert!(!submissions[0]["timestamp"].as_str().unwrap().is_empty());
        assert_eq!(submissions[0]["ipAddress"], json!("unknown"));
    }

    #[tokio::test]
    async fn contact_rejects_missing_fields() {
        let router = test_router().await;

        let response = router
            .oneshot(json_request("/contact", json!({"name": "Jane", "email": "a@b.co"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], json!("All fields are required"));
    }

    #[tokio::test]
    async fn contact_rejects_invalid_email() {
        let router = test_router().await;

        let response = router
            .oneshot(json_request(
                "/contact",
                json!({
                    "name": "Jane",
                    "email": "not-an-email",
                    "subject": "Hi",
                    "message": "Hello!",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], json!("Invalid email address"));
    }

    #[tokio::test]
    async fn admin_submissions_requires_a_session() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(get_request("/admin/submissions", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], json!("Unauthorized"));

        // A made-up token is no better than no token
        let response = router
            .oneshot(get_request("/admin/submissions", Some("admin-session=deadbeef")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let router = test_router().await;

        let response = router
            .oneshot(json_request(
                "/admin/login",
                json!({"username": "admin", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], json!("Invalid credentials"));
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let router = test_router().await;

        let response = router
            .oneshot(json_request("/admin/login", json!({"username": "admin"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            json!("Username and password are required")
        );
    }

    #[tokio::test]
    async fn logout_invalidates_the_session_server_side() {
        let router = test_router().await;
        let cookie = login(&router).await;

        let response = router
            .clone()
            .oneshot(get_request("/admin/submissions", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], json!("Logged out successfully"));

        // The old cookie no longer works even if the client kept it
        let response = router
            .oneshot(get_request("/admin/submissions", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn stats_are_included_only_when_requested() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(json_request(
                "/contact",
                json!({
                    "name": "Jane",
                    "email": "jane@example.com",
                    "subject": "Hi",
                    "message": "Hello!",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = login(&router).await;

        let response = router
            .clone()
            .oneshot(get_request("/admin/submissions?stats=true", Some(&cookie)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["stats"]["total"], json!(1));
        assert_eq!(body["stats"]["today"], json!(1));
        assert_eq!(body["stats"]["thisWeek"], json!(1));
        assert_eq!(body["stats"]["thisMonth"], json!(1));

        let response = router
            .oneshot(get_request("/admin/submissions", Some(&cookie)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body.get("stats").is_none());
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let router = test_router().await;
        let response = router.oneshot(get_request("/nope", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
