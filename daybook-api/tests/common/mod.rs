//! Common test utilities for the API tests
//!
//! Every `TestContext` owns a private in-memory database with the schema
//! applied and a router built on top of it. Requests are driven through
//! `tower::ServiceExt::oneshot`, so no socket is opened for the API itself.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use daybook_api::app::{build_router, AppState};
use daybook_api::config::{ApiConfig, Config, DatabaseConfig, WebhookConfig};
use daybook_shared::db::pool::{create_pool, IN_MEMORY_URL};
use daybook_shared::db::schema::apply_schema;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
}

impl TestContext {
    /// Fresh database, no webhook configured
    pub async fn new() -> Self {
        Self::with_webhook(None).await
    }

    /// Fresh database with the webhook pointed at `url`
    pub async fn with_webhook(url: Option<String>) -> Self {
        let config = test_config(url);
        let db = create_pool(config.database.pool_config())
            .await
            .expect("Failed to create pool");
        apply_schema(&db).await.expect("Failed to apply schema");

        let state = AppState::new(db.clone(), config).expect("Failed to build state");
        let app = build_router(state);

        Self { db, app }
    }

    /// Sends a request and returns the status with the raw body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    /// Sends a request and parses the body as JSON
    pub async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Body is not JSON: {}", String::from_utf8_lossy(&bytes))
            })
        };
        (status, value)
    }

    /// Creates a user through the API and returns its id
    pub async fn create_user(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/v1/users",
                Some(serde_json::json!({ "name": name, "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

fn test_config(webhook_url: Option<String>) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
        },
        webhook: WebhookConfig {
            url: webhook_url,
            timeout_seconds: 5,
        },
    }
}
