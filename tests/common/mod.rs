#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use storefront_api::{
    config::AppConfig,
    db,
    entities::{address, product, user},
    events::{self, EventSender},
    services::{addresses::CreateAddressRequest, catalog::CreateProductRequest},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

const TEST_JWT_SECRET: &str =
    "t8Qm2Wz5Lr9Xc3Vb7Nk1Hj4Gf6Ds0Pa8Yu2Ie5Ro9Tw3Qx7Zc1Vb4Nm6Lk8Jh0Gf2D";

/// Router plus state over a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

/// A signed-in account used to drive requests.
pub struct TestUser {
    pub model: user::Model,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let state = AppState::new(Arc::new(pool), cfg, EventSender::new(event_tx));

        state
            .services
            .access
            .seed_defaults()
            .await
            .expect("seed access levels");

        let router = storefront_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Creates an account at `level` and signs a token for it.
    pub async fn user_with_level(&self, email: &str, level: i32) -> TestUser {
        let model = self
            .state
            .services
            .users
            .create_user_with_level(email, "correct-horse-battery", "Test", "User", level)
            .await
            .expect("create test user");
        let access = self
            .state
            .services
            .access
            .get(level)
            .await
            .expect("access level exists");
        let token = self
            .state
            .auth
            .generate_token(&model, &access)
            .expect("sign test token")
            .access_token;
        TestUser { model, token }
    }

    pub async fn customer(&self, email: &str) -> TestUser {
        self.user_with_level(email, 0).await
    }

    /// Level 2 of the seeded levels: order manager with dashboard access.
    pub async fn order_manager(&self) -> TestUser {
        self.user_with_level("orders@storefront.test", 2).await
    }

    pub async fn admin(&self) -> TestUser {
        self.user_with_level("admin@storefront.test", 1).await
    }

    pub async fn seed_product(&self, sku: &str, price: Decimal, stock: i32) -> product::Model {
        self.state
            .services
            .catalog
            .create_product(CreateProductRequest {
                sku: sku.to_string(),
                name: format!("Product {}", sku),
                description: None,
                category: "cement".to_string(),
                unit: "bag".to_string(),
                price,
                discount: Decimal::ZERO,
                stock_quantity: stock,
                is_active: true,
                image_url: None,
            })
            .await
            .expect("seed product")
    }

    pub async fn seed_address(&self, owner: &TestUser) -> address::Model {
        self.state
            .services
            .addresses
            .create(
                owner.model.id,
                CreateAddressRequest {
                    recipient_name: "Somchai Jaidee".to_string(),
                    phone: "0812345678".to_string(),
                    line1: "99/1 Moo 4".to_string(),
                    line2: None,
                    district: "Bang Phli".to_string(),
                    province: "Samut Prakan".to_string(),
                    postal_code: "10540".to_string(),
                    is_default: false,
                },
            )
            .await
            .expect("seed address")
    }

    /// Sends a request and decodes the JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body bytes");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, Some(token)).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), Some(token)).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
