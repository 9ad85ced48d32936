//! Storefront API Library
//!
//! Catalog, cart, checkout and the order fulfillment lifecycle for a
//! construction-materials retailer, plus the back-office surface (access
//! levels, roles, settings, dashboard and reports).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
};
use utoipa::{IntoParams, ToSchema};

use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires the service container from a connection and an event channel.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let auth = Arc::new(AuthService::new(auth::AuthConfig::from(&config)));
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            config,
            event_sender,
            auth,
            services,
        }
    }
}

// Common query parameters for list endpoints
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

impl ListQuery {
    /// One-based page number, never zero.
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api` route, grouped by the permission that gates it.
pub fn api_routes() -> Router<AppState> {
    use handlers::{
        addresses, admin_orders, auth as auth_handlers, cart, checkout, dashboard, master,
        orders, products, profile, reports, settings,
    };

    let public = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/store", get(settings::public_store_info));

    let customer = Router::new()
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/password", put(profile::change_password))
        .route(
            "/address",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/address/:id",
            get(addresses::get_address)
                .put(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route("/address/:id/default", post(addresses::set_default_address))
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/:product_id",
            put(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/checkout", post(checkout::checkout))
        .route("/orders", get(orders::list_my_orders))
        .route("/orders/:id", get(orders::get_my_order))
        .route("/orders/:id/slip", post(orders::upload_slip))
        .route("/orders/:id/cancel-request", post(orders::request_cancel))
        .with_auth();

    let order_admin = Router::new()
        .route("/admin/order", get(admin_orders::list_orders))
        .route("/admin/order/:id", get(admin_orders::get_order))
        .route(
            "/admin/order/payment-verify",
            post(admin_orders::payment_verify),
        )
        .route("/admin/order/confirm-order", post(admin_orders::confirm_order))
        .route(
            "/admin/order/shipping-update",
            post(admin_orders::shipping_update),
        )
        .route(
            "/admin/order/confirm-shipped",
            post(admin_orders::confirm_shipped),
        )
        .route(
            "/admin/order/confirm-delivered",
            post(admin_orders::confirm_delivered),
        )
        .route("/admin/order/cancel", post(admin_orders::cancel_order))
        .route("/admin/order/review-cancel", post(admin_orders::review_cancel))
        .route("/admin/order/refund-slip", post(admin_orders::attach_refund_slip))
        .route(
            "/admin/order/refund-complete",
            post(admin_orders::complete_refund),
        )
        .with_permission(perm::ORDERS_MANAGE);

    let stock_admin = Router::new()
        .route(
            "/admin/products",
            get(products::admin_list_products).post(products::create_product),
        )
        .route(
            "/admin/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/admin/products/:id/stock", post(products::adjust_stock))
        .with_permission(perm::STOCK_MANAGE);

    let dashboard_routes = Router::new()
        .route("/admin/dashboard", get(dashboard::get_dashboard))
        .with_permission(perm::DASHBOARD_READ);

    let report_routes = Router::new()
        .route("/admin/reports/sales", get(reports::sales_report))
        .route("/admin/reports/stock", get(reports::stock_report))
        .with_permission(perm::REPORTS_READ);

    let system_admin = Router::new()
        .route(
            "/master/access",
            get(master::list_access_levels).post(master::create_access_level),
        )
        .route(
            "/master/access/:level",
            get(master::get_access_level)
                .put(master::update_access_level)
                .delete(master::delete_access_level),
        )
        .route(
            "/admin/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .with_permission(perm::ADMIN_SYSTEM);

    let user_admin = Router::new()
        .route("/master/role", get(master::list_staff))
        .route("/master/role/:user_id", put(master::assign_role))
        .route("/master/role/:user_id/active", put(master::set_active))
        .with_permission(perm::USERS_MANAGE);

    Router::new()
        .merge(public)
        .merge(customer)
        .merge(order_admin)
        .merge(stock_admin)
        .merge(dashboard_routes)
        .merge(report_routes)
        .merge(system_admin)
        .merge(user_admin)
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        return if config.should_allow_permissive_cors() {
            layer.allow_origin(Any)
        } else {
            layer
        };
    }

    // credentials cannot be combined with wildcard methods or headers
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(config.cors_allow_credentials)
}

/// The full application router with middleware applied.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn_with_state(
            auth::AuthContext::new(state.auth.clone(), state.db.clone()),
            auth::auth_context_layer,
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = db::check_connection(&state.db).await.is_ok();
    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthStatus {
            status: if db_ok { "ok" } else { "degraded" }.to_string(),
            database: if db_ok { "up" } else { "down" }.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatus {
    pub service: String,
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
    pub environment: String,
}

async fn status(State(state): State<AppState>) -> Json<ApiResponse<ServiceStatus>> {
    Json(ApiResponse::success(ServiceStatus {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_time: env!("BUILD_TIME").to_string(),
        environment: state.config.environment.clone(),
    }))
}
