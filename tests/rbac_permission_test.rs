//! Route groups are gated by the permission flags of the caller's access level.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = app
        .send(Method::GET, "/api/admin/order", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.send(Method::GET, "/api/store", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn customers_cannot_reach_back_office() {
    let app = TestApp::new().await;
    let customer = app.customer("plain@storefront.test").await;

    for uri in [
        "/api/admin/order",
        "/api/admin/products",
        "/api/admin/dashboard",
        "/api/admin/reports/stock",
        "/api/admin/settings",
        "/api/master/access",
        "/api/master/role",
    ] {
        let (status, _) = app.get(uri, &customer.token).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri} should be forbidden");
    }
}

#[tokio::test]
async fn order_manager_is_limited_to_orders_and_dashboard() {
    let app = TestApp::new().await;
    let manager = app.order_manager().await;

    let (status, _) = app.get("/api/admin/order", &manager.token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get("/api/admin/dashboard", &manager.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_orders"], 0);

    let (status, _) = app.get("/api/admin/products", &manager.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/admin/reports/stock", &manager.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/master/access", &manager.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn system_admin_manages_levels_and_roles() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let customer = app.customer("promote@storefront.test").await;

    let (status, body) = app.get("/api/master/access", &admin.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));

    let (status, _) = app
        .post(
            "/api/master/access",
            json!({ "level": 7, "name": "Warehouse", "stock_mgr": true }),
            &admin.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}", customer.model.id),
            Some(json!({ "access_level": 7 })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "assign failed: {body}");

    // Own level is off limits even for an administrator
    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}", admin.model.id),
            Some(json!({ "access_level": 0 })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The customer level cannot be removed
    let (status, _) = app
        .send(
            Method::DELETE,
            "/api/master/access/0",
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_a_token_with_level_permissions() {
    let app = TestApp::new().await;
    app.user_with_level("reporter@storefront.test", 4).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({
                "email": "reporter@storefront.test",
                "password": "correct-horse-battery"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();

    let (status, _) = app.get("/api/admin/reports/stock", &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/admin/order", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({
                "email": "reporter@storefront.test",
                "password": "wrong-password"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_manager_cannot_touch_system_administrators() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let manager = app.order_manager().await;

    let (status, _) = app
        .post(
            "/api/master/access",
            json!({ "level": 5, "name": "People", "user_mgr": true }),
            &admin.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let people = app.user_with_level("people@storefront.test", 5).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}", admin.model.id),
            Some(json!({ "access_level": 0 })),
            Some(&people.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}/active", admin.model.id),
            Some(json!({ "is_active": false })),
            Some(&people.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Granting the administrator level is refused as well
    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}", manager.model.id),
            Some(json!({ "access_level": 1 })),
            Some(&people.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Other staff remain manageable
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}", manager.model.id),
            Some(json!({ "access_level": 3 })),
            Some(&people.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "assign failed: {body}");

    let (status, body) = app.get("/api/admin/dashboard", &admin.token).await;
    assert_eq!(status, StatusCode::OK, "admin kept access: {body}");
}

#[tokio::test]
async fn demotion_applies_to_tokens_already_issued() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let manager = app.order_manager().await;

    let (status, _) = app.get("/api/admin/order", &manager.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}", manager.model.id),
            Some(json!({ "access_level": 0 })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/admin/order", &manager.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/orders", &manager.token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn editing_level_flags_applies_to_tokens_already_issued() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let reporter = app.user_with_level("flags@storefront.test", 4).await;

    let (status, _) = app.get("/api/admin/reports/stock", &reporter.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/master/access/4",
            Some(json!({ "name": "Reporter", "dashboard": true })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/admin/reports/stock", &reporter.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/admin/dashboard", &reporter.token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn disabled_accounts_lose_access_and_are_refused_login() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let manager = app.order_manager().await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}/active", manager.model.id),
            Some(json!({ "is_active": false })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);

    let (status, _) = app.get("/api/orders", &manager.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({
                "email": "orders@storefront.test",
                "password": "correct-horse-battery"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An administrator cannot lock themselves out
    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}/active", admin.model.id),
            Some(json!({ "is_active": false })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/master/role/{}/active", manager.model.id),
            Some(json!({ "is_active": true })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/admin/order", &manager.token).await;
    assert_eq!(status, StatusCode::OK);
}
