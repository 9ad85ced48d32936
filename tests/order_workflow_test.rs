//! End-to-end order lifecycle through the HTTP surface: customer checkout,
//! payment review, shipping and the cancellation/refund branches.

mod common;

use std::str::FromStr;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a money value: {other}"),
    }
}

async fn place_order(
    app: &TestApp,
    customer: &TestUser,
    product_id: Uuid,
    quantity: i32,
    payment_type: &str,
) -> Value {
    let address = app.seed_address(customer).await;
    let (status, _) = app
        .post(
            "/api/cart/items",
            json!({ "product_id": product_id, "quantity": quantity }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/checkout",
            json!({ "address_id": address.id, "payment_type": payment_type }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "checkout failed: {body}");
    body["data"].clone()
}

async fn stock_of(app: &TestApp, product_id: Uuid) -> i32 {
    app.state
        .services
        .catalog
        .get_product(product_id)
        .await
        .expect("product exists")
        .stock_quantity
}

#[tokio::test]
async fn bank_transfer_order_runs_to_delivery() {
    let app = TestApp::new().await;
    let customer = app.customer("buyer@storefront.test").await;
    let manager = app.order_manager().await;
    let product = app.seed_product("CEM-50", dec!(250), 20).await;

    let order = place_order(&app, &customer, product.id, 4, "bank_transfer").await;
    let order_id = order["id"].as_str().expect("order id").to_string();
    assert_eq!(order["status"], "pending");
    assert_eq!(money(&order["total_amount"]), dec!(1000));
    assert_eq!(order["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(stock_of(&app, product.id).await, 16);

    // Nothing to confirm before the transfer is verified
    let (status, _) = app
        .post(
            "/api/admin/order/confirm-order",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/slip"),
            json!({ "transaction_slip": "slips/transfer-001.jpg" }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status_view"]["payment_phase"], "awaiting_verification");

    let (status, body) = app
        .post(
            "/api/admin/order/payment-verify",
            json!({ "order_id": order_id, "approve": true }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transaction_status"], "confirmed");

    let (status, body) = app
        .post(
            "/api/admin/order/confirm-order",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "preparing");

    let (status, body) = app
        .post(
            "/api/admin/order/confirm-shipped",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("driver_phone"));

    let (status, body) = app
        .post(
            "/api/admin/order/shipping-update",
            json!({
                "order_id": order_id,
                "shipping_method": "truck",
                "shipping_provider": "Own fleet",
                "shipping_date": "2024-03-02",
                "vehicle_type": "6-wheel",
                "driver_name": "Anan",
                "driver_phone": "0891112222"
            }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status_view"]["can_confirm_shipped"], true);

    let (status, body) = app
        .post(
            "/api/admin/order/confirm-shipped",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "shipped");

    // Too late for the customer to back out
    let (status, _) = app
        .post(
            &format!("/api/orders/{order_id}/cancel-request"),
            json!({ "reason": "changed my mind" }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/admin/order/confirm-delivered",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "delivered");
    assert_eq!(body["data"]["status_view"]["actions"], json!([]));
    assert_eq!(stock_of(&app, product.id).await, 16);
}

#[tokio::test]
async fn approved_cancellation_of_paid_order_goes_through_refund() {
    let app = TestApp::new().await;
    let customer = app.customer("refund@storefront.test").await;
    let manager = app.order_manager().await;
    let product = app.seed_product("STEEL-12", dec!(180), 10).await;

    let order = place_order(&app, &customer, product.id, 3, "bank_transfer").await;
    let order_id = order["id"].as_str().expect("order id").to_string();
    assert_eq!(stock_of(&app, product.id).await, 7);

    let (status, _) = app
        .post(
            &format!("/api/orders/{order_id}/slip"),
            json!({ "transaction_slip": "slips/transfer-002.jpg" }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            &format!("/api/orders/{order_id}/cancel-request"),
            json!({ "reason": "ordered the wrong size" }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "req_cancel");
    assert_eq!(body["data"]["status_view"]["review_step"], "cancellation_review");

    let (status, body) = app
        .post(
            "/api/admin/order/review-cancel",
            json!({ "order_id": order_id, "approve": true }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "refunding");
    assert_eq!(stock_of(&app, product.id).await, 10);

    let (status, _) = app
        .post(
            "/api/admin/order/refund-complete",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/admin/order/refund-slip",
            json!({ "order_id": order_id, "refund_slip": "refunds/002.jpg" }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/admin/order/refund-complete",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "refunded");
    assert_eq!(body["data"]["is_refunded"], true);
    assert_eq!(stock_of(&app, product.id).await, 10);
}

#[tokio::test]
async fn rejected_cancellation_restores_interrupted_status() {
    let app = TestApp::new().await;
    let customer = app.customer("cod@storefront.test").await;
    let manager = app.order_manager().await;
    let product = app.seed_product("BRICK-RED", dec!(5), 500).await;

    let order = place_order(&app, &customer, product.id, 200, "cash_on_delivery").await;
    let order_id = order["id"].as_str().expect("order id").to_string();

    let (status, body) = app
        .post(
            "/api/admin/order/confirm-order",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "preparing");

    let (status, _) = app
        .post(
            &format!("/api/orders/{order_id}/cancel-request"),
            json!({}),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/admin/order/review-cancel",
            json!({ "order_id": order_id, "approve": false, "reason": "already loaded" }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "preparing");
    assert_eq!(body["data"]["status_before_cancel"], Value::Null);
    assert_eq!(stock_of(&app, product.id).await, 300);
}

#[tokio::test]
async fn unpaid_cod_order_cancels_directly_and_restocks() {
    let app = TestApp::new().await;
    let customer = app.customer("cancel@storefront.test").await;
    let manager = app.order_manager().await;
    let product = app.seed_product("SAND-1T", dec!(900), 4).await;

    let order = place_order(&app, &customer, product.id, 4, "cash_on_delivery").await;
    let order_id = order["id"].as_str().expect("order id").to_string();
    assert_eq!(stock_of(&app, product.id).await, 0);

    let (status, body) = app
        .post(
            "/api/admin/order/cancel",
            json!({ "order_id": order_id, "reason": "customer unreachable" }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
    assert_eq!(stock_of(&app, product.id).await, 4);

    let (status, _) = app
        .post(
            "/api/admin/order/cancel",
            json!({ "order_id": order_id }),
            &manager.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_only_see_their_own_orders() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@storefront.test").await;
    let stranger = app.customer("stranger@storefront.test").await;
    let product = app.seed_product("TILE-60", dec!(45), 100).await;

    let order = place_order(&app, &owner, product.id, 10, "bank_transfer").await;
    let order_id = order["id"].as_str().expect("order id").to_string();

    let (status, body) = app.get("/api/orders", &owner.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app
        .get(&format!("/api/orders/{order_id}"), &stranger.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            &format!("/api/orders/{order_id}/slip"),
            json!({ "transaction_slip": "slips/not-mine.jpg" }),
            &stranger.token,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/orders", &stranger.token).await;
    assert_eq!(body["data"]["total"], 0);
}
