//! Dashboard and report figures over orders driven into different statuses.

mod common;

use std::str::FromStr;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
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

async fn checkout(
    app: &TestApp,
    customer: &TestUser,
    product_id: Uuid,
    quantity: i32,
    payment_type: &str,
) -> String {
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
    body["data"]["id"].as_str().expect("order id").to_string()
}

async fn admin_action(app: &TestApp, manager: &TestUser, action: &str, body: Value) {
    let (status, response) = app
        .post(&format!("/api/admin/order/{action}"), body, &manager.token)
        .await;
    assert_eq!(status, StatusCode::OK, "{action} failed: {response}");
}

/// Seeds four orders: delivered (COD, 4 x cement), pending bank transfer
/// with a slip (2 x sand), cancelled (COD, 5 x cement) and awaiting
/// cancellation review (COD, 1 x sand).
async fn seed_order_book(app: &TestApp) -> (Uuid, Uuid) {
    let customer = app.customer("site-buyer@storefront.test").await;
    let manager = app.order_manager().await;
    let cement = app.seed_product("CEM-REPORT", dec!(100), 20).await;
    let sand = app.seed_product("SAND-REPORT", dec!(50), 12).await;
    app.seed_product("GLUE-REPORT", dec!(80), 10).await;

    let delivered = checkout(app, &customer, cement.id, 4, "cash_on_delivery").await;
    admin_action(app, &manager, "confirm-order", json!({ "order_id": delivered })).await;
    admin_action(
        app,
        &manager,
        "shipping-update",
        json!({
            "order_id": delivered,
            "shipping_method": "truck",
            "shipping_provider": "Own fleet",
            "shipping_date": "2024-03-02",
            "vehicle_type": "4-wheel",
            "driver_name": "Somsak",
            "driver_phone": "0815556666"
        }),
    )
    .await;
    admin_action(app, &manager, "confirm-shipped", json!({ "order_id": delivered })).await;
    admin_action(app, &manager, "confirm-delivered", json!({ "order_id": delivered })).await;

    let transfer = checkout(app, &customer, sand.id, 2, "bank_transfer").await;
    let (status, _) = app
        .post(
            &format!("/api/orders/{transfer}/slip"),
            json!({ "transaction_slip": "slips/report-001.jpg" }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let cancelled = checkout(app, &customer, cement.id, 5, "cash_on_delivery").await;
    admin_action(
        app,
        &manager,
        "cancel",
        json!({ "order_id": cancelled, "reason": "duplicate order" }),
    )
    .await;

    let review = checkout(app, &customer, sand.id, 1, "cash_on_delivery").await;
    let (status, _) = app
        .post(
            &format!("/api/orders/{review}/cancel-request"),
            json!({ "reason": "site closed" }),
            &customer.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    (cement.id, sand.id)
}

#[tokio::test]
async fn dashboard_counts_every_status_and_ranks_sales() {
    let app = TestApp::new().await;
    let (cement, sand) = seed_order_book(&app).await;
    let admin = app.admin().await;

    let (status, body) = app.get("/api/admin/dashboard", &admin.token).await;
    assert_eq!(status, StatusCode::OK, "dashboard failed: {body}");
    let summary = &body["data"];

    assert_eq!(summary["total_orders"], 4);
    let by_status: Vec<(String, u64)> = summary["orders_by_status"]
        .as_array()
        .expect("status counts")
        .iter()
        .map(|entry| {
            (
                entry["status"].as_str().unwrap_or_default().to_string(),
                entry["count"].as_u64().unwrap_or(u64::MAX),
            )
        })
        .collect();
    assert_eq!(by_status.len(), 8, "zero counts are listed too");
    for (status, expected) in [
        ("pending", 1),
        ("preparing", 0),
        ("shipped", 0),
        ("delivered", 1),
        ("req_cancel", 1),
        ("refunding", 0),
        ("refunded", 0),
        ("cancelled", 1),
    ] {
        assert!(
            by_status.contains(&(status.to_string(), expected)),
            "{status} should count {expected}: {by_status:?}"
        );
    }

    assert_eq!(money(&summary["delivered_revenue"]), dec!(400));
    assert_eq!(summary["awaiting_payment_verification"], 1);
    assert_eq!(summary["pending_cancellation_requests"], 1);
    // sand dropped to 9 and glue sits at the threshold of 10
    assert_eq!(summary["low_stock_products"], 2);
    assert_eq!(summary["low_stock_threshold"], 10);

    // the cancelled 5 bags of cement are not sales
    let top = summary["top_products"].as_array().expect("top products");
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["product_id"], cement.to_string());
    assert_eq!(top[0]["quantity_sold"], 4);
    assert_eq!(money(&top[0]["revenue"]), dec!(400));
    assert_eq!(top[1]["product_id"], sand.to_string());
    assert_eq!(top[1]["quantity_sold"], 3);
    assert_eq!(money(&top[1]["revenue"]), dec!(150));
}

#[tokio::test]
async fn sales_report_leaves_out_cancelled_orders() {
    let app = TestApp::new().await;
    seed_order_book(&app).await;
    let admin = app.admin().await;

    let today = Utc::now().date_naive();
    let uri = format!(
        "/api/admin/reports/sales?from={}&to={}",
        today - Duration::days(1),
        today + Duration::days(1)
    );
    let (status, body) = app.get(&uri, &admin.token).await;
    assert_eq!(status, StatusCode::OK, "sales report failed: {body}");
    let report = &body["data"];

    let rows = report["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row["status"] != "cancelled"));

    let totals = report["totals_by_payment_type"].as_array().expect("totals");
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0]["payment_type"], "bank_transfer");
    assert_eq!(totals[0]["order_count"], 1);
    assert_eq!(money(&totals[0]["total_amount"]), dec!(100));
    assert_eq!(totals[1]["payment_type"], "cash_on_delivery");
    assert_eq!(totals[1]["order_count"], 2);
    assert_eq!(money(&totals[1]["total_amount"]), dec!(450));
    assert_eq!(money(&report["grand_total"]), dec!(550));

    // a window before any order was placed is empty
    let uri = format!(
        "/api/admin/reports/sales?from={}&to={}",
        today - Duration::days(30),
        today - Duration::days(20)
    );
    let (_, body) = app.get(&uri, &admin.token).await;
    assert_eq!(body["data"]["rows"], json!([]));
    assert_eq!(money(&body["data"]["grand_total"]), Decimal::ZERO);
}

#[tokio::test]
async fn stock_report_marks_products_at_or_below_threshold() {
    let app = TestApp::new().await;
    seed_order_book(&app).await;
    let admin = app.admin().await;

    let (status, body) = app.get("/api/admin/reports/stock", &admin.token).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"]["rows"].as_array().expect("rows");

    let marker = |sku: &str| {
        rows.iter()
            .find(|row| row["sku"] == sku)
            .map(|row| (row["stock_quantity"].as_i64(), row["low_stock"].as_bool()))
    };
    // the cancelled order returned its 5 bags
    assert_eq!(marker("CEM-REPORT"), Some((Some(16), Some(false))));
    assert_eq!(marker("SAND-REPORT"), Some((Some(9), Some(true))));
    assert_eq!(marker("GLUE-REPORT"), Some((Some(10), Some(true))));
}
