use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the `Bearer` JWT scheme referenced by `security(("Bearer" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.3.0",
        description = r#"
# Storefront API

Catalog, cart, checkout and order fulfillment for a construction-materials
retailer, plus the back-office console.

## Authentication

Obtain a token from `/api/auth/login` and send it in the Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

Back-office routes are gated by the flags of the caller's access level
(order manager, stock manager, user manager, report, dashboard, system admin).

## Order lifecycle

`pending` → `preparing` → `shipped` → `delivered`. Customers may request
cancellation while an order is pending or preparing. Cancelling an order that
carries a transfer slip routes it through `refunding` → `refunded`. Every order
response includes a `status_view` listing the actions currently allowed.

## Error Handling

```json
{
  "error": "Bad Request",
  "message": "Invalid status: cannot ship order ORD-20240301-K3Q9ZD in status pending",
  "request_id": "6b0f...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "catalog", description = "Public catalog and store information"),
        (name = "orders", description = "Checkout and the customer's own orders"),
        (name = "admin-orders", description = "Order manager actions"),
        (name = "master", description = "Access levels and role assignment"),
        (name = "admin", description = "Settings and dashboard"),
        (name = "reports", description = "Printable reports")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::settings::public_store_info,
        crate::handlers::checkout::checkout,
        crate::handlers::orders::list_my_orders,
        crate::handlers::orders::get_my_order,
        crate::handlers::orders::upload_slip,
        crate::handlers::orders::request_cancel,
        crate::handlers::admin_orders::list_orders,
        crate::handlers::admin_orders::get_order,
        crate::handlers::admin_orders::payment_verify,
        crate::handlers::admin_orders::confirm_order,
        crate::handlers::admin_orders::shipping_update,
        crate::handlers::admin_orders::confirm_shipped,
        crate::handlers::admin_orders::confirm_delivered,
        crate::handlers::admin_orders::cancel_order,
        crate::handlers::admin_orders::review_cancel,
        crate::handlers::admin_orders::attach_refund_slip,
        crate::handlers::admin_orders::complete_refund,
        crate::handlers::master::list_access_levels,
        crate::handlers::master::create_access_level,
        crate::handlers::master::list_staff,
        crate::handlers::master::assign_role,
        crate::handlers::master::set_active,
        crate::handlers::settings::get_settings,
        crate::handlers::settings::update_settings,
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::reports::sales_report,
        crate::handlers::reports::stock_report,
    ),
    components(
        schemas(
            crate::ListQuery,
            crate::errors::ErrorResponse,
            crate::auth::TokenPair,
            crate::entities::order::Model,
            crate::entities::order_product_detail::Model,
            crate::entities::product::Model,
            crate::entities::address::Model,
            crate::entities::access_level::Model,
            crate::entities::store_settings::Model,
            crate::entities::order::OrderStatus,
            crate::entities::order::PaymentType,
            crate::entities::order::TransactionStatus,
            crate::services::order_status::StatusView,
            crate::services::order_status::ReviewStep,
            crate::services::order_status::FulfillmentStep,
            crate::services::order_status::PaymentPhase,
            crate::services::order_status::OrderAction,
            crate::services::addresses::CreateAddressRequest,
            crate::services::addresses::UpdateAddressRequest,
            crate::services::cart::AddToCartRequest,
            crate::services::cart::SetQuantityRequest,
            crate::services::cart::CartView,
            crate::services::catalog::CreateProductRequest,
            crate::services::catalog::UpdateProductRequest,
            crate::services::catalog::AdjustStockRequest,
            crate::services::access::AccessLevelInput,
            crate::services::users::UpdateProfileRequest,
            crate::services::users::ChangePasswordRequest,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_admin_order_actions() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).expect("document serializes");
        assert!(json.contains("Storefront API"));
        assert!(json.contains("/api/admin/order/payment-verify"));
        assert!(json.contains("/api/admin/order/confirm-shipped"));
        assert!(json.contains("\"Bearer\""));
    }
}
