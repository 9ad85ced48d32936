//! Order manager endpoints. Every action takes the order id in the body and
//! returns the updated order with its status view.

use crate::{
    auth::AuthUser,
    handlers::{
        common::{paginate, validate_input},
        AppState,
    },
    services::orders::{
        AdminCancelRequest, AdminOrderQuery, OrderIdRequest, OrderResponse, OrderSummary,
        PaymentVerifyRequest, RefundSlipRequest, ReviewCancelRequest, ShippingUpdateRequest,
    },
    ApiResponse, ApiResult, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/admin/order",
    summary = "List orders",
    description = "All orders, filtered by status, payment type, customer or order number",
    params(AdminOrderQuery),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<OrderSummary>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<AdminOrderQuery>,
) -> ApiResult<PaginatedResponse<OrderSummary>> {
    let limit = state.config.clamp_page_size(query.limit);
    let page = state.services.orders.list_admin(&query, limit).await?;
    Ok(Json(ApiResponse::success(paginate(page, query.page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/admin/order/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.get_admin(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/payment-verify",
    summary = "Verify transfer payment",
    description = "Approve or reject the transfer slip of a pending bank transfer order",
    request_body = PaymentVerifyRequest,
    responses(
        (status = 200, description = "Payment reviewed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order modified concurrently", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn payment_verify(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<PaymentVerifyRequest>,
) -> ApiResult<OrderResponse> {
    info!(actor = %auth_user.user_id, order_id = %request.order_id, approve = request.approve, "Payment review");
    let order = state.services.orders.verify_payment(request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/confirm-order",
    summary = "Confirm order",
    description = "Accept a pending order and start preparing it",
    request_body = OrderIdRequest,
    responses(
        (status = 200, description = "Order confirmed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order modified concurrently", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    Json(request): Json<OrderIdRequest>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.confirm_order(request.order_id).await?;
    Ok(Json(ApiResponse::with_message(order, "Order confirmed")))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/shipping-update",
    summary = "Update shipping details",
    request_body = ShippingUpdateRequest,
    responses(
        (status = 200, description = "Shipping details saved", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn shipping_update(
    State(state): State<AppState>,
    Json(request): Json<ShippingUpdateRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;
    let order = state.services.orders.update_shipping(request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/confirm-shipped",
    summary = "Confirm shipped",
    description = "Requires cleared payment and all six shipping fields",
    request_body = OrderIdRequest,
    responses(
        (status = 200, description = "Order shipped", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Payment not cleared or shipping details missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn confirm_shipped(
    State(state): State<AppState>,
    Json(request): Json<OrderIdRequest>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.confirm_shipped(request.order_id).await?;
    Ok(Json(ApiResponse::with_message(order, "Order shipped")))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/confirm-delivered",
    summary = "Confirm delivered",
    request_body = OrderIdRequest,
    responses(
        (status = 200, description = "Order delivered", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order is not shipped", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn confirm_delivered(
    State(state): State<AppState>,
    Json(request): Json<OrderIdRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .confirm_delivered(request.order_id)
        .await?;
    Ok(Json(ApiResponse::with_message(order, "Order delivered")))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/cancel",
    summary = "Cancel order",
    description = "Orders with a transfer slip move to refunding instead of cancelled",
    request_body = AdminCancelRequest,
    responses(
        (status = 200, description = "Order cancelled or sent to refund", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order can no longer be cancelled", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Json(request): Json<AdminCancelRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;
    let order = state.services.orders.cancel(request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/review-cancel",
    summary = "Review cancellation request",
    request_body = ReviewCancelRequest,
    responses(
        (status = 200, description = "Request approved or rejected", body = ApiResponse<OrderResponse>),
        (status = 400, description = "No pending cancellation request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn review_cancel(
    State(state): State<AppState>,
    Json(request): Json<ReviewCancelRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;
    let order = state.services.orders.review_cancel(request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/refund-slip",
    summary = "Attach refund slip",
    request_body = RefundSlipRequest,
    responses(
        (status = 200, description = "Refund slip attached", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order is not refunding", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn attach_refund_slip(
    State(state): State<AppState>,
    Json(request): Json<RefundSlipRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;
    let order = state.services.orders.attach_refund_slip(request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/refund-complete",
    summary = "Complete refund",
    request_body = OrderIdRequest,
    responses(
        (status = 200, description = "Refund recorded", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Refund slip missing or order not refunding", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin-orders"
)]
pub async fn complete_refund(
    State(state): State<AppState>,
    Json(request): Json<OrderIdRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .complete_refund(request.order_id)
        .await?;
    Ok(Json(ApiResponse::with_message(order, "Refund completed")))
}
