use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::AppState,
    services::{checkout::CheckoutRequest, orders::OrderResponse},
    ApiResponse,
};
use axum::{extract::State, http::StatusCode, Json};

#[utoipa::path(
    post,
    path = "/api/checkout",
    summary = "Checkout",
    description = "Turn the caller's cart into a pending order",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Empty cart, unavailable product or payment type", body = crate::errors::ErrorResponse),
        (status = 404, description = "Address not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let order = state
        .services
        .checkout
        .checkout(auth_user.user_id, request)
        .await?;
    let response = state
        .services
        .orders
        .get_for_user(auth_user.user_id, order.id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(response, "Order placed")),
    ))
}
