use crate::{
    auth::AuthUser,
    handlers::{
        common::{paginate, validate_input},
        AppState,
    },
    services::orders::{CancelRequest, OrderResponse, OrderSummary, UploadSlipRequest},
    ApiResponse, ApiResult, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/orders",
    summary = "List my orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<OrderSummary>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<OrderSummary>> {
    let limit = state.config.clamp_page_size(query.limit);
    let page = state
        .services
        .orders
        .list_for_user(auth_user.user_id, query.page(), limit)
        .await?;
    Ok(Json(ApiResponse::success(paginate(
        page,
        Some(query.page()),
        limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    summary = "Get my order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_my_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .get_for_user(auth_user.user_id, id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/slip",
    summary = "Upload transfer slip",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UploadSlipRequest,
    responses(
        (status = 200, description = "Slip recorded", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order does not accept a slip", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn upload_slip(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UploadSlipRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;
    let order = state
        .services
        .orders
        .upload_slip(auth_user.user_id, id, request)
        .await?;
    Ok(Json(ApiResponse::with_message(order, "Transfer slip uploaded")))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel-request",
    summary = "Request cancellation",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Cancellation requested", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order can no longer be cancelled", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn request_cancel(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;
    let order = state
        .services
        .orders
        .request_cancel(auth_user.user_id, id, request)
        .await?;
    Ok(Json(ApiResponse::with_message(order, "Cancellation requested")))
}
