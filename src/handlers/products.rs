use crate::{
    entities::product,
    errors::ServiceError,
    handlers::{common::validate_input, AppState},
    services::catalog::{AdjustStockRequest, CreateProductRequest, ProductQuery, UpdateProductRequest},
    ApiResponse, ApiResult, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/products",
    summary = "List products",
    description = "Active products, filtered by category and name",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<PaginatedResponse<product::Model>>),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(mut query): Query<ProductQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    query.include_inactive = false;
    list(&state, query).await
}

pub async fn admin_list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    list(&state, query).await
}

async fn list(
    state: &AppState,
    query: ProductQuery,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let limit = state.config.clamp_page_size(query.limit);
    let page = state.services.catalog.list_products(&query, limit).await?;
    Ok(Json(ApiResponse::success(
        crate::handlers::common::paginate(page, query.page, limit),
    )))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    summary = "Get product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = ApiResponse<product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<product::Model> {
    let product = state.services.catalog.get_active_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<product::Model>>), ServiceError> {
    validate_input(&request)?;
    let product = state.services.catalog.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<product::Model> {
    validate_input(&request)?;
    let product = state.services.catalog.update_product(id, request).await?;
    Ok(Json(ApiResponse::success(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.catalog.delete_product(id).await?;
    Ok(Json(ApiResponse::with_message((), "Product deleted")))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> ApiResult<product::Model> {
    let product = state.services.catalog.adjust_stock(id, request).await?;
    Ok(Json(ApiResponse::success(product)))
}
