use crate::{
    entities::store_settings,
    handlers::{common::validate_input, AppState},
    services::settings::{StoreInfo, UpdateSettingsRequest},
    ApiResponse, ApiResult,
};
use axum::{extract::State, Json};

/// Store name, bank details and shipping terms for the storefront.
#[utoipa::path(
    get,
    path = "/api/store",
    summary = "Store information",
    responses((status = 200, description = "Store information", body = ApiResponse<StoreInfo>)),
    tag = "catalog"
)]
pub async fn public_store_info(State(state): State<AppState>) -> ApiResult<StoreInfo> {
    let settings = state.services.settings.get().await?;
    Ok(Json(ApiResponse::success(StoreInfo::from(settings))))
}

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    summary = "Get store settings",
    responses(
        (status = 200, description = "Store settings", body = ApiResponse<store_settings::Model>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin"
)]
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<store_settings::Model> {
    let settings = state.services.settings.get().await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    summary = "Update store settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<store_settings::Model>),
        (status = 400, description = "Invalid settings", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<store_settings::Model> {
    validate_input(&request)?;
    let settings = state.services.settings.update(request).await?;
    Ok(Json(ApiResponse::with_message(settings, "Settings updated")))
}
