use crate::{
    auth::AuthUser,
    entities::address,
    handlers::{common::validate_input, AppState},
    services::addresses::{CreateAddressRequest, UpdateAddressRequest},
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

pub async fn list_addresses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Vec<address::Model>> {
    let addresses = state.services.addresses.list(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success(addresses)))
}

pub async fn get_address(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<address::Model> {
    let address = state.services.addresses.get(auth_user.user_id, id).await?;
    Ok(Json(ApiResponse::success(address)))
}

pub async fn create_address(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<ApiResponse<address::Model>>), crate::errors::ServiceError> {
    validate_input(&request)?;
    let address = state
        .services
        .addresses
        .create(auth_user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(address))))
}

pub async fn update_address(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAddressRequest>,
) -> ApiResult<address::Model> {
    validate_input(&request)?;
    let address = state
        .services
        .addresses
        .update(auth_user.user_id, id, request)
        .await?;
    Ok(Json(ApiResponse::success(address)))
}

pub async fn delete_address(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state
        .services
        .addresses
        .delete(auth_user.user_id, id)
        .await?;
    Ok(Json(ApiResponse::with_message((), "Address deleted")))
}

pub async fn set_default_address(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<address::Model> {
    let address = state
        .services
        .addresses
        .set_default(auth_user.user_id, id)
        .await?;
    Ok(Json(ApiResponse::success(address)))
}
