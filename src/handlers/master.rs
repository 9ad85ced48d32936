use crate::{
    auth::AuthUser,
    entities::access_level,
    errors::ServiceError,
    handlers::{common::validate_input, AppState},
    services::{
        access::{AccessLevelInput, CreateAccessLevelRequest},
        users::{AssignLevelRequest, SetActiveRequest, StaffMember},
    },
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/master/access",
    summary = "List access levels",
    responses(
        (status = 200, description = "Access levels", body = ApiResponse<Vec<access_level::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "master"
)]
pub async fn list_access_levels(
    State(state): State<AppState>,
) -> ApiResult<Vec<access_level::Model>> {
    let levels = state.services.access.list().await?;
    Ok(Json(ApiResponse::success(levels)))
}

pub async fn get_access_level(
    State(state): State<AppState>,
    Path(level): Path<i32>,
) -> ApiResult<access_level::Model> {
    let level = state.services.access.get(level).await?;
    Ok(Json(ApiResponse::success(level)))
}

#[utoipa::path(
    post,
    path = "/api/master/access",
    summary = "Create access level",
    request_body = CreateAccessLevelRequest,
    responses(
        (status = 201, description = "Access level created", body = ApiResponse<access_level::Model>),
        (status = 400, description = "Invalid level", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Level already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "master"
)]
pub async fn create_access_level(
    State(state): State<AppState>,
    Json(request): Json<CreateAccessLevelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<access_level::Model>>), ServiceError> {
    validate_input(&request)?;
    let level = state.services.access.create(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(level))))
}

pub async fn update_access_level(
    State(state): State<AppState>,
    Path(level): Path<i32>,
    Json(request): Json<AccessLevelInput>,
) -> ApiResult<access_level::Model> {
    validate_input(&request)?;
    let level = state.services.access.update(level, request).await?;
    Ok(Json(ApiResponse::success(level)))
}

pub async fn delete_access_level(
    State(state): State<AppState>,
    Path(level): Path<i32>,
) -> ApiResult<()> {
    state.services.access.delete(level).await?;
    Ok(Json(ApiResponse::with_message((), "Access level deleted")))
}

#[utoipa::path(
    get,
    path = "/api/master/role",
    summary = "List staff",
    description = "Users above the customer level with their access level",
    responses(
        (status = 200, description = "Staff users", body = ApiResponse<Vec<StaffMember>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "master"
)]
pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Vec<StaffMember>> {
    let staff = state.services.users.list_staff().await?;
    Ok(Json(ApiResponse::success(staff)))
}

#[utoipa::path(
    put,
    path = "/api/master/role/{user_id}",
    summary = "Assign access level",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = AssignLevelRequest,
    responses(
        (status = 200, description = "Level assigned", body = ApiResponse<StaffMember>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "User or level not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "master"
)]
pub async fn assign_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AssignLevelRequest>,
) -> ApiResult<StaffMember> {
    validate_input(&request)?;
    if user_id == auth_user.user_id {
        return Err(ServiceError::InvalidOperation(
            "You cannot change your own access level".to_string(),
        ));
    }
    let member = state
        .services
        .users
        .assign_level(auth_user.is_admin(), user_id, request.access_level)
        .await?;
    Ok(Json(ApiResponse::success(member)))
}

#[utoipa::path(
    put,
    path = "/api/master/role/{user_id}/active",
    summary = "Enable or disable an account",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<StaffMember>),
        (status = 400, description = "Own account", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "master"
)]
pub async fn set_active(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> ApiResult<StaffMember> {
    if user_id == auth_user.user_id {
        return Err(ServiceError::InvalidOperation(
            "You cannot disable your own account".to_string(),
        ));
    }
    let member = state
        .services
        .users
        .set_active(auth_user.is_admin(), user_id, request.is_active)
        .await?;
    Ok(Json(ApiResponse::success(member)))
}
