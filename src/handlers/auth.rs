use crate::{
    auth::TokenPair,
    errors::ServiceError,
    handlers::{common::validate_input, AppState},
    services::users::{LoginRequest, RegisterRequest, UserProfile},
    ApiResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

/// Token plus the account it was issued for
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: TokenPair,
    pub user: UserProfile,
}

fn issue(
    state: &AppState,
    user: crate::entities::user::Model,
    level: crate::entities::access_level::Model,
) -> Result<AuthResponse, ServiceError> {
    let token = state
        .auth
        .generate_token(&user, &level)
        .map_err(|e| ServiceError::InternalError(format!("Token issue failed: {}", e)))?;
    Ok(AuthResponse {
        token,
        user: UserProfile::from_models(user, &level),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    summary = "Register",
    description = "Create a customer account and return an access token",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ServiceError> {
    validate_input(&request)?;
    let (user, level) = state.services.users.register(request).await?;
    let response = issue(&state, user, level)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    summary = "Login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid email or password", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account disabled", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ServiceError> {
    validate_input(&request)?;
    let (user, level) = state
        .services
        .users
        .authenticate(&request.email, &request.password)
        .await?;
    info!(user_id = %user.id, access_level = level.level, "User logged in");
    Ok(Json(ApiResponse::success(issue(&state, user, level)?)))
}
