use crate::{
    auth::AuthUser,
    handlers::{common::validate_input, AppState},
    services::users::{ChangePasswordRequest, UpdateProfileRequest, UserProfile},
    ApiResponse, ApiResult,
};
use axum::{extract::State, Json};

pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<UserProfile> {
    let profile = state.services.users.profile(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<UserProfile> {
    validate_input(&request)?;
    let profile = state
        .services
        .users
        .update_profile(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::with_message(profile, "Profile updated")))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    validate_input(&request)?;
    state
        .services
        .users
        .change_password(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::with_message((), "Password changed")))
}
