use crate::{
    auth::AuthUser,
    handlers::{common::validate_input, AppState},
    services::cart::{AddToCartRequest, CartView, SetQuantityRequest},
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

pub async fn get_cart(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<CartView> {
    let cart = state.services.cart.view(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn add_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<AddToCartRequest>,
) -> ApiResult<CartView> {
    validate_input(&request)?;
    let cart = state
        .services
        .cart
        .add_item(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn set_quantity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(request): Json<SetQuantityRequest>,
) -> ApiResult<CartView> {
    validate_input(&request)?;
    let cart = state
        .services
        .cart
        .set_quantity(auth_user.user_id, product_id, request)
        .await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> ApiResult<CartView> {
    let cart = state
        .services
        .cart
        .remove_item(auth_user.user_id, product_id)
        .await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn clear_cart(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<()> {
    state.services.cart.clear(auth_user.user_id).await?;
    Ok(Json(ApiResponse::with_message((), "Cart cleared")))
}
