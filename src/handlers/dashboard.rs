use crate::{handlers::AppState, services::dashboard::DashboardSummary, ApiResponse, ApiResult};
use axum::{extract::State, Json};

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    summary = "Dashboard",
    description = "Order counts per status, delivered revenue, pending reviews, low stock and top sellers",
    responses(
        (status = 200, description = "Dashboard figures", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "admin"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let summary = state.services.dashboard.summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}
