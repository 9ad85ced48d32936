use crate::{
    handlers::AppState,
    services::reports::{SalesReport, SalesReportQuery, StockReport},
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Query, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/api/admin/reports/sales",
    summary = "Sales report",
    description = "One row per order in the date range plus totals per payment type",
    params(SalesReportQuery),
    responses(
        (status = 200, description = "Sales report", body = ApiResponse<SalesReport>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reports"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<SalesReportQuery>,
) -> ApiResult<SalesReport> {
    let report = state.services.reports.sales_report(&query).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/stock",
    summary = "Stock report",
    responses(
        (status = 200, description = "Stock report", body = ApiResponse<StockReport>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reports"
)]
pub async fn stock_report(State(state): State<AppState>) -> ApiResult<StockReport> {
    let report = state.services.reports.stock_report().await?;
    Ok(Json(ApiResponse::success(report)))
}
