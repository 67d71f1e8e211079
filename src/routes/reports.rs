use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{
        BusinessOverview, DailyReport, MonthlyReport, TopPerformingModelList,
        VehicleProfitabilityList, WeeklyReport,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{
        DailyReportQuery, MonthlyReportQuery, TopModelsQuery, VehicleProfitabilityQuery,
        WeeklyReportQuery,
    },
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daily", get(daily_report))
        .route("/weekly", get(weekly_report))
        .route("/monthly", get(monthly_report))
        .route("/business-overview", get(business_overview))
        .route("/vehicle-profitability", get(vehicle_profitability))
        .route("/top-performing-models", get(top_performing_models))
}

#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(DailyReportQuery),
    responses((status = 200, description = "Daily transaction summary", body = ApiResponse<DailyReport>)),
    tag = "Reports"
)]
pub async fn daily_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DailyReportQuery>,
) -> AppResult<Json<ApiResponse<DailyReport>>> {
    let resp = report_service::daily_report(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/weekly",
    params(WeeklyReportQuery),
    responses((status = 200, description = "Weekly summary", body = ApiResponse<WeeklyReport>)),
    tag = "Reports"
)]
pub async fn weekly_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WeeklyReportQuery>,
) -> AppResult<Json<ApiResponse<WeeklyReport>>> {
    let resp = report_service::weekly_report(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/monthly",
    params(MonthlyReportQuery),
    responses(
        (status = 200, description = "Monthly summary", body = ApiResponse<MonthlyReport>),
        (status = 400, description = "Invalid year or month")
    ),
    tag = "Reports"
)]
pub async fn monthly_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MonthlyReportQuery>,
) -> AppResult<Json<ApiResponse<MonthlyReport>>> {
    let resp = report_service::monthly_report(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/business-overview",
    responses((status = 200, description = "Business overview", body = ApiResponse<BusinessOverview>)),
    tag = "Reports"
)]
pub async fn business_overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BusinessOverview>>> {
    let resp = report_service::business_overview(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/vehicle-profitability",
    params(VehicleProfitabilityQuery),
    responses((status = 200, description = "Per-vehicle profit for sold vehicles", body = ApiResponse<VehicleProfitabilityList>)),
    tag = "Reports"
)]
pub async fn vehicle_profitability(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<VehicleProfitabilityQuery>,
) -> AppResult<Json<ApiResponse<VehicleProfitabilityList>>> {
    let resp = report_service::vehicle_profitability(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/top-performing-models",
    params(TopModelsQuery),
    responses((status = 200, description = "Best selling brand and model pairs", body = ApiResponse<TopPerformingModelList>)),
    tag = "Reports"
)]
pub async fn top_performing_models(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TopModelsQuery>,
) -> AppResult<Json<ApiResponse<TopPerformingModelList>>> {
    let resp = report_service::top_performing_models(&state, &user, query).await?;
    Ok(Json(resp))
}
