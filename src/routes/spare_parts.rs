use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::spare_parts::{
        CreateSparePartRequest, LowStockAlertList, SparePartList, StockAdjustmentRequest,
        StockMovementList, UpdateSparePartRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::SparePart,
    response::ApiResponse,
    routes::params::{Pagination, SparePartListQuery},
    services::spare_part_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_spare_part).get(list_spare_parts))
        .route("/low-stock", get(low_stock_alerts))
        .route("/{id}", get(get_spare_part).put(update_spare_part))
        .route("/{id}/adjust-stock", post(adjust_stock))
        .route("/{id}/movements", get(list_movements))
}

#[utoipa::path(
    post,
    path = "/api/spare-parts",
    request_body = CreateSparePartRequest,
    responses((status = 201, description = "Spare part created", body = ApiResponse<SparePart>)),
    tag = "Spare Parts"
)]
pub async fn create_spare_part(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSparePartRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SparePart>>)> {
    let resp = spare_part_service::create_spare_part(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/spare-parts",
    params(SparePartListQuery),
    responses((status = 200, description = "List active spare parts", body = ApiResponse<SparePartList>)),
    tag = "Spare Parts"
)]
pub async fn list_spare_parts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SparePartListQuery>,
) -> AppResult<Json<ApiResponse<SparePartList>>> {
    let resp = spare_part_service::list_spare_parts(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/spare-parts/low-stock",
    responses((status = 200, description = "Parts at or below their minimum level", body = ApiResponse<LowStockAlertList>)),
    tag = "Spare Parts"
)]
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<LowStockAlertList>>> {
    let resp = spare_part_service::low_stock_alerts(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/spare-parts/{id}",
    params(("id" = Uuid, Path, description = "Spare part ID")),
    responses(
        (status = 200, description = "Get spare part", body = ApiResponse<SparePart>),
        (status = 404, description = "Spare part not found")
    ),
    tag = "Spare Parts"
)]
pub async fn get_spare_part(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SparePart>>> {
    let resp = spare_part_service::get_spare_part(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/spare-parts/{id}",
    params(("id" = Uuid, Path, description = "Spare part ID")),
    request_body = UpdateSparePartRequest,
    responses((status = 200, description = "Updated spare part", body = ApiResponse<SparePart>)),
    tag = "Spare Parts"
)]
pub async fn update_spare_part(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSparePartRequest>,
) -> AppResult<Json<ApiResponse<SparePart>>> {
    let resp = spare_part_service::update_spare_part(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/spare-parts/{id}/adjust-stock",
    params(("id" = Uuid, Path, description = "Spare part ID")),
    request_body = StockAdjustmentRequest,
    responses((status = 200, description = "Stock adjusted", body = ApiResponse<SparePart>)),
    tag = "Spare Parts"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockAdjustmentRequest>,
) -> AppResult<Json<ApiResponse<SparePart>>> {
    let resp = spare_part_service::adjust_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/spare-parts/{id}/movements",
    params(("id" = Uuid, Path, description = "Spare part ID"), Pagination),
    responses((status = 200, description = "Stock movement ledger", body = ApiResponse<StockMovementList>)),
    tag = "Spare Parts"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<StockMovementList>>> {
    let resp = spare_part_service::list_movements(&state, id, pagination).await?;
    Ok(Json(resp))
}
