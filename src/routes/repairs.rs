use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::repairs::{
        AddRepairPartRequest, AddRepairPartResponse, CreateRepairRequest, RepairList,
        RepairWithParts, UpdateRepairRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Repair,
    response::ApiResponse,
    routes::params::RepairListQuery,
    services::repair_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_repair).get(list_repairs))
        .route("/{id}", get(get_repair).put(update_repair))
        .route("/{id}/parts", post(add_repair_part))
}

#[utoipa::path(
    post,
    path = "/api/repairs",
    request_body = CreateRepairRequest,
    responses(
        (status = 201, description = "Repair opened", body = ApiResponse<Repair>),
        (status = 400, description = "Vehicle does not accept repairs")
    ),
    tag = "Repairs"
)]
pub async fn create_repair(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRepairRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Repair>>)> {
    let resp = repair_service::create_repair(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/repairs",
    params(RepairListQuery),
    responses((status = 200, description = "List repairs", body = ApiResponse<RepairList>)),
    tag = "Repairs"
)]
pub async fn list_repairs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RepairListQuery>,
) -> AppResult<Json<ApiResponse<RepairList>>> {
    let resp = repair_service::list_repairs(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/repairs/{id}",
    params(("id" = Uuid, Path, description = "Repair ID")),
    responses(
        (status = 200, description = "Repair with part lines", body = ApiResponse<RepairWithParts>),
        (status = 404, description = "Repair not found")
    ),
    tag = "Repairs"
)]
pub async fn get_repair(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RepairWithParts>>> {
    let resp = repair_service::get_repair(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/repairs/{id}",
    params(("id" = Uuid, Path, description = "Repair ID")),
    request_body = UpdateRepairRequest,
    responses((status = 200, description = "Updated repair", body = ApiResponse<Repair>)),
    tag = "Repairs"
)]
pub async fn update_repair(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRepairRequest>,
) -> AppResult<Json<ApiResponse<Repair>>> {
    let resp = repair_service::update_repair(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/repairs/{id}/parts",
    params(("id" = Uuid, Path, description = "Repair ID")),
    request_body = AddRepairPartRequest,
    responses(
        (status = 201, description = "Part consumed", body = ApiResponse<AddRepairPartResponse>),
        (status = 400, description = "Insufficient stock quantity")
    ),
    tag = "Repairs"
)]
pub async fn add_repair_part(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddRepairPartRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AddRepairPartResponse>>)> {
    let resp = repair_service::add_repair_part(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
