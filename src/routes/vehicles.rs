use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::vehicles::{
        CreateVehicleRequest, UpdateVehicleRequest, UploadImageRequest, VehicleList,
        VehicleWithImages,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Vehicle, VehicleImage},
    response::ApiResponse,
    routes::params::VehicleListQuery,
    services::vehicle_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/{id}", get(get_vehicle).put(update_vehicle))
        .route("/{id}/images", post(upload_image))
}

#[utoipa::path(
    post,
    path = "/api/vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = ApiResponse<Vehicle>),
        (status = 409, description = "Chassis number already exists")
    ),
    tag = "Vehicles"
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    let resp = vehicle_service::create_vehicle(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/vehicles",
    params(VehicleListQuery),
    responses((status = 200, description = "List vehicles", body = ApiResponse<VehicleList>)),
    tag = "Vehicles"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<VehicleListQuery>,
) -> AppResult<Json<ApiResponse<VehicleList>>> {
    let resp = vehicle_service::list_vehicles(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle with images", body = ApiResponse<VehicleWithImages>),
        (status = 404, description = "Vehicle not found")
    ),
    tag = "Vehicles"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VehicleWithImages>>> {
    let resp = vehicle_service::get_vehicle(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/vehicles/{id}",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Updated vehicle", body = ApiResponse<Vehicle>),
        (status = 403, description = "Field not writable by the caller's role")
    ),
    tag = "Vehicles"
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let resp = vehicle_service::update_vehicle(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vehicles/{id}/images",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    request_body = UploadImageRequest,
    responses((status = 201, description = "Image recorded", body = ApiResponse<VehicleImage>)),
    tag = "Vehicles"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UploadImageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<VehicleImage>>)> {
    let resp = vehicle_service::upload_image(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
