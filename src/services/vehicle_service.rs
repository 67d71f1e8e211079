use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::vehicles::{
        CreateVehicleRequest, UpdateVehicleRequest, UploadImageRequest, VehicleList,
        VehicleWithImages,
    },
    entity::{
        Customers, VehicleImages, Vehicles,
        sea_orm_active_enums::{Role, VehicleStatus},
        vehicle_images::{ActiveModel as ImageActive, Column as ImageCol},
        vehicles::{ActiveModel as VehicleActive, Column as VehicleCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Vehicle, VehicleImage},
    numbering,
    response::{ApiResponse, Meta},
    routes::params::VehicleListQuery,
    services::{ensure_amount, search_condition, search_term},
    state::AppState,
};

const CASHIER_DENIED: &[&str] = &["approved_selling_price", "final_selling_price"];
const MECHANIC_ALLOWED: &[&str] = &["mileage", "condition_notes", "status"];

/// Field-level write rules for `PUT /vehicles/{id}`.
///
/// Admins may touch every field. Cashiers may not set approved or final prices.
/// Mechanics may only record mileage and condition notes, and move the vehicle
/// into or out of the workshop.
pub fn check_update_permissions(role: Role, payload: &UpdateVehicleRequest) -> AppResult<()> {
    let provided = payload.provided_fields();
    let denied: Vec<&str> = match role {
        Role::Admin => Vec::new(),
        Role::Cashier => provided
            .into_iter()
            .filter(|f| CASHIER_DENIED.contains(f))
            .collect(),
        Role::Mechanic => provided
            .into_iter()
            .filter(|f| !MECHANIC_ALLOWED.contains(f))
            .collect(),
    };
    if !denied.is_empty() {
        return Err(AppError::Forbidden(format!(
            "Role {} cannot update fields: {}",
            role.as_str(),
            denied.join(", ")
        )));
    }

    if role == Role::Mechanic {
        if let Some(status) = payload.status {
            if !matches!(status, VehicleStatus::InRepair | VehicleStatus::ReadyToSell) {
                return Err(AppError::Forbidden(
                    "Mechanics may only set status to in_repair or ready_to_sell".into(),
                ));
            }
        }
    }
    Ok(())
}

/// Manual status change check; `sold` is reserved for sales transactions.
pub fn check_status_change(current: VehicleStatus, next: VehicleStatus) -> AppResult<()> {
    if current != next && next == VehicleStatus::Sold {
        return Err(AppError::FailedPrecondition(
            "Vehicles are marked sold through a sales transaction".into(),
        ));
    }
    if !current.can_transition_to(next) {
        return Err(AppError::FailedPrecondition(format!(
            "Cannot change vehicle status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(())
}

const VEHICLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

fn ensure_price(value: Option<Decimal>, field: &str) -> AppResult<()> {
    value.map_or(Ok(()), |v| ensure_amount(v, field))
}

/// Applies the create-time field rules to whichever fields an update carries.
fn validate_update_fields(payload: &UpdateVehicleRequest) -> AppResult<()> {
    if payload.brand.as_deref().is_some_and(|b| b.trim().is_empty())
        || payload.model.as_deref().is_some_and(|m| m.trim().is_empty())
    {
        return Err(AppError::InvalidArgument(
            "brand and model cannot be empty".into(),
        ));
    }
    if payload.year.is_some_and(|y| !VEHICLE_YEARS.contains(&y)) {
        return Err(AppError::InvalidArgument("Invalid vehicle year".into()));
    }
    ensure_price(payload.suggested_selling_price, "suggested_selling_price")?;
    ensure_price(payload.approved_selling_price, "approved_selling_price")?;
    ensure_price(payload.final_selling_price, "final_selling_price")
}

pub async fn create_vehicle(
    state: &AppState,
    user: &AuthUser,
    payload: CreateVehicleRequest,
) -> AppResult<ApiResponse<Vehicle>> {
    ensure_role(user, &[Role::Admin, Role::Cashier])?;

    let chassis_number = payload.chassis_number.trim().to_string();
    if chassis_number.is_empty()
        || payload.brand.trim().is_empty()
        || payload.model.trim().is_empty()
    {
        return Err(AppError::InvalidArgument(
            "chassis_number, brand and model are required".into(),
        ));
    }
    if !VEHICLE_YEARS.contains(&payload.year) {
        return Err(AppError::InvalidArgument("Invalid vehicle year".into()));
    }
    ensure_price(payload.purchase_price, "purchase_price")?;

    if let Some(customer_id) = payload.purchased_from_customer_id {
        Customers::find_by_id(customer_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;
    }

    let created = VehicleActive {
        id: Set(Uuid::new_v4()),
        vehicle_code: Set(numbering::vehicle_code()),
        chassis_number: Set(chassis_number),
        license_plate: Set(payload.license_plate),
        brand: Set(payload.brand.trim().to_string()),
        model: Set(payload.model.trim().to_string()),
        variant: Set(payload.variant),
        year: Set(payload.year),
        color: Set(payload.color),
        mileage: Set(payload.mileage),
        fuel_type: Set(payload.fuel_type),
        transmission: Set(payload.transmission),
        purchase_price: Set(payload.purchase_price),
        total_repair_cost: Set(Decimal::ZERO),
        suggested_selling_price: Set(None),
        approved_selling_price: Set(None),
        final_selling_price: Set(None),
        status: Set(VehicleStatus::Purchased),
        purchased_from_customer_id: Set(payload.purchased_from_customer_id),
        sold_to_customer_id: Set(None),
        purchased_by_cashier: Set(None),
        sold_by_cashier: Set(None),
        price_approved_by_admin: Set(None),
        purchased_at: Set(None),
        sold_at: Set(None),
        purchase_notes: Set(payload.purchase_notes),
        condition_notes: Set(payload.condition_notes),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_conflict(e, "Chassis number already exists"))?;

    audit::record(
        &state.pool,
        user.user_id,
        "create_vehicle",
        "vehicles",
        created.id,
        json!({ "vehicle_code": created.vehicle_code, "chassis_number": created.chassis_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Vehicle created",
        created.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_vehicles(
    state: &AppState,
    query: VehicleListQuery,
) -> AppResult<ApiResponse<VehicleList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(VehicleCol::Status.eq(status));
    }
    if let Some(brand) = search_term(&query.brand) {
        condition = condition.add(search_condition(&[VehicleCol::Brand], brand));
    }
    if let Some(term) = search_term(&query.search) {
        condition = condition.add(search_condition(
            &[
                VehicleCol::VehicleCode,
                VehicleCol::ChassisNumber,
                VehicleCol::LicensePlate,
                VehicleCol::Brand,
                VehicleCol::Model,
            ],
            term,
        ));
    }

    let finder = Vehicles::find()
        .filter(condition)
        .order_by_desc(VehicleCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Vehicle::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        VehicleList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_vehicle(state: &AppState, id: Uuid) -> AppResult<ApiResponse<VehicleWithImages>> {
    let vehicle = Vehicles::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;

    let images = VehicleImages::find()
        .filter(ImageCol::VehicleId.eq(vehicle.id))
        .order_by_desc(ImageCol::IsPrimary)
        .order_by_asc(ImageCol::UploadedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(VehicleImage::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        VehicleWithImages {
            vehicle: vehicle.into(),
            images,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_vehicle(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateVehicleRequest,
) -> AppResult<ApiResponse<Vehicle>> {
    let fields = payload.provided_fields();
    if fields.is_empty() {
        return Err(AppError::InvalidArgument("No fields to update".into()));
    }
    check_update_permissions(user.role, &payload)?;
    validate_update_fields(&payload)?;

    let txn = state.orm.begin().await?;

    let existing = Vehicles::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;

    if let Some(next) = payload.status {
        check_status_change(existing.status, next)?;
    }

    let mut active: VehicleActive = existing.into();
    if let Some(v) = payload.license_plate {
        active.license_plate = Set(Some(v));
    }
    if let Some(v) = payload.brand {
        active.brand = Set(v.trim().to_string());
    }
    if let Some(v) = payload.model {
        active.model = Set(v.trim().to_string());
    }
    if let Some(v) = payload.variant {
        active.variant = Set(Some(v));
    }
    if let Some(v) = payload.year {
        active.year = Set(v);
    }
    if let Some(v) = payload.color {
        active.color = Set(Some(v));
    }
    if let Some(v) = payload.mileage {
        active.mileage = Set(Some(v));
    }
    if let Some(v) = payload.fuel_type {
        active.fuel_type = Set(Some(v));
    }
    if let Some(v) = payload.transmission {
        active.transmission = Set(Some(v));
    }
    if let Some(v) = payload.status {
        active.status = Set(v);
    }
    if let Some(v) = payload.suggested_selling_price {
        active.suggested_selling_price = Set(Some(v));
    }
    if let Some(v) = payload.approved_selling_price {
        active.approved_selling_price = Set(Some(v));
        active.price_approved_by_admin = Set(Some(user.user_id));
    }
    if let Some(v) = payload.final_selling_price {
        active.final_selling_price = Set(Some(v));
    }
    if let Some(v) = payload.condition_notes {
        active.condition_notes = Set(Some(v));
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "update_vehicle",
        "vehicles",
        updated.id,
        json!({ "fields": fields, "status": updated.status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Vehicle updated",
        updated.into(),
        Some(Meta::empty()),
    ))
}

/// Stores image metadata only; the path is generated, no bytes are written.
pub async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    vehicle_id: Uuid,
    payload: UploadImageRequest,
) -> AppResult<ApiResponse<VehicleImage>> {
    ensure_role(user, &[Role::Admin, Role::Mechanic])?;

    let txn = state.orm.begin().await?;

    Vehicles::find_by_id(vehicle_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;

    if payload.is_primary {
        VehicleImages::update_many()
            .col_expr(ImageCol::IsPrimary, false.into())
            .filter(ImageCol::VehicleId.eq(vehicle_id))
            .exec(&txn)
            .await?;
    }

    let image_id = Uuid::new_v4();
    let image = ImageActive {
        id: Set(image_id),
        vehicle_id: Set(vehicle_id),
        image_path: Set(format!("/uploads/vehicles/{vehicle_id}/{image_id}.jpg")),
        image_type: Set(payload.image_type),
        description: Set(payload.description),
        is_primary: Set(payload.is_primary),
        uploaded_at: NotSet,
        uploaded_by: Set(Some(user.user_id)),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "upload_vehicle_image",
        "vehicle_images",
        image.id,
        json!({ "vehicle_id": vehicle_id, "is_primary": image.is_primary }),
    )
    .await;

    Ok(ApiResponse::success(
        "Image uploaded",
        image.into(),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn mechanic_cannot_set_prices() {
        let payload = UpdateVehicleRequest {
            mileage: Some(42_000),
            final_selling_price: Some(dec!(150000000)),
            ..Default::default()
        };
        let err = check_update_permissions(Role::Mechanic, &payload)
            .expect_err("mechanic must be rejected");
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(err.to_string().contains("final_selling_price"));
        assert!(!err.to_string().contains("mileage"));
    }

    #[test]
    fn mechanic_status_limited_to_workshop_states() {
        let ok = UpdateVehicleRequest {
            status: Some(VehicleStatus::ReadyToSell),
            condition_notes: Some("brakes replaced".into()),
            ..Default::default()
        };
        assert!(check_update_permissions(Role::Mechanic, &ok).is_ok());

        let reserved = UpdateVehicleRequest {
            status: Some(VehicleStatus::Reserved),
            ..Default::default()
        };
        assert!(matches!(
            check_update_permissions(Role::Mechanic, &reserved),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn cashier_cannot_approve_prices_but_admin_can() {
        let payload = UpdateVehicleRequest {
            suggested_selling_price: Some(dec!(100)),
            approved_selling_price: Some(dec!(120)),
            ..Default::default()
        };
        let err = check_update_permissions(Role::Cashier, &payload)
            .expect_err("cashier must be rejected");
        assert_eq!(
            err.to_string(),
            "Role cashier cannot update fields: approved_selling_price"
        );
        assert!(check_update_permissions(Role::Admin, &payload).is_ok());
    }

    #[test]
    fn updates_follow_create_field_rules() {
        let cases = [
            UpdateVehicleRequest {
                year: Some(1800),
                ..Default::default()
            },
            UpdateVehicleRequest {
                year: Some(2101),
                ..Default::default()
            },
            UpdateVehicleRequest {
                brand: Some("   ".into()),
                ..Default::default()
            },
            UpdateVehicleRequest {
                model: Some(String::new()),
                ..Default::default()
            },
            UpdateVehicleRequest {
                approved_selling_price: Some(dec!(-1)),
                ..Default::default()
            },
            UpdateVehicleRequest {
                final_selling_price: Some(dec!(1000000000000)),
                ..Default::default()
            },
        ];
        for payload in &cases {
            assert!(
                matches!(
                    validate_update_fields(payload),
                    Err(AppError::InvalidArgument(_))
                ),
                "{payload:?}"
            );
        }

        let ok = UpdateVehicleRequest {
            brand: Some(" Toyota ".into()),
            year: Some(2019),
            suggested_selling_price: Some(dec!(999999999999.99)),
            ..Default::default()
        };
        assert!(validate_update_fields(&ok).is_ok());
    }

    #[test]
    fn status_changes_follow_lifecycle() {
        use VehicleStatus::*;
        assert!(check_status_change(Purchased, InRepair).is_ok());
        assert!(check_status_change(InRepair, ReadyToSell).is_ok());
        assert!(check_status_change(ReadyToSell, Reserved).is_ok());
        assert!(check_status_change(Reserved, ReadyToSell).is_ok());
        assert!(check_status_change(Reserved, Reserved).is_ok());
        assert!(matches!(
            check_status_change(ReadyToSell, Sold),
            Err(AppError::FailedPrecondition(_))
        ));
        assert!(matches!(
            check_status_change(Sold, ReadyToSell),
            Err(AppError::FailedPrecondition(_))
        ));
        assert!(matches!(
            check_status_change(InRepair, Reserved),
            Err(AppError::FailedPrecondition(_))
        ));
    }
}
