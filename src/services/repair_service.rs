use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbBackend,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait, sea_query::LockType,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::repairs::{
        AddRepairPartRequest, AddRepairPartResponse, CreateRepairRequest, RepairList,
        RepairPartDetail, RepairWithParts, UpdateRepairRequest,
    },
    entity::{
        RepairParts, Repairs, SpareParts, Users, Vehicles,
        repair_parts::{ActiveModel as RepairPartActive, Column as RepairPartCol},
        repairs::{self, ActiveModel as RepairActive, Column as RepairCol},
        sea_orm_active_enums::{MovementType, ReferenceType, RepairStatus, Role, VehicleStatus},
        spare_parts::{ActiveModel as SparePartActive, Column as SparePartCol},
        vehicles::ActiveModel as VehicleActive,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Repair, RepairPart},
    numbering,
    response::{ApiResponse, Meta},
    routes::params::RepairListQuery,
    services::{
        ensure_amount,
        spare_part_service::{MovementRecord, insert_movement},
    },
    state::AppState,
};

const REPAIR_ROLES: &[Role] = &[Role::Admin, Role::Mechanic];

/// Mechanics work only on repairs assigned to them or not yet assigned.
pub fn ensure_repair_access(user: &AuthUser, repair: &repairs::Model) -> AppResult<()> {
    if user.role == Role::Mechanic
        && repair.mechanic_id.is_some_and(|assigned| assigned != user.user_id)
    {
        return Err(AppError::Forbidden(
            "Repair is assigned to another mechanic".into(),
        ));
    }
    Ok(())
}

/// Resolve who a repair gets assigned to. Mechanics may only assign themselves.
async fn resolve_assignee<C>(
    conn: &C,
    user: &AuthUser,
    requested: Option<Uuid>,
) -> AppResult<Option<Uuid>>
where
    C: ConnectionTrait,
{
    if user.role == Role::Mechanic {
        return match requested {
            Some(id) if id != user.user_id => Err(AppError::Forbidden(
                "Mechanics may only assign repairs to themselves".into(),
            )),
            _ => Ok(Some(user.user_id)),
        };
    }

    let Some(id) = requested else {
        return Ok(None);
    };
    let assignee = Users::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Mechanic"))?;
    if assignee.role != Role::Mechanic || !assignee.is_active {
        return Err(AppError::InvalidArgument(
            "Assigned user is not an active mechanic".into(),
        ));
    }
    Ok(Some(id))
}

/// Recompute a repair's part and total costs from its part lines.
pub(crate) async fn recompute_repair_totals<C>(conn: &C, repair_id: Uuid) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        UPDATE repairs
        SET total_parts_cost = parts.total,
            total_cost = labor_cost + parts.total,
            updated_at = NOW()
        FROM (
            SELECT COALESCE(SUM(total_cost), 0) AS total
            FROM repair_parts
            WHERE repair_id = $1
        ) AS parts
        WHERE repairs.id = $1
        "#,
        [repair_id.into()],
    ))
    .await?;
    Ok(())
}

/// Refresh `vehicles.total_repair_cost` from the vehicle's non-cancelled repairs.
pub(crate) async fn recompute_vehicle_repair_cost<C>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        UPDATE vehicles
        SET total_repair_cost = (
                SELECT COALESCE(SUM(total_cost), 0)
                FROM repairs
                WHERE vehicle_id = $1 AND status <> 'cancelled'
            ),
            updated_at = NOW()
        WHERE id = $1
        "#,
        [vehicle_id.into()],
    ))
    .await?;
    Ok(())
}

fn repair_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidArgument("Repair title is required".into()));
    }
    Ok(title.to_string())
}

fn checked_labor_cost(value: Decimal) -> AppResult<Decimal> {
    let value = value.round_dp(2);
    ensure_amount(value, "labor_cost")?;
    Ok(value)
}

/// `labor + parts`, bounded by what a money column can store.
fn repair_total(labor_cost: Decimal, parts_cost: Decimal) -> AppResult<Decimal> {
    let total = labor_cost
        .checked_add(parts_cost)
        .ok_or_else(|| AppError::InvalidArgument("Repair total is too large".into()))?;
    ensure_amount(total, "Repair total")?;
    Ok(total)
}

pub async fn create_repair(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRepairRequest,
) -> AppResult<ApiResponse<Repair>> {
    ensure_role(user, REPAIR_ROLES)?;

    let title = repair_title(&payload.title)?;
    let labor_cost = checked_labor_cost(payload.labor_cost.unwrap_or(Decimal::ZERO))?;

    let txn = state.orm.begin().await?;

    let mechanic_id = resolve_assignee(&txn, user, payload.mechanic_id).await?;

    let vehicle = Vehicles::find_by_id(payload.vehicle_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;
    if !vehicle.status.accepts_repairs() {
        return Err(AppError::FailedPrecondition(format!(
            "Vehicle in status {} cannot be repaired",
            vehicle.status.as_str()
        )));
    }

    let repair = RepairActive {
        id: Set(Uuid::new_v4()),
        repair_number: Set(numbering::repair_number(Utc::now())),
        vehicle_id: Set(vehicle.id),
        title: Set(title),
        description: Set(payload.description),
        labor_cost: Set(labor_cost),
        total_parts_cost: Set(Decimal::ZERO),
        total_cost: Set(labor_cost),
        status: Set(RepairStatus::Pending),
        mechanic_id: Set(mechanic_id),
        started_at: Set(None),
        completed_at: Set(None),
        work_notes: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_conflict(e, "Repair number already exists"))?;

    if vehicle.status != VehicleStatus::InRepair {
        let mut active: VehicleActive = vehicle.into();
        active.status = Set(VehicleStatus::InRepair);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(&txn).await?;
    }
    recompute_vehicle_repair_cost(&txn, repair.vehicle_id).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "create_repair",
        "repairs",
        repair.id,
        json!({ "repair_number": repair.repair_number, "vehicle_id": repair.vehicle_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Repair created",
        repair.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_repairs(
    state: &AppState,
    user: &AuthUser,
    query: RepairListQuery,
) -> AppResult<ApiResponse<RepairList>> {
    ensure_role(user, REPAIR_ROLES)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(RepairCol::Status.eq(status));
    }
    if let Some(vehicle_id) = query.vehicle_id {
        condition = condition.add(RepairCol::VehicleId.eq(vehicle_id));
    }
    if let Some(mechanic_id) = query.mechanic_id {
        condition = condition.add(RepairCol::MechanicId.eq(mechanic_id));
    }

    let finder = Repairs::find()
        .filter(condition)
        .order_by_desc(RepairCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Repair::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        RepairList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_repair(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<RepairWithParts>> {
    ensure_role(user, REPAIR_ROLES)?;

    let repair = Repairs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Repair"))?;

    let parts = RepairParts::find()
        .filter(RepairPartCol::RepairId.eq(repair.id))
        .order_by_asc(RepairPartCol::UsedAt)
        .find_also_related(SpareParts)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(line, part)| {
            let (part_name, part_code) = part
                .map(|p| (p.name, p.part_code))
                .unwrap_or_default();
            RepairPartDetail {
                part: line.into(),
                part_name,
                part_code,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        RepairWithParts {
            repair: repair.into(),
            parts,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_repair(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRepairRequest,
) -> AppResult<ApiResponse<Repair>> {
    ensure_role(user, REPAIR_ROLES)?;
    if payload.is_empty() {
        return Err(AppError::InvalidArgument("No fields to update".into()));
    }
    let title = payload.title.as_deref().map(repair_title).transpose()?;
    let new_labor_cost = payload.labor_cost.map(checked_labor_cost).transpose()?;

    let txn = state.orm.begin().await?;

    let existing = Repairs::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Repair"))?;
    ensure_repair_access(user, &existing)?;

    if let Some(next) = payload.status {
        if !existing.status.can_transition_to(next) {
            return Err(AppError::FailedPrecondition(format!(
                "Cannot change repair status from {} to {}",
                existing.status.as_str(),
                next.as_str()
            )));
        }
    }
    let mechanic_id = match payload.mechanic_id {
        Some(requested) => resolve_assignee(&txn, user, Some(requested)).await?,
        None => existing.mechanic_id,
    };

    let now = Utc::now().fixed_offset();
    let labor_cost = new_labor_cost.unwrap_or(existing.labor_cost);
    let total_cost = repair_total(labor_cost, existing.total_parts_cost)?;
    let previous_status = existing.status;
    let started_at = existing.started_at;

    let mut active: RepairActive = existing.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(work_notes) = payload.work_notes {
        active.work_notes = Set(Some(work_notes));
    }
    if let Some(status) = payload.status.filter(|s| *s != previous_status) {
        active.status = Set(status);
        match status {
            RepairStatus::InProgress => active.started_at = Set(Some(now)),
            RepairStatus::Completed => {
                active.completed_at = Set(Some(now));
                if started_at.is_none() {
                    active.started_at = Set(Some(now));
                }
            }
            RepairStatus::Pending | RepairStatus::Cancelled => {}
        }
    }
    active.mechanic_id = Set(mechanic_id);
    active.labor_cost = Set(labor_cost);
    active.total_cost = Set(total_cost);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    recompute_vehicle_repair_cost(&txn, updated.vehicle_id).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "update_repair",
        "repairs",
        updated.id,
        json!({ "status": updated.status, "total_cost": updated.total_cost }),
    )
    .await;

    Ok(ApiResponse::success(
        "Repair updated",
        updated.into(),
        Some(Meta::empty()),
    ))
}

/// Consume spare parts on a repair.
///
/// Runs as one transaction: the repair and part rows are locked, stock is
/// checked and decremented, the part line and its ledger movement are written
/// and both cost rollups are recomputed. Any error rolls everything back.
pub async fn add_repair_part(
    state: &AppState,
    user: &AuthUser,
    repair_id: Uuid,
    payload: AddRepairPartRequest,
) -> AppResult<ApiResponse<AddRepairPartResponse>> {
    ensure_role(user, REPAIR_ROLES)?;
    if payload.quantity_used <= 0 {
        return Err(AppError::InvalidArgument(
            "Quantity used must be greater than zero".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let repair = Repairs::find_by_id(repair_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Repair"))?;
    ensure_repair_access(user, &repair)?;
    if !repair.status.accepts_parts() {
        return Err(AppError::FailedPrecondition(
            "Parts can only be added to pending or in-progress repairs".into(),
        ));
    }

    let part = SpareParts::find_by_id(payload.spare_part_id)
        .filter(SparePartCol::IsActive.eq(true))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Spare part"))?;

    if payload.quantity_used > part.stock_quantity {
        return Err(AppError::FailedPrecondition(
            "Insufficient stock quantity".into(),
        ));
    }

    let unit_cost = part.selling_price;
    let line_total = unit_cost
        .checked_mul(Decimal::from(payload.quantity_used))
        .ok_or_else(|| AppError::InvalidArgument("Part line total is too large".into()))?
        .round_dp(2);
    ensure_amount(line_total, "Part line total")?;
    let parts_cost = repair
        .total_parts_cost
        .checked_add(line_total)
        .ok_or_else(|| AppError::InvalidArgument("Repair total is too large".into()))?;
    ensure_amount(parts_cost, "Repair parts total")?;
    repair_total(repair.labor_cost, parts_cost)?;

    let repair_part = RepairPartActive {
        id: Set(Uuid::new_v4()),
        repair_id: Set(repair.id),
        spare_part_id: Set(part.id),
        quantity_used: Set(payload.quantity_used),
        unit_cost: Set(unit_cost),
        total_cost: Set(line_total),
        used_at: NotSet,
        notes: Set(payload.notes.clone()),
    }
    .insert(&txn)
    .await?;

    let before = part.stock_quantity;
    let after = before - payload.quantity_used;
    let mut part_active: SparePartActive = part.into();
    part_active.stock_quantity = Set(after);
    part_active.updated_at = Set(Utc::now().fixed_offset());
    let part = part_active.update(&txn).await?;

    recompute_repair_totals(&txn, repair.id).await?;
    recompute_vehicle_repair_cost(&txn, repair.vehicle_id).await?;

    let movement = insert_movement(
        &txn,
        MovementRecord {
            spare_part_id: part.id,
            movement_type: MovementType::Out,
            reference_type: ReferenceType::Repair,
            reference_id: Some(repair.id),
            quantity_before: before,
            quantity_moved: payload.quantity_used,
            quantity_after: after,
            processed_by: user.user_id,
            notes: Some(
                payload
                    .notes
                    .unwrap_or_else(|| format!("Used in repair {}", repair.repair_number)),
            ),
        },
    )
    .await?;

    let repair = Repairs::find_by_id(repair.id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Repair"))?;

    txn.commit().await?;

    tracing::info!(
        repair_id = %repair.id,
        spare_part_id = %part.id,
        quantity = repair_part.quantity_used,
        stock_after = after,
        "repair part added"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "add_repair_part",
        "repairs",
        repair.id,
        json!({
            "spare_part_id": part.id,
            "quantity_used": repair_part.quantity_used,
            "total_cost": repair_part.total_cost,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Repair part added",
        AddRepairPartResponse {
            repair_part: RepairPart::from(repair_part),
            repair: repair.into(),
            stock_movement: movement.into(),
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn repair(mechanic_id: Option<Uuid>) -> repairs::Model {
        let now = Utc::now().fixed_offset();
        repairs::Model {
            id: Uuid::new_v4(),
            repair_number: "REP-20250101-ABCDEF12".into(),
            vehicle_id: Uuid::new_v4(),
            title: "Brake pads".into(),
            description: None,
            labor_cost: Decimal::ZERO,
            total_parts_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            status: RepairStatus::Pending,
            mechanic_id,
            started_at: None,
            completed_at: None,
            work_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: "tester".into(),
            role,
            session_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn mechanics_only_touch_own_or_unassigned_repairs() {
        let mechanic = user(Role::Mechanic);
        assert!(ensure_repair_access(&mechanic, &repair(None)).is_ok());
        assert!(ensure_repair_access(&mechanic, &repair(Some(mechanic.user_id))).is_ok());
        assert!(matches!(
            ensure_repair_access(&mechanic, &repair(Some(Uuid::new_v4()))),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_repair_access(&user(Role::Admin), &repair(Some(Uuid::new_v4()))).is_ok());
    }

    #[test]
    fn repair_status_lifecycle() {
        use RepairStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(Pending.accepts_parts());
        assert!(!Completed.accepts_parts());
    }

    #[test]
    fn titles_are_trimmed_and_required() {
        assert_eq!(repair_title("  Oil change ").expect("valid"), "Oil change");
        assert!(matches!(repair_title("   "), Err(AppError::InvalidArgument(_))));
        assert!(matches!(repair_title(""), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn labor_and_totals_stay_within_money_range() {
        use rust_decimal_macros::dec;

        assert_eq!(checked_labor_cost(dec!(12.344)).expect("valid"), dec!(12.34));
        assert!(matches!(
            checked_labor_cost(dec!(-1)),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            checked_labor_cost(dec!(1000000000000)),
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(repair_total(dec!(100), dec!(50.50)).expect("valid"), dec!(150.50));
        assert!(matches!(
            repair_total(dec!(999999999999.99), dec!(0.01)),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
