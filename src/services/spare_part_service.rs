use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
    sea_query::{Expr, LockType},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::spare_parts::{
        CreateSparePartRequest, LowStockAlert, LowStockAlertList, SparePartList,
        StockAdjustmentRequest, StockMovementList, UpdateSparePartRequest,
    },
    entity::{
        SpareParts, StockMovements,
        sea_orm_active_enums::{MovementType, ReferenceType},
        spare_parts::{ActiveModel as SparePartActive, Column as SparePartCol},
        stock_movements::{self, ActiveModel as MovementActive, Column as MovementCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{SparePart, StockMovement},
    numbering,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SparePartListQuery},
    services::{ensure_amount, search_condition, search_term},
    state::AppState,
};

/// One ledger line. `quantity_after` is derived from the other two quantities
/// by the caller, the ledger never recomputes it.
pub(crate) struct MovementRecord {
    pub spare_part_id: Uuid,
    pub movement_type: MovementType,
    pub reference_type: ReferenceType,
    pub reference_id: Option<Uuid>,
    pub quantity_before: i32,
    pub quantity_moved: i32,
    pub quantity_after: i32,
    pub processed_by: Uuid,
    pub notes: Option<String>,
}

pub(crate) async fn insert_movement<C>(
    conn: &C,
    record: MovementRecord,
) -> Result<stock_movements::Model, DbErr>
where
    C: ConnectionTrait,
{
    MovementActive {
        id: Set(Uuid::new_v4()),
        spare_part_id: Set(record.spare_part_id),
        movement_type: Set(record.movement_type),
        reference_type: Set(record.reference_type),
        reference_id: Set(record.reference_id),
        quantity_before: Set(record.quantity_before),
        quantity_moved: Set(record.quantity_moved),
        quantity_after: Set(record.quantity_after),
        movement_date: NotSet,
        processed_by: Set(Some(record.processed_by)),
        notes: Set(record.notes),
    }
    .insert(conn)
    .await
}

fn low_stock_condition() -> Condition {
    Condition::all()
        .add(SparePartCol::IsActive.eq(true))
        .add(Expr::col(SparePartCol::StockQuantity).lte(Expr::col(SparePartCol::MinStockLevel)))
}

fn validate_prices(cost_price: Option<Decimal>, selling_price: Option<Decimal>) -> AppResult<()> {
    if let Some(p) = cost_price {
        ensure_amount(p, "cost_price")?;
    }
    if let Some(p) = selling_price {
        ensure_amount(p, "selling_price")?;
    }
    Ok(())
}

pub async fn create_spare_part(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSparePartRequest,
) -> AppResult<ApiResponse<SparePart>> {
    ensure_admin(user)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("Spare part name is required".into()));
    }
    validate_prices(Some(payload.cost_price), Some(payload.selling_price))?;
    let stock_quantity = payload.stock_quantity.unwrap_or(0);
    let min_stock_level = payload.min_stock_level.unwrap_or(0);
    if stock_quantity < 0 || min_stock_level < 0 {
        return Err(AppError::InvalidArgument(
            "Stock quantity cannot be negative".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let part = SparePartActive {
        id: Set(Uuid::new_v4()),
        part_code: Set(numbering::part_code()),
        name: Set(name),
        description: Set(payload.description),
        brand: Set(payload.brand),
        cost_price: Set(payload.cost_price.round_dp(2)),
        selling_price: Set(payload.selling_price.round_dp(2)),
        stock_quantity: Set(stock_quantity),
        min_stock_level: Set(min_stock_level),
        unit_measure: Set(payload.unit_measure.unwrap_or_else(|| "pcs".to_string())),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_conflict(e, "Part code already exists"))?;

    if stock_quantity > 0 {
        insert_movement(
            &txn,
            MovementRecord {
                spare_part_id: part.id,
                movement_type: MovementType::In,
                reference_type: ReferenceType::Adjustment,
                reference_id: None,
                quantity_before: 0,
                quantity_moved: stock_quantity,
                quantity_after: stock_quantity,
                processed_by: user.user_id,
                notes: Some("Initial stock".into()),
            },
        )
        .await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "create_spare_part",
        "spare_parts",
        part.id,
        json!({ "part_code": part.part_code, "stock_quantity": part.stock_quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Spare part created",
        part.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_spare_parts(
    state: &AppState,
    query: SparePartListQuery,
) -> AppResult<ApiResponse<SparePartList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(SparePartCol::IsActive.eq(true));
    if let Some(term) = search_term(&query.search) {
        condition = condition.add(search_condition(
            &[
                SparePartCol::Name,
                SparePartCol::PartCode,
                SparePartCol::Description,
            ],
            term,
        ));
    }
    if let Some(brand) = search_term(&query.brand) {
        condition = condition.add(search_condition(&[SparePartCol::Brand], brand));
    }
    if query.low_stock.unwrap_or(false) {
        condition = condition.add(low_stock_condition());
    }

    let finder = SpareParts::find()
        .filter(condition)
        .order_by_asc(SparePartCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SparePart::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        SparePartList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_spare_part(state: &AppState, id: Uuid) -> AppResult<ApiResponse<SparePart>> {
    let part = SpareParts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Spare part"))?;
    Ok(ApiResponse::success("Ok", part.into(), Some(Meta::empty())))
}

/// Catalogue fields only; stock moves through adjustments and repairs.
pub async fn update_spare_part(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSparePartRequest,
) -> AppResult<ApiResponse<SparePart>> {
    ensure_admin(user)?;
    if payload.is_empty() {
        return Err(AppError::InvalidArgument("No fields to update".into()));
    }
    validate_prices(payload.cost_price, payload.selling_price)?;
    if payload.min_stock_level.is_some_and(|m| m < 0) {
        return Err(AppError::InvalidArgument(
            "Minimum stock level cannot be negative".into(),
        ));
    }

    let existing = SpareParts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Spare part"))?;

    let mut active: SparePartActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(cost_price) = payload.cost_price {
        active.cost_price = Set(cost_price.round_dp(2));
    }
    if let Some(selling_price) = payload.selling_price {
        active.selling_price = Set(selling_price.round_dp(2));
    }
    if let Some(min_stock_level) = payload.min_stock_level {
        active.min_stock_level = Set(min_stock_level);
    }
    if let Some(unit_measure) = payload.unit_measure {
        active.unit_measure = Set(unit_measure);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "update_spare_part",
        "spare_parts",
        updated.id,
        json!({ "part_code": updated.part_code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Spare part updated",
        updated.into(),
        Some(Meta::empty()),
    ))
}

/// Set the on-hand quantity to an absolute value and record the difference in the ledger.
pub async fn adjust_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: StockAdjustmentRequest,
) -> AppResult<ApiResponse<SparePart>> {
    ensure_admin(user)?;
    if payload.new_quantity < 0 {
        return Err(AppError::InvalidArgument(
            "Stock quantity cannot be negative".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let part = SpareParts::find_by_id(id)
        .filter(SparePartCol::IsActive.eq(true))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Spare part"))?;

    let before = part.stock_quantity;
    let after = payload.new_quantity;

    let mut active: SparePartActive = part.into();
    active.stock_quantity = Set(after);
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&txn).await?;

    let movement = insert_movement(
        &txn,
        MovementRecord {
            spare_part_id: updated.id,
            movement_type: MovementType::for_change(before, after),
            reference_type: ReferenceType::Adjustment,
            reference_id: None,
            quantity_before: before,
            quantity_moved: (after - before).abs(),
            quantity_after: after,
            processed_by: user.user_id,
            notes: payload.notes,
        },
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        spare_part_id = %updated.id,
        before,
        after,
        "stock adjusted"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "adjust_stock",
        "spare_parts",
        updated.id,
        json!({ "before": before, "after": after, "movement_id": movement.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock adjusted",
        updated.into(),
        Some(Meta::empty()),
    ))
}

/// Active parts at or below their minimum level, most depleted first.
pub async fn low_stock_alerts(state: &AppState) -> AppResult<ApiResponse<LowStockAlertList>> {
    let items: Vec<LowStockAlert> = SpareParts::find()
        .filter(low_stock_condition())
        .order_by(
            Expr::col(SparePartCol::StockQuantity).sub(Expr::col(SparePartCol::MinStockLevel)),
            Order::Asc,
        )
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|part| LowStockAlert {
            current_stock: part.stock_quantity,
            min_level: part.min_stock_level,
            spare_part: part.into(),
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Ok",
        LowStockAlertList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn list_movements(
    state: &AppState,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<StockMovementList>> {
    let (page, limit, offset) = pagination.normalize();

    SpareParts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Spare part"))?;

    let finder = StockMovements::find()
        .filter(MovementCol::SparePartId.eq(id))
        .order_by_desc(MovementCol::MovementDate);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockMovement::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        StockMovementList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn part_prices_must_fit_a_money_column() {
        assert!(validate_prices(Some(dec!(150000)), Some(dec!(999999999999.99))).is_ok());
        assert!(validate_prices(None, None).is_ok());
        assert!(matches!(
            validate_prices(Some(dec!(-5)), None),
            Err(AppError::InvalidArgument(_))
        ));
        let err = validate_prices(None, Some(dec!(1000000000000))).unwrap_err();
        assert!(err.to_string().contains("selling_price"));
    }
}
