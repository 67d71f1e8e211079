mod common;

use dealership_api::{
    dto::{
        repairs::{AddRepairPartRequest, CreateRepairRequest, UpdateRepairRequest},
        spare_parts::{CreateSparePartRequest, StockAdjustmentRequest},
        vehicles::CreateVehicleRequest,
    },
    entity::sea_orm_active_enums::{MovementType, ReferenceType, RepairStatus, Role, VehicleStatus},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::{repair_service, spare_part_service, vehicle_service},
    state::AppState,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn create_vehicle(state: &AppState, cashier: &AuthUser) -> anyhow::Result<Uuid> {
    let vehicle = vehicle_service::create_vehicle(
        state,
        cashier,
        CreateVehicleRequest {
            chassis_number: common::unique("MHF").to_uppercase(),
            license_plate: None,
            brand: "Toyota".into(),
            model: "Avanza".into(),
            variant: Some("1.3 G".into()),
            year: 2019,
            color: Some("Silver".into()),
            mileage: Some(64_000),
            fuel_type: None,
            transmission: None,
            purchase_price: Some(dec!(120000000)),
            purchased_from_customer_id: None,
            purchase_notes: None,
            condition_notes: None,
        },
    )
    .await?
    .data
    .expect("vehicle");
    assert_eq!(vehicle.status, VehicleStatus::Purchased);
    Ok(vehicle.id)
}

async fn create_part(state: &AppState, admin: &AuthUser, stock: i32) -> anyhow::Result<Uuid> {
    let part = spare_part_service::create_spare_part(
        state,
        admin,
        CreateSparePartRequest {
            name: common::unique("Brake Pad"),
            description: None,
            brand: Some("Brembo".into()),
            cost_price: dec!(350000),
            selling_price: dec!(450000),
            stock_quantity: Some(stock),
            min_stock_level: Some(2),
            unit_measure: Some("set".into()),
        },
    )
    .await?
    .data
    .expect("spare part");
    assert!(part.part_code.starts_with("SP"));
    Ok(part.id)
}

// Consuming parts decrements stock, writes the ledger and rolls costs up to the vehicle.
#[tokio::test]
async fn repair_consumes_parts_and_rolls_up_costs() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, Role::Admin, "admin123").await?;
    let cashier = common::create_user(&state, Role::Cashier, "cashier123").await?;
    let mechanic = common::create_user(&state, Role::Mechanic, "mech123").await?;
    let other_mechanic = common::create_user(&state, Role::Mechanic, "mech456").await?;

    let vehicle_id = create_vehicle(&state, &cashier).await?;
    let part_id = create_part(&state, &admin, 5).await?;

    let denied = repair_service::create_repair(
        &state,
        &cashier,
        CreateRepairRequest {
            vehicle_id,
            title: "Brake service".into(),
            description: None,
            labor_cost: None,
            mechanic_id: None,
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let repair = repair_service::create_repair(
        &state,
        &mechanic,
        CreateRepairRequest {
            vehicle_id,
            title: "Brake service".into(),
            description: Some("Front pads worn".into()),
            labor_cost: Some(dec!(200000)),
            mechanic_id: None,
        },
    )
    .await?
    .data
    .expect("repair");
    assert_eq!(repair.status, RepairStatus::Pending);
    assert_eq!(repair.mechanic_id, Some(mechanic.user_id));
    assert!(repair.repair_number.starts_with("REP-"));

    let vehicle = vehicle_service::get_vehicle(&state, vehicle_id)
        .await?
        .data
        .expect("vehicle");
    assert_eq!(vehicle.vehicle.status, VehicleStatus::InRepair);
    assert_eq!(vehicle.vehicle.total_repair_cost, dec!(200000));

    let too_many = repair_service::add_repair_part(
        &state,
        &mechanic,
        repair.id,
        AddRepairPartRequest {
            spare_part_id: part_id,
            quantity_used: 6,
            notes: None,
        },
    )
    .await;
    match too_many {
        Err(AppError::FailedPrecondition(msg)) => assert_eq!(msg, "Insufficient stock quantity"),
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    let untouched = spare_part_service::get_spare_part(&state, part_id)
        .await?
        .data
        .expect("spare part");
    assert_eq!(untouched.stock_quantity, 5);

    let foreign = repair_service::add_repair_part(
        &state,
        &other_mechanic,
        repair.id,
        AddRepairPartRequest {
            spare_part_id: part_id,
            quantity_used: 1,
            notes: None,
        },
    )
    .await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let added = repair_service::add_repair_part(
        &state,
        &mechanic,
        repair.id,
        AddRepairPartRequest {
            spare_part_id: part_id,
            quantity_used: 2,
            notes: None,
        },
    )
    .await?
    .data
    .expect("added part");
    assert_eq!(added.repair_part.unit_cost, dec!(450000));
    assert_eq!(added.repair_part.total_cost, dec!(900000));
    assert_eq!(added.repair.total_parts_cost, dec!(900000));
    assert_eq!(added.repair.total_cost, dec!(1100000));
    assert_eq!(added.stock_movement.movement_type, MovementType::Out);
    assert_eq!(added.stock_movement.reference_type, ReferenceType::Repair);
    assert_eq!(added.stock_movement.reference_id, Some(repair.id));
    assert_eq!(added.stock_movement.quantity_before, 5);
    assert_eq!(added.stock_movement.quantity_moved, 2);
    assert_eq!(added.stock_movement.quantity_after, 3);

    let part = spare_part_service::get_spare_part(&state, part_id)
        .await?
        .data
        .expect("spare part");
    assert_eq!(part.stock_quantity, 3);

    let vehicle = vehicle_service::get_vehicle(&state, vehicle_id)
        .await?
        .data
        .expect("vehicle");
    assert_eq!(vehicle.vehicle.total_repair_cost, dec!(1100000));

    let detail = repair_service::get_repair(&state, &mechanic, repair.id)
        .await?
        .data
        .expect("repair detail");
    assert_eq!(detail.parts.len(), 1);
    assert_eq!(detail.parts[0].part.quantity_used, 2);

    let started = repair_service::update_repair(
        &state,
        &mechanic,
        repair.id,
        UpdateRepairRequest {
            status: Some(RepairStatus::InProgress),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("started repair");
    assert!(started.started_at.is_some());

    let completed = repair_service::update_repair(
        &state,
        &mechanic,
        repair.id,
        UpdateRepairRequest {
            status: Some(RepairStatus::Completed),
            work_notes: Some("Pads replaced".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("completed repair");
    assert!(completed.completed_at.is_some());

    let late_part = repair_service::add_repair_part(
        &state,
        &mechanic,
        repair.id,
        AddRepairPartRequest {
            spare_part_id: part_id,
            quantity_used: 1,
            notes: None,
        },
    )
    .await;
    assert!(matches!(late_part, Err(AppError::FailedPrecondition(_))));

    Ok(())
}

#[tokio::test]
async fn stock_adjustments_are_recorded_in_the_ledger() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, Role::Admin, "admin123").await?;
    let mechanic = common::create_user(&state, Role::Mechanic, "mech123").await?;
    let part_id = create_part(&state, &admin, 10).await?;

    let denied = spare_part_service::adjust_stock(
        &state,
        &mechanic,
        part_id,
        StockAdjustmentRequest {
            new_quantity: 20,
            notes: None,
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let negative = spare_part_service::adjust_stock(
        &state,
        &admin,
        part_id,
        StockAdjustmentRequest {
            new_quantity: -1,
            notes: None,
        },
    )
    .await;
    assert!(matches!(negative, Err(AppError::InvalidArgument(_))));

    let lowered = spare_part_service::adjust_stock(
        &state,
        &admin,
        part_id,
        StockAdjustmentRequest {
            new_quantity: 1,
            notes: Some("Stock opname".into()),
        },
    )
    .await?
    .data
    .expect("adjusted part");
    assert_eq!(lowered.stock_quantity, 1);

    let movements = spare_part_service::list_movements(&state, part_id, Pagination::default())
        .await?
        .data
        .expect("movements");
    assert_eq!(movements.items.len(), 2);
    let latest = &movements.items[0];
    assert_eq!(latest.movement_type, MovementType::Out);
    assert_eq!(latest.reference_type, ReferenceType::Adjustment);
    assert_eq!(latest.quantity_before, 10);
    assert_eq!(latest.quantity_moved, 9);
    assert_eq!(latest.quantity_after, 1);
    let initial = &movements.items[1];
    assert_eq!(initial.movement_type, MovementType::In);
    assert_eq!(initial.quantity_after, 10);

    let alerts = spare_part_service::low_stock_alerts(&state)
        .await?
        .data
        .expect("alerts");
    assert!(alerts.items.iter().any(|a| a.spare_part.id == part_id && a.current_stock == 1));

    Ok(())
}

// A failure late in the part transaction leaves stock, costs and the ledger as they were.
#[tokio::test]
async fn failed_part_consumption_rolls_back_every_write() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, Role::Admin, "admin123").await?;
    let cashier = common::create_user(&state, Role::Cashier, "cashier123").await?;
    let vehicle_id = create_vehicle(&state, &cashier).await?;
    let part_id = create_part(&state, &admin, 4).await?;

    let repair = repair_service::create_repair(
        &state,
        &admin,
        CreateRepairRequest {
            vehicle_id,
            title: "Clutch check".into(),
            description: None,
            labor_cost: Some(dec!(150000)),
            mechanic_id: None,
        },
    )
    .await?
    .data
    .expect("repair");

    // Session for a user row that no longer exists: the ledger insert hits the users FK.
    let stale_admin = AuthUser {
        user_id: Uuid::new_v4(),
        username: "removed-admin".into(),
        role: Role::Admin,
        session_id: Uuid::new_v4(),
    };
    let failed = repair_service::add_repair_part(
        &state,
        &stale_admin,
        repair.id,
        AddRepairPartRequest {
            spare_part_id: part_id,
            quantity_used: 2,
            notes: None,
        },
    )
    .await;
    assert!(matches!(failed, Err(AppError::OrmError(_))), "{failed:?}");

    let part = spare_part_service::get_spare_part(&state, part_id)
        .await?
        .data
        .expect("spare part");
    assert_eq!(part.stock_quantity, 4);

    let detail = repair_service::get_repair(&state, &admin, repair.id)
        .await?
        .data
        .expect("repair detail");
    assert!(detail.parts.is_empty());
    assert_eq!(detail.repair.total_parts_cost, dec!(0));
    assert_eq!(detail.repair.total_cost, dec!(150000));

    let vehicle = vehicle_service::get_vehicle(&state, vehicle_id)
        .await?
        .data
        .expect("vehicle");
    assert_eq!(vehicle.vehicle.total_repair_cost, dec!(150000));

    let movements = spare_part_service::list_movements(&state, part_id, Pagination::default())
        .await?
        .data
        .expect("movements");
    assert_eq!(movements.items.len(), 1);
    assert_eq!(movements.items[0].movement_type, MovementType::In);

    Ok(())
}
