mod common;

use dealership_api::{
    dto::{
        transactions::{CreatePurchaseTransactionRequest, CreateSalesTransactionRequest},
        vehicles::{CreateVehicleRequest, UpdateVehicleRequest},
    },
    entity::sea_orm_active_enums::{PaymentMethod, Role, VehicleStatus},
    error::AppError,
    routes::params::{
        DailyReportQuery, ProfitabilitySortBy, SortOrder, TransactionListQuery,
        VehicleProfitabilityQuery,
    },
    services::{report_service, transaction_service, vehicle_service},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn sale_request(vehicle_id: Uuid, customer_id: Uuid) -> CreateSalesTransactionRequest {
    CreateSalesTransactionRequest {
        vehicle_id,
        customer_id,
        vehicle_price: dec!(150000000),
        tax_rate: None,
        discount_amount: Some(dec!(5000000)),
        payment_method: PaymentMethod::Transfer,
        payment_reference: Some("TRF-0001".into()),
        notes: None,
    }
}

// Buy a vehicle, get its price approved, sell it and see it in the profitability report.
#[tokio::test]
async fn purchase_approve_and_sell_vehicle() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, Role::Admin, "admin123").await?;
    let cashier = common::create_user(&state, Role::Cashier, "cashier123").await?;
    let mechanic = common::create_user(&state, Role::Mechanic, "mech123").await?;
    let seller = common::create_customer(&state, &cashier).await?;
    let buyer = common::create_customer(&state, &cashier).await?;

    let vehicle = vehicle_service::create_vehicle(
        &state,
        &cashier,
        CreateVehicleRequest {
            chassis_number: common::unique("JHM").to_uppercase(),
            license_plate: Some("B 1234 XYZ".into()),
            brand: "Honda".into(),
            model: "Jazz".into(),
            variant: None,
            year: 2018,
            color: None,
            mileage: None,
            fuel_type: None,
            transmission: None,
            purchase_price: None,
            purchased_from_customer_id: None,
            purchase_notes: None,
            condition_notes: None,
        },
    )
    .await?
    .data
    .expect("vehicle");

    let purchase_request = || CreatePurchaseTransactionRequest {
        vehicle_id: vehicle.id,
        customer_id: seller,
        vehicle_price: dec!(100000000),
        tax_rate: None,
        payment_method: PaymentMethod::Cash,
        payment_reference: None,
        notes: None,
    };

    let denied =
        transaction_service::create_purchase(&state, &mechanic, purchase_request()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let purchase = transaction_service::create_purchase(&state, &cashier, purchase_request())
        .await?
        .data
        .expect("purchase");
    assert!(purchase.transaction_number.starts_with("PUR-"));
    assert_eq!(purchase.invoice_number, format!("INV-{}", purchase.transaction_number));
    assert_eq!(purchase.tax_amount, dec!(10000000));
    assert_eq!(purchase.total_amount, dec!(110000000));

    let again = transaction_service::create_purchase(&state, &cashier, purchase_request()).await;
    assert!(matches!(again, Err(AppError::FailedPrecondition(_))));

    match transaction_service::create_sale(&state, &cashier, sale_request(vehicle.id, buyer)).await {
        Err(AppError::FailedPrecondition(msg)) => assert_eq!(msg, "Vehicle is not ready for sale"),
        other => panic!("expected not ready for sale, got {other:?}"),
    }

    vehicle_service::update_vehicle(
        &state,
        &admin,
        vehicle.id,
        UpdateVehicleRequest {
            status: Some(VehicleStatus::ReadyToSell),
            ..Default::default()
        },
    )
    .await?;

    match transaction_service::create_sale(&state, &cashier, sale_request(vehicle.id, buyer)).await {
        Err(AppError::FailedPrecondition(msg)) => assert_eq!(msg, "Vehicle price not approved yet"),
        other => panic!("expected unapproved price, got {other:?}"),
    }

    let cashier_approval = vehicle_service::update_vehicle(
        &state,
        &cashier,
        vehicle.id,
        UpdateVehicleRequest {
            approved_selling_price: Some(dec!(150000000)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(cashier_approval, Err(AppError::Forbidden(_))));

    let approved = vehicle_service::update_vehicle(
        &state,
        &admin,
        vehicle.id,
        UpdateVehicleRequest {
            approved_selling_price: Some(dec!(150000000)),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("approved vehicle");
    assert_eq!(approved.price_approved_by_admin, Some(admin.user_id));

    let sale = transaction_service::create_sale(&state, &cashier, sale_request(vehicle.id, buyer))
        .await?
        .data
        .expect("sale");
    assert_eq!(sale.discount_amount, dec!(5000000));
    assert_eq!(sale.tax_amount, dec!(14500000));
    assert_eq!(sale.total_amount, dec!(159500000));

    let sold = vehicle_service::get_vehicle(&state, vehicle.id)
        .await?
        .data
        .expect("sold vehicle")
        .vehicle;
    assert_eq!(sold.status, VehicleStatus::Sold);
    assert_eq!(sold.final_selling_price, Some(dec!(150000000)));
    assert_eq!(sold.sold_to_customer_id, Some(buyer));
    assert_eq!(sold.purchase_price, Some(dec!(100000000)));

    let resold =
        transaction_service::create_sale(&state, &cashier, sale_request(vehicle.id, buyer)).await;
    assert!(matches!(resold, Err(AppError::FailedPrecondition(_))));

    let invoice = transaction_service::sales_invoice(&state, &cashier, sale.id)
        .await?
        .data
        .expect("invoice");
    assert_eq!(invoice.invoice_details.invoice_number, sale.invoice_number);
    assert_eq!(invoice.invoice_details.subtotal, dec!(150000000));
    assert_eq!(invoice.customer.map(|c| c.id), Some(buyer));
    assert_eq!(invoice.cashier.map(|c| c.id), Some(cashier.user_id));

    let purchases = transaction_service::list_purchases(
        &state,
        &cashier,
        TransactionListQuery {
            customer_id: Some(seller),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("purchases");
    assert_eq!(purchases.items.len(), 1);
    assert_eq!(purchases.items[0].id, purchase.id);

    let report = report_service::vehicle_profitability(
        &state,
        &admin,
        VehicleProfitabilityQuery {
            sort_by: Some(ProfitabilitySortBy::SoldAt),
            order: Some(SortOrder::Desc),
            limit: Some(100),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("profitability");
    let row = report
        .items
        .iter()
        .find(|r| r.id == vehicle.id)
        .expect("sold vehicle in report");
    assert_eq!(row.total_cost, dec!(100000000));
    assert_eq!(row.profit, dec!(50000000));
    assert_eq!(row.profit_margin_percentage, dec!(50));

    let cashier_report = report_service::vehicle_profitability(
        &state,
        &cashier,
        VehicleProfitabilityQuery::default(),
    )
    .await;
    assert!(matches!(cashier_report, Err(AppError::Forbidden(_))));

    let mechanic_daily =
        report_service::daily_report(&state, &mechanic, DailyReportQuery::default()).await;
    assert!(matches!(mechanic_daily, Err(AppError::Forbidden(_))));

    Ok(())
}
