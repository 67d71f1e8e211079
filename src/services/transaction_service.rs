use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::transactions::{
        CreatePurchaseTransactionRequest, CreateSalesTransactionRequest, InvoiceCashier,
        InvoiceCustomer, InvoiceDetails, InvoiceVehicle, PurchaseInvoice,
        PurchaseTransactionList, SalesInvoice, SalesTransactionList,
    },
    entity::{
        Customers, PurchaseTransactions, SalesTransactions, Users, Vehicles, customers,
        purchase_transactions::{ActiveModel as PurchaseActive, Column as PurchaseCol},
        sales_transactions::{ActiveModel as SalesActive, Column as SalesCol},
        sea_orm_active_enums::{PaymentMethod, Role, TransactionStatus, VehicleStatus},
        users, vehicles,
        vehicles::ActiveModel as VehicleActive,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{PurchaseTransaction, SalesTransaction},
    numbering,
    response::{ApiResponse, Meta},
    routes::params::TransactionListQuery,
    services::ensure_amount,
    state::AppState,
};

const TRANSACTION_ROLES: &[Role] = &[Role::Admin, Role::Cashier];

/// 10%, applied when a request carries no tax rate.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Money breakdown of a purchase or sale, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amounts {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

fn validate_price_and_rate(price: Decimal, tax_rate: Option<Decimal>) -> AppResult<Decimal> {
    if price <= Decimal::ZERO {
        return Err(AppError::InvalidArgument(
            "Vehicle price must be greater than zero".into(),
        ));
    }
    ensure_amount(price, "Vehicle price")?;
    let rate = tax_rate.unwrap_or(DEFAULT_TAX_RATE);
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(AppError::InvalidArgument(
            "Tax rate must be between 0 and 1".into(),
        ));
    }
    Ok(rate)
}

/// `base + base × rate`, rejected when it no longer fits a money column.
fn apply_tax(base: Decimal, rate: Decimal) -> AppResult<(Decimal, Decimal)> {
    let overflow = || AppError::InvalidArgument("Transaction total is too large".into());
    let tax = base.checked_mul(rate).ok_or_else(overflow)?.round_dp(2);
    let total = base.checked_add(tax).ok_or_else(overflow)?;
    ensure_amount(total, "Transaction total")?;
    Ok((tax, total))
}

/// `tax = price × rate`, `total = price + tax`.
pub fn compute_purchase_amounts(price: Decimal, tax_rate: Option<Decimal>) -> AppResult<Amounts> {
    let rate = validate_price_and_rate(price, tax_rate)?;
    let subtotal = price.round_dp(2);
    let (tax, total) = apply_tax(subtotal, rate)?;
    Ok(Amounts {
        subtotal,
        discount: Decimal::ZERO,
        tax,
        total,
    })
}

/// `tax = (price − discount) × rate`, `total = price − discount + tax`.
pub fn compute_sales_amounts(
    price: Decimal,
    discount: Option<Decimal>,
    tax_rate: Option<Decimal>,
) -> AppResult<Amounts> {
    let rate = validate_price_and_rate(price, tax_rate)?;
    let subtotal = price.round_dp(2);
    let discount = discount.unwrap_or(Decimal::ZERO).round_dp(2);
    if discount < Decimal::ZERO || discount > subtotal {
        return Err(AppError::InvalidArgument(
            "Discount must be between 0 and the vehicle price".into(),
        ));
    }
    let (tax, total) = apply_tax(subtotal - discount, rate)?;
    Ok(Amounts {
        subtotal,
        discount,
        tax,
        total,
    })
}

async fn find_active_customer<C>(conn: &C, id: Uuid) -> AppResult<customers::Model>
where
    C: ConnectionTrait,
{
    Customers::find_by_id(id)
        .filter(customers::Column::IsActive.eq(true))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Customer"))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub async fn create_purchase(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePurchaseTransactionRequest,
) -> AppResult<ApiResponse<PurchaseTransaction>> {
    ensure_role(user, TRANSACTION_ROLES)?;
    let amounts = compute_purchase_amounts(payload.vehicle_price, payload.tax_rate)?;

    let txn = state.orm.begin().await?;

    let vehicle = Vehicles::find_by_id(payload.vehicle_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;
    if vehicle.status != VehicleStatus::Purchased {
        return Err(AppError::FailedPrecondition(
            "Vehicle is not in purchased status".into(),
        ));
    }
    let already_bought = PurchaseTransactions::find()
        .filter(PurchaseCol::VehicleId.eq(vehicle.id))
        .count(&txn)
        .await?;
    if already_bought > 0 {
        return Err(AppError::FailedPrecondition(
            "Vehicle already has a purchase transaction".into(),
        ));
    }
    let customer = find_active_customer(&txn, payload.customer_id).await?;

    let now = Utc::now();
    let (transaction_number, invoice_number) = numbering::transaction_numbers("PUR", now);
    let created = PurchaseActive {
        id: Set(Uuid::new_v4()),
        transaction_number: Set(transaction_number),
        invoice_number: Set(invoice_number),
        vehicle_id: Set(vehicle.id),
        customer_id: Set(customer.id),
        vehicle_price: Set(amounts.subtotal),
        tax_amount: Set(amounts.tax),
        total_amount: Set(amounts.total),
        payment_method: Set(payload.payment_method),
        payment_reference: Set(payload.payment_reference),
        transaction_date: Set(now.fixed_offset()),
        cashier_id: Set(user.user_id),
        status: Set(TransactionStatus::Completed),
        notes: Set(payload.notes),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_conflict(e, "Transaction number already exists"))?;

    let mut active: VehicleActive = vehicle.into();
    active.purchase_price = Set(Some(amounts.subtotal));
    active.purchased_from_customer_id = Set(Some(customer.id));
    active.purchased_by_cashier = Set(Some(user.user_id));
    active.purchased_at = Set(Some(now.fixed_offset()));
    active.updated_at = Set(now.fixed_offset());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        transaction_id = %created.id,
        vehicle_id = %created.vehicle_id,
        total = %created.total_amount,
        "purchase recorded"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "create",
        "purchase_transaction",
        created.id,
        json!({
            "transaction_number": created.transaction_number,
            "vehicle_id": created.vehicle_id,
            "customer_id": created.customer_id,
            "amount": created.total_amount,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Purchase transaction created",
        created.into(),
        Some(Meta::empty()),
    ))
}

pub async fn create_sale(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSalesTransactionRequest,
) -> AppResult<ApiResponse<SalesTransaction>> {
    ensure_role(user, TRANSACTION_ROLES)?;
    let amounts = compute_sales_amounts(
        payload.vehicle_price,
        payload.discount_amount,
        payload.tax_rate,
    )?;

    let txn = state.orm.begin().await?;

    let vehicle = Vehicles::find_by_id(payload.vehicle_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle"))?;
    if vehicle.status != VehicleStatus::ReadyToSell {
        return Err(AppError::FailedPrecondition(
            "Vehicle is not ready for sale".into(),
        ));
    }
    if vehicle.approved_selling_price.is_none() {
        return Err(AppError::FailedPrecondition(
            "Vehicle price not approved yet".into(),
        ));
    }
    let customer = find_active_customer(&txn, payload.customer_id).await?;

    let now = Utc::now();
    let (transaction_number, invoice_number) = numbering::transaction_numbers("SAL", now);
    let created = SalesActive {
        id: Set(Uuid::new_v4()),
        transaction_number: Set(transaction_number),
        invoice_number: Set(invoice_number),
        vehicle_id: Set(vehicle.id),
        customer_id: Set(customer.id),
        vehicle_price: Set(amounts.subtotal),
        tax_amount: Set(amounts.tax),
        discount_amount: Set(amounts.discount),
        total_amount: Set(amounts.total),
        payment_method: Set(payload.payment_method),
        payment_reference: Set(payload.payment_reference),
        transaction_date: Set(now.fixed_offset()),
        cashier_id: Set(user.user_id),
        status: Set(TransactionStatus::Completed),
        notes: Set(payload.notes),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_conflict(e, "Transaction number already exists"))?;

    let mut active: VehicleActive = vehicle.into();
    active.final_selling_price = Set(Some(amounts.subtotal));
    active.sold_to_customer_id = Set(Some(customer.id));
    active.sold_by_cashier = Set(Some(user.user_id));
    active.sold_at = Set(Some(now.fixed_offset()));
    active.status = Set(VehicleStatus::Sold);
    active.updated_at = Set(now.fixed_offset());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        transaction_id = %created.id,
        vehicle_id = %created.vehicle_id,
        total = %created.total_amount,
        "sale recorded"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "create",
        "sales_transaction",
        created.id,
        json!({
            "transaction_number": created.transaction_number,
            "vehicle_id": created.vehicle_id,
            "customer_id": created.customer_id,
            "amount": created.total_amount,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Sales transaction created",
        created.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_purchases(
    state: &AppState,
    user: &AuthUser,
    query: TransactionListQuery,
) -> AppResult<ApiResponse<PurchaseTransactionList>> {
    ensure_role(user, TRANSACTION_ROLES)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(start) = query.start_date {
        condition = condition.add(PurchaseCol::TransactionDate.gte(day_start(start)));
    }
    if let Some(end) = query.end_date.and_then(|d| d.succ_opt()) {
        condition = condition.add(PurchaseCol::TransactionDate.lt(day_start(end)));
    }
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(PurchaseCol::CustomerId.eq(customer_id));
    }
    if let Some(cashier_id) = query.cashier_id {
        condition = condition.add(PurchaseCol::CashierId.eq(cashier_id));
    }

    let finder = PurchaseTransactions::find()
        .filter(condition)
        .order_by_desc(PurchaseCol::TransactionDate);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PurchaseTransaction::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        PurchaseTransactionList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_sales(
    state: &AppState,
    user: &AuthUser,
    query: TransactionListQuery,
) -> AppResult<ApiResponse<SalesTransactionList>> {
    ensure_role(user, TRANSACTION_ROLES)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(start) = query.start_date {
        condition = condition.add(SalesCol::TransactionDate.gte(day_start(start)));
    }
    if let Some(end) = query.end_date.and_then(|d| d.succ_opt()) {
        condition = condition.add(SalesCol::TransactionDate.lt(day_start(end)));
    }
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(SalesCol::CustomerId.eq(customer_id));
    }
    if let Some(cashier_id) = query.cashier_id {
        condition = condition.add(SalesCol::CashierId.eq(cashier_id));
    }

    let finder = SalesTransactions::find()
        .filter(condition)
        .order_by_desc(SalesCol::TransactionDate);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SalesTransaction::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        SalesTransactionList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

impl From<customers::Model> for InvoiceCustomer {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            customer_code: model.customer_code,
            name: model.name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            id_card_number: model.id_card_number,
            customer_type: model.customer_type,
        }
    }
}

impl From<vehicles::Model> for InvoiceVehicle {
    fn from(model: vehicles::Model) -> Self {
        Self {
            id: model.id,
            vehicle_code: model.vehicle_code,
            chassis_number: model.chassis_number,
            license_plate: model.license_plate,
            brand: model.brand,
            model: model.model,
            variant: model.variant,
            year: model.year,
            color: model.color,
            mileage: model.mileage,
            fuel_type: model.fuel_type,
            transmission: model.transmission,
        }
    }
}

impl From<users::Model> for InvoiceCashier {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            username: model.username,
        }
    }
}

struct InvoiceParties {
    customer: Option<InvoiceCustomer>,
    vehicle: Option<InvoiceVehicle>,
    cashier: Option<InvoiceCashier>,
}

async fn load_parties(
    state: &AppState,
    customer_id: Uuid,
    vehicle_id: Uuid,
    cashier_id: Uuid,
) -> AppResult<InvoiceParties> {
    let customer = Customers::find_by_id(customer_id).one(&state.orm).await?;
    let vehicle = Vehicles::find_by_id(vehicle_id).one(&state.orm).await?;
    let cashier = Users::find_by_id(cashier_id).one(&state.orm).await?;
    Ok(InvoiceParties {
        customer: customer.map(Into::into),
        vehicle: vehicle.map(Into::into),
        cashier: cashier.map(Into::into),
    })
}

#[allow(clippy::too_many_arguments)]
fn invoice_details(
    invoice_number: &str,
    transaction_date: DateTime<Utc>,
    subtotal: Decimal,
    discount_amount: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    payment_method: PaymentMethod,
    payment_reference: Option<String>,
) -> InvoiceDetails {
    InvoiceDetails {
        invoice_number: invoice_number.to_string(),
        transaction_date,
        subtotal,
        discount_amount,
        tax_amount,
        total_amount,
        payment_method,
        payment_reference,
    }
}

pub async fn purchase_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PurchaseInvoice>> {
    ensure_role(user, TRANSACTION_ROLES)?;
    let transaction: PurchaseTransaction = PurchaseTransactions::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase invoice"))?
        .into();

    let parties = load_parties(
        state,
        transaction.customer_id,
        transaction.vehicle_id,
        transaction.cashier_id,
    )
    .await?;
    let details = invoice_details(
        &transaction.invoice_number,
        transaction.transaction_date,
        transaction.vehicle_price,
        Decimal::ZERO,
        transaction.tax_amount,
        transaction.total_amount,
        transaction.payment_method,
        transaction.payment_reference.clone(),
    );

    Ok(ApiResponse::success(
        "Ok",
        PurchaseInvoice {
            transaction,
            customer: parties.customer,
            vehicle: parties.vehicle,
            cashier: parties.cashier,
            invoice_details: details,
        },
        Some(Meta::empty()),
    ))
}

pub async fn sales_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SalesInvoice>> {
    ensure_role(user, TRANSACTION_ROLES)?;
    let transaction: SalesTransaction = SalesTransactions::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Sales invoice"))?
        .into();

    let parties = load_parties(
        state,
        transaction.customer_id,
        transaction.vehicle_id,
        transaction.cashier_id,
    )
    .await?;
    let details = invoice_details(
        &transaction.invoice_number,
        transaction.transaction_date,
        transaction.vehicle_price,
        transaction.discount_amount,
        transaction.tax_amount,
        transaction.total_amount,
        transaction.payment_method,
        transaction.payment_reference.clone(),
    );

    Ok(ApiResponse::success(
        "Ok",
        SalesInvoice {
            transaction,
            customer: parties.customer,
            vehicle: parties.vehicle,
            cashier: parties.cashier,
            invoice_details: details,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn purchase_adds_default_tax() {
        let amounts = compute_purchase_amounts(dec!(100000000), None).expect("valid");
        assert_eq!(amounts.tax, dec!(10000000.00));
        assert_eq!(amounts.total, dec!(110000000.00));
        assert_eq!(amounts.discount, Decimal::ZERO);
    }

    #[test]
    fn sales_tax_is_charged_after_discount() {
        let amounts =
            compute_sales_amounts(dec!(150000000), Some(dec!(5000000)), Some(dec!(0.11)))
                .expect("valid");
        assert_eq!(amounts.subtotal, dec!(150000000));
        assert_eq!(amounts.tax, dec!(15950000.00));
        assert_eq!(amounts.total, dec!(160950000.00));
    }

    #[test]
    fn amounts_round_to_cents() {
        let amounts = compute_purchase_amounts(dec!(33.33), Some(dec!(0.125))).expect("valid");
        assert_eq!(amounts.tax, dec!(4.17));
        assert_eq!(amounts.total, dec!(37.50));
    }

    #[test]
    fn invalid_discount_and_rate_are_rejected() {
        assert!(matches!(
            compute_sales_amounts(dec!(100), Some(dec!(101)), None),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_sales_amounts(dec!(100), Some(dec!(-1)), None),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_purchase_amounts(dec!(100), Some(dec!(1.5))),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_purchase_amounts(Decimal::ZERO, None),
            Err(AppError::InvalidArgument(_))
        ));
        let full_discount =
            compute_sales_amounts(dec!(100), Some(dec!(100)), None).expect("valid");
        assert_eq!(full_discount.total, Decimal::ZERO);
    }

    #[test]
    fn prices_beyond_the_money_column_are_rejected() {
        let huge: Decimal =
            serde_json::from_str("\"75000000000000000000000000000\"").expect("parses");
        assert!(matches!(
            compute_sales_amounts(huge, None, None),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_purchase_amounts(huge, Some(Decimal::ONE)),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_purchase_amounts(dec!(1000000000000), None),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn totals_that_overflow_the_money_column_are_rejected() {
        // price fits, price plus tax does not
        assert!(matches!(
            compute_purchase_amounts(dec!(999999999999.99), None),
            Err(AppError::InvalidArgument(_))
        ));
        let untaxed =
            compute_sales_amounts(dec!(999999999999.99), None, Some(Decimal::ZERO)).expect("valid");
        assert_eq!(untaxed.total, dec!(999999999999.99));
    }
}
