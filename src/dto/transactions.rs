use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{CustomerType, FuelType, PaymentMethod, Transmission},
    models::{PurchaseTransaction, SalesTransaction},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseTransactionRequest {
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_price: Decimal,
    pub tax_rate: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSalesTransactionRequest {
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_price: Decimal,
    pub tax_rate: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseTransactionList {
    pub items: Vec<PurchaseTransaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesTransactionList {
    pub items: Vec<SalesTransaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceCustomer {
    pub id: Uuid,
    pub customer_code: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceVehicle {
    pub id: Uuid,
    pub vehicle_code: String,
    pub chassis_number: String,
    pub license_plate: Option<String>,
    pub brand: String,
    pub model: String,
    pub variant: Option<String>,
    pub year: i32,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceCashier {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceDetails {
    pub invoice_number: String,
    pub transaction_date: DateTime<Utc>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseInvoice {
    pub transaction: PurchaseTransaction,
    pub customer: Option<InvoiceCustomer>,
    pub vehicle: Option<InvoiceVehicle>,
    pub cashier: Option<InvoiceCashier>,
    pub invoice_details: InvoiceDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesInvoice {
    pub transaction: SalesTransaction,
    pub customer: Option<InvoiceCustomer>,
    pub vehicle: Option<InvoiceVehicle>,
    pub cashier: Option<InvoiceCashier>,
    pub invoice_details: InvoiceDetails,
}
