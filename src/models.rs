use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    customers, purchase_transactions, repair_parts, repairs, sales_transactions,
    sea_orm_active_enums::{
        CustomerType, FuelType, ImageType, MovementType, PaymentMethod, ReferenceType,
        RepairStatus, Role, TransactionStatus, Transmission, VehicleStatus,
    },
    spare_parts, stock_movements, users, vehicle_images, vehicles,
};

/// Account as exposed over the API; the password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            phone: model.phone,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub customer_code: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub created_by: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<customers::Model> for Customer {
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
            created_by: model.created_by,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Vehicle {
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
    pub purchase_price: Option<Decimal>,
    pub total_repair_cost: Decimal,
    pub suggested_selling_price: Option<Decimal>,
    pub approved_selling_price: Option<Decimal>,
    pub final_selling_price: Option<Decimal>,
    pub status: VehicleStatus,
    pub purchased_from_customer_id: Option<Uuid>,
    pub sold_to_customer_id: Option<Uuid>,
    pub purchased_by_cashier: Option<Uuid>,
    pub sold_by_cashier: Option<Uuid>,
    pub price_approved_by_admin: Option<Uuid>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub sold_at: Option<DateTime<Utc>>,
    pub purchase_notes: Option<String>,
    pub condition_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<vehicles::Model> for Vehicle {
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
            purchase_price: model.purchase_price,
            total_repair_cost: model.total_repair_cost,
            suggested_selling_price: model.suggested_selling_price,
            approved_selling_price: model.approved_selling_price,
            final_selling_price: model.final_selling_price,
            status: model.status,
            purchased_from_customer_id: model.purchased_from_customer_id,
            sold_to_customer_id: model.sold_to_customer_id,
            purchased_by_cashier: model.purchased_by_cashier,
            sold_by_cashier: model.sold_by_cashier,
            price_approved_by_admin: model.price_approved_by_admin,
            purchased_at: model.purchased_at.map(|dt| dt.with_timezone(&Utc)),
            sold_at: model.sold_at.map(|dt| dt.with_timezone(&Utc)),
            purchase_notes: model.purchase_notes,
            condition_notes: model.condition_notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleImage {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub image_path: String,
    pub image_type: ImageType,
    pub description: Option<String>,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<Uuid>,
}

impl From<vehicle_images::Model> for VehicleImage {
    fn from(model: vehicle_images::Model) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            image_path: model.image_path,
            image_type: model.image_type,
            description: model.description,
            is_primary: model.is_primary,
            uploaded_at: model.uploaded_at.with_timezone(&Utc),
            uploaded_by: model.uploaded_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Repair {
    pub id: Uuid,
    pub repair_number: String,
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_cost: Decimal,
    pub status: RepairStatus,
    pub mechanic_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub work_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<repairs::Model> for Repair {
    fn from(model: repairs::Model) -> Self {
        Self {
            id: model.id,
            repair_number: model.repair_number,
            vehicle_id: model.vehicle_id,
            title: model.title,
            description: model.description,
            labor_cost: model.labor_cost,
            total_parts_cost: model.total_parts_cost,
            total_cost: model.total_cost,
            status: model.status,
            mechanic_id: model.mechanic_id,
            started_at: model.started_at.map(|dt| dt.with_timezone(&Utc)),
            completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
            work_notes: model.work_notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepairPart {
    pub id: Uuid,
    pub repair_id: Uuid,
    pub spare_part_id: Uuid,
    pub quantity_used: i32,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub used_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<repair_parts::Model> for RepairPart {
    fn from(model: repair_parts::Model) -> Self {
        Self {
            id: model.id,
            repair_id: model.repair_id,
            spare_part_id: model.spare_part_id,
            quantity_used: model.quantity_used,
            unit_cost: model.unit_cost,
            total_cost: model.total_cost,
            used_at: model.used_at.with_timezone(&Utc),
            notes: model.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SparePart {
    pub id: Uuid,
    pub part_code: String,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub stock_quantity: i32,
    pub min_stock_level: i32,
    pub unit_measure: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<spare_parts::Model> for SparePart {
    fn from(model: spare_parts::Model) -> Self {
        Self {
            id: model.id,
            part_code: model.part_code,
            name: model.name,
            description: model.description,
            brand: model.brand,
            cost_price: model.cost_price,
            selling_price: model.selling_price,
            stock_quantity: model.stock_quantity,
            min_stock_level: model.min_stock_level,
            unit_measure: model.unit_measure,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockMovement {
    pub id: Uuid,
    pub spare_part_id: Uuid,
    pub movement_type: MovementType,
    pub reference_type: ReferenceType,
    pub reference_id: Option<Uuid>,
    pub quantity_before: i32,
    pub quantity_moved: i32,
    pub quantity_after: i32,
    pub movement_date: DateTime<Utc>,
    pub processed_by: Option<Uuid>,
    pub notes: Option<String>,
}

impl From<stock_movements::Model> for StockMovement {
    fn from(model: stock_movements::Model) -> Self {
        Self {
            id: model.id,
            spare_part_id: model.spare_part_id,
            movement_type: model.movement_type,
            reference_type: model.reference_type,
            reference_id: model.reference_id,
            quantity_before: model.quantity_before,
            quantity_moved: model.quantity_moved,
            quantity_after: model.quantity_after,
            movement_date: model.movement_date.with_timezone(&Utc),
            processed_by: model.processed_by,
            notes: model.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseTransaction {
    pub id: Uuid,
    pub transaction_number: String,
    pub invoice_number: String,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_price: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub cashier_id: Uuid,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<purchase_transactions::Model> for PurchaseTransaction {
    fn from(model: purchase_transactions::Model) -> Self {
        Self {
            id: model.id,
            transaction_number: model.transaction_number,
            invoice_number: model.invoice_number,
            vehicle_id: model.vehicle_id,
            customer_id: model.customer_id,
            vehicle_price: model.vehicle_price,
            tax_amount: model.tax_amount,
            total_amount: model.total_amount,
            payment_method: model.payment_method,
            payment_reference: model.payment_reference,
            transaction_date: model.transaction_date.with_timezone(&Utc),
            cashier_id: model.cashier_id,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesTransaction {
    pub id: Uuid,
    pub transaction_number: String,
    pub invoice_number: String,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_price: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub cashier_id: Uuid,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<sales_transactions::Model> for SalesTransaction {
    fn from(model: sales_transactions::Model) -> Self {
        Self {
            id: model.id,
            transaction_number: model.transaction_number,
            invoice_number: model.invoice_number,
            vehicle_id: model.vehicle_id,
            customer_id: model.customer_id,
            vehicle_price: model.vehicle_price,
            tax_amount: model.tax_amount,
            discount_amount: model.discount_amount,
            total_amount: model.total_amount,
            payment_method: model.payment_method,
            payment_reference: model.payment_reference,
            transaction_date: model.transaction_date.with_timezone(&Utc),
            cashier_id: model.cashier_id,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
