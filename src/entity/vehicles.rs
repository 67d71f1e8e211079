use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{FuelType, Transmission, VehicleStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub vehicle_code: String,
    #[sea_orm(unique)]
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
    pub purchased_at: Option<DateTimeWithTimeZone>,
    pub sold_at: Option<DateTimeWithTimeZone>,
    pub purchase_notes: Option<String>,
    pub condition_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle_images::Entity")]
    VehicleImages,
    #[sea_orm(has_many = "super::repairs::Entity")]
    Repairs,
}

impl Related<super::vehicle_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleImages.def()
    }
}

impl Related<super::repairs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repairs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
