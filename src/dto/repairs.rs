use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::RepairStatus,
    models::{Repair, RepairPart, StockMovement},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRepairRequest {
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub labor_cost: Option<Decimal>,
    pub mechanic_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateRepairRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub labor_cost: Option<Decimal>,
    pub status: Option<RepairStatus>,
    pub mechanic_id: Option<Uuid>,
    pub work_notes: Option<String>,
}

impl UpdateRepairRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.labor_cost.is_none()
            && self.status.is_none()
            && self.mechanic_id.is_none()
            && self.work_notes.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddRepairPartRequest {
    pub spare_part_id: Uuid,
    pub quantity_used: i32,
    pub notes: Option<String>,
}

/// A part line joined with the catalogue name and code of the part used.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepairPartDetail {
    #[serde(flatten)]
    pub part: RepairPart,
    pub part_name: String,
    pub part_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RepairWithParts {
    pub repair: Repair,
    pub parts: Vec<RepairPartDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddRepairPartResponse {
    pub repair_part: RepairPart,
    pub repair: Repair,
    pub stock_movement: StockMovement,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RepairList {
    pub items: Vec<Repair>,
}
