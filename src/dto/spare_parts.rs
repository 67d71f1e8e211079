use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{SparePart, StockMovement};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSparePartRequest {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub stock_quantity: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub unit_measure: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateSparePartRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub min_stock_level: Option<i32>,
    pub unit_measure: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateSparePartRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.brand.is_none()
            && self.cost_price.is_none()
            && self.selling_price.is_none()
            && self.min_stock_level.is_none()
            && self.unit_measure.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockAdjustmentRequest {
    pub new_quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SparePartList {
    pub items: Vec<SparePart>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockAlert {
    pub spare_part: SparePart,
    pub current_stock: i32,
    pub min_level: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockAlertList {
    pub items: Vec<LowStockAlert>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockMovementList {
    pub items: Vec<StockMovement>,
}
