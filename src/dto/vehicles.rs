use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{FuelType, ImageType, Transmission, VehicleStatus},
    models::{Vehicle, VehicleImage},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVehicleRequest {
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
    pub purchased_from_customer_id: Option<Uuid>,
    pub purchase_notes: Option<String>,
    pub condition_notes: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateVehicleRequest {
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub status: Option<VehicleStatus>,
    pub suggested_selling_price: Option<Decimal>,
    pub approved_selling_price: Option<Decimal>,
    pub final_selling_price: Option<Decimal>,
    pub condition_notes: Option<String>,
}

impl UpdateVehicleRequest {
    /// Names of the fields present in the payload, in declaration order.
    pub fn provided_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut mark = |present: bool, name: &'static str| {
            if present {
                fields.push(name);
            }
        };
        mark(self.license_plate.is_some(), "license_plate");
        mark(self.brand.is_some(), "brand");
        mark(self.model.is_some(), "model");
        mark(self.variant.is_some(), "variant");
        mark(self.year.is_some(), "year");
        mark(self.color.is_some(), "color");
        mark(self.mileage.is_some(), "mileage");
        mark(self.fuel_type.is_some(), "fuel_type");
        mark(self.transmission.is_some(), "transmission");
        mark(self.status.is_some(), "status");
        mark(
            self.suggested_selling_price.is_some(),
            "suggested_selling_price",
        );
        mark(self.approved_selling_price.is_some(), "approved_selling_price");
        mark(self.final_selling_price.is_some(), "final_selling_price");
        mark(self.condition_notes.is_some(), "condition_notes");
        fields
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadImageRequest {
    pub image_type: ImageType,
    pub description: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleWithImages {
    pub vehicle: Vehicle,
    pub images: Vec<VehicleImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleList {
    pub items: Vec<Vehicle>,
}
