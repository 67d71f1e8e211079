use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::sea_orm_active_enums::CustomerType, models::Customer};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<CustomerType>,
    pub is_active: Option<bool>,
}

impl UpdateCustomerRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.id_card_number.is_none()
            && self.customer_type.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}
