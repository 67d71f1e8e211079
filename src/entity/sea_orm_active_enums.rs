use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "cashier")]
    Cashier,
    #[sea_orm(string_value = "mechanic")]
    Mechanic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::Mechanic => "mechanic",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    #[sea_orm(string_value = "individual")]
    Individual,
    #[sea_orm(string_value = "corporate")]
    Corporate,
}

impl CustomerType {
    pub fn code_prefix(&self) -> &'static str {
        match self {
            CustomerType::Individual => "IND",
            CustomerType::Corporate => "COR",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "purchased")]
    Purchased,
    #[sea_orm(string_value = "in_repair")]
    InRepair,
    #[sea_orm(string_value = "ready_to_sell")]
    ReadyToSell,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "sold")]
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Purchased => "purchased",
            VehicleStatus::InRepair => "in_repair",
            VehicleStatus::ReadyToSell => "ready_to_sell",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Sold => "sold",
        }
    }

    /// Manual lifecycle moves. `Sold` is only reached through a sales transaction.
    pub fn can_transition_to(&self, next: VehicleStatus) -> bool {
        use VehicleStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Purchased, InRepair)
                | (Purchased, ReadyToSell)
                | (InRepair, ReadyToSell)
                | (ReadyToSell, InRepair)
                | (ReadyToSell, Reserved)
                | (Reserved, ReadyToSell)
        )
    }

    pub fn accepts_repairs(&self) -> bool {
        matches!(
            self,
            VehicleStatus::Purchased | VehicleStatus::InRepair | VehicleStatus::ReadyToSell
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    #[sea_orm(string_value = "gasoline")]
    Gasoline,
    #[sea_orm(string_value = "diesel")]
    Diesel,
    #[sea_orm(string_value = "electric")]
    Electric,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "automatic")]
    Automatic,
    #[sea_orm(string_value = "cvt")]
    Cvt,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    #[sea_orm(string_value = "front")]
    Front,
    #[sea_orm(string_value = "back")]
    Back,
    #[sea_orm(string_value = "left")]
    Left,
    #[sea_orm(string_value = "right")]
    Right,
    #[sea_orm(string_value = "interior")]
    Interior,
    #[sea_orm(string_value = "engine")]
    Engine,
    #[sea_orm(string_value = "dashboard")]
    Dashboard,
    #[sea_orm(string_value = "damage")]
    Damage,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl RepairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStatus::Pending => "pending",
            RepairStatus::InProgress => "in_progress",
            RepairStatus::Completed => "completed",
            RepairStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: RepairStatus) -> bool {
        use RepairStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    pub fn accepts_parts(&self) -> bool {
        matches!(self, RepairStatus::Pending | RepairStatus::InProgress)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[sea_orm(string_value = "in")]
    In,
    #[sea_orm(string_value = "out")]
    Out,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl MovementType {
    /// Direction of a manual stock correction from `before` to `after`.
    pub fn for_change(before: i32, after: i32) -> Self {
        match after.cmp(&before) {
            std::cmp::Ordering::Greater => MovementType::In,
            std::cmp::Ordering::Less => MovementType::Out,
            std::cmp::Ordering::Equal => MovementType::Adjustment,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    #[sea_orm(string_value = "repair")]
    Repair,
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}
