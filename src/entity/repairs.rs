use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::RepairStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repairs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub repair_number: String,
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_cost: Decimal,
    pub status: RepairStatus,
    pub mechanic_id: Option<Uuid>,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub work_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id"
    )]
    Vehicles,
    #[sea_orm(has_many = "super::repair_parts::Entity")]
    RepairParts,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::repair_parts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RepairParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
