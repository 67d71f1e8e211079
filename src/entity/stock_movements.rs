use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{MovementType, ReferenceType};

/// Append-only: rows are inserted alongside the stock change they describe and never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub spare_part_id: Uuid,
    pub movement_type: MovementType,
    pub reference_type: ReferenceType,
    pub reference_id: Option<Uuid>,
    pub quantity_before: i32,
    pub quantity_moved: i32,
    pub quantity_after: i32,
    pub movement_date: DateTimeWithTimeZone,
    pub processed_by: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spare_parts::Entity",
        from = "Column::SparePartId",
        to = "super::spare_parts::Column::Id"
    )]
    SpareParts,
}

impl Related<super::spare_parts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpareParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
