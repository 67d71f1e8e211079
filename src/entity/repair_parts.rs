use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repair_parts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub repair_id: Uuid,
    pub spare_part_id: Uuid,
    pub quantity_used: i32,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub used_at: DateTimeWithTimeZone,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repairs::Entity",
        from = "Column::RepairId",
        to = "super::repairs::Column::Id"
    )]
    Repairs,
    #[sea_orm(
        belongs_to = "super::spare_parts::Entity",
        from = "Column::SparePartId",
        to = "super::spare_parts::Column::Id"
    )]
    SpareParts,
}

impl Related<super::repairs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repairs.def()
    }
}

impl Related<super::spare_parts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpareParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
