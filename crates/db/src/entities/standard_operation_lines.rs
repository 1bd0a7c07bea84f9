//! `SeaORM` Entity for standard_operation_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "standard_operation_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub operation_id: Uuid,
    pub line_no: i32,
    pub account_id: Uuid,
    pub analytical_account_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub debit_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub credit_percent: Decimal,
    pub is_variable: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::standard_operations::Entity",
        from = "Column::OperationId",
        to = "super::standard_operations::Column::Id",
        on_delete = "Cascade"
    )]
    StandardOperations,
}

impl Related<super::standard_operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StandardOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
