//! Bug database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Bug;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bugs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reproduction: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub expected_result: Option<String>,
    pub start_date: Option<Date>,
    /// Set while the bug is closed
    pub end_date: Option<Date>,
    pub type_id: i32,
    pub priority_id: i32,
    pub status_id: i32,
    pub project_id: i32,
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Bug {
    fn from(model: Model) -> Self {
        Bug {
            id: model.id,
            name: model.name,
            description: model.description,
            reproduction: model.reproduction,
            expected_result: model.expected_result,
            start_date: model.start_date,
            end_date: model.end_date,
            type_id: model.type_id,
            priority_id: model.priority_id,
            status_id: model.status_id,
            project_id: model.project_id,
            owner_id: model.owner_id,
        }
    }
}
