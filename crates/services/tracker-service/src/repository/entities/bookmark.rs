//! Bookmark database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Bookmark;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookmarks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Bookmark {
    fn from(model: Model) -> Self {
        Bookmark {
            id: model.id,
            title: model.title,
            url: model.url,
            created_at: model.created_at,
            modified_at: model.modified_at,
        }
    }
}
