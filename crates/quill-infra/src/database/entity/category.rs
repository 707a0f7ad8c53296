//! Category entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::error::RepoError;

use super::{from_count, to_count};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: Option<String>,
    pub post_count: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for quill_core::domain::Category {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            post_count: to_count(model.post_count),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<quill_core::domain::Category> for ActiveModel {
    fn from(category: quill_core::domain::Category) -> Self {
        Self {
            id: Set(category.id),
            name: Set(category.name),
            slug: Set(category.slug),
            description: Set(category.description),
            post_count: Set(from_count(category.post_count)),
            created_at: Set(category.created_at.into()),
            updated_at: Set(category.updated_at.into()),
        }
    }
}

/// Only the editable columns; `post_count` stays `NotSet`.
pub(crate) fn details_update(category: &quill_core::domain::Category) -> ActiveModel {
    ActiveModel {
        id: Set(category.id),
        name: Set(category.name.clone()),
        slug: Set(category.slug.clone()),
        description: Set(category.description.clone()),
        updated_at: Set(category.updated_at.into()),
        ..Default::default()
    }
}
