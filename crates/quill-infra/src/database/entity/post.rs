//! Post entity for SeaORM.
//!
//! Tags and comments are embedded documents stored as JSONB arrays.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::error::RepoError;

use super::{decode_json, from_count, to_count};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub view_count: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for quill_core::domain::Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            title: model.title,
            content: model.content,
            excerpt: model.excerpt,
            tags: decode_json(model.tags, "posts.tags")?,
            category_id: model.category_id,
            author_id: model.author_id,
            view_count: to_count(model.view_count),
            comments: decode_json(model.comments, "posts.comments")?,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            tags: Set(serde_json::json!(post.tags)),
            category_id: Set(post.category_id),
            author_id: Set(post.author_id),
            view_count: Set(from_count(post.view_count)),
            comments: Set(serde_json::json!(post.comments)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}

/// Only the editable columns; comments and the view count stay `NotSet`.
pub(crate) fn content_update(post: &quill_core::domain::Post) -> ActiveModel {
    ActiveModel {
        id: Set(post.id),
        title: Set(post.title.clone()),
        content: Set(post.content.clone()),
        excerpt: Set(post.excerpt.clone()),
        tags: Set(serde_json::json!(post.tags)),
        category_id: Set(post.category_id),
        updated_at: Set(post.updated_at.into()),
        ..Default::default()
    }
}
