//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostRepository, UserRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, convert_all, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

/// Escape LIKE wildcards so the value is matched literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn like_pattern(query: &str) -> String {
    format!("%{}%", escape_like(query))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.trim().to_lowercase();
        tracing::debug!(user_email = %mask_email(&email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(query_error)?;

        convert_all(result)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        convert_all(result)
    }

    async fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(
                Condition::any()
                    .add(Expr::col(category::Column::Name).ilike(escape_like(name)))
                    .add(category::Column::Slug.eq(slug)),
            )
            .one(&self.db)
            .await
            .map_err(query_error)?;

        result.map(Category::try_from).transpose()
    }

    async fn update_details(&self, category: &Category) -> Result<Category, RepoError> {
        let model = category::details_update(category)
            .update(&self.db)
            .await
            .map_err(write_error)?;

        model.try_into()
    }

    async fn increment_post_count(&self, id: Uuid) -> Result<(), RepoError> {
        let result = CategoryEntity::update_many()
            .col_expr(
                category::Column::PostCount,
                Expr::col(category::Column::PostCount).add(1),
            )
            .filter(category::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn decrement_post_count(&self, id: Uuid) -> Result<bool, RepoError> {
        // Single conditional statement: rows at zero are left untouched.
        let result = CategoryEntity::update_many()
            .col_expr(
                category::Column::PostCount,
                Expr::col(category::Column::PostCount).sub(1),
            )
            .filter(category::Column::Id.eq(id))
            .filter(category::Column::PostCount.gt(0))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected > 0 {
            return Ok(true);
        }

        let exists = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .is_some();

        if exists {
            Ok(false)
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        convert_all(result)
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let pattern = like_pattern(query);

        let result = PostEntity::find()
            .filter(
                Condition::any()
                    .add(Expr::col(post::Column::Title).ilike(pattern.as_str()))
                    .add(Expr::col(post::Column::Content).ilike(pattern.as_str()))
                    .add(Expr::cust_with_values(
                        "EXISTS (SELECT 1 FROM jsonb_array_elements_text(tags) AS tag WHERE tag ILIKE $1)",
                        [pattern.clone()],
                    )),
            )
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        convert_all(result)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn update_content(&self, post: &Post) -> Result<Post, RepoError> {
        let model = post::content_update(post)
            .update(&self.db)
            .await
            .map_err(write_error)?;

        model.try_into()
    }

    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<(), RepoError> {
        let appended = serde_json::json!([comment]);

        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Comments,
                Expr::col(post::Column::Comments).concatenate(Expr::val(appended)),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn increment_view_count(&self, post_id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
