use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait,
};
use uuid::Uuid;

use quill_core::domain::Identifiable;
use quill_core::error::RepoError;
use quill_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

pub(crate) fn query_error(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(err) => RepoError::Connection(err.to_string()),
        DbErr::ConnectionAcquire(err) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

pub(crate) fn write_error(e: DbErr) -> RepoError {
    if matches!(e, DbErr::RecordNotUpdated) {
        return RepoError::NotFound;
    }

    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        query_error(e)
    }
}

/// Convert a batch of rows, failing on the first malformed one.
pub(crate) fn convert_all<M, T>(models: Vec<M>) -> Result<Vec<T>, RepoError>
where
    T: TryFrom<M, Error = RepoError>,
{
    models.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl<E, T> BaseRepository<T, Uuid> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    T: Identifiable
        + TryFrom<E::Model, Error = RepoError>
        + Into<E::ActiveModel>
        + Send
        + Sync
        + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(query_error)?;

        result.map(T::try_from).transpose()
    }

    /// Insert new entities, update existing ones.
    ///
    /// Domain entities carry their own ids, so the primary key is always set
    /// and `ActiveModel::save` would always issue an UPDATE.
    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let exists = E::find_by_id(entity.id())
            .one(&self.db)
            .await
            .map_err(query_error)?
            .is_some();

        let active_model: E::ActiveModel = entity.into();
        let model = if exists {
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(write_error)?;

        T::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
