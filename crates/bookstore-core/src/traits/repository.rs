//! Generic repository trait for record persistence.

use async_trait::async_trait;

use crate::result::AppResult;

/// Generic persistence trait.
///
/// This trait is defined with generic type parameters so that each
/// entity can have a strongly typed repository. Backend-specific query
/// methods are defined on the concrete repository structs.
#[async_trait]
pub trait Repository<Entity, Id>: Send + Sync + std::fmt::Debug + 'static
where
    Entity: Send + Sync + 'static,
    Id: Send + Sync + 'static,
{
    /// Find an entity by its primary key.
    async fn find_by_id(&self, id: &Id) -> AppResult<Option<Entity>>;

    /// Insert a new entity and return the stored version.
    async fn create(&self, entity: &Entity) -> AppResult<Entity>;

    /// Persist every mutable field of an existing entity and return the
    /// stored version. Fails with `NotFound` if the entity does not exist.
    async fn update(&self, entity: &Entity) -> AppResult<Entity>;
}
