//! Repository trait definitions
//!
//! This module defines the core traits that repositories implement, providing
//! a consistent interface for data access operations.

use async_trait::async_trait;

use super::channel::ChannelCreateRequest;
use crate::errors::RepositoryResult;
use crate::models::Channel;

/// Core repository trait: lookup, creation and removal by ID
///
/// # Type Parameters
///
/// * `T` - The entity type (e.g., Channel, Playlist)
/// * `ID` - The identifier type (usually Uuid)
///
/// # Examples
///
/// ```rust,ignore
/// use m3u_importer::repositories::Repository;
/// use uuid::Uuid;
///
/// async fn example<R: Repository<Playlist, Uuid>>(repo: R, id: Uuid) -> RepositoryResult<()> {
///     if repo.exists(id).await? {
///         repo.delete(id).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait Repository<T, ID: Send + 'static>: Send + Sync {
    /// Request type for creating new entities
    type CreateRequest: Send;

    /// Find an entity by its ID
    ///
    /// # Returns
    ///
    /// * `Ok(Some(T))` - Entity found
    /// * `Ok(None)` - Entity not found
    /// * `Err(RepositoryError)` - Database or other error
    async fn find_by_id(&self, id: ID) -> RepositoryResult<Option<T>>;

    /// Create a new entity
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - Created entity with generated ID and timestamps
    /// * `Err(RepositoryError)` - Validation, constraint, or database error
    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<T>;

    /// Delete an entity by ID
    async fn delete(&self, id: ID) -> RepositoryResult<()>;

    /// Check if an entity exists by ID
    async fn exists(&self, id: ID) -> RepositoryResult<bool> {
        match self.find_by_id(id).await? {
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}

/// The slice of channel storage the importer needs.
///
/// Kept narrow so alternative stores (and test doubles) only implement what
/// an import actually touches.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Look up a channel by its stream URL, the store's uniqueness key
    async fn find_by_stream_url(&self, stream_url: &str) -> RepositoryResult<Option<Channel>>;

    /// Highest `sort_order` currently stored, 0 when empty
    async fn max_sort_order(&self) -> RepositoryResult<i64>;

    /// Insert a new channel
    async fn insert_channel(&self, request: ChannelCreateRequest) -> RepositoryResult<Channel>;
}
