#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{MatchEntity, UserEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the document store holding matches and users.
///
/// `replace_match` is a compare-and-swap: the write only lands when the
/// stored document still carries `expected_version`, and the persisted
/// document ends up with `expected_version + 1`. Any other stored version
/// yields [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict).
pub trait RosterStore: Send + Sync {
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    fn insert_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn replace_match(
        &self,
        entity: MatchEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
