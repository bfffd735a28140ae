use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoMatchDocument, MongoUserDocument, doc_id, versioned_doc_id},
};
use crate::dao::{
    models::{MatchEntity, UserEntity},
    roster_store::RosterStore,
    storage::{StorageError, StorageResult},
};

const MATCH_COLLECTION_NAME: &str = "matches";
const USER_COLLECTION_NAME: &str = "users";

#[derive(Clone)]
pub struct MongoRosterStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

/// Outcome of a versioned replace, kept apart from transport errors.
enum ReplaceOutcome {
    Applied,
    Stale,
}

impl MongoRosterStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.match_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"starts_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_starts_at_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "starts_at",
                source,
            })?;

        Ok(())
    }

    async fn match_collection(&self) -> Collection<MongoMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn user_collection(&self) -> Collection<MongoUserDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchEntity>> {
        let collection = self.match_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;

        document.map(into_entity).transpose()
    }

    async fn list_matches(&self) -> MongoResult<Vec<MatchEntity>> {
        let collection = self.match_collection().await;
        let documents: Vec<MongoMatchDocument> = collection
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        documents.into_iter().map(into_entity).collect()
    }

    async fn insert_match(&self, entity: MatchEntity) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoMatchDocument = entity.into();
        let collection = self.match_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn replace_match(
        &self,
        mut entity: MatchEntity,
        expected_version: u64,
    ) -> MongoResult<ReplaceOutcome> {
        let id = entity.id;
        entity.version = expected_version + 1;
        let document: MongoMatchDocument = entity.into();
        let collection = self.match_collection().await;
        let result = collection
            .replace_one(versioned_doc_id(id, expected_version), &document)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;

        if result.matched_count == 0 {
            Ok(ReplaceOutcome::Stale)
        } else {
            Ok(ReplaceOutcome::Applied)
        }
    }

    async fn delete_match(&self, id: Uuid) -> MongoResult<bool> {
        let collection = self.match_collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteMatch { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn find_user(&self, id: String) -> MongoResult<Option<UserEntity>> {
        let collection = self.user_collection().await;
        let document = collection
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadUser { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn list_users(&self) -> MongoResult<Vec<UserEntity>> {
        let collection = self.user_collection().await;
        let documents: Vec<MongoUserDocument> = collection
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn save_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id.clone();
        let document: MongoUserDocument = user.into();
        let collection = self.user_collection().await;
        collection
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveUser { id, source })?;
        Ok(())
    }
}

fn into_entity(document: MongoMatchDocument) -> MongoResult<MatchEntity> {
    let raw_id = document.raw_id().to_owned();
    MatchEntity::try_from(document)
        .map_err(|source| MongoDaoError::InvalidMatchId { id: raw_id, source })
}

impl RosterStore for MongoRosterStore {
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches().await.map_err(Into::into) })
    }

    fn insert_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_match(entity).await.map_err(Into::into) })
    }

    fn replace_match(
        &self,
        entity: MatchEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = entity.id;
            match store.replace_match(entity, expected_version).await? {
                ReplaceOutcome::Applied => Ok(()),
                ReplaceOutcome::Stale => Err(StorageError::conflict(id, expected_version)),
            }
        })
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_match(id).await.map_err(Into::into) })
    }

    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await.map_err(Into::into) })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users().await.map_err(Into::into) })
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_user(user).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
