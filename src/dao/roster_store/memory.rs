//! Process-local store used when no database is configured and in tests.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{BoxFuture, ready};
use uuid::Uuid;

use crate::dao::{
    models::{MatchEntity, UserEntity},
    roster_store::RosterStore,
    storage::{StorageError, StorageResult},
};

#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    matches: Arc<DashMap<Uuid, MatchEntity>>,
    users: Arc<DashMap<String, UserEntity>>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn replace(&self, mut entity: MatchEntity, expected_version: u64) -> StorageResult<()> {
        match self.matches.entry(entity.id) {
            Entry::Occupied(mut slot) if slot.get().version == expected_version => {
                entity.version = expected_version + 1;
                slot.insert(entity);
                Ok(())
            }
            // A deleted match is reported as a conflict so callers re-read and see it gone.
            _ => Err(StorageError::conflict(entity.id, expected_version)),
        }
    }
}

impl RosterStore for MemoryRosterStore {
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let found = self.matches.get(&id).map(|entry| entry.value().clone());
        Box::pin(ready(Ok(found)))
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let mut matches: Vec<MatchEntity> = self
            .matches
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|entity| entity.created_at);
        Box::pin(ready(Ok(matches)))
    }

    fn insert_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.matches.insert(entity.id, entity);
        Box::pin(ready(Ok(())))
    }

    fn replace_match(
        &self,
        entity: MatchEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(self.replace(entity, expected_version)))
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.matches.remove(&id).is_some();
        Box::pin(ready(Ok(removed)))
    }

    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let found = self.users.get(&id).map(|entry| entry.value().clone());
        Box::pin(ready(Ok(found)))
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let mut users: Vec<UserEntity> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Box::pin(ready(Ok(users)))
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.users.insert(user.id.clone(), user);
        Box::pin(ready(Ok(())))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(Ok(())))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn user(id: &str) -> UserEntity {
        UserEntity {
            id: id.into(),
            name: id.to_uppercase(),
            avatar: format!("https://example.test/{id}.png"),
            email: None,
            phone: None,
            dob: None,
        }
    }

    fn sample_match() -> MatchEntity {
        let now = SystemTime::now();
        MatchEntity {
            id: Uuid::new_v4(),
            date: "2026-10-20".into(),
            time: "19:30".into(),
            court: "Court 1".into(),
            address: None,
            starts_at: now,
            players: vec![user("u1")],
            waiting_list: Vec::new(),
            created_by: user("u1"),
            teams: None,
            score: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn replace_bumps_version_when_expected_matches() {
        let store = MemoryRosterStore::new();
        let entity = sample_match();
        store.insert_match(entity.clone()).await.unwrap();

        let mut updated = entity.clone();
        updated.players.push(user("u2"));
        store.replace_match(updated, 0).await.unwrap();

        let stored = store.find_match(entity.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.players.len(), 2);
    }

    #[tokio::test]
    async fn replace_with_stale_version_conflicts() {
        let store = MemoryRosterStore::new();
        let entity = sample_match();
        store.insert_match(entity.clone()).await.unwrap();
        store.replace_match(entity.clone(), 0).await.unwrap();

        let err = store.replace_match(entity.clone(), 0).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { expected: 0, .. }));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_match_was_removed() {
        let store = MemoryRosterStore::new();
        let entity = sample_match();
        store.insert_match(entity.clone()).await.unwrap();

        assert!(store.delete_match(entity.id).await.unwrap());
        assert!(!store.delete_match(entity.id).await.unwrap());
        assert!(store.replace_match(entity, 0).await.is_err());
    }
}
