use crate::models::Record;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Storage for records. Handlers only see this trait; the concrete client is
/// chosen once at startup.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// All records in natural storage order.
    async fn list(&self) -> Result<Vec<Record>, AppError>;

    async fn get(&self, id: ObjectId) -> Result<Option<Record>, AppError>;

    /// Stores `record` and returns the identifier the backend assigned.
    async fn insert(&self, record: Record) -> Result<ObjectId, AppError>;

    /// Stores all records, returning their identifiers in input order.
    async fn insert_many(&self, records: Vec<Record>) -> Result<Vec<ObjectId>, AppError>;

    /// Overwrites the record stored under `id`. Returns `false` if none matched.
    async fn replace(&self, id: ObjectId, record: &Record) -> Result<bool, AppError>;

    /// Returns `false` if nothing was stored under `id`.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    /// Releases backend resources. Called once after the server stops.
    async fn shutdown(&self) {}
}

/// Process-local repository used by tests and for running without MongoDB.
pub struct InMemoryRecordRepository {
    records: Mutex<Vec<Record>>,
    unavailable: AtomicBool,
}

impl Default for InMemoryRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Record>>, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::BackendUnavailable(anyhow::anyhow!(
                "in-memory store marked unavailable"
            )));
        }
        self.records
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("record store lock poisoned")))
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Record>, AppError> {
        Ok(self.lock()?.iter().find(|r| r.id == Some(id)).cloned())
    }

    async fn insert(&self, mut record: Record) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        record.id = Some(id);
        self.lock()?.push(record);
        Ok(id)
    }

    async fn insert_many(&self, records: Vec<Record>) -> Result<Vec<ObjectId>, AppError> {
        let mut store = self.lock()?;
        let ids = records
            .into_iter()
            .map(|mut record| {
                let id = ObjectId::new();
                record.id = Some(id);
                store.push(record);
                id
            })
            .collect();
        Ok(ids)
    }

    async fn replace(&self, id: ObjectId, record: &Record) -> Result<bool, AppError> {
        let mut store = self.lock()?;
        match store.iter_mut().find(|r| r.id == Some(id)) {
            Some(existing) => {
                *existing = Record {
                    id: Some(id),
                    ..record.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut store = self.lock()?;
        let before = store.len();
        store.retain(|r| r.id != Some(id));
        Ok(store.len() != before)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::RecordPayload;

    fn record(name: &str) -> Record {
        Record::new(RecordPayload {
            name: name.into(),
            location: "Bandung".into(),
            location_type: "city".into(),
        })
    }

    #[tokio::test]
    async fn insert_many_preserves_order() {
        let repo = InMemoryRecordRepository::new();
        let ids = repo
            .insert_many(vec![record("a"), record("b"), record("c")])
            .await
            .unwrap();

        let listed = repo.list().await.unwrap();
        let listed_ids: Vec<_> = listed.iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, listed_ids);
        assert_eq!(listed[1].name, "b");
    }

    #[tokio::test]
    async fn delete_reports_missing_records() {
        let repo = InMemoryRecordRepository::new();
        let id = repo.insert(record("a")).await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let repo = InMemoryRecordRepository::new();
        repo.set_unavailable(true);

        let err = repo.list().await.unwrap_err();
        assert!(matches!(err, AppError::BackendUnavailable(_)));
        assert!(repo.health_check().await.is_err());
    }
}
