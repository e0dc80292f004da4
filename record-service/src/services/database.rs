use crate::models::Record;
use crate::services::RecordRepository;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub fn records(&self) -> Collection<Record> {
        self.db.collection(&self.collection)
    }
}

fn object_id(inserted: &Bson) -> Result<ObjectId, AppError> {
    inserted.as_object_id().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "MongoDB returned a non-ObjectId identifier: {}",
            inserted
        ))
    })
}

#[async_trait]
impl RecordRepository for MongoDb {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        let cursor = self.records().find(doc! {}, None).await?;
        let records: Vec<Record> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Record>, AppError> {
        Ok(self.records().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert(&self, record: Record) -> Result<ObjectId, AppError> {
        let result = self.records().insert_one(&record, None).await.map_err(|e| {
            tracing::error!("Failed to insert record: {}", e);
            AppError::from(e)
        })?;
        object_id(&result.inserted_id)
    }

    async fn insert_many(&self, records: Vec<Record>) -> Result<Vec<ObjectId>, AppError> {
        let count = records.len();
        let result = self
            .records()
            .insert_many(records, None)
            .await
            .map_err(|e| {
                tracing::error!(count, "Failed to bulk insert records: {}", e);
                AppError::from(e)
            })?;

        // inserted_ids is keyed by input position
        (0..count)
            .map(|index| {
                result
                    .inserted_ids
                    .get(&index)
                    .ok_or_else(|| {
                        AppError::InternalError(anyhow::anyhow!(
                            "MongoDB did not report an id for record {}",
                            index
                        ))
                    })
                    .and_then(object_id)
            })
            .collect()
    }

    async fn replace(&self, id: ObjectId, record: &Record) -> Result<bool, AppError> {
        let replacement = Record {
            id: Some(id),
            ..record.clone()
        };
        let result = self
            .records()
            .replace_one(doc! { "_id": id }, &replacement, None)
            .await
            .map_err(|e| {
                tracing::error!(record_id = %id, "Failed to update record: {}", e);
                AppError::from(e)
            })?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self
            .records()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(record_id = %id, "Failed to delete record: {}", e);
                AppError::from(e)
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB connection");
        self.client.clone().shutdown().await;
    }
}
