//! Generic CRUD service shared by the lookup entities, receivers and details

use std::sync::Arc;
use tracing::info;

use super::ServiceError;
use crate::models::Resource;
use crate::repositories::Store;

/// Five-operation service over a [`Store`], labelled for messages
pub struct CrudService<R: Resource> {
    store: Arc<dyn Store<R>>,
    label: &'static str,
}

impl<R: Resource> Clone for CrudService<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            label: self.label,
        }
    }
}

impl<R: Resource> CrudService<R> {
    pub fn new(store: Arc<dyn Store<R>>, label: &'static str) -> Self {
        Self { store, label }
    }

    /// Entity name used in messages, e.g. "payment method"
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// All rows; empty when the table is empty
    pub async fn get_all(&self) -> Result<Vec<R>, ServiceError> {
        self.store
            .find_all()
            .await
            .map_err(|e| ServiceError::storage(format!("failed to get {}", self.label), e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<R, ServiceError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::storage(format!("failed to get {}", self.label), e))?
            .ok_or(ServiceError::NotFound {
                entity: self.label,
                id,
            })
    }

    pub async fn create(&self, request: R::Create) -> Result<i64, ServiceError> {
        let id = self
            .store
            .insert(&request)
            .await
            .map_err(|e| ServiceError::storage(format!("failed to save {}", self.label), e))?;

        info!("Created {} {}", self.label, id);
        Ok(id)
    }

    /// Load, merge and store; fails with `NotFound` for unknown ids
    pub async fn update(&self, id: i64, update: R::Update) -> Result<i64, ServiceError> {
        let mut record = self.get_by_id(id).await?;
        record.apply(update);
        self.save(&record).await?;

        info!("Updated {} {}", self.label, id);
        Ok(record.id())
    }

    /// Store an already merged row
    pub async fn save(&self, record: &R) -> Result<(), ServiceError> {
        self.store
            .save(record)
            .await
            .map_err(|e| ServiceError::storage(format!("failed to save {}", self.label), e))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get_by_id(id).await?;
        self.store
            .delete(id)
            .await
            .map_err(|e| ServiceError::storage(format!("failed to delete {}", self.label), e))?;

        info!("Deleted {} {}", self.label, id);
        Ok(())
    }
}
