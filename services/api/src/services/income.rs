//! Income service
//!
//! Reads resolve the seven relations of every income. Changing the invoice
//! number of an income moves the row and its details inside a single
//! transaction: insert under the new number, repoint details, delete the old
//! row. A failure at any step rolls everything back.

use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use crate::models::{
    CreateIncomeRequest, Income, IncomeRecord, Lookup, Receiver, Resource, UpdateIncomeRequest,
};
use crate::repositories::{IncomeStore, RekeyTransaction, Store};

const ENTITY: &str = "income";

/// Stores of everything an income points at
#[derive(Clone)]
pub struct Relations {
    pub platforms: Arc<dyn Store<Lookup>>,
    pub statuses: Arc<dyn Store<Lookup>>,
    pub payment_methods: Arc<dyn Store<Lookup>>,
    pub receivers: Arc<dyn Store<Receiver>>,
    pub sale_persons: Arc<dyn Store<Lookup>>,
    pub channels: Arc<dyn Store<Lookup>>,
    pub banks: Arc<dyn Store<Lookup>>,
}

impl Relations {
    /// Lookup relations of a record as (relation, store, id)
    fn lookups<'a>(
        &'a self,
        record: &IncomeRecord,
    ) -> [(&'static str, &'a dyn Store<Lookup>, i64); 6] {
        [
            ("platform", self.platforms.as_ref(), record.platform_id),
            ("status", self.statuses.as_ref(), record.status_id),
            (
                "payment method",
                self.payment_methods.as_ref(),
                record.payment_method_id,
            ),
            ("sale person", self.sale_persons.as_ref(), record.sale_person_id),
            ("channel", self.channels.as_ref(), record.channel_id),
            ("bank", self.banks.as_ref(), record.bank_id),
        ]
    }
}

#[derive(Clone)]
pub struct IncomeService {
    incomes: Arc<dyn IncomeStore>,
    relations: Relations,
}

impl IncomeService {
    pub fn new(incomes: Arc<dyn IncomeStore>, relations: Relations) -> Self {
        Self { incomes, relations }
    }

    /// All incomes with their relations resolved
    pub async fn get_all(&self) -> Result<Vec<Income>, ServiceError> {
        let records = self
            .incomes
            .find_all()
            .await
            .map_err(|e| ServiceError::storage("failed to get income", e))?;

        let mut incomes = Vec::with_capacity(records.len());
        for record in records {
            incomes.push(self.resolve(record).await?);
        }
        Ok(incomes)
    }

    pub async fn get_by_invoice_id(&self, invoice_id_number: i64) -> Result<Income, ServiceError> {
        let record = self.require(invoice_id_number).await?;
        self.resolve(record).await
    }

    /// Whether an income with this invoice number exists
    pub async fn contains(&self, invoice_id_number: i64) -> Result<bool, ServiceError> {
        Ok(self.find_record(invoice_id_number).await?.is_some())
    }

    /// Create an income under the requested invoice number
    ///
    /// Fails with `Duplicate` without inserting when the number is taken.
    pub async fn create(&self, request: CreateIncomeRequest) -> Result<i64, ServiceError> {
        let invoice_id_number = request.invoice_id_number;
        if self.find_record(invoice_id_number).await?.is_some() {
            warn!("Income {} already exists", invoice_id_number);
            return Err(ServiceError::Duplicate {
                entity: ENTITY,
                id: invoice_id_number,
            });
        }

        let record = IncomeRecord::from_create(request);
        self.check_relations(&record).await?;

        self.incomes
            .insert(&record)
            .await
            .map_err(|e| ServiceError::storage("failed to save income", e))?;

        info!("Created income {}", invoice_id_number);
        Ok(invoice_id_number)
    }

    /// Apply a partial update, moving the income when its invoice number changes
    pub async fn update(
        &self,
        current: i64,
        update: UpdateIncomeRequest,
    ) -> Result<i64, ServiceError> {
        let stored = self.require(current).await?;
        let record = stored.merged(update);
        self.check_relations(&record).await?;

        let target = record.invoice_id_number;
        if target == current {
            self.incomes
                .save(&record)
                .await
                .map_err(|e| ServiceError::storage("failed to save income", e))?;

            info!("Updated income {}", current);
            return Ok(current);
        }

        if self.find_record(target).await?.is_some() {
            warn!("Cannot move income {} to taken number {}", current, target);
            return Err(ServiceError::Duplicate {
                entity: ENTITY,
                id: target,
            });
        }

        let moved = self.rekey(current, &record).await.map_err(|e| {
            ServiceError::storage(
                format!("failed to change invoice id number {} to {}", current, target),
                e,
            )
        })?;

        info!(
            "Moved income {} to {} with {} details",
            current, target, moved
        );
        Ok(target)
    }

    /// Delete an income together with its details
    pub async fn delete(&self, invoice_id_number: i64) -> Result<(), ServiceError> {
        self.require(invoice_id_number).await?;

        let removed = self
            .incomes
            .delete_with_details(invoice_id_number)
            .await
            .map_err(|e| ServiceError::storage("failed to delete income", e))?;

        info!(
            "Deleted income {} and {} details",
            invoice_id_number, removed
        );
        Ok(())
    }

    async fn find_record(
        &self,
        invoice_id_number: i64,
    ) -> Result<Option<IncomeRecord>, ServiceError> {
        self.incomes
            .find_by_invoice_id(invoice_id_number)
            .await
            .map_err(|e| ServiceError::storage("failed to get income", e))
    }

    async fn require(&self, invoice_id_number: i64) -> Result<IncomeRecord, ServiceError> {
        self.find_record(invoice_id_number)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: ENTITY,
                id: invoice_id_number,
            })
    }

    async fn rekey(&self, from: i64, record: &IncomeRecord) -> DatabaseResult<u64> {
        let mut tx = self.incomes.begin_rekey().await?;

        match apply_rekey(tx.as_mut(), from, record).await {
            Ok(moved) => {
                tx.commit().await?;
                Ok(moved)
            }
            Err(e) => {
                warn!(
                    "Rolling back move of income {} to {}: {}",
                    from, record.invoice_id_number, e
                );
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    /// Reject records pointing at relations that do not exist
    async fn check_relations(&self, record: &IncomeRecord) -> Result<(), ServiceError> {
        for (relation, store, id) in self.relations.lookups(record) {
            if find_related(store, id).await?.is_none() {
                return Err(ServiceError::InvalidReference {
                    entity: ENTITY,
                    relation,
                    relation_id: id,
                });
            }
        }

        if find_related(self.relations.receivers.as_ref(), record.receiver_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::InvalidReference {
                entity: ENTITY,
                relation: "receiver",
                relation_id: record.receiver_id,
            });
        }
        Ok(())
    }

    async fn resolve(&self, record: IncomeRecord) -> Result<Income, ServiceError> {
        let key = record.invoice_id_number;
        let relations = &self.relations;

        let platform =
            resolve_related(relations.platforms.as_ref(), key, "platform", record.platform_id)
                .await?;
        let status =
            resolve_related(relations.statuses.as_ref(), key, "status", record.status_id).await?;
        let payment_method = resolve_related(
            relations.payment_methods.as_ref(),
            key,
            "payment method",
            record.payment_method_id,
        )
        .await?;
        let receiver =
            resolve_related(relations.receivers.as_ref(), key, "receiver", record.receiver_id)
                .await?;
        let sale_person = resolve_related(
            relations.sale_persons.as_ref(),
            key,
            "sale person",
            record.sale_person_id,
        )
        .await?;
        let channel =
            resolve_related(relations.channels.as_ref(), key, "channel", record.channel_id)
                .await?;
        let bank = resolve_related(relations.banks.as_ref(), key, "bank", record.bank_id).await?;

        Ok(Income {
            invoice_id_number: key,
            fields: record.fields,
            platform,
            status,
            payment_method,
            receiver,
            sale_person,
            channel,
            bank,
        })
    }
}

async fn apply_rekey(
    tx: &mut dyn RekeyTransaction,
    from: i64,
    record: &IncomeRecord,
) -> DatabaseResult<u64> {
    tx.insert_income(record).await?;
    let moved = tx.repoint_details(from, record.invoice_id_number).await?;
    tx.delete_income(from).await?;
    Ok(moved)
}

async fn find_related<R: Resource>(
    store: &dyn Store<R>,
    id: i64,
) -> Result<Option<R>, ServiceError> {
    store
        .find_by_id(id)
        .await
        .map_err(|e| ServiceError::storage("failed to get income", e))
}

/// Load a relation of income `key`, treating a dangling id as a read error
async fn resolve_related<R: Resource>(
    store: &dyn Store<R>,
    key: i64,
    relation: &'static str,
    relation_id: i64,
) -> Result<R, ServiceError> {
    find_related(store, relation_id).await?.ok_or_else(|| {
        ServiceError::storage(
            "failed to get income",
            DatabaseError::MissingRelation {
                entity: ENTITY,
                key,
                relation,
                relation_id,
            },
        )
    })
}
