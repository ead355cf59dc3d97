//! Detail service; reads embed the full income aggregate of each line item

use common::error::DatabaseError;
use tracing::info;

use super::{CrudService, IncomeService, ServiceError};
use crate::models::{CreateDetailRequest, Detail, DetailRecord, Resource, UpdateDetailRequest};

#[derive(Clone)]
pub struct DetailService {
    details: CrudService<DetailRecord>,
    incomes: IncomeService,
}

impl DetailService {
    pub fn new(details: CrudService<DetailRecord>, incomes: IncomeService) -> Self {
        Self { details, incomes }
    }

    pub async fn get_all(&self) -> Result<Vec<Detail>, ServiceError> {
        let records = self.details.get_all().await?;

        let mut details = Vec::with_capacity(records.len());
        for record in records {
            details.push(self.resolve(record).await?);
        }
        Ok(details)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Detail, ServiceError> {
        let record = self.details.get_by_id(id).await?;
        self.resolve(record).await
    }

    /// Create a detail for an existing income
    pub async fn create(&self, request: CreateDetailRequest) -> Result<i64, ServiceError> {
        self.check_income(request.income_invoice_id_number).await?;
        self.details.create(request).await
    }

    pub async fn update(&self, id: i64, update: UpdateDetailRequest) -> Result<i64, ServiceError> {
        let mut record = self.details.get_by_id(id).await?;
        let previous_income = record.income_invoice_id_number;
        record.apply(update);

        if record.income_invoice_id_number != previous_income {
            self.check_income(record.income_invoice_id_number).await?;
        }

        self.details.save(&record).await?;
        info!("Updated detail {}", id);
        Ok(record.id)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.details.delete(id).await
    }

    async fn check_income(&self, invoice_id_number: i64) -> Result<(), ServiceError> {
        if self.incomes.contains(invoice_id_number).await? {
            Ok(())
        } else {
            Err(ServiceError::InvalidReference {
                entity: "detail",
                relation: "income",
                relation_id: invoice_id_number,
            })
        }
    }

    async fn resolve(&self, record: DetailRecord) -> Result<Detail, ServiceError> {
        let invoice_id_number = record.income_invoice_id_number;
        let income = match self.incomes.get_by_invoice_id(invoice_id_number).await {
            Ok(income) => income,
            Err(ServiceError::NotFound { .. }) => {
                return Err(ServiceError::storage(
                    "failed to get detail",
                    DatabaseError::MissingRelation {
                        entity: "detail",
                        key: record.id,
                        relation: "income",
                        relation_id: invoice_id_number,
                    },
                ));
            }
            Err(e) => return Err(e),
        };

        Ok(Detail::new(record, income))
    }
}
