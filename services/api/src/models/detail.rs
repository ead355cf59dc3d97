//! Detail line items, each pointing at one income by invoice number

use auth::validation::validate_required;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Income, Resource, merge_fields, validate_optional, validate_reference};

/// Detail row
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct DetailRecord {
    pub id: i64,
    pub description: String,
    pub notes: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub income_invoice_id_number: i64,
}

/// Detail with its income aggregate resolved
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Detail {
    pub id: i64,
    pub description: String,
    pub notes: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub income: Income,
}

impl Detail {
    pub fn new(record: DetailRecord, income: Income) -> Self {
        Detail {
            id: record.id,
            description: record.description,
            notes: record.notes,
            quantity: record.quantity,
            unit_price: record.unit_price,
            income,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDetailRequest {
    pub description: String,
    pub notes: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub income_invoice_id_number: i64,
}

/// Partial update; absent or `null` fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDetailRequest {
    pub description: Option<String>,
    pub notes: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
    pub income_invoice_id_number: Option<i64>,
}

impl Resource for DetailRecord {
    type Create = CreateDetailRequest;
    type Update = UpdateDetailRequest;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_create(id: i64, request: &CreateDetailRequest) -> Self {
        DetailRecord {
            id,
            description: request.description.clone(),
            notes: request.notes.clone(),
            quantity: request.quantity,
            unit_price: request.unit_price,
            income_invoice_id_number: request.income_invoice_id_number,
        }
    }

    fn apply(&mut self, update: UpdateDetailRequest) {
        merge_fields!(self, update;
            description,
            notes,
            quantity,
            unit_price,
            income_invoice_id_number,
        );
    }

    fn validate_create(request: &CreateDetailRequest) -> Result<(), String> {
        validate_required("Description", &request.description)?;
        validate_required("Notes", &request.notes)?;
        validate_reference("Income invoice id number", request.income_invoice_id_number)
    }

    fn validate_update(update: &UpdateDetailRequest) -> Result<(), String> {
        validate_optional("Description", update.description.as_ref())?;
        validate_optional("Notes", update.notes.as_ref())?;
        match update.income_invoice_id_number {
            Some(id) => validate_reference("Income invoice id number", id),
            None => Ok(()),
        }
    }
}
