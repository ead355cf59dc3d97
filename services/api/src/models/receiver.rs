//! Receiver entity

use auth::validation::validate_required;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Resource, merge_fields, validate_optional};

/// Receiver row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Receiver {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub tax_payer_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReceiverRequest {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub tax_payer_id: String,
}

/// Partial update; absent or `null` fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReceiverRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_payer_id: Option<String>,
}

impl Resource for Receiver {
    type Create = CreateReceiverRequest;
    type Update = UpdateReceiverRequest;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_create(id: i64, request: &CreateReceiverRequest) -> Self {
        Receiver {
            id,
            name: request.name.clone(),
            address: request.address.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            tax_payer_id: request.tax_payer_id.clone(),
        }
    }

    fn apply(&mut self, update: UpdateReceiverRequest) {
        merge_fields!(self, update; name, address, email, phone, tax_payer_id);
    }

    fn validate_create(request: &CreateReceiverRequest) -> Result<(), String> {
        validate_required("Name", &request.name)?;
        validate_required("Address", &request.address)?;
        validate_required("Email", &request.email)?;
        validate_required("Phone", &request.phone)?;
        validate_required("Tax payer id", &request.tax_payer_id)
    }

    fn validate_update(update: &UpdateReceiverRequest) -> Result<(), String> {
        validate_optional("Name", update.name.as_ref())?;
        validate_optional("Address", update.address.as_ref())?;
        validate_optional("Email", update.email.as_ref())?;
        validate_optional("Phone", update.phone.as_ref())?;
        validate_optional("Tax payer id", update.tax_payer_id.as_ref())
    }
}
