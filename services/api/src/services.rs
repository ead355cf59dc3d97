//! Business logic between the HTTP handlers and the storage gateways

use common::error::DatabaseError;
use thiserror::Error;

pub mod crud;
pub mod detail;
pub mod income;

pub use crud::CrudService;
pub use detail::DetailService;
pub use income::{IncomeService, Relations};

/// Failures of the service layer
///
/// Every variant reaches clients as an internal error; the display text ends
/// up in the envelope's `error` field.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: i64 },

    #[error("{entity} references missing {relation} {relation_id}")]
    InvalidReference {
        entity: &'static str,
        relation: &'static str,
        relation_id: i64,
    },

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: DatabaseError,
    },
}

impl ServiceError {
    pub(crate) fn storage(context: impl Into<String>, source: DatabaseError) -> Self {
        ServiceError::Storage {
            context: context.into(),
            source,
        }
    }
}
