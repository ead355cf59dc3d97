//! API models for request and response payloads

use serde::{Serialize, de::DeserializeOwned};

pub mod detail;
pub mod income;
pub mod lookup;
pub mod receiver;

pub use detail::{CreateDetailRequest, Detail, DetailRecord, UpdateDetailRequest};
pub use income::{
    CreateIncomeRequest, Income, IncomeRecord, IncomeResponse, UpdateIncomeRequest,
};
pub use lookup::{Lookup, LookupKind, LookupRequest};
pub use receiver::{CreateReceiverRequest, Receiver, UpdateReceiverRequest};

/// Overwrite each listed field of `$target` whose counterpart in `$update` is `Some`
macro_rules! merge_fields {
    ($target:expr, $update:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $update.$field {
                $target.$field = value;
            }
        )+
    };
}
pub(crate) use merge_fields;

/// Response for mutations of id-keyed entities
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct IdResponse {
    pub id: i64,
}

/// A stored row with a surrogate id, managed by the generic CRUD service
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
    /// Payload accepted by `POST`
    type Create: DeserializeOwned + Send + Sync + 'static;
    /// Payload accepted by `PATCH`
    type Update: DeserializeOwned + Send + Sync + 'static;

    fn id(&self) -> i64;

    /// Build the row a store would hold after inserting `request` under `id`
    fn from_create(id: i64, request: &Self::Create) -> Self;

    /// Merge an update into the stored row
    fn apply(&mut self, update: Self::Update);

    fn validate_create(request: &Self::Create) -> Result<(), String>;

    fn validate_update(update: &Self::Update) -> Result<(), String>;
}

/// Validate an optional text field if it was provided
pub(crate) fn validate_optional(field: &str, value: Option<&String>) -> Result<(), String> {
    match value {
        Some(value) => auth::validation::validate_required(field, value),
        None => Ok(()),
    }
}

/// Validate that a reference id points at a possible row
pub(crate) fn validate_reference(field: &str, id: i64) -> Result<(), String> {
    if id <= 0 {
        return Err(format!("{} must be a positive id", field));
    }
    Ok(())
}
