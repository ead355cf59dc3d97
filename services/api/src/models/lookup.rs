//! Single-name lookup entities referenced by incomes

use auth::validation::validate_required;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Resource;

/// The six lookup tables sharing the `{id, name}` shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Platform,
    Status,
    PaymentMethod,
    SalePerson,
    Channel,
    Bank,
}

impl LookupKind {
    pub const ALL: [LookupKind; 6] = [
        LookupKind::Platform,
        LookupKind::Status,
        LookupKind::PaymentMethod,
        LookupKind::SalePerson,
        LookupKind::Channel,
        LookupKind::Bank,
    ];

    /// Backing table
    pub fn table(self) -> &'static str {
        match self {
            LookupKind::Platform => "platforms",
            LookupKind::Status => "statuses",
            LookupKind::PaymentMethod => "payment_methods",
            LookupKind::SalePerson => "sale_persons",
            LookupKind::Channel => "channels",
            LookupKind::Bank => "banks",
        }
    }

    /// Human readable name used in response messages
    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Platform => "platform",
            LookupKind::Status => "status",
            LookupKind::PaymentMethod => "payment method",
            LookupKind::SalePerson => "sale person",
            LookupKind::Channel => "channel",
            LookupKind::Bank => "bank",
        }
    }

    /// Route segment under `/api`
    pub fn path(self) -> &'static str {
        match self {
            LookupKind::Platform => "platform",
            LookupKind::Status => "status",
            LookupKind::PaymentMethod => "payment_method",
            LookupKind::SalePerson => "sale_person",
            LookupKind::Channel => "channel",
            LookupKind::Bank => "bank",
        }
    }
}

/// Lookup row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Lookup {
    pub id: i64,
    pub name: String,
}

/// Create and update payload; updates replace the name
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub name: String,
}

impl Resource for Lookup {
    type Create = LookupRequest;
    type Update = LookupRequest;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_create(id: i64, request: &LookupRequest) -> Self {
        Lookup {
            id,
            name: request.name.clone(),
        }
    }

    fn apply(&mut self, update: LookupRequest) {
        self.name = update.name;
    }

    fn validate_create(request: &LookupRequest) -> Result<(), String> {
        validate_required("Name", &request.name)
    }

    fn validate_update(update: &LookupRequest) -> Result<(), String> {
        validate_required("Name", &update.name)
    }
}
