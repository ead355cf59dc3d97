//! Application state shared across handlers

use auth::{AuthState, CredentialVerifier, TokenAuthority, repositories::UserRepository};
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::{Lookup, LookupKind, Receiver};
use crate::repositories::{PgDetailStore, PgIncomeStore, PgLookupStore, PgReceiverStore, Store};
use crate::services::{CrudService, DetailService, IncomeService, Relations};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth: AuthState,
    pub lookups: Vec<(LookupKind, CrudService<Lookup>)>,
    pub receivers: CrudService<Receiver>,
    pub incomes: IncomeService,
    pub details: DetailService,
}

impl AppState {
    /// Wire every service to its PostgreSQL store
    pub fn from_pool(
        db_pool: PgPool,
        token_authority: TokenAuthority,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let lookup_store = |kind| -> Arc<dyn Store<Lookup>> {
            Arc::new(PgLookupStore::new(db_pool.clone(), kind))
        };
        let receiver_store: Arc<dyn Store<Receiver>> =
            Arc::new(PgReceiverStore::new(db_pool.clone()));

        let relations = Relations {
            platforms: lookup_store(LookupKind::Platform),
            statuses: lookup_store(LookupKind::Status),
            payment_methods: lookup_store(LookupKind::PaymentMethod),
            receivers: receiver_store.clone(),
            sale_persons: lookup_store(LookupKind::SalePerson),
            channels: lookup_store(LookupKind::Channel),
            banks: lookup_store(LookupKind::Bank),
        };

        let lookups = LookupKind::ALL
            .into_iter()
            .map(|kind| (kind, CrudService::new(lookup_store(kind), kind.label())))
            .collect();

        let incomes = IncomeService::new(Arc::new(PgIncomeStore::new(db_pool.clone())), relations);
        let details = DetailService::new(
            CrudService::new(Arc::new(PgDetailStore::new(db_pool.clone())), "detail"),
            incomes.clone(),
        );

        Self {
            auth: AuthState {
                token_authority,
                verifier: CredentialVerifier::new(users),
            },
            lookups,
            receivers: CrudService::new(receiver_store, "receiver"),
            incomes,
            details,
            db_pool,
        }
    }
}
