//! In-memory stores for tests

use async_trait::async_trait;
use auth::repositories::memory::MemoryUserRepository;
use auth::{AuthState, CredentialVerifier, TokenAuthority};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{IncomeStore, RekeyTransaction, Store};
use crate::models::{
    CreateReceiverRequest, DetailRecord, IncomeRecord, Lookup, LookupKind, LookupRequest,
    Receiver, Resource,
};
use crate::services::{CrudService, DetailService, IncomeService, Relations};
use crate::state::AppState;

fn injected(message: &str) -> DatabaseError {
    DatabaseError::Query(sqlx::Error::Protocol(message.to_string()))
}

/// Rows keyed by id, ids handed out from 1
pub struct MemoryStore<R> {
    rows: Arc<Mutex<BTreeMap<i64, R>>>,
    next_id: Arc<AtomicI64>,
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<R: Resource> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn rows(&self) -> Vec<R> {
        self.rows.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl<R: Resource> Store<R> for MemoryStore<R> {
    async fn find_all(&self) -> DatabaseResult<Vec<R>> {
        Ok(self.rows())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<R>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, request: &R::Create) -> DatabaseResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows
            .lock()
            .unwrap()
            .insert(id, R::from_create(id, request));
        Ok(id)
    }

    async fn save(&self, record: &R) -> DatabaseResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(record.id(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> DatabaseResult<()> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Step of a re-key transaction that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RekeyStep {
    InsertIncome,
    RepointDetails,
    DeleteIncome,
    Commit,
}

/// Income table sharing its detail rows with a [`MemoryStore<DetailRecord>`]
#[derive(Clone)]
pub struct MemoryIncomeStore {
    incomes: Arc<Mutex<BTreeMap<i64, IncomeRecord>>>,
    details: Arc<Mutex<BTreeMap<i64, DetailRecord>>>,
    fail_at: Arc<Mutex<Option<RekeyStep>>>,
    rekeys_begun: Arc<AtomicUsize>,
}

impl MemoryIncomeStore {
    pub fn new(details: &MemoryStore<DetailRecord>) -> Self {
        Self {
            incomes: Arc::new(Mutex::new(BTreeMap::new())),
            details: details.rows.clone(),
            fail_at: Arc::new(Mutex::new(None)),
            rekeys_begun: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn len(&self) -> usize {
        self.incomes.lock().unwrap().len()
    }

    pub fn get(&self, invoice_id_number: i64) -> Option<IncomeRecord> {
        self.incomes.lock().unwrap().get(&invoice_id_number).cloned()
    }

    /// Store a row directly, bypassing every check
    pub fn put(&self, record: IncomeRecord) {
        self.incomes
            .lock()
            .unwrap()
            .insert(record.invoice_id_number, record);
    }

    /// Make the given step of every later re-key fail
    pub fn fail_at(&self, step: RekeyStep) {
        *self.fail_at.lock().unwrap() = Some(step);
    }

    pub fn rekeys_begun(&self) -> usize {
        self.rekeys_begun.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncomeStore for MemoryIncomeStore {
    async fn find_all(&self) -> DatabaseResult<Vec<IncomeRecord>> {
        Ok(self.incomes.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_invoice_id(
        &self,
        invoice_id_number: i64,
    ) -> DatabaseResult<Option<IncomeRecord>> {
        Ok(self.get(invoice_id_number))
    }

    async fn insert(&self, record: &IncomeRecord) -> DatabaseResult<()> {
        let mut incomes = self.incomes.lock().unwrap();
        if incomes.contains_key(&record.invoice_id_number) {
            return Err(injected("duplicate key value violates unique constraint"));
        }
        incomes.insert(record.invoice_id_number, record.clone());
        Ok(())
    }

    async fn save(&self, record: &IncomeRecord) -> DatabaseResult<()> {
        self.put(record.clone());
        Ok(())
    }

    async fn delete_with_details(&self, invoice_id_number: i64) -> DatabaseResult<u64> {
        let mut incomes = self.incomes.lock().unwrap();
        let mut details = self.details.lock().unwrap();

        let before = details.len();
        details.retain(|_, detail| detail.income_invoice_id_number != invoice_id_number);
        incomes.remove(&invoice_id_number);
        Ok((before - details.len()) as u64)
    }

    async fn begin_rekey(&self) -> DatabaseResult<Box<dyn RekeyTransaction>> {
        self.rekeys_begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryRekey {
            incomes: self.incomes.lock().unwrap().clone(),
            details: self.details.lock().unwrap().clone(),
            fail_at: *self.fail_at.lock().unwrap(),
            store: self.clone(),
        }))
    }
}

/// Works on copies of both tables and publishes them on commit
struct MemoryRekey {
    store: MemoryIncomeStore,
    incomes: BTreeMap<i64, IncomeRecord>,
    details: BTreeMap<i64, DetailRecord>,
    fail_at: Option<RekeyStep>,
}

impl MemoryRekey {
    fn step(&self, step: RekeyStep) -> DatabaseResult<()> {
        if self.fail_at == Some(step) {
            return Err(injected(&format!("injected failure at {:?}", step)));
        }
        Ok(())
    }
}

#[async_trait]
impl RekeyTransaction for MemoryRekey {
    async fn insert_income(&mut self, record: &IncomeRecord) -> DatabaseResult<()> {
        self.step(RekeyStep::InsertIncome)?;
        if self.incomes.contains_key(&record.invoice_id_number) {
            return Err(injected("duplicate key value violates unique constraint"));
        }
        self.incomes
            .insert(record.invoice_id_number, record.clone());
        Ok(())
    }

    async fn repoint_details(&mut self, from: i64, to: i64) -> DatabaseResult<u64> {
        self.step(RekeyStep::RepointDetails)?;
        let mut moved = 0;
        for detail in self.details.values_mut() {
            if detail.income_invoice_id_number == from {
                detail.income_invoice_id_number = to;
                moved += 1;
            }
        }
        Ok(moved)
    }

    async fn delete_income(&mut self, invoice_id_number: i64) -> DatabaseResult<()> {
        self.step(RekeyStep::DeleteIncome)?;
        self.incomes.remove(&invoice_id_number);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DatabaseResult<()> {
        self.step(RekeyStep::Commit)?;
        let this = *self;
        *this.store.incomes.lock().unwrap() = this.incomes;
        *this.store.details.lock().unwrap() = this.details;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        Ok(())
    }
}

/// Every table of the service, in memory
#[derive(Clone)]
pub struct MemoryDb {
    lookups: HashMap<LookupKind, MemoryStore<Lookup>>,
    pub receivers: MemoryStore<Receiver>,
    pub incomes: MemoryIncomeStore,
    pub details: MemoryStore<DetailRecord>,
    pub users: MemoryUserRepository,
}

impl MemoryDb {
    pub fn new() -> Self {
        let details = MemoryStore::new();
        Self {
            lookups: LookupKind::ALL
                .into_iter()
                .map(|kind| (kind, MemoryStore::new()))
                .collect(),
            receivers: MemoryStore::new(),
            incomes: MemoryIncomeStore::new(&details),
            details,
            users: MemoryUserRepository::new(),
        }
    }

    /// Database holding one row with id 1 in every table an income points at
    pub async fn with_relations() -> Self {
        let db = Self::new();
        for (kind, name) in [
            (LookupKind::Platform, "Instagram"),
            (LookupKind::Status, "Paid"),
            (LookupKind::PaymentMethod, "Transfer"),
            (LookupKind::SalePerson, "Andi"),
            (LookupKind::Channel, "Endorsement"),
            (LookupKind::Bank, "BCA"),
        ] {
            db.lookup(kind)
                .insert(&LookupRequest {
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }
        db.receivers
            .insert(&CreateReceiverRequest {
                name: "PT Maju".to_string(),
                address: "Jl. Sudirman 1".to_string(),
                email: "finance@maju.co.id".to_string(),
                phone: "021555".to_string(),
                tax_payer_id: "01.234.567.8".to_string(),
            })
            .await
            .unwrap();
        db
    }

    pub fn lookup(&self, kind: LookupKind) -> &MemoryStore<Lookup> {
        &self.lookups[&kind]
    }

    fn lookup_store(&self, kind: LookupKind) -> Arc<dyn Store<Lookup>> {
        Arc::new(self.lookup(kind).clone())
    }

    pub fn relations(&self) -> Relations {
        Relations {
            platforms: self.lookup_store(LookupKind::Platform),
            statuses: self.lookup_store(LookupKind::Status),
            payment_methods: self.lookup_store(LookupKind::PaymentMethod),
            receivers: Arc::new(self.receivers.clone()),
            sale_persons: self.lookup_store(LookupKind::SalePerson),
            channels: self.lookup_store(LookupKind::Channel),
            banks: self.lookup_store(LookupKind::Bank),
        }
    }

    pub fn lookup_service(&self, kind: LookupKind) -> CrudService<Lookup> {
        CrudService::new(self.lookup_store(kind), kind.label())
    }

    pub fn receiver_service(&self) -> CrudService<Receiver> {
        CrudService::new(Arc::new(self.receivers.clone()), "receiver")
    }

    pub fn income_service(&self) -> IncomeService {
        IncomeService::new(Arc::new(self.incomes.clone()), self.relations())
    }

    pub fn detail_service(&self) -> DetailService {
        DetailService::new(
            CrudService::new(Arc::new(self.details.clone()), "detail"),
            self.income_service(),
        )
    }

    /// Application state backed by this database; the pool only serves `/health`
    pub fn app_state(&self, db_pool: PgPool, token_authority: TokenAuthority) -> AppState {
        AppState {
            db_pool,
            auth: AuthState {
                token_authority,
                verifier: CredentialVerifier::new(Arc::new(self.users.clone())),
            },
            lookups: LookupKind::ALL
                .into_iter()
                .map(|kind| (kind, self.lookup_service(kind)))
                .collect(),
            receivers: self.receiver_service(),
            incomes: self.income_service(),
            details: self.detail_service(),
        }
    }
}
