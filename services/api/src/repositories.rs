//! Storage gateways for database operations

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::Resource;

pub mod detail;
pub mod income;
pub mod lookup;
pub mod receiver;

#[cfg(test)]
pub(crate) mod memory;

pub use detail::PgDetailStore;
pub use income::{IncomeStore, PgIncomeStore, RekeyTransaction};
pub use lookup::PgLookupStore;
pub use receiver::PgReceiverStore;

/// Persistence interface for rows keyed by a surrogate id
#[async_trait]
pub trait Store<R: Resource>: Send + Sync {
    /// All rows ordered by id
    async fn find_all(&self) -> DatabaseResult<Vec<R>>;

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<R>>;

    /// Insert a row and return its generated id
    async fn insert(&self, request: &R::Create) -> DatabaseResult<i64>;

    /// Overwrite the stored row with the same id
    async fn save(&self, record: &R) -> DatabaseResult<()>;

    async fn delete(&self, id: i64) -> DatabaseResult<()>;
}
