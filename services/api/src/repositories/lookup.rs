//! Lookup repository, one instance per lookup table

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;
use tracing::debug;

use super::Store;
use crate::models::{Lookup, LookupKind, LookupRequest};

/// PostgreSQL store for one of the `{id, name}` lookup tables
#[derive(Clone)]
pub struct PgLookupStore {
    pool: PgPool,
    kind: LookupKind,
}

impl PgLookupStore {
    /// Create a new lookup repository for `kind`
    pub fn new(pool: PgPool, kind: LookupKind) -> Self {
        Self { pool, kind }
    }
}

// Table names come from `LookupKind::table`, never from request input.
#[async_trait]
impl Store<Lookup> for PgLookupStore {
    async fn find_all(&self) -> DatabaseResult<Vec<Lookup>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", self.kind.table());
        let rows = sqlx::query_as::<_, Lookup>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Lookup>> {
        let sql = format!("SELECT id, name FROM {} WHERE id = $1", self.kind.table());
        let row = sqlx::query_as::<_, Lookup>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn insert(&self, request: &LookupRequest) -> DatabaseResult<i64> {
        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING id",
            self.kind.table()
        );
        let id = sqlx::query_scalar::<_, i64>(&sql)
            .bind(&request.name)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted {} {}", self.kind.label(), id);
        Ok(id)
    }

    async fn save(&self, record: &Lookup) -> DatabaseResult<()> {
        let sql = format!("UPDATE {} SET name = $2 WHERE id = $1", self.kind.table());
        sqlx::query(&sql)
            .bind(record.id)
            .bind(&record.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.kind.table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}
