//! Receiver repository

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

use super::Store;
use crate::models::{CreateReceiverRequest, Receiver};

/// PostgreSQL receiver repository
#[derive(Clone)]
pub struct PgReceiverStore {
    pool: PgPool,
}

impl PgReceiverStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store<Receiver> for PgReceiverStore {
    async fn find_all(&self) -> DatabaseResult<Vec<Receiver>> {
        let rows = sqlx::query_as::<_, Receiver>(
            r#"
            SELECT id, name, address, email, phone, tax_payer_id
            FROM receivers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Receiver>> {
        let row = sqlx::query_as::<_, Receiver>(
            r#"
            SELECT id, name, address, email, phone, tax_payer_id
            FROM receivers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, request: &CreateReceiverRequest) -> DatabaseResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO receivers (name, address, email, phone, tax_payer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.tax_payer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn save(&self, record: &Receiver) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE receivers
            SET name = $2, address = $3, email = $4, phone = $5, tax_payer_id = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.address)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.tax_payer_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM receivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
