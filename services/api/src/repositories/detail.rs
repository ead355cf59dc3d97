//! Detail repository

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

use super::Store;
use crate::models::{CreateDetailRequest, DetailRecord};

/// PostgreSQL detail repository
#[derive(Clone)]
pub struct PgDetailStore {
    pool: PgPool,
}

impl PgDetailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store<DetailRecord> for PgDetailStore {
    async fn find_all(&self) -> DatabaseResult<Vec<DetailRecord>> {
        let rows = sqlx::query_as::<_, DetailRecord>(
            r#"
            SELECT id, description, notes, quantity, unit_price, income_invoice_id_number
            FROM details
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<DetailRecord>> {
        let row = sqlx::query_as::<_, DetailRecord>(
            r#"
            SELECT id, description, notes, quantity, unit_price, income_invoice_id_number
            FROM details
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, request: &CreateDetailRequest) -> DatabaseResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO details (description, notes, quantity, unit_price, income_invoice_id_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&request.description)
        .bind(&request.notes)
        .bind(request.quantity)
        .bind(request.unit_price)
        .bind(request.income_invoice_id_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn save(&self, record: &DetailRecord) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE details
            SET description = $2, notes = $3, quantity = $4, unit_price = $5,
                income_invoice_id_number = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.description)
        .bind(&record.notes)
        .bind(record.quantity)
        .bind(record.unit_price)
        .bind(record.income_invoice_id_number)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM details WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
