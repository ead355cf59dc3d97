//! Income repository, including the invoice re-key transaction

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::{PgPool, Postgres, Transaction, postgres::PgArguments, query::Query};
use tracing::{debug, info};

use crate::models::IncomeRecord;

const INCOME_COLUMNS: &str = r#"
    invoice_id_number, quotation_id_number, quotation_issue_date,
    quotation_due_date, invoice_issue_date, invoice_due_date,
    receipt_issue_date, receipt_id_number, agency_tax_payer_id_number,
    influencer_posting_date, agency_agency_name, agency_address,
    agency_phone_number, contactor_contactor_name, contactor_phone_number,
    contactor_line, contactor_email, brand_brand_name, brand_product,
    transaction_reference_number, terms_and_conditions, total_payment_amount,
    notes_for_the_total_payment, first_payment, notes_for_the_first_payment,
    second_payment, notes_for_the_second_payment, unpaid_payment_amount,
    notes_for_the_unpaid_payment, platform_id, status_id, payment_method_id,
    receiver_id, sale_person_id, channel_id, bank_id
"#;

const INSERT_INCOME: &str = r#"
INSERT INTO incomes (
    invoice_id_number, quotation_id_number, quotation_issue_date,
    quotation_due_date, invoice_issue_date, invoice_due_date,
    receipt_issue_date, receipt_id_number, agency_tax_payer_id_number,
    influencer_posting_date, agency_agency_name, agency_address,
    agency_phone_number, contactor_contactor_name, contactor_phone_number,
    contactor_line, contactor_email, brand_brand_name, brand_product,
    transaction_reference_number, terms_and_conditions, total_payment_amount,
    notes_for_the_total_payment, first_payment, notes_for_the_first_payment,
    second_payment, notes_for_the_second_payment, unpaid_payment_amount,
    notes_for_the_unpaid_payment, platform_id, status_id, payment_method_id,
    receiver_id, sale_person_id, channel_id, bank_id
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
    $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32,
    $33, $34, $35, $36
)
"#;

const UPDATE_INCOME: &str = r#"
UPDATE incomes SET
    quotation_id_number = $2, quotation_issue_date = $3,
    quotation_due_date = $4, invoice_issue_date = $5, invoice_due_date = $6,
    receipt_issue_date = $7, receipt_id_number = $8,
    agency_tax_payer_id_number = $9, influencer_posting_date = $10,
    agency_agency_name = $11, agency_address = $12, agency_phone_number = $13,
    contactor_contactor_name = $14, contactor_phone_number = $15,
    contactor_line = $16, contactor_email = $17, brand_brand_name = $18,
    brand_product = $19, transaction_reference_number = $20,
    terms_and_conditions = $21, total_payment_amount = $22,
    notes_for_the_total_payment = $23, first_payment = $24,
    notes_for_the_first_payment = $25, second_payment = $26,
    notes_for_the_second_payment = $27, unpaid_payment_amount = $28,
    notes_for_the_unpaid_payment = $29, platform_id = $30, status_id = $31,
    payment_method_id = $32, receiver_id = $33, sale_person_id = $34,
    channel_id = $35, bank_id = $36
WHERE invoice_id_number = $1
"#;

/// Bind every column of `record` in `INCOME_COLUMNS` order
fn bind_record<'q>(
    query: Query<'q, Postgres, PgArguments>,
    record: &'q IncomeRecord,
) -> Query<'q, Postgres, PgArguments> {
    let fields = &record.fields;
    query
        .bind(record.invoice_id_number)
        .bind(fields.quotation_id_number)
        .bind(fields.quotation_issue_date)
        .bind(fields.quotation_due_date)
        .bind(fields.invoice_issue_date)
        .bind(fields.invoice_due_date)
        .bind(fields.receipt_issue_date)
        .bind(fields.receipt_id_number)
        .bind(fields.agency_tax_payer_id_number)
        .bind(fields.influencer_posting_date)
        .bind(&fields.agency_agency_name)
        .bind(&fields.agency_address)
        .bind(&fields.agency_phone_number)
        .bind(&fields.contactor_contactor_name)
        .bind(&fields.contactor_phone_number)
        .bind(&fields.contactor_line)
        .bind(&fields.contactor_email)
        .bind(&fields.brand_brand_name)
        .bind(&fields.brand_product)
        .bind(fields.transaction_reference_number)
        .bind(&fields.terms_and_conditions)
        .bind(fields.total_payment_amount)
        .bind(&fields.notes_for_the_total_payment)
        .bind(fields.first_payment)
        .bind(&fields.notes_for_the_first_payment)
        .bind(fields.second_payment)
        .bind(&fields.notes_for_the_second_payment)
        .bind(fields.unpaid_payment_amount)
        .bind(&fields.notes_for_the_unpaid_payment)
        .bind(record.platform_id)
        .bind(record.status_id)
        .bind(record.payment_method_id)
        .bind(record.receiver_id)
        .bind(record.sale_person_id)
        .bind(record.channel_id)
        .bind(record.bank_id)
}

/// Storage interface for incomes
#[async_trait]
pub trait IncomeStore: Send + Sync {
    /// All incomes ordered by invoice number
    async fn find_all(&self) -> DatabaseResult<Vec<IncomeRecord>>;

    async fn find_by_invoice_id(
        &self,
        invoice_id_number: i64,
    ) -> DatabaseResult<Option<IncomeRecord>>;

    async fn insert(&self, record: &IncomeRecord) -> DatabaseResult<()>;

    /// Overwrite the row with the same invoice number
    async fn save(&self, record: &IncomeRecord) -> DatabaseResult<()>;

    /// Delete an income and every detail pointing at it, atomically
    ///
    /// Returns the number of details removed.
    async fn delete_with_details(&self, invoice_id_number: i64) -> DatabaseResult<u64>;

    /// Open the transaction used to move an income to a new invoice number
    async fn begin_rekey(&self) -> DatabaseResult<Box<dyn RekeyTransaction>>;
}

/// Steps of an invoice number change, applied inside one transaction
///
/// Dropping the transaction without `commit` discards every step.
#[async_trait]
pub trait RekeyTransaction: Send {
    async fn insert_income(&mut self, record: &IncomeRecord) -> DatabaseResult<()>;

    /// Point every detail of `from` at `to`, returning how many moved
    async fn repoint_details(&mut self, from: i64, to: i64) -> DatabaseResult<u64>;

    async fn delete_income(&mut self, invoice_id_number: i64) -> DatabaseResult<()>;

    async fn commit(self: Box<Self>) -> DatabaseResult<()>;

    async fn rollback(self: Box<Self>) -> DatabaseResult<()>;
}

/// PostgreSQL income repository
#[derive(Clone)]
pub struct PgIncomeStore {
    pool: PgPool,
}

impl PgIncomeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncomeStore for PgIncomeStore {
    async fn find_all(&self) -> DatabaseResult<Vec<IncomeRecord>> {
        let sql = format!(
            "SELECT {} FROM incomes ORDER BY invoice_id_number",
            INCOME_COLUMNS
        );
        let rows = sqlx::query_as::<_, IncomeRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_by_invoice_id(
        &self,
        invoice_id_number: i64,
    ) -> DatabaseResult<Option<IncomeRecord>> {
        let sql = format!(
            "SELECT {} FROM incomes WHERE invoice_id_number = $1",
            INCOME_COLUMNS
        );
        let row = sqlx::query_as::<_, IncomeRecord>(&sql)
            .bind(invoice_id_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn insert(&self, record: &IncomeRecord) -> DatabaseResult<()> {
        bind_record(sqlx::query(INSERT_INCOME), record)
            .execute(&self.pool)
            .await?;

        debug!("Inserted income {}", record.invoice_id_number);
        Ok(())
    }

    async fn save(&self, record: &IncomeRecord) -> DatabaseResult<()> {
        bind_record(sqlx::query(UPDATE_INCOME), record)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_with_details(&self, invoice_id_number: i64) -> DatabaseResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM details WHERE income_invoice_id_number = $1")
            .bind(invoice_id_number)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM incomes WHERE invoice_id_number = $1")
            .bind(invoice_id_number)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Deleted income {} with {} details",
            invoice_id_number, removed
        );
        Ok(removed)
    }

    async fn begin_rekey(&self) -> DatabaseResult<Box<dyn RekeyTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRekeyTransaction { tx }))
    }
}

/// Re-key transaction over a PostgreSQL transaction
pub struct PgRekeyTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RekeyTransaction for PgRekeyTransaction {
    async fn insert_income(&mut self, record: &IncomeRecord) -> DatabaseResult<()> {
        bind_record(sqlx::query(INSERT_INCOME), record)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn repoint_details(&mut self, from: i64, to: i64) -> DatabaseResult<u64> {
        let moved = sqlx::query(
            "UPDATE details SET income_invoice_id_number = $2 WHERE income_invoice_id_number = $1",
        )
        .bind(from)
        .bind(to)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        Ok(moved)
    }

    async fn delete_income(&mut self, invoice_id_number: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM incomes WHERE invoice_id_number = $1")
            .bind(invoice_id_number)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> DatabaseResult<()> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
