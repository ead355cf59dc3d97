//! Income aggregate, keyed by its business invoice number

use auth::validation::validate_required;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Lookup, Receiver, merge_fields, validate_optional, validate_reference};

/// Scalar columns of an income, shared by the row, the DTO and the create payload
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct IncomeFields {
    pub quotation_id_number: i64,
    pub quotation_issue_date: DateTime<Utc>,
    pub quotation_due_date: DateTime<Utc>,
    pub invoice_issue_date: DateTime<Utc>,
    pub invoice_due_date: DateTime<Utc>,
    pub receipt_issue_date: DateTime<Utc>,
    pub receipt_id_number: i64,
    pub agency_tax_payer_id_number: i64,
    pub influencer_posting_date: DateTime<Utc>,
    pub agency_agency_name: String,
    pub agency_address: String,
    pub agency_phone_number: String,
    pub contactor_contactor_name: String,
    pub contactor_phone_number: String,
    pub contactor_line: String,
    pub contactor_email: String,
    pub brand_brand_name: String,
    pub brand_product: String,
    pub transaction_reference_number: i64,
    pub terms_and_conditions: String,
    pub total_payment_amount: i64,
    pub notes_for_the_total_payment: String,
    pub first_payment: i64,
    pub notes_for_the_first_payment: String,
    pub second_payment: i64,
    pub notes_for_the_second_payment: String,
    #[serde(default)]
    pub unpaid_payment_amount: i64,
    pub notes_for_the_unpaid_payment: String,
}

impl IncomeFields {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("Agency name", &self.agency_agency_name),
            ("Agency address", &self.agency_address),
            ("Agency phone number", &self.agency_phone_number),
            ("Contactor name", &self.contactor_contactor_name),
            ("Contactor phone number", &self.contactor_phone_number),
            ("Contactor line", &self.contactor_line),
            ("Contactor email", &self.contactor_email),
            ("Brand name", &self.brand_brand_name),
            ("Brand product", &self.brand_product),
            ("Terms and conditions", &self.terms_and_conditions),
            ("Notes for the total payment", &self.notes_for_the_total_payment),
            ("Notes for the first payment", &self.notes_for_the_first_payment),
            ("Notes for the second payment", &self.notes_for_the_second_payment),
            ("Notes for the unpaid payment", &self.notes_for_the_unpaid_payment),
        ] {
            validate_required(field, value)?;
        }
        Ok(())
    }
}

/// Income row with the foreign ids of its relations
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct IncomeRecord {
    pub invoice_id_number: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: IncomeFields,
    pub platform_id: i64,
    pub status_id: i64,
    pub payment_method_id: i64,
    pub receiver_id: i64,
    pub sale_person_id: i64,
    pub channel_id: i64,
    pub bank_id: i64,
}

impl IncomeRecord {
    /// Build the row for a create request
    pub fn from_create(request: CreateIncomeRequest) -> Self {
        IncomeRecord {
            invoice_id_number: request.invoice_id_number,
            fields: request.fields,
            platform_id: request.platform_id,
            status_id: request.status_id,
            payment_method_id: request.payment_method_id,
            receiver_id: request.receiver_id,
            sale_person_id: request.sale_person_id,
            channel_id: request.channel_id,
            bank_id: request.bank_id,
        }
    }

    /// Copy of this row with every provided field of `update` applied
    pub fn merged(&self, update: UpdateIncomeRequest) -> Self {
        let mut record = self.clone();
        merge_fields!(record, update;
            invoice_id_number,
            platform_id,
            status_id,
            payment_method_id,
            receiver_id,
            sale_person_id,
            channel_id,
            bank_id,
        );

        let fields = &mut record.fields;
        merge_fields!(fields, update;
            quotation_id_number,
            quotation_issue_date,
            quotation_due_date,
            invoice_issue_date,
            invoice_due_date,
            receipt_issue_date,
            receipt_id_number,
            agency_tax_payer_id_number,
            influencer_posting_date,
            agency_agency_name,
            agency_address,
            agency_phone_number,
            contactor_contactor_name,
            contactor_phone_number,
            contactor_line,
            contactor_email,
            brand_brand_name,
            brand_product,
            transaction_reference_number,
            terms_and_conditions,
            total_payment_amount,
            notes_for_the_total_payment,
            first_payment,
            notes_for_the_first_payment,
            second_payment,
            notes_for_the_second_payment,
            unpaid_payment_amount,
            notes_for_the_unpaid_payment,
        );
        record
    }
}

/// Income aggregate with its seven relations resolved
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Income {
    pub invoice_id_number: i64,
    #[serde(flatten)]
    pub fields: IncomeFields,
    pub platform: Lookup,
    pub status: Lookup,
    pub payment_method: Lookup,
    pub receiver: Receiver,
    pub sale_person: Lookup,
    pub channel: Lookup,
    pub bank: Lookup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncomeRequest {
    pub invoice_id_number: i64,
    #[serde(flatten)]
    pub fields: IncomeFields,
    pub platform_id: i64,
    pub status_id: i64,
    pub payment_method_id: i64,
    pub receiver_id: i64,
    pub sale_person_id: i64,
    pub channel_id: i64,
    pub bank_id: i64,
}

impl CreateIncomeRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_reference("Invoice id number", self.invoice_id_number)?;
        self.fields.validate()?;
        for (field, id) in [
            ("Platform id", self.platform_id),
            ("Status id", self.status_id),
            ("Payment method id", self.payment_method_id),
            ("Receiver id", self.receiver_id),
            ("Sale person id", self.sale_person_id),
            ("Channel id", self.channel_id),
            ("Bank id", self.bank_id),
        ] {
            validate_reference(field, id)?;
        }
        Ok(())
    }
}

/// Partial update; absent or `null` fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIncomeRequest {
    pub invoice_id_number: Option<i64>,
    pub quotation_id_number: Option<i64>,
    pub quotation_issue_date: Option<DateTime<Utc>>,
    pub quotation_due_date: Option<DateTime<Utc>>,
    pub invoice_issue_date: Option<DateTime<Utc>>,
    pub invoice_due_date: Option<DateTime<Utc>>,
    pub receipt_issue_date: Option<DateTime<Utc>>,
    pub receipt_id_number: Option<i64>,
    pub agency_tax_payer_id_number: Option<i64>,
    pub influencer_posting_date: Option<DateTime<Utc>>,
    pub agency_agency_name: Option<String>,
    pub agency_address: Option<String>,
    pub agency_phone_number: Option<String>,
    pub contactor_contactor_name: Option<String>,
    pub contactor_phone_number: Option<String>,
    pub contactor_line: Option<String>,
    pub contactor_email: Option<String>,
    pub brand_brand_name: Option<String>,
    pub brand_product: Option<String>,
    pub transaction_reference_number: Option<i64>,
    pub terms_and_conditions: Option<String>,
    pub total_payment_amount: Option<i64>,
    pub notes_for_the_total_payment: Option<String>,
    pub first_payment: Option<i64>,
    pub notes_for_the_first_payment: Option<String>,
    pub second_payment: Option<i64>,
    pub notes_for_the_second_payment: Option<String>,
    pub unpaid_payment_amount: Option<i64>,
    pub notes_for_the_unpaid_payment: Option<String>,
    pub platform_id: Option<i64>,
    pub status_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub sale_person_id: Option<i64>,
    pub channel_id: Option<i64>,
    pub bank_id: Option<i64>,
}

impl UpdateIncomeRequest {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("Agency name", &self.agency_agency_name),
            ("Agency address", &self.agency_address),
            ("Agency phone number", &self.agency_phone_number),
            ("Contactor name", &self.contactor_contactor_name),
            ("Contactor phone number", &self.contactor_phone_number),
            ("Contactor line", &self.contactor_line),
            ("Contactor email", &self.contactor_email),
            ("Brand name", &self.brand_brand_name),
            ("Brand product", &self.brand_product),
            ("Terms and conditions", &self.terms_and_conditions),
            ("Notes for the total payment", &self.notes_for_the_total_payment),
            ("Notes for the first payment", &self.notes_for_the_first_payment),
            ("Notes for the second payment", &self.notes_for_the_second_payment),
            ("Notes for the unpaid payment", &self.notes_for_the_unpaid_payment),
        ] {
            validate_optional(field, value.as_ref())?;
        }

        for (field, id) in [
            ("Invoice id number", self.invoice_id_number),
            ("Platform id", self.platform_id),
            ("Status id", self.status_id),
            ("Payment method id", self.payment_method_id),
            ("Receiver id", self.receiver_id),
            ("Sale person id", self.sale_person_id),
            ("Channel id", self.channel_id),
            ("Bank id", self.bank_id),
        ] {
            if let Some(id) = id {
                validate_reference(field, id)?;
            }
        }
        Ok(())
    }
}

/// Response for income mutations
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct IncomeResponse {
    pub invoice_id_number: i64,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_create_payload_defaults_unpaid_amount() {
        let request = create_income_request(1001);
        assert_eq!(request.fields.unpaid_payment_amount, 0);
        assert_eq!(request.fields.brand_brand_name, "Kopi Kita");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_payload_requires_relations() {
        let mut payload = create_income_json(1001);
        payload.as_object_mut().unwrap().remove("bank_id");
        assert!(serde_json::from_value::<CreateIncomeRequest>(payload).is_err());
    }

    #[test]
    fn test_create_rejects_non_positive_ids() {
        let mut request = create_income_request(1001);
        request.status_id = 0;
        assert_eq!(
            request.validate(),
            Err("Status id must be a positive id".to_string())
        );
    }

    #[test]
    fn test_merged_applies_only_provided_fields() {
        let stored = income_record(1001);
        let merged = stored.merged(UpdateIncomeRequest {
            invoice_id_number: Some(1002),
            first_payment: Some(0),
            brand_product: Some("Latte".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.invoice_id_number, 1002);
        assert_eq!(merged.fields.first_payment, 0);
        assert_eq!(merged.fields.brand_product, "Latte");
        assert_eq!(merged.fields.brand_brand_name, stored.fields.brand_brand_name);
        assert_eq!(merged.platform_id, stored.platform_id);
        assert_eq!(stored.invoice_id_number, 1001);
    }

    #[test]
    fn test_empty_update_is_identity() {
        let stored = income_record(1001);
        assert_eq!(stored.merged(UpdateIncomeRequest::default()), stored);
    }

    #[test]
    fn test_update_rejects_blank_text() {
        let update = UpdateIncomeRequest {
            contactor_email: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
