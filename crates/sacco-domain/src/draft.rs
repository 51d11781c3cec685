//! In-progress application payload and the request built from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{ApplicantType, Gender, LoanApplicationId};

/// Personal details of the applicant, prefilled from a profile or typed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl ApplicantDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Raw field values collected on the Details step.
///
/// Amount and term stay as entered so validators can report exactly what was
/// wrong with them; parsing happens when the request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub amount: String,
    pub term_days: String,
    pub mobile_number: String,
    pub occupation: String,
    pub loan_purpose: String,
    pub applicant: ApplicantDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Validated payload for `createLoanApplication`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationRequest {
    pub product_id: Uuid,
    pub applicant_type: ApplicantType,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    pub amount: f64,
    pub term_days: u32,
    pub mobile_number: String,
    pub occupation: String,
    pub loan_purpose: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Server acknowledgement of a created application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReceipt {
    pub loan_application_id: LoanApplicationId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_ignores_missing_parts() {
        let mut details = ApplicantDetails {
            first_name: " Wanjiru ".into(),
            ..ApplicantDetails::default()
        };
        assert_eq!(details.full_name(), "Wanjiru");
        details.last_name = "Kamau".into();
        assert_eq!(details.full_name(), "Wanjiru Kamau");
    }

    #[test]
    fn receipt_reads_camel_case_id() {
        let receipt: ApplicationReceipt = serde_json::from_str(
            r#"{"loanApplicationId":"3b9f0a52-9d0e-4f8e-8c55-b1d5a1c3e7f2"}"#,
        )
        .expect("valid receipt");
        assert_eq!(
            receipt.loan_application_id.to_string(),
            "3b9f0a52-9d0e-4f8e-8c55-b1d5a1c3e7f2"
        );
    }
}
