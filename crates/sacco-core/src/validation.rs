//! Stateless field validators for the application form and its line items.
//!
//! Every validator is a pure function of its inputs: it returns the parsed
//! value or a human-readable reason and never touches wizard state, so running
//! the same checks twice on an unchanged draft yields identical results.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use sacco_domain::{
    ApplicationDraft, Collateral, Guarantor, LineItemKind, LoanProduct, NextOfKin,
};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// `0` or `+254`, then a 7 or 1 subscriber prefix and eight more digits.
static KENYAN_MOBILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\+254|0)[17]\d{8}$").expect("valid phone pattern"));

/// Field keys used in [`ValidationErrors`].
pub mod fields {
    pub const PRODUCT: &str = "product";
    pub const AMOUNT: &str = "amount";
    pub const TERM_DAYS: &str = "termDays";
    pub const MOBILE_NUMBER: &str = "mobileNumber";
    pub const OCCUPATION: &str = "occupation";
    pub const LOAN_PURPOSE: &str = "loanPurpose";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const ADDRESS: &str = "address";
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Structured map of field key to message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Records the error of `result` under `field` and hands back the value.
    fn capture<T>(&mut self, field: &str, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.insert(field, err.message);
                None
            }
        }
    }

    fn absorb(&mut self, prefix: &str, other: ValidationErrors) {
        for (field, message) in other.errors {
            self.errors.insert(format!("{prefix}.{field}"), message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Renders an amount without a trailing `.00` for whole values.
pub fn format_amount(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn validate_amount(input: &str, product: Option<&LoanProduct>) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Loan amount is required"));
    }
    let value = trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::new("Loan amount must be a valid number"))?;
    if value <= 0.0 {
        return Err(ValidationError::new("Loan amount must be greater than 0"));
    }
    if let Some(product) = product {
        if value < product.min_amount {
            return Err(ValidationError::new(format!(
                "Loan amount cannot be less than {}",
                format_amount(product.min_amount)
            )));
        }
        if value > product.max_amount {
            return Err(ValidationError::new(format!(
                "Loan amount cannot exceed {}",
                format_amount(product.max_amount)
            )));
        }
    }
    Ok(value)
}

pub fn validate_term_days(
    input: &str,
    product: Option<&LoanProduct>,
) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Loan term is required"));
    }
    let value = match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let numeric = trimmed
                .parse::<f64>()
                .map(|value| value.is_finite())
                .unwrap_or(false);
            return Err(ValidationError::new(if numeric {
                "Loan term must be a whole number of days"
            } else {
                "Loan term must be a valid number"
            }));
        }
    };
    if value <= 0 {
        return Err(ValidationError::new("Loan term must be greater than 0"));
    }
    let days = u32::try_from(value)
        .map_err(|_| ValidationError::new("Loan term is out of range"))?;
    if let Some(product) = product {
        if days < product.min_term_days {
            return Err(ValidationError::new(format!(
                "Loan term cannot be less than {} days",
                product.min_term_days
            )));
        }
        if days > product.max_term_days {
            return Err(ValidationError::new(format!(
                "Loan term cannot exceed {} days",
                product.max_term_days
            )));
        }
    }
    Ok(days)
}

pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Email is required"));
    }
    if EMAIL_PATTERN.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::new("Enter a valid email address"))
    }
}

/// Accepts Kenyan mobile numbers; returns the number with whitespace removed.
pub fn validate_phone(input: &str) -> Result<String, ValidationError> {
    let compact: String = input.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ValidationError::new("Phone number is required"));
    }
    if KENYAN_MOBILE_PATTERN.is_match(&compact) {
        Ok(compact)
    } else {
        Err(ValidationError::new(
            "Enter a valid phone number (e.g. 0712345678 or +254712345678)",
        ))
    }
}

pub fn validate_required(label: &str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(ValidationError::new(format!("{label} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn validate_positive(label: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::new(format!("{label} must be greater than 0")))
    }
}

/// Parsed Details-step values that the request builder needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDetails {
    pub amount: f64,
    pub term_days: u32,
    pub mobile_number: String,
}

/// Runs every Details-step validator and collects all failures at once.
pub fn validate_details(
    draft: &ApplicationDraft,
    product: Option<&LoanProduct>,
) -> Result<ValidatedDetails, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if product.is_none() {
        errors.insert(fields::PRODUCT, "Select a loan product");
    }

    let amount = errors.capture(fields::AMOUNT, validate_amount(&draft.amount, product));
    let term_days = errors.capture(
        fields::TERM_DAYS,
        validate_term_days(&draft.term_days, product),
    );
    let mobile_number = errors.capture(fields::MOBILE_NUMBER, validate_phone(&draft.mobile_number));
    errors.capture(
        fields::OCCUPATION,
        validate_required("Occupation", &draft.occupation),
    );
    errors.capture(
        fields::LOAN_PURPOSE,
        validate_required("Loan purpose", &draft.loan_purpose),
    );
    errors.capture(
        fields::FIRST_NAME,
        validate_required("First name", &draft.applicant.first_name),
    );
    errors.capture(
        fields::LAST_NAME,
        validate_required("Last name", &draft.applicant.last_name),
    );
    errors.capture(fields::EMAIL, validate_email(&draft.applicant.email));
    errors.capture(
        fields::ADDRESS,
        validate_required("Address", &draft.applicant.address),
    );

    match (amount, term_days, mobile_number) {
        (Some(amount), Some(term_days), Some(mobile_number)) if errors.is_empty() => {
            Ok(ValidatedDetails {
                amount,
                term_days,
                mobile_number,
            })
        }
        _ => Err(errors),
    }
}

/// Per-item rules checked right before a line-item phase is submitted.
pub trait LineItemRules {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl LineItemRules for Guarantor {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.capture("name", validate_required("Guarantor name", &self.name));
        errors.capture(
            "relationship",
            validate_required("Relationship", &self.relationship),
        );
        errors.capture("contact", validate_required("Contact", &self.contact));
        errors.capture("idNumber", validate_required("ID number", &self.id_number));
        errors.capture(
            "guaranteedAmount",
            validate_positive("Guaranteed amount", self.guaranteed_amount),
        );
        into_result(errors)
    }
}

impl LineItemRules for Collateral {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.capture(
            "type",
            validate_required("Collateral type", &self.collateral_type),
        );
        errors.capture(
            "description",
            validate_required("Description", &self.description),
        );
        errors.capture(
            "estimatedValue",
            validate_positive("Estimated value", self.estimated_value),
        );
        errors.capture("ownerName", validate_required("Owner name", &self.owner_name));
        errors.capture(
            "ownerContact",
            validate_required("Owner contact", &self.owner_contact),
        );
        into_result(errors)
    }
}

impl LineItemRules for NextOfKin {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.capture("name", validate_required("Name", &self.name));
        errors.capture(
            "relationship",
            validate_required("Relationship", &self.relationship),
        );
        errors.capture("phone", validate_required("Phone", &self.phone));
        if let Some(email) = self.email.as_deref().filter(|email| !email.trim().is_empty()) {
            errors.capture("email", validate_email(email));
        }
        errors.capture("address", validate_required("Address", &self.address));
        into_result(errors)
    }
}

/// Validates a whole batch; keys are prefixed with the 1-based item position,
/// e.g. `guarantors[2].idNumber`.
pub fn validate_line_items<T: LineItemRules>(
    kind: LineItemKind,
    items: &[T],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (index, item) in items.iter().enumerate() {
        if let Err(item_errors) = item.validate() {
            let prefix = format!("{}[{}]", kind.plural().replace(' ', "_"), index + 1);
            errors.absorb(&prefix, item_errors);
        }
    }
    into_result(errors)
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sacco_domain::InterestMethod;
    use uuid::Uuid;

    fn bounded_product() -> LoanProduct {
        LoanProduct {
            id: Uuid::new_v4(),
            name: "Development".into(),
            min_amount: 10000.0,
            max_amount: 50000.0,
            min_term_days: 30,
            max_term_days: 365,
            interest_rate: 12.0,
            interest_method: InterestMethod::Flat,
            requires_guarantor: false,
            requires_collateral: false,
            requires_next_of_kin: false,
            is_active: true,
        }
    }

    #[test]
    fn amount_below_minimum_names_the_bound() {
        let product = bounded_product();
        let err = validate_amount("5000", Some(&product)).unwrap_err();
        assert_eq!(err.message, "Loan amount cannot be less than 10000");
    }

    #[test]
    fn amount_above_maximum_names_the_bound() {
        let product = bounded_product();
        let err = validate_amount("50000.01", Some(&product)).unwrap_err();
        assert_eq!(err.message, "Loan amount cannot exceed 50000");
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let product = bounded_product();
        for input in ["10000", "25000.50", "50000"] {
            assert!(validate_amount(input, Some(&product)).is_ok(), "{input}");
        }
    }

    #[test]
    fn amount_rejects_missing_non_numeric_and_non_positive_values() {
        assert_eq!(
            validate_amount("  ", None).unwrap_err().message,
            "Loan amount is required"
        );
        assert_eq!(
            validate_amount("ten", None).unwrap_err().message,
            "Loan amount must be a valid number"
        );
        assert_eq!(
            validate_amount("NaN", None).unwrap_err().message,
            "Loan amount must be a valid number"
        );
        assert_eq!(
            validate_amount("0", None).unwrap_err().message,
            "Loan amount must be greater than 0"
        );
        assert_eq!(validate_amount("750", None).unwrap(), 750.0);
    }

    #[test]
    fn term_rejects_fractions_and_non_positive_values() {
        assert_eq!(
            validate_term_days("10.5", None).unwrap_err().message,
            "Loan term must be a whole number of days"
        );
        assert_eq!(
            validate_term_days("0", None).unwrap_err().message,
            "Loan term must be greater than 0"
        );
        assert_eq!(
            validate_term_days("-3", None).unwrap_err().message,
            "Loan term must be greater than 0"
        );
        assert_eq!(
            validate_term_days("abc", None).unwrap_err().message,
            "Loan term must be a valid number"
        );
    }

    #[test]
    fn term_respects_product_range() {
        let product = bounded_product();
        assert_eq!(validate_term_days("30", Some(&product)).unwrap(), 30);
        assert_eq!(validate_term_days("365", Some(&product)).unwrap(), 365);
        assert_eq!(
            validate_term_days("29", Some(&product)).unwrap_err().message,
            "Loan term cannot be less than 30 days"
        );
        assert_eq!(
            validate_term_days("366", Some(&product)).unwrap_err().message,
            "Loan term cannot exceed 365 days"
        );
    }

    #[test]
    fn phone_accepts_kenyan_mobile_formats() {
        assert_eq!(validate_phone("0712345678").unwrap(), "0712345678");
        assert_eq!(validate_phone("+254712345678").unwrap(), "+254712345678");
        assert_eq!(validate_phone("0112 345 678").unwrap(), "0112345678");
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("0812345678").is_err());
        assert!(validate_phone("+2547123456789").is_err());
        assert_eq!(
            validate_phone("").unwrap_err().message,
            "Phone number is required"
        );
    }

    #[test]
    fn email_requires_local_domain_and_tld() {
        assert!(validate_email("amina@sacco.co.ke").is_ok());
        assert!(validate_email("amina@sacco").is_err());
        assert!(validate_email("amina sacco.co.ke").is_err());
        assert_eq!(validate_email("").unwrap_err().message, "Email is required");
    }

    #[test]
    fn details_validation_collects_every_failure() {
        let product = bounded_product();
        let draft = ApplicationDraft {
            amount: "5000".into(),
            term_days: "10.5".into(),
            mobile_number: "12345".into(),
            ..ApplicationDraft::default()
        };

        let errors = validate_details(&draft, Some(&product)).unwrap_err();
        assert_eq!(
            errors.get(fields::AMOUNT),
            Some("Loan amount cannot be less than 10000")
        );
        assert!(errors.contains(fields::TERM_DAYS));
        assert!(errors.contains(fields::MOBILE_NUMBER));
        assert!(errors.contains(fields::OCCUPATION));
        assert!(errors.contains(fields::EMAIL));
        assert!(!errors.contains(fields::PRODUCT));
    }

    #[test]
    fn line_item_errors_are_keyed_by_position() {
        let items = vec![
            Guarantor {
                name: "Achieng".into(),
                relationship: "Sister".into(),
                contact: "0722000111".into(),
                id_number: "12345678".into(),
                guaranteed_amount: 5000.0,
            },
            Guarantor {
                name: "Mwangi".into(),
                guaranteed_amount: 0.0,
                ..Guarantor::default()
            },
        ];

        let errors = validate_line_items(LineItemKind::Guarantor, &items).unwrap_err();
        assert_eq!(
            errors.get("guarantors[2].guaranteedAmount"),
            Some("Guaranteed amount must be greater than 0")
        );
        assert!(errors.contains("guarantors[2].idNumber"));
        assert!(!errors.iter().any(|(field, _)| field.starts_with("guarantors[1]")));
    }

    #[test]
    fn next_of_kin_email_is_optional_but_checked_when_given() {
        let mut kin = NextOfKin {
            name: "Njeri".into(),
            relationship: "Mother".into(),
            phone: "0700111222".into(),
            email: None,
            address: "Nyeri".into(),
        };
        assert!(kin.validate().is_ok());
        kin.email = Some("not-an-email".into());
        let errors = kin.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));
    }
}
