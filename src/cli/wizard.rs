//! Step-by-step console driver over a `WizardSession`.

use chrono::NaiveDate;
use sacco_core::{format_amount, PhaseItem, ReviewSummary, WizardError, WizardSession, WizardStep};
use sacco_domain::{Collateral, Displayable, Gender, Guarantor, LineItemKind, NextOfKin};

use crate::cli::output;
use crate::cli::prompt::Prompter;
use crate::errors::CliError;

const EXIT: &str = "Exit";
const BACK: &str = "Back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Runs until the applicant exits or input ends.
pub async fn run_wizard(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<(), CliError> {
    if !load_products(session, prompter).await? {
        return Ok(());
    }
    if session.prefill_from_profile()? {
        output::info("Details prefilled from your profile.");
    }

    loop {
        let plan = session.plan();
        output::section(format!(
            "Step {} of {}: {}",
            session.current_step(),
            plan.total_steps(),
            session.current_step_kind()
        ));
        let control = match session.current_step_kind() {
            WizardStep::Product => product_step(session, prompter)?,
            WizardStep::Details => details_step(session, prompter).await?,
            WizardStep::Guarantors => line_item_step::<Guarantor>(session, prompter).await?,
            WizardStep::Collateral => line_item_step::<Collateral>(session, prompter).await?,
            WizardStep::NextOfKin => line_item_step::<NextOfKin>(session, prompter).await?,
            WizardStep::Review => review_step(session, prompter)?,
        };
        if control == LoopControl::Exit {
            output::info("Goodbye.");
            return Ok(());
        }
    }
}

/// Shows errors the notifier has not already reported.
fn report(err: &WizardError) {
    match err {
        WizardError::Api(_) | WizardError::PhaseFailed { .. } | WizardError::MissingIdentity => {}
        WizardError::Validation(errors) => {
            output::warning("Please correct the following:");
            for (field, message) in errors.iter() {
                output::warning(format!("  {field}: {message}"));
            }
        }
        other => output::warning(other),
    }
}

async fn load_products(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<bool, CliError> {
    loop {
        match session.load_products().await {
            Ok(products) if products.is_empty() => {
                output::warning("No loan products are currently available.");
                return Ok(false);
            }
            Ok(_) => return Ok(true),
            Err(_) => {
                if !prompter.confirm("Try loading products again?", true)? {
                    return Ok(false);
                }
            }
        }
    }
}

fn product_step(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<LoopControl, CliError> {
    let products = session.products().to_vec();
    let mut options: Vec<String> = products
        .iter()
        .map(|product| {
            format!(
                "{} ({} to {}, {} to {} days, {}% {})",
                product.name,
                format_amount(product.min_amount),
                format_amount(product.max_amount),
                product.min_term_days,
                product.max_term_days,
                product.interest_rate,
                product.interest_method
            )
        })
        .collect();
    options.push(EXIT.to_string());

    let choice = prompter.select("Choose a loan product", &options)?;
    let Some(product) = products.get(choice) else {
        return Ok(LoopControl::Exit);
    };
    if let Err(err) = session
        .select_product(product.id)
        .and_then(|_| session.next().map(drop))
    {
        report(&err);
    }
    Ok(LoopControl::Continue)
}

async fn details_step(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<LoopControl, CliError> {
    if !session.can_submit_application() {
        if let Err(err) = session.next() {
            report(&err);
        }
        return Ok(LoopControl::Continue);
    }

    let options = vec![
        "Enter details and submit".to_string(),
        BACK.to_string(),
        EXIT.to_string(),
    ];
    match prompter.select("Loan details", &options)? {
        0 => {}
        1 => {
            if let Err(err) = session.prev() {
                report(&err);
            }
            return Ok(LoopControl::Continue);
        }
        _ => return Ok(LoopControl::Exit),
    }

    collect_details(session, prompter)?;
    if let Err(err) = session.advance().await {
        report(&err);
    }
    Ok(LoopControl::Continue)
}

fn collect_details(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<(), CliError> {
    let mut draft = session.draft().clone();
    draft.amount = prompter.text("Loan amount", Some(&draft.amount))?;
    draft.term_days = prompter.text("Loan term (days)", Some(&draft.term_days))?;
    draft.mobile_number = prompter.text("Mobile number", Some(&draft.mobile_number))?;
    draft.occupation = prompter.text("Occupation", Some(&draft.occupation))?;
    draft.loan_purpose = prompter.text("Loan purpose", Some(&draft.loan_purpose))?;
    let applicant = &mut draft.applicant;
    applicant.first_name = prompter.text("First name", Some(&applicant.first_name))?;
    applicant.last_name = prompter.text("Last name", Some(&applicant.last_name))?;
    applicant.email = prompter.text("Email", Some(&applicant.email))?;
    applicant.address = prompter.text("Address", Some(&applicant.address))?;

    let dob_default = applicant
        .date_of_birth
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    applicant.date_of_birth = prompt_date_of_birth(prompter, &dob_default)?;

    let gender = prompter.text("Gender (male/female/other, optional)", None)?;
    if let Some(parsed) = parse_gender(&gender) {
        applicant.gender = Some(parsed);
    }

    session.update_draft(|current| *current = draft)?;
    Ok(())
}

/// Blank clears the date; anything else must be a valid `YYYY-MM-DD`.
fn parse_date_of_birth(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Some)
}

fn prompt_date_of_birth(
    prompter: &mut dyn Prompter,
    default: &str,
) -> Result<Option<NaiveDate>, CliError> {
    loop {
        let raw = prompter.text("Date of birth (YYYY-MM-DD, optional)", Some(default))?;
        match parse_date_of_birth(&raw) {
            Ok(date) => return Ok(date),
            Err(_) => output::warning(format!(
                "`{}` is not a date in YYYY-MM-DD form",
                raw.trim()
            )),
        }
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value.trim().to_ascii_lowercase().as_str() {
        "male" | "m" => Some(Gender::Male),
        "female" | "f" => Some(Gender::Female),
        "other" | "o" => Some(Gender::Other),
        _ => None,
    }
}

/// Console form for one line item.
trait ItemForm: PhaseItem + Displayable {
    fn prompt(prompter: &mut dyn Prompter) -> Result<Self, CliError>;
}

fn prompt_amount(prompter: &mut dyn Prompter, label: &str) -> Result<f64, CliError> {
    loop {
        let raw = prompter.text(label, None)?;
        match raw.trim().replace(',', "").parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(value),
            _ => output::warning(format!("{label} must be a number")),
        }
    }
}

impl ItemForm for Guarantor {
    fn prompt(prompter: &mut dyn Prompter) -> Result<Self, CliError> {
        Ok(Guarantor {
            name: prompter.text("Guarantor name", None)?,
            relationship: prompter.text("Relationship", None)?,
            contact: prompter.text("Contact", None)?,
            id_number: prompter.text("ID number", None)?,
            guaranteed_amount: prompt_amount(prompter, "Guaranteed amount")?,
        })
    }
}

impl ItemForm for Collateral {
    fn prompt(prompter: &mut dyn Prompter) -> Result<Self, CliError> {
        Ok(Collateral {
            collateral_type: prompter.text("Collateral type", None)?,
            description: prompter.text("Description", None)?,
            estimated_value: prompt_amount(prompter, "Estimated value")?,
            owner_name: prompter.text("Owner name", None)?,
            owner_contact: prompter.text("Owner contact", None)?,
        })
    }
}

impl ItemForm for NextOfKin {
    fn prompt(prompter: &mut dyn Prompter) -> Result<Self, CliError> {
        let name = prompter.text("Name", None)?;
        let relationship = prompter.text("Relationship", None)?;
        let phone = prompter.text("Phone", None)?;
        let email = prompter.text("Email (optional)", None)?;
        Ok(NextOfKin {
            name,
            relationship,
            phone,
            email: (!email.trim().is_empty()).then_some(email),
            address: prompter.text("Address", None)?,
        })
    }
}

async fn line_item_step<T: ItemForm>(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<LoopControl, CliError> {
    let kind = T::KIND;
    let list = session.items::<T>();
    if list.is_empty() {
        output::info(format!("No {} added yet.", kind.plural()));
    }
    for (index, item) in list.items().iter().enumerate() {
        let marker = if index < list.persisted() { " (saved)" } else { "" };
        output::info(format!("{}. {}{}", index + 1, item.display_label(), marker));
    }

    let committed = list.is_locked();
    let removable = list.len() > list.persisted();
    let mut options = Vec::new();
    if committed {
        options.push("Continue".to_string());
    } else {
        options.push(format!("Add {}", singular(kind)));
        if removable {
            options.push(format!("Remove {}", singular(kind)));
        }
        options.push("Save and continue".to_string());
    }
    options.push(BACK.to_string());
    options.push(EXIT.to_string());

    let choice = prompter.select(&format!("{kind} actions"), &options)?;
    let result = match options[choice].as_str() {
        EXIT => return Ok(LoopControl::Exit),
        BACK => session.prev().map(drop),
        "Continue" => session.next().map(drop),
        "Save and continue" => session.advance().await.map(drop),
        label if label.starts_with("Add") => {
            let item = T::prompt(prompter)?;
            session.add_item(item).map(drop)
        }
        _ => {
            let position = prompter.text("Position to remove", None)?;
            match position.trim().parse::<usize>() {
                Ok(position) => session.remove_item::<T>(position).map(drop),
                Err(_) => {
                    output::warning("Enter the number shown next to the entry.");
                    Ok(())
                }
            }
        }
    };
    if let Err(err) = result {
        report(&err);
    }
    Ok(LoopControl::Continue)
}

fn singular(kind: LineItemKind) -> &'static str {
    match kind {
        LineItemKind::Guarantor => "guarantor",
        LineItemKind::Collateral => "collateral",
        LineItemKind::NextOfKin => "next of kin",
    }
}

fn review_step(
    session: &mut WizardSession,
    prompter: &mut dyn Prompter,
) -> Result<LoopControl, CliError> {
    match session.review_summary() {
        Some(summary) => print_summary(&summary),
        None => output::warning("The application is not ready for review yet."),
    }

    let options = vec!["Start a new application".to_string(), EXIT.to_string()];
    if prompter.select("What next?", &options)? == 0 {
        session.start_new_application();
        return Ok(LoopControl::Continue);
    }
    Ok(LoopControl::Exit)
}

fn print_summary(summary: &ReviewSummary) {
    output::info(format!("Reference: {}", summary.application_id));
    output::info(format!("Product: {}", summary.product.name));
    output::info(format!("Applicant: {}", summary.applicant.full_name()));
    output::info(format!(
        "Amount: {} over {} days",
        format_amount(summary.amount),
        summary.term_days
    ));
    output::info(format!("Purpose: {}", summary.loan_purpose));
    output::info(format!(
        "Estimated repayment: {} instalments of {} (interest {}, total {})",
        summary.estimate.instalments,
        format_amount(summary.estimate.instalment_amount),
        format_amount(summary.estimate.interest),
        format_amount(summary.estimate.total_repayable)
    ));
    if !summary.guarantors.is_empty() {
        output::info(format!(
            "Guarantors: {} (total guaranteed {})",
            summary.guarantors.len(),
            format_amount(summary.total_guaranteed())
        ));
    }
    if !summary.collaterals.is_empty() {
        output::info(format!(
            "Collateral: {} (total value {})",
            summary.collaterals.len(),
            format_amount(summary.total_collateral_value())
        ));
    }
    if !summary.next_of_kin.is_empty() {
        output::info(format!("Next of kin: {}", summary.next_of_kin.len()));
    }
    output::success("Your application has been received.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_of_birth_is_optional_but_must_be_valid() {
        assert_eq!(parse_date_of_birth("  "), Ok(None));
        assert_eq!(
            parse_date_of_birth("1990-02-28"),
            Ok(NaiveDate::from_ymd_opt(1990, 2, 28))
        );
        assert!(parse_date_of_birth("28/02/1990").is_err());
        assert!(parse_date_of_birth("1990-02-30").is_err());
    }

    #[test]
    fn gender_accepts_short_forms() {
        assert_eq!(parse_gender("F"), Some(Gender::Female));
        assert_eq!(parse_gender(" male "), Some(Gender::Male));
        assert_eq!(parse_gender(""), None);
    }
}
