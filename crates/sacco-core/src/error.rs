use sacco_domain::LineItemKind;
use thiserror::Error;

use crate::coordinator::SubmissionState;
use crate::navigation::NavigationError;
use crate::validation::ValidationErrors;

/// Failures reported by a `LoanApi` collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Select a loan product to continue")]
    NoProductSelected,
    #[error("Loan product not available: {0}")]
    ProductUnavailable(String),
    #[error("Unable to identify the applicant; sign in again before submitting")]
    MissingIdentity,
    #[error("The loan application has already been submitted")]
    AlreadySubmitted,
    #[error("Submit the loan application first")]
    NotSubmitted,
    #[error("{0} details are not required for this loan product")]
    PhaseNotRequired(LineItemKind),
    #[error("The {} have already been saved", .0.plural())]
    PhaseAlreadyCommitted(LineItemKind),
    #[error("Add at least one entry to the {} list", .0.plural())]
    NoLineItems(LineItemKind),
    #[error("{kind} #{position} does not exist")]
    LineItemNotFound { kind: LineItemKind, position: usize },
    #[error("{kind} #{position} has already been saved and cannot be removed")]
    LineItemPosted { kind: LineItemKind, position: usize },
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        from: SubmissionState,
        to: SubmissionState,
    },
    #[error("{0}")]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Saved {persisted} of {total} {} before failing: {source}", .kind.plural())]
    PhaseFailed {
        kind: LineItemKind,
        persisted: usize,
        total: usize,
        source: ApiError,
    },
}

impl WizardError {
    /// Field-level messages when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            WizardError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
