use sacco_config::ConfigError;
use sacco_core::{ApiError, WizardError};
use thiserror::Error;

use crate::identity::IdentityError;

/// Failures surfaced by the command-line front-end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid access token: {0}")]
    Identity(#[from] IdentityError),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Input ended before the wizard finished")]
    InputClosed,
}
