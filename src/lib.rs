#![doc(test(attr(deny(warnings))))]

//! Loan Wizard walks a cooperative member through a multi-step loan
//! application: product choice, applicant details, guarantors, collateral,
//! next of kin, and a final review.

pub mod cli;
pub mod errors;
pub mod identity;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Default `EnvFilter` directive when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "loan_wizard=info,sacco_core=info,sacco_api_http=info";

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(DEFAULT_LOG_FILTER);
}

/// Initializes global tracing once; later calls are ignored.
pub fn init_with_filter(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("Loan wizard tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter("not a directive ===");
    }
}
