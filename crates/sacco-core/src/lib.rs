//! sacco-core
//!
//! Loan application wizard engine: field validators, step planning, the draft
//! store, the submission state machine, and navigation.
//! Depends on sacco-domain. No terminal I/O, no concrete transport.

pub mod api;
pub mod coordinator;
pub mod draft_store;
pub mod error;
pub mod navigation;
pub mod notify;
pub mod phase;
pub mod planner;
pub mod review;
pub mod session;
pub mod validation;

pub use api::*;
pub use coordinator::*;
pub use draft_store::*;
pub use error::{ApiError, WizardError};
pub use navigation::*;
pub use notify::*;
pub use phase::PhaseItem;
pub use planner::*;
pub use review::*;
pub use session::*;
pub use validation::*;
