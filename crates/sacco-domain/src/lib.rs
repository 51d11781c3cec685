//! sacco-domain
//!
//! Pure domain models for loan applications (products, drafts, line items, identity).
//! No I/O, no network, no validation. Only data types and core enums.

pub mod common;
pub mod draft;
pub mod identity;
pub mod line_item;
pub mod product;

pub use common::*;
pub use draft::*;
pub use identity::*;
pub use line_item::*;
pub use product::*;
