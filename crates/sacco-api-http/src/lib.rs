//! sacco-api-http
//!
//! `LoanApi` over the cooperative's REST backend.

pub mod client;

pub use client::HttpLoanApi;
