//! Offline data for `--demo`: a fixed product catalogue and a signed-in
//! sample member.

use sacco_core::{InMemoryLoanApi, StaticProfileSource};
use sacco_domain::{ApplicantProfile, Gender, IdentityClaims, InterestMethod, LoanProduct};
use uuid::Uuid;

fn product(
    id: u128,
    name: &str,
    amounts: (f64, f64),
    terms: (u32, u32),
    rate: (f64, InterestMethod),
    requires: (bool, bool, bool),
) -> LoanProduct {
    LoanProduct {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        min_amount: amounts.0,
        max_amount: amounts.1,
        min_term_days: terms.0,
        max_term_days: terms.1,
        interest_rate: rate.0,
        interest_method: rate.1,
        requires_guarantor: requires.0,
        requires_collateral: requires.1,
        requires_next_of_kin: requires.2,
        is_active: true,
    }
}

pub fn products() -> Vec<LoanProduct> {
    vec![
        product(
            1,
            "Salary Advance",
            (1000.0, 50000.0),
            (7, 90),
            (10.0, InterestMethod::Flat),
            (false, false, false),
        ),
        product(
            2,
            "Biashara Loan",
            (10000.0, 500000.0),
            (90, 730),
            (14.0, InterestMethod::ReducingBalance),
            (true, false, true),
        ),
        product(
            3,
            "Asset Finance",
            (50000.0, 2000000.0),
            (180, 1095),
            (16.0, InterestMethod::ReducingBalance),
            (true, true, true),
        ),
    ]
}

pub fn api() -> InMemoryLoanApi {
    InMemoryLoanApi::new(products())
}

pub fn profile_source() -> StaticProfileSource {
    let identity = IdentityClaims {
        email: Some("wanjiku.kamau@example.co.ke".into()),
        name: Some("Wanjiku Kamau".into()),
        ..IdentityClaims::new("demo-user").with_member_id("M-00042")
    };
    let profile = ApplicantProfile {
        first_name: "Wanjiku".into(),
        last_name: "Kamau".into(),
        email: "wanjiku.kamau@example.co.ke".into(),
        phone: "0712345678".into(),
        address: "Moi Avenue, Nairobi".into(),
        occupation: "Teacher".into(),
        date_of_birth: None,
        gender: Some(Gender::Female),
    };
    StaticProfileSource::new(Some(identity), Some(profile))
}
