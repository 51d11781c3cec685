//! Read-only aggregation shown on the Review step.

use sacco_domain::{
    ApplicantDetails, Collateral, Guarantor, InterestMethod, LoanApplicationId, LoanProduct,
    NextOfKin,
};

/// Nominal days per instalment period.
const DAYS_PER_INSTALMENT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepaymentEstimate {
    pub instalments: u32,
    pub instalment_amount: f64,
    pub interest: f64,
    pub total_repayable: f64,
}

/// Estimates repayment for an annual `rate_percent`.
///
/// Flat interest accrues on the full principal for the whole term. Reducing
/// balance amortizes monthly over `ceil(term_days / 30)` instalments.
pub fn estimate_repayment(
    amount: f64,
    term_days: u32,
    rate_percent: f64,
    method: InterestMethod,
) -> RepaymentEstimate {
    let instalments = term_days.div_ceil(DAYS_PER_INSTALMENT).max(1);
    let (instalment_amount, total_repayable) = match method {
        InterestMethod::Flat => {
            let interest = amount * rate_percent / 100.0 * f64::from(term_days) / 365.0;
            let total = amount + interest;
            (total / f64::from(instalments), total)
        }
        InterestMethod::ReducingBalance => {
            let periodic = rate_percent / 100.0 / 12.0;
            let instalment = if periodic.abs() < f64::EPSILON {
                amount / f64::from(instalments)
            } else {
                amount * periodic / (1.0 - (1.0 + periodic).powi(-(instalments as i32)))
            };
            (instalment, instalment * f64::from(instalments))
        }
    };
    RepaymentEstimate {
        instalments,
        instalment_amount: round_cents(instalment_amount),
        interest: round_cents(total_repayable - amount),
        total_repayable: round_cents(total_repayable),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub application_id: LoanApplicationId,
    pub product: LoanProduct,
    pub applicant: ApplicantDetails,
    pub amount: f64,
    pub term_days: u32,
    pub loan_purpose: String,
    pub estimate: RepaymentEstimate,
    pub guarantors: Vec<Guarantor>,
    pub collaterals: Vec<Collateral>,
    pub next_of_kin: Vec<NextOfKin>,
}

impl ReviewSummary {
    pub fn total_guaranteed(&self) -> f64 {
        self.guarantors
            .iter()
            .map(|guarantor| guarantor.guaranteed_amount)
            .sum()
    }

    pub fn total_collateral_value(&self) -> f64 {
        self.collaterals
            .iter()
            .map(|collateral| collateral.estimated_value)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_interest_accrues_on_full_principal() {
        let estimate = estimate_repayment(10000.0, 365, 12.0, InterestMethod::Flat);
        assert_eq!(estimate.interest, 1200.0);
        assert_eq!(estimate.total_repayable, 11200.0);
        assert_eq!(estimate.instalments, 13);
    }

    #[test]
    fn reducing_balance_amortizes_monthly() {
        let estimate = estimate_repayment(12000.0, 360, 12.0, InterestMethod::ReducingBalance);
        assert_eq!(estimate.instalments, 12);
        assert!((estimate.instalment_amount - 1066.19).abs() < 0.01);
        assert!(estimate.interest > 0.0 && estimate.interest < 1440.0);
    }

    #[test]
    fn zero_rate_splits_principal_evenly() {
        let estimate = estimate_repayment(3000.0, 90, 0.0, InterestMethod::ReducingBalance);
        assert_eq!(estimate.instalments, 3);
        assert_eq!(estimate.instalment_amount, 1000.0);
        assert_eq!(estimate.interest, 0.0);
    }
}
