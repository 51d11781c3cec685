//! Collaborator contracts consumed by the wizard, plus an in-memory backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sacco_domain::{
    ApplicantProfile, ApplicantType, ApplicationReceipt, Collateral, Guarantor, IdentityClaims,
    LineItemSubmission, LoanApplicationId, LoanApplicationRequest, LoanProduct, NextOfKin,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Remote loan service. Every call is awaited to completion; the engine never
/// cancels, times out, or retries.
#[async_trait]
pub trait LoanApi: Send + Sync {
    async fn list_active_loan_products(
        &self,
        applicant_type: ApplicantType,
    ) -> Result<Vec<LoanProduct>, ApiError>;

    async fn create_loan_application(
        &self,
        request: &LoanApplicationRequest,
    ) -> Result<ApplicationReceipt, ApiError>;

    async fn add_guarantor(
        &self,
        submission: &LineItemSubmission<'_, Guarantor>,
    ) -> Result<(), ApiError>;

    async fn add_collateral(
        &self,
        submission: &LineItemSubmission<'_, Collateral>,
    ) -> Result<(), ApiError>;

    async fn add_next_of_kin(
        &self,
        submission: &LineItemSubmission<'_, NextOfKin>,
    ) -> Result<(), ApiError>;
}

/// Supplies the signed-in applicant. Looked up at each submission, never cached.
pub trait ProfileSource: Send + Sync {
    fn identity(&self) -> Option<IdentityClaims>;

    fn profile(&self) -> Option<ApplicantProfile> {
        None
    }
}

/// Fixed identity and profile, e.g. decoded once from a token at start-up.
#[derive(Debug, Clone, Default)]
pub struct StaticProfileSource {
    identity: Option<IdentityClaims>,
    profile: Option<ApplicantProfile>,
}

impl StaticProfileSource {
    pub fn new(identity: Option<IdentityClaims>, profile: Option<ApplicantProfile>) -> Self {
        Self { identity, profile }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl ProfileSource for StaticProfileSource {
    fn identity(&self) -> Option<IdentityClaims> {
        self.identity.clone()
    }

    fn profile(&self) -> Option<ApplicantProfile> {
        self.profile.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCall {
    ListProducts,
    CreateApplication,
    AddGuarantor,
    AddCollateral,
    AddNextOfKin,
}

#[derive(Debug, Default)]
struct InMemoryState {
    calls: Vec<ApiCall>,
    counts: HashMap<ApiCall, usize>,
    failures: HashMap<(ApiCall, usize), ApiError>,
    applications: Vec<(LoanApplicationId, LoanApplicationRequest)>,
    guarantors: Vec<(LoanApplicationId, Guarantor)>,
    collaterals: Vec<(LoanApplicationId, Collateral)>,
    next_of_kin: Vec<(LoanApplicationId, NextOfKin)>,
}

impl InMemoryState {
    /// Records the call and returns the injected failure for this occurrence.
    fn record(&mut self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.push(call);
        let count = self.counts.entry(call).or_insert(0);
        *count += 1;
        match self.failures.remove(&(call, *count)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn require_application(&self, id: LoanApplicationId) -> Result<(), ApiError> {
        if self.applications.iter().any(|(known, _)| *known == id) {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                status: 404,
                message: format!("loan application {id} not found"),
            })
        }
    }
}

/// Process-local `LoanApi` that keeps everything it receives.
///
/// Failures can be scheduled per call type and occurrence, which makes
/// partial-commit behaviour reproducible.
#[derive(Debug, Default)]
pub struct InMemoryLoanApi {
    products: Vec<LoanProduct>,
    state: Mutex<InMemoryState>,
}

impl InMemoryLoanApi {
    pub fn new(products: Vec<LoanProduct>) -> Self {
        Self {
            products,
            state: Mutex::new(InMemoryState::default()),
        }
    }

    /// Makes the `occurrence`-th (1-based) invocation of `call` fail with `error`.
    pub fn fail_on(&self, call: ApiCall, occurrence: usize, error: ApiError) {
        self.state().failures.insert((call, occurrence), error);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, call: ApiCall) -> usize {
        self.state().counts.get(&call).copied().unwrap_or(0)
    }

    pub fn applications(&self) -> Vec<(LoanApplicationId, LoanApplicationRequest)> {
        self.state().applications.clone()
    }

    pub fn guarantors(&self) -> Vec<(LoanApplicationId, Guarantor)> {
        self.state().guarantors.clone()
    }

    pub fn collaterals(&self) -> Vec<(LoanApplicationId, Collateral)> {
        self.state().collaterals.clone()
    }

    pub fn next_of_kin(&self) -> Vec<(LoanApplicationId, NextOfKin)> {
        self.state().next_of_kin.clone()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LoanApi for InMemoryLoanApi {
    async fn list_active_loan_products(
        &self,
        _applicant_type: ApplicantType,
    ) -> Result<Vec<LoanProduct>, ApiError> {
        self.state().record(ApiCall::ListProducts)?;
        Ok(self
            .products
            .iter()
            .filter(|product| product.is_active)
            .cloned()
            .collect())
    }

    async fn create_loan_application(
        &self,
        request: &LoanApplicationRequest,
    ) -> Result<ApplicationReceipt, ApiError> {
        let mut state = self.state();
        state.record(ApiCall::CreateApplication)?;
        let id = LoanApplicationId::new(Uuid::new_v4());
        state.applications.push((id, request.clone()));
        Ok(ApplicationReceipt {
            loan_application_id: id,
        })
    }

    async fn add_guarantor(
        &self,
        submission: &LineItemSubmission<'_, Guarantor>,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.record(ApiCall::AddGuarantor)?;
        state.require_application(submission.loan_application_id)?;
        state
            .guarantors
            .push((submission.loan_application_id, submission.item.clone()));
        Ok(())
    }

    async fn add_collateral(
        &self,
        submission: &LineItemSubmission<'_, Collateral>,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.record(ApiCall::AddCollateral)?;
        state.require_application(submission.loan_application_id)?;
        state
            .collaterals
            .push((submission.loan_application_id, submission.item.clone()));
        Ok(())
    }

    async fn add_next_of_kin(
        &self,
        submission: &LineItemSubmission<'_, NextOfKin>,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.record(ApiCall::AddNextOfKin)?;
        state.require_application(submission.loan_application_id)?;
        state
            .next_of_kin
            .push((submission.loan_application_id, submission.item.clone()));
        Ok(())
    }
}
