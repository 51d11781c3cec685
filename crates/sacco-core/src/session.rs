//! One applicant's wizard run: draft store, coordinator, and navigation wired
//! to the injected collaborators.
//!
//! Every mutating operation takes `&mut self`, so a second submission cannot
//! start while one is in flight.

use std::sync::Arc;

use sacco_domain::{
    ApplicantType, ApplicationDraft, IdentityClaims, LineItemKind, LoanApplicationId,
    LoanApplicationRequest, LoanProduct,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{LoanApi, ProfileSource};
use crate::coordinator::{PhaseReport, PhaseRetry, SubmissionCoordinator, SubmissionState};
use crate::draft_store::{DraftStore, LineItemList};
use crate::error::WizardError;
use crate::navigation::Navigator;
use crate::notify::{Notification, Notifier};
use crate::phase::PhaseItem;
use crate::planner::{StepPlan, WizardStep};
use crate::review::{estimate_repayment, ReviewSummary};
use crate::validation::{validate_details, ValidatedDetails, ValidationErrors};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub applicant_type: ApplicantType,
    pub retry: PhaseRetry,
}

pub struct WizardSession {
    api: Arc<dyn LoanApi>,
    profile: Arc<dyn ProfileSource>,
    notifier: Arc<dyn Notifier>,
    applicant_type: ApplicantType,
    products: Vec<LoanProduct>,
    store: DraftStore,
    coordinator: SubmissionCoordinator,
    navigator: Navigator,
}

impl WizardSession {
    pub fn new(
        api: Arc<dyn LoanApi>,
        profile: Arc<dyn ProfileSource>,
        notifier: Arc<dyn Notifier>,
        options: SessionOptions,
    ) -> Self {
        Self {
            api,
            profile,
            notifier,
            applicant_type: options.applicant_type,
            products: Vec::new(),
            store: DraftStore::new(),
            coordinator: SubmissionCoordinator::new(options.retry),
            navigator: Navigator::new(),
        }
    }

    pub fn applicant_type(&self) -> ApplicantType {
        self.applicant_type
    }

    pub fn products(&self) -> &[LoanProduct] {
        &self.products
    }

    pub fn product(&self) -> Option<&LoanProduct> {
        self.store.product()
    }

    pub fn draft(&self) -> &ApplicationDraft {
        self.store.draft()
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn state(&self) -> SubmissionState {
        self.coordinator.state()
    }

    pub fn application_id(&self) -> Option<LoanApplicationId> {
        self.coordinator.application_id()
    }

    pub fn can_submit_application(&self) -> bool {
        self.coordinator.can_submit_application()
    }

    pub fn plan(&self) -> StepPlan {
        StepPlan::for_product(self.store.product())
    }

    pub fn current_step(&self) -> usize {
        self.navigator.current()
    }

    pub fn current_step_kind(&self) -> WizardStep {
        self.plan()
            .step_at(self.navigator.current())
            .unwrap_or(WizardStep::Product)
    }

    fn report(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Fetches the products offered to this session's applicant type.
    /// Inactive products are dropped even if the server returns them.
    pub async fn load_products(&mut self) -> Result<&[LoanProduct], WizardError> {
        match self
            .api
            .list_active_loan_products(self.applicant_type)
            .await
        {
            Ok(products) => {
                self.products = products
                    .into_iter()
                    .filter(|product| product.is_active)
                    .collect();
                debug!(count = self.products.len(), "loan products loaded");
                Ok(&self.products)
            }
            Err(err) => {
                self.report(Notification::error(format!(
                    "Failed to load loan products: {err}"
                )));
                Err(WizardError::Api(err))
            }
        }
    }

    pub fn select_product(&mut self, product_id: Uuid) -> Result<(), WizardError> {
        let product = self
            .products
            .iter()
            .find(|product| product.id == product_id)
            .cloned()
            .ok_or_else(|| WizardError::ProductUnavailable(product_id.to_string()))?;
        let requirements = product.requirements();
        self.store.select_product(product)?;
        self.coordinator.set_requirements(requirements)?;
        self.navigator.clamp(&self.plan());
        Ok(())
    }

    /// Fills blank applicant fields from the profile source, if it has one.
    pub fn prefill_from_profile(&mut self) -> Result<bool, WizardError> {
        match self.profile.profile() {
            Some(profile) => self.store.prefill(&profile),
            None => Ok(false),
        }
    }

    pub fn update_draft<F>(&mut self, edit: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut ApplicationDraft),
    {
        self.store.update_draft(edit)
    }

    pub fn validate_details(&self) -> Result<ValidatedDetails, ValidationErrors> {
        validate_details(self.store.draft(), self.store.product())
    }

    fn require_identity(&self, action: &str) -> Result<IdentityClaims, WizardError> {
        self.profile.identity().ok_or_else(|| {
            self.report(Notification::error(format!(
                "Cannot {action}: {}",
                WizardError::MissingIdentity
            )));
            WizardError::MissingIdentity
        })
    }

    fn build_request(
        &self,
        product: &LoanProduct,
        details: ValidatedDetails,
        identity: IdentityClaims,
    ) -> LoanApplicationRequest {
        let draft = self.store.draft();
        LoanApplicationRequest {
            product_id: product.id,
            applicant_type: self.applicant_type,
            owner_id: identity.user_id,
            member_id: identity.member_id,
            amount: details.amount,
            term_days: details.term_days,
            mobile_number: details.mobile_number,
            occupation: draft.occupation.trim().to_string(),
            loan_purpose: draft.loan_purpose.trim().to_string(),
            first_name: draft.applicant.first_name.trim().to_string(),
            last_name: draft.applicant.last_name.trim().to_string(),
            email: draft.applicant.email.trim().to_string(),
            address: draft.applicant.address.trim().to_string(),
            date_of_birth: draft.applicant.date_of_birth,
            gender: draft.applicant.gender,
            group_id: draft
                .group_id
                .as_deref()
                .map(str::trim)
                .filter(|group| !group.is_empty())
                .map(str::to_string),
        }
    }

    /// `Drafting → Submitted`: validates the Details step, stamps the owner
    /// from the identity source, and creates the application.
    pub async fn submit_application(&mut self) -> Result<LoanApplicationId, WizardError> {
        if !self.coordinator.can_submit_application() {
            return Err(WizardError::AlreadySubmitted);
        }
        let product = self
            .store
            .product()
            .cloned()
            .ok_or(WizardError::NoProductSelected)?;
        let details = self.validate_details().map_err(WizardError::Validation)?;
        let identity = self.require_identity("submit the loan application")?;
        let request = self.build_request(&product, details, identity);

        match self
            .coordinator
            .submit_application(self.api.as_ref(), &request)
            .await
        {
            Ok(id) => {
                self.store.seal();
                self.report(Notification::success(format!(
                    "Loan application submitted (reference {id})"
                )));
                Ok(id)
            }
            Err(err) => {
                self.report(Notification::error(format!(
                    "Failed to submit loan application: {err}"
                )));
                Err(err)
            }
        }
    }

    pub fn items<T: PhaseItem>(&self) -> &LineItemList<T> {
        self.store.items::<T>()
    }

    pub fn add_item<T: PhaseItem>(&mut self, item: T) -> Result<usize, WizardError> {
        self.store.add_item(item)
    }

    pub fn remove_item<T: PhaseItem>(&mut self, position: usize) -> Result<T, WizardError> {
        self.store.remove_item(position)
    }

    /// Persists every item of `T`'s phase, one at a time.
    ///
    /// A failure part-way leaves the earlier items on the server; it is
    /// reported once and the phase stays pending.
    pub async fn submit_items<T: PhaseItem>(&mut self) -> Result<PhaseReport, WizardError> {
        let kind = T::KIND;
        self.require_identity(&format!("save the {}", kind.plural()))?;
        let result = self
            .coordinator
            .submit_phase(self.api.as_ref(), T::list_mut(&mut self.store))
            .await;
        match &result {
            Ok(report) => {
                self.report(Notification::success(format!(
                    "Saved {} {}",
                    report.total,
                    kind.plural()
                )));
            }
            Err(err @ (WizardError::PhaseFailed { .. } | WizardError::Api(_))) => {
                self.report(Notification::error(format!(
                    "Failed to save {}: {err}",
                    kind.plural()
                )));
            }
            Err(_) => {}
        }
        result
    }

    pub async fn submit_guarantors(&mut self) -> Result<PhaseReport, WizardError> {
        self.submit_items::<sacco_domain::Guarantor>().await
    }

    pub async fn submit_collaterals(&mut self) -> Result<PhaseReport, WizardError> {
        self.submit_items::<sacco_domain::Collateral>().await
    }

    pub async fn submit_next_of_kin(&mut self) -> Result<PhaseReport, WizardError> {
        self.submit_items::<sacco_domain::NextOfKin>().await
    }

    async fn submit_kind(&mut self, kind: LineItemKind) -> Result<PhaseReport, WizardError> {
        match kind {
            LineItemKind::Guarantor => self.submit_guarantors().await,
            LineItemKind::Collateral => self.submit_collaterals().await,
            LineItemKind::NextOfKin => self.submit_next_of_kin().await,
        }
    }

    fn line_item_count(&self, kind: LineItemKind) -> usize {
        match kind {
            LineItemKind::Guarantor => self.store.items::<sacco_domain::Guarantor>().len(),
            LineItemKind::Collateral => self.store.items::<sacco_domain::Collateral>().len(),
            LineItemKind::NextOfKin => self.store.items::<sacco_domain::NextOfKin>().len(),
        }
    }

    /// Aggregates everything collected. Available once the coordinator has
    /// reached `Review`.
    pub fn review_summary(&self) -> Option<ReviewSummary> {
        if self.coordinator.state() != SubmissionState::Review {
            return None;
        }
        let application_id = self.coordinator.application_id()?;
        let product = self.store.product()?.clone();
        let details = self.validate_details().ok()?;
        let draft = self.store.draft();
        Some(ReviewSummary {
            application_id,
            estimate: estimate_repayment(
                details.amount,
                details.term_days,
                product.interest_rate,
                product.interest_method,
            ),
            product,
            applicant: draft.applicant.clone(),
            amount: details.amount,
            term_days: details.term_days,
            loan_purpose: draft.loan_purpose.trim().to_string(),
            guarantors: self.store.items::<sacco_domain::Guarantor>().items().to_vec(),
            collaterals: self.store.items::<sacco_domain::Collateral>().items().to_vec(),
            next_of_kin: self.store.items::<sacco_domain::NextOfKin>().items().to_vec(),
        })
    }

    /// Why the current step cannot be left forwards, if it cannot.
    pub fn forward_gate(&self) -> Result<(), String> {
        match self.current_step_kind() {
            WizardStep::Product => {
                if self.store.product().is_none() {
                    return Err(WizardError::NoProductSelected.to_string());
                }
            }
            WizardStep::Details => {
                if let Err(errors) = self.validate_details() {
                    return Err(format!("Please correct the loan details: {errors}"));
                }
                if !self.coordinator.is_submitted() {
                    return Err(WizardError::NotSubmitted.to_string());
                }
            }
            WizardStep::Guarantors | WizardStep::Collateral | WizardStep::NextOfKin => {
                if let Some(kind) = self.current_step_kind().line_item_kind() {
                    if self.line_item_count(kind) == 0 {
                        return Err(WizardError::NoLineItems(kind).to_string());
                    }
                    if !self.coordinator.is_phase_committed(kind) {
                        return Err(format!(
                            "Save the {} before continuing",
                            kind.plural()
                        ));
                    }
                }
            }
            WizardStep::Review => {}
        }
        Ok(())
    }

    /// Moves to the next step when its precondition holds. Arriving at the
    /// Review step performs the final, network-free transition.
    pub fn next(&mut self) -> Result<usize, WizardError> {
        let plan = self.plan();
        let gate = self.forward_gate();
        let step = self.navigator.next(&plan, gate)?;
        if plan.step_at(step) == Some(WizardStep::Review) && self.coordinator.is_submitted() {
            self.coordinator.enter_review()?;
        }
        info!(step, label = plan.step_at(step).map(WizardStep::label), "wizard step");
        Ok(step)
    }

    pub fn prev(&mut self) -> Result<usize, WizardError> {
        let plan = self.plan();
        Ok(self
            .navigator
            .prev(&plan, self.coordinator.is_submitted())?)
    }

    pub fn go_back_to(&mut self, step: usize) -> Result<usize, WizardError> {
        let plan = self.plan();
        Ok(self
            .navigator
            .go_back_to(step, &plan, self.coordinator.is_submitted())?)
    }

    /// Runs the current step's pending action (application or line-item
    /// submission) and moves forward only if it succeeded.
    pub async fn advance(&mut self) -> Result<usize, WizardError> {
        match self.current_step_kind() {
            WizardStep::Details if self.coordinator.can_submit_application() => {
                self.submit_application().await?;
            }
            step => {
                if let Some(kind) = step.line_item_kind() {
                    if !self.coordinator.is_phase_committed(kind) {
                        self.submit_kind(kind).await?;
                    }
                }
            }
        }
        self.next()
    }

    /// Discards all local state for a fresh attempt. Anything already
    /// persisted server-side is left untouched.
    pub fn start_new_application(&mut self) {
        if let Some(id) = self.coordinator.application_id() {
            if self.coordinator.state() != SubmissionState::Review {
                self.report(Notification::warning(format!(
                    "Application {id} is incomplete; items already saved stay on record"
                )));
            }
        }
        self.store.reset();
        self.coordinator.reset();
        self.navigator.reset();
        self.report(Notification::info("Started a new loan application"));
    }
}
