//! Submission state machine.
//!
//! The state records the latest committed phase. The route is derived from the
//! product's requirement flags exactly like the step plan, so a phase whose
//! flag is false is never reachable. Line items are posted one at a time, in
//! order; a failure stops the batch and leaves earlier items persisted.

use std::fmt;

pub use sacco_domain::PhaseRetry;
use sacco_domain::{LineItemKind, LoanApplicationId, LoanApplicationRequest, LoanRequirements};
use tracing::{debug, info, warn};

use crate::api::LoanApi;
use crate::draft_store::LineItemList;
use crate::error::WizardError;
use crate::phase::PhaseItem;
use crate::validation::validate_line_items;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    Drafting,
    Submitted,
    CollectingGuarantors,
    CollectingCollateral,
    CollectingNextOfKin,
    Review,
}

impl SubmissionState {
    /// State reached once the phase for `kind` has been persisted.
    pub fn for_kind(kind: LineItemKind) -> Self {
        match kind {
            LineItemKind::Guarantor => SubmissionState::CollectingGuarantors,
            LineItemKind::Collateral => SubmissionState::CollectingCollateral,
            LineItemKind::NextOfKin => SubmissionState::CollectingNextOfKin,
        }
    }

    pub fn line_item_kind(self) -> Option<LineItemKind> {
        match self {
            SubmissionState::CollectingGuarantors => Some(LineItemKind::Guarantor),
            SubmissionState::CollectingCollateral => Some(LineItemKind::Collateral),
            SubmissionState::CollectingNextOfKin => Some(LineItemKind::NextOfKin),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionState::Drafting => "Drafting",
            SubmissionState::Submitted => "Submitted",
            SubmissionState::CollectingGuarantors => "CollectingGuarantors",
            SubmissionState::CollectingCollateral => "CollectingCollateral",
            SubmissionState::CollectingNextOfKin => "CollectingNextOfKin",
            SubmissionState::Review => "Review",
        };
        f.write_str(label)
    }
}

/// Outcome of a committed line-item phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub kind: LineItemKind,
    /// Items posted by this attempt.
    pub sent: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct SubmissionCoordinator {
    state: SubmissionState,
    requirements: LoanRequirements,
    application_id: Option<LoanApplicationId>,
    retry: PhaseRetry,
}

impl SubmissionCoordinator {
    pub fn new(retry: PhaseRetry) -> Self {
        Self {
            state: SubmissionState::Drafting,
            requirements: LoanRequirements::none(),
            application_id: None,
            retry,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn application_id(&self) -> Option<LoanApplicationId> {
        self.application_id
    }

    /// Fixes the route for the chosen product. Only allowed while drafting.
    pub fn set_requirements(&mut self, requirements: LoanRequirements) -> Result<(), WizardError> {
        if self.state != SubmissionState::Drafting {
            return Err(WizardError::AlreadySubmitted);
        }
        self.requirements = requirements;
        Ok(())
    }

    pub fn route(&self) -> Vec<SubmissionState> {
        let mut route = vec![SubmissionState::Drafting, SubmissionState::Submitted];
        route.extend(
            self.requirements
                .kinds()
                .into_iter()
                .map(SubmissionState::for_kind),
        );
        route.push(SubmissionState::Review);
        route
    }

    fn position(&self, state: SubmissionState) -> Option<usize> {
        self.route().iter().position(|candidate| *candidate == state)
    }

    pub fn next_state(&self) -> Option<SubmissionState> {
        let route = self.route();
        self.position(self.state)
            .and_then(|position| route.get(position + 1))
            .copied()
    }

    /// The line-item phase that must be persisted next, if any.
    pub fn pending_phase(&self) -> Option<LineItemKind> {
        self.next_state().and_then(SubmissionState::line_item_kind)
    }

    pub fn can_submit_application(&self) -> bool {
        self.state == SubmissionState::Drafting
    }

    pub fn is_submitted(&self) -> bool {
        self.state != SubmissionState::Drafting
    }

    pub fn is_phase_committed(&self, kind: LineItemKind) -> bool {
        match (
            self.position(self.state),
            self.position(SubmissionState::for_kind(kind)),
        ) {
            (Some(current), Some(target)) => current >= target,
            _ => false,
        }
    }

    fn transition(&mut self, to: SubmissionState) -> Result<(), WizardError> {
        if self.next_state() != Some(to) {
            return Err(WizardError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        info!(from = %self.state, to = %to, "submission state changed");
        self.state = to;
        Ok(())
    }

    /// `Drafting → Submitted`. On failure nothing changes and no id is kept.
    pub async fn submit_application(
        &mut self,
        api: &dyn LoanApi,
        request: &LoanApplicationRequest,
    ) -> Result<LoanApplicationId, WizardError> {
        if !self.can_submit_application() {
            return Err(WizardError::AlreadySubmitted);
        }
        let receipt = api.create_loan_application(request).await.map_err(|err| {
            warn!(error = %err, "loan application submission failed");
            WizardError::Api(err)
        })?;
        let id = receipt.loan_application_id;
        self.transition(SubmissionState::Submitted)?;
        self.application_id = Some(id);
        info!(application_id = %id, "loan application created");
        Ok(id)
    }

    /// Persists the items of `T`'s phase in order against the captured id.
    ///
    /// The first failing item aborts the remainder. Items posted before it
    /// stay persisted and are counted in the list's bookkeeping; the state
    /// does not move.
    pub async fn submit_phase<T: PhaseItem>(
        &mut self,
        api: &dyn LoanApi,
        list: &mut LineItemList<T>,
    ) -> Result<PhaseReport, WizardError> {
        let kind = T::KIND;
        if !self.requirements.requires(kind) {
            return Err(WizardError::PhaseNotRequired(kind));
        }
        let id = self.application_id.ok_or(WizardError::NotSubmitted)?;
        let target = SubmissionState::for_kind(kind);
        if self.next_state() != Some(target) {
            if self.is_phase_committed(kind) {
                return Err(WizardError::PhaseAlreadyCommitted(kind));
            }
            return Err(WizardError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        if list.is_empty() {
            return Err(WizardError::NoLineItems(kind));
        }
        validate_line_items(kind, list.items()).map_err(WizardError::Validation)?;

        let start = match self.retry {
            PhaseRetry::ResendAll => 0,
            PhaseRetry::SkipPersisted => list.persisted(),
        };
        let total = list.len();
        for index in start..total {
            debug!(kind = %kind, position = index + 1, total, "posting line item");
            let result = list.items()[index].post(api, id).await;
            if let Err(source) = result {
                warn!(
                    kind = %kind,
                    position = index + 1,
                    persisted = list.persisted(),
                    error = %source,
                    "line item phase aborted"
                );
                return Err(WizardError::PhaseFailed {
                    kind,
                    persisted: list.persisted(),
                    total,
                    source,
                });
            }
            list.mark_persisted(index + 1);
        }

        list.lock();
        self.transition(target)?;
        Ok(PhaseReport {
            kind,
            sent: total - start,
            total,
        })
    }

    /// Final, network-free transition.
    pub fn enter_review(&mut self) -> Result<(), WizardError> {
        if self.state == SubmissionState::Review {
            return Ok(());
        }
        self.transition(SubmissionState::Review)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.retry);
    }
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new(PhaseRetry::default())
    }
}
