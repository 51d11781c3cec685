//! Derives the wizard's step sequence from a product's requirement flags.

use std::collections::BTreeMap;
use std::fmt;

use sacco_domain::{LineItemKind, LoanProduct, LoanRequirements};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Product,
    Details,
    Guarantors,
    Collateral,
    NextOfKin,
    Review,
}

impl WizardStep {
    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Product => "Loan Product",
            WizardStep::Details => "Loan Details",
            WizardStep::Guarantors => "Guarantors",
            WizardStep::Collateral => "Collateral",
            WizardStep::NextOfKin => "Next of Kin",
            WizardStep::Review => "Review",
        }
    }

    /// The line-item phase this step collects, if it is a requirement step.
    pub fn line_item_kind(self) -> Option<LineItemKind> {
        match self {
            WizardStep::Guarantors => Some(LineItemKind::Guarantor),
            WizardStep::Collateral => Some(LineItemKind::Collateral),
            WizardStep::NextOfKin => Some(LineItemKind::NextOfKin),
            _ => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn total_steps(requirements: LoanRequirements) -> usize {
    3 + requirements.count()
}

/// Ordered steps of one wizard run. Indexes are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    steps: Vec<WizardStep>,
}

impl StepPlan {
    /// `None` yields the three-step skeleton used before a product is chosen.
    pub fn new(requirements: Option<LoanRequirements>) -> Self {
        let requirements = requirements.unwrap_or_default();
        let mut steps = vec![WizardStep::Product, WizardStep::Details];
        if requirements.guarantor {
            steps.push(WizardStep::Guarantors);
        }
        if requirements.collateral {
            steps.push(WizardStep::Collateral);
        }
        if requirements.next_of_kin {
            steps.push(WizardStep::NextOfKin);
        }
        steps.push(WizardStep::Review);
        Self { steps }
    }

    pub fn for_product(product: Option<&LoanProduct>) -> Self {
        Self::new(product.map(LoanProduct::requirements))
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step_at(&self, index: usize) -> Option<WizardStep> {
        index
            .checked_sub(1)
            .and_then(|position| self.steps.get(position))
            .copied()
    }

    pub fn index_of(&self, step: WizardStep) -> Option<usize> {
        self.steps
            .iter()
            .position(|candidate| *candidate == step)
            .map(|position| position + 1)
    }

    pub fn review_index(&self) -> usize {
        self.steps.len()
    }

    /// Lowest step reachable by going back once the application exists
    /// server-side: the first requirement step, or Review when there is none.
    pub fn min_step_after_submission(&self) -> usize {
        self.steps
            .iter()
            .position(|step| step.line_item_kind().is_some())
            .map(|position| position + 1)
            .unwrap_or_else(|| self.review_index())
    }

    pub fn labels(&self) -> BTreeMap<usize, &'static str> {
        self.steps
            .iter()
            .enumerate()
            .map(|(position, step)| (position + 1, step.label()))
            .collect()
    }
}

impl Default for StepPlan {
    fn default() -> Self {
        Self::new(None)
    }
}
