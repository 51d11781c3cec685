//! Step pointer movement with post-submission back-navigation limits.

use thiserror::Error;

use crate::planner::StepPlan;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("{0}")]
    Blocked(String),
    #[error("Already at the last step")]
    AtLastStep,
    #[error("Already at the first step")]
    AtFirstStep,
    #[error("Product and loan details can no longer be changed after the application is submitted")]
    LockedAfterSubmission,
    #[error("Step {0} is not part of this application")]
    OutOfRange(usize),
}

/// Current step index (1-based) of one wizard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
}

impl Default for Navigator {
    fn default() -> Self {
        Self { current: 1 }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Moves forward one step when `gate` allows it.
    pub fn next(
        &mut self,
        plan: &StepPlan,
        gate: Result<(), String>,
    ) -> Result<usize, NavigationError> {
        gate.map_err(NavigationError::Blocked)?;
        if self.current >= plan.total_steps() {
            return Err(NavigationError::AtLastStep);
        }
        self.current += 1;
        Ok(self.current)
    }

    pub fn prev(&mut self, plan: &StepPlan, submitted: bool) -> Result<usize, NavigationError> {
        if self.current <= 1 {
            return Err(NavigationError::AtFirstStep);
        }
        self.go_back_to(self.current - 1, plan, submitted)
    }

    /// Jumps back to any earlier step allowed by the submission state:
    /// `[1, current)` while drafting, `[min_step_after_submission, current)` after.
    pub fn go_back_to(
        &mut self,
        target: usize,
        plan: &StepPlan,
        submitted: bool,
    ) -> Result<usize, NavigationError> {
        if target == 0 || target >= self.current {
            return Err(NavigationError::OutOfRange(target));
        }
        let floor = if submitted {
            plan.min_step_after_submission()
        } else {
            1
        };
        if target < floor {
            return Err(NavigationError::LockedAfterSubmission);
        }
        self.current = target;
        Ok(self.current)
    }

    /// Keeps the pointer inside a plan that may have shrunk.
    pub fn clamp(&mut self, plan: &StepPlan) {
        self.current = self.current.clamp(1, plan.total_steps());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
