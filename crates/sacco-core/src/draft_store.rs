//! Mutable in-progress application state: chosen product, draft fields, and
//! the repeatable line-item collections.

use sacco_domain::{
    ApplicantProfile, ApplicationDraft, Collateral, Guarantor, LoanProduct, LoanRequirements,
    NextOfKin,
};

use crate::error::WizardError;
use crate::phase::PhaseItem;

/// Ordered line items of one kind.
///
/// The first `persisted` items are known to exist server-side and can no
/// longer be removed. Once the phase commits the whole list is locked.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemList<T> {
    items: Vec<T>,
    persisted: usize,
    locked: bool,
}

impl<T> Default for LineItemList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            persisted: 0,
            locked: false,
        }
    }
}

impl<T: PhaseItem> LineItemList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn persisted(&self) -> usize {
        self.persisted
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Appends an item and returns its 1-based position.
    pub fn push(&mut self, item: T) -> Result<usize, WizardError> {
        if self.locked {
            return Err(WizardError::PhaseAlreadyCommitted(T::KIND));
        }
        self.items.push(item);
        Ok(self.items.len())
    }

    /// Removes the item at the 1-based `position`.
    pub fn remove(&mut self, position: usize) -> Result<T, WizardError> {
        if self.locked {
            return Err(WizardError::PhaseAlreadyCommitted(T::KIND));
        }
        if position == 0 || position > self.items.len() {
            return Err(WizardError::LineItemNotFound {
                kind: T::KIND,
                position,
            });
        }
        if position <= self.persisted {
            return Err(WizardError::LineItemPosted {
                kind: T::KIND,
                position,
            });
        }
        Ok(self.items.remove(position - 1))
    }

    pub(crate) fn mark_persisted(&mut self, count: usize) {
        self.persisted = self.persisted.max(count.min(self.items.len()));
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    fn clear(&mut self) {
        if !self.locked && self.persisted == 0 {
            self.items.clear();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    product: Option<LoanProduct>,
    draft: ApplicationDraft,
    sealed: bool,
    pub(crate) guarantors: LineItemList<Guarantor>,
    pub(crate) collaterals: LineItemList<Collateral>,
    pub(crate) next_of_kin: LineItemList<NextOfKin>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(&self) -> Option<&LoanProduct> {
        self.product.as_ref()
    }

    pub fn requirements(&self) -> Option<LoanRequirements> {
        self.product.as_ref().map(LoanProduct::requirements)
    }

    /// Chooses the product; collections the new product does not require are
    /// discarded.
    pub fn select_product(&mut self, product: LoanProduct) -> Result<(), WizardError> {
        if self.sealed {
            return Err(WizardError::AlreadySubmitted);
        }
        if !product.is_active {
            return Err(WizardError::ProductUnavailable(product.name));
        }
        let requirements = product.requirements();
        if !requirements.guarantor {
            self.guarantors.clear();
        }
        if !requirements.collateral {
            self.collaterals.clear();
        }
        if !requirements.next_of_kin {
            self.next_of_kin.clear();
        }
        self.product = Some(product);
        Ok(())
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    /// Applies `edit` to the draft. Rejected once the application is submitted.
    pub fn update_draft<F>(&mut self, edit: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut ApplicationDraft),
    {
        if self.sealed {
            return Err(WizardError::AlreadySubmitted);
        }
        edit(&mut self.draft);
        Ok(())
    }

    /// Copies profile values into draft fields that are still blank.
    /// Returns whether anything changed.
    pub fn prefill(&mut self, profile: &ApplicantProfile) -> Result<bool, WizardError> {
        if self.sealed {
            return Err(WizardError::AlreadySubmitted);
        }
        let before = self.draft.clone();
        let details = profile.details();
        let applicant = &mut self.draft.applicant;
        fill_blank(&mut applicant.first_name, &details.first_name);
        fill_blank(&mut applicant.last_name, &details.last_name);
        fill_blank(&mut applicant.email, &details.email);
        fill_blank(&mut applicant.address, &details.address);
        if applicant.date_of_birth.is_none() {
            applicant.date_of_birth = details.date_of_birth;
        }
        if applicant.gender.is_none() {
            applicant.gender = details.gender;
        }
        fill_blank(&mut self.draft.mobile_number, &profile.phone);
        fill_blank(&mut self.draft.occupation, &profile.occupation);
        Ok(self.draft != before)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn items<T: PhaseItem>(&self) -> &LineItemList<T> {
        T::list(self)
    }

    pub fn add_item<T: PhaseItem>(&mut self, item: T) -> Result<usize, WizardError> {
        if let Some(requirements) = self.requirements() {
            if !requirements.requires(T::KIND) {
                return Err(WizardError::PhaseNotRequired(T::KIND));
            }
        }
        T::list_mut(self).push(item)
    }

    pub fn remove_item<T: PhaseItem>(&mut self, position: usize) -> Result<T, WizardError> {
        T::list_mut(self).remove(position)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn fill_blank(target: &mut String, value: &str) {
    if target.trim().is_empty() && !value.trim().is_empty() {
        *target = value.trim().to_string();
    }
}
