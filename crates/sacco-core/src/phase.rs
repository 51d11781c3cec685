//! Binds each line-item type to its phase: where it lives in the draft store
//! and which `LoanApi` call persists it.

use async_trait::async_trait;
use sacco_domain::{
    Collateral, Guarantor, LineItemKind, LineItemSubmission, LoanApplicationId, NextOfKin,
};

use crate::api::LoanApi;
use crate::draft_store::{DraftStore, LineItemList};
use crate::error::ApiError;
use crate::validation::LineItemRules;

#[async_trait]
pub trait PhaseItem: LineItemRules + Clone + Send + Sync + 'static {
    const KIND: LineItemKind;

    fn list(store: &DraftStore) -> &LineItemList<Self>;

    fn list_mut(store: &mut DraftStore) -> &mut LineItemList<Self>;

    async fn post(&self, api: &dyn LoanApi, id: LoanApplicationId) -> Result<(), ApiError>;
}

#[async_trait]
impl PhaseItem for Guarantor {
    const KIND: LineItemKind = LineItemKind::Guarantor;

    fn list(store: &DraftStore) -> &LineItemList<Self> {
        &store.guarantors
    }

    fn list_mut(store: &mut DraftStore) -> &mut LineItemList<Self> {
        &mut store.guarantors
    }

    async fn post(&self, api: &dyn LoanApi, id: LoanApplicationId) -> Result<(), ApiError> {
        api.add_guarantor(&LineItemSubmission::new(id, self)).await
    }
}

#[async_trait]
impl PhaseItem for Collateral {
    const KIND: LineItemKind = LineItemKind::Collateral;

    fn list(store: &DraftStore) -> &LineItemList<Self> {
        &store.collaterals
    }

    fn list_mut(store: &mut DraftStore) -> &mut LineItemList<Self> {
        &mut store.collaterals
    }

    async fn post(&self, api: &dyn LoanApi, id: LoanApplicationId) -> Result<(), ApiError> {
        api.add_collateral(&LineItemSubmission::new(id, self)).await
    }
}

#[async_trait]
impl PhaseItem for NextOfKin {
    const KIND: LineItemKind = LineItemKind::NextOfKin;

    fn list(store: &DraftStore) -> &LineItemList<Self> {
        &store.next_of_kin
    }

    fn list_mut(store: &mut DraftStore) -> &mut LineItemList<Self> {
        &mut store.next_of_kin
    }

    async fn post(&self, api: &dyn LoanApi, id: LoanApplicationId) -> Result<(), ApiError> {
        api.add_next_of_kin(&LineItemSubmission::new(id, self)).await
    }
}
