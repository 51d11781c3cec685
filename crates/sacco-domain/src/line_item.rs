//! Repeatable supplementary records attached to a submitted application.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{Displayable, LoanApplicationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Enumerates the supplementary record types, in their fixed phase order.
pub enum LineItemKind {
    Guarantor,
    Collateral,
    NextOfKin,
}

impl LineItemKind {
    pub const ALL: [LineItemKind; 3] = [
        LineItemKind::Guarantor,
        LineItemKind::Collateral,
        LineItemKind::NextOfKin,
    ];

    /// Plural noun used in user-facing messages.
    pub fn plural(self) -> &'static str {
        match self {
            LineItemKind::Guarantor => "guarantors",
            LineItemKind::Collateral => "collaterals",
            LineItemKind::NextOfKin => "next of kin",
        }
    }
}

impl fmt::Display for LineItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LineItemKind::Guarantor => "Guarantor",
            LineItemKind::Collateral => "Collateral",
            LineItemKind::NextOfKin => "Next of kin",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guarantor {
    pub name: String,
    pub relationship: String,
    pub contact: String,
    pub id_number: String,
    pub guaranteed_amount: f64,
}

impl Displayable for Guarantor {
    fn display_label(&self) -> String {
        format!(
            "{} ({}) guarantees {}",
            self.name, self.relationship, self.guaranteed_amount
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collateral {
    #[serde(rename = "type")]
    pub collateral_type: String,
    pub description: String,
    pub estimated_value: f64,
    pub owner_name: String,
    pub owner_contact: String,
}

impl Displayable for Collateral {
    fn display_label(&self) -> String {
        format!(
            "{}: {} worth {}",
            self.collateral_type, self.description, self.estimated_value
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOfKin {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
}

impl Displayable for NextOfKin {
    fn display_label(&self) -> String {
        format!("{} ({}) {}", self.name, self.relationship, self.phone)
    }
}

/// Wire payload for a single line item: the item's own fields plus the
/// owning application's id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemSubmission<'a, T> {
    pub loan_application_id: LoanApplicationId,
    #[serde(flatten)]
    pub item: &'a T,
}

impl<'a, T> LineItemSubmission<'a, T> {
    pub fn new(loan_application_id: LoanApplicationId, item: &'a T) -> Self {
        Self {
            loan_application_id,
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn submission_flattens_item_fields_next_to_application_id() {
        let collateral = Collateral {
            collateral_type: "Vehicle".into(),
            description: "Toyota Probox".into(),
            estimated_value: 450000.0,
            owner_name: "Otieno".into(),
            owner_contact: "0712345678".into(),
        };
        let id = LoanApplicationId::new(Uuid::nil());
        let value = serde_json::to_value(LineItemSubmission::new(id, &collateral)).unwrap();

        assert_eq!(
            value["loanApplicationId"],
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(value["type"], "Vehicle");
        assert_eq!(value["estimatedValue"], 450000.0);
        assert_eq!(value["ownerContact"], "0712345678");
    }

    #[test]
    fn kinds_are_ordered_by_phase() {
        let mut kinds = vec![
            LineItemKind::NextOfKin,
            LineItemKind::Guarantor,
            LineItemKind::Collateral,
        ];
        kinds.sort();
        assert_eq!(kinds, LineItemKind::ALL.to_vec());
    }
}
