//! Loan product templates as published by the server.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Displayable;
use crate::line_item::LineItemKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// How interest accrues over the life of a loan.
pub enum InterestMethod {
    Flat,
    ReducingBalance,
}

impl fmt::Display for InterestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InterestMethod::Flat => "Flat",
            InterestMethod::ReducingBalance => "Reducing balance",
        };
        f.write_str(label)
    }
}

/// Server-defined template constraining amount and term ranges and declaring
/// which supplementary records an application must include.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanProduct {
    pub id: Uuid,
    pub name: String,
    pub min_amount: f64,
    pub max_amount: f64,
    pub min_term_days: u32,
    pub max_term_days: u32,
    /// Annual rate, in percent.
    pub interest_rate: f64,
    pub interest_method: InterestMethod,
    #[serde(default)]
    pub requires_guarantor: bool,
    #[serde(default)]
    pub requires_collateral: bool,
    #[serde(default)]
    pub requires_next_of_kin: bool,
    #[serde(default = "LoanProduct::default_active")]
    pub is_active: bool,
}

impl LoanProduct {
    fn default_active() -> bool {
        true
    }

    pub fn requirements(&self) -> LoanRequirements {
        LoanRequirements {
            guarantor: self.requires_guarantor,
            collateral: self.requires_collateral,
            next_of_kin: self.requires_next_of_kin,
        }
    }
}

impl Displayable for LoanProduct {
    fn display_label(&self) -> String {
        format!(
            "{} ({}-{}, {}-{} days, {}% {})",
            self.name,
            self.min_amount,
            self.max_amount,
            self.min_term_days,
            self.max_term_days,
            self.interest_rate,
            self.interest_method
        )
    }
}

/// The supplementary record types a product demands, in their fixed order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LoanRequirements {
    pub guarantor: bool,
    pub collateral: bool,
    pub next_of_kin: bool,
}

impl LoanRequirements {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        [self.guarantor, self.collateral, self.next_of_kin]
            .iter()
            .filter(|flag| **flag)
            .count()
    }

    pub fn requires(&self, kind: LineItemKind) -> bool {
        match kind {
            LineItemKind::Guarantor => self.guarantor,
            LineItemKind::Collateral => self.collateral,
            LineItemKind::NextOfKin => self.next_of_kin,
        }
    }

    /// Required kinds in phase order.
    pub fn kinds(&self) -> Vec<LineItemKind> {
        LineItemKind::ALL
            .into_iter()
            .filter(|kind| self.requires(*kind))
            .collect()
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }
}
