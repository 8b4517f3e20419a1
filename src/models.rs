//! Data models for the tax engine.
//!
//! The `models` module defines the serialisable records exchanged with
//! callers: declared income sources and deductions on the way in, and a
//! tax breakdown on the way out.  Field names follow the camelCase
//! convention used on the wire; Rust code sees ordinary snake_case.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Message returned alongside every successful calculation.
pub const SUCCESS_MESSAGE: &str = "Tax calculated successfully.";

/// A single source of income, e.g. employment or freelance work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    /// Free-text label such as `"Employment"` or `"Rental"`.  The engine
    /// does not interpret it; every source is simply summed.
    #[serde(rename = "type")]
    pub kind: String,
    /// Annual amount.
    pub amount: f64,
}

/// A claimed deduction.  The `kind` selects the capping rule in the
/// [`DeductionRegistry`](crate::deductions::DeductionRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    /// e.g. `"Pension"`, `"NHF"`, `"NHIS"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Claimed annual amount.
    pub amount: f64,
}

/// Request body for a tax calculation.
///
/// A missing or `null` list is read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub incomes: Vec<IncomeSource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deductions: Vec<Deduction>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Detailed breakdown of a calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub total_gross_income: f64,
    /// Capped statutory deductions plus the consolidated relief.
    pub total_deductions: f64,
    pub consolidated_relief: f64,
    /// Gross income less total deductions, never below zero.
    pub taxable_income: f64,
    pub annual_tax: f64,
    pub monthly_tax: f64,
}

/// Response body for a tax calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationResponse {
    pub breakdown: TaxBreakdown,
    pub message: String,
}

/// Reasons a request is refused before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("incomes[{index}] ({kind}) has negative amount {amount}")]
    NegativeIncome { index: usize, kind: String, amount: f64 },
    #[error("deductions[{index}] ({kind}) has negative amount {amount}")]
    NegativeDeduction { index: usize, kind: String, amount: f64 },
    #[error("{field}[{index}] amount is not a finite number")]
    NonFiniteAmount { field: &'static str, index: usize },
    #[error("{field} add up to more than can be represented")]
    NonFiniteTotal { field: &'static str },
}

impl TaxCalculationRequest {
    /// Check the engine's preconditions: every amount is finite and
    /// non-negative, and so is the sum of each list.  Returns the first
    /// offending row.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, income) in self.incomes.iter().enumerate() {
            if !income.amount.is_finite() {
                return Err(ValidationError::NonFiniteAmount { field: "incomes", index });
            }
            if income.amount < 0.0 {
                return Err(ValidationError::NegativeIncome {
                    index,
                    kind: income.kind.clone(),
                    amount: income.amount,
                });
            }
        }
        for (index, deduction) in self.deductions.iter().enumerate() {
            if !deduction.amount.is_finite() {
                return Err(ValidationError::NonFiniteAmount { field: "deductions", index });
            }
            if deduction.amount < 0.0 {
                return Err(ValidationError::NegativeDeduction {
                    index,
                    kind: deduction.kind.clone(),
                    amount: deduction.amount,
                });
            }
        }
        let incomes: f64 = self.incomes.iter().map(|income| income.amount).sum();
        if !incomes.is_finite() {
            return Err(ValidationError::NonFiniteTotal { field: "incomes" });
        }
        let deductions: f64 = self.deductions.iter().map(|deduction| deduction.amount).sum();
        if !deductions.is_finite() {
            return Err(ValidationError::NonFiniteTotal { field: "deductions" });
        }
        Ok(())
    }
}

/// An educational scenario served by the informational endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub description: String,
    pub example: String,
}
