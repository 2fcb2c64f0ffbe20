//! Request types for the PIT engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::models::{AdditionalIncome, CalculationInput, IncomeType, InsuranceMode, Region};

/// Request body for the `/calculate` endpoint.
///
/// Carries the calculation input and, optionally, the policy to apply: a
/// preset id in `policy`, or a complete edited policy in `custom_policy`.
/// Without either, the default preset is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Gross salary or target net salary, per `income_type`.
    pub income: Decimal,
    /// Which quantity `income` represents.
    pub income_type: IncomeType,
    /// The minimum wage region.
    #[serde(default)]
    pub region: Region,
    /// Number of registered dependents.
    #[serde(default)]
    pub dependents: u32,
    /// Contribution base used in `CUSTOM` insurance mode.
    #[serde(default)]
    pub insurance_salary: Decimal,
    /// How the contribution base is chosen.
    #[serde(default)]
    pub insurance_mode: InsuranceMode,
    /// Deductions beyond the family deductions.
    #[serde(default)]
    pub other_deductions: Decimal,
    /// Supplementary incomes.
    #[serde(default)]
    pub additional_incomes: Vec<AdditionalIncome>,
    /// Preset id to calculate under.
    #[serde(default)]
    pub policy: Option<String>,
    /// Inline policy to calculate under, validated before use.
    #[serde(default)]
    pub custom_policy: Option<PolicyConfig>,
}

impl From<CalculationRequest> for CalculationInput {
    fn from(req: CalculationRequest) -> Self {
        CalculationInput {
            income: req.income,
            income_type: req.income_type,
            region: req.region,
            dependents: req.dependents,
            insurance_salary: req.insurance_salary,
            insurance_mode: req.insurance_mode,
            other_deductions: req.other_deductions,
            additional_incomes: req.additional_incomes,
        }
    }
}
