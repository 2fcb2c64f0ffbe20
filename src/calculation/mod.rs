//! Calculation logic for the PIT engine.
//!
//! This module contains the insurance calculator, the progressive tax
//! calculator, the supplementary income rules, and the two engines built on
//! them: gross to net (forward) and net to gross (inverse bisection).

mod gross_to_net;
mod insurance;
mod net_to_gross;
mod progressive_tax;
mod rounding;
mod supplementary;

pub use gross_to_net::{
    DeductionResult, NEGATIVE_INPUT_WARNING, NEGATIVE_NET_WARNING, compute_deductions,
    gross_to_net, main_salary_net,
};
pub use insurance::{
    InsuranceResult, SOCIAL_CAP_WARNING, UNEMPLOYMENT_CAP_WARNING, compute_insurance,
    contribution_base, insurance_contributions,
};
pub use net_to_gross::{
    MAX_SEARCH_ITERATIONS, NET_DEVIATION_WARNING, NET_TOLERANCE, SEARCH_CEILING_MULTIPLIER,
    net_to_gross,
};
pub use progressive_tax::{ProgressiveTaxResult, compute_progressive_tax, progressive_tax_total};
pub use rounding::round_money;
pub use supplementary::{
    FREELANCE_RATE, INVESTMENT_RATE, SupplementaryRule, SupplementaryTaxation,
    apply_supplementary_rules, attribute_pooled_tax, supplementary_rule,
};

use crate::config::Policy;
use crate::error::EngineResult;
use crate::models::{CalculationInput, IncomeType, TaxResult};

/// Runs the engine selected by `input.income_type`.
///
/// `GROSS` runs [`gross_to_net`]; `NET` runs [`net_to_gross`].
pub fn calculate(input: &CalculationInput, policy: &Policy) -> EngineResult<TaxResult> {
    match input.income_type {
        IncomeType::Gross => Ok(gross_to_net(input, policy)),
        IncomeType::Net => net_to_gross(input, policy),
    }
}
