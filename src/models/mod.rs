//! Core data models for the PIT engine.
//!
//! This module contains the calculation input and result types shared by
//! every part of the crate.

mod input;
mod tax_result;

pub use input::{
    AdditionalIncome, AdditionalIncomeType, CalculationInput, IncomeType, InsuranceMode, MAX_AMOUNT,
    Region,
};
pub use tax_result::{
    AdditionalTaxDetail, AuditStep, AuditTrace, AuditWarning, BracketDetail,
    InsuranceContributions, TaxResult,
};
