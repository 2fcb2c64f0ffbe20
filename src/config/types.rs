//! Configuration types for tax policies.
//!
//! This module contains the strongly-typed policy structures that are
//! deserialized from YAML files or JSON requests. They carry no guarantees on
//! their own; [`Policy`](super::Policy) validates them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Region;

/// Fixed monthly deductions from income before tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    /// Deduction for the taxpayer.
    pub personal: Decimal,
    /// Deduction per registered dependent.
    pub dependent: Decimal,
}

/// Employee statutory insurance rates and caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceConfig {
    /// Social insurance rate (e.g. 0.08).
    pub social: Decimal,
    /// Health insurance rate (e.g. 0.015).
    pub health: Decimal,
    /// Unemployment insurance rate (e.g. 0.01).
    pub unemployment: Decimal,
    /// Social and health contribution base cap, as a multiple of the base salary.
    pub social_cap_multiplier: Decimal,
    /// Unemployment contribution base cap, as a multiple of the regional minimum wage.
    pub unemployment_cap_multiplier: Decimal,
}

/// One bracket of the progressive schedule.
///
/// The lower bound is the previous bracket's `max` (zero for the first
/// bracket). `max` is `None` only for the top, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper bound of taxable income in this bracket.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Marginal rate applied inside this bracket.
    pub rate: Decimal,
}

impl TaxBracket {
    /// Creates a bounded bracket.
    pub fn bounded(max: Decimal, rate: Decimal) -> Self {
        Self {
            max: Some(max),
            rate,
        }
    }

    /// Creates the unbounded top bracket.
    pub fn unbounded(rate: Decimal) -> Self {
        Self { max: None, rate }
    }
}

/// A complete tax policy as written in a YAML preset file.
///
/// # Example
///
/// ```
/// use pit_engine::config::PolicyConfig;
///
/// let yaml = r#"
/// id: "custom"
/// name: "Custom"
/// base_salary: 2340000
/// deduction: { personal: 11000000, dependent: 4400000 }
/// insurance:
///   social: "0.08"
///   health: "0.015"
///   unemployment: "0.01"
///   social_cap_multiplier: 20
///   unemployment_cap_multiplier: 20
/// regional_min_wage: { I: 4960000, II: 4410000, III: 3860000, IV: 3450000 }
/// brackets:
///   - { max: 5000000, rate: "0.05" }
///   - { rate: "0.10" }
/// "#;
/// let config: PolicyConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.brackets.len(), 2);
/// assert!(config.brackets[1].max.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Short identifier (e.g. "2025").
    pub id: String,
    /// Label of the regulatory regime.
    pub name: String,
    /// Statutory reference salary used for the social/health cap.
    pub base_salary: Decimal,
    /// Family deductions.
    pub deduction: DeductionConfig,
    /// Insurance rates and caps.
    pub insurance: InsuranceConfig,
    /// Minimum wage per region.
    pub regional_min_wage: BTreeMap<Region, Decimal>,
    /// Ascending progressive brackets.
    pub brackets: Vec<TaxBracket>,
}
