//! The validated, immutable tax policy.
//!
//! A [`Policy`] can only be built from a [`PolicyConfig`] that passes
//! validation, so the calculation engine never has to second-guess the
//! bracket table or insurance settings it receives.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::Region;

use super::types::{DeductionConfig, InsuranceConfig, PolicyConfig, TaxBracket};

/// A validated tax policy.
///
/// # Invariants
///
/// - `base_salary` is positive and deductions are non-negative
/// - insurance rates lie in `[0, 1)` and cap multipliers are positive
/// - every [`Region`] has a positive minimum wage
/// - brackets are non-empty, bounded maxima strictly increase, only the last
///   bracket is unbounded, and rates lie in `[0, 1]` and strictly increase
///
/// # Example
///
/// ```
/// use pit_engine::config::PolicyPreset;
/// use rust_decimal::Decimal;
///
/// let policy = PolicyPreset::Law2025.policy().unwrap();
/// let edited = policy.with_deductions(
///     Decimal::new(12_000_000, 0),
///     Decimal::new(5_000_000, 0),
/// ).unwrap();
/// assert_eq!(edited.deduction().personal, Decimal::new(12_000_000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyConfig", into = "PolicyConfig")]
pub struct Policy {
    config: PolicyConfig,
}

impl Policy {
    /// Validates a policy configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationError`] naming the first offending
    /// field if any invariant is violated.
    pub fn new(config: PolicyConfig) -> EngineResult<Self> {
        validate(&config)?;
        Ok(Self { config })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Consumes the policy, returning its configuration for editing.
    pub fn into_config(self) -> PolicyConfig {
        self.config
    }

    /// Returns the policy id.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Returns the policy name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the statutory base salary.
    pub fn base_salary(&self) -> Decimal {
        self.config.base_salary
    }

    /// Returns the family deductions.
    pub fn deduction(&self) -> &DeductionConfig {
        &self.config.deduction
    }

    /// Returns the insurance configuration.
    pub fn insurance(&self) -> &InsuranceConfig {
        &self.config.insurance
    }

    /// Returns the progressive brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.config.brackets
    }

    /// Returns the minimum wage of a region.
    pub fn regional_min_wage(&self, region: Region) -> Decimal {
        // Presence of every region is checked in `validate`.
        self.config
            .regional_min_wage
            .get(&region)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the cap on the social and health contribution base.
    pub fn social_cap(&self) -> Decimal {
        self.config.base_salary * self.config.insurance.social_cap_multiplier
    }

    /// Returns the cap on the unemployment contribution base in a region.
    pub fn unemployment_cap(&self, region: Region) -> Decimal {
        self.regional_min_wage(region) * self.config.insurance.unemployment_cap_multiplier
    }

    /// Returns a copy with new family deduction amounts.
    pub fn with_deductions(&self, personal: Decimal, dependent: Decimal) -> EngineResult<Self> {
        let mut config = self.config.clone();
        config.deduction = DeductionConfig {
            personal,
            dependent,
        };
        Self::new(config)
    }

    /// Returns a copy with a new statutory base salary.
    pub fn with_base_salary(&self, base_salary: Decimal) -> EngineResult<Self> {
        let mut config = self.config.clone();
        config.base_salary = base_salary;
        Self::new(config)
    }
}

impl TryFrom<PolicyConfig> for Policy {
    type Error = EngineError;

    fn try_from(config: PolicyConfig) -> EngineResult<Self> {
        Self::new(config)
    }
}

impl From<Policy> for PolicyConfig {
    fn from(policy: Policy) -> Self {
        policy.config
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> EngineError {
    EngineError::ConfigurationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &PolicyConfig) -> EngineResult<()> {
    if config.name.trim().is_empty() {
        return Err(invalid("name", "cannot be empty"));
    }

    if config.base_salary <= Decimal::ZERO {
        return Err(invalid("base_salary", "must be positive"));
    }

    if config.deduction.personal < Decimal::ZERO {
        return Err(invalid("deduction.personal", "cannot be negative"));
    }
    if config.deduction.dependent < Decimal::ZERO {
        return Err(invalid("deduction.dependent", "cannot be negative"));
    }

    let insurance = &config.insurance;
    for (field, rate) in [
        ("insurance.social", insurance.social),
        ("insurance.health", insurance.health),
        ("insurance.unemployment", insurance.unemployment),
    ] {
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(invalid(field, format!("rate {} must be in [0, 1)", rate)));
        }
    }
    // Net must rise with gross below the caps.
    let combined = insurance.social + insurance.health + insurance.unemployment;
    if combined >= Decimal::ONE {
        return Err(invalid(
            "insurance",
            format!("combined rate {} must be below 1", combined),
        ));
    }
    for (field, multiplier) in [
        ("insurance.social_cap_multiplier", insurance.social_cap_multiplier),
        (
            "insurance.unemployment_cap_multiplier",
            insurance.unemployment_cap_multiplier,
        ),
    ] {
        if multiplier <= Decimal::ZERO {
            return Err(invalid(field, "must be positive"));
        }
    }

    for region in Region::ALL {
        match config.regional_min_wage.get(&region) {
            None => {
                return Err(invalid(
                    "regional_min_wage",
                    format!("missing minimum wage for {}", region),
                ));
            }
            Some(wage) if *wage <= Decimal::ZERO => {
                return Err(invalid(
                    format!("regional_min_wage.{:?}", region),
                    "must be positive",
                ));
            }
            Some(_) => {}
        }
    }

    validate_brackets(&config.brackets)
}

fn validate_brackets(brackets: &[TaxBracket]) -> EngineResult<()> {
    if brackets.is_empty() {
        return Err(invalid("brackets", "at least one bracket is required"));
    }

    let last = brackets.len() - 1;
    let mut previous_max = Decimal::ZERO;
    let mut previous_rate: Option<Decimal> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(invalid(
                format!("brackets[{}].rate", index),
                format!("rate {} must be in [0, 1]", bracket.rate),
            ));
        }
        if let Some(rate) = previous_rate {
            if bracket.rate <= rate {
                return Err(invalid(
                    format!("brackets[{}].rate", index),
                    "rates must strictly increase",
                ));
            }
        }
        previous_rate = Some(bracket.rate);

        match (bracket.max, index == last) {
            (None, true) => {}
            (None, false) => {
                return Err(invalid(
                    format!("brackets[{}].max", index),
                    "only the last bracket may be unbounded",
                ));
            }
            (Some(_), true) => {
                return Err(invalid(
                    format!("brackets[{}].max", index),
                    "the last bracket must be unbounded",
                ));
            }
            (Some(max), false) => {
                if max <= previous_max {
                    return Err(invalid(
                        format!("brackets[{}].max", index),
                        format!("{} must exceed the previous bound {}", max, previous_max),
                    ));
                }
                previous_max = max;
            }
        }
    }

    Ok(())
}
