//! Statutory insurance contribution calculation.
//!
//! Employees contribute social, health and unemployment insurance on a
//! contribution base. Social and health share one cap (a multiple of the
//! statutory base salary); unemployment has its own cap (a multiple of the
//! regional minimum wage).

use rust_decimal::Decimal;

use crate::config::Policy;
use crate::models::{
    AuditStep, AuditWarning, CalculationInput, InsuranceContributions, InsuranceMode, Region,
};

use super::rounding::round_money;

/// Warning code raised when the social/health base hits its cap.
pub const SOCIAL_CAP_WARNING: &str = "SOCIAL_CAP_APPLIED";

/// Warning code raised when the unemployment base hits its cap.
pub const UNEMPLOYMENT_CAP_WARNING: &str = "UNEMPLOYMENT_CAP_APPLIED";

/// The result of an insurance calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct InsuranceResult {
    /// The three contributions, each rounded to the whole dong.
    pub contributions: InsuranceContributions,
    /// The social/health base after capping.
    pub social_base: Decimal,
    /// The unemployment base after capping.
    pub unemployment_base: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Cap notices.
    pub warnings: Vec<AuditWarning>,
}

/// Selects the contribution base for a salary under evaluation.
///
/// In `Official` mode the base is the gross salary itself (which changes on
/// every probe of the net to gross search); in `Custom` mode it is the fixed
/// `insurance_salary` of the input.
pub fn contribution_base(input: &CalculationInput, gross: Decimal) -> Decimal {
    match input.insurance_mode {
        InsuranceMode::Official => gross,
        InsuranceMode::Custom => input.insurance_salary,
    }
}

/// Returns only the contributions for a contribution base.
///
/// Equivalent to `compute_insurance(..).contributions` without building the
/// audit step; the net to gross search calls this on every probe.
pub fn insurance_contributions(
    contribution_base: Decimal,
    region: Region,
    policy: &Policy,
) -> InsuranceContributions {
    let base = contribution_base.max(Decimal::ZERO);
    let rates = policy.insurance();
    let social_base = base.min(policy.social_cap());
    let unemployment_base = base.min(policy.unemployment_cap(region));

    InsuranceContributions {
        social: round_money(social_base * rates.social),
        health: round_money(social_base * rates.health),
        unemployment: round_money(unemployment_base * rates.unemployment),
    }
}

/// Computes the employee insurance contributions for a contribution base.
///
/// - social/health base = `min(base, base_salary * social_cap_multiplier)`
/// - unemployment base = `min(base, regional_min_wage * unemployment_cap_multiplier)`
/// - each contribution = base * rate, rounded half up to the whole dong
///
/// A negative base is treated as zero. A zero base yields zero contributions.
///
/// # Examples
///
/// ```
/// use pit_engine::calculation::compute_insurance;
/// use pit_engine::config::PolicyPreset;
/// use pit_engine::models::Region;
/// use rust_decimal::Decimal;
///
/// let policy = PolicyPreset::Law2025.policy().unwrap();
/// let result = compute_insurance(Decimal::new(30_000_000, 0), Region::I, &policy, 1);
/// assert_eq!(result.contributions.social, Decimal::new(2_400_000, 0));
/// assert_eq!(result.contributions.total(), Decimal::new(3_150_000, 0));
/// ```
pub fn compute_insurance(
    contribution_base: Decimal,
    region: Region,
    policy: &Policy,
    step_number: u32,
) -> InsuranceResult {
    let base = contribution_base.max(Decimal::ZERO);
    let rates = policy.insurance();

    let social_cap = policy.social_cap();
    let unemployment_cap = policy.unemployment_cap(region);
    let social_base = base.min(social_cap);
    let unemployment_base = base.min(unemployment_cap);

    let contributions = insurance_contributions(base, region, policy);

    let mut warnings = Vec::new();
    if base > social_cap {
        warnings.push(AuditWarning::new(
            SOCIAL_CAP_WARNING,
            format!(
                "Social and health insurance capped at {} ({} x base salary)",
                social_cap.normalize(),
                rates.social_cap_multiplier.normalize()
            ),
            "low",
        ));
    }
    if base > unemployment_cap {
        warnings.push(AuditWarning::new(
            UNEMPLOYMENT_CAP_WARNING,
            format!(
                "Unemployment insurance capped at {} ({} x {} minimum wage)",
                unemployment_cap.normalize(),
                rates.unemployment_cap_multiplier.normalize(),
                region
            ),
            "low",
        ));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "insurance_contributions".to_string(),
        rule_name: "Insurance Contributions".to_string(),
        input: serde_json::json!({
            "contribution_base": base.normalize().to_string(),
            "region": region,
            "social_cap": social_cap.normalize().to_string(),
            "unemployment_cap": unemployment_cap.normalize().to_string()
        }),
        output: serde_json::json!({
            "social": contributions.social.to_string(),
            "health": contributions.health.to_string(),
            "unemployment": contributions.unemployment.to_string(),
            "total": contributions.total().to_string()
        }),
        reasoning: format!(
            "{} x {} + {} x {} + {} x {} = {}",
            social_base.normalize(),
            rates.social.normalize(),
            social_base.normalize(),
            rates.health.normalize(),
            unemployment_base.normalize(),
            rates.unemployment.normalize(),
            contributions.total()
        ),
    };

    InsuranceResult {
        contributions,
        social_base,
        unemployment_base,
        audit_step,
        warnings,
    }
}
