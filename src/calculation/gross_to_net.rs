//! Gross to net calculation.
//!
//! This is the forward engine: from a gross main salary and the supplementary
//! incomes of one person it derives insurance, deductions, the pooled
//! progressive tax, flat-rate taxes and every net figure, recording each
//! decision in the audit trace.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::Policy;
use crate::models::{AuditStep, AuditTrace, AuditWarning, CalculationInput, TaxResult};

use super::insurance::{compute_insurance, contribution_base, insurance_contributions};
use super::progressive_tax::{compute_progressive_tax, progressive_tax_total};
use super::supplementary::{apply_supplementary_rules, attribute_pooled_tax};

/// Warning code raised when a negative input figure is treated as zero.
pub const NEGATIVE_INPUT_WARNING: &str = "NEGATIVE_INPUT_CLAMPED";

/// Warning code raised when the main salary cannot carry its own deductions.
pub const NEGATIVE_NET_WARNING: &str = "NEGATIVE_NET_SALARY";

/// The deductions applied before the progressive schedule.
#[derive(Debug, Clone)]
pub struct DeductionResult {
    /// The personal deduction of the policy.
    pub personal: Decimal,
    /// Dependents multiplied by the per-dependent deduction.
    pub dependents: Decimal,
    /// Other deductions supplied by the caller.
    pub other: Decimal,
    /// Sum of all three.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the family and other deductions for an input.
pub fn compute_deductions(
    input: &CalculationInput,
    policy: &Policy,
    step_number: u32,
) -> DeductionResult {
    let personal = policy.deduction().personal;
    let dependents = Decimal::from(input.dependents) * policy.deduction().dependent;
    let other = input.other_deductions.max(Decimal::ZERO);
    let total = personal + dependents + other;

    let audit_step = AuditStep {
        step_number,
        rule_id: "family_deduction".to_string(),
        rule_name: "Family and Other Deductions".to_string(),
        input: serde_json::json!({
            "dependents": input.dependents,
            "personal_deduction": personal.normalize().to_string(),
            "dependent_deduction": policy.deduction().dependent.normalize().to_string(),
            "other_deductions": other.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total.normalize().to_string()
        }),
        reasoning: format!(
            "{} + {} x {} + {} = {}",
            personal.normalize(),
            input.dependents,
            policy.deduction().dependent.normalize(),
            other.normalize(),
            total.normalize()
        ),
    };

    DeductionResult {
        personal,
        dependents,
        other,
        total,
        audit_step,
    }
}

fn deduction_total(input: &CalculationInput, policy: &Policy) -> Decimal {
    policy.deduction().personal
        + Decimal::from(input.dependents) * policy.deduction().dependent
        + input.other_deductions.max(Decimal::ZERO)
}

/// Returns the net main salary for a candidate gross, ignoring supplementary
/// incomes.
///
/// This is exactly the `net` that [`gross_to_net`] reports for the same
/// input evaluated at `gross`: pooled supplementary income never changes the
/// tax the main salary carries on its own. The net to gross search probes
/// this function.
pub fn main_salary_net(input: &CalculationInput, gross: Decimal, policy: &Policy) -> Decimal {
    let gross = gross.max(Decimal::ZERO);
    let insurance = insurance_contributions(contribution_base(input, gross), input.region, policy)
        .total();
    let main_taxable = (gross - insurance - deduction_total(input, policy)).max(Decimal::ZERO);

    gross - insurance - progressive_tax_total(main_taxable, policy.brackets())
}

/// Calculates the net salary, taxes and contributions for a gross salary.
///
/// `input.income` is read as the gross main salary whatever `income_type`
/// says; [`super::calculate`] dispatches on the income type. Negative figures
/// are clamped to zero with a `NEGATIVE_INPUT_CLAMPED` warning.
///
/// SALARY_LIKE incomes are pooled with the main salary in a single bracket
/// walk. The main salary keeps the tax it would carry alone; the marginal
/// remainder is attributed to the pooled entries.
///
/// # Examples
///
/// ```
/// use pit_engine::calculation::gross_to_net;
/// use pit_engine::config::PolicyPreset;
/// use pit_engine::models::{CalculationInput, Region};
/// use rust_decimal::Decimal;
///
/// let policy = PolicyPreset::Law2025.policy().unwrap();
/// let input = CalculationInput::gross(Decimal::new(30_000_000, 0), Region::I).with_dependents(1);
/// let result = gross_to_net(&input, &policy);
///
/// assert_eq!(result.taxable_income, Decimal::new(11_450_000, 0));
/// assert_eq!(result.net, Decimal::new(25_882_500, 0));
/// ```
pub fn gross_to_net(input: &CalculationInput, policy: &Policy) -> TaxResult {
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let mut clamped_fields: Vec<&str> = Vec::new();
    if input.income < Decimal::ZERO {
        clamped_fields.push("income");
    }
    if input.other_deductions < Decimal::ZERO {
        clamped_fields.push("other_deductions");
    }
    if input.insurance_salary < Decimal::ZERO {
        clamped_fields.push("insurance_salary");
    }

    let gross = input.income.max(Decimal::ZERO);

    // Insurance
    let insurance = compute_insurance(
        contribution_base(input, gross),
        input.region,
        policy,
        step_number,
    );
    steps.push(insurance.audit_step);
    warnings.extend(insurance.warnings);
    step_number += 1;

    let total_insurance = insurance.contributions.total();
    let income_before_tax = gross - total_insurance;

    // Deductions
    let deductions = compute_deductions(input, policy, step_number);
    steps.push(deductions.audit_step);
    step_number += 1;

    // Supplementary incomes
    let mut supplementary = apply_supplementary_rules(&input.additional_incomes, step_number);
    steps.push(supplementary.audit_step);
    step_number += 1;
    if supplementary.clamped {
        clamped_fields.push("additional_incomes");
    }

    // Pooled progressive tax
    let main_taxable = (income_before_tax - deductions.total).max(Decimal::ZERO);
    let taxable_income = main_taxable + supplementary.salary_like_income;
    let progressive = compute_progressive_tax(taxable_income, policy.brackets(), step_number);
    steps.push(progressive.audit_step);
    step_number += 1;

    let personal_income_tax = progressive.total;
    let main_salary_tax = progressive_tax_total(main_taxable, policy.brackets());
    let pooled_share = personal_income_tax - main_salary_tax;
    attribute_pooled_tax(&mut supplementary.details, pooled_share);

    let net = gross - total_insurance - main_salary_tax;
    let total_tax = personal_income_tax + supplementary.flat_tax;
    let total_net = net
        + supplementary
            .details
            .iter()
            .map(|detail| detail.net())
            .sum::<Decimal>();

    steps.push(AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "insurance": total_insurance.to_string(),
            "personal_income_tax": personal_income_tax.to_string(),
            "pooled_share": pooled_share.to_string()
        }),
        output: serde_json::json!({
            "net": net.to_string(),
            "total_net": total_net.to_string(),
            "total_tax": total_tax.to_string()
        }),
        reasoning: format!(
            "{} - {} insurance - {} salary tax = {}",
            gross.normalize(),
            total_insurance,
            main_salary_tax,
            net
        ),
    });

    if !clamped_fields.is_empty() {
        warn!(fields = ?clamped_fields, "Negative input clamped to zero");
        warnings.push(AuditWarning::new(
            NEGATIVE_INPUT_WARNING,
            format!("Negative values treated as zero: {}", clamped_fields.join(", ")),
            "medium",
        ));
    }

    if net < Decimal::ZERO {
        warnings.push(AuditWarning::new(
            NEGATIVE_NET_WARNING,
            format!(
                "Insurance of {} exceeds the gross salary of {}",
                total_insurance,
                gross.normalize()
            ),
            "high",
        ));
    }

    debug!(
        policy = %policy.id(),
        gross = %gross,
        net = %net,
        taxable_income = %taxable_income,
        personal_income_tax = %personal_income_tax,
        total_tax = %total_tax,
        "Gross to net calculated"
    );

    TaxResult {
        policy_name: policy.name().to_string(),
        gross,
        net,
        insurance: insurance.contributions,
        income_before_tax,
        total_deductions: deductions.total,
        salary_like_income: supplementary.salary_like_income,
        taxable_income,
        personal_income_tax,
        detail_tax: progressive.per_bracket,
        additional_tax_details: supplementary.details,
        total_net,
        total_tax,
        audit_trace: AuditTrace { steps, warnings },
    }
}
