//! Supplementary income taxation.
//!
//! Each supplementary income is taxed by the rule of its type:
//!
//! | Type          | Rule                                       |
//! |---------------|--------------------------------------------|
//! | `NON_TAXABLE` | exempt                                     |
//! | `SALARY_LIKE` | pooled into the progressive schedule       |
//! | `FREELANCE`   | flat 10% withholding                       |
//! | `INVESTMENT`  | flat 5% withholding                        |
//!
//! Flat-rate taxes do not interact with deductions or brackets.

use rust_decimal::Decimal;

use crate::models::{AdditionalIncome, AdditionalIncomeType, AdditionalTaxDetail, AuditStep};

use super::rounding::round_money;

/// Flat withholding rate on casual service income (10%).
pub const FREELANCE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Flat withholding rate on capital investment income (5%).
pub const INVESTMENT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// How a supplementary income type is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplementaryRule {
    /// No tax.
    Exempt,
    /// Added to the progressive pool.
    Pooled,
    /// Taxed at a fixed rate on the full amount.
    FlatRate(Decimal),
}

/// Returns the taxation rule of a supplementary income type.
pub fn supplementary_rule(income_type: AdditionalIncomeType) -> SupplementaryRule {
    match income_type {
        AdditionalIncomeType::NonTaxable => SupplementaryRule::Exempt,
        AdditionalIncomeType::SalaryLike => SupplementaryRule::Pooled,
        AdditionalIncomeType::Freelance => SupplementaryRule::FlatRate(FREELANCE_RATE),
        AdditionalIncomeType::Investment => SupplementaryRule::FlatRate(INVESTMENT_RATE),
    }
}

/// The outcome of applying the supplementary rules to every entry.
#[derive(Debug, Clone)]
pub struct SupplementaryTaxation {
    /// One detail per entry, in input order. Pooled entries carry zero tax
    /// until [`attribute_pooled_tax`] assigns their share.
    pub details: Vec<AdditionalTaxDetail>,
    /// Sum of pooled (SALARY_LIKE) amounts.
    pub salary_like_income: Decimal,
    /// Sum of flat-rate taxes.
    pub flat_tax: Decimal,
    /// True if any negative amount was clamped to zero.
    pub clamped: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies the per-type rule to every supplementary income.
///
/// Entries are independent: amounts are never netted against each other.
/// Negative amounts are treated as zero.
pub fn apply_supplementary_rules(
    incomes: &[AdditionalIncome],
    step_number: u32,
) -> SupplementaryTaxation {
    let mut details = Vec::with_capacity(incomes.len());
    let mut salary_like_income = Decimal::ZERO;
    let mut flat_tax = Decimal::ZERO;
    let mut clamped = false;

    for income in incomes {
        if income.amount < Decimal::ZERO {
            clamped = true;
        }
        let amount = income.amount.max(Decimal::ZERO);

        let (rate, tax, pooled) = match supplementary_rule(income.income_type) {
            SupplementaryRule::Exempt => (None, Decimal::ZERO, false),
            SupplementaryRule::Pooled => {
                salary_like_income += amount;
                (None, Decimal::ZERO, true)
            }
            SupplementaryRule::FlatRate(rate) => {
                let tax = round_money(amount * rate);
                flat_tax += tax;
                (Some(rate), tax, false)
            }
        };

        details.push(AdditionalTaxDetail {
            id: income.id.clone(),
            label: income.label.clone(),
            income_type: income.income_type,
            type_name: income.income_type.type_name().to_string(),
            amount,
            rate,
            tax,
            pooled,
        });
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "supplementary_income".to_string(),
        rule_name: "Supplementary Income Rules".to_string(),
        input: serde_json::json!({
            "entries": incomes.len()
        }),
        output: serde_json::json!({
            "salary_like_income": salary_like_income.normalize().to_string(),
            "flat_tax": flat_tax.to_string()
        }),
        reasoning: format!(
            "{} entries: {} pooled into the progressive schedule, {} flat-rate tax",
            incomes.len(),
            salary_like_income.normalize(),
            flat_tax
        ),
    };

    SupplementaryTaxation {
        details,
        salary_like_income,
        flat_tax,
        clamped,
        audit_step,
    }
}

/// Splits the pooled tax share across pooled entries in proportion to amount.
///
/// Shares are allocated in whole dong by the largest remainder method, so
/// they are never negative and always sum exactly to `pooled_tax`.
pub fn attribute_pooled_tax(details: &mut [AdditionalTaxDetail], pooled_tax: Decimal) {
    let pooled_total: Decimal = details
        .iter()
        .filter(|d| d.pooled)
        .map(|d| d.amount)
        .sum();

    if pooled_total <= Decimal::ZERO || pooled_tax <= Decimal::ZERO {
        for detail in details.iter_mut().filter(|d| d.pooled) {
            detail.tax = Decimal::ZERO;
        }
        return;
    }

    let mut allocated = Decimal::ZERO;
    let mut remainders: Vec<(usize, Decimal)> = Vec::new();

    for (index, detail) in details.iter_mut().enumerate() {
        if !detail.pooled {
            continue;
        }
        let exact = pooled_tax * detail.amount / pooled_total;
        let floor = exact.floor();
        detail.tax = floor;
        allocated += floor;
        remainders.push((index, exact - floor));
    }

    // Largest fractional parts first; ties go to the earlier entry.
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut leftover = pooled_tax - allocated;
    for (index, _) in remainders {
        if leftover <= Decimal::ZERO {
            break;
        }
        details[index].tax += Decimal::ONE;
        leftover -= Decimal::ONE;
    }
}
