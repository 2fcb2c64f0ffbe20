//! Progressive (bracketed) personal income tax.
//!
//! Taxable income is split across the policy's ascending brackets; each
//! slice is taxed at its bracket's marginal rate. The total is a continuous,
//! non-decreasing, piecewise-linear function of the taxable income, which the
//! net to gross search relies on.

use rust_decimal::Decimal;

use crate::config::TaxBracket;
use crate::models::{AuditStep, BracketDetail};

use super::rounding::round_money;

/// The result of a progressive tax calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct ProgressiveTaxResult {
    /// The taxable income after clamping to zero.
    pub taxable_income: Decimal,
    /// Total tax; always equals the sum of `per_bracket` tax amounts.
    pub total: Decimal,
    /// One row per policy bracket, in bracket order.
    pub per_bracket: Vec<BracketDetail>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Walks the brackets, returning one row per bracket.
///
/// Each row's tax is rounded on its own so the rows reconcile exactly with
/// their sum.
fn walk_brackets(taxable_income: Decimal, brackets: &[TaxBracket]) -> Vec<BracketDetail> {
    let mut lower = Decimal::ZERO;
    let mut rows = Vec::with_capacity(brackets.len());

    for (index, bracket) in brackets.iter().enumerate() {
        let taxed_amount = if taxable_income <= lower {
            Decimal::ZERO
        } else {
            match bracket.max {
                Some(upper) => taxable_income.min(upper) - lower,
                None => taxable_income - lower,
            }
        };

        rows.push(BracketDetail {
            level: index as u32 + 1,
            min_income: lower,
            max_income: bracket.max,
            rate: bracket.rate,
            taxed_amount,
            tax_amount: round_money(taxed_amount * bracket.rate),
        });

        if let Some(upper) = bracket.max {
            lower = upper;
        }
    }

    rows
}

/// Returns only the total progressive tax on a taxable income.
///
/// Equivalent to `compute_progressive_tax(..).total` without building the
/// audit step.
pub fn progressive_tax_total(taxable_income: Decimal, brackets: &[TaxBracket]) -> Decimal {
    walk_brackets(taxable_income.max(Decimal::ZERO), brackets)
        .iter()
        .map(|row| row.tax_amount)
        .sum()
}

/// Computes progressive tax and its per-bracket breakdown.
///
/// `taxable_income` is clamped to zero. For each bracket with lower bound
/// `lower` (the previous bracket's max, zero for the first) the taxed amount
/// is `min(taxable, max) - lower`, or zero if the income does not reach the
/// bracket. Every bracket produces a row, even when nothing is taxed in it.
///
/// # Examples
///
/// ```
/// use pit_engine::calculation::compute_progressive_tax;
/// use pit_engine::config::PolicyPreset;
/// use rust_decimal::Decimal;
///
/// let policy = PolicyPreset::Law2025.policy().unwrap();
/// let result = compute_progressive_tax(Decimal::new(11_450_000, 0), policy.brackets(), 1);
/// // 5M x 5% + 5M x 10% + 1.45M x 15%
/// assert_eq!(result.total, Decimal::new(967_500, 0));
/// assert_eq!(result.per_bracket.len(), 7);
/// ```
pub fn compute_progressive_tax(
    taxable_income: Decimal,
    brackets: &[TaxBracket],
    step_number: u32,
) -> ProgressiveTaxResult {
    let taxable_income = taxable_income.max(Decimal::ZERO);
    let per_bracket = walk_brackets(taxable_income, brackets);
    let total: Decimal = per_bracket.iter().map(|row| row.tax_amount).sum();

    let applied: Vec<String> = per_bracket
        .iter()
        .filter(|row| row.taxed_amount > Decimal::ZERO)
        .map(|row| {
            format!(
                "{} x {}",
                row.taxed_amount.normalize(),
                row.rate.normalize()
            )
        })
        .collect();

    let reasoning = if applied.is_empty() {
        "No taxable income - no tax due".to_string()
    } else {
        format!("{} = {}", applied.join(" + "), total)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "progressive_tax".to_string(),
        rule_name: "Progressive Tax Schedule".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "brackets": brackets.len()
        }),
        output: serde_json::json!({
            "tax": total.to_string(),
            "brackets_reached": applied.len()
        }),
        reasoning,
    };

    ProgressiveTaxResult {
        taxable_income,
        total,
        per_bracket,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyPreset;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn brackets_2025() -> Vec<TaxBracket> {
        PolicyPreset::Law2025.policy().unwrap().brackets().to_vec()
    }

    /// PT-001: income inside the third bracket
    #[test]
    fn test_third_bracket() {
        let result = compute_progressive_tax(dec("11450000"), &brackets_2025(), 1);

        assert_eq!(result.per_bracket[0].taxed_amount, dec("5000000"));
        assert_eq!(result.per_bracket[0].tax_amount, dec("250000"));
        assert_eq!(result.per_bracket[1].taxed_amount, dec("5000000"));
        assert_eq!(result.per_bracket[1].tax_amount, dec("500000"));
        assert_eq!(result.per_bracket[2].taxed_amount, dec("1450000"));
        assert_eq!(result.per_bracket[2].tax_amount, dec("217500"));
        assert_eq!(result.per_bracket[3].taxed_amount, Decimal::ZERO);
        assert_eq!(result.total, dec("967500"));
    }

    /// PT-002: every bracket is reported even when untouched
    #[test]
    fn test_full_schedule_always_returned() {
        let result = compute_progressive_tax(dec("1000000"), &brackets_2025(), 1);

        assert_eq!(result.per_bracket.len(), 7);
        assert_eq!(result.per_bracket[0].tax_amount, dec("50000"));
        assert!(result.per_bracket[1..]
            .iter()
            .all(|row| row.tax_amount == Decimal::ZERO));
    }

    /// PT-003: top bracket is unbounded
    #[test]
    fn test_top_bracket() {
        let result = compute_progressive_tax(dec("100000000"), &brackets_2025(), 1);

        // 250k + 500k + 1.2M + 2.8M + 5M + 8.4M + 20M x 35%
        assert_eq!(result.per_bracket[6].min_income, dec("80000000"));
        assert_eq!(result.per_bracket[6].max_income, None);
        assert_eq!(result.per_bracket[6].taxed_amount, dec("20000000"));
        assert_eq!(result.total, dec("25150000"));
    }

    #[test]
    fn test_bracket_boundaries_and_levels() {
        let result = compute_progressive_tax(dec("5000000"), &brackets_2025(), 1);

        assert_eq!(result.per_bracket[0].level, 1);
        assert_eq!(result.per_bracket[0].min_income, Decimal::ZERO);
        assert_eq!(result.per_bracket[0].max_income, Some(dec("5000000")));
        assert_eq!(result.per_bracket[1].min_income, dec("5000000"));
        assert_eq!(result.per_bracket[1].taxed_amount, Decimal::ZERO);
        assert_eq!(result.total, dec("250000"));
    }

    #[test]
    fn test_negative_taxable_income_clamped() {
        let result = compute_progressive_tax(dec("-2000000"), &brackets_2025(), 1);

        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.total, Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("No taxable income"));
    }

    #[test]
    fn test_rows_reconcile_with_total() {
        for amount in ["0", "1", "4999999", "17999999.5", "33333333", "123456789"] {
            let result = compute_progressive_tax(dec(amount), &brackets_2025(), 1);
            let sum: Decimal = result.per_bracket.iter().map(|r| r.tax_amount).sum();
            assert_eq!(sum, result.total, "mismatch at {}", amount);
        }
    }

    #[test]
    fn test_per_bracket_rounding() {
        // 3 x 5% = 0.15 -> 0
        let result = compute_progressive_tax(dec("3"), &brackets_2025(), 1);
        assert_eq!(result.total, Decimal::ZERO);
        // 10 x 5% = 0.5 -> 1
        let result = compute_progressive_tax(dec("10"), &brackets_2025(), 1);
        assert_eq!(result.total, Decimal::ONE);
    }

    #[test]
    fn test_total_only_matches_full_result() {
        let brackets = brackets_2025();
        for amount in ["0", "7500000", "45000000", "95000000"] {
            assert_eq!(
                progressive_tax_total(dec(amount), &brackets),
                compute_progressive_tax(dec(amount), &brackets, 1).total
            );
        }
    }

    #[test]
    fn test_audit_reasoning_lists_slices() {
        let result = compute_progressive_tax(dec("11450000"), &brackets_2025(), 4);

        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.output["brackets_reached"], 3);
        assert!(result.audit_step.reasoning.contains("1450000 x 0.15"));
        assert!(result.audit_step.reasoning.ends_with("= 967500"));
    }
}
