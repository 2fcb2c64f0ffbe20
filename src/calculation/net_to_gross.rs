//! Net to gross calculation.
//!
//! The inverse engine finds the gross main salary whose net equals a target
//! by bisection over whole-dong gross values, then recomputes the result
//! forward at the converged gross. Bisection needs only that the net is
//! non-decreasing in the gross, which holds across bracket boundaries and
//! insurance caps.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::Policy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, CalculationInput, InsuranceMode, TaxResult};

use super::gross_to_net::{gross_to_net, main_salary_net};

/// Maximum number of bisection iterations.
pub const MAX_SEARCH_ITERATIONS: u32 = 100;

/// The search gives up once the upper bound exceeds this multiple of the
/// target plus any fixed custom insurance base.
pub const SEARCH_CEILING_MULTIPLIER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Largest expected distance between the reported net and the target.
///
/// Contributions and bracket taxes are rounded to the whole dong, so the net
/// can move by more than one dong between adjacent gross values.
pub const NET_TOLERANCE: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Warning code raised when the reported net misses the target by more than
/// [`NET_TOLERANCE`].
pub const NET_DEVIATION_WARNING: &str = "NET_TARGET_DEVIATION";

const INITIAL_BOUND_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
const TWO: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// The converged search interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchOutcome {
    gross: Decimal,
    expansions: u32,
    iterations: u32,
}

/// Finds the smallest probed gross whose main-salary net reaches `target`.
///
/// Maintains `net(lo) < target <= net(hi)` on whole-dong bounds.
fn search_gross(
    input: &CalculationInput,
    target: Decimal,
    policy: &Policy,
) -> EngineResult<SearchOutcome> {
    let net_at = |gross: Decimal| main_salary_net(input, gross, policy);

    if net_at(Decimal::ZERO) >= target {
        return Ok(SearchOutcome {
            gross: Decimal::ZERO,
            expansions: 0,
            iterations: 0,
        });
    }

    let fixed_base = match input.insurance_mode {
        InsuranceMode::Official => Decimal::ZERO,
        InsuranceMode::Custom => input.insurance_salary.max(Decimal::ZERO),
    };
    // Bounds saturate at Decimal::MAX instead of overflowing.
    let ceiling = target
        .checked_add(fixed_base)
        .and_then(|load| SEARCH_CEILING_MULTIPLIER.checked_mul(load))
        .unwrap_or(Decimal::MAX);

    let mut lo = Decimal::ZERO;
    let scaled = target
        .checked_mul(INITIAL_BOUND_FACTOR)
        .map(|bound| bound.ceil())
        .unwrap_or(ceiling);
    let mut hi = match target.floor().checked_add(Decimal::ONE) {
        Some(next) => scaled.max(next),
        None => scaled,
    };
    let mut expansions: u32 = 0;

    while net_at(hi) < target {
        if hi >= ceiling {
            warn!(
                target = %target,
                lower = %lo,
                upper = %hi,
                "Net target unreachable below the search ceiling"
            );
            return Err(EngineError::NotConverged {
                target,
                lower: lo,
                upper: hi,
                iterations: expansions,
            });
        }
        lo = hi;
        hi = hi.checked_mul(TWO).unwrap_or(ceiling).min(ceiling);
        expansions += 1;
        debug!(lower = %lo, upper = %hi, "Expanded net to gross search bound");
    }

    let mut iterations: u32 = 0;
    while hi - lo > Decimal::ONE {
        if iterations >= MAX_SEARCH_ITERATIONS {
            warn!(target = %target, lower = %lo, upper = %hi, "Net to gross search exhausted");
            return Err(EngineError::NotConverged {
                target,
                lower: lo,
                upper: hi,
                iterations,
            });
        }
        let mid = (lo + (hi - lo) / TWO).floor();
        if net_at(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }

    debug!(
        target = %target,
        gross = %hi,
        expansions,
        iterations,
        "Net to gross search converged"
    );

    Ok(SearchOutcome {
        gross: hi,
        expansions,
        iterations,
    })
}

/// Calculates the gross salary that yields a target net salary.
///
/// `input.income` is the target net of the main salary. Supplementary incomes
/// are not part of the search: they are taxed at the converged gross exactly
/// as [`gross_to_net`] would tax them. The returned result is always a fresh
/// forward calculation at the converged gross, with one extra audit step
/// describing the search.
///
/// # Errors
///
/// Returns [`EngineError::NotConverged`] with the last bracketing interval
/// when no gross below the search ceiling reaches the target.
///
/// # Examples
///
/// ```
/// use pit_engine::calculation::net_to_gross;
/// use pit_engine::config::PolicyPreset;
/// use pit_engine::models::{CalculationInput, Region};
/// use rust_decimal::Decimal;
///
/// let policy = PolicyPreset::Law2025.policy().unwrap();
/// let input = CalculationInput::net(Decimal::new(25_882_500, 0), Region::I).with_dependents(1);
/// let result = net_to_gross(&input, &policy).unwrap();
///
/// assert_eq!(result.gross, Decimal::new(30_000_000, 0));
/// ```
pub fn net_to_gross(input: &CalculationInput, policy: &Policy) -> EngineResult<TaxResult> {
    let target = input.income.max(Decimal::ZERO);
    let outcome = search_gross(input, target, policy)?;

    let mut result = gross_to_net(&input.as_gross(outcome.gross), policy);
    let difference = result.net - target;

    let step_number = result.audit_trace.next_step_number();
    result.audit_trace.steps.push(AuditStep {
        step_number,
        rule_id: "net_to_gross_search".to_string(),
        rule_name: "Net to Gross Search".to_string(),
        input: serde_json::json!({
            "target_net": target.normalize().to_string(),
            "max_iterations": MAX_SEARCH_ITERATIONS
        }),
        output: serde_json::json!({
            "gross": outcome.gross.to_string(),
            "net": result.net.to_string(),
            "difference": difference.normalize().to_string(),
            "expansions": outcome.expansions,
            "iterations": outcome.iterations
        }),
        reasoning: format!(
            "Bisection converged on gross {} after {} iterations; net {} vs target {}",
            outcome.gross,
            outcome.iterations,
            result.net,
            target.normalize()
        ),
    });

    if difference.abs() > NET_TOLERANCE {
        result.audit_trace.warnings.push(AuditWarning::new(
            NET_DEVIATION_WARNING,
            format!(
                "Net {} differs from the target {} by {}",
                result.net,
                target.normalize(),
                difference.normalize()
            ),
            "low",
        ));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PolicyPreset, TaxBracket};
    use crate::models::{AdditionalIncome, AdditionalIncomeType, Region};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn policy_2025() -> Policy {
        PolicyPreset::Law2025.policy().unwrap()
    }

    /// Net can never exceed half of the first million.
    fn capped_net_policy() -> Policy {
        let mut config = policy_2025().into_config();
        config.deduction.personal = Decimal::ZERO;
        config.deduction.dependent = Decimal::ZERO;
        config.insurance.social = Decimal::ZERO;
        config.insurance.health = Decimal::ZERO;
        config.insurance.unemployment = Decimal::ZERO;
        config.brackets = vec![
            TaxBracket::bounded(dec("1000000"), dec("0.5")),
            TaxBracket::unbounded(dec("1.0")),
        ];
        Policy::new(config).unwrap()
    }

    /// N2G-001: reference scenario reconverges exactly
    #[test]
    fn test_reference_scenario_round_trip() {
        let input = CalculationInput::net(dec("25882500"), Region::I).with_dependents(1);
        let result = net_to_gross(&input, &policy_2025()).unwrap();

        assert_eq!(result.gross, dec("30000000"));
        assert_eq!(result.net, dec("25882500"));
        assert_eq!(result.personal_income_tax, dec("967500"));
    }

    /// N2G-002: reported net meets the target within tolerance
    #[test]
    fn test_net_within_tolerance() {
        let policy = PolicyPreset::Proposal2026.policy().unwrap();
        for target in ["5000000", "17333333", "42000000", "150000000"] {
            let input = CalculationInput::net(dec(target), Region::III).with_dependents(2);
            let result = net_to_gross(&input, &policy).unwrap();

            assert!(result.net >= dec(target), "net below target {}", target);
            assert!(
                result.net - dec(target) <= NET_TOLERANCE,
                "target {} got {}",
                target,
                result.net
            );
        }
    }

    /// N2G-003: unreachable target fails with the last interval
    #[test]
    fn test_not_converged() {
        let input = CalculationInput::net(dec("1000000"), Region::I);
        match net_to_gross(&input, &capped_net_policy()) {
            Err(EngineError::NotConverged {
                target,
                lower,
                upper,
                ..
            }) => {
                assert_eq!(target, dec("1000000"));
                assert_eq!(upper, dec("100000000"));
                assert!(lower < upper);
            }
            other => panic!("Expected NotConverged error, got {:?}", other),
        }
    }

    /// N2G-004: targets near the Decimal range search without overflowing
    #[test]
    fn test_huge_target_converges() {
        let target = dec("1000000000000000000000000000");
        let input = CalculationInput::net(target, Region::I);

        let result = net_to_gross(&input, &policy_2025()).unwrap();

        assert!(result.net >= target);
        assert!(result.gross > target);
    }

    /// N2G-005: an unreachable target at the top of the range fails cleanly
    #[test]
    fn test_max_target_not_converged() {
        let input = CalculationInput::net(Decimal::MAX, Region::I);

        match net_to_gross(&input, &policy_2025()) {
            Err(EngineError::NotConverged { upper, .. }) => assert_eq!(upper, Decimal::MAX),
            other => panic!("Expected NotConverged error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_target_with_supplementary_income() {
        let input = CalculationInput::net(Decimal::ZERO, Region::I).with_additional_income(
            AdditionalIncome::new("a1", AdditionalIncomeType::Freelance, dec("5000000"), "Dịch thuật"),
        );
        let result = net_to_gross(&input, &policy_2025()).unwrap();

        assert_eq!(result.gross, Decimal::ZERO);
        assert_eq!(result.total_net, dec("4500000"));
        assert_eq!(result.total_tax, dec("500000"));
    }

    #[test]
    fn test_supplementary_income_does_not_move_gross() {
        let policy = policy_2025();
        let plain = CalculationInput::net(dec("25882500"), Region::I).with_dependents(1);
        let with_bonus = plain.clone().with_additional_income(AdditionalIncome::new(
            "a1",
            AdditionalIncomeType::SalaryLike,
            dec("8000000"),
            "Thưởng",
        ));

        let a = net_to_gross(&plain, &policy).unwrap();
        let b = net_to_gross(&with_bonus, &policy).unwrap();

        assert_eq!(a.gross, b.gross);
        assert_eq!(a.net, b.net);
        assert!(b.total_tax > a.total_tax);
    }

    #[test]
    fn test_custom_insurance_base_is_covered() {
        let input = CalculationInput::net(dec("10000000"), Region::I)
            .with_custom_insurance(dec("40000000"));
        let result = net_to_gross(&input, &policy_2025()).unwrap();

        assert!(result.net >= dec("10000000"));
        assert!(result.net - dec("10000000") <= NET_TOLERANCE);
        assert_eq!(result.total_insurance(), dec("4200000"));
    }

    #[test]
    fn test_search_step_appended() {
        let input = CalculationInput::net(dec("25882500"), Region::I).with_dependents(1);
        let result = net_to_gross(&input, &policy_2025()).unwrap();
        let last = result.audit_trace.steps.last().unwrap();

        assert_eq!(last.rule_id, "net_to_gross_search");
        assert_eq!(last.step_number as usize, result.audit_trace.steps.len());
        assert_eq!(last.output["gross"].as_str().unwrap(), "30000000");
        assert!(!result.audit_trace.has_warning(NET_DEVIATION_WARNING));
    }

    #[test]
    fn test_converged_gross_is_minimal() {
        let policy = policy_2025();
        let input = CalculationInput::net(dec("25882500"), Region::I).with_dependents(1);
        let result = net_to_gross(&input, &policy).unwrap();

        let below = main_salary_net(&input, result.gross - Decimal::ONE, &policy);
        assert!(below < dec("25882500"));
    }
}
