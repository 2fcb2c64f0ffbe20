//! End-to-end scenarios against the library API.
//!
//! These exercise the engines, the session and the report together, without
//! the HTTP layer.

use rust_decimal::Decimal;
use std::str::FromStr;

use pit_engine::calculation::{calculate, gross_to_net, net_to_gross};
use pit_engine::config::{PolicyLoader, PolicyPreset};
use pit_engine::models::{AdditionalIncome, AdditionalIncomeType, CalculationInput, Region};
use pit_engine::report::ResultReport;
use pit_engine::session::CalculatorSession;

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn reference_input() -> CalculationInput {
    CalculationInput::gross(dec("30000000"), Region::I).with_dependents(1)
}

fn extra(id: &str, income_type: AdditionalIncomeType, amount: &str) -> AdditionalIncome {
    AdditionalIncome::new(id, income_type, dec(amount), id)
}

/// total_net + total_tax + insurance == gross + supplementary amounts
fn assert_balanced(input: &CalculationInput, policy_preset: PolicyPreset) {
    let policy = policy_preset.policy().unwrap();
    let result = gross_to_net(input, &policy);
    assert_eq!(
        result.total_net + result.total_tax + result.total_insurance(),
        result.gross + result.total_additional_income(),
        "unbalanced result for {:?}",
        input
    );
}

// =============================================================================
// SECTION 1: Reference Scenarios
// =============================================================================

#[test]
fn test_reference_2025() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let result = gross_to_net(&reference_input(), &policy);

    assert_eq!(result.insurance.total(), dec("3150000"));
    assert_eq!(result.income_before_tax, dec("26850000"));
    assert_eq!(result.total_deductions, dec("15400000"));
    assert_eq!(result.taxable_income, dec("11450000"));
    assert_eq!(result.personal_income_tax, dec("967500"));
    assert_eq!(result.net, dec("25882500"));
    assert_eq!(result.total_net, result.net);
    assert_eq!(result.total_tax, result.personal_income_tax);
}

#[test]
fn test_reference_2026() {
    let policy = PolicyPreset::Proposal2026.policy().unwrap();
    let result = gross_to_net(&reference_input(), &policy);

    assert_eq!(result.taxable_income, dec("5150000"));
    assert_eq!(result.personal_income_tax, dec("257500"));
}

#[test]
fn test_reference_round_trip() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let input = CalculationInput::net(dec("25882500"), Region::I).with_dependents(1);

    let result = net_to_gross(&input, &policy).unwrap();

    assert_eq!(result.gross, dec("30000000"));
    assert_eq!(result.net, dec("25882500"));
}

/// Rounding to the dong makes 15,112,993 and 15,112,995 share one net.
#[test]
fn test_round_trip_on_rounding_plateau() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let upper = gross_to_net(&CalculationInput::gross(dec("15112995"), Region::I), &policy);
    let below = gross_to_net(&CalculationInput::gross(dec("15112992"), Region::I), &policy);
    assert_eq!(upper.net, dec("13399823"));
    assert_eq!(below.net, dec("13399822"));

    let result = net_to_gross(&CalculationInput::net(upper.net, Region::I), &policy).unwrap();

    assert_eq!(result.gross, dec("15112993"));
    assert_eq!(result.net, upper.net);
}

#[test]
fn test_calculate_dispatches_on_income_type() {
    let policy = PolicyPreset::Law2025.policy().unwrap();

    let forward = calculate(&reference_input(), &policy).unwrap();
    let inverse = calculate(
        &CalculationInput::net(forward.net, Region::I).with_dependents(1),
        &policy,
    )
    .unwrap();

    assert_eq!(inverse.gross, forward.gross);
}

// =============================================================================
// SECTION 2: Supplementary Incomes
// =============================================================================

#[test]
fn test_freelance_scenario() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let input = reference_input().with_additional_income(extra(
        "a1",
        AdditionalIncomeType::Freelance,
        "5000000",
    ));

    let result = gross_to_net(&input, &policy);

    assert_eq!(result.additional_tax_details[0].tax, dec("500000"));
    assert_eq!(result.total_net, dec("30382500"));
    assert_eq!(result.total_tax, dec("1467500"));
}

#[test]
fn test_salary_like_scenario() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let input = reference_input().with_additional_income(extra(
        "a1",
        AdditionalIncomeType::SalaryLike,
        "5000000",
    ));

    let result = gross_to_net(&input, &policy);

    assert_eq!(result.taxable_income, dec("16450000"));
    assert_eq!(result.personal_income_tax, dec("1717500"));
    assert_eq!(result.additional_tax_details[0].tax, dec("750000"));
    assert_eq!(result.main_salary_tax(), dec("967500"));
    assert_eq!(result.total_net, dec("30132500"));
}

#[test]
fn test_mixed_incomes_balance() {
    let input = reference_input()
        .with_additional_income(extra("a1", AdditionalIncomeType::SalaryLike, "3333333"))
        .with_additional_income(extra("a2", AdditionalIncomeType::SalaryLike, "1666667"))
        .with_additional_income(extra("a3", AdditionalIncomeType::Investment, "2500001"))
        .with_additional_income(extra("a4", AdditionalIncomeType::NonTaxable, "700000"));

    assert_balanced(&input, PolicyPreset::Law2025);
    assert_balanced(&input, PolicyPreset::Proposal2026);
}

#[test]
fn test_pooled_shares_sum_to_pooled_tax() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let input = reference_input()
        .with_additional_income(extra("a1", AdditionalIncomeType::SalaryLike, "1000001"))
        .with_additional_income(extra("a2", AdditionalIncomeType::SalaryLike, "1000001"))
        .with_additional_income(extra("a3", AdditionalIncomeType::SalaryLike, "1000001"));

    let result = gross_to_net(&input, &policy);
    let shares: Decimal = result.additional_tax_details.iter().map(|d| d.tax).sum();

    assert_eq!(shares, result.personal_income_tax - result.main_salary_tax());
}

#[test]
fn test_net_to_gross_ignores_supplementary_incomes() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let input = CalculationInput::net(dec("25882500"), Region::I)
        .with_dependents(1)
        .with_additional_income(extra("a1", AdditionalIncomeType::SalaryLike, "5000000"));

    let result = net_to_gross(&input, &policy).unwrap();

    assert_eq!(result.gross, dec("30000000"));
    assert_eq!(result.net, dec("25882500"));
    assert!(result.total_net > result.net);
}

// =============================================================================
// SECTION 3: Session and Report
// =============================================================================

#[test]
fn test_session_preset_comparison() {
    let mut session = CalculatorSession::with_preset(PolicyPreset::Law2025).unwrap();
    let net_2025 = session.calculate(reference_input()).unwrap().net;

    let net_2026 = session
        .switch_preset(PolicyPreset::Proposal2026)
        .unwrap()
        .unwrap()
        .net;

    assert_eq!(net_2026 - net_2025, dec("710000"));
}

#[test]
fn test_report_for_reference_result() {
    let policy = PolicyPreset::Law2025.policy().unwrap();
    let result = gross_to_net(&reference_input(), &policy);

    let report = ResultReport::new(&result, &policy);

    assert_eq!(report.net, dec("25882500"));
    assert_eq!(report.bracket_tax, dec("967500"));
    assert_eq!(report.brackets[1].range_label, "Trên 5 đến 10 triệu");
    assert!(report.to_string().contains("25.882.500"));
}

#[test]
fn test_builtin_loader_matches_presets() {
    let loader = PolicyLoader::builtin().unwrap();

    for preset in [PolicyPreset::Law2025, PolicyPreset::Proposal2026] {
        assert_eq!(loader.get(preset.id()).unwrap(), &preset.policy().unwrap());
    }
}
