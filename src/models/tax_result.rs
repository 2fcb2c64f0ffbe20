//! Tax result models for the PIT engine.
//!
//! This module contains the [`TaxResult`] type and its associated structures
//! that capture every output of one calculation: insurance contributions, the
//! progressive bracket schedule, supplementary income taxation, aggregate
//! totals, and an audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AdditionalIncomeType;

/// The three statutory insurance contributions paid by the employee.
///
/// # Example
///
/// ```
/// use pit_engine::models::InsuranceContributions;
/// use rust_decimal::Decimal;
///
/// let contributions = InsuranceContributions {
///     social: Decimal::new(2_400_000, 0),
///     health: Decimal::new(450_000, 0),
///     unemployment: Decimal::new(300_000, 0),
/// };
/// assert_eq!(contributions.total(), Decimal::new(3_150_000, 0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceContributions {
    /// Social insurance (BHXH).
    pub social: Decimal,
    /// Health insurance (BHYT).
    pub health: Decimal,
    /// Unemployment insurance (BHTN).
    pub unemployment: Decimal,
}

impl InsuranceContributions {
    /// Returns the sum of all three contributions.
    pub fn total(&self) -> Decimal {
        self.social + self.health + self.unemployment
    }
}

/// One row of the progressive tax schedule as applied to a taxable income.
///
/// Every bracket of the policy produces a row, including brackets the income
/// never reaches, so the whole schedule is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketDetail {
    /// The 1-based bracket level.
    pub level: u32,
    /// Lower bound of the bracket (exclusive).
    pub min_income: Decimal,
    /// Upper bound of the bracket (inclusive), `None` for the top bracket.
    pub max_income: Option<Decimal>,
    /// Marginal rate of the bracket.
    pub rate: Decimal,
    /// The part of the taxable income falling in this bracket.
    pub taxed_amount: Decimal,
    /// Tax owed on `taxed_amount`, rounded to the whole dong.
    pub tax_amount: Decimal,
}

/// How one supplementary income entry was taxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalTaxDetail {
    /// The id of the originating entry.
    pub id: String,
    /// The label of the originating entry.
    pub label: String,
    /// The taxation regime applied.
    #[serde(rename = "type")]
    pub income_type: AdditionalIncomeType,
    /// Display name of the regime.
    pub type_name: String,
    /// The amount received.
    pub amount: Decimal,
    /// The flat rate applied, `None` for pooled entries.
    pub rate: Option<Decimal>,
    /// Tax attributable to this entry.
    pub tax: Decimal,
    /// True if the entry was taxed through the progressive schedule.
    ///
    /// A pooled entry's `tax` is its share of `personal_income_tax` and is
    /// not added to `total_tax` a second time.
    pub pooled: bool,
}

impl AdditionalTaxDetail {
    /// Returns the amount kept after tax.
    pub fn net(&self) -> Decimal {
        self.amount - self.tax
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a new warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns the number the next appended step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if a warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The complete result of a gross to net or net to gross calculation.
///
/// A result is constructed fresh by one engine invocation and never mutated.
/// The main salary figures (`gross`, `net`) exclude supplementary incomes;
/// `total_net` and `total_tax` include them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Name of the policy the result was computed under.
    pub policy_name: String,
    /// Gross main salary.
    pub gross: Decimal,
    /// Net main salary after insurance and the tax the salary carries.
    pub net: Decimal,
    /// Employee insurance contributions.
    pub insurance: InsuranceContributions,
    /// Gross minus insurance.
    pub income_before_tax: Decimal,
    /// Family deductions plus other deductions applied.
    pub total_deductions: Decimal,
    /// Sum of SALARY_LIKE supplementary incomes pooled into the schedule.
    pub salary_like_income: Decimal,
    /// Income subject to the progressive schedule (pooled).
    pub taxable_income: Decimal,
    /// Progressive tax on `taxable_income`.
    pub personal_income_tax: Decimal,
    /// Per-bracket breakdown reconciling to `personal_income_tax`.
    pub detail_tax: Vec<BracketDetail>,
    /// Per-entry taxation of supplementary incomes.
    pub additional_tax_details: Vec<AdditionalTaxDetail>,
    /// Net main salary plus everything kept from supplementary incomes.
    pub total_net: Decimal,
    /// Progressive tax plus flat-rate supplementary taxes.
    pub total_tax: Decimal,
    /// Audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl TaxResult {
    /// Returns the sum of the three insurance contributions.
    pub fn total_insurance(&self) -> Decimal {
        self.insurance.total()
    }

    /// Returns the sum of all supplementary income amounts.
    pub fn total_additional_income(&self) -> Decimal {
        self.additional_tax_details.iter().map(|d| d.amount).sum()
    }

    /// Returns the tax carried by the main salary alone.
    pub fn main_salary_tax(&self) -> Decimal {
        let pooled: Decimal = self
            .additional_tax_details
            .iter()
            .filter(|d| d.pooled)
            .map(|d| d.tax)
            .sum();
        self.personal_income_tax - pooled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_detail(income_type: AdditionalIncomeType, amount: &str, tax: &str) -> AdditionalTaxDetail {
        AdditionalTaxDetail {
            id: "a1".to_string(),
            label: "Thưởng".to_string(),
            income_type,
            type_name: income_type.type_name().to_string(),
            amount: dec(amount),
            rate: None,
            tax: dec(tax),
            pooled: income_type == AdditionalIncomeType::SalaryLike,
        }
    }

    fn create_result(details: Vec<AdditionalTaxDetail>) -> TaxResult {
        TaxResult {
            policy_name: "Test".to_string(),
            gross: dec("30000000"),
            net: dec("25882500"),
            insurance: InsuranceContributions {
                social: dec("2400000"),
                health: dec("450000"),
                unemployment: dec("300000"),
            },
            income_before_tax: dec("26850000"),
            total_deductions: dec("15400000"),
            salary_like_income: Decimal::ZERO,
            taxable_income: dec("11450000"),
            personal_income_tax: dec("967500"),
            detail_tax: vec![],
            additional_tax_details: details,
            total_net: dec("25882500"),
            total_tax: dec("967500"),
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_total_insurance() {
        let result = create_result(vec![]);
        assert_eq!(result.total_insurance(), dec("3150000"));
    }

    #[test]
    fn test_main_salary_tax_excludes_pooled_share() {
        let result = create_result(vec![
            create_detail(AdditionalIncomeType::SalaryLike, "2000000", "300000"),
            create_detail(AdditionalIncomeType::Freelance, "1000000", "100000"),
        ]);
        assert_eq!(result.main_salary_tax(), dec("667500"));
        assert_eq!(result.total_additional_income(), dec("3000000"));
    }

    #[test]
    fn test_additional_detail_net() {
        let detail = create_detail(AdditionalIncomeType::Freelance, "5000000", "500000");
        assert_eq!(detail.net(), dec("4500000"));
    }

    #[test]
    fn test_bracket_detail_serialization() {
        let detail = BracketDetail {
            level: 7,
            min_income: dec("80000000"),
            max_income: None,
            rate: dec("0.35"),
            taxed_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
        };
        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("\"level\":7"));
        assert!(json.contains("\"max_income\":null"));
        assert!(json.contains("\"rate\":\"0.35\""));
    }

    #[test]
    fn test_additional_detail_serializes_type_key() {
        let detail = create_detail(AdditionalIncomeType::Investment, "1000000", "50000");
        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("\"type\":\"INVESTMENT\""));
        assert!(json.contains("\"type_name\":\"Đầu tư\""));
    }

    #[test]
    fn test_audit_trace_helpers() {
        let mut trace = AuditTrace::default();
        assert_eq!(trace.next_step_number(), 1);

        trace.warnings.push(AuditWarning::new("SOCIAL_CAP_APPLIED", "capped", "low"));
        assert!(trace.has_warning("SOCIAL_CAP_APPLIED"));
        assert!(!trace.has_warning("NEGATIVE_NET_SALARY"));
    }

    #[test]
    fn test_tax_result_round_trips_through_json() {
        let result = create_result(vec![create_detail(
            AdditionalIncomeType::NonTaxable,
            "1000000",
            "0",
        )]);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: TaxResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
