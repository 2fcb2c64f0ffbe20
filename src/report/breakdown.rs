//! Display-ready breakdown of a tax result.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Policy;
use crate::models::{BracketDetail, TaxResult};

use super::format::{format_millions, format_rate, format_vnd};

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// One slice of the net / tax / insurance split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareSlice {
    /// Slice label.
    pub label: String,
    /// Amount in the slice.
    pub amount: Decimal,
    /// Share of the whole, in percent with one decimal.
    pub percent: Decimal,
}

/// How a ladder line relates to the running figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// A running subtotal.
    Subtotal,
    /// An amount taken off the running figure.
    Deduction,
    /// An amount added to the running figure.
    Addition,
}

/// One line of the deduction ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderLine {
    /// Line label.
    pub label: String,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Role of the line.
    pub kind: LineKind,
}

impl LadderLine {
    fn new(label: impl Into<String>, amount: Decimal, kind: LineKind) -> Self {
        Self {
            label: label.into(),
            amount,
            kind,
        }
    }

    fn signed_amount(&self) -> String {
        match self.kind {
            LineKind::Subtotal => format_vnd(self.amount),
            LineKind::Deduction => format!("-{}", format_vnd(self.amount)),
            LineKind::Addition => format!("+{}", format_vnd(self.amount)),
        }
    }
}

/// One row of the bracket schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketRow {
    /// 1-based bracket level.
    pub level: u32,
    /// Range label in millions, e.g. "Trên 5 đến 10 triệu".
    pub range_label: String,
    /// Marginal rate.
    pub rate: Decimal,
    /// Income taxed in this bracket.
    pub taxed_amount: Decimal,
    /// Tax in this bracket.
    pub tax_amount: Decimal,
}

/// One row of the supplementary income table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionalRow {
    /// Entry label.
    pub label: String,
    /// Regime label.
    pub type_name: String,
    /// Amount received.
    pub amount: Decimal,
    /// Tax attributed to the entry.
    pub tax: Decimal,
}

/// Everything a result view shows, computed from a result and its policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultReport {
    /// Policy the result was computed under.
    pub policy_name: String,
    /// Net of the main salary.
    pub net: Decimal,
    /// Everything kept, supplementary incomes included.
    pub total_net: Decimal,
    /// Gross minus net of the main salary.
    pub total_deductions: Decimal,
    /// Net, tax and insurance shares; empty slices omitted.
    pub shares: Vec<ShareSlice>,
    /// The deduction ladder from gross to net.
    pub ladder: Vec<LadderLine>,
    /// The full bracket schedule.
    pub brackets: Vec<BracketRow>,
    /// Sum of the bracket schedule.
    pub bracket_tax: Decimal,
    /// Supplementary incomes, in input order.
    pub additional: Vec<AdditionalRow>,
}

/// Builds the range label of a bracket, in millions.
pub fn bracket_range_label(detail: &BracketDetail) -> String {
    match detail.max_income {
        None => format!("Trên {} triệu", format_millions(detail.min_income)),
        Some(max) if detail.min_income.is_zero() => {
            format!("Đến {} triệu", format_millions(max))
        }
        Some(max) => format!(
            "Trên {} đến {} triệu",
            format_millions(detail.min_income),
            format_millions(max)
        ),
    }
}

fn share_slices(result: &TaxResult) -> Vec<ShareSlice> {
    let parts = [
        ("Thực nhận", result.total_net),
        ("Thuế TNCN", result.total_tax),
        ("Bảo hiểm", result.total_insurance()),
    ];
    let whole: Decimal = parts
        .iter()
        .map(|(_, amount)| (*amount).max(Decimal::ZERO))
        .sum();
    if whole.is_zero() {
        return Vec::new();
    }

    parts
        .iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .map(|(label, amount)| ShareSlice {
            label: label.to_string(),
            amount: *amount,
            percent: (*amount * ONE_HUNDRED / whole).round_dp(1),
        })
        .collect()
}

fn deduction_ladder(result: &TaxResult, policy: &Policy) -> Vec<LadderLine> {
    let rates = policy.insurance();
    let personal = policy.deduction().personal.min(result.total_deductions);
    let dependents_and_other = result.total_deductions - personal;

    let mut ladder = vec![
        LadderLine::new("Lương GROSS", result.gross, LineKind::Subtotal),
        LadderLine::new(
            format!("BHXH ({})", format_rate(rates.social)),
            result.insurance.social,
            LineKind::Deduction,
        ),
        LadderLine::new(
            format!("BHYT ({})", format_rate(rates.health)),
            result.insurance.health,
            LineKind::Deduction,
        ),
        LadderLine::new(
            format!("BHTN ({})", format_rate(rates.unemployment)),
            result.insurance.unemployment,
            LineKind::Deduction,
        ),
        LadderLine::new(
            "Thu nhập trước thuế",
            result.income_before_tax,
            LineKind::Subtotal,
        ),
        LadderLine::new("Giảm trừ bản thân", personal, LineKind::Deduction),
    ];

    if dependents_and_other > Decimal::ZERO {
        ladder.push(LadderLine::new(
            "Giảm trừ người phụ thuộc và khác",
            dependents_and_other,
            LineKind::Deduction,
        ));
    }
    if result.salary_like_income > Decimal::ZERO {
        ladder.push(LadderLine::new(
            "Thu nhập gộp lương",
            result.salary_like_income,
            LineKind::Addition,
        ));
    }

    ladder.push(LadderLine::new(
        "Thu nhập chịu thuế",
        result.taxable_income,
        LineKind::Subtotal,
    ));
    ladder.push(LadderLine::new(
        "Thuế TNCN phải nộp",
        result.personal_income_tax,
        LineKind::Deduction,
    ));
    ladder.push(LadderLine::new("Thực nhận", result.net, LineKind::Subtotal));

    ladder
}

impl ResultReport {
    /// Builds the report for a result computed under `policy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pit_engine::calculation::gross_to_net;
    /// use pit_engine::config::PolicyPreset;
    /// use pit_engine::models::{CalculationInput, Region};
    /// use pit_engine::report::ResultReport;
    /// use rust_decimal::Decimal;
    ///
    /// let policy = PolicyPreset::Law2025.policy().unwrap();
    /// let input = CalculationInput::gross(Decimal::new(30_000_000, 0), Region::I).with_dependents(1);
    /// let report = ResultReport::new(&gross_to_net(&input, &policy), &policy);
    ///
    /// assert_eq!(report.total_deductions, Decimal::new(4_117_500, 0));
    /// assert_eq!(report.brackets[1].range_label, "Trên 5 đến 10 triệu");
    /// ```
    pub fn new(result: &TaxResult, policy: &Policy) -> Self {
        let brackets = result
            .detail_tax
            .iter()
            .map(|detail| BracketRow {
                level: detail.level,
                range_label: bracket_range_label(detail),
                rate: detail.rate,
                taxed_amount: detail.taxed_amount,
                tax_amount: detail.tax_amount,
            })
            .collect::<Vec<_>>();

        let additional = result
            .additional_tax_details
            .iter()
            .map(|detail| AdditionalRow {
                label: detail.label.clone(),
                type_name: detail.type_name.clone(),
                amount: detail.amount,
                tax: detail.tax,
            })
            .collect();

        Self {
            policy_name: result.policy_name.clone(),
            net: result.net,
            total_net: result.total_net,
            total_deductions: result.gross - result.net,
            shares: share_slices(result),
            ladder: deduction_ladder(result, policy),
            bracket_tax: brackets.iter().map(|row| row.tax_amount).sum(),
            brackets,
            additional,
        }
    }
}

impl fmt::Display for ResultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.policy_name)?;
        writeln!(f, "Thực nhận: {} VNĐ/tháng", format_vnd(self.net))?;
        writeln!(f, "Tổng khấu trừ: {} VNĐ/tháng", format_vnd(self.total_deductions))?;
        if self.total_net != self.net {
            writeln!(f, "Tổng thực nhận: {} VNĐ/tháng", format_vnd(self.total_net))?;
        }

        if !self.shares.is_empty() {
            writeln!(f)?;
            for slice in &self.shares {
                writeln!(
                    f,
                    "  {:<34}{:>16} {:>6}%",
                    slice.label,
                    format_vnd(slice.amount),
                    slice.percent
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Chi tiết khấu trừ")?;
        for line in &self.ladder {
            writeln!(f, "  {:<34}{:>16}", line.label, line.signed_amount())?;
        }

        writeln!(f)?;
        writeln!(f, "Biểu thuế lũy tiến")?;
        for row in &self.brackets {
            writeln!(
                f,
                "  Bậc {} {:<24}{:>5}{:>16}{:>14}",
                row.level,
                row.range_label,
                format_rate(row.rate),
                format_vnd(row.taxed_amount),
                format_vnd(row.tax_amount)
            )?;
        }
        writeln!(f, "  {:<58}{:>14}", "Tổng thuế TNCN", format_vnd(self.bracket_tax))?;

        if !self.additional.is_empty() {
            writeln!(f)?;
            writeln!(f, "Thu nhập khác")?;
            for row in &self.additional {
                let tax = if row.tax > Decimal::ZERO {
                    format!("-{}", format_vnd(row.tax))
                } else {
                    "0".to_string()
                };
                writeln!(
                    f,
                    "  {:<24}{:<12}{:>16}{:>14}",
                    row.label,
                    row.type_name,
                    format_vnd(row.amount),
                    tax
                )?;
            }
        }

        Ok(())
    }
}
