//! Calculation input models.
//!
//! This module defines [`CalculationInput`] and the enums that describe how
//! its figures should be interpreted: which quantity the income represents,
//! how the insurance contribution base is chosen, which regional minimum wage
//! tier applies, and how each supplementary income is taxed.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest amount accepted by [`CalculationInput::validate`] (10^15 dong).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

fn check_amount(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: field.to_string(),
            message: "cannot be negative".to_string(),
        });
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::InvalidInput {
            field: field.to_string(),
            message: format!("cannot exceed {}", MAX_AMOUNT),
        });
    }
    Ok(())
}

/// Which quantity the primary `income` figure represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeType {
    /// The stated salary before insurance and tax.
    Gross,
    /// The take-home salary after insurance and tax.
    Net,
}

/// How the statutory insurance contribution base is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsuranceMode {
    /// Contributions are levied on the gross salary being evaluated.
    #[default]
    Official,
    /// Contributions are levied on the caller-supplied `insurance_salary`.
    Custom,
}

/// The four regional minimum wage tiers.
///
/// Tiers are ordered: region I (Hanoi, Ho Chi Minh City) has the highest
/// minimum wage, region IV the lowest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Region I.
    #[default]
    #[serde(rename = "I")]
    I,
    /// Region II.
    #[serde(rename = "II")]
    II,
    /// Region III.
    #[serde(rename = "III")]
    III,
    /// Region IV.
    #[serde(rename = "IV")]
    IV,
}

impl Region {
    /// All regions in tier order.
    pub const ALL: [Region; 4] = [Region::I, Region::II, Region::III, Region::IV];

    /// Returns the tier number (1 to 4).
    pub fn tier(self) -> u8 {
        match self {
            Region::I => 1,
            Region::II => 2,
            Region::III => 3,
            Region::IV => 4,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numeral = match self {
            Region::I => "I",
            Region::II => "II",
            Region::III => "III",
            Region::IV => "IV",
        };
        write!(f, "Vùng {}", numeral)
    }
}

/// The taxation regime of a supplementary income entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdditionalIncomeType {
    /// Exempt from personal income tax.
    NonTaxable,
    /// Pooled with the main salary and taxed progressively.
    SalaryLike,
    /// Casual service income, withheld at a flat rate.
    Freelance,
    /// Capital investment income, withheld at a flat rate.
    Investment,
}

impl AdditionalIncomeType {
    /// Returns the display name used in result tables.
    pub fn type_name(self) -> &'static str {
        match self {
            AdditionalIncomeType::NonTaxable => "Miễn thuế",
            AdditionalIncomeType::SalaryLike => "Gộp lương",
            AdditionalIncomeType::Freelance => "Vãng lai",
            AdditionalIncomeType::Investment => "Đầu tư",
        }
    }
}

/// A supplementary income stream received alongside the main salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalIncome {
    /// Identifier, unique within one input.
    pub id: String,
    /// How this income is taxed.
    #[serde(rename = "type")]
    pub income_type: AdditionalIncomeType,
    /// The amount received this month.
    pub amount: Decimal,
    /// Free text label (e.g. "Thưởng tết").
    #[serde(default)]
    pub label: String,
}

impl AdditionalIncome {
    /// Creates a new supplementary income entry.
    pub fn new(
        id: impl Into<String>,
        income_type: AdditionalIncomeType,
        amount: Decimal,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            income_type,
            amount,
            label: label.into(),
        }
    }
}

/// Everything the engine needs to know about one monthly salary calculation.
///
/// # Example
///
/// ```
/// use pit_engine::models::{CalculationInput, IncomeType, Region};
/// use rust_decimal::Decimal;
///
/// let input = CalculationInput::gross(Decimal::new(30_000_000, 0), Region::I)
///     .with_dependents(1);
/// assert_eq!(input.income_type, IncomeType::Gross);
/// assert_eq!(input.dependents, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// The primary salary figure, gross or net according to `income_type`.
    pub income: Decimal,
    /// Which quantity `income` represents.
    pub income_type: IncomeType,
    /// The regional minimum wage tier of the workplace.
    #[serde(default)]
    pub region: Region,
    /// Number of registered dependents.
    #[serde(default)]
    pub dependents: u32,
    /// Contribution base used when `insurance_mode` is `Custom`.
    #[serde(default)]
    pub insurance_salary: Decimal,
    /// How the insurance contribution base is chosen.
    #[serde(default)]
    pub insurance_mode: InsuranceMode,
    /// Other deductible amounts (charity, voluntary pension...).
    #[serde(default)]
    pub other_deductions: Decimal,
    /// Supplementary income streams.
    #[serde(default)]
    pub additional_incomes: Vec<AdditionalIncome>,
}

impl CalculationInput {
    fn new(income: Decimal, income_type: IncomeType, region: Region) -> Self {
        Self {
            income,
            income_type,
            region,
            dependents: 0,
            insurance_salary: Decimal::ZERO,
            insurance_mode: InsuranceMode::Official,
            other_deductions: Decimal::ZERO,
            additional_incomes: Vec::new(),
        }
    }

    /// Creates an input whose income is a gross salary.
    pub fn gross(income: Decimal, region: Region) -> Self {
        Self::new(income, IncomeType::Gross, region)
    }

    /// Creates an input whose income is a target net salary.
    pub fn net(income: Decimal, region: Region) -> Self {
        Self::new(income, IncomeType::Net, region)
    }

    /// Sets the number of dependents.
    pub fn with_dependents(mut self, dependents: u32) -> Self {
        self.dependents = dependents;
        self
    }

    /// Switches to a custom insurance contribution base.
    pub fn with_custom_insurance(mut self, insurance_salary: Decimal) -> Self {
        self.insurance_mode = InsuranceMode::Custom;
        self.insurance_salary = insurance_salary;
        self
    }

    /// Sets other deductible amounts.
    pub fn with_other_deductions(mut self, other_deductions: Decimal) -> Self {
        self.other_deductions = other_deductions;
        self
    }

    /// Appends a supplementary income entry.
    pub fn with_additional_income(mut self, income: AdditionalIncome) -> Self {
        self.additional_incomes.push(income);
        self
    }

    /// Returns a copy of this input evaluated as a gross salary of `gross`.
    ///
    /// Used by the net to gross search to probe candidate gross figures.
    pub fn as_gross(&self, gross: Decimal) -> Self {
        Self {
            income: gross,
            income_type: IncomeType::Gross,
            ..self.clone()
        }
    }

    /// Returns true if there is anything to calculate.
    ///
    /// A calculation needs a positive primary income or at least one
    /// supplementary income.
    pub fn is_calculable(&self) -> bool {
        self.income > Decimal::ZERO || !self.additional_incomes.is_empty()
    }

    /// Checks the caller preconditions on this input.
    ///
    /// The engine itself clamps negative figures to zero; this check is for
    /// boundaries (HTTP, session) that should reject such input outright.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.is_calculable() {
            return Err(EngineError::InvalidInput {
                field: "income".to_string(),
                message: "must be positive when there are no additional incomes".to_string(),
            });
        }

        check_amount("income", self.income)?;
        check_amount("insurance_salary", self.insurance_salary)?;
        check_amount("other_deductions", self.other_deductions)?;

        let mut seen = HashSet::new();
        for (index, income) in self.additional_incomes.iter().enumerate() {
            check_amount(&format!("additional_incomes[{}].amount", index), income.amount)?;
            if !seen.insert(income.id.as_str()) {
                return Err(EngineError::InvalidInput {
                    field: format!("additional_incomes[{}].id", index),
                    message: format!("duplicate id '{}'", income.id),
                });
            }
        }

        Ok(())
    }
}
