//! Calculator session.
//!
//! A [`CalculatorSession`] keeps the active policy with the last input and
//! result, so that switching presets or saving an edited policy recomputes
//! what is on screen.

use rust_decimal::Decimal;
use tracing::info;

use crate::advisor::context_summary;
use crate::calculation::calculate;
use crate::config::{Policy, PolicyPreset};
use crate::error::EngineResult;
use crate::models::{CalculationInput, TaxResult};
use crate::report::ResultReport;

/// Policy id reported once the active policy has been edited.
pub const CUSTOM_POLICY_ID: &str = "custom";

/// The state of one interactive calculator.
#[derive(Debug, Clone)]
pub struct CalculatorSession {
    policy: Policy,
    policy_id: String,
    last_input: Option<CalculationInput>,
    last_result: Option<TaxResult>,
}

impl CalculatorSession {
    /// Starts a session on the default preset.
    pub fn new() -> EngineResult<Self> {
        Self::with_preset(PolicyPreset::default())
    }

    /// Starts a session on `preset`.
    pub fn with_preset(preset: PolicyPreset) -> EngineResult<Self> {
        Ok(Self {
            policy: preset.policy()?,
            policy_id: preset.id().to_string(),
            last_input: None,
            last_result: None,
        })
    }

    /// Returns the active policy.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Returns the preset id, or [`CUSTOM_POLICY_ID`] after an edit.
    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    /// Returns the last calculated input.
    pub fn last_input(&self) -> Option<&CalculationInput> {
        self.last_input.as_ref()
    }

    /// Returns the displayed result.
    pub fn last_result(&self) -> Option<&TaxResult> {
        self.last_result.as_ref()
    }

    /// Validates and calculates `input` under the active policy.
    ///
    /// On error the previous input and result are kept.
    pub fn calculate(&mut self, input: CalculationInput) -> EngineResult<&TaxResult> {
        input.validate()?;
        let result = calculate(&input, &self.policy)?;
        self.last_input = Some(input);
        Ok(self.last_result.insert(result))
    }

    /// Switches to `preset`, recomputing the displayed result if the last
    /// input had a positive main income.
    pub fn switch_preset(&mut self, preset: PolicyPreset) -> EngineResult<Option<&TaxResult>> {
        let policy = preset.policy()?;
        let rerun = self
            .last_input
            .as_ref()
            .is_some_and(|input| input.income > Decimal::ZERO);
        info!(preset = %preset, rerun, "Switching policy preset");
        self.replace_policy(policy, preset.id().to_string(), rerun)
    }

    /// Replaces the active policy with an edited one, recomputing the
    /// displayed result if there is one.
    pub fn apply_policy(&mut self, policy: Policy) -> EngineResult<Option<&TaxResult>> {
        info!(policy = %policy.name(), "Applying edited policy");
        self.replace_policy(policy, CUSTOM_POLICY_ID.to_string(), true)
    }

    /// Returns to the default preset.
    pub fn reset_policy(&mut self) -> EngineResult<Option<&TaxResult>> {
        self.switch_preset(PolicyPreset::default())
    }

    fn replace_policy(
        &mut self,
        policy: Policy,
        policy_id: String,
        rerun: bool,
    ) -> EngineResult<Option<&TaxResult>> {
        let recomputed = match (&self.last_input, &self.last_result) {
            (Some(input), Some(_)) if rerun => Some(calculate(input, &policy)?),
            _ => None,
        };

        self.policy = policy;
        self.policy_id = policy_id;
        if let Some(result) = recomputed {
            self.last_result = Some(result);
        }
        Ok(self.last_result.as_ref())
    }

    /// Builds the display report of the current result.
    pub fn report(&self) -> Option<ResultReport> {
        self.last_result
            .as_ref()
            .map(|result| ResultReport::new(result, &self.policy))
    }

    /// Returns the digest handed to the tax advisor.
    pub fn advisor_context(&self) -> String {
        context_summary(self.last_result.as_ref())
    }
}
