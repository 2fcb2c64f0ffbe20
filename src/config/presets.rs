//! Built-in policy presets.
//!
//! The presets are the YAML files under `config/policies/`, embedded at
//! compile time so the engine works without a configuration directory.

use std::fmt;

use crate::error::{EngineError, EngineResult};

use super::loader::PolicyLoader;
use super::policy::Policy;

const LAW_2025_YAML: &str = include_str!("../../config/policies/2025.yaml");
const PROPOSAL_2026_YAML: &str = include_str!("../../config/policies/2026.yaml");

/// A named, versioned policy shipped with the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolicyPreset {
    /// The personal income tax law in force for 2025.
    Law2025,
    /// The proposed schedule for 2026.
    #[default]
    Proposal2026,
}

impl PolicyPreset {
    /// All presets in chronological order.
    pub const ALL: [PolicyPreset; 2] = [PolicyPreset::Law2025, PolicyPreset::Proposal2026];

    /// Returns the preset id used in policy files and requests.
    pub fn id(self) -> &'static str {
        match self {
            PolicyPreset::Law2025 => "2025",
            PolicyPreset::Proposal2026 => "2026",
        }
    }

    /// Looks a preset up by id.
    pub fn from_id(id: &str) -> EngineResult<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.id() == id)
            .ok_or_else(|| EngineError::PresetNotFound { id: id.to_string() })
    }

    /// Returns the embedded YAML source.
    pub fn yaml(self) -> &'static str {
        match self {
            PolicyPreset::Law2025 => LAW_2025_YAML,
            PolicyPreset::Proposal2026 => PROPOSAL_2026_YAML,
        }
    }

    /// Parses and validates the preset.
    pub fn policy(self) -> EngineResult<Policy> {
        PolicyLoader::from_yaml_str(&format!("preset:{}", self.id()), self.yaml())
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
