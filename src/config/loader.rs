//! Policy loading functionality.
//!
//! This module provides the [`PolicyLoader`] type for loading tax policies
//! from YAML files and keeping them addressable by id.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::policy::Policy;
use super::presets::PolicyPreset;
use super::types::PolicyConfig;

/// Loads and provides access to tax policies.
///
/// The `PolicyLoader` reads YAML policy files and indexes the validated
/// policies by their `id`.
///
/// # Directory Structure
///
/// A policy directory contains one YAML file per policy:
/// ```text
/// config/policies/
/// ├── 2025.yaml    # Law in force for 2025
/// └── 2026.yaml    # Proposed 2026 schedule
/// ```
///
/// # Example
///
/// ```no_run
/// use pit_engine::config::PolicyLoader;
///
/// let loader = PolicyLoader::load_dir("./config/policies")?;
/// let policy = loader.get("2025")?;
/// println!("Loaded policy: {}", policy.name());
/// # Ok::<(), pit_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyLoader {
    policies: BTreeMap<String, Policy>,
}

impl PolicyLoader {
    /// Creates a loader holding the built-in presets.
    pub fn builtin() -> EngineResult<Self> {
        let mut loader = Self::default();
        for preset in PolicyPreset::ALL {
            loader.insert(preset.policy()?);
        }
        Ok(loader)
    }

    /// Loads every `*.yaml` policy in a directory.
    ///
    /// # Returns
    ///
    /// Returns a `PolicyLoader` on success, or an error if:
    /// - The directory is missing or contains no policy files
    /// - Any file contains invalid YAML or misses a required field
    /// - Any policy fails validation
    pub fn load_dir<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let dir_str = path.display().to_string();

        if !path.is_dir() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut loader = Self::default();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let file = entry.path();
            if file.extension().is_some_and(|ext| ext == "yaml") {
                loader.insert(Self::load_file(&file)?);
            }
        }

        if loader.policies.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no policy files found)", dir_str),
            });
        }

        Ok(loader)
    }

    /// Loads and validates a single YAML policy file.
    pub fn load_file<P: AsRef<Path>>(path: P) -> EngineResult<Policy> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&path_str, &content)
    }

    /// Parses and validates a policy from YAML text.
    ///
    /// `source` names the origin of the text in error messages.
    pub fn from_yaml_str(source: &str, yaml: &str) -> EngineResult<Policy> {
        let config: PolicyConfig =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::ConfigParseError {
                path: source.to_string(),
                message: e.to_string(),
            })?;

        let policy = Policy::new(config)?;
        debug!(source, policy_id = policy.id(), "Loaded policy");
        Ok(policy)
    }

    /// Adds a policy, replacing any existing policy with the same id.
    pub fn insert(&mut self, policy: Policy) {
        self.policies.insert(policy.id().to_string(), policy);
    }

    /// Adds every policy of `other`, replacing policies with the same id.
    pub fn merge(&mut self, other: PolicyLoader) {
        self.policies.extend(other.policies);
    }

    /// Gets a policy by id.
    ///
    /// # Returns
    ///
    /// Returns the policy if found, or `PresetNotFound` error.
    pub fn get(&self, id: &str) -> EngineResult<&Policy> {
        self.policies
            .get(id)
            .ok_or_else(|| EngineError::PresetNotFound { id: id.to_string() })
    }

    /// Returns all policies ordered by id.
    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    /// Returns the number of loaded policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if no policy is loaded.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/policies"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_policy_directory() {
        let result = PolicyLoader::load_dir(config_path());
        assert!(result.is_ok(), "Failed to load policies: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.len(), 2);
        assert!(loader.get("2025").is_ok());
        assert!(loader.get("2026").is_ok());
    }

    #[test]
    fn test_load_file_2025() {
        let policy = PolicyLoader::load_file("./config/policies/2025.yaml").unwrap();

        assert_eq!(policy.id(), "2025");
        assert_eq!(policy.deduction().personal, dec("11000000"));
        assert_eq!(policy.deduction().dependent, dec("4400000"));
        assert_eq!(policy.insurance().social, dec("0.08"));
        assert_eq!(policy.brackets().len(), 7);
        assert_eq!(policy.brackets()[0].max, Some(dec("5000000")));
        assert_eq!(policy.brackets()[6].max, None);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match PolicyLoader::load_dir("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => assert!(path.contains("nonexistent")),
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        match PolicyLoader::load_file("/nonexistent/2030.yaml") {
            Err(EngineError::ConfigNotFound { path }) => assert!(path.contains("2030.yaml")),
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        match PolicyLoader::from_yaml_str("inline", "id: [unclosed") {
            Err(EngineError::ConfigParseError { path, .. }) => assert_eq!(path, "inline"),
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_returns_parse_error() {
        let yaml = "id: \"x\"\nname: \"No brackets\"\n";
        assert!(matches!(
            PolicyLoader::from_yaml_str("inline", yaml),
            Err(EngineError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_invalid_policy_returns_configuration_error() {
        let yaml = PolicyPreset::Law2025
            .yaml()
            .replace("rate: \"0.35\"", "rate: \"0.25\"");
        match PolicyLoader::from_yaml_str("inline", &yaml) {
            Err(EngineError::ConfigurationError { field, .. }) => {
                assert_eq!(field, "brackets[6].rate")
            }
            other => panic!("Expected ConfigurationError, got {:?}", other),
        }
    }

    #[test]
    fn test_get_unknown_returns_preset_not_found() {
        let loader = PolicyLoader::builtin().unwrap();
        match loader.get("1999") {
            Err(EngineError::PresetNotFound { id }) => assert_eq!(id, "1999"),
            other => panic!("Expected PresetNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_replaces_same_id() {
        let mut loader = PolicyLoader::builtin().unwrap();
        let edited = loader
            .get("2025")
            .unwrap()
            .with_deductions(dec("12000000"), dec("5000000"))
            .unwrap();

        let mut other = PolicyLoader::default();
        other.insert(edited);
        loader.merge(other);

        assert_eq!(loader.len(), 2);
        assert_eq!(
            loader.get("2025").unwrap().deduction().personal,
            dec("12000000")
        );
    }
}
