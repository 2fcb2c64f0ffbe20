//! Tax policy configuration for the PIT engine.
//!
//! This module provides the policy schema, validation, YAML loading and the
//! built-in presets. A policy is plain data: brackets, deductions, insurance
//! rates and caps, and regional minimum wages.
//!
//! # Example
//!
//! ```
//! use pit_engine::config::PolicyPreset;
//!
//! let policy = PolicyPreset::Law2025.policy().unwrap();
//! println!("Loaded policy: {}", policy.name());
//! ```

mod loader;
mod policy;
mod presets;
mod types;

pub use loader::PolicyLoader;
pub use policy::Policy;
pub use presets::PolicyPreset;
pub use types::{DeductionConfig, InsuranceConfig, PolicyConfig, TaxBracket};
