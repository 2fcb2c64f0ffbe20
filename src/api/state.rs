//! Application state for the PIT engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::PolicyLoader;
use crate::error::EngineResult;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the loaded policy presets.
#[derive(Clone)]
pub struct AppState {
    /// The loaded policy presets.
    policies: Arc<PolicyLoader>,
}

impl AppState {
    /// Creates a new application state with the given policy loader.
    pub fn new(policies: PolicyLoader) -> Self {
        Self {
            policies: Arc::new(policies),
        }
    }

    /// Creates a state serving only the built-in presets.
    pub fn builtin() -> EngineResult<Self> {
        Ok(Self::new(PolicyLoader::builtin()?))
    }

    /// Returns a reference to the policy loader.
    pub fn policies(&self) -> &PolicyLoader {
        &self.policies
    }
}
