//! HTTP API module for the PIT engine.
//!
//! This module provides the REST API endpoints for gross to net and net to
//! gross calculations and for browsing the loaded policy presets.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, CalculationResponse, PolicySummary};
pub use state::AppState;
