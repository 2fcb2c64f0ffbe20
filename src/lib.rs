//! Personal Income Tax Engine for Vietnam
//!
//! This crate converts between gross and net monthly salaries under a
//! configurable tax policy: statutory insurance with caps, family
//! deductions, the progressive bracket schedule and flat-rate or pooled
//! supplementary incomes. Net to gross is solved by bisection over the
//! forward calculation.

#![warn(missing_docs)]

pub mod advisor;
pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod session;
