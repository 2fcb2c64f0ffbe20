//! Display boundary for tax results.
//!
//! [`ResultReport`] turns a [`crate::models::TaxResult`] and its policy into
//! the figures a result view shows: headline amounts, the net/tax/insurance
//! split, the deduction ladder, the bracket schedule and the supplementary
//! income table. Its `Display` impl renders them as plain text.

mod breakdown;
mod format;

pub use breakdown::{
    AdditionalRow, BracketRow, LadderLine, LineKind, ResultReport, ShareSlice,
    bracket_range_label,
};
pub use format::{format_millions, format_rate, format_vnd};
