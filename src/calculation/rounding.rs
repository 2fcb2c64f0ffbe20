//! Monetary rounding.
//!
//! Every contribution and tax amount is rounded to the whole dong, half up.
//! Bases, caps and rates are never rounded.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to the whole dong using round-half-up.
///
/// # Examples
///
/// ```
/// use pit_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("217499.5").unwrap()), Decimal::from(217500));
/// assert_eq!(round_money(Decimal::from_str("217499.49").unwrap()), Decimal::from(217499));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
