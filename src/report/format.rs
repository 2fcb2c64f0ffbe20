//! vi-VN number formatting.

use rust_decimal::Decimal;

use crate::calculation::round_money;

const ONE_MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats an amount in whole dong with `.` thousands separators.
///
/// ```
/// use pit_engine::report::format_vnd;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_vnd(Decimal::new(25_882_500, 0)), "25.882.500");
/// assert_eq!(format_vnd(Decimal::new(-750_000, 0)), "-750.000");
/// ```
pub fn format_vnd(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let digits = rounded.abs().trunc().to_string();
    if rounded < Decimal::ZERO {
        format!("-{}", group_thousands(&digits))
    } else {
        group_thousands(&digits)
    }
}

/// Formats an amount in millions with a `,` decimal separator.
pub fn format_millions(amount: Decimal) -> String {
    (amount / ONE_MILLION).normalize().to_string().replace('.', ",")
}

/// Formats a fractional rate as a percentage.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * ONE_HUNDRED).normalize().to_string().replace('.', ","))
}
