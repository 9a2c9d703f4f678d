//! Totals and money formatting.
//!
//! Totals are recomputed from the item list on every call. Lists are tens of
//! rows at most, so there is no cache to keep consistent.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::LineItem;

/// Sum of `quantity × unit_price` over all items. Amounts too large for a
/// `Decimal` saturate at `Decimal::MAX` instead of overflowing.
pub fn compute_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(LineItem::amount)
        .fold(Decimal::ZERO, |total, amount| {
            total.checked_add(amount).unwrap_or(Decimal::MAX)
        })
}

/// Coerce user text into a quantity. Empty, non-numeric, negative,
/// fractional or overflowing input becomes 0. Integral decimals such as
/// `"2.0"` are accepted.
pub fn parse_quantity(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    if let Ok(quantity) = raw.parse::<u32>() {
        return quantity;
    }
    match Decimal::from_str(raw) {
        Ok(value) if value.is_sign_positive() && value.fract().is_zero() => {
            value.to_u32().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Coerce user text into a unit price. Empty, non-numeric or negative input
/// becomes 0.
pub fn parse_price(raw: &str) -> Decimal {
    let raw = raw.trim();
    if raw.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(raw) {
        Ok(value) if value.is_sign_negative() && !value.is_zero() => Decimal::ZERO,
        Ok(value) => value.normalize(),
        Err(_) => Decimal::ZERO,
    }
}

/// Render an amount with the currency symbol prefixed, two decimal places
/// and thousands separators: `$1,234.50`.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{currency}{}", format_decimal(amount))
}

/// Two-decimal rendering without a currency symbol.
pub fn format_decimal(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.to_string();

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn total_of_mixed_items() {
        let items = vec![
            LineItem::new("Consulting", 2, price("10.5")),
            LineItem::new("Travel", 1, price("5")),
        ];
        let total = compute_total(&items);
        assert_eq!(total, price("26"));
        assert_eq!(format_amount(total, "$"), "$26.00");
    }

    #[test]
    fn total_of_blank_list_is_zero() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
        assert_eq!(compute_total(&[LineItem::blank()]), Decimal::ZERO);
        assert_eq!(format_amount(Decimal::ZERO, "€"), "€0.00");
    }

    #[test]
    fn invalid_text_coerces_to_zero() {
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity("-3"), 0);
        assert_eq!(parse_quantity("2.5"), 0);
        assert_eq!(parse_quantity("99999999999"), 0);
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("1.2.3"), Decimal::ZERO);
        assert_eq!(parse_price("-4.00"), Decimal::ZERO);
    }

    #[test]
    fn valid_text_parses() {
        assert_eq!(parse_quantity(" 12 "), 12);
        assert_eq!(parse_quantity("2.0"), 2);
        assert_eq!(parse_price("10.50"), price("10.5"));
    }

    #[test]
    fn total_matches_sum_with_coerced_fields() {
        let raw = [("3", "1.10"), ("x", "9"), ("4", "oops"), ("1", "0.05")];
        let items: Vec<LineItem> = raw
            .iter()
            .map(|(qty, unit)| LineItem::new("", parse_quantity(qty), parse_price(unit)))
            .collect();
        assert_eq!(compute_total(&items), price("3.35"));
    }

    #[test]
    fn formatting_rounds_and_groups() {
        assert_eq!(format_decimal(price("1234.5")), "1,234.50");
        assert_eq!(format_decimal(price("1234567.891")), "1,234,567.89");
        assert_eq!(format_decimal(price("0.005")), "0.01");
        assert_eq!(format_decimal(price("999.999")), "1,000.00");
        assert_eq!(format_decimal(price("100")), "100.00");
        assert_eq!(format_amount(price("-1500"), "£"), "£-1,500.00");
    }

    #[test]
    fn oversized_rows_saturate() {
        let huge = LineItem::new("", u32::MAX, price("100000000000000000000"));
        assert_eq!(huge.amount(), Decimal::MAX);

        let items = vec![huge.clone(), huge, LineItem::new("", 1, price("5"))];
        assert_eq!(compute_total(&items), Decimal::MAX);
        assert!(format_amount(compute_total(&items), "$").starts_with("$79,228,162,514"));
    }
}
