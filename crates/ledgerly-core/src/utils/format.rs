use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as Indian rupees with en-IN digit grouping,
/// e.g. `₹12,34,567.89`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}₹{}.{}", sign, group_indian(int_part), frac_part)
}

/// Last three digits form one group, everything before groups in pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// `YYYY-MM` prefix of a backend month value (`2025-03-01`, `2025-03-01T00:00:00Z`).
pub fn month_label(month: &str) -> &str {
    month.get(..7).unwrap_or(month)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp for list display
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec("0")), "₹0.00");
        assert_eq!(format_currency(dec("999.5")), "₹999.50");
        assert_eq!(format_currency(dec("1000")), "₹1,000.00");
        assert_eq!(format_currency(dec("123456.78")), "₹1,23,456.78");
        assert_eq!(format_currency(dec("1234567.891")), "₹12,34,567.89");
        assert_eq!(format_currency(dec("-2500.4")), "-₹2,500.40");
        assert_eq!(format_currency(dec("-0.001")), "₹0.00");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("2025-03-01"), "2025-03");
        assert_eq!(month_label("2025-03-01T00:00:00Z"), "2025-03");
        assert_eq!(month_label("2025"), "2025");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("₹₹₹₹₹₹", 5), "₹₹...");
    }

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap();
        assert_eq!(format_date(&dt), "Mar 04, 2025");
    }
}
