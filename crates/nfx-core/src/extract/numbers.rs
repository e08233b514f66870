//! Numeric parsing and Brazilian-locale formatting.
//!
//! Parsing accepts whatever the text layer produced: either decimal
//! separator, thousands grouping, currency prefixes, accounting parentheses
//! and scientific notation. Anything unusable becomes `None`, never an error.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Two-digit decimal part ending in zero, e.g. ",50".
    static ref TRAILING_ZERO: Regex = Regex::new(r",(\d)0$").unwrap();
}

/// How a number is rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Always two decimal digits (monetary fields).
    Decimal,
    /// Bare integer for whole numbers, otherwise two decimals with a
    /// trailing zero dropped (quantity fields).
    Compact,
}

/// Parse a raw numeric string in mixed locale formatting.
///
/// When both separators are present the dot groups thousands and the comma
/// is decimal; a lone comma is decimal; repeated dots group thousands; a
/// single dot is decimal.
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if s.is_empty() || s == "-" || s == "–" {
        return None;
    }

    let mut negative = false;
    if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].trim();
    }

    let s = s.replace("R$", "").replace(['$', '\u{00a0}'], "");
    let s = s.trim();

    let value = if s.contains(['e', 'E']) {
        let cleaned: String = s
            .replace(',', ".")
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
            .collect();
        cleaned.parse::<f64>().ok()?
    } else {
        let normalized = match (s.contains('.'), s.contains(',')) {
            (true, true) => s.replace('.', "").replace(',', "."),
            (false, true) => s.replace(',', "."),
            (true, false) if s.matches('.').count() > 1 => s.replace('.', ""),
            _ => s.to_string(),
        };

        let cleaned: String = normalized
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
            .collect();

        if matches!(cleaned.as_str(), "" | "." | "-" | "-.") {
            return None;
        }
        cleaned.parse::<f64>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// Render a number with dot thousands separators and a decimal comma.
///
/// `None` and non-finite values render as an empty string.
pub fn format_number(value: Option<f64>, style: NumberStyle) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return String::new(),
    };

    match style {
        NumberStyle::Decimal => group_thousands(&format!("{:.2}", value)),
        NumberStyle::Compact if value.fract() == 0.0 => {
            // avoid rendering negative zero as "-0"
            let value = if value == 0.0 { 0.0 } else { value };
            format!("{:.0}", value)
        }
        NumberStyle::Compact => {
            let s = group_thousands(&format!("{:.2}", value));
            TRAILING_ZERO.replace(&s, ",$1").into_owned()
        }
    }
}

/// Turn "-1234567.89" into "-1.234.567,89".
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (integer_part, decimal_part) = match unsigned.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(plain.len() + digits.len() / 3);
    formatted.push_str(sign);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    if let Some(decimal_part) = decimal_part {
        formatted.push(',');
        formatted.push_str(decimal_part);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a number");
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_parse_locale_equivalence() {
        assert_close(parse_number("1.234,56"), 1234.56);
        assert_close(parse_number("1234.56"), 1234.56);
        assert_close(parse_number("1234,56"), 1234.56);
        assert_eq!(parse_number("1.234,56"), parse_number("1234.56"));
    }

    #[test]
    fn test_parse_absent_values() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("–"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("R$"), None);
        assert_eq!(parse_number("()"), None);
        assert_eq!(parse_number("1-2"), None);
    }

    #[test]
    fn test_parse_parentheses_negative() {
        assert_close(parse_number("(10,00)"), -10.0);
        assert_close(parse_number("( 1.500,25 )"), -1500.25);
    }

    #[test]
    fn test_parse_currency_and_nbsp() {
        assert_close(parse_number("R$ 1.250,00"), 1250.0);
        assert_close(parse_number("$12.5"), 12.5);
        assert_close(parse_number("1\u{00a0}000,5"), 1000.5);
    }

    #[test]
    fn test_parse_dot_only() {
        assert_close(parse_number("1.000.000"), 1_000_000.0);
        assert_close(parse_number("1.000"), 1.0);
        assert_close(parse_number("42"), 42.0);
        assert_close(parse_number("-7"), -7.0);
    }

    #[test]
    fn test_parse_scientific() {
        assert_close(parse_number("1,5E3"), 1500.0);
        assert_close(parse_number("2e-2"), 0.02);
        assert_eq!(parse_number("e"), None);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_number(Some(10.55), NumberStyle::Decimal), "10,55");
        assert_eq!(format_number(Some(1234.5), NumberStyle::Decimal), "1.234,50");
        assert_eq!(format_number(Some(1_000_000.0), NumberStyle::Decimal), "1.000.000,00");
        assert_eq!(format_number(Some(-7.25), NumberStyle::Decimal), "-7,25");
        assert_eq!(format_number(Some(0.0), NumberStyle::Decimal), "0,00");
        assert_eq!(format_number(Some(-1234.5), NumberStyle::Decimal), "-1.234,50");
    }

    #[test]
    fn test_format_compact_trim_rule() {
        assert_eq!(format_number(Some(10.50), NumberStyle::Compact), "10,5");
        assert_eq!(format_number(Some(10.0), NumberStyle::Compact), "10");
        assert_eq!(format_number(Some(10.55), NumberStyle::Compact), "10,55");
        assert_eq!(format_number(Some(1500.0), NumberStyle::Compact), "1500");
        assert_eq!(format_number(Some(1500.25), NumberStyle::Compact), "1.500,25");
        assert_eq!(format_number(Some(-0.0), NumberStyle::Compact), "0");
    }

    #[test]
    fn test_format_absent_and_invalid() {
        assert_eq!(format_number(None, NumberStyle::Decimal), "");
        assert_eq!(format_number(Some(f64::NAN), NumberStyle::Compact), "");
        assert_eq!(format_number(Some(f64::INFINITY), NumberStyle::Decimal), "");
    }

    #[test]
    fn test_round_trip() {
        for v in [0.0, 1234.0, 1234.5, -7.25, 1_000_000.0] {
            let formatted = format_number(Some(v), NumberStyle::Decimal);
            assert_close(parse_number(&formatted), v);
        }
    }
}
