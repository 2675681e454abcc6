//! Quantity parsing module.
//!
//! Parses free-text ingredient quantities (e.g., "200g", "100 ml", "1 1/2 cups")
//! into an amount and an optional unit. Anything that is not a number followed
//! by at most one unit word is kept verbatim as unparsable.

use serde::{Deserialize, Serialize};

/// A quantity that was decomposed into a number and an optional unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuantity {
    pub amount: f64,
    /// Lowercased unit word, or `None` for a bare count ("2").
    pub unit: Option<String>,
}

/// Result of parsing a quantity string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Parsed(ParsedQuantity),
    /// The original text, untouched.
    Unparsable(String),
}

impl Quantity {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Quantity::Parsed(_))
    }
}

/// Parse a free-text quantity.
///
/// Accepts integers, decimals, simple fractions ("1/2") and mixed numbers
/// ("1 1/2"), optionally followed by a single unit word made of letters
/// ("g", "ml", "Cups"). The unit may be attached ("200g") or separated by
/// whitespace ("100 ml"). Negative numbers, extra words and symbols make the
/// whole text unparsable.
pub fn parse_quantity(text: &str) -> Quantity {
    match try_parse(text) {
        Some(parsed) => Quantity::Parsed(parsed),
        None => Quantity::Unparsable(text.to_string()),
    }
}

fn try_parse(text: &str) -> Option<ParsedQuantity> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    let (amount, after_amount) = extract_amount(s)?;
    let unit = extract_unit(after_amount)?;

    Some(ParsedQuantity { amount, unit })
}

/// Extract an amount from the beginning of a string.
/// Returns (amount, remaining_string).
fn extract_amount(s: &str) -> Option<(f64, &str)> {
    let first_len = numeric_prefix_len(s);
    if first_len == 0 {
        return None;
    }
    let first = &s[..first_len];
    let rest = &s[first_len..];

    // Mixed number: whole number, whitespace, fraction
    if first.chars().all(|c| c.is_ascii_digit()) && rest.starts_with(char::is_whitespace) {
        let next = rest.trim_start();
        let second_len = numeric_prefix_len(next);
        let second = &next[..second_len];
        if is_fraction(second) {
            let whole = parse_decimal(first)?;
            let fraction = parse_fraction(second)?;
            let amount = Some(whole + fraction).filter(|v| v.is_finite())?;
            return Some((amount, &next[second_len..]));
        }
    }

    let amount = if is_fraction(first) {
        parse_fraction(first)?
    } else {
        parse_decimal(first)?
    };

    Some((amount, rest))
}

/// Length of the leading run of digits, '.' and '/'.
fn numeric_prefix_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '/'))
        .unwrap_or(s.len())
}

/// Check if a string is a fraction like "1/2" or "3/4"
fn is_fraction(s: &str) -> bool {
    if let Some((before, after)) = s.split_once('/') {
        !before.is_empty()
            && !after.is_empty()
            && before.chars().all(|c| c.is_ascii_digit())
            && after.chars().all(|c| c.is_ascii_digit())
    } else {
        false
    }
}

fn parse_fraction(s: &str) -> Option<f64> {
    let (numerator, denominator) = s.split_once('/')?;
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|v| v.is_finite())
}

fn parse_decimal(s: &str) -> Option<f64> {
    if s.contains('/') || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if s.chars().filter(|&c| c == '.').count() > 1 {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Interpret what follows the amount.
///
/// `Some(None)` for nothing (bare count), `Some(Some(unit))` for one unit word,
/// `None` when the remainder is anything else.
fn extract_unit(s: &str) -> Option<Option<String>> {
    let word = s.trim();
    if word.is_empty() {
        return Some(None);
    }
    if word.chars().all(char::is_alphabetic) {
        Some(Some(word.to_lowercase()))
    } else {
        None
    }
}

/// Format a summed amount for display.
///
/// Whole numbers print without a decimal point ("4"); anything else is rounded
/// to two decimal places with trailing zeros removed ("0.5", "0.33").
/// Amounts of 1e15 and above have no fractional precision left and print as
/// plain integers.
pub fn format_amount(amount: f64) -> String {
    if amount.abs() >= 1e15 {
        return format!("{:.0}", amount);
    }
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.2}", rounded)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
