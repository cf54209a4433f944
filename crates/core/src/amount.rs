//! Ingredient amount parsing policy.
//!
//! Recipes carry amounts as display text (`"2"`, `"1/2"`, `"a pinch"`), but
//! the store keeps a numeric column. Parsing is best-effort: text that is not
//! a plain finite decimal number falls back to [`FALLBACK_AMOUNT`]. The
//! degradation is lossy on purpose and is surfaced through
//! [`ParsedAmount::Fallback`] rather than swallowed.

/// Numeric value stored when an amount cannot be parsed.
pub const FALLBACK_AMOUNT: f64 = 0.0;

/// Outcome of parsing an ingredient amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedAmount {
    /// The text was a plain decimal number.
    Numeric(f64),
    /// The text was not numeric; [`FALLBACK_AMOUNT`] is used instead.
    Fallback,
}

impl ParsedAmount {
    /// Parse amount text. Surrounding whitespace is ignored; fractions,
    /// ranges, words, and non-finite values fall back.
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Numeric(value),
            _ => Self::Fallback,
        }
    }

    /// The value to persist.
    pub fn value(self) -> f64 {
        match self {
            Self::Numeric(value) => value,
            Self::Fallback => FALLBACK_AMOUNT,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// Render a stored amount back to display text (`2.0`, `0.5`).
pub fn format_amount(value: f64) -> String {
    format!("{value:?}")
}

/// Compose the `original_text` kept alongside a stored ingredient:
/// `"{amount} {unit} {item}"` with outer whitespace trimmed.
pub fn original_text(amount: &str, unit: Option<&str>, item: &str) -> String {
    format!("{} {} {}", amount, unit.unwrap_or(""), item)
        .trim()
        .to_string()
}
