//! # Camp Types
//!
//! Small validated value types shared by the camp registration crates.
//!
//! - [`NonEmptyText`]: trimmed text guaranteed to hold at least one non-whitespace character
//! - [`Cop`]: an amount of Colombian pesos, with IVA (value-added tax) helpers

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so a
/// configuration value such as `"  sheet-id \n"` is stored as `"sheet-id"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parses an optional raw value (typically an environment variable).
    ///
    /// `None`, empty and whitespace-only values all map to `None`.
    pub fn from_optional(value: Option<String>) -> Option<Self> {
        value.and_then(|v| Self::new(v).ok())
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// IVA rate applied to camp prices, in percent.
pub const IVA_PERCENT: u64 = 19;

/// An amount of Colombian pesos (whole pesos; COP has no minor unit in practice).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Cop(u64);

impl Cop {
    pub const fn new(pesos: u64) -> Self {
        Self(pesos)
    }

    pub const fn pesos(self) -> u64 {
        self.0
    }

    /// IVA owed on this amount, rounded half-up to the nearest peso.
    pub fn iva(self) -> Cop {
        Cop((self.0 * IVA_PERCENT + 50) / 100)
    }

    /// Splits this base amount into base, IVA and total.
    pub fn with_iva(self) -> PriceBreakdown {
        let iva = self.iva();
        PriceBreakdown {
            base: self,
            iva,
            total: Cop(self.0 + iva.0),
        }
    }
}

/// Formats as `$2.011.100`, the way prices are shown to families.
impl std::fmt::Display for Cop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "${grouped}")
    }
}

/// A price split into its taxable base, IVA and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PriceBreakdown {
    pub base: Cop,
    pub iva: Cop,
    pub total: Cop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  sheet-id \n").unwrap();
        assert_eq!(text.as_str(), "sheet-id");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   ").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn test_from_optional_filters_blank_values() {
        assert_eq!(NonEmptyText::from_optional(None), None);
        assert_eq!(NonEmptyText::from_optional(Some(" ".into())), None);
        assert_eq!(
            NonEmptyText::from_optional(Some("x".into())).map(NonEmptyText::into_string),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_camp_price_with_iva() {
        let price = Cop::new(1_690_000).with_iva();
        assert_eq!(price.iva, Cop::new(321_100));
        assert_eq!(price.total, Cop::new(2_011_100));
    }

    #[test]
    fn test_cop_display_groups_thousands() {
        assert_eq!(Cop::new(2_011_100).to_string(), "$2.011.100");
        assert_eq!(Cop::new(999).to_string(), "$999");
        assert_eq!(Cop::new(1_000).to_string(), "$1.000");
        assert_eq!(Cop::new(0).to_string(), "$0");
    }
}
