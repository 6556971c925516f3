//! Field-level validation rules.
//!
//! A rule set is a table of [`FieldRule`]s: a field name, when that field is required,
//! and an ordered list of [`Check`]s. Evaluation is pure: every call reads the record
//! afresh, so conditional requirements follow the current value of their gate field.
//!
//! Per field, presence is decided first; only a filled value reaches the checks, and
//! the first failing check supplies the single message kept for that field.

use crate::record::{FormRecord, ValidationErrors};
use crate::value::FieldValue;
use chrono::NaiveDate;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]+$").expect("letters pattern"));
static PLACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s-]+$").expect("place pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]+$").expect("phone pattern"));
static LOOSE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s-]{7,15}$").expect("loose phone pattern"));
static DOCUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("document pattern"));
/// Unanchored: anything containing `x@y.z` with no whitespace in the parts passes.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));
static HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2,3}$").expect("height pattern"));
static WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(\.[0-9]{1,2})?$").expect("weight pattern"));

/// Character-class constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Letters (including Spanish accented letters, ñ and ü) and spaces.
    Letters,
    /// Letters, spaces and hyphens (city and country names).
    Place,
    /// Optional leading `+` followed by digits, after spaces and hyphens are removed.
    Phone,
    /// Optional `+`, then 7 to 15 digits, spaces or hyphens, checked on the raw text.
    LoosePhone,
    /// ASCII letters, digits and hyphens (identity document numbers).
    Document,
}

impl Pattern {
    fn matches(self, text: &str) -> bool {
        match self {
            Pattern::Letters => LETTERS.is_match(text),
            Pattern::Place => PLACE.is_match(text),
            Pattern::Phone => PHONE.is_match(&normalise_phone(text)),
            Pattern::LoosePhone => LOOSE_PHONE.is_match(text),
            Pattern::Document => DOCUMENT.is_match(text),
        }
    }
}

/// Numeric-string shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Height in centimetres: two or three digits.
    Height,
    /// Weight in kilograms: up to three integer digits, optional one or two decimals.
    Weight,
    /// Calendar date as `YYYY-MM-DD`.
    IsoDate,
}

impl Format {
    fn matches(self, text: &str) -> bool {
        match self {
            Format::Height => HEIGHT.is_match(text),
            Format::Weight => WEIGHT.is_match(text),
            Format::IsoDate => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        }
    }
}

/// Removes the separators families type into phone numbers.
pub fn normalise_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// A cross-field predicate: the field's value and the whole record.
pub type Predicate = fn(&FieldValue, &FormRecord) -> bool;

/// One check applied to a filled field.
#[derive(Debug, Clone)]
pub enum Check {
    Pattern(Pattern, &'static str),
    Format(Format, &'static str),
    Email(&'static str),
    MinChars(usize, &'static str),
    MaxChars(usize, &'static str),
    /// Digit count of a normalised phone number.
    DigitCount {
        min: usize,
        max: usize,
        too_short: &'static str,
        too_long: &'static str,
    },
    /// Value must be the id of one of the `(id, label)` options.
    Choice(&'static [(&'static str, &'static str)], &'static str),
    Predicate(Predicate, &'static str),
}

impl Check {
    /// Runs the check against a filled value.
    pub fn evaluate(&self, value: &FieldValue, record: &FormRecord) -> Result<(), &'static str> {
        let text = text_of(value);
        let text = text.trim();
        let ok = |pass: bool, message: &'static str| if pass { Ok(()) } else { Err(message) };

        match self {
            Check::Pattern(pattern, message) => ok(pattern.matches(text), *message),
            Check::Format(format, message) => ok(format.matches(text), *message),
            Check::Email(message) => ok(EMAIL.is_match(text), *message),
            Check::MinChars(min, message) => ok(text.chars().count() >= *min, *message),
            Check::MaxChars(max, message) => ok(text.chars().count() <= *max, *message),
            Check::DigitCount {
                min,
                max,
                too_short,
                too_long,
            } => {
                let digits = normalise_phone(text)
                    .chars()
                    .filter(char::is_ascii_digit)
                    .count();
                if digits < *min {
                    Err(*too_short)
                } else if digits > *max {
                    Err(*too_long)
                } else {
                    Ok(())
                }
            }
            Check::Choice(options, message) => {
                ok(options.iter().any(|(id, _)| *id == text), *message)
            }
            Check::Predicate(predicate, message) => ok(predicate(value, record), *message),
        }
    }
}

fn text_of(value: &FieldValue) -> Cow<'_, str> {
    match value {
        FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
        FieldValue::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_cell()),
    }
}

/// A predicate over the current record deciding conditional requiredness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The named boolean field is `true`.
    IsTrue(&'static str),
    /// The named field is filled.
    Filled(&'static str),
    /// At least one of the named fields is filled.
    AnyFilled(&'static [&'static str]),
}

impl Condition {
    pub fn holds(&self, record: &FormRecord) -> bool {
        match self {
            Condition::IsTrue(field) => record.is_true(field),
            Condition::Filled(field) => record.is_filled(field),
            Condition::AnyFilled(fields) => fields.iter().any(|f| record.is_filled(f)),
        }
    }
}

/// When a field must be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    /// Never required; checks still run on a filled value.
    Optional,
    /// Required while the condition holds, otherwise optional.
    When(Condition),
}

impl Requirement {
    pub fn is_required(&self, record: &FormRecord) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::Optional => false,
            Requirement::When(condition) => condition.holds(record),
        }
    }
}

/// Validation rule for a single field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub requirement: Requirement,
    pub required_message: &'static str,
    pub checks: Vec<Check>,
}

impl FieldRule {
    pub fn required(field: &'static str, required_message: &'static str) -> Self {
        Self {
            field,
            requirement: Requirement::Always,
            required_message,
            checks: Vec::new(),
        }
    }

    pub fn required_when(
        field: &'static str,
        condition: Condition,
        required_message: &'static str,
    ) -> Self {
        Self {
            field,
            requirement: Requirement::When(condition),
            required_message,
            checks: Vec::new(),
        }
    }

    pub fn optional(field: &'static str) -> Self {
        Self {
            field,
            requirement: Requirement::Optional,
            required_message: "",
            checks: Vec::new(),
        }
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn checks(mut self, checks: impl IntoIterator<Item = Check>) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Evaluates the rule against the current record.
    pub fn evaluate(&self, record: &FormRecord) -> Result<(), &'static str> {
        let value = record.get(self.field);
        if !value.is_filled() {
            return if self.requirement.is_required(record) {
                Err(self.required_message)
            } else {
                Ok(())
            };
        }
        self.checks
            .iter()
            .try_for_each(|check| check.evaluate(value, record))
    }
}

/// Ordered rules for one step.
#[derive(Debug, Clone, Default)]
pub struct RuleSet(Vec<FieldRule>);

impl RuleSet {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self(rules)
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.0
    }

    /// Validates every rule; the result holds one message per failing field.
    pub fn validate(&self, record: &FormRecord) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for rule in &self.0 {
            if errors.contains(rule.field) {
                continue;
            }
            if let Err(message) = rule.evaluate(record) {
                errors.insert(rule.field, message);
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone_rule() -> FieldRule {
        FieldRule::required("phone", "Este campo es obligatorio").checks([
            Check::Pattern(Pattern::Phone, "Solo se permiten números y el símbolo +"),
            Check::DigitCount {
                min: 7,
                max: 15,
                too_short: "Número de teléfono inválido",
                too_long: "Número demasiado largo",
            },
        ])
    }

    fn record_with(field: &str, value: impl Into<FieldValue>) -> FormRecord {
        FormRecord::new().with(field, value)
    }

    #[test]
    fn test_phone_with_spaces_passes_after_normalisation() {
        let rule = phone_rule();
        assert!(rule.evaluate(&record_with("phone", "+57 300 1234567")).is_ok());
        assert!(rule.evaluate(&record_with("phone", "300-123-4567")).is_ok());
    }

    #[test]
    fn test_phone_letters_report_pattern_message() {
        let rule = phone_rule();
        assert_eq!(
            rule.evaluate(&record_with("phone", "abc123")),
            Err("Solo se permiten números y el símbolo +")
        );
    }

    #[test]
    fn test_empty_value_reports_presence_not_pattern() {
        let rule = phone_rule();
        assert_eq!(
            rule.evaluate(&record_with("phone", "")),
            Err("Este campo es obligatorio")
        );
        assert_eq!(
            rule.evaluate(&FormRecord::new()),
            Err("Este campo es obligatorio")
        );
    }

    #[test]
    fn test_phone_digit_bounds() {
        let rule = phone_rule();
        assert_eq!(
            rule.evaluate(&record_with("phone", "123456")),
            Err("Número de teléfono inválido")
        );
        assert_eq!(
            rule.evaluate(&record_with("phone", "1234567890123456")),
            Err("Número demasiado largo")
        );
    }

    #[test]
    fn test_letters_pattern_accepts_spanish_names() {
        let check = Check::Pattern(Pattern::Letters, "letters");
        let record = FormRecord::new();
        assert!(check.evaluate(&FieldValue::text("José Muñoz Güell"), &record).is_ok());
        assert_eq!(
            check.evaluate(&FieldValue::text("R2D2"), &record),
            Err("letters")
        );
    }

    #[test]
    fn test_place_pattern_allows_hyphens() {
        let check = Check::Pattern(Pattern::Place, "place");
        let record = FormRecord::new();
        assert!(check.evaluate(&FieldValue::text("Santa Rosa-de Cabal"), &record).is_ok());
        assert!(check.evaluate(&FieldValue::text("Cali 2"), &record).is_err());
    }

    #[test]
    fn test_loose_phone_counts_separators() {
        let check = Check::Pattern(Pattern::LoosePhone, "phone");
        let record = FormRecord::new();
        assert!(check.evaluate(&FieldValue::text("+57 300-1234"), &record).is_ok());
        assert!(check.evaluate(&FieldValue::text("123 45"), &record).is_err());
        assert!(check.evaluate(&FieldValue::text("300 123 4567 8901"), &record).is_err());
    }

    #[test]
    fn test_email_needs_at_and_dotted_domain() {
        let record = FormRecord::new();
        let email = Check::Email("Ingrese un correo electrónico válido");

        assert!(email.evaluate(&FieldValue::text("vale@example.com"), &record).is_ok());
        assert!(email.evaluate(&FieldValue::text("vale.o@mail.example.co"), &record).is_ok());
        assert!(email.evaluate(&FieldValue::text("no-es-correo"), &record).is_err());
        assert!(email.evaluate(&FieldValue::text("vale@example"), &record).is_err());
        assert!(email.evaluate(&FieldValue::text("vale @example.com"), &record).is_err());
        // Only a matching substring is needed, as in the web forms.
        assert!(email.evaluate(&FieldValue::text("Vale <vale@example.com>"), &record).is_ok());
    }

    #[test]
    fn test_char_bounds_count_characters_not_bytes() {
        let record = FormRecord::new();
        let max = Check::MaxChars(6, "too long");
        let min = Check::MinChars(6, "too short");

        assert!(max.evaluate(&FieldValue::text("Bogotá"), &record).is_ok());
        assert!(min.evaluate(&FieldValue::text("Bogotá"), &record).is_ok());
        assert_eq!(max.evaluate(&FieldValue::text("Barranquilla"), &record), Err("too long"));
        assert!(max.evaluate(&FieldValue::text("  Cali  "), &record).is_ok());
    }

    #[test]
    fn test_formats() {
        let record = FormRecord::new();
        let height = Check::Format(Format::Height, "height");
        let weight = Check::Format(Format::Weight, "weight");
        let date = Check::Format(Format::IsoDate, "date");

        assert!(height.evaluate(&FieldValue::text("170"), &record).is_ok());
        assert!(height.evaluate(&FieldValue::Number(95.0), &record).is_ok());
        assert!(height.evaluate(&FieldValue::text("1700"), &record).is_err());
        assert!(weight.evaluate(&FieldValue::text("65.5"), &record).is_ok());
        assert!(weight.evaluate(&FieldValue::text("65.555"), &record).is_err());
        assert!(date.evaluate(&FieldValue::text("2015-02-28"), &record).is_ok());
        assert!(date.evaluate(&FieldValue::text("2015-02-30"), &record).is_err());
    }

    #[test]
    fn test_conditional_requirement_relaxes_when_gate_turns_off() {
        let rule = FieldRule::required_when(
            "allergyDetail",
            Condition::IsTrue("allergy"),
            "Especifique los medicamentos",
        );
        let on = FormRecord::new().with("allergy", true);
        assert_eq!(rule.evaluate(&on), Err("Especifique los medicamentos"));

        let off = on.with("allergy", false);
        assert!(rule.evaluate(&off).is_ok());
    }

    #[test]
    fn test_any_filled_group_requirement() {
        const FATHER: &[&str] = &["fatherName", "fatherPhone"];
        let rule =
            FieldRule::required_when("fatherName", Condition::AnyFilled(FATHER), "required");

        assert!(rule.evaluate(&FormRecord::new()).is_ok());
        let partial = FormRecord::new().with("fatherPhone", "3001234567");
        assert_eq!(rule.evaluate(&partial), Err("required"));
    }

    #[test]
    fn test_optional_field_still_checked_when_filled() {
        let rule = FieldRule::optional("whatsapp")
            .check(Check::Pattern(Pattern::Phone, "pattern"));
        assert!(rule.evaluate(&FormRecord::new()).is_ok());
        assert_eq!(
            rule.evaluate(&record_with("whatsapp", "call me")),
            Err("pattern")
        );
    }

    #[test]
    fn test_rule_set_keeps_first_message_per_field() {
        let rules = RuleSet::new(vec![
            FieldRule::required("name", "first"),
            FieldRule::required("name", "second"),
            FieldRule::required("email", "email required"),
        ]);
        let errors = rules.validate(&FormRecord::new());
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.get("email"), Some("email required"));
    }
}
