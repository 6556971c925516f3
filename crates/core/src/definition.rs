//! Static descriptions of multi-step forms.

use crate::error::{FormError, FormResult};
use crate::record::{FormRecord, ValidationErrors};
use crate::rules::RuleSet;
use crate::value::FieldValue;
use std::str::FromStr;

/// The form variants the site collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormId {
    /// Six-step registration and checkout.
    Registration,
    /// Post-payment medical, sports, uniform and chat information.
    Supplemental,
    /// Short interest form posted to the spreadsheet.
    PreRegistration,
}

impl FormId {
    pub const ALL: [FormId; 3] = [
        FormId::Registration,
        FormId::Supplemental,
        FormId::PreRegistration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormId::Registration => "registration",
            FormId::Supplemental => "supplemental",
            FormId::PreRegistration => "pre-registration",
        }
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormId {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| FormError::UnknownForm(s.to_string()))
    }
}

/// How a field is entered; front ends use this to pick a widget or prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Date,
    Flag,
    /// One of a fixed set of `(id, label)` options.
    Choice(&'static [(&'static str, &'static str)]),
    File,
}

impl FieldKind {
    /// Whether `value` may be written to a field of this kind with `update_field`.
    ///
    /// File fields only ever receive a reference through upload checking, so no
    /// value other than `Null` is accepted for them here.
    pub fn accepts(self, value: &FieldValue) -> bool {
        match self {
            FieldKind::Flag => matches!(value, FieldValue::Bool(_)),
            FieldKind::File => matches!(value, FieldValue::Null),
            _ => matches!(value, FieldValue::Text(_) | FieldValue::Null),
        }
    }

    /// What `update_field` expects, for error messages.
    pub fn expected(self) -> &'static str {
        match self {
            FieldKind::Flag => "a boolean",
            FieldKind::File => "null (attach the file as an upload)",
            _ => "text or null",
        }
    }
}

/// A declared field of a form.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Text default; `None` means empty text (or `false` / `null` by kind).
    pub default: Option<&'static str>,
}

impl FieldDef {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn default_value(&self) -> FieldValue {
        match (self.kind, self.default) {
            (FieldKind::Flag, _) => FieldValue::Bool(false),
            (FieldKind::File, _) => FieldValue::Null,
            (_, Some(default)) => FieldValue::text(default),
            (_, None) => FieldValue::text(""),
        }
    }
}

/// One screen's worth of fields and the rules gating progress past it.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    /// 1-based position in the form.
    pub index: usize,
    pub title: &'static str,
    pub fields: Vec<FieldDef>,
    pub rules: RuleSet,
}

impl StepDefinition {
    pub fn validate(&self, record: &FormRecord) -> ValidationErrors {
        self.rules.validate(record)
    }
}

/// An ordered sequence of steps plus where progress is persisted.
#[derive(Debug, Clone)]
pub struct FormDefinition {
    pub id: FormId,
    pub slot: &'static str,
    /// Submitting validates every step rather than only the last one.
    pub validate_all_on_submit: bool,
    steps: Vec<StepDefinition>,
}

impl FormDefinition {
    /// Builds a definition, numbering steps from 1 in the given order.
    pub fn new(
        id: FormId,
        slot: &'static str,
        steps: Vec<(&'static str, Vec<FieldDef>, RuleSet)>,
    ) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, (title, fields, rules))| StepDefinition {
                index: i + 1,
                title,
                fields,
                rules,
            })
            .collect();
        Self {
            id,
            slot,
            validate_all_on_submit: false,
            steps,
        }
    }

    pub fn validating_all_on_submit(mut self) -> Self {
        self.validate_all_on_submit = true;
        self
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Returns the 1-based step `index`.
    pub fn step(&self, index: usize) -> FormResult<&StepDefinition> {
        index
            .checked_sub(1)
            .and_then(|i| self.steps.get(i))
            .ok_or(FormError::StepOutOfRange {
                step: index,
                steps: self.steps.len(),
            })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields().find(|f| f.name == name)
    }

    /// A record holding every declared field at its default.
    pub fn empty_record(&self) -> FormRecord {
        self.fields()
            .map(|f| (f.name.to_string(), f.default_value()))
            .collect()
    }

    /// Validates every step, merging the per-step errors.
    pub fn validate_all(&self, record: &FormRecord) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for step in &self.steps {
            errors.extend(step.validate(record));
        }
        errors
    }
}
