//! The form variants the site collects and the check presets they share.
//!
//! Definitions are built once on first use and shared for the life of the process.

mod pre_registration;
mod registration;
mod supplemental;

use crate::definition::{FormDefinition, FormId};
use crate::rules::{Check, FieldRule, Pattern};
use std::sync::LazyLock;

pub use registration::{CHILD_DOC_TYPES, PAYER_DOC_TYPES, PAYER_TYPES};
pub use supplemental::{BLOOD_TYPES, PLAY_POSITIONS, RH_FACTORS, SPORT_FREQUENCIES, UNIFORM_SIZES};

#[cfg(test)]
pub(crate) use registration::complete_record as complete_registration;
#[cfg(test)]
pub(crate) use supplemental::complete_record as complete_supplemental;

pub(crate) const REQUIRED: &str = "Este campo es obligatorio";
pub(crate) const TERMS_MESSAGE: &str = "Debes aceptar los términos y condiciones";

static REGISTRATION: LazyLock<FormDefinition> = LazyLock::new(registration::definition);
static SUPPLEMENTAL: LazyLock<FormDefinition> = LazyLock::new(supplemental::definition);
static PRE_REGISTRATION: LazyLock<FormDefinition> = LazyLock::new(pre_registration::definition);

/// Returns the shared definition of form `id`.
pub fn definition(id: FormId) -> &'static FormDefinition {
    match id {
        FormId::Registration => &REGISTRATION,
        FormId::Supplemental => &SUPPLEMENTAL,
        FormId::PreRegistration => &PRE_REGISTRATION,
    }
}

fn phone_checks() -> [Check; 2] {
    [
        Check::Pattern(Pattern::Phone, "Solo se permiten números y el símbolo +"),
        Check::DigitCount {
            min: 7,
            max: 15,
            too_short: "Número de teléfono inválido",
            too_long: "Número demasiado largo",
        },
    ]
}

fn name_checks() -> [Check; 2] {
    [
        Check::Pattern(Pattern::Letters, "Solo se permiten letras y espacios"),
        Check::MinChars(3, "Nombre demasiado corto"),
    ]
}

fn place_checks(too_short: &'static str) -> [Check; 2] {
    [
        Check::Pattern(Pattern::Place, "Solo se permiten letras, espacios y guiones"),
        Check::MinChars(3, too_short),
    ]
}

pub(crate) fn name(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).checks(name_checks())
}

pub(crate) fn phone(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).checks(phone_checks())
}

pub(crate) fn optional_phone(field: &'static str) -> FieldRule {
    FieldRule::optional(field).checks(phone_checks())
}

pub(crate) fn email(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).check(Check::Email("Correo electrónico inválido"))
}

pub(crate) fn document(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).checks([
        Check::Pattern(Pattern::Document, "Formato de documento inválido"),
        Check::MinChars(5, "Número de documento inválido"),
        Check::MaxChars(15, "Número de documento inválido"),
    ])
}

pub(crate) fn address(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).check(Check::MinChars(5, "Dirección demasiado corta"))
}

pub(crate) fn city(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).checks(place_checks("Ciudad inválida"))
}

pub(crate) fn country(field: &'static str) -> FieldRule {
    FieldRule::required(field, REQUIRED).checks(place_checks("País inválido"))
}

pub(crate) fn terms(field: &'static str) -> FieldRule {
    FieldRule::required(field, TERMS_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FormRecord;

    #[test]
    fn test_definitions_are_shared() {
        for id in FormId::ALL {
            assert!(std::ptr::eq(definition(id), definition(id)));
            assert_eq!(definition(id).id, id);
        }
    }

    #[test]
    fn test_slots_are_distinct() {
        let slots: std::collections::HashSet<_> =
            FormId::ALL.into_iter().map(|id| definition(id).slot).collect();
        assert_eq!(slots.len(), FormId::ALL.len());
    }

    #[test]
    fn test_every_rule_targets_a_declared_field() {
        for id in FormId::ALL {
            let form = definition(id);
            for step in form.steps() {
                for rule in step.rules.rules() {
                    assert!(
                        step.fields.iter().any(|f| f.name == rule.field),
                        "{id} step {} validates undeclared field {}",
                        step.index,
                        rule.field
                    );
                }
            }
        }
    }

    #[test]
    fn test_field_names_are_unique_per_form() {
        for id in FormId::ALL {
            let form = definition(id);
            let mut names: Vec<_> = form.fields().map(|f| f.name).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate field in {id}");
        }
    }

    #[test]
    fn test_name_rule_reports_pattern_before_length() {
        let rule = name("childName");
        let record = FormRecord::new().with("childName", "A1");
        assert_eq!(
            rule.evaluate(&record),
            Err("Solo se permiten letras y espacios")
        );
        let record = FormRecord::new().with("childName", "Al");
        assert_eq!(rule.evaluate(&record), Err("Nombre demasiado corto"));
    }
}
