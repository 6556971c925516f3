//! Short interest form: camp week, category, then contact details.

use crate::catalogue::{self, CAMP_DATE_CHOICES, CATEGORY_CHOICES, CITY_CHOICES};
use crate::constants::PRE_REGISTRATION_SLOT;
use crate::definition::{FieldDef, FieldKind, FormDefinition, FormId};
use crate::record::FormRecord;
use crate::rules::{Check, FieldRule, Pattern, RuleSet};
use crate::value::FieldValue;

fn date_matches_city(value: &FieldValue, record: &FormRecord) -> bool {
    let city = record.text("city").trim();
    city.is_empty()
        || value
            .as_text()
            .is_some_and(|date| catalogue::date_belongs_to_city(date.trim(), city))
}

pub(super) fn definition() -> FormDefinition {
    use FieldKind::*;

    let date = (
        "Fecha",
        vec![
            FieldDef::new("city", "Ciudad", Choice(CITY_CHOICES)),
            FieldDef::new("date", "Fecha preferida", Choice(CAMP_DATE_CHOICES)),
        ],
        RuleSet::new(vec![
            FieldRule::optional("city").check(Check::Choice(CITY_CHOICES, "Ciudad no disponible")),
            FieldRule::required("date", "Selecciona una fecha").checks([
                Check::Choice(CAMP_DATE_CHOICES, "Selecciona una fecha"),
                Check::Predicate(date_matches_city, "Selecciona una fecha"),
            ]),
        ]),
    );

    let category = (
        "Categoría",
        vec![FieldDef::new("category", "Categoría", Choice(CATEGORY_CHOICES))],
        RuleSet::new(vec![
            FieldRule::required("category", "Selecciona una categoría")
                .check(Check::Choice(CATEGORY_CHOICES, "Selecciona una categoría")),
        ]),
    );

    let contact = (
        "Datos de contacto",
        vec![
            FieldDef::new("name", "Nombre completo", Text),
            FieldDef::new("email", "Correo electrónico", Email),
            FieldDef::new("phone", "Teléfono", Phone),
        ],
        RuleSet::new(vec![
            FieldRule::required("name", "El nombre es requerido"),
            FieldRule::required("email", "El correo electrónico es requerido")
                .check(Check::Email("Ingrese un correo electrónico válido")),
            FieldRule::required("phone", "El teléfono es requerido").check(Check::Pattern(
                Pattern::LoosePhone,
                "Ingrese un número de teléfono válido",
            )),
        ]),
    );

    FormDefinition::new(
        FormId::PreRegistration,
        PRE_REGISTRATION_SLOT,
        vec![date, category, contact],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> FormRecord {
        definition()
            .empty_record()
            .with("city", "barranquilla")
            .with("date", "bar-2")
            .with("category", "juvenil-femenino")
            .with("name", "Valentina Ortiz")
            .with("email", "vale@example.com")
            .with("phone", "+57 300 123 4567")
    }

    #[test]
    fn test_complete_record_passes() {
        let errors = definition().validate_all(&complete());
        assert!(errors.is_empty(), "unexpected errors: {errors}");
    }

    #[test]
    fn test_contact_messages() {
        let form = definition();
        let errors = form.step(3).unwrap().validate(&form.empty_record());
        assert_eq!(errors.get("name"), Some("El nombre es requerido"));
        assert_eq!(errors.get("email"), Some("El correo electrónico es requerido"));
        assert_eq!(errors.get("phone"), Some("El teléfono es requerido"));

        let record = complete().with("email", "vale@").with("phone", "12-34");
        let errors = form.step(3).unwrap().validate(&record);
        assert_eq!(errors.get("email"), Some("Ingrese un correo electrónico válido"));
        assert_eq!(errors.get("phone"), Some("Ingrese un número de teléfono válido"));
    }

    #[test]
    fn test_date_outside_city_rejected() {
        let record = complete().with("date", "bog-1");
        let errors = definition().step(1).unwrap().validate(&record);
        assert_eq!(errors.get("date"), Some("Selecciona una fecha"));
    }

    #[test]
    fn test_date_without_city_accepted() {
        let record = complete().with("city", "");
        assert!(definition().step(1).unwrap().validate(&record).is_empty());
    }
}
