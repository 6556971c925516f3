//! Six-step registration and checkout form.

use super::{REQUIRED, address, city, country, document, email, name, optional_phone, phone, terms};
use crate::catalogue::{self, CAMP_DATE_CHOICES, CATEGORY_CHOICES, CITY_CHOICES};
use crate::constants::{DEFAULT_COUNTRY, REGISTRATION_SLOT};
use crate::definition::{FieldDef, FieldKind, FormDefinition, FormId};
use crate::record::FormRecord;
use crate::rules::{Check, Condition, FieldRule, Format, RuleSet};
use crate::value::FieldValue;

pub const CHILD_DOC_TYPES: &[(&str, &str)] = &[
    ("TI", "Tarjeta de Identidad (TI)"),
    ("NUIP", "NUIP"),
    ("PASAPORTE", "Pasaporte"),
    ("RC", "Registro Civil (RC)"),
];

pub const PAYER_DOC_TYPES: &[(&str, &str)] = &[
    ("CC", "Cédula de Ciudadanía"),
    ("CE", "Cédula de Extranjería"),
    ("PASAPORTE", "Pasaporte"),
    ("NIT", "NIT"),
];

pub const PAYER_TYPES: &[(&str, &str)] =
    &[("natural", "Persona natural"), ("juridica", "Persona jurídica")];

const FATHER_FIELDS: &[&str] = &["fatherName", "fatherPhone", "fatherEmail"];

fn date_matches_city(value: &FieldValue, record: &FormRecord) -> bool {
    value
        .as_text()
        .is_some_and(|date| {
            catalogue::date_belongs_to_city(date.trim(), record.text("city").trim())
        })
}

pub(super) fn definition() -> FormDefinition {
    use FieldKind::*;

    let destination = (
        "Ciudad y fecha",
        vec![
            FieldDef::new("city", "Ciudad", Choice(CITY_CHOICES)),
            FieldDef::new("campDate", "Fecha del campamento", Choice(CAMP_DATE_CHOICES)),
        ],
        RuleSet::new(vec![
            FieldRule::required("city", "Selecciona una ciudad")
                .check(Check::Choice(CITY_CHOICES, "Selecciona una ciudad")),
            FieldRule::required("campDate", "Selecciona una fecha").checks([
                Check::Choice(CAMP_DATE_CHOICES, "Selecciona una fecha"),
                Check::Predicate(
                    date_matches_city,
                    "La fecha no corresponde a la ciudad seleccionada",
                ),
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

    let participant = (
        "Participante",
        vec![
            FieldDef::new("childName", "Nombres", Text),
            FieldDef::new("childLastName", "Apellidos", Text),
            FieldDef::new("childBirthDate", "Fecha de nacimiento", Date),
            FieldDef::new("childDocType", "Tipo de documento", Choice(CHILD_DOC_TYPES)),
            FieldDef::new("childDocNumber", "Número de documento", Text),
            FieldDef::new("childDocFile", "Copia del documento", File),
            FieldDef::new("childEpsFile", "Certificado de EPS", File),
            FieldDef::new("childBirthCity", "Ciudad de nacimiento", Text),
            FieldDef::new("childBirthCountry", "País de nacimiento", Text)
                .with_default(DEFAULT_COUNTRY),
        ],
        RuleSet::new(vec![
            name("childName"),
            name("childLastName"),
            FieldRule::required("childBirthDate", "Ingresa la fecha de nacimiento")
                .check(Check::Format(Format::IsoDate, "Fecha inválida")),
            FieldRule::required("childDocType", "Selecciona el tipo de documento")
                .check(Check::Choice(CHILD_DOC_TYPES, "Selecciona el tipo de documento")),
            document("childDocNumber"),
            city("childBirthCity"),
            country("childBirthCountry"),
        ]),
    );

    let residence = (
        "Residencia",
        vec![
            FieldDef::new("address", "Dirección", Text),
            FieldDef::new("neighborhood", "Barrio", Text),
            FieldDef::new("apartment", "Apartamento / Casa", Text),
            FieldDef::new("residenceCity", "Ciudad", Text),
            FieldDef::new("residenceCountry", "País", Text).with_default(DEFAULT_COUNTRY),
        ],
        RuleSet::new(vec![
            address("address"),
            city("residenceCity"),
            country("residenceCountry"),
        ]),
    );

    let family = (
        "Familia",
        vec![
            FieldDef::new("motherName", "Nombre de la madre", Text),
            FieldDef::new("motherPhone", "Teléfono de la madre", Phone),
            FieldDef::new("motherEmail", "Correo de la madre", Email),
            FieldDef::new("fatherName", "Nombre del padre", Text),
            FieldDef::new("fatherPhone", "Teléfono del padre", Phone),
            FieldDef::new("fatherEmail", "Correo del padre", Email),
            FieldDef::new("emergencyName", "Contacto de emergencia", Text),
            FieldDef::new("emergencyRelationship", "Parentesco", Text),
            FieldDef::new("emergencyPhone", "Teléfono de emergencia", Phone),
        ],
        RuleSet::new(vec![
            name("motherName"),
            phone("motherPhone"),
            email("motherEmail"),
            FieldRule::required_when("fatherName", Condition::AnyFilled(FATHER_FIELDS), REQUIRED)
                .checks(name("fatherName").checks),
            FieldRule::required_when("fatherPhone", Condition::AnyFilled(FATHER_FIELDS), REQUIRED)
                .checks(phone("fatherPhone").checks),
            FieldRule::required_when("fatherEmail", Condition::AnyFilled(FATHER_FIELDS), REQUIRED)
                .checks(email("fatherEmail").checks),
            name("emergencyName"),
            FieldRule::required("emergencyRelationship", "Ingresa el parentesco"),
            phone("emergencyPhone"),
        ]),
    );

    let payment = (
        "Pago",
        vec![
            FieldDef::new("payerName", "Nombre del pagador", Text),
            FieldDef::new("payerDocType", "Tipo de documento", Choice(PAYER_DOC_TYPES)),
            FieldDef::new("payerDocNumber", "Número de documento", Text),
            FieldDef::new("payerEmail", "Correo electrónico", Email),
            FieldDef::new("payerPhone", "Teléfono", Phone),
            FieldDef::new("payerWhatsapp", "WhatsApp", Phone),
            FieldDef::new("payerType", "Tipo de persona", Choice(PAYER_TYPES))
                .with_default("natural"),
            FieldDef::new("payerAddress", "Dirección", Text),
            FieldDef::new("payerCity", "Ciudad", Text),
            FieldDef::new("payerCountry", "País", Text).with_default(DEFAULT_COUNTRY),
            FieldDef::new("termsAccepted", "Acepto los términos y condiciones", Flag),
        ],
        RuleSet::new(vec![
            name("payerName"),
            FieldRule::required("payerDocType", "Selecciona el tipo de documento")
                .check(Check::Choice(PAYER_DOC_TYPES, "Selecciona el tipo de documento")),
            document("payerDocNumber"),
            email("payerEmail"),
            phone("payerPhone"),
            optional_phone("payerWhatsapp"),
            FieldRule::optional("payerType").check(Check::Choice(PAYER_TYPES, REQUIRED)),
            address("payerAddress"),
            city("payerCity"),
            country("payerCountry"),
            terms("termsAccepted"),
        ]),
    );

    FormDefinition::new(
        FormId::Registration,
        REGISTRATION_SLOT,
        vec![destination, category, participant, residence, family, payment],
    )
}

/// A registration record that passes every step.
#[cfg(test)]
pub(crate) fn complete_record() -> FormRecord {
    definition()
        .empty_record()
        .with("city", "bogota")
        .with("campDate", "bog-2")
        .with("category", "infantil")
        .with("childName", "Sofía")
        .with("childLastName", "Ramírez Peña")
        .with("childBirthDate", "2013-04-21")
        .with("childDocType", "TI")
        .with("childDocNumber", "1012345678")
        .with("childBirthCity", "Bogotá")
        .with("address", "Calle 100 # 15-20")
        .with("residenceCity", "Bogotá")
        .with("motherName", "Laura Peña")
        .with("motherPhone", "+57 310 555 1234")
        .with("motherEmail", "laura@example.com")
        .with("emergencyName", "Carlos Ramírez")
        .with("emergencyRelationship", "Tío")
        .with("emergencyPhone", "3205551234")
        .with("payerName", "Laura Peña")
        .with("payerDocType", "CC")
        .with("payerDocNumber", "52123456")
        .with("payerEmail", "laura@example.com")
        .with("payerPhone", "3105551234")
        .with("payerAddress", "Calle 100 # 15-20")
        .with("payerCity", "Bogotá")
        .with("termsAccepted", true)
}
