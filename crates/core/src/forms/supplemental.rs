//! Post-payment medical, sports, uniform and chat information.
//!
//! The page shows all four sections at once, so submitting validates every section.

use super::{REQUIRED, optional_phone, phone, terms};
use crate::constants::SUPPLEMENTAL_SLOT;
use crate::definition::{FieldDef, FieldKind, FormDefinition, FormId};
use crate::rules::{Check, Condition, FieldRule, Format, RuleSet};

pub const BLOOD_TYPES: &[(&str, &str)] = &[("A", "A"), ("B", "B"), ("AB", "AB"), ("O", "O")];

pub const RH_FACTORS: &[(&str, &str)] =
    &[("positivo", "Positivo (+)"), ("negativo", "Negativo (-)")];

pub const SPORT_FREQUENCIES: &[(&str, &str)] = &[
    ("0", "Ningún día"),
    ("1-2", "1-2 días por semana"),
    ("3-4", "3-4 días por semana"),
    ("5-6", "5-6 días por semana"),
    ("7", "Todos los días"),
];

pub const PLAY_POSITIONS: &[(&str, &str)] = &[
    ("portero", "Portero"),
    ("defensa", "Defensa"),
    ("mediocampista", "Mediocampista"),
    ("delantero", "Delantero"),
];

pub const UNIFORM_SIZES: &[(&str, &str)] = &[
    ("6", "Talla 6"),
    ("8", "Talla 8"),
    ("10", "Talla 10"),
    ("12", "Talla 12"),
    ("14", "Talla 14"),
    ("16", "Talla 16"),
    ("S", "Talla S"),
    ("M", "Talla M"),
    ("L", "Talla L"),
    ("XL", "Talla XL"),
];

fn choice(field: &'static str, options: &'static [(&'static str, &'static str)]) -> FieldRule {
    FieldRule::required(field, REQUIRED).check(Check::Choice(options, REQUIRED))
}

fn detail(field: &'static str, gate: &'static str, message: &'static str) -> FieldRule {
    FieldRule::required_when(field, Condition::IsTrue(gate), message)
}

pub(super) fn definition() -> FormDefinition {
    use FieldKind::*;

    let medical = (
        "Información médica",
        vec![
            FieldDef::new("eps", "EPS", Text),
            FieldDef::new("medicinaPrepagada", "¿Tiene medicina prepagada?", Flag),
            FieldDef::new("medicinaPrepagadaNombre", "Medicina prepagada", Text),
            FieldDef::new("usaLentes", "¿Usa lentes?", Flag),
            FieldDef::new("tipoSangre", "Tipo de sangre", Choice(BLOOD_TYPES)),
            FieldDef::new("factorRh", "Factor RH", Choice(RH_FACTORS)),
            FieldDef::new("estatura", "Estatura (cm)", Text),
            FieldDef::new("peso", "Peso (kg)", Text),
            FieldDef::new("horarioMedicamentos", "Medicamentos y horario", Text),
            FieldDef::new("alergiaMedicamentos", "¿Alergia a medicamentos?", Flag),
            FieldDef::new("alergiaMedicamentosDetalle", "¿Cuáles medicamentos?", Text),
            FieldDef::new("alergiaAlimentos", "¿Alergia a alimentos?", Flag),
            FieldDef::new("alergiaAlimentosDetalle", "¿Cuáles alimentos?", Text),
            FieldDef::new("intoleranciaAlimentos", "¿Intolerancia a alimentos?", Flag),
            FieldDef::new("intoleranciaAlimentosDetalle", "¿Cuáles alimentos?", Text),
            FieldDef::new("vegetariano", "Vegetariano", Flag),
            FieldDef::new("vegano", "Vegano", Flag),
            FieldDef::new("frecuenciaDeporte", "Frecuencia de deporte", Choice(SPORT_FREQUENCIES)),
            FieldDef::new("preexistenciasMedicas", "Preexistencias médicas", Text),
        ],
        RuleSet::new(vec![
            FieldRule::required("eps", REQUIRED),
            detail(
                "medicinaPrepagadaNombre",
                "medicinaPrepagada",
                "Indique el nombre de la medicina prepagada",
            ),
            choice("tipoSangre", BLOOD_TYPES),
            choice("factorRh", RH_FACTORS),
            FieldRule::optional("estatura")
                .check(Check::Format(Format::Height, "Formato inválido. Ejemplo: 170")),
            FieldRule::optional("peso")
                .check(Check::Format(Format::Weight, "Formato inválido. Ejemplo: 65.5")),
            detail(
                "alergiaMedicamentosDetalle",
                "alergiaMedicamentos",
                "Especifique los medicamentos",
            ),
            detail("alergiaAlimentosDetalle", "alergiaAlimentos", "Especifique los alimentos"),
            detail(
                "intoleranciaAlimentosDetalle",
                "intoleranciaAlimentos",
                "Especifique los alimentos",
            ),
            choice("frecuenciaDeporte", SPORT_FREQUENCIES),
        ]),
    );

    let sports = (
        "Información deportiva",
        vec![
            FieldDef::new("otrosCampamentos", "¿Ha asistido a otros campamentos?", Flag),
            FieldDef::new("otrosCampamentosDetalle", "¿Cuáles?", Text),
            FieldDef::new("equipoFederado", "¿Pertenece a un equipo federado?", Flag),
            FieldDef::new("equipoFederadoDetalle", "¿Cuál?", Text),
            FieldDef::new("posicionJuego", "Posición de juego", Choice(PLAY_POSITIONS)),
        ],
        RuleSet::new(vec![
            detail("otrosCampamentosDetalle", "otrosCampamentos", "Especifique cuál"),
            detail("equipoFederadoDetalle", "equipoFederado", "Especifique cuál"),
            choice("posicionJuego", PLAY_POSITIONS),
        ]),
    );

    let uniform = (
        "Uniforme",
        vec![
            FieldDef::new("tallaUniforme", "Talla de uniforme", Choice(UNIFORM_SIZES)),
            FieldDef::new("envioUniforme", "¿Enviar el uniforme a domicilio?", Flag),
            FieldDef::new("direccionEnvio", "Dirección de envío", Text),
            FieldDef::new("ciudadEnvio", "Ciudad de envío", Text),
        ],
        RuleSet::new(vec![
            choice("tallaUniforme", UNIFORM_SIZES),
            detail("direccionEnvio", "envioUniforme", REQUIRED),
            detail("ciudadEnvio", "envioUniforme", REQUIRED),
        ]),
    );

    let chats = (
        "Chats",
        vec![
            FieldDef::new("persona1Parentesco", "Parentesco (contacto 1)", Text),
            FieldDef::new("persona1Telefono", "Teléfono (contacto 1)", Phone),
            FieldDef::new("persona2Parentesco", "Parentesco (contacto 2)", Text),
            FieldDef::new("persona2Telefono", "Teléfono (contacto 2)", Phone),
            FieldDef::new("aceptaTerminos", "Acepto los términos y condiciones", Flag),
        ],
        RuleSet::new(vec![
            FieldRule::required("persona1Parentesco", REQUIRED),
            phone("persona1Telefono"),
            FieldRule::required_when(
                "persona2Telefono",
                Condition::Filled("persona2Parentesco"),
                "Ingrese el número de teléfono",
            )
            .checks(optional_phone("persona2Telefono").checks),
            terms("aceptaTerminos"),
        ]),
    );

    FormDefinition::new(
        FormId::Supplemental,
        SUPPLEMENTAL_SLOT,
        vec![medical, sports, uniform, chats],
    )
    .validating_all_on_submit()
}

/// A supplemental record that passes every section.
#[cfg(test)]
pub(crate) fn complete_record() -> crate::record::FormRecord {
    definition()
        .empty_record()
        .with("eps", "Sanitas")
        .with("tipoSangre", "O")
        .with("factorRh", "positivo")
        .with("estatura", "150")
        .with("peso", "42.5")
        .with("frecuenciaDeporte", "3-4")
        .with("posicionJuego", "mediocampista")
        .with("tallaUniforme", "12")
        .with("persona1Parentesco", "Madre")
        .with("persona1Telefono", "3105551234")
        .with("aceptaTerminos", true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ValidationErrors;

    fn errors(record: &crate::record::FormRecord) -> ValidationErrors {
        definition().validate_all(record)
    }

    #[test]
    fn test_complete_record_passes() {
        let errs = errors(&complete_record());
        assert!(errs.is_empty(), "unexpected errors: {errs}");
        assert!(definition().validate_all_on_submit);
    }

    #[test]
    fn test_detail_required_only_while_gate_is_on() {
        let on = complete_record().with("alergiaMedicamentos", true);
        assert_eq!(
            errors(&on).get("alergiaMedicamentosDetalle"),
            Some("Especifique los medicamentos")
        );

        let off = on.with("alergiaMedicamentos", false);
        assert!(!errors(&off).contains("alergiaMedicamentosDetalle"));
    }

    #[test]
    fn test_federated_team_detail() {
        let record = complete_record().with("equipoFederado", true);
        assert_eq!(errors(&record).get("equipoFederadoDetalle"), Some("Especifique cuál"));
        let record = record.with("equipoFederadoDetalle", "Millonarios FC");
        assert!(errors(&record).is_empty());
    }

    #[test]
    fn test_shipping_requires_address_and_city() {
        let record = complete_record().with("envioUniforme", true);
        let errs = errors(&record);
        assert_eq!(errs.get("direccionEnvio"), Some(REQUIRED));
        assert_eq!(errs.get("ciudadEnvio"), Some(REQUIRED));
    }

    #[test]
    fn test_second_contact_phone_follows_relationship() {
        let record = complete_record().with("persona2Parentesco", "Abuela");
        assert_eq!(
            errors(&record).get("persona2Telefono"),
            Some("Ingrese el número de teléfono")
        );

        let record = complete_record().with("persona2Telefono", "12");
        assert_eq!(
            errors(&record).get("persona2Telefono"),
            Some("Número de teléfono inválido")
        );
    }

    #[test]
    fn test_height_and_weight_formats() {
        let record = complete_record().with("estatura", "1.50").with("peso", "42,5");
        let errs = errors(&record);
        assert_eq!(errs.get("estatura"), Some("Formato inválido. Ejemplo: 170"));
        assert_eq!(errs.get("peso"), Some("Formato inválido. Ejemplo: 65.5"));
    }

    #[test]
    fn test_terms_required_on_last_section() {
        let record = complete_record().with("aceptaTerminos", false);
        let step = definition().step(4).unwrap().validate(&record);
        assert_eq!(step.get("aceptaTerminos"), Some(crate::forms::TERMS_MESSAGE));
    }
}
