//! Request and response bodies of the REST API.

use camp_core::catalogue;
use camp_core::{FormRecord, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CityRes {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampDateRes {
    pub id: String,
    pub city: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryRes {
    pub id: String,
    pub title: String,
    pub age_range: String,
}

/// Amounts in whole pesos; `formatted_total` is the display string, e.g. `$2.011.100`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PriceRes {
    pub base: u64,
    pub iva: u64,
    pub total: u64,
    pub formatted_total: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogueRes {
    pub cities: Vec<CityRes>,
    pub dates: Vec<CampDateRes>,
    pub categories: Vec<CategoryRes>,
    pub price: PriceRes,
}

impl CatalogueRes {
    pub fn current() -> Self {
        let price = catalogue::price();
        Self {
            cities: catalogue::CITIES
                .iter()
                .map(|c| CityRes {
                    id: c.id.into(),
                    name: c.name.into(),
                })
                .collect(),
            dates: catalogue::CAMP_DATES
                .iter()
                .map(|d| CampDateRes {
                    id: d.id.into(),
                    city: d.city.into(),
                    label: d.label.into(),
                })
                .collect(),
            categories: catalogue::CATEGORIES
                .iter()
                .map(|c| CategoryRes {
                    id: c.id.into(),
                    title: c.title.into(),
                    age_range: c.age_range.into(),
                })
                .collect(),
            price: PriceRes {
                base: price.base.pesos(),
                iva: price.iva.pesos(),
                total: price.total.pesos(),
                formatted_total: price.total.to_string(),
            },
        }
    }
}

/// Body posted by the landing page's pre-registration form.
///
/// Missing keys are treated as empty. City, date and category may be given by id or
/// by display text. `rangoEdad` is accepted for compatibility; the sheet derives the
/// age range from the category.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PreRegistrationReq {
    pub categoria: String,
    pub rango_edad: String,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub ciudad: String,
    pub fecha_preferida: String,
    /// RFC 3339 submission time; the server clock is used when absent or unparsable.
    pub timestamp: Option<String>,
}

impl PreRegistrationReq {
    /// The pre-registration record these values map onto.
    ///
    /// A date label is looked up among the chosen city's weeks first, since labels
    /// repeat across cities.
    pub fn to_record(&self) -> FormRecord {
        let city = catalogue::resolve_city(&self.ciudad)
            .map_or_else(|| self.ciudad.trim().to_string(), str::to_string);
        let wanted = self.fecha_preferida.trim();
        let date = catalogue::dates_for_city(&city)
            .find(|d| d.id == wanted || d.label.eq_ignore_ascii_case(wanted))
            .map(|d| d.id)
            .or_else(|| catalogue::resolve_camp_date(wanted))
            .map_or_else(|| wanted.to_string(), str::to_string);
        let category = catalogue::resolve_category(&self.categoria)
            .map_or_else(|| self.categoria.trim().to_string(), str::to_string);

        FormRecord::new()
            .with("city", city)
            .with("date", date)
            .with("category", category)
            .with("name", self.nombre.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.telefono.as_str())
    }
}

/// A form record as a flat JSON object of field name to value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RecordReq(#[schema(value_type = Object)] pub FormRecord);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitRes {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormSubmitRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StepValidationRes {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorsRes {
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderStatusRes {
    pub order_id: u64,
    pub status: String,
    /// `pending`, `paid` or `failed`.
    pub payment: String,
}

pub(crate) fn error_map(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .iter()
        .map(|(field, message)| (field.to_string(), message.to_string()))
        .collect()
}
