//! Cities, camp weeks, age categories and price for the current season.

use camp_types::{Cop, PriceBreakdown};
use serde::Serialize;

/// Camp price before IVA.
pub const BASE_PRICE: Cop = Cop::new(1_690_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampDate {
    pub id: &'static str,
    pub city: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub title: &'static str,
    pub age_range: &'static str,
}

pub const CITIES: [City; 2] = [
    City {
        id: "bogota",
        name: "Bogotá",
    },
    City {
        id: "barranquilla",
        name: "Barranquilla",
    },
];

pub const CAMP_DATES: [CampDate; 5] = [
    CampDate {
        id: "bog-1",
        city: "bogota",
        label: "16 AL 21 JUNIO - SEMANA 1",
    },
    CampDate {
        id: "bog-2",
        city: "bogota",
        label: "23 AL 28 JUNIO - SEMANA 2",
    },
    CampDate {
        id: "bog-3",
        city: "bogota",
        label: "14 AL 19 JULIO - SEMANA 3",
    },
    CampDate {
        id: "bar-1",
        city: "barranquilla",
        label: "23 AL 28 JUNIO - SEMANA 1",
    },
    CampDate {
        id: "bar-2",
        city: "barranquilla",
        label: "30 JUNIO AL 5 JULIO - SEMANA 2",
    },
];

pub const CATEGORIES: [Category; 7] = [
    Category {
        id: "iniciacion",
        title: "Iniciación",
        age_range: "6 a 9 años",
    },
    Category {
        id: "preinfantil",
        title: "Pre Infantil",
        age_range: "10 a 11 años",
    },
    Category {
        id: "infantil",
        title: "Infantil",
        age_range: "12 a 13 años",
    },
    Category {
        id: "prejuvenil-femenino",
        title: "Pre Juvenil Femenino",
        age_range: "14 a 15 años",
    },
    Category {
        id: "prejuvenil-masculino",
        title: "Pre Juvenil Masculino",
        age_range: "14 a 15 años",
    },
    Category {
        id: "juvenil-femenino",
        title: "Juvenil Femenino",
        age_range: "16 a 17 años",
    },
    Category {
        id: "juvenil-masculino",
        title: "Juvenil Masculino",
        age_range: "16 a 17 años",
    },
];

/// `(id, label)` pairs for city pickers.
pub const CITY_CHOICES: &[(&str, &str)] =
    &[("bogota", "Bogotá"), ("barranquilla", "Barranquilla")];

pub const CAMP_DATE_CHOICES: &[(&str, &str)] = &[
    ("bog-1", "Bogotá: 16 AL 21 JUNIO - SEMANA 1"),
    ("bog-2", "Bogotá: 23 AL 28 JUNIO - SEMANA 2"),
    ("bog-3", "Bogotá: 14 AL 19 JULIO - SEMANA 3"),
    ("bar-1", "Barranquilla: 23 AL 28 JUNIO - SEMANA 1"),
    ("bar-2", "Barranquilla: 30 JUNIO AL 5 JULIO - SEMANA 2"),
];

pub const CATEGORY_CHOICES: &[(&str, &str)] = &[
    ("iniciacion", "Iniciación (6 a 9 años)"),
    ("preinfantil", "Pre Infantil (10 a 11 años)"),
    ("infantil", "Infantil (12 a 13 años)"),
    ("prejuvenil-femenino", "Pre Juvenil Femenino (14 a 15 años)"),
    ("prejuvenil-masculino", "Pre Juvenil Masculino (14 a 15 años)"),
    ("juvenil-femenino", "Juvenil Femenino (16 a 17 años)"),
    ("juvenil-masculino", "Juvenil Masculino (16 a 17 años)"),
];

pub fn city(id: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.id == id)
}

pub fn camp_date(id: &str) -> Option<&'static CampDate> {
    CAMP_DATES.iter().find(|d| d.id == id)
}

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Resolves a city given by id or display name (case-insensitive) to its id.
pub fn resolve_city(value: &str) -> Option<&'static str> {
    let value = value.trim();
    CITIES
        .iter()
        .find(|c| c.id == value || c.name.to_lowercase() == value.to_lowercase())
        .map(|c| c.id)
}

/// Resolves a camp week given by id or label to its id.
pub fn resolve_camp_date(value: &str) -> Option<&'static str> {
    let value = value.trim();
    CAMP_DATES
        .iter()
        .find(|d| d.id == value || d.label.eq_ignore_ascii_case(value))
        .map(|d| d.id)
}

/// Resolves a category given by id or title (case-insensitive) to its id.
pub fn resolve_category(value: &str) -> Option<&'static str> {
    let value = value.trim();
    CATEGORIES
        .iter()
        .find(|c| c.id == value || c.title.to_lowercase() == value.to_lowercase())
        .map(|c| c.id)
}

/// Camp weeks offered in `city`, in calendar order.
pub fn dates_for_city(city: &str) -> impl Iterator<Item = &'static CampDate> + '_ {
    CAMP_DATES.iter().filter(move |d| d.city == city)
}

pub fn date_belongs_to_city(date: &str, city: &str) -> bool {
    camp_date(date).is_some_and(|d| d.city == city)
}

pub fn price() -> PriceBreakdown {
    BASE_PRICE.with_iva()
}
