//! Display names for recipient codes.
//!
//! Ships a subset of the IATI Country and Region codelists. Callers extend
//! it from the local store's vocabularies or from a TOML file; lookups fall
//! back to the raw code.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ReconError;

const COUNTRIES: &[(&str, &str)] = &[
    ("AF", "Afghanistan"),
    ("BD", "Bangladesh"),
    ("BF", "Burkina Faso"),
    ("CD", "Congo, The Democratic Republic of the"),
    ("DK", "Denmark"),
    ("ET", "Ethiopia"),
    ("GB", "United Kingdom"),
    ("GH", "Ghana"),
    ("HT", "Haiti"),
    ("IQ", "Iraq"),
    ("KE", "Kenya"),
    ("KH", "Cambodia"),
    ("LA", "Lao People's Democratic Republic"),
    ("LB", "Lebanon"),
    ("ML", "Mali"),
    ("MM", "Myanmar"),
    ("MW", "Malawi"),
    ("MZ", "Mozambique"),
    ("NE", "Niger"),
    ("NG", "Nigeria"),
    ("NP", "Nepal"),
    ("PK", "Pakistan"),
    ("PS", "Palestine, State of"),
    ("RW", "Rwanda"),
    ("SD", "Sudan"),
    ("SN", "Senegal"),
    ("SO", "Somalia"),
    ("SS", "South Sudan"),
    ("SY", "Syrian Arab Republic"),
    ("TH", "Thailand"),
    ("TZ", "Tanzania, United Republic of"),
    ("UA", "Ukraine"),
    ("UG", "Uganda"),
    ("US", "United States"),
    ("VN", "Viet Nam"),
    ("YE", "Yemen"),
    ("ZM", "Zambia"),
    ("ZW", "Zimbabwe"),
];

const REGIONS: &[(&str, &str)] = &[
    ("89", "Europe, regional"),
    ("189", "North of Sahara, regional"),
    ("289", "South of Sahara, regional"),
    ("298", "Africa, regional"),
    ("389", "North & Central America, regional"),
    ("489", "South America, regional"),
    ("498", "America, regional"),
    ("589", "Middle East, regional"),
    ("619", "Central Asia, regional"),
    ("679", "South Asia, regional"),
    ("689", "South & Central Asia, regional"),
    ("789", "Far East Asia, regional"),
    ("798", "Asia, regional"),
    ("889", "Oceania, regional"),
    ("998", "Developing countries, unspecified"),
];

/// Code → name lookups for countries, regions and organisations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    countries: HashMap<String, String>,
    regions: HashMap<String, String>,
    organisations: HashMap<String, String>,
}

impl ReferenceTables {
    /// Built-in country and region names; no organisations.
    pub fn builtin() -> Self {
        Self {
            countries: to_map(COUNTRIES),
            regions: to_map(REGIONS),
            organisations: HashMap::new(),
        }
    }

    /// Parse a TOML table file:
    ///
    /// ```toml
    /// [countries]
    /// MM = "Myanmar"
    /// [regions]
    /// "298" = "Africa, regional"
    /// [organisations]
    /// "XM-DAC-41114" = "UNDP"
    /// ```
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut tables: ReferenceTables =
            toml::from_str(input).map_err(|e| ReconError::ReferenceTable(e.to_string()))?;
        tables.countries = tables
            .countries
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Ok(tables)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merged(mut self, other: ReferenceTables) -> Self {
        self.countries.extend(other.countries);
        self.regions.extend(other.regions);
        self.organisations.extend(other.organisations);
        self
    }

    pub fn with_country(mut self, code: &str, name: &str) -> Self {
        self.countries.insert(code.to_uppercase(), name.to_string());
        self
    }

    pub fn with_organisation(mut self, reference: &str, name: &str) -> Self {
        self.organisations.insert(reference.to_string(), name.to_string());
        self
    }

    pub fn country_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.countries
            .get(&code.to_uppercase())
            .map(String::as_str)
            .unwrap_or(code)
    }

    pub fn region_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.regions.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn organisation_name(&self, reference: &str) -> Option<&str> {
        self.organisations.get(reference).map(String::as_str)
    }
}

fn to_map(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
