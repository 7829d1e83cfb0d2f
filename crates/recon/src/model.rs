use std::collections::BTreeMap;

use aidrecon_iati::{
    DocumentLink, MoneyPeriod, OrganisationDocument, RecipientCountryBudget, RecipientOrgBudget,
    RecipientRegionBudget,
};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Local snapshot
// ---------------------------------------------------------------------------

/// The locally stored organisation record, as returned by the store's read
/// endpoint. Absent fields deserialize to `None` and are treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalOrganisation {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "id_text")]
    pub id: Option<String>,
    pub iati_org_id: Option<String>,
    pub name: Option<String>,
    pub reporting_org_ref: Option<String>,
    pub reporting_org_type: Option<String>,
    pub default_currency: Option<String>,
    pub default_language: Option<String>,
}

/// Store ids arrive as either numbers or strings.
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }
    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Field taxonomy
// ---------------------------------------------------------------------------

/// Category buckets, declared in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldCategory {
    Identification,
    TotalBudgets,
    CountryBudgets,
    RegionBudgets,
    OrgBudgets,
    Expenditures,
    Documents,
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 7] = [
        Self::Identification,
        Self::TotalBudgets,
        Self::CountryBudgets,
        Self::RegionBudgets,
        Self::OrgBudgets,
        Self::Expenditures,
        Self::Documents,
    ];

    pub fn is_array(&self) -> bool {
        !matches!(self, Self::Identification)
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identification => write!(f, "identification"),
            Self::TotalBudgets => write!(f, "total-budgets"),
            Self::CountryBudgets => write!(f, "country-budgets"),
            Self::RegionBudgets => write!(f, "region-budgets"),
            Self::OrgBudgets => write!(f, "org-budgets"),
            Self::Expenditures => write!(f, "expenditures"),
            Self::Documents => write!(f, "documents"),
        }
    }
}

/// One repeating entity from the imported document, forwarded verbatim on
/// commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum ArrayItem {
    TotalBudget(MoneyPeriod),
    CountryBudget(RecipientCountryBudget),
    RegionBudget(RecipientRegionBudget),
    OrgBudget(RecipientOrgBudget),
    Expenditure(MoneyPeriod),
    Document(DocumentLink),
}

impl ArrayItem {
    pub fn category(&self) -> FieldCategory {
        match self {
            Self::TotalBudget(_) => FieldCategory::TotalBudgets,
            Self::CountryBudget(_) => FieldCategory::CountryBudgets,
            Self::RegionBudget(_) => FieldCategory::RegionBudgets,
            Self::OrgBudget(_) => FieldCategory::OrgBudgets,
            Self::Expenditure(_) => FieldCategory::Expenditures,
            Self::Document(_) => FieldCategory::Documents,
        }
    }

    /// The money part of budget-like items.
    pub fn money(&self) -> Option<&MoneyPeriod> {
        match self {
            Self::TotalBudget(m) | Self::Expenditure(m) => Some(m),
            Self::CountryBudget(b) => Some(&b.budget),
            Self::RegionBudget(b) => Some(&b.budget),
            Self::OrgBudget(b) => Some(&b.budget),
            Self::Document(_) => None,
        }
    }
}

/// A field's value on one side of the comparison. `Missing` (no value at all)
/// and `Text("")` (present but blank) are distinct states.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Missing,
    Text(String),
}

impl FieldValue {
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::Text(v.to_string()),
            None => Self::Missing,
        }
    }

    /// Trimmed text, `""` when missing.
    pub fn trimmed(&self) -> &str {
        match self {
            Self::Missing => "",
            Self::Text(t) => t.trim(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// A single reviewable row in the import preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportField {
    pub field_name: String,
    /// Stable identity; together with `item_index` it uniquely names a field.
    pub iati_path: String,
    pub category: FieldCategory,
    pub current_value: FieldValue,
    pub import_value: FieldValue,
    pub selected: bool,
    pub has_conflict: bool,
    pub is_new: bool,
    pub is_array_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_data: Option<ArrayItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_home_country: Option<bool>,
}

impl ImportField {
    pub fn matches(&self, iati_path: &str, item_index: Option<usize>) -> bool {
        self.iati_path == iati_path && self.item_index == item_index
    }

    pub fn is_unchanged(&self) -> bool {
        !self.is_new && !self.has_conflict
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TotalBudgetCoverage {
    pub count: usize,
    /// Plain sum of values regardless of currency. Check `currencies` before
    /// presenting this as one monetary figure.
    pub total_value: f64,
    /// Distinct currencies across total budgets, first-seen order.
    pub currencies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountryBudgetCoverage {
    pub has_home_country_budget: bool,
    /// First home-country budget in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_country_budget: Option<RecipientCountryBudget>,
    /// Codes of the other recipient countries, first-seen order, no repeats.
    pub other_countries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub total_budgets: TotalBudgetCoverage,
    pub country_budgets: CountryBudgetCoverage,
    pub region_budget_count: usize,
    pub org_budget_count: usize,
    pub expenditure_count: usize,
    pub document_count: usize,
}

// ---------------------------------------------------------------------------
// Commit wire contract
// ---------------------------------------------------------------------------

/// One selected array item as sent to the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub iati_path: String,
    pub category: FieldCategory,
    pub item_index: usize,
    pub item_data: ArrayItem,
}

/// The single unit of work submitted for a commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub field_selection_map: BTreeMap<String, bool>,
    pub raw_parsed_document: OrganisationDocument,
    pub selected_items: Vec<SelectedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    #[serde(alias = "updated_field_count")]
    pub updated_field_count: usize,
    #[serde(default, alias = "updated_field_names")]
    pub updated_field_names: Vec<String>,
}
