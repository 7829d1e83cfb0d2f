use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

/// A text node paired with its language (explicit `xml:lang`, else the
/// document default language, else none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// An amount of money over an optional period.
///
/// `period_start <= period_end` whenever both are present; the parser rejects
/// documents that violate this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyPeriod {
    pub value: f64,
    pub currency: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date: Option<NaiveDate>,
    /// IATI budget status code ("1" indicative, "2" committed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<BudgetLine>,
}

impl MoneyPeriod {
    /// Both bounds, or `None` when either is missing.
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.period_start?, self.period_end?))
    }
}

/// A `budget-line` or `expense-line` breakdown entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub value: f64,
    pub currency: String,
    pub narratives: Vec<Narrative>,
}

// ---------------------------------------------------------------------------
// Budgets with a recipient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientCountry {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientRegion {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientOrg {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientCountryBudget {
    pub recipient_country: RecipientCountry,
    #[serde(flatten)]
    pub budget: MoneyPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientRegionBudget {
    pub recipient_region: RecipientRegion,
    #[serde(flatten)]
    pub budget: MoneyPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientOrgBudget {
    pub recipient_org: RecipientOrg,
    #[serde(flatten)]
    pub budget: MoneyPeriod,
}

// ---------------------------------------------------------------------------
// Document links
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    /// Never empty.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_date: Option<NaiveDate>,
    /// At least one entry; source order.
    pub titles: Vec<Narrative>,
    pub descriptions: Vec<Narrative>,
    pub categories: Vec<String>,
    pub languages: Vec<String>,
    pub recipient_countries: Vec<RecipientCountry>,
}

impl DocumentLink {
    pub fn primary_title(&self) -> Option<&str> {
        self.titles
            .iter()
            .map(|n| n.text.as_str())
            .find(|t| !t.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Organisation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportingOrg {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub secondary_reporter: bool,
    pub narratives: Vec<Narrative>,
}

/// Normalized content of one `iati-organisation` element.
///
/// Repeating blocks are always vectors, empty when the source has none.
/// `None` means the source did not carry the value at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganisationDocument {
    pub identifier: String,
    pub name: Option<String>,
    pub name_narratives: Vec<Narrative>,
    pub reporting_org: ReportingOrg,
    pub default_currency: Option<String>,
    pub default_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub total_budgets: Vec<MoneyPeriod>,
    pub recipient_country_budgets: Vec<RecipientCountryBudget>,
    pub recipient_region_budgets: Vec<RecipientRegionBudget>,
    pub recipient_org_budgets: Vec<RecipientOrgBudget>,
    pub total_expenditures: Vec<MoneyPeriod>,
    pub document_links: Vec<DocumentLink>,
    /// Identifiers of further `iati-organisation` elements that were not imported.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_organisations: Vec<String>,
}
