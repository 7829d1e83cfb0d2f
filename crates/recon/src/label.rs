//! Category-specific display text for array items.
//!
//! One formatter per category, picked by [`formatter_for`] from the item's
//! category tag. The classifier only asks for a label and a value summary
//! and never inspects the shape.

use aidrecon_iati::MoneyPeriod;

use crate::model::ArrayItem;
use crate::reference::ReferenceTables;

pub const PERIOD_NOT_SPECIFIED: &str = "Period not specified";

pub trait LabelFormatter: Sync {
    /// Row label, e.g. `Myanmar Budget - 2024-01-01 to 2024-12-31`.
    fn label(&self, item: &ArrayItem, refs: &ReferenceTables) -> String;

    /// Short value shown in the "import value" column.
    fn summary(&self, item: &ArrayItem) -> String {
        match item.money() {
            Some(m) => format_amount(m),
            None => String::new(),
        }
    }
}

struct TotalBudgetLabel;
struct CountryBudgetLabel;
struct RegionBudgetLabel;
struct OrgBudgetLabel;
struct ExpenditureLabel;
struct DocumentLabel;

impl LabelFormatter for TotalBudgetLabel {
    fn label(&self, item: &ArrayItem, _refs: &ReferenceTables) -> String {
        budget_label("Total", item.money())
    }
}

impl LabelFormatter for CountryBudgetLabel {
    fn label(&self, item: &ArrayItem, refs: &ReferenceTables) -> String {
        let subject = match item {
            ArrayItem::CountryBudget(b) => refs.country_name(&b.recipient_country.code),
            _ => "Country",
        };
        budget_label(subject, item.money())
    }
}

impl LabelFormatter for RegionBudgetLabel {
    fn label(&self, item: &ArrayItem, refs: &ReferenceTables) -> String {
        let subject = match item {
            ArrayItem::RegionBudget(b) => refs.region_name(&b.recipient_region.code),
            _ => "Region",
        };
        budget_label(subject, item.money())
    }
}

impl LabelFormatter for OrgBudgetLabel {
    fn label(&self, item: &ArrayItem, refs: &ReferenceTables) -> String {
        let subject = match item {
            ArrayItem::OrgBudget(b) => {
                let org = &b.recipient_org;
                org.narrative
                    .as_deref()
                    .or_else(|| org.reference.as_deref().and_then(|r| refs.organisation_name(r)))
                    .or(org.reference.as_deref())
                    .unwrap_or("Unknown Organisation")
            }
            _ => "Organisation",
        };
        budget_label(subject, item.money())
    }
}

impl LabelFormatter for ExpenditureLabel {
    fn label(&self, item: &ArrayItem, _refs: &ReferenceTables) -> String {
        format!("Total Expenditure Budget - {}", period_text(item.money()))
    }
}

impl LabelFormatter for DocumentLabel {
    fn label(&self, item: &ArrayItem, _refs: &ReferenceTables) -> String {
        match item {
            ArrayItem::Document(d) => {
                format!("Document: {}", d.primary_title().unwrap_or(&d.url))
            }
            _ => "Document".to_string(),
        }
    }

    fn summary(&self, item: &ArrayItem) -> String {
        match item {
            ArrayItem::Document(d) => d.url.clone(),
            _ => String::new(),
        }
    }
}

/// Formatter for an item's category tag. Identification rows are scalars
/// with fixed labels and never reach this.
pub fn formatter_for(item: &ArrayItem) -> &'static dyn LabelFormatter {
    match item {
        ArrayItem::TotalBudget(_) => &TotalBudgetLabel,
        ArrayItem::CountryBudget(_) => &CountryBudgetLabel,
        ArrayItem::RegionBudget(_) => &RegionBudgetLabel,
        ArrayItem::OrgBudget(_) => &OrgBudgetLabel,
        ArrayItem::Expenditure(_) => &ExpenditureLabel,
        ArrayItem::Document(_) => &DocumentLabel,
    }
}

fn budget_label(subject: &str, money: Option<&MoneyPeriod>) -> String {
    format!("{subject} Budget - {}", period_text(money))
}

fn period_text(money: Option<&MoneyPeriod>) -> String {
    match money.and_then(MoneyPeriod::period) {
        Some((start, end)) => format!("{start} to {end}"),
        None => PERIOD_NOT_SPECIFIED.to_string(),
    }
}

/// `1000 USD`, `2500.50 EUR`.
pub fn format_amount(m: &MoneyPeriod) -> String {
    if m.value.fract() == 0.0 {
        format!("{:.0} {}", m.value, m.currency)
    } else {
        format!("{:.2} {}", m.value, m.currency)
    }
}
