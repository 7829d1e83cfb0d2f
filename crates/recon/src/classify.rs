use aidrecon_iati::OrganisationDocument;

use crate::coverage::is_home_country;
use crate::label::formatter_for;
use crate::model::{ArrayItem, FieldCategory, FieldValue, ImportField, LocalOrganisation};
use crate::reference::ReferenceTables;

pub const PATH_IDENTIFIER: &str = "iati-organisation/organisation-identifier";
pub const PATH_NAME: &str = "iati-organisation/name";
pub const PATH_REPORTING_REF: &str = "iati-organisation/reporting-org/@ref";
pub const PATH_REPORTING_TYPE: &str = "iati-organisation/reporting-org/@type";
pub const PATH_DEFAULT_CURRENCY: &str = "iati-organisation/@default-currency";
pub const PATH_DEFAULT_LANGUAGE: &str = "iati-organisation/@xml:lang";

pub const PATH_TOTAL_BUDGET: &str = "iati-organisation/total-budget";
pub const PATH_COUNTRY_BUDGET: &str = "iati-organisation/recipient-country-budget";
pub const PATH_REGION_BUDGET: &str = "iati-organisation/recipient-region-budget";
pub const PATH_ORG_BUDGET: &str = "iati-organisation/recipient-org-budget";
pub const PATH_EXPENDITURE: &str = "iati-organisation/total-expenditure";
pub const PATH_DOCUMENT: &str = "iati-organisation/document-link";

/// A scalar row: label, identity, and how to read each side.
struct ScalarField {
    label: &'static str,
    path: &'static str,
    local: fn(&LocalOrganisation) -> Option<&str>,
    imported: fn(&OrganisationDocument) -> Option<&str>,
}

const SCALAR_FIELDS: [ScalarField; 6] = [
    ScalarField {
        label: "IATI Organization ID",
        path: PATH_IDENTIFIER,
        local: |l| l.iati_org_id.as_deref(),
        imported: |d| Some(d.identifier.as_str()),
    },
    ScalarField {
        label: "Organization Name",
        path: PATH_NAME,
        local: |l| l.name.as_deref(),
        imported: |d| d.name.as_deref(),
    },
    ScalarField {
        label: "Reporting Organization Reference",
        path: PATH_REPORTING_REF,
        local: |l| l.reporting_org_ref.as_deref(),
        imported: |d| d.reporting_org.reference.as_deref(),
    },
    ScalarField {
        label: "Reporting Organization Type",
        path: PATH_REPORTING_TYPE,
        local: |l| l.reporting_org_type.as_deref(),
        imported: |d| d.reporting_org.org_type.as_deref(),
    },
    ScalarField {
        label: "Default Currency",
        path: PATH_DEFAULT_CURRENCY,
        local: |l| l.default_currency.as_deref(),
        imported: |d| d.default_currency.as_deref(),
    },
    ScalarField {
        label: "Default Language",
        path: PATH_DEFAULT_LANGUAGE,
        local: |l| l.default_language.as_deref(),
        imported: |d| d.default_language.as_deref(),
    },
];

/// Scalar status as `(is_new, has_conflict)`.
///
/// New when the local side is blank, whatever was imported. Conflict when the
/// local side has a value that differs from the import after trimming
/// (case-sensitive). Otherwise unchanged. Never both.
pub fn classify_scalar(current: &FieldValue, imported: &FieldValue) -> (bool, bool) {
    if current.is_blank() {
        (true, false)
    } else {
        (false, current.trimmed() != imported.trimmed())
    }
}

/// Build the preview rows using the built-in reference tables.
pub fn build_fields(
    local: &LocalOrganisation,
    parsed: &OrganisationDocument,
    home_country: &str,
) -> Vec<ImportField> {
    build_fields_with(local, parsed, home_country, &ReferenceTables::builtin())
}

/// Build the preview rows: the six identification scalars first, then one
/// row per array item, grouped by category precedence and kept in source
/// order within a category. Nothing is pre-selected.
pub fn build_fields_with(
    local: &LocalOrganisation,
    parsed: &OrganisationDocument,
    home_country: &str,
    refs: &ReferenceTables,
) -> Vec<ImportField> {
    let mut fields = Vec::new();

    for scalar in &SCALAR_FIELDS {
        let current_value = FieldValue::from_option((scalar.local)(local));
        let import_value = FieldValue::from_option((scalar.imported)(parsed));
        let (is_new, has_conflict) = classify_scalar(&current_value, &import_value);
        fields.push(ImportField {
            field_name: scalar.label.to_string(),
            iati_path: scalar.path.to_string(),
            category: FieldCategory::Identification,
            current_value,
            import_value,
            selected: false,
            has_conflict,
            is_new,
            is_array_item: false,
            item_index: None,
            item_data: None,
            is_home_country: None,
        });
    }

    let groups: [(&str, Vec<ArrayItem>); 6] = [
        (
            PATH_TOTAL_BUDGET,
            parsed.total_budgets.iter().cloned().map(ArrayItem::TotalBudget).collect(),
        ),
        (
            PATH_COUNTRY_BUDGET,
            parsed
                .recipient_country_budgets
                .iter()
                .cloned()
                .map(ArrayItem::CountryBudget)
                .collect(),
        ),
        (
            PATH_REGION_BUDGET,
            parsed
                .recipient_region_budgets
                .iter()
                .cloned()
                .map(ArrayItem::RegionBudget)
                .collect(),
        ),
        (
            PATH_ORG_BUDGET,
            parsed
                .recipient_org_budgets
                .iter()
                .cloned()
                .map(ArrayItem::OrgBudget)
                .collect(),
        ),
        (
            PATH_EXPENDITURE,
            parsed.total_expenditures.iter().cloned().map(ArrayItem::Expenditure).collect(),
        ),
        (
            PATH_DOCUMENT,
            parsed.document_links.iter().cloned().map(ArrayItem::Document).collect(),
        ),
    ];

    for (path, items) in groups {
        for (index, item) in items.into_iter().enumerate() {
            fields.push(array_field(path, index, item, home_country, refs));
        }
    }

    fields
}

/// Array items are always offered as additions: there is no identity
/// matching against collections already in the store.
fn array_field(
    path: &str,
    index: usize,
    item: ArrayItem,
    home_country: &str,
    refs: &ReferenceTables,
) -> ImportField {
    let formatter = formatter_for(&item);
    let home_flag = match &item {
        ArrayItem::CountryBudget(b) => {
            Some(is_home_country(&b.recipient_country.code, home_country))
        }
        _ => None,
    };
    ImportField {
        field_name: formatter.label(&item, refs),
        iati_path: path.to_string(),
        category: item.category(),
        current_value: FieldValue::Missing,
        import_value: FieldValue::Text(formatter.summary(&item)),
        selected: false,
        has_conflict: false,
        is_new: true,
        is_array_item: true,
        item_index: Some(index),
        item_data: Some(item),
        is_home_country: home_flag,
    }
}
