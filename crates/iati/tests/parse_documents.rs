use std::path::PathBuf;

use aidrecon_iati::{parse, validate, ViolationKind};
use chrono::NaiveDate;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// -------------------------------------------------------------------------
// Full document
// -------------------------------------------------------------------------

#[test]
fn full_document_identification() {
    let doc = parse(&fixture("organisation-full.xml")).unwrap();

    assert_eq!(doc.identifier, "DK-CVR-20228799");
    assert_eq!(doc.name.as_deref(), Some("Danish Red Cross"));
    assert_eq!(doc.name_narratives.len(), 2);
    assert_eq!(doc.name_narratives[1].text, "Dansk Røde Kors");
    assert_eq!(doc.name_narratives[1].language.as_deref(), Some("da"));
    // Narrative without xml:lang inherits the organisation language.
    assert_eq!(doc.name_narratives[0].language.as_deref(), Some("en"));

    assert_eq!(doc.reporting_org.reference.as_deref(), Some("DK-CVR-20228799"));
    assert_eq!(doc.reporting_org.org_type.as_deref(), Some("21"));
    assert!(!doc.reporting_org.secondary_reporter);
    assert_eq!(doc.default_currency.as_deref(), Some("EUR"));
    assert_eq!(doc.default_language.as_deref(), Some("en"));
    assert_eq!(doc.last_updated.as_deref(), Some("2024-05-30T12:00:00Z"));
}

#[test]
fn full_document_budgets() {
    let doc = parse(&fixture("organisation-full.xml")).unwrap();

    assert_eq!(doc.total_budgets.len(), 2);
    let first = &doc.total_budgets[0];
    assert_eq!(first.value, 1000.0);
    assert_eq!(first.currency, "USD");
    assert_eq!(first.period(), Some((date("2024-01-01"), date("2024-12-31"))));
    assert_eq!(first.status.as_deref(), Some("2"));
    assert_eq!(first.lines.len(), 1);
    assert_eq!(first.lines[0].value, 400.0);
    assert_eq!(first.lines[0].narratives[0].text, "Programmes");

    // No currency attribute: default currency is substituted.
    assert_eq!(doc.total_budgets[1].currency, "EUR");
    assert_eq!(doc.total_budgets[1].value, 2500.5);

    assert_eq!(doc.recipient_org_budgets.len(), 1);
    let org = &doc.recipient_org_budgets[0];
    assert_eq!(org.recipient_org.reference.as_deref(), Some("XM-DAC-41114"));
    assert_eq!(
        org.recipient_org.narrative.as_deref(),
        Some("United Nations Development Programme")
    );

    assert_eq!(doc.recipient_region_budgets.len(), 1);
    assert_eq!(doc.recipient_region_budgets[0].recipient_region.code, "298");
    assert_eq!(
        doc.recipient_region_budgets[0].recipient_region.vocabulary.as_deref(),
        Some("1")
    );

    let countries: Vec<&str> = doc
        .recipient_country_budgets
        .iter()
        .map(|b| b.recipient_country.code.as_str())
        .collect();
    assert_eq!(countries, vec!["MM", "KE"]);
    // Open-ended period is kept, not rejected.
    assert_eq!(doc.recipient_country_budgets[1].budget.period_end, None);
    assert_eq!(
        doc.recipient_country_budgets[1].recipient_country.narrative.as_deref(),
        Some("Kenya")
    );

    assert_eq!(doc.total_expenditures.len(), 1);
    assert_eq!(doc.total_expenditures[0].value, 880.0);
    assert_eq!(doc.total_expenditures[0].lines.len(), 1);
}

#[test]
fn full_document_links() {
    let doc = parse(&fixture("organisation-full.xml")).unwrap();

    assert_eq!(doc.document_links.len(), 2);
    let report = &doc.document_links[0];
    assert_eq!(report.url, "https://example.org/annual-report-2023.pdf");
    assert_eq!(report.format.as_deref(), Some("application/pdf"));
    assert_eq!(report.document_date, Some(date("2024-04-15")));
    let titles: Vec<&str> = report.titles.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(titles, vec!["Annual Report 2023", "Årsrapport 2023"]);
    assert_eq!(report.primary_title(), Some("Annual Report 2023"));
    assert_eq!(report.descriptions[0].text, "Audited accounts & narrative report");
    assert_eq!(report.categories, vec!["B01", "B02"]);
    assert_eq!(report.languages, vec!["en"]);
    assert_eq!(report.recipient_countries[0].code, "MM");

    let strategy = &doc.document_links[1];
    assert!(strategy.descriptions.is_empty());
    assert!(strategy.languages.is_empty());
}

// -------------------------------------------------------------------------
// Variants
// -------------------------------------------------------------------------

#[test]
fn namespaced_document_and_extra_organisations() {
    let doc = parse(&fixture("organisation-namespaced.xml")).unwrap();
    assert_eq!(doc.identifier, "SN-NINEA-123");
    assert_eq!(doc.name.as_deref(), Some("Association Sénégalaise"));
    assert_eq!(doc.default_currency.as_deref(), Some("XOF"));
    assert_eq!(doc.default_language.as_deref(), Some("fr"));
    assert_eq!(doc.skipped_organisations, vec!["SN-NINEA-456"]);
    assert!(doc.total_budgets.is_empty());
    assert!(doc.total_expenditures.is_empty());
}

#[test]
fn single_occurrence_is_still_a_list() {
    let xml = r#"<iati-organisations><iati-organisation default-currency="GBP">
  <organisation-identifier>GB-CHC-1</organisation-identifier>
  <document-link url="https://example.org/a"><title><narrative>A</narrative></title></document-link>
</iati-organisation></iati-organisations>"#;
    let doc = parse(xml).unwrap();
    assert_eq!(doc.document_links.len(), 1);
    assert!(doc.recipient_country_budgets.is_empty());
    assert_eq!(doc.name, None);
}

#[test]
fn unsupported_elements_are_ignored() {
    let xml = r#"<iati-organisations><iati-organisation>
  <organisation-identifier>GB-CHC-1</organisation-identifier>
  <contact-info><email>x@example.org</email></contact-info>
  <some-future-element foo="bar"><nested/></some-future-element>
</iati-organisation></iati-organisations>"#;
    assert!(validate(xml).is_valid());
}

// -------------------------------------------------------------------------
// Violations
// -------------------------------------------------------------------------

#[test]
fn all_violations_are_collected() {
    let xml = r#"<iati-organisations><iati-organisation>
  <name><narrative>No id</narrative></name>
  <total-budget>
    <period-start iso-date="2024-01-01"/>
    <period-end iso-date="2024-12-31"/>
    <value>-5</value>
  </total-budget>
  <document-link url="">
    <title/>
  </document-link>
</iati-organisation></iati-organisations>"#;
    let report = validate(xml);
    let messages: Vec<&str> = report.violations.iter().map(|v| v.message.as_str()).collect();

    assert!(messages.iter().any(|m| m.contains("organisation-identifier")), "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("total-budget[0]/value")), "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("no currency")), "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("document-link[0] has no url")), "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("document-link[0] has no title")), "{messages:?}");

    let err = parse(xml).unwrap_err();
    assert_eq!(err.violations, report.violations);
}

#[test]
fn malformed_text_reports_malformed_xml() {
    for text in [
        "<not-xml",
        "<iati-organisations><iati-organisation></iati-organisations",
        "plain words",
    ] {
        let report = validate(text);
        assert!(
            report.violations.iter().any(|v| v.kind == ViolationKind::MalformedXml)
                || report
                    .violations
                    .iter()
                    .any(|v| v.kind == ViolationKind::MissingRequiredElement),
            "{text}: {:?}",
            report.violations
        );
        assert!(parse(text).is_err());
    }
    assert!(validate("<not-xml")
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::MalformedXml));
}

#[test]
fn bad_attributes_are_malformed_xml() {
    let duplicate = r#"<iati-organisations><iati-organisation default-currency="USD" default-currency="EUR"><organisation-identifier>X-1</organisation-identifier></iati-organisation></iati-organisations>"#;
    let report = validate(duplicate);
    assert_eq!(report.violations.len(), 1, "{:?}", report.violations);
    assert_eq!(report.violations[0].kind, ViolationKind::MalformedXml);
    assert!(parse(duplicate).is_err());

    let unquoted = r#"<iati-organisations>
  <iati-organisation default-currency=EUR>
    <organisation-identifier>X-1</organisation-identifier>
    <total-budget>
      <period-start iso-date="2024-01-01"/>
      <period-end iso-date="2024-12-31"/>
      <value>1000</value>
    </total-budget>
  </iati-organisation>
</iati-organisations>"#;
    let report = validate(unquoted);
    assert!(
        report.violations.iter().any(|v| v.kind == ViolationKind::MalformedXml
            && v.message.contains("<iati-organisation>")),
        "{:?}",
        report.violations
    );
    assert!(parse(unquoted).is_err());
}

#[test]
fn parsed_document_serializes() {
    let doc = parse(&fixture("organisation-full.xml")).unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["identifier"], "DK-CVR-20228799");
    assert_eq!(json["reporting_org"]["ref"], "DK-CVR-20228799");
    assert_eq!(json["recipient_country_budgets"][0]["recipient_country"]["code"], "MM");
    assert_eq!(json["recipient_country_budgets"][0]["period_start"], "2024-01-01");
    assert!(json.get("skipped_organisations").is_none());
}
