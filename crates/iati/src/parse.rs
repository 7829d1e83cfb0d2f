//! Validation and parsing of IATI organisation files.
//!
//! Both entry points share one pass over the element tree: `validate` keeps
//! only the violations, `parse` refuses to return a document unless the pass
//! produced none.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::error::{ParseError, ParseViolation};
use crate::model::{
    BudgetLine, DocumentLink, MoneyPeriod, Narrative, OrganisationDocument, RecipientCountry,
    RecipientCountryBudget, RecipientOrg, RecipientOrgBudget, RecipientRegion,
    RecipientRegionBudget, ReportingOrg,
};
use crate::xml::{read_tree, Element};

pub const ROOT_ELEMENT: &str = "iati-organisations";
pub const ORGANISATION_ELEMENT: &str = "iati-organisation";

/// Outcome of [`validate`]. Empty means the document can be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<ParseViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_result(self) -> Result<(), ParseError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ParseError {
                violations: self.violations,
            })
        }
    }
}

/// Check well-formedness and the structural prerequisites of a document,
/// collecting every violation found.
pub fn validate(text: &str) -> ValidationReport {
    let (_, violations) = read_document(text);
    ValidationReport { violations }
}

/// Parse a document that passed [`validate`].
///
/// Re-checks the document; if any violation exists the whole list is
/// returned and no partial document escapes.
pub fn parse(text: &str) -> Result<OrganisationDocument, ParseError> {
    match read_document(text) {
        (Some(doc), violations) if violations.is_empty() => {
            debug!(
                "parsed organisation {}: {} total budgets, {} country budgets, {} region budgets, \
                 {} org budgets, {} expenditures, {} documents",
                doc.identifier,
                doc.total_budgets.len(),
                doc.recipient_country_budgets.len(),
                doc.recipient_region_budgets.len(),
                doc.recipient_org_budgets.len(),
                doc.total_expenditures.len(),
                doc.document_links.len(),
            );
            Ok(doc)
        }
        (_, violations) => Err(ParseError { violations }),
    }
}

fn read_document(text: &str) -> (Option<OrganisationDocument>, Vec<ParseViolation>) {
    let tree = read_tree(text);
    let mut violations = tree.violations;

    let Some(root) = tree.root else {
        violations.push(ParseViolation::missing(format!(
            "no root element; expected <{ROOT_ELEMENT}>"
        )));
        return (None, violations);
    };

    let organisations: Vec<&Element> = match root.name.as_str() {
        ROOT_ELEMENT => root.children_named(ORGANISATION_ELEMENT).collect(),
        ORGANISATION_ELEMENT => vec![&root],
        other => {
            violations.push(ParseViolation::missing(format!(
                "root element <{ROOT_ELEMENT}> not found (document root is <{other}>)"
            )));
            return (None, violations);
        }
    };

    let Some((first, rest)) = organisations.split_first() else {
        violations.push(ParseViolation::missing(format!(
            "<{ROOT_ELEMENT}> contains no <{ORGANISATION_ELEMENT}>"
        )));
        return (None, violations);
    };

    let mut builder = Builder::new(first);
    let mut doc = builder.organisation(first);
    violations.append(&mut builder.violations);

    for other in rest {
        let id = organisation_identifier(other).unwrap_or_else(|| "(no identifier)".into());
        warn!("ignoring additional <{ORGANISATION_ELEMENT}> {id}; only the first is imported");
        doc.skipped_organisations.push(id);
    }

    (Some(doc), violations)
}

/// `organisation-identifier` element, then the legacy `iati-identifier`
/// element, then an `organisation-identifier` attribute.
fn organisation_identifier(org: &Element) -> Option<String> {
    org.child("organisation-identifier")
        .and_then(Element::trimmed_text)
        .or_else(|| org.child("iati-identifier").and_then(Element::trimmed_text))
        .or_else(|| org.attr_value("organisation-identifier"))
}

struct Builder {
    violations: Vec<ParseViolation>,
    default_currency: Option<String>,
    default_language: Option<String>,
}

impl Builder {
    fn new(org: &Element) -> Self {
        Self {
            violations: Vec::new(),
            default_currency: org.attr_value("default-currency").map(|c| c.to_uppercase()),
            default_language: org.attr_value("xml:lang"),
        }
    }

    fn organisation(&mut self, org: &Element) -> OrganisationDocument {
        let identifier = organisation_identifier(org).unwrap_or_else(|| {
            self.violations.push(ParseViolation::missing(format!(
                "<{ORGANISATION_ELEMENT}> has no organisation-identifier"
            )));
            String::new()
        });

        let name_narratives = org
            .child("name")
            .map(|n| self.narratives(n))
            .unwrap_or_default();
        let name = org
            .child("name")
            .map(|_| name_narratives.first().map(|n| n.text.clone()).unwrap_or_default());

        let reporting_org = org
            .child("reporting-org")
            .map(|r| ReportingOrg {
                reference: r.attr_value("ref"),
                org_type: r.attr_value("type"),
                secondary_reporter: matches!(
                    r.attr("secondary-reporter").map(str::trim),
                    Some("1" | "true")
                ),
                narratives: self.narratives(r),
            })
            .unwrap_or_default();

        let total_budgets = org
            .children_named("total-budget")
            .enumerate()
            .filter_map(|(i, el)| {
                self.money_period(el, &format!("total-budget[{i}]"), "budget-line")
            })
            .collect();

        let recipient_country_budgets = org
            .children_named("recipient-country-budget")
            .enumerate()
            .filter_map(|(i, el)| {
                self.country_budget(el, &format!("recipient-country-budget[{i}]"))
            })
            .collect();

        let recipient_region_budgets = org
            .children_named("recipient-region-budget")
            .enumerate()
            .filter_map(|(i, el)| self.region_budget(el, &format!("recipient-region-budget[{i}]")))
            .collect();

        let recipient_org_budgets = org
            .children_named("recipient-org-budget")
            .enumerate()
            .filter_map(|(i, el)| {
                let path = format!("recipient-org-budget[{i}]");
                let budget = self.money_period(el, &path, "budget-line")?;
                let recipient = el.child("recipient-org");
                Some(RecipientOrgBudget {
                    recipient_org: RecipientOrg {
                        reference: recipient.and_then(|r| r.attr_value("ref")),
                        narrative: recipient.and_then(|r| self.first_narrative(r)),
                    },
                    budget,
                })
            })
            .collect();

        let total_expenditures = org
            .children_named("total-expenditure")
            .enumerate()
            .filter_map(|(i, el)| {
                self.money_period(el, &format!("total-expenditure[{i}]"), "expense-line")
            })
            .collect();

        let document_links = org
            .children_named("document-link")
            .enumerate()
            .filter_map(|(i, el)| self.document_link(el, &format!("document-link[{i}]")))
            .collect();

        OrganisationDocument {
            identifier,
            name,
            name_narratives,
            reporting_org,
            default_currency: self.default_currency.clone(),
            default_language: self.default_language.clone(),
            last_updated: org.attr_value("last-updated-datetime"),
            total_budgets,
            recipient_country_budgets,
            recipient_region_budgets,
            recipient_org_budgets,
            total_expenditures,
            document_links,
            skipped_organisations: Vec::new(),
        }
    }

    fn country_budget(&mut self, el: &Element, path: &str) -> Option<RecipientCountryBudget> {
        let budget = self.money_period(el, path, "budget-line");
        let country = match el.child("recipient-country") {
            Some(c) => self.recipient_country(c, &format!("{path}/recipient-country")),
            None => {
                self.violations
                    .push(ParseViolation::missing(format!("{path} has no recipient-country")));
                None
            }
        };
        Some(RecipientCountryBudget {
            recipient_country: country?,
            budget: budget?,
        })
    }

    fn region_budget(&mut self, el: &Element, path: &str) -> Option<RecipientRegionBudget> {
        let budget = self.money_period(el, path, "budget-line");
        let region = match el.child("recipient-region") {
            Some(r) => match r.attr_value("code") {
                Some(code) => Some(RecipientRegion {
                    code,
                    vocabulary: r.attr_value("vocabulary"),
                    narrative: self.first_narrative(r),
                }),
                None => {
                    self.violations.push(ParseViolation::missing(format!(
                        "{path}/recipient-region has no code"
                    )));
                    None
                }
            },
            None => {
                self.violations
                    .push(ParseViolation::missing(format!("{path} has no recipient-region")));
                None
            }
        };
        Some(RecipientRegionBudget {
            recipient_region: region?,
            budget: budget?,
        })
    }

    fn recipient_country(&mut self, el: &Element, path: &str) -> Option<RecipientCountry> {
        match el.attr_value("code") {
            Some(code) => Some(RecipientCountry {
                code: code.to_uppercase(),
                narrative: self.first_narrative(el),
            }),
            None => {
                self.violations
                    .push(ParseViolation::missing(format!("{path} has no code")));
                None
            }
        }
    }

    fn money_period(&mut self, el: &Element, path: &str, line_name: &str) -> Option<MoneyPeriod> {
        let period_start = self.iso_date(el.child("period-start"), &format!("{path}/period-start"));
        let period_end = self.iso_date(el.child("period-end"), &format!("{path}/period-end"));

        if let (Some(start), Some(end)) = (period_start, period_end) {
            if start > end {
                self.violations.push(ParseViolation::invalid(format!(
                    "{path}: period-start {start} is after period-end {end}"
                )));
            }
        }

        let (value, currency, value_date) = match el.child("value") {
            Some(v) => self.value(v, &format!("{path}/value"))?,
            None => {
                self.violations
                    .push(ParseViolation::missing(format!("{path} has no value")));
                return None;
            }
        };

        let lines = el
            .children_named(line_name)
            .enumerate()
            .filter_map(|(i, line)| {
                let line_path = format!("{path}/{line_name}[{i}]");
                let (value, currency, _) = self.value(line.child("value")?, &line_path)?;
                Some(BudgetLine {
                    reference: line.attr_value("ref"),
                    value,
                    currency,
                    narratives: self.narratives(line),
                })
            })
            .collect();

        Some(MoneyPeriod {
            value,
            currency,
            period_start,
            period_end,
            value_date,
            status: el.attr_value("status"),
            lines,
        })
    }

    fn value(&mut self, el: &Element, path: &str) -> Option<(f64, String, Option<NaiveDate>)> {
        let raw = el.trimmed_text();
        let amount = match raw.as_deref().map(str::parse::<f64>) {
            Some(Ok(v)) if v.is_finite() && v >= 0.0 => Some(v),
            Some(Ok(v)) => {
                self.violations.push(ParseViolation::invalid(format!(
                    "{path}: amount {v} must be a non-negative number"
                )));
                None
            }
            Some(Err(_)) => {
                self.violations.push(ParseViolation::invalid(format!(
                    "{path}: cannot read amount {:?}",
                    raw.as_deref().unwrap_or_default()
                )));
                None
            }
            None => {
                self.violations
                    .push(ParseViolation::missing(format!("{path} is empty")));
                None
            }
        };

        let currency = el
            .attr_value("currency")
            .or_else(|| self.default_currency.clone())
            .map(|c| c.to_uppercase());
        if currency.is_none() {
            self.violations.push(ParseViolation::missing(format!(
                "{path} has no currency and the organisation has no default-currency"
            )));
        }

        let value_date = match el.attr_value("value-date") {
            Some(d) => self.date_value(&d, &format!("{path}/@value-date")),
            None => None,
        };

        Some((amount?, currency?, value_date))
    }

    fn iso_date(&mut self, el: Option<&Element>, path: &str) -> Option<NaiveDate> {
        let raw = el?.attr_value("iso-date").or_else(|| el?.trimmed_text())?;
        self.date_value(&raw, path)
    }

    fn date_value(&mut self, raw: &str, path: &str) -> Option<NaiveDate> {
        match parse_iso_date(raw) {
            Some(d) => Some(d),
            None => {
                self.violations.push(ParseViolation::invalid(format!(
                    "{path}: {raw:?} is not an ISO date (YYYY-MM-DD)"
                )));
                None
            }
        }
    }

    fn document_link(&mut self, el: &Element, path: &str) -> Option<DocumentLink> {
        let url = el.attr_value("url");
        if url.is_none() {
            self.violations
                .push(ParseViolation::missing(format!("{path} has no url")));
        }

        let titles = el
            .child("title")
            .map(|t| self.narratives(t))
            .unwrap_or_default();
        if titles.is_empty() {
            self.violations
                .push(ParseViolation::missing(format!("{path} has no title narrative")));
        }

        let descriptions = el
            .children_named("description")
            .flat_map(|d| self.narratives(d))
            .collect();

        let document_date = match el.child("document-date") {
            Some(d) => self.iso_date(Some(d), &format!("{path}/document-date")),
            None => None,
        };

        let recipient_countries = el
            .children_named("recipient-country")
            .enumerate()
            .filter_map(|(i, c)| {
                self.recipient_country(c, &format!("{path}/recipient-country[{i}]"))
            })
            .collect();

        let url = url?;
        if titles.is_empty() {
            return None;
        }

        Some(DocumentLink {
            url,
            format: el.attr_value("format"),
            document_date,
            titles,
            descriptions,
            categories: codes(el, "category"),
            languages: codes(el, "language"),
            recipient_countries,
        })
    }

    /// Narrative children in source order. Falls back to the element's own
    /// text for pre-2.01 documents without narrative wrappers.
    fn narratives(&self, el: &Element) -> Vec<Narrative> {
        let mut out: Vec<Narrative> = el
            .children_named("narrative")
            .filter_map(|n| {
                Some(Narrative {
                    text: n.trimmed_text()?,
                    language: n
                        .attr_value("xml:lang")
                        .or_else(|| self.default_language.clone()),
                })
            })
            .collect();
        if out.is_empty() {
            if let Some(text) = el.trimmed_text() {
                out.push(Narrative {
                    text,
                    language: el.attr_value("xml:lang").or_else(|| self.default_language.clone()),
                });
            }
        }
        out
    }

    fn first_narrative(&self, el: &Element) -> Option<String> {
        self.narratives(el).into_iter().next().map(|n| n.text)
    }
}

fn codes(el: &Element, name: &str) -> Vec<String> {
    el.children_named(name)
        .filter_map(|c| c.attr_value("code"))
        .collect()
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part (`T...` or a
/// space and a time).
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    let (day, rest) = (raw.get(..10)?, raw.get(10..)?);
    if !rest.starts_with(['T', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
