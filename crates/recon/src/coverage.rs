use aidrecon_iati::OrganisationDocument;

use crate::model::{CountryBudgetCoverage, CoverageSummary, TotalBudgetCoverage};

/// True when `code` equals the operator's home country code. Callers pass the
/// code already normalised (the parser upper-cases recipient codes). A blank
/// home country matches nothing.
pub(crate) fn is_home_country(code: &str, home_country: &str) -> bool {
    !home_country.is_empty() && code == home_country
}

/// Compute the read-only coverage summary for a parsed document.
pub fn analyze(parsed: &OrganisationDocument, home_country: &str) -> CoverageSummary {
    let mut total_budgets = TotalBudgetCoverage::default();
    for budget in &parsed.total_budgets {
        total_budgets.count += 1;
        // Naive sum across currencies; `currencies` tells the caller whether it is meaningful.
        total_budgets.total_value += budget.value;
        if !total_budgets.currencies.contains(&budget.currency) {
            total_budgets.currencies.push(budget.currency.clone());
        }
    }

    let mut country_budgets = CountryBudgetCoverage::default();
    for budget in &parsed.recipient_country_budgets {
        let code = &budget.recipient_country.code;
        if is_home_country(code, home_country) {
            country_budgets.has_home_country_budget = true;
            if country_budgets.home_country_budget.is_none() {
                country_budgets.home_country_budget = Some(budget.clone());
            }
        } else if !country_budgets.other_countries.contains(code) {
            country_budgets.other_countries.push(code.clone());
        }
    }

    CoverageSummary {
        total_budgets,
        country_budgets,
        region_budget_count: parsed.recipient_region_budgets.len(),
        org_budget_count: parsed.recipient_org_budgets.len(),
        expenditure_count: parsed.total_expenditures.len(),
        document_count: parsed.document_links.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidrecon_iati::{MoneyPeriod, RecipientCountry, RecipientCountryBudget};

    fn money(value: f64, currency: &str) -> MoneyPeriod {
        MoneyPeriod {
            value,
            currency: currency.into(),
            period_start: None,
            period_end: None,
            value_date: None,
            status: None,
            lines: Vec::new(),
        }
    }

    fn country(code: &str, value: f64) -> RecipientCountryBudget {
        RecipientCountryBudget {
            recipient_country: RecipientCountry {
                code: code.into(),
                narrative: None,
            },
            budget: money(value, "USD"),
        }
    }

    #[test]
    fn no_home_country_budget() {
        let doc = OrganisationDocument {
            recipient_country_budgets: vec![country("US", 1.0), country("GB", 2.0)],
            ..Default::default()
        };
        let summary = analyze(&doc, "MM");
        assert!(!summary.country_budgets.has_home_country_budget);
        assert_eq!(summary.country_budgets.home_country_budget, None);
        assert_eq!(summary.country_budgets.other_countries, vec!["US", "GB"]);
    }

    #[test]
    fn first_home_country_budget_wins() {
        let doc = OrganisationDocument {
            recipient_country_budgets: vec![
                country("US", 1.0),
                country("MM", 2.0),
                country("MM", 3.0),
                country("US", 4.0),
            ],
            ..Default::default()
        };
        let summary = analyze(&doc, "MM");
        assert!(summary.country_budgets.has_home_country_budget);
        assert_eq!(summary.country_budgets.home_country_budget, Some(country("MM", 2.0)));
        assert_eq!(summary.country_budgets.other_countries, vec!["US"]);
    }

    #[test]
    fn blank_home_country_matches_nothing() {
        let doc = OrganisationDocument {
            recipient_country_budgets: vec![country("", 1.0)],
            ..Default::default()
        };
        assert!(!analyze(&doc, "").country_budgets.has_home_country_budget);
    }

    #[test]
    fn home_country_match_is_exact() {
        let doc = OrganisationDocument {
            recipient_country_budgets: vec![country("MM", 1.0)],
            ..Default::default()
        };
        assert!(!analyze(&doc, "mm").country_budgets.has_home_country_budget);
        assert!(!analyze(&doc, " MM").country_budgets.has_home_country_budget);
        assert!(analyze(&doc, "MM").country_budgets.has_home_country_budget);
    }

    #[test]
    fn totals_sum_across_currencies() {
        let doc = OrganisationDocument {
            total_budgets: vec![money(1000.0, "USD"), money(500.0, "EUR"), money(250.0, "USD")],
            total_expenditures: vec![money(1.0, "USD")],
            ..Default::default()
        };
        let summary = analyze(&doc, "");
        assert_eq!(summary.total_budgets.count, 3);
        assert_eq!(summary.total_budgets.total_value, 1750.0);
        assert_eq!(summary.total_budgets.currencies, vec!["USD", "EUR"]);
        assert_eq!(summary.expenditure_count, 1);
        assert_eq!(summary.document_count, 0);
    }
}
