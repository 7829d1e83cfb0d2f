use std::collections::BTreeMap;

use aidrecon_iati::OrganisationDocument;
use log::{info, warn};

use crate::error::ReconError;
use crate::model::{CommitRequest, CommitResult, ImportField, SelectedItem};
use crate::session::ReconciliationSession;
use crate::store::OrganisationStore;

/// Assemble the single commit payload from the selected rows.
///
/// Every selected row contributes `iati_path → true` to the selection map;
/// selected array rows also contribute their item payload. Unselected rows
/// contribute nothing.
pub fn build_request(document: &OrganisationDocument, fields: &[ImportField]) -> CommitRequest {
    let mut field_selection_map = BTreeMap::new();
    let mut selected_items = Vec::new();

    for field in fields.iter().filter(|f| f.selected) {
        field_selection_map.insert(field.iati_path.clone(), true);
        if let (Some(item_index), Some(item_data)) = (field.item_index, &field.item_data) {
            selected_items.push(SelectedItem {
                iati_path: field.iati_path.clone(),
                category: field.category,
                item_index,
                item_data: item_data.clone(),
            });
        }
    }

    CommitRequest {
        field_selection_map,
        raw_parsed_document: document.clone(),
        selected_items,
    }
}

/// Submit the session's selection to `store` as one request.
///
/// Fails with `NoFieldsSelected` before any call when nothing is selected,
/// and with `InvalidState` when the session is not in preview. A store
/// rejection moves the session to `Error` with the document and selection
/// kept for a retry.
pub fn commit(
    session: &mut ReconciliationSession,
    organisation_id: &str,
    store: &dyn OrganisationStore,
) -> Result<CommitResult, ReconError> {
    let request = session.begin_commit()?;
    info!(
        "committing {} field(s), {} item(s) to organisation {}",
        request.field_selection_map.len(),
        request.selected_items.len(),
        organisation_id
    );

    match store.commit(organisation_id, &request) {
        Ok(result) => {
            session.complete_commit(result.clone())?;
            Ok(result)
        }
        Err(err) => {
            warn!("commit to organisation {organisation_id} failed: {err}");
            let err = match err {
                ReconError::Commit(_) => err,
                other => ReconError::Commit(other.to_string()),
            };
            Err(session.fail(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{build_fields, PATH_NAME, PATH_TOTAL_BUDGET};
    use crate::model::{ArrayItem, LocalOrganisation};
    use crate::selection;
    use aidrecon_iati::MoneyPeriod;

    fn document() -> OrganisationDocument {
        let budget = |value: f64| MoneyPeriod {
            value,
            currency: "USD".into(),
            period_start: None,
            period_end: None,
            value_date: None,
            status: None,
            lines: Vec::new(),
        };
        OrganisationDocument {
            identifier: "DK-CVR-20228799".into(),
            name: Some("New Name".into()),
            total_budgets: vec![budget(1.0), budget(2.0)],
            ..Default::default()
        }
    }

    #[test]
    fn only_selected_rows_are_sent() {
        let doc = document();
        let mut fields = build_fields(&LocalOrganisation::default(), &doc, "");
        selection::toggle(&mut fields, PATH_NAME, None, true);
        selection::toggle(&mut fields, PATH_TOTAL_BUDGET, Some(1), true);

        let request = build_request(&doc, &fields);
        let keys: Vec<&str> = request.field_selection_map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![PATH_NAME, PATH_TOTAL_BUDGET]);
        assert!(request.field_selection_map.values().all(|v| *v));
        assert_eq!(request.selected_items.len(), 1);
        assert_eq!(request.selected_items[0].item_index, 1);
        assert_eq!(
            request.selected_items[0].item_data,
            ArrayItem::TotalBudget(doc.total_budgets[1].clone())
        );
        assert_eq!(request.raw_parsed_document, doc);
    }

    #[test]
    fn request_serializes_with_wire_names() {
        let doc = document();
        let mut fields = build_fields(&LocalOrganisation::default(), &doc, "");
        selection::select_all(&mut fields);
        let json = serde_json::to_value(build_request(&doc, &fields)).unwrap();
        assert!(json.get("fieldSelectionMap").is_some());
        assert!(json.get("rawParsedDocument").is_some());
        let items = json["selectedItems"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["itemIndex"], 0);
        assert_eq!(items[0]["category"], "total-budgets");
        assert_eq!(items[0]["itemData"]["kind"], "total-budget");
    }
}
