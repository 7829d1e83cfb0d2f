//! Operator selection over the preview rows.
//!
//! Rows are addressed by `(iati_path, item_index)`. Labels are not unique
//! (two documents can share a title) and are never used for lookup.

use crate::model::{FieldCategory, ImportField};

/// Set `selected` on the one row matching `(iati_path, item_index)`.
/// Returns false when no row matches.
pub fn toggle(
    fields: &mut [ImportField],
    iati_path: &str,
    item_index: Option<usize>,
    checked: bool,
) -> bool {
    match fields.iter_mut().find(|f| f.matches(iati_path, item_index)) {
        Some(field) => {
            field.selected = checked;
            true
        }
        None => false,
    }
}

pub fn select_all(fields: &mut [ImportField]) {
    fields.iter_mut().for_each(|f| f.selected = true);
}

pub fn select_none(fields: &mut [ImportField]) {
    fields.iter_mut().for_each(|f| f.selected = false);
}

pub fn select_category(fields: &mut [ImportField], category: FieldCategory, checked: bool) {
    fields
        .iter_mut()
        .filter(|f| f.category == category)
        .for_each(|f| f.selected = checked);
}

pub fn selected_count(fields: &[ImportField]) -> usize {
    fields.iter().filter(|f| f.selected).count()
}
