//! Option lists for the controls panel that drives the measurements view

use crate::types::Collection;
use serde::Serialize;

/// One entry of a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Collections by key, labelled with their title when they have one
pub fn collection_options(collections: &[Collection]) -> Vec<SelectOption> {
    collections
        .iter()
        .map(|collection| SelectOption {
            value: collection.key.clone(),
            label: collection
                .title
                .clone()
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| collection.key.clone()),
        })
        .collect()
}

/// Grouping fields in grouping order, labelled with the field title
pub fn grouping_options(collection: &Collection) -> Vec<SelectOption> {
    collection
        .groupings
        .iter()
        .map(|grouping| SelectOption {
            value: grouping.key.clone(),
            label: collection.field_title(&grouping.key).to_string(),
        })
        .collect()
}

/// The threshold toggle only applies to collections with a threshold
pub fn threshold_toggle_available(collection: &Collection) -> bool {
    collection.threshold.is_some_and(f64::is_finite)
}
