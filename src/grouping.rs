//! Partition measurements into ordered subplot groups

use crate::types::Measurement;
use serde::Serialize;
use std::collections::HashMap;

/// All measurements sharing one grouping value, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: String,
    pub measurements: Vec<Measurement>,
}

impl Group {
    pub fn values(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.value).collect()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

/// Partition `measurements` by the value of `group_by` and order the
/// groups by the position of their key in `group_order`.
///
/// Keys missing from `group_order` sort after every listed key, in the
/// order they were first encountered. Measurements keep their input order
/// within a group.
pub fn group_measurements(
    measurements: &[Measurement],
    group_by: &str,
    group_order: &[String],
) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for measurement in measurements {
        let key = measurement.grouping_value(group_by);
        let slot = *index_of.entry(key).or_insert_with(|| {
            groups.push(Group {
                key: key.to_string(),
                measurements: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].measurements.push(measurement.clone());
    }

    let rank: HashMap<&str, usize> = group_order
        .iter()
        .enumerate()
        .rev()
        .map(|(i, key)| (key.as_str(), i))
        .collect();
    // stable sort keeps encounter order among unlisted keys
    groups.sort_by_key(|group| rank.get(group.key.as_str()).copied().unwrap_or(usize::MAX));
    groups
}
