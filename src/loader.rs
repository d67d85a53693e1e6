//! Loading measurement collections from JSON or CSV
//!
//! Both formats end up as [`Collection`]s whose measurements have dense ids,
//! stable jitter and completed group orders.

use crate::error::{PanelError, Result};
use crate::jitter::assign_jitter;
use crate::scene::layout::Layout;
use crate::types::{Collection, DisplayDefaults, Grouping, Measurement, STRAIN_FIELD, optional_threshold};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Column / key holding the measured value
pub const VALUE_FIELD: &str = "value";

/// Every collection of a measurements file
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementsFile {
    pub collections: Vec<Collection>,
    pub default_collection: Option<String>,
}

impl MeasurementsFile {
    pub fn collection(&self, key: &str) -> Result<&Collection> {
        self.collections
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| PanelError::UnknownCollection { key: key.to_string() })
    }

    /// The declared default collection, else the first one
    pub fn default_collection(&self) -> Option<&Collection> {
        self.default_collection
            .as_deref()
            .and_then(|key| self.collections.iter().find(|c| c.key == key))
            .or_else(|| self.collections.first())
    }

    /// Remove and return one collection
    pub fn take(mut self, key: Option<&str>) -> Result<Collection> {
        let index = match key {
            Some(key) => self.collections.iter().position(|c| c.key == key),
            None => {
                let default = self.default_collection.clone();
                default
                    .and_then(|key| self.collections.iter().position(|c| c.key == key))
                    .or_else(|| (!self.collections.is_empty()).then_some(0))
            }
        };
        match index {
            Some(index) => Ok(self.collections.swap_remove(index)),
            None => Err(PanelError::UnknownCollection {
                key: key.unwrap_or("<default>").to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FieldJson {
    key: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionJson {
    key: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    x_axis_label: String,
    #[serde(default, deserialize_with = "optional_threshold")]
    threshold: Option<f64>,
    #[serde(default)]
    fields: Vec<FieldJson>,
    #[serde(default)]
    groupings: Vec<Grouping>,
    #[serde(default)]
    display_defaults: DisplayDefaults,
    #[serde(default)]
    measurements: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct FileJson {
    collections: Vec<CollectionJson>,
    #[serde(default)]
    default_collection: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentJson {
    Wrapped { measurements: FileJson },
    Bare(FileJson),
}

/// Parse a JSON measurements document
pub fn parse_json(text: &str, layout: &Layout) -> Result<MeasurementsFile> {
    let file = match serde_json::from_str::<DocumentJson>(text)? {
        DocumentJson::Wrapped { measurements } => measurements,
        DocumentJson::Bare(file) => file,
    };
    let collections = file
        .collections
        .into_iter()
        .map(|raw| convert_collection(raw, layout))
        .collect::<Result<Vec<_>>>()?;
    info!(
        collections = collections.len(),
        measurements = collections.iter().map(|c| c.measurements.len()).sum::<usize>(),
        "Parsed measurements JSON"
    );
    Ok(MeasurementsFile {
        collections,
        default_collection: file.default_collection,
    })
}

pub fn load_json<P: AsRef<Path>>(path: P, layout: &Layout) -> Result<MeasurementsFile> {
    let text = std::fs::read_to_string(path.as_ref())?;
    debug!(path = %path.as_ref().display(), bytes = text.len(), "Read measurements file");
    parse_json(&text, layout)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn convert_collection(raw: CollectionJson, layout: &Layout) -> Result<Collection> {
    let mut measurements = Vec::with_capacity(raw.measurements.len());
    for (index, object) in raw.measurements.into_iter().enumerate() {
        let context = || format!("collection '{}' measurement {}", raw.key, index);
        let strain = object
            .get(STRAIN_FIELD)
            .and_then(scalar_text)
            .ok_or_else(|| PanelError::invalid(format!("{}: missing strain", context())))?;
        let value = match object.get(VALUE_FIELD) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
        .ok_or_else(|| PanelError::invalid(format!("{}: value is not a finite number", context())))?;

        let mut measurement = Measurement::new(index, strain, value, 0.0);
        for (key, field) in object {
            if key == STRAIN_FIELD || key == VALUE_FIELD {
                continue;
            }
            match scalar_text(&field) {
                Some(text) => {
                    measurement.fields.insert(key, text);
                }
                None if field.is_null() => {}
                None => warn!(field = %key, "{}: dropping non-scalar field", context()),
            }
        }
        measurements.push(measurement);
    }

    let mut collection = Collection::new(raw.key, measurements);
    collection.title = raw.title;
    collection.x_axis_label = raw.x_axis_label;
    collection.threshold = raw.threshold;
    collection.fields = raw
        .fields
        .into_iter()
        .map(|f| {
            let title = f.title.unwrap_or_else(|| f.key.clone());
            (f.key, title)
        })
        .collect();
    collection.groupings = raw.groupings;
    collection.display_defaults = raw.display_defaults;
    finish(&mut collection, layout);
    Ok(collection)
}

/// Read a CSV collection: `strain` and `value` columns are required, every
/// other column becomes a grouping field. Without other columns the
/// measurements are grouped by strain.
pub fn read_csv<R: Read>(reader: R, key: &str, layout: &Layout) -> Result<Collection> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let strain_column = column(STRAIN_FIELD)
        .ok_or_else(|| PanelError::invalid(format!("CSV is missing the '{}' column", STRAIN_FIELD)))?;
    let value_column = column(VALUE_FIELD)
        .ok_or_else(|| PanelError::invalid(format!("CSV is missing the '{}' column", VALUE_FIELD)))?;
    let field_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != strain_column && *i != value_column)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut measurements = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = record.position().map(|p| p.line()).unwrap_or(index as u64 + 2);
        let raw_value = record.get(value_column).unwrap_or_default();
        let value = raw_value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| PanelError::invalid(format!("row {}: value '{}' is not a number", row, raw_value)))?;
        let strain = record.get(strain_column).unwrap_or_default();
        let mut measurement = Measurement::new(index, strain, value, 0.0);
        for (i, name) in &field_columns {
            if let Some(text) = record.get(*i).filter(|t| !t.is_empty()) {
                measurement.fields.insert(name.clone(), text.to_string());
            }
        }
        measurements.push(measurement);
    }

    let mut collection = Collection::new(key, measurements);
    collection.x_axis_label = VALUE_FIELD.to_string();
    collection.fields = field_columns
        .iter()
        .map(|(_, name)| (name.clone(), name.clone()))
        .collect::<BTreeMap<_, _>>();
    collection.groupings = field_columns
        .into_iter()
        .map(|(_, name)| Grouping {
            key: name,
            order: Vec::new(),
        })
        .collect();
    finish(&mut collection, layout);
    info!(
        collection = %collection.key,
        measurements = collection.measurements.len(),
        groupings = collection.groupings.len(),
        "Parsed measurements CSV"
    );
    Ok(collection)
}

pub fn load_csv<P: AsRef<Path>>(path: P, layout: &Layout) -> Result<Collection> {
    let path = path.as_ref();
    let key = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("measurements");
    let file = std::fs::File::open(path)?;
    read_csv(std::io::BufReader::new(file), key, layout)
}

/// Load a measurements file, choosing the format from the extension
pub fn load_collections<P: AsRef<Path>>(path: P, layout: &Layout) -> Result<MeasurementsFile> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("csv") => {
            let collection = load_csv(path, layout)?;
            Ok(MeasurementsFile {
                default_collection: Some(collection.key.clone()),
                collections: vec![collection],
            })
        }
        Some("json") => load_json(path, layout),
        other => Err(PanelError::invalid(format!(
            "unsupported measurements file extension: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

fn finish(collection: &mut Collection, layout: &Layout) {
    assign_jitter(&mut collection.measurements, layout);
    if collection.groupings.is_empty() {
        debug!(collection = %collection.key, "No grouping fields, grouping by strain");
        collection.groupings.push(Grouping {
            key: STRAIN_FIELD.to_string(),
            order: Vec::new(),
        });
    }
    collection.complete_group_orders();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisplayMode;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "measurements": {
            "default_collection": "hi",
            "collections": [
                {
                    "key": "hi",
                    "title": "HI titers",
                    "x_axis_label": "normalized titer",
                    "threshold": 2.0,
                    "fields": [{"key": "serum", "title": "Serum"}, {"key": "passage"}],
                    "groupings": [{"key": "serum", "order": ["B", "A"]}, {"key": "passage"}],
                    "display_defaults": {"group_by": "passage", "measurements_display": "raw", "show_threshold": false},
                    "measurements": [
                        {"strain": "s1", "value": 1.5, "serum": "A", "passage": "egg"},
                        {"strain": "s2", "value": "3.25", "serum": "C", "passage": 3},
                        {"strain": "s3", "value": 4, "serum": "A", "meta": {"x": 1}}
                    ]
                },
                {"key": "neut", "threshold": "none", "measurements": []}
            ]
        }
    }"#;

    #[test]
    fn test_parse_wrapped_document() {
        let file = parse_json(DOCUMENT, &Layout::default()).unwrap();
        assert_eq!(file.collections.len(), 2);
        let hi = file.collection("hi").unwrap();
        assert_eq!(hi.title.as_deref(), Some("HI titers"));
        assert_eq!(hi.threshold, Some(2.0));
        assert_eq!(hi.field_title("serum"), "Serum");
        assert_eq!(hi.field_title("passage"), "passage");
        assert_eq!(hi.group_order("serum"), ["B", "A", "C"]);
        assert_eq!(hi.group_order("passage"), ["egg", "3", "undefined"]);
        assert_eq!(hi.display_defaults.display, DisplayMode::Raw);
        assert!(!hi.display_defaults.show_threshold);
        assert!(hi.display_defaults.show_overall_mean);
        assert_eq!(hi.default_group_by(), Some("passage"));

        let values: Vec<f64> = hi.measurements.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![1.5, 3.25, 4.0]);
        assert!(hi.measurements[2].field("meta").is_none());
        let ids: Vec<usize> = hi.measurements.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(hi.measurements.iter().all(|m| (0.0..=100.0).contains(&m.jitter)));

        let neut = file.collection("neut").unwrap();
        assert_eq!(neut.threshold, None);
        assert_eq!(file.default_collection().unwrap().key, "hi");
    }

    #[test]
    fn test_parse_bare_document() {
        let text = r#"{"collections": [{"key": "a", "measurements": [{"strain": "s", "value": 1}]}]}"#;
        let file = parse_json(text, &Layout::default()).unwrap();
        assert_eq!(file.default_collection().unwrap().key, "a");
        assert!(matches!(
            file.collection("b"),
            Err(PanelError::UnknownCollection { .. })
        ));
    }

    #[test]
    fn test_measurement_without_value_is_rejected() {
        let text = r#"{"collections": [{"key": "a", "measurements": [{"strain": "s", "value": "high"}]}]}"#;
        let err = parse_json(text, &Layout::default()).unwrap_err();
        assert!(err.to_string().contains("measurement 0"));
    }

    #[test]
    fn test_read_csv() {
        let data = "strain,value,serum,host\ns1,1.5,A,ferret\ns2,2.5,B,\ns3,4,A,human\n";
        let collection = read_csv(data.as_bytes(), "titers", &Layout::default()).unwrap();
        assert_eq!(collection.measurements.len(), 3);
        assert_eq!(collection.groupings.len(), 2);
        assert_eq!(collection.group_order("serum"), ["A", "B"]);
        assert_eq!(collection.group_order("host"), ["ferret", "undefined", "human"]);
        assert_eq!(collection.measurements[1].field("host"), None);
    }

    #[test]
    fn test_csv_without_fields_groups_by_strain() {
        let data = "strain,value\ns1,1.5\ns2,2.5\ns1,4\n";
        let collection = read_csv(data.as_bytes(), "titers", &Layout::default()).unwrap();
        assert_eq!(collection.default_group_by(), Some(STRAIN_FIELD));
        assert_eq!(collection.group_order(STRAIN_FIELD), ["s1", "s2"]);

        let panel = crate::panel::MeasurementsPanel::new(collection, 800.0, Layout::default()).unwrap();
        assert_eq!(panel.scene().subplots().len(), 2);
        assert_eq!(panel.summary().subplots[0].count, 2);
    }

    #[test]
    fn test_csv_bad_value_reports_row() {
        let data = "strain,value\ns1,1.5\ns2,abc\n";
        let err = read_csv(data.as_bytes(), "titers", &Layout::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid data format: row 3: value 'abc' is not a number");
    }

    #[test]
    fn test_csv_requires_value_column() {
        let data = "strain,titer\ns1,1.5\n";
        assert!(read_csv(data.as_bytes(), "titers", &Layout::default()).is_err());
    }

    #[test]
    fn test_load_collections_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("titers.csv");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(file, "strain,value,serum").unwrap();
        writeln!(file, "s1,2,A").unwrap();
        drop(file);
        let loaded = load_collections(&csv_path, &Layout::default()).unwrap();
        assert_eq!(loaded.default_collection().unwrap().key, "titers");

        let json_path = dir.path().join("measurements.json");
        std::fs::write(&json_path, DOCUMENT).unwrap();
        let loaded = load_collections(&json_path, &Layout::default()).unwrap();
        assert_eq!(loaded.collections.len(), 2);
        let taken = loaded.take(Some("neut")).unwrap();
        assert_eq!(taken.key, "neut");

        let other = dir.path().join("measurements.tsv");
        std::fs::write(&other, "").unwrap();
        assert!(load_collections(&other, &Layout::default()).is_err());
    }
}
