//! Core data types for grouped strain measurements

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Grouping value used when a measurement lacks the active grouping field
pub const MISSING_FIELD_VALUE: &str = "undefined";

/// Field key that resolves to the measurement's strain
pub const STRAIN_FIELD: &str = "strain";

/// Stable identifier of a measurement, assigned once at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeasurementId(pub usize);

impl MeasurementId {
    /// Identifier of the point mark drawn for this measurement
    pub fn mark_id(&self) -> String {
        format!("measurement_{}", self.0)
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed data point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub id: MeasurementId,
    /// Owning strain, used for color lookup
    pub strain: String,
    pub value: f64,
    /// Vertical position within a subplot, in subplot-scale units
    pub jitter: f64,
    /// Additional categorical attributes (grouping keys)
    pub fields: BTreeMap<String, String>,
}

impl Measurement {
    pub fn new(id: usize, strain: impl Into<String>, value: f64, jitter: f64) -> Self {
        Self {
            id: MeasurementId(id),
            strain: strain.into(),
            value,
            jitter,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a field value; `"strain"` resolves to the strain itself
    pub fn field(&self, key: &str) -> Option<&str> {
        if key == STRAIN_FIELD {
            return Some(&self.strain);
        }
        self.fields.get(key).map(String::as_str)
    }

    /// Value of the grouping field, or [`MISSING_FIELD_VALUE`]
    pub fn grouping_value(&self, key: &str) -> &str {
        self.field(key).unwrap_or(MISSING_FIELD_VALUE)
    }
}

/// Which data layer is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Raw jittered points
    Raw,
    /// Per color-by attribute mean ± standard deviation
    #[default]
    Mean,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Raw => write!(f, "raw"),
            DisplayMode::Mean => write!(f, "mean"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(DisplayMode::Raw),
            "mean" => Ok(DisplayMode::Mean),
            other => Err(format!("unknown display mode '{}', expected raw or mean", other)),
        }
    }
}

/// Color-by assignment for one strain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAssignment {
    /// Categorical value driving the current color-by scheme
    #[serde(deserialize_with = "string_or_number")]
    pub attribute: String,
    /// CSS hex color
    pub color: String,
}

impl ColorAssignment {
    pub fn new(attribute: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            color: color.into(),
        }
    }
}

/// Strain → color assignment snapshot
pub type StrainColorMap = HashMap<String, ColorAssignment>;

/// Accepts `"a"`, `3` or `true` and keeps the textual form
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(MISSING_FIELD_VALUE.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

/// Keeps only finite numeric thresholds
pub(crate) fn optional_threshold<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|t| t.is_finite()))
}

/// Canonical value order of one grouping field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    pub key: String,
    #[serde(default)]
    pub order: Vec<String>,
}

/// Initial panel state suggested by the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayDefaults {
    pub group_by: Option<String>,
    #[serde(alias = "measurements_display")]
    pub display: DisplayMode,
    pub show_overall_mean: bool,
    pub show_threshold: bool,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            group_by: None,
            display: DisplayMode::Mean,
            show_overall_mean: true,
            show_threshold: true,
        }
    }
}

/// A named set of measurements with its display metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub key: String,
    pub title: Option<String>,
    pub x_axis_label: String,
    pub threshold: Option<f64>,
    /// Field key → display title
    pub fields: BTreeMap<String, String>,
    pub groupings: Vec<Grouping>,
    pub display_defaults: DisplayDefaults,
    pub measurements: Vec<Measurement>,
}

impl Collection {
    pub fn new(key: impl Into<String>, measurements: Vec<Measurement>) -> Self {
        Self {
            key: key.into(),
            title: None,
            x_axis_label: String::new(),
            threshold: None,
            fields: BTreeMap::new(),
            groupings: Vec::new(),
            display_defaults: DisplayDefaults::default(),
            measurements,
        }
    }

    /// Display title of a field, falling back to the key
    pub fn field_title<'a>(&'a self, key: &'a str) -> &'a str {
        self.fields.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn grouping(&self, key: &str) -> Option<&Grouping> {
        self.groupings.iter().find(|g| g.key == key)
    }

    /// Canonical order of the grouping values for `key`
    pub fn group_order(&self, key: &str) -> &[String] {
        self.grouping(key).map(|g| g.order.as_slice()).unwrap_or(&[])
    }

    /// Grouping used when none is requested
    pub fn default_group_by(&self) -> Option<&str> {
        self.display_defaults
            .group_by
            .as_deref()
            .filter(|key| self.grouping(key).is_some())
            .or_else(|| self.groupings.first().map(|g| g.key.as_str()))
    }

    /// Complete each grouping's order with values seen in the data
    pub fn complete_group_orders(&mut self) {
        for grouping in &mut self.groupings {
            for measurement in &self.measurements {
                let value = measurement.grouping_value(&grouping.key);
                if !grouping.order.iter().any(|v| v == value) {
                    grouping.order.push(value.to_string());
                }
            }
        }
    }
}
