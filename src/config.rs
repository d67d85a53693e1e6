//! Layered panel settings
//!
//! Built-in defaults, then an optional TOML/JSON/YAML file, then
//! `MEASUREMENTS_*` environment variables (`__` separates nested keys, e.g.
//! `MEASUREMENTS_LAYOUT__LEFT_PADDING=200`).

use crate::error::Result;
use crate::panel::MeasurementsPanel;
use crate::scene::layout::Layout;
use crate::types::DisplayMode;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "MEASUREMENTS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Width of the container the scene is drawn into
    pub panel_width: f64,
    pub layout: Layout,
    /// Overrides of the collection's display defaults
    pub display: Option<DisplayMode>,
    pub show_overall_mean: Option<bool>,
    pub show_threshold: Option<bool>,
    /// `tracing-subscriber` env-filter directive
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            panel_width: 800.0,
            layout: Layout::default(),
            display: None,
            show_overall_mean: None,
            show_threshold: None,
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl PanelSettings {
    /// Load defaults, the optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, environment())
    }

    fn build(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&PanelSettings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings: PanelSettings = builder.add_source(env).build()?.try_deserialize()?;
        debug!(?settings, "Loaded panel settings");
        Ok(settings)
    }

    /// Apply the display overrides to a panel
    pub fn apply(&self, panel: &mut MeasurementsPanel) {
        if let Some(display) = self.display {
            panel.set_display(display);
        }
        if let Some(show) = self.show_overall_mean {
            panel.set_show_overall_mean(show);
        }
        if let Some(show) = self.show_threshold {
            panel.set_show_threshold(show);
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
