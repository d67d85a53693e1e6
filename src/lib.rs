//! # Measurements Panel
//!
//! Incremental multi-subplot scatter scene for grouped strain measurements.
//!
//! ## Quick Start
//!
//! ```rust
//! use measurements_panel::{
//!     ColorAssignment, Collection, DisplayMode, Grouping, Layout, Measurement,
//!     MeasurementsPanel, StrainColorMap,
//! };
//!
//! let measurements = vec![
//!     Measurement::new(0, "A/1", 10.0, 40.0).with_field("serum", "ferret-1"),
//!     Measurement::new(1, "A/2", 20.0, 60.0).with_field("serum", "ferret-1"),
//!     Measurement::new(2, "A/3", 35.0, 20.0).with_field("serum", "ferret-2"),
//! ];
//! let mut collection = Collection::new("hi", measurements);
//! collection.groupings.push(Grouping { key: "serum".into(), order: vec![] });
//! collection.complete_group_orders();
//!
//! let mut panel = MeasurementsPanel::new(collection, 800.0, Layout::default()).unwrap();
//!
//! let colors: StrainColorMap = [("A/1", "3C"), ("A/2", "3C"), ("A/3", "2a")]
//!     .into_iter()
//!     .map(|(strain, clade)| (strain.to_string(), ColorAssignment::new(clade, "#4e79a7")))
//!     .collect();
//! panel.set_colors(colors, vec!["3C".into(), "2a".into()]);
//! panel.set_display(DisplayMode::Raw);
//!
//! assert_eq!(panel.scene().subplots().len(), 2);
//! ```
//!
//! ## Model
//!
//! 1. **Grouping**: measurements are partitioned by a field and stacked in
//!    the canonical order of that field's values
//! 2. **Scales**: one value scale over every measurement and one
//!    within-subplot scale, shared by all subplots
//! 3. **Render once**: [`scene::render`] builds the scene and its handle
//!    tables; recolor, display and toggle changes mutate it in place

pub mod config;
pub mod controls;
pub mod error;
pub mod grouping;
pub mod jitter;
pub mod loader;
pub mod panel;
pub mod scales;
pub mod scene;
pub mod statistics;
pub mod types;

// Re-export commonly used types for convenience
pub use config::PanelSettings;
pub use error::{PanelError, Result};
pub use grouping::{Group, group_measurements};
pub use panel::{MeasurementsPanel, PanelState, PanelSummary};
pub use scales::{LinearScale, Scales, build_subplot_scale, build_value_scale};
pub use scene::{Layer, Layout, Scene, SceneData};
pub use statistics::{MeanAndDeviation, mean_and_deviation};
pub use types::{
    ColorAssignment, Collection, DisplayMode, Grouping, Measurement, MeasurementId, StrainColorMap,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Install the global `tracing` subscriber.
///
/// `filter` is an env-filter directive used when `RUST_LOG` is unset.
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(filter: &str, json: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| PanelError::invalid(format!("invalid log filter '{}': {}", filter, e)))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| PanelError::invalid(format!("tracing already initialized: {}", e)))
}
