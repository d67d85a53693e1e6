//! Build a measurements scene from a collection file and print a JSON
//! summary of it or an SVG preview

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use measurements_panel::loader::load_collections;
use measurements_panel::scene::render_svg;
use measurements_panel::{DisplayMode, MeasurementsPanel, PanelSettings, StrainColorMap, init_tracing};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Svg,
}

#[derive(Debug, Parser)]
#[command(name = "measurements-scene", version, about)]
struct Cli {
    /// Measurements file (.json or .csv)
    #[arg(long)]
    collection: PathBuf,

    /// Collection key within the file (defaults to the file's default)
    #[arg(long)]
    key: Option<String>,

    /// Field to group subplots by
    #[arg(long)]
    group_by: Option<String>,

    /// JSON file mapping strain -> {attribute, color}
    #[arg(long)]
    colors: Option<PathBuf>,

    /// Color-by attribute order, comma separated
    #[arg(long, value_delimiter = ',')]
    legend: Vec<String>,

    /// Visible data layer: raw or mean
    #[arg(long)]
    display: Option<DisplayMode>,

    #[arg(long)]
    show_overall_mean: Option<bool>,

    #[arg(long)]
    show_threshold: Option<bool>,

    /// Panel width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Settings file (TOML, JSON or YAML)
    #[arg(long, env = "MEASUREMENTS_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Log as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = PanelSettings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(width) = cli.width {
        settings.panel_width = width;
    }
    settings.display = cli.display.or(settings.display);
    settings.show_overall_mean = cli.show_overall_mean.or(settings.show_overall_mean);
    settings.show_threshold = cli.show_threshold.or(settings.show_threshold);
    init_tracing(&settings.log_filter, cli.log_json || settings.log_json)?;

    let file = load_collections(&cli.collection, &settings.layout)
        .with_context(|| format!("loading {}", cli.collection.display()))?;
    let collection = file.take(cli.key.as_deref())?;
    info!(collection = %collection.key, measurements = collection.measurements.len(), "Loaded collection");

    let mut panel = MeasurementsPanel::new(collection, settings.panel_width, settings.layout.clone())?;
    if let Some(group_by) = cli.group_by.as_deref() {
        panel.set_group_by(group_by)?;
    }
    if let Some(path) = &cli.colors {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let colors: StrainColorMap =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        panel.set_colors(colors, cli.legend.clone());
    }
    settings.apply(&mut panel);

    match cli.format {
        OutputFormat::Summary => {
            println!("{}", serde_json::to_string_pretty(&panel.summary())?);
        }
        OutputFormat::Svg => {
            println!("{}", render_svg(panel.scene())?);
        }
    }
    Ok(())
}
