//! Incremental operations against a rendered scene
//!
//! Each operation resolves its targets through the scene index and touches
//! only the nodes it owns. None of them recompute scales or move subplots;
//! callers rebuild with [`render`](crate::scene::render::render) whenever the
//! grouping key or group order changes.

use crate::scene::axis::tick_extent;
use crate::scene::graph::{MeanDatum, NodeClass, NodeData, NodeId, Scene, Shape, Style, TextAnchor};
use crate::scene::measure::AXIS_FONT_SIZE;
use crate::scene::render::{SceneData, draw_mean_and_deviation};
use crate::scene::styles::{label_annotation_style, point_style};
use crate::statistics::mean_and_deviation;
use crate::types::{DisplayMode, StrainColorMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Layers that can be toggled independently of the display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Threshold,
    OverallMean,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Threshold => write!(f, "threshold"),
            Layer::OverallMean => write!(f, "overall_mean"),
        }
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "threshold" => Ok(Layer::Threshold),
            "overall_mean" | "overallMean" => Ok(Layer::OverallMean),
            other => Err(format!("unknown layer '{}'", other)),
        }
    }
}

/// Restyle every raw point from the color assignment of its strain.
///
/// Points whose strain has no assignment are reset to the default style.
pub fn recolor_points(scene: &mut Scene, colors: &StrainColorMap) {
    let layout = scene.layout().clone();
    let points: Vec<NodeId> = scene.index.points.values().copied().collect();
    let mut unassigned = 0usize;
    for id in points {
        let Some(node) = scene.node_mut(id) else {
            warn!(node = id.index(), "Point handle no longer in scene");
            continue;
        };
        let NodeData::Measurement(measurement) = &node.data else {
            continue;
        };
        match colors.get(&measurement.strain) {
            Some(assignment) => node.style = point_style(&assignment.color, &layout),
            None => {
                node.style = Style::default();
                unassigned += 1;
            }
        }
    }
    debug!(
        points = scene.point_count(),
        unassigned, "Recolored measurement points"
    );
}

/// Values of one color-by attribute within a group
struct AttributeValues {
    color: String,
    values: Vec<f64>,
}

/// Replace every color-by mean marker with freshly computed ones.
///
/// Within each subplot, markers are placed top to bottom in the order of
/// `attribute_order`, skipping attributes absent from the group. The
/// spacing is derived from the number of attributes present, and a slot
/// landing within one padding of the overall mean jumps below it.
pub fn redraw_color_attribute_means(
    scene: &mut Scene,
    data: &SceneData,
    colors: &StrainColorMap,
    attribute_order: &[String],
) {
    remove_color_means(scene);

    let layout = scene.layout().clone();
    let hidden = scene.display_mode != Some(DisplayMode::Mean);
    let mut drawn = 0usize;
    let mut skipped = 0usize;

    for group in &data.groups {
        let mut by_attribute: HashMap<&str, AttributeValues> = HashMap::new();
        for measurement in &group.measurements {
            let Some(assignment) = colors.get(&measurement.strain) else {
                skipped += 1;
                continue;
            };
            by_attribute
                .entry(assignment.attribute.as_str())
                .or_insert_with(|| AttributeValues {
                    color: assignment.color.clone(),
                    values: Vec::new(),
                })
                .values
                .push(measurement.value);
        }

        let Some(subplot) = scene.subplot(&group.key).map(|s| s.root) else {
            warn!(group = %group.key, "No subplot for group, scene is stale");
            continue;
        };

        let spacing = layout.color_mean_spacing(by_attribute.len());
        let mut y = layout.first_color_mean_y();
        let mut markers = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for attribute in attribute_order {
            if seen.contains(&attribute.as_str()) {
                continue;
            }
            let Some(entry) = by_attribute.get(attribute.as_str()) else {
                continue;
            };
            seen.push(attribute);
            let stats = match mean_and_deviation(&entry.values) {
                Ok(stats) => stats,
                Err(err) => {
                    warn!(group = %group.key, %attribute, "Skipping color mean: {}", err);
                    continue;
                }
            };
            let marker = draw_mean_and_deviation(
                scene,
                subplot,
                NodeClass::ColorMean,
                MeanDatum {
                    attribute: Some(attribute.clone()),
                    mean: stats.mean,
                    deviation: stats.deviation,
                    color: entry.color.clone(),
                },
                &data.scales.x,
                y,
            );
            scene.set_hidden(marker, hidden);
            markers.push(marker);
            y = layout.next_color_mean_y(y, spacing);
        }

        drawn += markers.len();
        if let Some(handles) = scene.subplot_mut(&group.key) {
            handles.color_means = markers;
        }
    }

    debug!(markers = drawn, skipped, "Redrew color-by means");
}

fn remove_color_means(scene: &mut Scene) {
    for id in scene.nodes_of_class(NodeClass::ColorMean) {
        scene.remove(id);
    }
    for handles in scene.index.subplots.iter_mut() {
        handles.color_means.clear();
    }
}

/// Show exactly one data layer: raw points or color-by means
pub fn set_display_mode(scene: &mut Scene, mode: DisplayMode) {
    scene.display_mode = Some(mode);
    let subplots: Vec<(NodeId, Vec<NodeId>)> = scene
        .subplots()
        .iter()
        .map(|s| (s.raw_group, s.color_means.clone()))
        .collect();
    for (raw_group, color_means) in subplots {
        scene.set_hidden(raw_group, mode != DisplayMode::Raw);
        for marker in color_means {
            scene.set_hidden(marker, mode != DisplayMode::Mean);
        }
    }
    debug!(%mode, "Switched measurements display");
}

/// Show or hide a toggle-controlled layer. A collection without a threshold
/// has no threshold line, so toggling it does nothing.
pub fn set_layer_visible(scene: &mut Scene, layer: Layer, visible: bool) {
    let targets: Vec<NodeId> = match layer {
        Layer::Threshold => scene.threshold().into_iter().collect(),
        Layer::OverallMean => scene
            .subplots()
            .iter()
            .filter_map(|s| s.overall_mean)
            .collect(),
    };
    for id in &targets {
        scene.set_hidden(*id, !visible);
    }
    debug!(%layer, visible, nodes = targets.len(), "Toggled layer");
}

/// Add a colored underline and an `(attribute)` caption under every
/// grouping label that names a strain in `colors`, replacing earlier ones
pub fn annotate_grouping_labels_with_color(scene: &mut Scene, colors: &StrainColorMap) {
    for id in scene.nodes_of_class(NodeClass::YAxisColorByLabel) {
        scene.remove(id);
    }
    for handles in scene.index.subplots.iter_mut() {
        handles.label_annotations.clear();
    }

    let layout = scene.layout().clone();
    let labels: Vec<(String, NodeId, NodeId)> = scene
        .subplots()
        .iter()
        .map(|s| (s.grouping_value.clone(), s.tick, s.tick_label))
        .collect();
    let mut annotated = 0usize;

    for (grouping_value, tick, tick_label) in labels {
        let text = match scene.node(tick_label).map(|n| &n.shape) {
            Some(Shape::Text { content, .. }) => content.clone(),
            _ => continue,
        };
        let Some(assignment) = colors.get(&text) else {
            continue;
        };
        let label_width = tick_extent(scene, tick_label);

        let line = scene.append(
            tick,
            NodeClass::YAxisColorByLabel,
            Shape::Line {
                x1: -layout.y_axis_tick_size,
                y1: layout.y_axis_color_by_line_height,
                x2: -label_width,
                y2: layout.y_axis_color_by_line_height,
            },
        );
        if let Some(node) = scene.node_mut(line) {
            node.style = label_annotation_style(&assignment.color, &layout);
        }

        let content = format!("({})", assignment.attribute);
        let width = scene.measurer().text_width(&content, AXIS_FONT_SIZE);
        let caption = scene.append(
            tick,
            NodeClass::YAxisColorByLabel,
            Shape::Text {
                x: -label_width / 2.0,
                y: 0.0,
                dy: layout.y_axis_color_by_line_height * 2.0 + layout.y_axis_color_by_line_stroke_width,
                content,
                anchor: TextAnchor::Middle,
                font_size: AXIS_FONT_SIZE,
                width,
                scale: None,
            },
        );

        if let Some(handles) = scene.subplot_mut(&grouping_value) {
            handles.label_annotations = vec![line, caption];
        }
        annotated += 1;
    }
    debug!(annotated, "Annotated grouping labels with color-by");
}
