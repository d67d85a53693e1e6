//! Full construction of the measurements scene
//!
//! [`render`] is the only operation that rebuilds the scene from scratch.
//! Everything it draws that is controlled by a toggle starts hidden; the
//! updater operations decide visibility afterwards.

use crate::grouping::{Group, group_measurements};
use crate::scales::{LinearScale, Scales};
use crate::scene::axis::{append_group_axis, append_value_axis};
use crate::scene::graph::{MeanDatum, NodeClass, NodeData, NodeId, Scene, Shape, SubplotHandles};
use crate::scene::layout::Layout;
use crate::scene::styles::{background_style, deviation_style, mean_style, threshold_style};
use crate::statistics::mean_and_deviation;
use crate::types::Collection;
use serde::Serialize;
use tracing::{debug, warn};

/// Everything derived from the dataset that a render needs. Rebuilt
/// whenever the measurements, grouping key or group order change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneData {
    pub scales: Scales,
    pub x_axis_label: String,
    pub threshold: Option<f64>,
    pub group_order: Vec<String>,
    pub groups: Vec<Group>,
}

impl SceneData {
    /// Group and scale a collection for one grouping key
    pub fn build(collection: &Collection, group_by: &str, panel_width: f64, layout: &Layout) -> Self {
        let group_order = collection.group_order(group_by).to_vec();
        let groups = group_measurements(&collection.measurements, group_by, &group_order);
        Self {
            scales: Scales::build(&collection.measurements, panel_width, layout),
            x_axis_label: collection.x_axis_label.clone(),
            threshold: collection.threshold.filter(|t| t.is_finite()),
            group_order,
            groups,
        }
    }

    /// Index of a grouping value in the canonical order; values missing from
    /// it are numbered after every listed value
    pub fn order_index(&self, grouping_value: &str, stack_index: usize) -> usize {
        self.group_order
            .iter()
            .position(|v| v == grouping_value)
            .unwrap_or(self.group_order.len() + stack_index)
    }
}

/// Rebuild the scene from scratch
pub fn render(scene: &mut Scene, data: &SceneData) {
    scene.clear();
    if data.groups.is_empty() {
        debug!("No measurement groups, leaving scene empty");
        return;
    }

    let layout = scene.layout().clone();
    let panel_width = scene.panel_width();
    let height = layout.total_height(data.groups.len());
    scene.set_height(Some(height));
    let x = data.scales.x;

    if let Some(threshold) = data.threshold.filter(|t| t.is_finite()) {
        let root = scene.root();
        let tx = x.apply(threshold);
        let line = scene.append(
            root,
            NodeClass::Threshold,
            Shape::Line {
                x1: tx,
                y1: layout.top_padding,
                x2: tx,
                y2: height - layout.bottom_padding,
            },
        );
        if let Some(node) = scene.node_mut(line) {
            node.style = threshold_style(&layout);
            node.hidden = true;
        }
        scene.index.threshold = Some(line);
    }

    let x_axis = append_value_axis(
        scene,
        &x,
        height - layout.bottom_padding,
        &data.x_axis_label,
        (layout.x_axis_label_x(panel_width), layout.x_axis_label_y()),
    );
    scene.index.x_axis = Some(x_axis);

    for (stack_index, group) in data.groups.iter().enumerate() {
        let handles = render_subplot(scene, data, group, stack_index, &layout);
        scene
            .index
            .subplot_by_value
            .insert(group.key.clone(), scene.index.subplots.len());
        scene.index.subplots.push(handles);
    }

    debug!(
        subplots = data.groups.len(),
        points = scene.point_count(),
        height,
        "Rendered measurements scene"
    );
}

fn render_subplot(
    scene: &mut Scene,
    data: &SceneData,
    group: &Group,
    stack_index: usize,
    layout: &Layout,
) -> SubplotHandles {
    let x = data.scales.x;
    let y = data.scales.y;
    let root = scene.root();
    let subplot = scene.append(
        root,
        NodeClass::Subplot,
        Shape::Viewport {
            y: layout.subplot_top(stack_index),
            height: layout.subplot_height,
        },
    );

    let background = scene.append(subplot, NodeClass::SubplotBackground, Shape::Backdrop);
    if let Some(node) = scene.node_mut(background) {
        node.style = background_style(stack_index, layout);
    }

    let tick_y = y.apply((layout.y_max - layout.y_min) / 2.0);
    let axis = append_group_axis(scene, subplot, &y, tick_y, &group.key);

    let raw_group = scene.append(
        subplot,
        NodeClass::RawMeasurementsGroup,
        Shape::Group { dx: 0.0, dy: 0.0 },
    );
    scene.set_hidden(raw_group, true);
    for measurement in &group.measurements {
        let point = scene.append(
            raw_group,
            NodeClass::RawMeasurement,
            Shape::Circle {
                cx: x.apply(measurement.value),
                cy: y.apply(measurement.jitter),
                r: layout.circle_radius,
            },
        );
        if let Some(node) = scene.node_mut(point) {
            node.data = NodeData::Measurement(measurement.clone());
        }
        scene.index.points.insert(measurement.id, point);
    }

    let overall_mean = match mean_and_deviation(&group.values()) {
        Ok(stats) => Some(draw_mean_and_deviation(
            scene,
            subplot,
            NodeClass::OverallMean,
            MeanDatum {
                attribute: None,
                mean: stats.mean,
                deviation: stats.deviation,
                color: layout.overall_mean_color.clone(),
            },
            &x,
            layout.overall_mean_y(),
        )),
        Err(err) => {
            warn!(group = %group.key, "Skipping overall mean: {}", err);
            None
        }
    };

    SubplotHandles {
        grouping_value: group.key.clone(),
        order_index: data.order_index(&group.key, stack_index),
        stack_index,
        root: subplot,
        background,
        y_axis: axis.axis,
        tick: axis.tick,
        tick_label: axis.label,
        raw_group,
        overall_mean,
        color_means: Vec::new(),
        label_annotations: Vec::new(),
    }
}

/// Hidden container holding a mean diamond and, when the deviation is
/// defined, a deviation line spanning mean ± deviation at height `y`
pub(crate) fn draw_mean_and_deviation(
    scene: &mut Scene,
    parent: NodeId,
    class: NodeClass,
    datum: MeanDatum,
    x: &LinearScale,
    y: f64,
) -> NodeId {
    let diamond_size = scene.layout().diamond_size;
    let container = scene.append(parent, class, Shape::Group { dx: 0.0, dy: 0.0 });
    scene.set_hidden(container, true);

    let mean = scene.append(
        container,
        NodeClass::Mean,
        Shape::Diamond {
            cx: x.apply(datum.mean),
            cy: y,
            size: diamond_size,
        },
    );
    if let Some(node) = scene.node_mut(mean) {
        node.style = mean_style(&datum.color);
        node.data = NodeData::Mean(datum.clone());
    }

    if let Some(deviation) = datum.deviation {
        let style = deviation_style(&datum.color, scene.layout());
        let line = scene.append(
            container,
            NodeClass::StandardDeviation,
            Shape::Line {
                x1: x.apply(datum.mean - deviation),
                y1: y,
                x2: x.apply(datum.mean + deviation),
                y2: y,
            },
        );
        if let Some(node) = scene.node_mut(line) {
            node.style = style;
            node.data = NodeData::Mean(datum);
        }
    }
    container
}
