//! Axis construction: the shared bottom value axis and the single-tick
//! axis at the left edge of every subplot

use crate::scales::{DEFAULT_TICK_COUNT, LinearScale, format_tick};
use crate::scene::graph::{NodeClass, NodeId, Scene, Shape, TextAnchor};
use crate::scene::measure::AXIS_FONT_SIZE;

/// Gap between a tick line and its label
const TICK_PADDING: f64 = 3.0;

/// Baseline shift of bottom-axis labels (0.71em)
const BOTTOM_LABEL_DY: f64 = 0.71 * AXIS_FONT_SIZE;

/// Baseline shift of left-axis labels (0.32em)
const LEFT_LABEL_DY: f64 = 0.32 * AXIS_FONT_SIZE;

/// Outer and inner tick length of the bottom axis
const BOTTOM_TICK_SIZE: f64 = 6.0;

/// Handles of a subplot axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupAxis {
    pub axis: NodeId,
    pub tick: NodeId,
    pub label: NodeId,
}

/// Bottom axis at vertical offset `y` with one labelled tick per nice value
/// and a centered axis title
pub fn append_value_axis(
    scene: &mut Scene,
    scale: &LinearScale,
    y: f64,
    title: &str,
    title_position: (f64, f64),
) -> NodeId {
    let root = scene.root();
    let axis = scene.append(root, NodeClass::XAxis, Shape::Group { dx: 0.0, dy: y });
    let (r0, r1) = scale.range();
    scene.append(
        axis,
        NodeClass::AxisDomain,
        Shape::Line { x1: r0, y1: 0.0, x2: r1, y2: 0.0 },
    );

    let step = scale.tick_step(DEFAULT_TICK_COUNT);
    for value in scale.ticks(DEFAULT_TICK_COUNT) {
        let tick = scene.append(
            axis,
            NodeClass::AxisTick,
            Shape::Group { dx: scale.apply(value), dy: 0.0 },
        );
        scene.append(
            tick,
            NodeClass::AxisTick,
            Shape::Line { x1: 0.0, y1: 0.0, x2: 0.0, y2: BOTTOM_TICK_SIZE },
        );
        let content = format_tick(value, step);
        let width = scene.measurer().text_width(&content, AXIS_FONT_SIZE);
        scene.append(
            tick,
            NodeClass::AxisLabel,
            Shape::Text {
                x: 0.0,
                y: BOTTOM_TICK_SIZE + TICK_PADDING,
                dy: BOTTOM_LABEL_DY,
                content,
                anchor: TextAnchor::Middle,
                font_size: AXIS_FONT_SIZE,
                width,
                scale: None,
            },
        );
    }

    let width = scene.measurer().text_width(title, AXIS_FONT_SIZE);
    scene.append(
        axis,
        NodeClass::AxisLabel,
        Shape::Text {
            x: title_position.0,
            y: title_position.1,
            dy: 0.0,
            content: title.to_string(),
            anchor: TextAnchor::Middle,
            font_size: AXIS_FONT_SIZE,
            width,
            scale: None,
        },
    );
    axis
}

/// Left axis of one subplot with a single tick at `tick_y` labelled with the
/// grouping value. Labels wider than the label column are scaled down
/// uniformly.
pub fn append_group_axis(
    scene: &mut Scene,
    subplot: NodeId,
    scale: &LinearScale,
    tick_y: f64,
    label: &str,
) -> GroupAxis {
    let layout = scene.layout().clone();
    let tick_size = layout.y_axis_tick_size;
    let axis = scene.append(
        subplot,
        NodeClass::YAxis,
        Shape::Group { dx: layout.left_padding, dy: 0.0 },
    );
    let (r0, r1) = scale.range();
    scene.append(
        axis,
        NodeClass::AxisDomain,
        Shape::Line { x1: 0.0, y1: r0, x2: 0.0, y2: r1 },
    );
    let tick = scene.append(axis, NodeClass::AxisTick, Shape::Group { dx: 0.0, dy: tick_y });
    scene.append(
        tick,
        NodeClass::AxisTick,
        Shape::Line { x1: -tick_size, y1: 0.0, x2: 0.0, y2: 0.0 },
    );

    let width = scene.measurer().text_width(label, AXIS_FONT_SIZE);
    let label = scene.append(
        tick,
        NodeClass::AxisLabel,
        Shape::Text {
            x: -(tick_size + TICK_PADDING),
            y: 0.0,
            dy: LEFT_LABEL_DY,
            content: label.to_string(),
            anchor: TextAnchor::End,
            font_size: AXIS_FONT_SIZE,
            width,
            scale: fit_scale(width, layout.available_label_width()),
        },
    );
    GroupAxis { axis, tick, label }
}

/// Uniform scale-down needed for `width` to fit `available`, if any
pub fn fit_scale(width: f64, available: f64) -> Option<f64> {
    (width > available && width > 0.0).then(|| available / width)
}

/// Horizontal extent of a left-axis tick (line plus label), measured
/// leftward from the axis line
pub fn tick_extent(scene: &Scene, label: NodeId) -> f64 {
    let tick_size = scene.layout().y_axis_tick_size;
    match scene.node(label).map(|n| &n.shape) {
        Some(Shape::Text { width, scale, .. }) => {
            let scale = scale.unwrap_or(1.0);
            tick_size.max((tick_size + TICK_PADDING + width) * scale)
        }
        _ => tick_size,
    }
}
