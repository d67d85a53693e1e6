//! Persistent scene graph with keyed handles
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Child order is
//! paint order. The renderer fills [`SceneIndex`] once per build so the
//! incremental operations can reach marks by measurement id or subplot key
//! without walking the tree.

use crate::scene::hover::HoverBinding;
use crate::scene::layout::Layout;
use crate::scene::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::types::{DisplayMode, Measurement, MeasurementId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Handle of a node in the scene arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Role of a node; incremental operations select nodes by class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeClass {
    Root,
    XAxis,
    AxisDomain,
    AxisTick,
    AxisLabel,
    YAxis,
    YAxisColorByLabel,
    Threshold,
    Subplot,
    SubplotBackground,
    RawMeasurementsGroup,
    RawMeasurement,
    OverallMean,
    ColorMean,
    Mean,
    StandardDeviation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Geometry of a node, in the coordinate system of its parent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    /// Translates its children
    Group { dx: f64, dy: f64 },
    /// Full-width band starting at `y`; children use subplot coordinates
    Viewport { y: f64, height: f64 },
    /// Fills the enclosing viewport
    Backdrop,
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    /// Diamond symbol with the given area
    Diamond { cx: f64, cy: f64, size: f64 },
    Text {
        x: f64,
        y: f64,
        dy: f64,
        content: String,
        anchor: TextAnchor,
        font_size: f64,
        /// Unscaled rendered width
        width: f64,
        /// Uniform scale-down applied to fit the label column
        scale: Option<f64>,
    },
}

impl Shape {
    /// Half width and half height of a diamond symbol of area `size`
    pub fn diamond_half_extent(size: f64) -> (f64, f64) {
        let tan30 = (std::f64::consts::PI / 6.0).tan();
        let half_height = (size / (2.0 * tan30)).sqrt();
        (half_height * tan30, half_height)
    }
}

/// Presentation attributes; `None` means the inherited default
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub fill: Option<String>,
    pub fill_opacity: Option<f64>,
}

/// Summary bound to a mean marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanDatum {
    /// Color-by attribute, `None` for the overall mean
    pub attribute: Option<String>,
    pub mean: f64,
    pub deviation: Option<f64>,
    pub color: String,
}

/// Data bound to a node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum NodeData {
    #[default]
    None,
    Measurement(Measurement),
    Mean(MeanDatum),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub class: NodeClass,
    pub shape: Shape,
    pub style: Style,
    /// Equivalent of `display: none`; hides the whole subtree
    pub hidden: bool,
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Handles of one subplot, filled by the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubplotHandles {
    pub grouping_value: String,
    /// Position of the grouping value in the canonical group order
    pub order_index: usize,
    /// Position in the vertical stack
    pub stack_index: usize,
    pub root: NodeId,
    pub background: NodeId,
    pub y_axis: NodeId,
    pub tick: NodeId,
    pub tick_label: NodeId,
    pub raw_group: NodeId,
    pub overall_mean: Option<NodeId>,
    pub color_means: Vec<NodeId>,
    pub label_annotations: Vec<NodeId>,
}

impl SubplotHandles {
    pub fn dom_id(&self) -> String {
        format!("measurement_subplot_{}", self.order_index)
    }
}

/// Identifier → handle tables built at render time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneIndex {
    pub(crate) points: HashMap<MeasurementId, NodeId>,
    pub(crate) subplots: Vec<SubplotHandles>,
    pub(crate) subplot_by_value: HashMap<String, usize>,
    pub(crate) threshold: Option<NodeId>,
    pub(crate) x_axis: Option<NodeId>,
}

/// The mounted measurements scene
pub struct Scene {
    nodes: Vec<Option<Node>>,
    /// Vacated slots reused by `append`
    free: Vec<usize>,
    root: NodeId,
    panel_width: f64,
    height: Option<f64>,
    layout: Layout,
    measurer: Box<dyn TextMeasurer>,
    pub(crate) index: SceneIndex,
    pub(crate) display_mode: Option<DisplayMode>,
    pub(crate) hover: Option<HoverBinding>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("panel_width", &self.panel_width)
            .field("height", &self.height)
            .field("nodes", &self.node_count())
            .field("subplots", &self.index.subplots.len())
            .field("display_mode", &self.display_mode)
            .field("hover_attached", &self.hover.is_some())
            .finish()
    }
}

impl Scene {
    pub fn new(panel_width: f64, layout: Layout) -> Self {
        Self::with_measurer(panel_width, layout, Box::new(HeuristicTextMeasurer::default()))
    }

    pub fn with_measurer(panel_width: f64, layout: Layout, measurer: Box<dyn TextMeasurer>) -> Self {
        let root = Node {
            class: NodeClass::Root,
            shape: Shape::Group { dx: 0.0, dy: 0.0 },
            style: Style::default(),
            hidden: false,
            data: NodeData::None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            panel_width,
            height: None,
            layout,
            measurer,
            index: SceneIndex::default(),
            display_mode: None,
            hover: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn panel_width(&self) -> f64 {
        self.panel_width
    }

    /// Container width changes only take effect on the next render
    pub fn set_panel_width(&mut self, panel_width: f64) {
        self.panel_width = panel_width;
    }

    /// Scene height, unset until something has been rendered
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.display_mode
    }

    /// Drop every node, index entry and hover binding, keeping an empty root
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.free.clear();
        if let Some(root) = self.nodes[0].as_mut() {
            root.children.clear();
        }
        self.height = None;
        self.index = SceneIndex::default();
        self.display_mode = None;
        self.hover = None;
    }

    pub fn is_empty(&self) -> bool {
        self.node(self.root).is_none_or(|root| root.children.is_empty())
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Allocated arena slots, live or vacated
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Append a node as the last (top-most) child of `parent`
    pub fn append(&mut self, parent: NodeId, class: NodeClass, shape: Shape) -> NodeId {
        let node = Node {
            class,
            shape,
            style: Style::default(),
            hidden: false,
            data: NodeData::None,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Remove a node and its subtree. Vacated ids may be handed out again
    /// by later appends.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let parent = self.node(id).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                self.free.push(next.0);
                stack.extend(node.children);
            }
        }
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.node_mut(id) {
            node.hidden = hidden;
        }
    }

    /// Visible when neither the node nor any ancestor is hidden
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            match self.node(next) {
                Some(node) if !node.hidden => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Live nodes in paint order (depth-first, pre-order)
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                order.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// Nodes of one class in paint order
    pub fn nodes_of_class(&self, class: NodeClass) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|n| n.class == class))
            .collect()
    }

    /// Offset of the coordinate system the node's own shape is expressed in
    pub fn origin(&self, id: NodeId) -> (f64, f64) {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            let Some(node) = self.node(parent) else { break };
            match node.shape {
                Shape::Group { dx, dy } => {
                    x += dx;
                    y += dy;
                }
                Shape::Viewport { y: top, .. } => y += top,
                _ => {}
            }
            current = node.parent;
        }
        (x, y)
    }

    pub fn point(&self, id: MeasurementId) -> Option<NodeId> {
        self.index.points.get(&id).copied()
    }

    pub fn point_count(&self) -> usize {
        self.index.points.len()
    }

    /// Subplot handles in stacking order
    pub fn subplots(&self) -> &[SubplotHandles] {
        &self.index.subplots
    }

    pub fn subplot(&self, grouping_value: &str) -> Option<&SubplotHandles> {
        self.index
            .subplot_by_value
            .get(grouping_value)
            .and_then(|i| self.index.subplots.get(*i))
    }

    pub(crate) fn subplot_mut(&mut self, grouping_value: &str) -> Option<&mut SubplotHandles> {
        let i = *self.index.subplot_by_value.get(grouping_value)?;
        self.index.subplots.get_mut(i)
    }

    pub fn threshold(&self) -> Option<NodeId> {
        self.index.threshold
    }

    pub fn x_axis(&self) -> Option<NodeId> {
        self.index.x_axis
    }
}
