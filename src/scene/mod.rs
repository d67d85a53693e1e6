//! Persistent measurements scene: construction, incremental updates,
//! pointer instrumentation and preview

pub mod axis;
pub mod graph;
pub mod hover;
pub mod layout;
pub mod measure;
pub mod preview;
pub mod render;
pub mod styles;
pub mod update;

pub use graph::{MeanDatum, Node, NodeClass, NodeData, NodeId, Scene, Shape, Style, SubplotHandles, TextAnchor};
pub use hover::{ColorByAttribute, HoverDatum, HoverEvent, HoverHandler, MarkKind, attach_hover, detach_hover};
pub use layout::Layout;
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use preview::render_svg;
pub use render::{SceneData, render};
pub use update::{
    Layer, annotate_grouping_labels_with_color, recolor_points, redraw_color_attribute_means,
    set_display_mode, set_layer_visible,
};
