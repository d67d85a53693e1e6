//! Panel controller: owns a collection and its scene and applies state
//! changes with explicit calls
//!
//! Changing the grouping (or the panel width) rebuilds the scene; every
//! other change is forwarded to the matching incremental operation.

use crate::error::{PanelError, Result};
use crate::scene::graph::{NodeData, Scene};
use crate::scene::hover::{HoverEvent, attach_hover};
use crate::scene::layout::Layout;
use crate::scene::render::{SceneData, render};
use crate::scene::update::{
    Layer, annotate_grouping_labels_with_color, recolor_points, redraw_color_attribute_means,
    set_display_mode, set_layer_visible,
};
use crate::types::{Collection, DisplayMode, StrainColorMap};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

/// Current selections of the controls panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub group_by: String,
    pub display: DisplayMode,
    pub show_overall_mean: bool,
    pub show_threshold: bool,
}

type SharedHandler = Rc<RefCell<dyn FnMut(Option<HoverEvent>)>>;

pub struct MeasurementsPanel {
    collection: Collection,
    scene: Scene,
    data: SceneData,
    state: PanelState,
    colors: StrainColorMap,
    legend: Vec<String>,
    hover: Option<SharedHandler>,
}

impl std::fmt::Debug for MeasurementsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementsPanel")
            .field("collection", &self.collection.key)
            .field("state", &self.state)
            .field("scene", &self.scene)
            .finish()
    }
}

impl MeasurementsPanel {
    /// Build the panel with the collection's display defaults
    pub fn new(collection: Collection, panel_width: f64, layout: Layout) -> Result<Self> {
        let group_by = collection
            .default_group_by()
            .map(str::to_string)
            .ok_or_else(|| PanelError::invalid(format!("collection '{}' has no groupings", collection.key)))?;
        let defaults = &collection.display_defaults;
        let state = PanelState {
            group_by,
            display: defaults.display,
            show_overall_mean: defaults.show_overall_mean,
            show_threshold: defaults.show_threshold,
        };
        let data = SceneData::build(&collection, &state.group_by, panel_width, &layout);
        let mut panel = Self {
            collection,
            scene: Scene::new(panel_width, layout),
            data,
            state,
            colors: StrainColorMap::new(),
            legend: Vec::new(),
            hover: None,
        };
        panel.rebuild();
        Ok(panel)
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for forwarding pointer events
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn data(&self) -> &SceneData {
        &self.data
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn colors(&self) -> &StrainColorMap {
        &self.colors
    }

    /// Regroup by another field; rebuilds the scene
    pub fn set_group_by(&mut self, group_by: &str) -> Result<()> {
        if self.collection.grouping(group_by).is_none() {
            return Err(PanelError::UnknownGrouping {
                key: group_by.to_string(),
            });
        }
        info!(collection = %self.collection.key, group_by, "Regrouping measurements");
        self.state.group_by = group_by.to_string();
        self.rescale();
        self.rebuild();
        Ok(())
    }

    /// Container width changed; scales depend on it so the scene is rebuilt
    pub fn set_panel_width(&mut self, panel_width: f64) {
        if panel_width == self.scene.panel_width() {
            return;
        }
        self.scene.set_panel_width(panel_width);
        self.rescale();
        self.rebuild();
    }

    /// New color-by assignments and legend order
    pub fn set_colors(&mut self, colors: StrainColorMap, legend: Vec<String>) {
        self.colors = colors;
        self.legend = legend;
        self.apply_colors();
        self.attach_hover();
    }

    pub fn set_display(&mut self, display: DisplayMode) {
        self.state.display = display;
        set_display_mode(&mut self.scene, display);
    }

    pub fn set_show_overall_mean(&mut self, show: bool) {
        self.state.show_overall_mean = show;
        set_layer_visible(&mut self.scene, Layer::OverallMean, show);
    }

    pub fn set_show_threshold(&mut self, show: bool) {
        self.state.show_threshold = show;
        set_layer_visible(&mut self.scene, Layer::Threshold, show);
    }

    /// Install the hover handler; it survives rebuilds
    pub fn set_hover_handler<F>(&mut self, handler: F)
    where
        F: FnMut(Option<HoverEvent>) + 'static,
    {
        self.hover = Some(Rc::new(RefCell::new(handler)));
        self.attach_hover();
    }

    pub fn clear_hover_handler(&mut self) {
        self.hover = None;
        crate::scene::hover::detach_hover(&mut self.scene);
    }

    fn rescale(&mut self) {
        self.data = SceneData::build(
            &self.collection,
            &self.state.group_by,
            self.scene.panel_width(),
            self.scene.layout(),
        );
    }

    fn rebuild(&mut self) {
        render(&mut self.scene, &self.data);
        self.apply_colors();
        set_display_mode(&mut self.scene, self.state.display);
        set_layer_visible(&mut self.scene, Layer::OverallMean, self.state.show_overall_mean);
        set_layer_visible(&mut self.scene, Layer::Threshold, self.state.show_threshold);
        self.attach_hover();
        debug!(
            collection = %self.collection.key,
            group_by = %self.state.group_by,
            subplots = self.scene.subplots().len(),
            "Rebuilt measurements panel"
        );
    }

    fn apply_colors(&mut self) {
        recolor_points(&mut self.scene, &self.colors);
        redraw_color_attribute_means(&mut self.scene, &self.data, &self.colors, &self.legend);
        annotate_grouping_labels_with_color(&mut self.scene, &self.colors);
    }

    fn attach_hover(&mut self) {
        if let Some(handler) = &self.hover {
            let handler = Rc::clone(handler);
            attach_hover(
                &mut self.scene,
                move |event| (&mut *handler.borrow_mut())(event),
                &self.colors,
            );
        }
    }

    /// Snapshot of what the scene currently shows
    pub fn summary(&self) -> PanelSummary {
        let subplots = self
            .scene
            .subplots()
            .iter()
            .map(|handles| {
                let count = self
                    .data
                    .groups
                    .iter()
                    .find(|g| g.key == handles.grouping_value)
                    .map(|g| g.len())
                    .unwrap_or(0);
                let overall = handles
                    .overall_mean
                    .and_then(|container| self.mean_of(container));
                let color_means = handles
                    .color_means
                    .iter()
                    .filter_map(|container| self.mean_of(*container))
                    .collect();
                SubplotSummary {
                    grouping_value: handles.grouping_value.clone(),
                    id: handles.dom_id(),
                    count,
                    overall_mean: overall,
                    color_means,
                }
            })
            .collect();
        PanelSummary {
            collection: self.collection.key.clone(),
            state: self.state.clone(),
            domain: self.data.scales.x.domain(),
            height: self.scene.height(),
            threshold: self.data.threshold,
            subplots,
        }
    }

    fn mean_of(&self, container: crate::scene::graph::NodeId) -> Option<MeanSummary> {
        let node = self.scene.node(container)?;
        let mean = self.scene.node(*node.children().first()?)?;
        match &mean.data {
            NodeData::Mean(datum) => Some(MeanSummary {
                attribute: datum.attribute.clone(),
                mean: datum.mean,
                deviation: datum.deviation,
                color: datum.color.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanSummary {
    pub attribute: Option<String>,
    pub mean: f64,
    pub deviation: Option<f64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubplotSummary {
    pub grouping_value: String,
    pub id: String,
    pub count: usize,
    pub overall_mean: Option<MeanSummary>,
    pub color_means: Vec<MeanSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSummary {
    pub collection: String,
    pub state: PanelState,
    pub domain: (f64, f64),
    pub height: Option<f64>,
    pub threshold: Option<f64>,
    pub subplots: Vec<SubplotSummary>,
}
