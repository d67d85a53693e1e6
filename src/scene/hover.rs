//! Pointer instrumentation for point and mean marks
//!
//! The host forwards pointer events for scene nodes. Raw points grow while
//! hovered whether or not a handler is attached; the handler, when present,
//! receives the bound datum of the mark or `None` when the pointer leaves.

use crate::scene::graph::{MeanDatum, NodeClass, NodeData, NodeId, Scene, Shape};
use crate::types::{Measurement, StrainColorMap};
use serde::Serialize;
use tracing::debug;

/// Kind of mark under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Measurement,
    Mean,
}

/// Color-by attribute associated with a hovered mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColorByAttribute {
    Value(String),
    /// The strain has no (or an empty) color assignment
    Undefined,
    /// Overall-mean markers are not tied to any attribute
    Overall,
}

/// Data bound to the hovered mark
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HoverDatum {
    Measurement(Measurement),
    Mean(MeanDatum),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverEvent {
    pub datum: HoverDatum,
    pub kind: MarkKind,
    /// Pointer position as reported by the host
    pub x: f64,
    pub y: f64,
    pub attribute: ColorByAttribute,
}

/// Receives hover events; `None` signals that no mark is hovered
pub type HoverHandler = Box<dyn FnMut(Option<HoverEvent>)>;

pub(crate) struct HoverBinding {
    handler: HoverHandler,
    colors: StrainColorMap,
}

/// Install a hover handler, replacing any previous one
pub fn attach_hover<F>(scene: &mut Scene, on_hover: F, colors: &StrainColorMap)
where
    F: FnMut(Option<HoverEvent>) + 'static,
{
    scene.hover = Some(HoverBinding {
        handler: Box::new(on_hover),
        colors: colors.clone(),
    });
    debug!(strains = colors.len(), "Attached hover handler");
}

pub fn detach_hover(scene: &mut Scene) {
    scene.hover = None;
}

fn is_instrumented(class: NodeClass) -> bool {
    matches!(
        class,
        NodeClass::RawMeasurement | NodeClass::Mean | NodeClass::StandardDeviation
    )
}

fn resolve_attribute(colors: &StrainColorMap, strain: &str) -> ColorByAttribute {
    match colors.get(strain) {
        Some(assignment) if !assignment.attribute.is_empty() => {
            ColorByAttribute::Value(assignment.attribute.clone())
        }
        _ => ColorByAttribute::Undefined,
    }
}

impl Scene {
    pub fn has_hover_handler(&self) -> bool {
        self.hover.is_some()
    }

    /// Pointer entered `node` at host coordinates `(x, y)`. Hidden nodes
    /// cannot be hovered.
    pub fn pointer_enter(&mut self, node: NodeId, x: f64, y: f64) {
        if !self.is_rendered(node) {
            return;
        }
        let hover_radius = self.layout().circle_hover_radius;
        let Some(target) = self.node_mut(node) else {
            return;
        };
        let class = target.class;
        if let Shape::Circle { r, .. } = &mut target.shape {
            if class == NodeClass::RawMeasurement {
                *r = hover_radius;
            }
        }
        if !is_instrumented(class) {
            return;
        }
        let data = target.data.clone();
        let Some(binding) = self.hover.as_mut() else {
            return;
        };
        let event = match data {
            NodeData::Measurement(measurement) => HoverEvent {
                attribute: resolve_attribute(&binding.colors, &measurement.strain),
                datum: HoverDatum::Measurement(measurement),
                kind: MarkKind::Measurement,
                x,
                y,
            },
            NodeData::Mean(datum) => HoverEvent {
                attribute: match &datum.attribute {
                    Some(attribute) => ColorByAttribute::Value(attribute.clone()),
                    None => ColorByAttribute::Overall,
                },
                datum: HoverDatum::Mean(datum),
                kind: MarkKind::Mean,
                x,
                y,
            },
            NodeData::None => return,
        };
        (binding.handler)(Some(event));
    }

    /// Pointer left `node`
    pub fn pointer_leave(&mut self, node: NodeId) {
        let radius = self.layout().circle_radius;
        let Some(target) = self.node_mut(node) else {
            return;
        };
        let class = target.class;
        if let Shape::Circle { r, .. } = &mut target.shape {
            if class == NodeClass::RawMeasurement {
                *r = radius;
            }
        }
        if !is_instrumented(class) {
            return;
        }
        if let Some(binding) = self.hover.as_mut() {
            (binding.handler)(None);
        }
    }

    /// Top-most visible point, mean or deviation mark containing scene
    /// coordinates `(x, y)`
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.walk().into_iter().rev().find(|id| {
            let Some(node) = self.node(*id) else {
                return false;
            };
            if !is_instrumented(node.class) || !self.is_rendered(*id) {
                return false;
            }
            let (ox, oy) = self.origin(*id);
            let (px, py) = (x - ox, y - oy);
            match node.shape {
                Shape::Circle { cx, cy, r } => (px - cx).hypot(py - cy) <= r,
                Shape::Diamond { cx, cy, size } => {
                    let (half_width, half_height) = Shape::diamond_half_extent(size);
                    (px - cx).abs() / half_width + (py - cy).abs() / half_height <= 1.0
                }
                Shape::Line { x1, y1, x2, y2 } => {
                    let reach = node.style.stroke_width.unwrap_or(1.0) / 2.0;
                    segment_distance((px, py), (x1, y1), (x2, y2)) <= reach
                }
                _ => false,
            }
        })
    }
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_squared = dx * dx + dy * dy;
    let t = if length_squared == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / length_squared).clamp(0.0, 1.0)
    };
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::layout::Layout;
    use crate::scene::render::{SceneData, render};
    use crate::scene::update::{Layer, set_display_mode, set_layer_visible};
    use crate::types::{ColorAssignment, Collection, DisplayMode, Grouping, MeasurementId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene() -> Scene {
        let measurements = vec![
            Measurement::new(0, "s0", 10.0, 50.0).with_field("serum", "A"),
            Measurement::new(1, "s1", 40.0, 50.0).with_field("serum", "A"),
            Measurement::new(2, "s2", 25.0, 50.0).with_field("serum", "A"),
        ];
        let mut collection = Collection::new("hi", measurements);
        collection.groupings.push(Grouping {
            key: "serum".to_string(),
            order: vec!["A".to_string()],
        });
        let layout = Layout::default();
        let data = SceneData::build(&collection, "serum", 800.0, &layout);
        let mut scene = Scene::new(800.0, layout);
        render(&mut scene, &data);
        scene
    }

    fn colors() -> StrainColorMap {
        let mut map = StrainColorMap::new();
        map.insert("s0".into(), ColorAssignment::new("2019", "#4e79a7"));
        map.insert("s2".into(), ColorAssignment::new("", "#4e79a7"));
        map
    }

    fn recorder(scene: &mut Scene) -> Rc<RefCell<Vec<Option<HoverEvent>>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        attach_hover(scene, move |event| sink.borrow_mut().push(event), &colors());
        events
    }

    #[test]
    fn test_hover_on_raw_point_resolves_attribute() {
        let mut scene = scene();
        set_display_mode(&mut scene, DisplayMode::Raw);
        let events = recorder(&mut scene);
        let point = scene.point(MeasurementId(0)).unwrap();
        scene.pointer_enter(point, 12.0, 34.0);
        scene.pointer_leave(point);

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        let event = events[0].as_ref().unwrap();
        assert_eq!(event.kind, MarkKind::Measurement);
        assert_eq!(event.attribute, ColorByAttribute::Value("2019".to_string()));
        assert_eq!((event.x, event.y), (12.0, 34.0));
        assert!(events[1].is_none());
    }

    #[test]
    fn test_unknown_or_empty_attribute_is_undefined() {
        let mut scene = scene();
        set_display_mode(&mut scene, DisplayMode::Raw);
        let events = recorder(&mut scene);
        for id in [1, 2] {
            let point = scene.point(MeasurementId(id)).unwrap();
            scene.pointer_enter(point, 0.0, 0.0);
        }
        let events = events.borrow();
        assert!(
            events
                .iter()
                .all(|e| e.as_ref().unwrap().attribute == ColorByAttribute::Undefined)
        );
    }

    #[test]
    fn test_overall_mean_hover_has_no_attribute() {
        let mut scene = scene();
        set_layer_visible(&mut scene, Layer::OverallMean, true);
        let events = recorder(&mut scene);
        let container = scene.subplot("A").unwrap().overall_mean.unwrap();
        let diamond = scene.node(container).unwrap().children()[0];
        scene.pointer_enter(diamond, 1.0, 2.0);
        let events = events.borrow();
        let event = events[0].as_ref().unwrap();
        assert_eq!(event.kind, MarkKind::Mean);
        assert_eq!(event.attribute, ColorByAttribute::Overall);
        match &event.datum {
            HoverDatum::Mean(datum) => assert_eq!(datum.mean, 25.0),
            other => panic!("unexpected datum {:?}", other),
        }
    }

    #[test]
    fn test_radius_affordance_without_handler() {
        let mut scene = scene();
        set_display_mode(&mut scene, DisplayMode::Raw);
        let point = scene.point(MeasurementId(1)).unwrap();
        let radius = |scene: &Scene| match scene.node(point).unwrap().shape {
            Shape::Circle { r, .. } => r,
            _ => f64::NAN,
        };
        scene.pointer_enter(point, 0.0, 0.0);
        assert_eq!(radius(&scene), 5.0);
        scene.pointer_leave(point);
        assert_eq!(radius(&scene), 3.0);
    }

    #[test]
    fn test_hidden_marks_are_not_hoverable() {
        let mut scene = scene();
        let events = recorder(&mut scene);
        let point = scene.point(MeasurementId(0)).unwrap();
        scene.pointer_enter(point, 0.0, 0.0);
        assert!(events.borrow().is_empty());
        assert_eq!(scene.hit_test(180.0, 70.0), None);
    }

    #[test]
    fn test_hit_test_finds_visible_point() {
        let mut scene = scene();
        set_display_mode(&mut scene, DisplayMode::Raw);
        // subplot 0 starts at y = 20; jitter 50 maps to 50 within it
        let point = scene.point(MeasurementId(0)).unwrap();
        assert_eq!(scene.hit_test(181.0, 71.0), Some(point));
        assert_eq!(scene.hit_test(190.0, 71.0), None);
    }

    #[test]
    fn test_diamond_extent_matches_area() {
        let (w, h) = Shape::diamond_half_extent(50.0);
        assert!((2.0 * w * h - 50.0).abs() < 1e-9);
    }
}
