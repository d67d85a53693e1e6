//! End-to-end scenarios for the measurements scene
//!
//! Each scenario drives a `MeasurementsPanel` the way a host application
//! would and checks the resulting scene graph.

use measurements_panel::scene::{HoverDatum, MarkKind, NodeClass, NodeData, Shape};
use measurements_panel::{
    ColorAssignment, Collection, DisplayMode, Grouping, Layout, Measurement, MeasurementId,
    MeasurementsPanel, StrainColorMap,
};
use std::cell::RefCell;
use std::rc::Rc;

fn collection(rows: &[(&str, f64, &str)]) -> Collection {
    let measurements = rows
        .iter()
        .enumerate()
        .map(|(i, (strain, value, group))| Measurement::new(i, *strain, *value, 50.0).with_field("serum", *group))
        .collect();
    let mut collection = Collection::new("hi", measurements);
    collection.groupings.push(Grouping {
        key: "serum".to_string(),
        order: Vec::new(),
    });
    collection.complete_group_orders();
    collection
}

fn single_group() -> Collection {
    collection(&[("s0", 10.0, "A"), ("s1", 20.0, "A"), ("s2", 30.0, "A"), ("s3", 40.0, "A")])
}

fn colors(pairs: &[(&str, &str, &str)]) -> StrainColorMap {
    pairs
        .iter()
        .map(|(strain, attribute, color)| (strain.to_string(), ColorAssignment::new(*attribute, *color)))
        .collect()
}

#[test]
fn test_single_group_summary() {
    let panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    let summary = panel.summary();

    assert_eq!(summary.subplots.len(), 1);
    assert_eq!(summary.domain, (10.0, 40.0));
    assert_eq!(summary.height, Some(170.0));

    let subplot = &summary.subplots[0];
    assert_eq!(subplot.grouping_value, "A");
    assert_eq!(subplot.id, "measurement_subplot_0");
    assert_eq!(subplot.count, 4);

    let overall = subplot.overall_mean.as_ref().unwrap();
    assert_eq!(overall.mean, 25.0);
    assert!((overall.deviation.unwrap() - 12.909944).abs() < 1e-5);
    assert_eq!(overall.attribute, None);
    assert_eq!(panel.scene().point_count(), 4);
}

#[test]
fn test_points_span_the_value_range() {
    let panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    let scene = panel.scene();
    let cx = |id: usize| match scene.node(scene.point(MeasurementId(id)).unwrap()).unwrap().shape {
        Shape::Circle { cx, .. } => cx,
        ref other => panic!("expected a circle, got {:?}", other),
    };
    assert_eq!(cx(0), 180.0);
    assert_eq!(cx(3), 770.0);
}

#[test]
fn test_threshold_toggle_keeps_position() {
    let mut c = single_group();
    c.threshold = Some(25.0);
    let mut panel = MeasurementsPanel::new(c, 800.0, Layout::default()).unwrap();
    let line = panel.scene().threshold().unwrap();
    let before = panel.scene().node(line).unwrap().shape.clone();
    assert!(!panel.scene().node(line).unwrap().hidden);

    panel.set_show_threshold(false);
    assert!(panel.scene().node(line).unwrap().hidden);
    panel.set_show_threshold(true);
    let node = panel.scene().node(line).unwrap();
    assert!(!node.hidden);
    assert_eq!(node.shape, before);
    assert!(matches!(node.shape, Shape::Line { x1, x2, .. } if x1 == 475.0 && x2 == 475.0));
}

#[test]
fn test_recolor_skips_unassigned_strains() {
    let mut panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    panel.set_colors(
        colors(&[("s0", "3C", "#804020"), ("s1", "3C", "#804020"), ("s2", "2a", "#204080")]),
        vec!["3C".to_string(), "2a".to_string()],
    );
    let scene = panel.scene();

    let colored = scene.node(scene.point(MeasurementId(0)).unwrap()).unwrap();
    assert_eq!(colored.style.stroke.as_deref(), Some("#804020"));
    assert_eq!(colored.style.fill.as_deref(), Some("#a15128"));

    let unassigned = scene.node(scene.point(MeasurementId(3)).unwrap()).unwrap();
    assert_eq!(unassigned.style.stroke, None);
    assert_eq!(unassigned.style.fill, None);

    let means = &panel.summary().subplots[0].color_means;
    let attributes: Vec<_> = means.iter().map(|m| m.attribute.clone().unwrap()).collect();
    assert_eq!(attributes, vec!["3C", "2a"]);
    assert_eq!(means[0].mean, 15.0);
    assert_eq!(means[1].mean, 30.0);
    assert_eq!(means[1].deviation, None);
}

#[test]
fn test_recolor_is_idempotent() {
    let mut panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    let assignments = colors(&[("s0", "3C", "#804020"), ("s2", "2a", "#204080")]);
    let legend = vec!["3C".to_string(), "2a".to_string()];

    panel.set_colors(assignments.clone(), legend.clone());
    let first = panel.summary();
    let nodes = panel.scene().nodes_of_class(NodeClass::ColorMean).len();

    panel.set_colors(assignments, legend);
    assert_eq!(panel.summary(), first);
    assert_eq!(panel.scene().nodes_of_class(NodeClass::ColorMean).len(), nodes);
}

#[test]
fn test_display_modes_show_exactly_one_layer() {
    let mut panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    panel.set_colors(colors(&[("s0", "3C", "#804020")]), vec!["3C".to_string()]);

    let raw_group = panel.scene().subplots()[0].raw_group;
    let color_mean = panel.scene().subplots()[0].color_means[0];

    assert_eq!(panel.state().display, DisplayMode::Mean);
    assert!(panel.scene().node(raw_group).unwrap().hidden);
    assert!(!panel.scene().node(color_mean).unwrap().hidden);

    panel.set_display(DisplayMode::Raw);
    assert!(!panel.scene().node(raw_group).unwrap().hidden);
    assert!(panel.scene().node(color_mean).unwrap().hidden);

    // means drawn after switching to raw stay hidden
    panel.set_colors(colors(&[("s1", "2a", "#204080")]), vec!["2a".to_string()]);
    let redrawn = panel.scene().subplots()[0].color_means[0];
    assert!(panel.scene().node(redrawn).unwrap().hidden);
}

#[test]
fn test_overall_mean_toggle_leaves_data_layers_alone() {
    let mut panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    panel.set_display(DisplayMode::Raw);
    panel.set_show_overall_mean(false);

    let handles = &panel.scene().subplots()[0];
    assert!(panel.scene().node(handles.overall_mean.unwrap()).unwrap().hidden);
    assert!(!panel.scene().node(handles.raw_group).unwrap().hidden);
}

#[test]
fn test_grouping_order_is_stable() {
    let mut c = collection(&[("s0", 1.0, "C"), ("s1", 2.0, "A"), ("s2", 3.0, "B"), ("s3", 4.0, "A")]);
    c.groupings[0].order = vec!["B".to_string(), "C".to_string(), "A".to_string()];
    let mut panel = MeasurementsPanel::new(c, 800.0, Layout::default()).unwrap();

    let order = |panel: &MeasurementsPanel| -> Vec<String> {
        panel.scene().subplots().iter().map(|s| s.grouping_value.clone()).collect()
    };
    assert_eq!(order(&panel), vec!["B", "C", "A"]);

    panel.set_panel_width(1000.0);
    panel.set_group_by("serum").unwrap();
    assert_eq!(order(&panel), vec!["B", "C", "A"]);
    assert_eq!(panel.scene().subplot("A").unwrap().dom_id(), "measurement_subplot_2");
}

#[test]
fn test_updates_never_move_points_or_rescale() {
    let mut c = single_group();
    c.threshold = Some(25.0);
    let mut panel = MeasurementsPanel::new(c, 800.0, Layout::default()).unwrap();
    let positions = |panel: &MeasurementsPanel| -> Vec<(f64, f64)> {
        let scene = panel.scene();
        (0..4)
            .map(|id| match scene.node(scene.point(MeasurementId(id)).unwrap()).unwrap().shape {
                Shape::Circle { cx, cy, .. } => (cx, cy),
                ref other => panic!("expected a circle, got {:?}", other),
            })
            .collect()
    };
    let before = positions(&panel);
    let domain = panel.summary().domain;

    panel.set_colors(
        colors(&[("s0", "3C", "#804020"), ("s3", "2a", "#204080")]),
        vec!["3C".to_string(), "2a".to_string()],
    );
    assert_eq!(positions(&panel), before);
    panel.set_display(DisplayMode::Raw);
    assert_eq!(positions(&panel), before);
    panel.set_show_threshold(false);
    panel.set_show_overall_mean(false);
    assert_eq!(positions(&panel), before);
    assert_eq!(panel.summary().domain, domain);

    // a full rebuild keeps each measurement's jitter
    panel.set_group_by("serum").unwrap();
    assert_eq!(positions(&panel), before);
    assert_eq!(panel.summary().domain, domain);
}

#[test]
fn test_empty_collection_draws_nothing() {
    let panel = MeasurementsPanel::new(collection(&[]), 800.0, Layout::default()).unwrap();
    assert!(panel.scene().subplots().is_empty());
    assert_eq!(panel.scene().point_count(), 0);
    assert_eq!(panel.scene().threshold(), None);
    assert_eq!(panel.summary().height, None);
}

#[test]
fn test_hovering_a_point_reports_its_measurement() {
    let mut panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    panel.set_colors(colors(&[("s0", "3C", "#804020")]), vec!["3C".to_string()]);
    panel.set_display(DisplayMode::Raw);

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    panel.set_hover_handler(move |event| sink.borrow_mut().push(event));

    let point = panel.scene().point(MeasurementId(0)).unwrap();
    panel.scene_mut().pointer_enter(point, 12.0, 34.0);
    assert!(matches!(panel.scene().node(point).unwrap().shape, Shape::Circle { r, .. } if r == 5.0));
    panel.scene_mut().pointer_leave(point);
    assert!(matches!(panel.scene().node(point).unwrap().shape, Shape::Circle { r, .. } if r == 3.0));

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    let entered = events[0].as_ref().unwrap();
    assert_eq!(entered.kind, MarkKind::Measurement);
    assert_eq!((entered.x, entered.y), (12.0, 34.0));
    match &entered.datum {
        HoverDatum::Measurement(m) => assert_eq!(m.strain, "s0"),
        other => panic!("unexpected datum {:?}", other),
    }
    assert!(events[1].is_none());
}

#[test]
fn test_every_point_carries_its_measurement() {
    let panel = MeasurementsPanel::new(single_group(), 800.0, Layout::default()).unwrap();
    let scene = panel.scene();
    for id in 0..4 {
        let node = scene.node(scene.point(MeasurementId(id)).unwrap()).unwrap();
        assert!(matches!(&node.data, NodeData::Measurement(m) if m.id == MeasurementId(id)));
    }
}
