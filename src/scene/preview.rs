//! SVG preview of the visible scene, drawn through plotters into a string

use crate::error::Result;
use crate::scene::graph::{Node, NodeId, Scene, Shape, TextAnchor};
use crate::scene::styles::{PanelColors, parse_color};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Draw every visible node of `scene` into an SVG document
pub fn render_svg(scene: &Scene) -> Result<String> {
    let width = scene.panel_width().max(1.0).round() as u32;
    let height = scene.height().unwrap_or(0.0).max(1.0).round() as u32;
    let colors = PanelColors::default();
    let mut svg = String::new();
    let mut drawn = 0usize;
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&colors.background)?;
        for id in scene.walk() {
            if !scene.is_rendered(id) {
                continue;
            }
            if let Some(node) = scene.node(id) {
                if draw_node(&root, scene, id, node, &colors)? {
                    drawn += 1;
                }
            }
        }
        root.present()?;
    }
    debug!(width, height, drawn, "Rendered SVG preview");
    Ok(svg)
}

fn pixel(origin: (f64, f64), x: f64, y: f64) -> (i32, i32) {
    ((origin.0 + x).round() as i32, (origin.1 + y).round() as i32)
}

fn color_or(color: Option<&str>, fallback: RGBColor) -> Option<RGBColor> {
    match color {
        Some("none") => None,
        Some(css) => Some(parse_color(css).unwrap_or(fallback)),
        None => Some(fallback),
    }
}

fn draw_node(area: &Area<'_>, scene: &Scene, id: NodeId, node: &Node, colors: &PanelColors) -> Result<bool> {
    let origin = scene.origin(id);
    let style = &node.style;
    match &node.shape {
        Shape::Group { .. } | Shape::Viewport { .. } => return Ok(false),
        Shape::Backdrop => {
            let height = match node.parent().and_then(|p| scene.node(p)).map(|p| &p.shape) {
                Some(Shape::Viewport { height, .. }) => *height,
                _ => return Ok(false),
            };
            let Some(fill) = color_or(style.fill.as_deref(), colors.unstyled) else {
                return Ok(false);
            };
            let top_left = pixel(origin, 0.0, 0.0);
            let bottom_right = pixel(origin, scene.panel_width(), height);
            let opacity = style.fill_opacity.unwrap_or(1.0);
            area.draw(&Rectangle::new([top_left, bottom_right], fill.mix(opacity).filled()))?;
        }
        Shape::Line { x1, y1, x2, y2 } => {
            let stroke = color_or(style.stroke.as_deref(), colors.axis).unwrap_or(colors.axis);
            let width = style.stroke_width.unwrap_or(1.0).round().max(1.0) as u32;
            area.draw(&PathElement::new(
                vec![pixel(origin, *x1, *y1), pixel(origin, *x2, *y2)],
                stroke.stroke_width(width),
            ))?;
        }
        Shape::Circle { cx, cy, r } => {
            let center = pixel(origin, *cx, *cy);
            let radius = r.round() as i32;
            if let Some(fill) = color_or(style.fill.as_deref(), colors.unstyled) {
                area.draw(&Circle::new(center, radius, fill.filled()))?;
            }
            if let Some(stroke) = style.stroke.as_deref().and_then(parse_color) {
                let width = style.stroke_width.unwrap_or(1.0).round().max(1.0) as u32;
                area.draw(&Circle::new(center, radius, stroke.stroke_width(width)))?;
            }
        }
        Shape::Diamond { cx, cy, size } => {
            let (half_width, half_height) = Shape::diamond_half_extent(*size);
            let fill = color_or(style.fill.as_deref(), colors.unstyled).unwrap_or(colors.unstyled);
            area.draw(&Polygon::new(
                vec![
                    pixel(origin, *cx, cy - half_height),
                    pixel(origin, cx + half_width, *cy),
                    pixel(origin, *cx, cy + half_height),
                    pixel(origin, cx - half_width, *cy),
                ],
                fill.filled(),
            ))?;
        }
        Shape::Text { x, y, dy, content, anchor, font_size, scale, .. } => {
            let scale = scale.unwrap_or(1.0);
            let fill = color_or(style.fill.as_deref(), colors.text).unwrap_or(colors.text);
            let horizontal = match anchor {
                TextAnchor::Start => HPos::Left,
                TextAnchor::Middle => HPos::Center,
                TextAnchor::End => HPos::Right,
            };
            let font = ("sans-serif", font_size * scale)
                .into_font()
                .color(&fill)
                .pos(Pos::new(horizontal, VPos::Center));
            area.draw(&Text::new(
                content.clone(),
                pixel(origin, x * scale, (y + dy) * scale),
                font,
            ))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::layout::Layout;
    use crate::scene::render::{SceneData, render};
    use crate::scene::update::set_display_mode;
    use crate::types::{Collection, DisplayMode, Grouping, Measurement};

    fn scene() -> Scene {
        let measurements = (0..4)
            .map(|i| Measurement::new(i, format!("s{}", i), 10.0 * (i + 1) as f64, 50.0).with_field("serum", "A"))
            .collect();
        let mut collection = Collection::new("hi", measurements);
        collection.x_axis_label = "Normalized titer".to_string();
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

    #[test]
    fn test_preview_draws_only_visible_points() {
        let mut scene = scene();
        let hidden = render_svg(&scene).unwrap();
        assert!(hidden.contains("<svg"));
        assert!(!hidden.contains("<circle"));
        assert!(hidden.contains("Normalized titer"));

        set_display_mode(&mut scene, DisplayMode::Raw);
        let visible = render_svg(&scene).unwrap();
        assert!(visible.contains("<circle"));
    }

    #[test]
    fn test_preview_of_empty_scene() {
        let scene = Scene::new(400.0, Layout::default());
        let svg = render_svg(&scene).unwrap();
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<text"));
    }
}
