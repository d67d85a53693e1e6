//! Colors and mark styles for the measurements scene

use crate::scene::graph::Style;
use crate::scene::layout::Layout;
use plotters::style::RGBColor;

/// Per-step multiplier of the brighter transform
const BRIGHTER: f64 = 1.0 / 0.7;

/// Lightening applied to raw point fills
pub const POINT_FILL_BRIGHTEN: f64 = 0.65;

/// Colors of the non-data parts of the scene
#[derive(Debug, Clone)]
pub struct PanelColors {
    pub background: RGBColor,
    pub axis: RGBColor,
    pub text: RGBColor,
    /// Fallback for marks that were never colored
    pub unstyled: RGBColor,
}

impl Default for PanelColors {
    fn default() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            axis: RGBColor(0, 0, 0),
            text: RGBColor(51, 51, 51),
            unstyled: RGBColor(0, 0, 0),
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `rgb(r, g, b)`
pub fn parse_color(color: &str) -> Option<RGBColor> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut parts = hex.chars().map(|c| channel(&format!("{c}{c}")));
                Some(RGBColor(parts.next()??, parts.next()??, parts.next()??))
            }
            6 => Some(RGBColor(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        };
    }
    let inner = color.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut channels = inner.split(',').map(|c| {
        c.trim()
            .parse::<f64>()
            .ok()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
    });
    let rgb = RGBColor(channels.next()??, channels.next()??, channels.next()??);
    channels.next().is_none().then_some(rgb)
}

pub fn to_hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Multiply every channel by `(1 / 0.7)^k`, clamped to the displayable range
pub fn brighter(color: RGBColor, k: f64) -> RGBColor {
    let factor = BRIGHTER.powf(k);
    let scale = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
    RGBColor(scale(color.0), scale(color.1), scale(color.2))
}

/// Brighter variant of a CSS color; unparsable colors are returned unchanged
pub fn brighter_color(color: &str) -> String {
    match parse_color(color) {
        Some(rgb) => to_hex(brighter(rgb, POINT_FILL_BRIGHTEN)),
        None => color.to_string(),
    }
}

/// Raw point: outlined in the assigned color, filled with its brighter variant
pub fn point_style(color: &str, layout: &Layout) -> Style {
    Style {
        stroke: Some(color.to_string()),
        stroke_width: Some(layout.circle_stroke_width),
        fill: Some(brighter_color(color)),
        fill_opacity: None,
    }
}

/// Mean diamond, filled only
pub fn mean_style(color: &str) -> Style {
    Style {
        fill: Some(color.to_string()),
        ..Style::default()
    }
}

pub fn deviation_style(color: &str, layout: &Layout) -> Style {
    Style {
        stroke: Some(color.to_string()),
        stroke_width: Some(layout.standard_deviation_stroke),
        fill: None,
        fill_opacity: None,
    }
}

/// Alternating band tint; only odd subplots are shaded
pub fn background_style(stack_index: usize, layout: &Layout) -> Style {
    let fill = if stack_index % 2 == 1 {
        layout.subplot_fill.clone()
    } else {
        "none".to_string()
    };
    Style {
        stroke: None,
        stroke_width: None,
        fill: Some(fill),
        fill_opacity: Some(layout.subplot_fill_opacity),
    }
}

pub fn threshold_style(layout: &Layout) -> Style {
    Style {
        stroke: Some(layout.threshold_stroke.clone()),
        stroke_width: Some(layout.threshold_stroke_width),
        fill: None,
        fill_opacity: None,
    }
}

/// Colored underline below a grouping label
pub fn label_annotation_style(color: &str, layout: &Layout) -> Style {
    Style {
        stroke: Some(color.to_string()),
        stroke_width: Some(layout.y_axis_color_by_line_stroke_width),
        fill: None,
        fill_opacity: None,
    }
}
