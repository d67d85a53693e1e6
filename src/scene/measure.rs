//! Text width estimation for axis labels

/// Font size of axis tick labels
pub const AXIS_FONT_SIZE: f64 = 10.0;

/// Measures rendered text; hosts with a real font backend plug in their own
pub trait TextMeasurer {
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Average-glyph-width estimate, good enough for shrink-to-fit decisions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicTextMeasurer {
    /// Average glyph advance in ems
    pub average_char_width: f64,
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self {
            average_char_width: 0.6,
        }
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.average_char_width
    }
}
