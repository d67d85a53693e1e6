//! Layout constants and subplot geometry for the measurements scene

use serde::{Deserialize, Serialize};

/// Fixed layout constants shared by every subplot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Jitter domain of the within-subplot scale
    pub y_min: f64,
    pub y_max: f64,
    /// Space for the grouping labels
    pub left_padding: f64,
    pub right_padding: f64,
    pub top_padding: f64,
    /// Space for the x-axis ticks and label
    pub bottom_padding: f64,
    pub subplot_height: f64,
    pub subplot_padding: f64,
    pub circle_radius: f64,
    pub circle_hover_radius: f64,
    pub circle_stroke_width: f64,
    pub threshold_stroke_width: f64,
    pub threshold_stroke: String,
    pub subplot_fill: String,
    pub subplot_fill_opacity: f64,
    /// Area of the mean diamond, in square pixels
    pub diamond_size: f64,
    pub standard_deviation_stroke: f64,
    pub overall_mean_color: String,
    pub y_axis_tick_size: f64,
    pub y_axis_color_by_line_height: f64,
    pub y_axis_color_by_line_stroke_width: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            y_min: 0.0,
            y_max: 100.0,
            left_padding: 180.0,
            right_padding: 30.0,
            top_padding: 20.0,
            bottom_padding: 50.0,
            subplot_height: 100.0,
            subplot_padding: 10.0,
            circle_radius: 3.0,
            circle_hover_radius: 5.0,
            circle_stroke_width: 1.0,
            threshold_stroke_width: 2.0,
            threshold_stroke: "#DDD".to_string(),
            subplot_fill: "#adb1b3".to_string(),
            subplot_fill_opacity: 0.15,
            diamond_size: 50.0,
            standard_deviation_stroke: 3.0,
            overall_mean_color: "#000".to_string(),
            y_axis_tick_size: 6.0,
            y_axis_color_by_line_height: 9.0,
            y_axis_color_by_line_stroke_width: 4.0,
        }
    }
}

impl Layout {
    /// Vertical slot of the overall mean marker: the middle of the subplot
    pub fn overall_mean_y(&self) -> f64 {
        self.subplot_height / 2.0
    }

    /// Top edge of the subplot at `index` in stacking order
    pub fn subplot_top(&self, index: usize) -> f64 {
        self.top_padding + self.subplot_height * index as f64
    }

    /// Full scene height for `subplot_count` stacked subplots
    pub fn total_height(&self, subplot_count: usize) -> f64 {
        self.subplot_height * subplot_count as f64 + self.top_padding + self.bottom_padding
    }

    /// Vertical position of the shared x-axis
    pub fn x_axis_y(&self, subplot_count: usize) -> f64 {
        self.total_height(subplot_count) - self.bottom_padding
    }

    /// Pixel range of the value scale for a panel of `panel_width`
    pub fn value_range(&self, panel_width: f64) -> (f64, f64) {
        (self.left_padding, panel_width - self.right_padding)
    }

    /// Center of the plotting area, where the x-axis label sits
    pub fn x_axis_label_x(&self, panel_width: f64) -> f64 {
        self.left_padding + (panel_width - self.left_padding - self.right_padding) / 2.0
    }

    pub fn x_axis_label_y(&self) -> f64 {
        self.bottom_padding * 2.0 / 3.0
    }

    /// Width a grouping label may take before it is scaled down
    pub fn available_label_width(&self) -> f64 {
        self.left_padding - 2.0 * self.y_axis_tick_size
    }

    /// Distance between consecutive color-by mean markers.
    ///
    /// Two paddings frame the subplot and two surround the overall mean.
    /// A single attribute yields an infinite spacing; only its first slot is used.
    pub fn color_mean_spacing(&self, attribute_count: usize) -> f64 {
        (self.subplot_height - 4.0 * self.subplot_padding) / (attribute_count as f64 - 1.0)
    }

    /// First color-by mean slot
    pub fn first_color_mean_y(&self) -> f64 {
        self.subplot_padding
    }

    /// Advance to the next color-by mean slot, jumping below the overall
    /// mean when the slot would land within one padding of it
    pub fn next_color_mean_y(&self, y: f64, spacing: f64) -> f64 {
        let next = y + spacing;
        let overall = self.overall_mean_y();
        if next > overall - self.subplot_padding && next < overall + self.subplot_padding {
            overall + self.subplot_padding
        } else {
            next
        }
    }
}
