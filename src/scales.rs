//! Linear scales shared by every subplot
//!
//! The value scale maps measurement values onto the horizontal pixel range of
//! the panel; the subplot scale maps jitter offsets onto the height of one
//! subplot. Both are built once per dataset and never recomputed by
//! incremental scene updates.

use crate::scene::layout::Layout;
use crate::types::Measurement;
use serde::Serialize;

/// Default number of ticks the nice domain is rounded for
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Domain used when there are no measurements to derive one from
pub const EMPTY_DOMAIN: (f64, f64) = (0.0, 1.0);

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Continuous, monotonic mapping from a numeric domain onto a pixel range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value onto the range. A degenerate domain maps
    /// everything onto the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 || !span.is_finite() {
            0.5
        } else {
            (value - d0) / span
        };
        r0 + t * (r1 - r0)
    }

    /// Round the domain outward to tick boundaries for `count` ticks
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        let mut previous_step: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous_step == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous_step = Some(step);
        }
        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    /// Evenly spaced tick values within the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        if start == stop || count == 0 || !start.is_finite() || !stop.is_finite() {
            return if start == stop && start.is_finite() { vec![start] } else { vec![] };
        }
        let step = tick_increment(start, stop, count);
        let mut ticks = Vec::new();
        if step > 0.0 {
            let first = (start / step).ceil() as i64;
            let last = (stop / step).floor() as i64;
            for i in first..=last {
                ticks.push(i as f64 * step);
            }
        } else if step < 0.0 {
            let inverse = -step;
            let first = (start * inverse).ceil() as i64;
            let last = (stop * inverse).floor() as i64;
            for i in first..=last {
                ticks.push(i as f64 / inverse);
            }
        }
        if reversed {
            ticks.reverse();
        }
        ticks
    }

    /// Distance between consecutive ticks (always positive)
    pub fn tick_step(&self, count: usize) -> f64 {
        let (start, stop) = self.domain;
        let step = tick_increment(start.min(stop), start.max(stop), count);
        if step < 0.0 { -1.0 / step } else { step }
    }
}

/// Tick increment as a power of ten times 1, 2 or 5. Negative values encode
/// the reciprocal of a sub-unit step so it stays exact.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Format a tick value with the precision implied by `step` and thousands separators
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-(step.log10().floor())).max(0.0) as usize
    } else {
        0
    };
    let formatted = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) if rest.chars().any(|c| c != '0' && c != '.') => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Extent of all measurement values, regardless of grouping
pub fn value_extent(measurements: &[Measurement]) -> Option<(f64, f64)> {
    measurements
        .iter()
        .map(|m| m.value)
        .filter(|v| v.is_finite())
        .fold(None, |extent, v| match extent {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Shared horizontal scale: niced value extent onto the padded panel width
pub fn build_value_scale(measurements: &[Measurement], panel_width: f64, layout: &Layout) -> LinearScale {
    let domain = value_extent(measurements).unwrap_or(EMPTY_DOMAIN);
    LinearScale::new(domain, layout.value_range(panel_width)).nice(DEFAULT_TICK_COUNT)
}

/// Shared within-subplot scale. The jitter domain is padded by one point
/// diameter on each side so extreme points are not clipped, and the range
/// is inverted so larger offsets plot higher.
pub fn build_subplot_scale(layout: &Layout) -> LinearScale {
    let diameter = 2.0 * layout.circle_radius;
    LinearScale::new(
        (layout.y_min - diameter, layout.y_max + diameter),
        (layout.subplot_height, 0.0),
    )
    .nice(DEFAULT_TICK_COUNT)
}

/// The pair of scales every subplot shares
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl Scales {
    pub fn build(measurements: &[Measurement], panel_width: f64, layout: &Layout) -> Self {
        Self {
            x: build_value_scale(measurements, panel_width, layout),
            y: build_subplot_scale(layout),
        }
    }
}
