//! Deterministic vertical jitter for raw measurement points
//!
//! Jitter is assigned once per measurement at ingestion and only depends on
//! the measurement id, so points keep their vertical position across every
//! redraw of the same dataset.

use crate::scene::layout::Layout;
use crate::types::{Measurement, MeasurementId};

/// Linear-congruential pseudo-random value in `[0, 1]`
fn rand_like(seed: usize) -> f64 {
    let x = (seed.wrapping_mul(1103515245).wrapping_add(12345)) & 0x7fff_ffff;
    (x as f64) / (0x7fff_ffff as f64)
}

/// Jitter offset for a measurement id, within `[layout.y_min, layout.y_max]`
pub fn jitter_for(id: MeasurementId, layout: &Layout) -> f64 {
    // two rounds so consecutive ids do not land on a visible lattice
    let unit = rand_like(rand_like(id.0).to_bits() as usize ^ id.0);
    layout.y_min + unit * (layout.y_max - layout.y_min)
}

/// Assign jitter to every measurement in place
pub fn assign_jitter(measurements: &mut [Measurement], layout: &Layout) {
    for measurement in measurements.iter_mut() {
        measurement.jitter = jitter_for(measurement.id, layout);
    }
}
