//! Mean and sample standard deviation over measurement values
//!
//! Uses Welford's online method, so a single pass is numerically stable
//! even for values with a large common offset.

use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};

/// Mean with an optional sample standard deviation (defined only for n > 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanAndDeviation {
    pub mean: f64,
    pub deviation: Option<f64>,
}

/// Online accumulator for count, mean and variance
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RunningStats {
    count: u64,
    mean: f64,
    sum_squared_deltas: f64,
}

impl RunningStats {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_squared_deltas += delta * (value - self.mean);
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Bessel-corrected variance (divisor n - 1)
    fn variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.sum_squared_deltas / (self.count - 1) as f64)
    }

    fn deviation(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::default();
        for value in iter {
            stats.update(value);
        }
        stats
    }
}

/// Mean and sample standard deviation of `values`.
///
/// An empty input is rejected: the mean of zero elements is undefined and
/// callers are expected to guard against it.
pub fn mean_and_deviation(values: &[f64]) -> Result<MeanAndDeviation> {
    let stats: RunningStats = values.iter().copied().collect();
    let mean = stats.mean().ok_or(PanelError::EmptyInput { what: "mean" })?;
    Ok(MeanAndDeviation {
        mean,
        deviation: stats.deviation(),
    })
}
