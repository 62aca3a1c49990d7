// Splits the aligned lap into contiguous regions where one driver is faster

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::aligner::AlignedLap;

/// Dead-band applied to the speed delta when the caller does not set one, in km/h
pub const DEFAULT_THRESHOLD_KMH: f64 = 0.1;

/// Which driver is faster at a grid point or over a segment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dominance {
    DriverA,
    DriverB,
    Equal,
}

impl Dominance {
    /// Classify a speed delta against the dead-band `threshold`.
    ///
    /// NaN fails both comparisons and is classified as `Equal`.
    pub fn classify(advantage: f64, threshold: f64) -> Self {
        if advantage > threshold {
            Dominance::DriverA
        } else if advantage < -threshold {
            Dominance::DriverB
        } else {
            Dominance::Equal
        }
    }
}

/// A maximal run of grid points sharing one point-level label
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_index: usize,
    /// Last grid index covered by the segment, inclusive
    pub end_index: usize,
    /// Derived from the segment mean, not from the point labels
    pub dominant: Dominance,
    /// Mean of the finite advantage values in the segment, NaN when there are none
    pub mean_advantage: f64,
}

impl Segment {
    /// Number of grid points covered, always at least one
    pub fn point_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }
}

/// Speed of driver A minus speed of driver B at every grid point, in km/h
pub fn speed_advantage(aligned: &AlignedLap) -> Vec<f64> {
    aligned
        .driver_a
        .speed
        .iter()
        .zip(aligned.driver_b.speed.iter())
        .map(|(a, b)| a - b)
        .collect()
}

/// Segment an advantage signal.
///
/// Boundaries are placed where the point label changes; each segment's dominant
/// driver is then re-derived from its mean advantage with the same threshold.
pub fn segment_advantage(advantage: &[f64], threshold: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let Some(&first) = advantage.first() else {
        return segments;
    };

    let mut start = 0;
    let mut current = Dominance::classify(first, threshold);
    for (i, &value) in advantage.iter().enumerate().skip(1) {
        let label = Dominance::classify(value, threshold);
        if label != current {
            segments.push(close_segment(advantage, start, i - 1, threshold));
            start = i;
            current = label;
        }
    }
    segments.push(close_segment(advantage, start, advantage.len() - 1, threshold));
    segments
}

fn close_segment(advantage: &[f64], start: usize, end: usize, threshold: f64) -> Segment {
    let mean_advantage = finite_mean(&advantage[start..=end]).unwrap_or(f64::NAN);
    Segment {
        start_index: start,
        end_index: end,
        dominant: Dominance::classify(mean_advantage, threshold),
        mean_advantage,
    }
}

/// Arithmetic mean of the finite values, `None` if there are none
fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
