// Distance alignment of two drivers' lap telemetry onto a shared grid

use log::debug;
use serde::Serialize;

use crate::TrackDeltaError;
use crate::telemetry::{Channel, RawTelemetrySample};

/// Number of grid points used when the caller does not ask for a specific resolution
pub const DEFAULT_GRID_POINTS: usize = 2000;

/// Per-channel values of one driver, one entry per grid point
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignedChannels {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub speed: Vec<f64>,
    pub throttle: Vec<f64>,
    pub brake: Vec<f64>,
    pub gear: Vec<f64>,
    pub drs: Vec<f64>,
}

impl AlignedChannels {
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Speed => &self.speed,
            Channel::Throttle => &self.throttle,
            Channel::Brake => &self.brake,
            Channel::Gear => &self.gear,
            Channel::Drs => &self.drs,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut Vec<f64> {
        match channel {
            Channel::X => &mut self.x,
            Channel::Y => &mut self.y,
            Channel::Speed => &mut self.speed,
            Channel::Throttle => &mut self.throttle,
            Channel::Brake => &mut self.brake,
            Channel::Gear => &mut self.gear,
            Channel::Drs => &mut self.drs,
        }
    }

    fn values_at(&self, index: usize) -> ChannelValues {
        ChannelValues {
            x: self.x[index],
            y: self.y[index],
            speed: self.speed[index],
            throttle: self.throttle[index],
            brake: self.brake[index],
            gear: self.gear[index],
            drs: self.drs[index],
        }
    }
}

/// One driver's interpolated channel values at a single grid point. NaN marks a
/// channel the driver never recorded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChannelValues {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub throttle: f64,
    pub brake: f64,
    pub gear: f64,
    pub drs: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AlignedSample {
    pub distance: f64,
    pub driver_a: ChannelValues,
    pub driver_b: ChannelValues,
}

/// Both drivers' telemetry resampled onto the same evenly spaced distance grid
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignedLap {
    pub distance: Vec<f64>,
    pub driver_a: AlignedChannels,
    pub driver_b: AlignedChannels,
}

impl AlignedLap {
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    pub fn sample(&self, index: usize) -> Option<AlignedSample> {
        let distance = *self.distance.get(index)?;
        Some(AlignedSample {
            distance,
            driver_a: self.driver_a.values_at(index),
            driver_b: self.driver_b.values_at(index),
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = AlignedSample> + '_ {
        (0..self.len()).filter_map(|i| self.sample(i))
    }

    /// Pointwise average of both drivers' positions, used as the circuit outline
    pub fn average_positions(&self) -> Vec<(f64, f64)> {
        (0..self.len())
            .map(|i| {
                (
                    0.5 * (self.driver_a.x[i] + self.driver_b.x[i]),
                    0.5 * (self.driver_a.y[i] + self.driver_b.y[i]),
                )
            })
            .collect()
    }
}

/// Resample two raw traces onto `n_points` evenly spaced distances from zero to
/// the shorter of the two laps.
pub fn align_traces(
    driver_a: &str,
    trace_a: &[RawTelemetrySample],
    driver_b: &str,
    trace_b: &[RawTelemetrySample],
    n_points: usize,
) -> Result<AlignedLap, TrackDeltaError> {
    if n_points == 0 {
        return Err(TrackDeltaError::InvalidUserInput {
            field: "n_points".to_string(),
            reason: "grid needs at least one point".to_string(),
        });
    }

    let sorted_a = sorted_by_distance(driver_a, trace_a)?;
    let sorted_b = sorted_by_distance(driver_b, trace_b)?;

    let max_a = max_distance(&sorted_a);
    let max_b = max_distance(&sorted_b);
    let max_common = max_a.min(max_b);
    debug!(
        "Aligning {} ({} samples, {:.1} m) with {} ({} samples, {:.1} m) on {} points to {:.1} m",
        driver_a,
        sorted_a.len(),
        max_a,
        driver_b,
        sorted_b.len(),
        max_b,
        n_points,
        max_common
    );

    let grid = linspace(max_common, n_points);
    let driver_a = interpolate_channels(&grid, &sorted_a);
    let driver_b = interpolate_channels(&grid, &sorted_b);

    Ok(AlignedLap {
        distance: grid,
        driver_a,
        driver_b,
    })
}

/// Samples with a finite distance, stably sorted by that distance. Negative
/// distances stay in as interpolation anchors for the start of the grid.
fn sorted_by_distance<'a>(
    driver: &str,
    trace: &'a [RawTelemetrySample],
) -> Result<Vec<(f64, &'a RawTelemetrySample)>, TrackDeltaError> {
    let mut usable: Vec<(f64, &RawTelemetrySample)> = trace
        .iter()
        .filter_map(|s| match s.distance {
            Some(d) if d.is_finite() => Some((d, s)),
            _ => None,
        })
        .collect();

    if usable.is_empty() {
        return Err(TrackDeltaError::InvalidTelemetry {
            driver: driver.to_string(),
            reason: "no sample carries a finite distance".to_string(),
        });
    }
    if usable.len() < trace.len() {
        debug!(
            "Dropped {} of {} samples without a finite distance for {}",
            trace.len() - usable.len(),
            trace.len(),
            driver
        );
    }

    // sort_by is stable, so samples sharing a distance keep their recorded order
    usable.sort_by(|a, b| a.0.total_cmp(&b.0));

    if max_distance(&usable) <= 0.0 {
        return Err(TrackDeltaError::InvalidTelemetry {
            driver: driver.to_string(),
            reason: "lap distance never exceeds 0 m".to_string(),
        });
    }
    Ok(usable)
}

fn max_distance(sorted: &[(f64, &RawTelemetrySample)]) -> f64 {
    sorted.last().map(|(d, _)| *d).unwrap_or(0.0)
}

/// `n` evenly spaced values over `[0, end]`, both ends included
fn linspace(end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![0.0];
    }
    let step = end / (n - 1) as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
    grid[n - 1] = end;
    grid
}

fn interpolate_channels(grid: &[f64], sorted: &[(f64, &RawTelemetrySample)]) -> AlignedChannels {
    let distances: Vec<f64> = sorted.iter().map(|(d, _)| *d).collect();
    let mut channels = AlignedChannels::default();
    for channel in Channel::ALL {
        let values: Vec<f64> = sorted.iter().map(|(_, s)| s.channel(channel)).collect();
        *channels.channel_mut(channel) = interpolate(grid, &distances, &values);
    }
    channels
}

/// Piecewise-linear interpolation of `(xs, ys)` at every point of the ascending
/// `grid`. Grid points outside `xs` hold the nearest end value.
///
/// `xs` must be sorted ascending; repeated x values are allowed, the last one
/// at or below a grid point is used as the left neighbour.
pub(crate) fn interpolate(grid: &[f64], xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let len = xs.len().min(ys.len());
    if len == 0 {
        return vec![f64::NAN; grid.len()];
    }

    let mut out = Vec::with_capacity(grid.len());
    // index of the first source point strictly beyond the current grid point
    let mut upper = 0;
    for &target in grid {
        while upper < len && xs[upper] <= target {
            upper += 1;
        }
        let value = if upper == 0 {
            ys[0]
        } else if upper == len {
            ys[len - 1]
        } else {
            let (x0, x1) = (xs[upper - 1], xs[upper]);
            let (y0, y1) = (ys[upper - 1], ys[upper]);
            let frac = (target - x0) / (x1 - x0);
            if frac == 0.0 { y0 } else { y0 + (y1 - y0) * frac }
        };
        out.push(value);
    }
    out
}
