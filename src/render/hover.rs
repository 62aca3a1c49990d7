// Per-point hover metadata shared by the SVG renderer and the viewer

use std::fmt;

use crate::comparison::{AlignedSample, Comparison};

/// Everything shown when hovering one grid point of the comparison map
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo<'a> {
    pub driver_a: &'a str,
    pub driver_b: &'a str,
    pub sample: AlignedSample,
    /// Speed of driver A minus driver B, km/h
    pub delta_speed: f64,
}

impl<'a> HoverInfo<'a> {
    pub fn at(comparison: &'a Comparison, index: usize) -> Option<Self> {
        let sample = comparison.aligned.sample(index)?;
        Some(Self {
            driver_a: &comparison.driver_a,
            driver_b: &comparison.driver_b,
            sample,
            delta_speed: comparison.advantage.get(index).copied().unwrap_or(f64::NAN),
        })
    }

    /// One line per metric, driver A before driver B
    pub fn lines(&self) -> Vec<String> {
        let (a, b) = (self.driver_a, self.driver_b);
        let (va, vb) = (&self.sample.driver_a, &self.sample.driver_b);
        vec![
            format!("Distance: {} m", number(self.sample.distance, 1)),
            format!("{} Speed: {} km/h", a, number(va.speed, 1)),
            format!("{} Speed: {} km/h", b, number(vb.speed, 1)),
            format!("Delta Speed: {} km/h", signed(self.delta_speed)),
            format!("{} Gear: {}", a, gear(va.gear)),
            format!("{} Gear: {}", b, gear(vb.gear)),
            format!("{} Throttle: {}", a, number(va.throttle, 2)),
            format!("{} Throttle: {}", b, number(vb.throttle, 2)),
            format!("{} Brake: {}", a, number(va.brake, 2)),
            format!("{} Brake: {}", b, number(vb.brake, 2)),
            format!("{} DRS: {}", a, drs(va.drs)),
            format!("{} DRS: {}", b, drs(vb.drs)),
        ]
    }
}

impl fmt::Display for HoverInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

fn number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        "-".to_string()
    }
}

fn signed(value: f64) -> String {
    if value.is_finite() {
        format!("{:+.2}", value)
    } else {
        "-".to_string()
    }
}

// gear and DRS are interpolated, show the truncated integer like the raw channel
fn gear(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value.trunc() as i64)
    } else {
        "-".to_string()
    }
}

fn drs(value: f64) -> i64 {
    if value.is_finite() { value.trunc() as i64 } else { 0 }
}
