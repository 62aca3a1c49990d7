use egui::Color32;

use crate::comparison::Rgb;

mod comparison_view;
mod telemetry_overlay;

pub use comparison_view::ComparisonViewerApp;

pub(crate) const PALETTE_BACKGROUND: Color32 = Color32::from_rgb(0x11, 0x11, 0x11);
pub(crate) const PALETTE_TEXT: Color32 = Color32::from_rgb(0xdd, 0xdd, 0xdd);
pub(crate) const PALETTE_ERROR: Color32 = Color32::from_rgb(0xe8, 0x00, 0x2d);

impl From<Rgb> for Color32 {
    fn from(value: Rgb) -> Self {
        Color32::from_rgb(value.r, value.g, value.b)
    }
}

/// Split a polyline wherever a point is not finite
pub(crate) fn finite_runs(points: impl Iterator<Item = (f64, f64)>) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, y) in points {
        if x.is_finite() && y.is_finite() {
            current.push([x, y]);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_color32() {
        let color: Color32 = Rgb::new(0x1f, 0x77, 0xb4).into();
        assert_eq!(color, Color32::from_rgb(31, 119, 180));
    }

    #[test]
    fn test_finite_runs() {
        let runs = finite_runs(
            vec![(f64::NAN, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, f64::NAN), (4.0, 4.0)].into_iter(),
        );
        assert_eq!(runs, vec![vec![[1.0, 1.0], [2.0, 2.0]], vec![[4.0, 4.0]]]);
    }
}
