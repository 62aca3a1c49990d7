use egui::{Color32, Ui, Vec2b};
use egui_plot::{Legend, Line, LineStyle, PlotPoints, VLine};

use crate::comparison::Comparison;

use super::{PALETTE_TEXT, finite_runs};

/// Speed and pedal traces of both drivers against lap distance. Returns the grid
/// index under the pointer, if any.
pub(crate) fn show_overlay(
    comparison: &Comparison,
    hovered_index: Option<usize>,
    ui: &mut Ui,
) -> Option<usize> {
    let distance = &comparison.aligned.distance;
    let hovered_distance = hovered_index.and_then(|i| distance.get(i).copied());
    let color_a = Color32::from(comparison.colors.driver_a);
    let color_b = Color32::from(comparison.colors.driver_b);
    let height = (ui.available_height() / 2.0 - 4.0).max(60.0);

    let speed_hover = egui_plot::Plot::new("SpeedTrace")
        .height(height)
        .show_background(false)
        .legend(Legend::default())
        .include_y(0.)
        .auto_bounds(Vec2b::new(true, true))
        .y_axis_label("km/h")
        .show(ui, |plot_ui| {
            for (driver, values, color) in [
                (&comparison.driver_a, &comparison.aligned.driver_a.speed, color_a),
                (&comparison.driver_b, &comparison.aligned.driver_b.speed, color_b),
            ] {
                for run in channel_runs(distance, values) {
                    plot_ui.line(
                        Line::new(format!("{} speed", driver), PlotPoints::new(run)).color(color),
                    );
                }
            }
            if let Some(d) = hovered_distance {
                plot_ui.vline(VLine::new("Hovered", d).color(PALETTE_TEXT));
            }
            plot_ui
                .pointer_coordinate()
                .and_then(|pointer| index_at_distance(distance, pointer.x))
        })
        .inner;

    let pedal_hover = egui_plot::Plot::new("PedalTrace")
        .height(height)
        .show_background(false)
        .legend(Legend::default())
        .include_y(0.)
        .include_y(100.)
        .auto_bounds(Vec2b::new(true, false))
        .x_axis_label("Distance (m)")
        .show(ui, |plot_ui| {
            for (driver, channels, color) in [
                (&comparison.driver_a, &comparison.aligned.driver_a, color_a),
                (&comparison.driver_b, &comparison.aligned.driver_b, color_b),
            ] {
                for run in channel_runs(distance, &channels.throttle) {
                    plot_ui.line(
                        Line::new(format!("{} throttle", driver), PlotPoints::new(run))
                            .color(color),
                    );
                }
                for run in channel_runs(distance, &channels.brake) {
                    plot_ui.line(
                        Line::new(format!("{} brake", driver), PlotPoints::new(run))
                            .color(color.gamma_multiply(0.6))
                            .style(LineStyle::Dashed { length: 6.0 }),
                    );
                }
            }
            if let Some(d) = hovered_distance {
                plot_ui.vline(VLine::new("Hovered", d).color(PALETTE_TEXT));
            }
            plot_ui
                .pointer_coordinate()
                .and_then(|pointer| index_at_distance(distance, pointer.x))
        })
        .inner;

    speed_hover.or(pedal_hover)
}

/// `(distance, value)` lines for one aligned channel, split where the channel is missing
pub(crate) fn channel_runs(distance: &[f64], values: &[f64]) -> Vec<Vec<[f64; 2]>> {
    finite_runs(distance.iter().copied().zip(values.iter().copied()))
}

/// Grid index closest to lap distance `x`. `distance` is the ascending grid.
pub(crate) fn index_at_distance(distance: &[f64], x: f64) -> Option<usize> {
    if distance.is_empty() || !x.is_finite() {
        return None;
    }
    let upper = distance.partition_point(|d| *d < x);
    if upper == 0 {
        return Some(0);
    }
    if upper == distance.len() {
        return Some(distance.len() - 1);
    }
    if x - distance[upper - 1] <= distance[upper] - x {
        Some(upper - 1)
    } else {
        Some(upper)
    }
}
