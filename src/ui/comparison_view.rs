use egui::{Color32, Frame, Margin, RichText, Ui};
use egui_plot::{Legend, Line, PlotPoints, Points};
use log::debug;

use crate::comparison::colors::{BACKGROUND_TRACK_COLOR, EQUAL_PACE_COLOR};
use crate::comparison::{Comparison, ComparisonMap};
use crate::render::HoverInfo;

use super::telemetry_overlay::show_overlay;
use super::{PALETTE_BACKGROUND, PALETTE_ERROR, PALETTE_TEXT, finite_runs};

/// Interactive circuit comparison map
pub struct ComparisonViewerApp {
    map: ComparisonMap,
    title: String,
    hovered_index: Option<usize>,
}

impl ComparisonViewerApp {
    pub fn new(map: ComparisonMap, title: String) -> Self {
        Self {
            map,
            title,
            hovered_index: None,
        }
    }
}

impl eframe::App for ComparisonViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("ComparisonHeader")
            .frame(panel_frame())
            .show(ctx, |ui| {
                ui.label(RichText::new(&self.title).color(PALETTE_TEXT).strong());
                if let Some(comparison) = self.map.comparison() {
                    show_legend(comparison, ui);
                }
            });

        let comparison = match &self.map {
            ComparisonMap::Available(comparison) => comparison,
            ComparisonMap::Unavailable { reason } => {
                egui::CentralPanel::default()
                    .frame(panel_frame())
                    .show(ctx, |ui| {
                        ui.centered_and_justified(|ui| {
                            ui.label(
                                RichText::new(format!("Telemetry unavailable: {}", reason))
                                    .color(PALETTE_ERROR),
                            );
                        });
                    });
                return;
            }
        };

        egui::SidePanel::right("HoverDetail")
            .frame(panel_frame())
            .resizable(false)
            .min_width(220.0)
            .show(ctx, |ui| {
                match self
                    .hovered_index
                    .and_then(|index| HoverInfo::at(comparison, index))
                {
                    Some(info) => {
                        if let Some(segment) =
                            self.hovered_index.and_then(|i| comparison.segment_at(i))
                        {
                            ui.colored_label(Color32::from(segment.color), &segment.label);
                            ui.separator();
                        }
                        for line in info.lines() {
                            ui.monospace(RichText::new(line).color(PALETTE_TEXT));
                        }
                    }
                    None => {
                        ui.label(
                            RichText::new("Hover the track for details").color(PALETTE_TEXT),
                        );
                    }
                }
            });

        let overlay_hover = egui::TopBottomPanel::bottom("TelemetryOverlay")
            .frame(panel_frame())
            .resizable(true)
            .default_height(280.0)
            .show(ctx, |ui| show_overlay(comparison, self.hovered_index, ui))
            .inner;

        let map_hover = egui::CentralPanel::default()
            .frame(panel_frame())
            .show(ctx, |ui| show_map(comparison, self.hovered_index, ui))
            .inner;
        let hovered = overlay_hover.or(map_hover);
        if hovered != self.hovered_index {
            debug!("Hovered grid point {:?}", hovered);
        }
        self.hovered_index = hovered;
    }
}

fn panel_frame() -> Frame {
    Frame::default()
        .fill(PALETTE_BACKGROUND)
        .inner_margin(Margin::same(8))
}

fn show_legend(comparison: &Comparison, ui: &mut Ui) {
    ui.horizontal(|ui| {
        for (label, color) in [
            (format!("{} faster", comparison.driver_a), comparison.colors.driver_a),
            (format!("{} faster", comparison.driver_b), comparison.colors.driver_b),
            ("Equal pace".to_string(), EQUAL_PACE_COLOR),
        ] {
            ui.colored_label(Color32::from(color), "■");
            ui.label(RichText::new(label).color(PALETTE_TEXT));
            ui.add_space(12.0);
        }
    });
}

/// Draw the map and return the grid index nearest to the pointer
fn show_map(comparison: &Comparison, hovered_index: Option<usize>, ui: &mut Ui) -> Option<usize> {
    let positions = &comparison.aligned.driver_a;
    let plot = egui_plot::Plot::new("ComparisonMap")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_background(false)
        .allow_boxed_zoom(false)
        .legend(Legend::default());

    plot.show(ui, |plot_ui| {
        for run in finite_runs(comparison.background_track.iter().copied()) {
            plot_ui.line(
                Line::new("Circuit", PlotPoints::new(run))
                    .color(Color32::from(BACKGROUND_TRACK_COLOR))
                    .width(1.0),
            );
        }

        for (i, colored) in comparison.segments.iter().enumerate() {
            let end = if i + 1 < comparison.segments.len() {
                colored.segment.end_index + 1
            } else {
                colored.segment.end_index
            };
            let points =
                (colored.segment.start_index..=end).map(|j| (positions.x[j], positions.y[j]));
            for run in finite_runs(points) {
                plot_ui.line(
                    Line::new(colored.label.clone(), PlotPoints::new(run))
                        .color(Color32::from(colored.color))
                        .width(4.0),
                );
            }
        }

        if let Some(index) = hovered_index
            && let (Some(x), Some(y)) = (positions.x.get(index), positions.y.get(index))
            && x.is_finite()
            && y.is_finite()
        {
            plot_ui.points(
                Points::new("Hovered", PlotPoints::new(vec![[*x, *y]]))
                    .color(PALETTE_TEXT)
                    .radius(6.0),
            );
        }

        plot_ui
            .pointer_coordinate()
            .and_then(|pointer| nearest_index(comparison, pointer.x, pointer.y))
    })
    .inner
}

/// Grid index whose driver A position is closest to `(x, y)`
pub(crate) fn nearest_index(comparison: &Comparison, x: f64, y: f64) -> Option<usize> {
    let positions = &comparison.aligned.driver_a;
    positions
        .x
        .iter()
        .zip(positions.y.iter())
        .enumerate()
        .filter(|(_, (px, py))| px.is_finite() && py.is_finite())
        .map(|(i, (px, py))| (i, (px - x).powi(2) + (py - y).powi(2)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
