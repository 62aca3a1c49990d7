// SVG comparison map: one colored polyline per segment drawn over a thin circuit outline

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::TrackDeltaError;
use crate::comparison::colors::BACKGROUND_TRACK_COLOR;
use crate::comparison::{ColoredSegment, Comparison, ComparisonMap};

use super::hover::HoverInfo;

/// Configuration for SVG comparison map generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRenderConfig {
    /// Canvas dimensions (width, height) in pixels
    pub canvas_size: (u32, u32),
    /// Stroke width of the colored segment lines
    pub segment_stroke_width: f32,
    /// Stroke width of the circuit outline under the segments
    pub background_stroke_width: f32,
    /// Margin around the track as percentage of canvas size
    pub margin_percentage: f64,
}

impl Default for MapRenderConfig {
    fn default() -> Self {
        Self {
            canvas_size: (800, 600),
            segment_stroke_width: 4.0,
            background_stroke_width: 1.0,
            margin_percentage: 0.05,
        }
    }
}

impl MapRenderConfig {
    pub fn validate(&self) -> Result<(), TrackDeltaError> {
        let (width, height) = self.canvas_size;
        if width == 0 || height == 0 {
            return Err(TrackDeltaError::SvgGenerationError {
                reason: format!("Invalid canvas size {}x{}", width, height),
            });
        }
        for stroke in [self.segment_stroke_width, self.background_stroke_width] {
            if !(stroke > 0.0 && stroke <= 50.0) {
                return Err(TrackDeltaError::SvgGenerationError {
                    reason: format!("Invalid stroke width: {} (must be 0.1-50.0)", stroke),
                });
            }
        }
        if !(0.0..0.5).contains(&self.margin_percentage) {
            return Err(TrackDeltaError::SvgGenerationError {
                reason: format!(
                    "Invalid margin: {} (must be below half the canvas)",
                    self.margin_percentage
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl BoundingBox {
    pub fn update(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Uniform scaling of track coordinates onto the canvas. The y axis is flipped so
/// the circuit keeps its real-world orientation.
#[derive(Debug, Clone, Copy)]
pub struct CanvasProjection {
    bbox: BoundingBox,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl CanvasProjection {
    /// Fit every finite point inside the canvas margins. `None` when there is no
    /// finite point to fit.
    pub fn fit(
        points: impl IntoIterator<Item = (f64, f64)>,
        config: &MapRenderConfig,
    ) -> Option<Self> {
        let mut bbox = BoundingBox::default();
        for (x, y) in points {
            if x.is_finite() && y.is_finite() {
                bbox.update(Point2D::new(x, y));
            }
        }
        if bbox.is_empty() {
            return None;
        }

        let width = config.canvas_size.0 as f64;
        let height = config.canvas_size.1 as f64;
        let margin_x = width * config.margin_percentage;
        let margin_y = height * config.margin_percentage;
        let usable_width = width - 2.0 * margin_x;
        let usable_height = height - 2.0 * margin_y;

        let scale = match (bbox.width() > 0.0, bbox.height() > 0.0) {
            (true, true) => (usable_width / bbox.width()).min(usable_height / bbox.height()),
            (true, false) => usable_width / bbox.width(),
            (false, true) => usable_height / bbox.height(),
            (false, false) => 1.0,
        };
        // center the scaled track in the usable area
        let offset_x = margin_x + (usable_width - bbox.width() * scale) / 2.0;
        let offset_y = margin_y + (usable_height - bbox.height() * scale) / 2.0;

        Some(Self {
            bbox,
            scale,
            offset_x,
            offset_y,
        })
    }

    pub fn project(&self, x: f64, y: f64) -> Option<Point2D> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Point2D::new(
            self.offset_x + (x - self.bbox.min_x) * self.scale,
            self.offset_y + (self.bbox.max_y - y) * self.scale,
        ))
    }

    /// Project a run of points, splitting it wherever a point is not finite
    fn project_runs(&self, points: impl Iterator<Item = (f64, f64)>) -> Vec<Vec<Point2D>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (x, y) in points {
            match self.project(x, y) {
                Some(point) => current.push(point),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// Generator for SVG comparison maps
pub struct ComparisonMapRenderer {
    config: MapRenderConfig,
}

impl Default for ComparisonMapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonMapRenderer {
    pub fn new() -> Self {
        Self {
            config: MapRenderConfig::default(),
        }
    }

    pub fn with_config(config: MapRenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapRenderConfig {
        &self.config
    }

    /// Render either the comparison or, when it is unavailable, a placeholder
    /// carrying the reason.
    pub fn render(&self, map: &ComparisonMap) -> Result<String, TrackDeltaError> {
        match map {
            ComparisonMap::Available(comparison) => self.render_comparison(comparison),
            ComparisonMap::Unavailable { reason } => self.render_unavailable(reason),
        }
    }

    pub fn render_comparison(&self, comparison: &Comparison) -> Result<String, TrackDeltaError> {
        self.config.validate()?;

        let positions_a = driver_a_positions(comparison);
        let projection = CanvasProjection::fit(
            comparison
                .background_track
                .iter()
                .copied()
                .chain(positions_a.iter().copied()),
            &self.config,
        )
        .ok_or_else(|| TrackDeltaError::SvgGenerationError {
            reason: format!(
                "No position data for {} or {}",
                comparison.driver_a, comparison.driver_b
            ),
        })?;

        let mut svg = self.header(&format!(
            "Circuit Map: {} vs {} Performance Comparison",
            comparison.driver_a, comparison.driver_b
        ));

        for run in projection.project_runs(comparison.background_track.iter().copied()) {
            svg.push_str("\n  <polyline class=\"background-track\" points=\"");
            push_points(&mut svg, &run);
            svg.push_str("\" />");
        }

        let mut drawn = 0;
        for (i, colored) in comparison.segments.iter().enumerate() {
            // run each polyline into the next segment's first point so the trace has no gaps
            let end = if i + 1 < comparison.segments.len() {
                colored.segment.end_index + 1
            } else {
                colored.segment.end_index
            };
            let runs = projection
                .project_runs(positions_a[colored.segment.start_index..=end].iter().copied());
            if runs.is_empty() {
                debug!(
                    "Segment {:?} has no position data, skipping",
                    colored.segment.indices()
                );
                continue;
            }

            svg.push_str(&format!(
                "\n  <g class=\"segment\" stroke=\"{}\">\n    <title>{}</title>",
                colored.color,
                escape_xml(&segment_title(comparison, colored))
            ));
            for run in runs {
                svg.push_str("\n    <polyline points=\"");
                push_points(&mut svg, &run);
                svg.push_str("\" />");
            }
            svg.push_str("\n  </g>");
            drawn += 1;
        }

        if drawn < comparison.segments.len() {
            warn!(
                "{} of {} segments had no position data",
                comparison.segments.len() - drawn,
                comparison.segments.len()
            );
        }

        svg.push_str(&format!(
            "\n  <!-- Generated from {} points, {} segments -->",
            comparison.aligned.len(),
            drawn
        ));
        svg.push_str("\n</svg>");

        info!(
            "Generated comparison SVG {} vs {} with {} characters",
            comparison.driver_a,
            comparison.driver_b,
            svg.len()
        );
        Ok(svg)
    }

    pub fn render_unavailable(&self, reason: &str) -> Result<String, TrackDeltaError> {
        self.config.validate()?;
        let (width, height) = self.config.canvas_size;
        let mut svg = self.header("Comparison unavailable");
        svg.push_str(&format!(
            "\n  <text class=\"unavailable\" x=\"{}\" y=\"{}\">Telemetry unavailable: {}</text>",
            width / 2,
            height / 2,
            escape_xml(reason)
        ));
        svg.push_str("\n</svg>");
        Ok(svg)
    }

    fn header(&self, title: &str) -> String {
        let (width, height) = self.config.canvas_size;
        format!(
            r##"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">
  <defs>
    <style>
      .background-track {{ stroke: {}; stroke-width: {:.2}; fill: none; }}
      .segment {{
        stroke-width: {:.2}; fill: none; stroke-linecap: round; stroke-linejoin: round;
      }}
      .title {{ fill: #dddddd; font-family: sans-serif; font-size: 16px; }}
      .unavailable {{
        fill: #dddddd; font-family: sans-serif; font-size: 14px; text-anchor: middle;
      }}
    </style>
  </defs>
  <rect width="100%" height="100%" fill="#111111" />
  <text class="title" x="20" y="30">{}</text>"##,
            width,
            height,
            width,
            height,
            BACKGROUND_TRACK_COLOR,
            self.config.background_stroke_width,
            self.config.segment_stroke_width,
            escape_xml(title)
        )
    }
}

// segments follow driver A's racing line
fn driver_a_positions(comparison: &Comparison) -> Vec<(f64, f64)> {
    comparison
        .aligned
        .driver_a
        .x
        .iter()
        .zip(comparison.aligned.driver_a.y.iter())
        .map(|(x, y)| (*x, *y))
        .collect()
}

fn push_points(svg: &mut String, points: &[Point2D]) {
    svg.push_str(
        &points
            .iter()
            .map(|point| format!("{:.2},{:.2}", point.x, point.y))
            .join(" "),
    );
}

fn segment_title(comparison: &Comparison, colored: &ColoredSegment) -> String {
    let segment = &colored.segment;
    let mut lines = vec![
        colored.label.clone(),
        format!(
            "Mean Delta Speed: {} km/h over {} points",
            if segment.mean_advantage.is_finite() {
                format!("{:+.2}", segment.mean_advantage)
            } else {
                "-".to_string()
            },
            segment.point_count()
        ),
    ];
    if let Some(start) = HoverInfo::at(comparison, segment.start_index) {
        lines.push(String::new());
        lines.push("Start".to_string());
        lines.extend(start.lines());
    }
    if segment.end_index != segment.start_index {
        if let Some(end) = HoverInfo::at(comparison, segment.end_index) {
            lines.push(String::new());
            lines.push("End".to_string());
            lines.extend(end.lines());
        }
    }
    lines.join("\n")
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
