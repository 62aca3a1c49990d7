// Circuit comparison of two drivers' fastest laps
//
// Fastest lap telemetry is aligned on a shared distance grid, the speed delta is
// segmented into "who is faster here" regions and every region gets a color.

pub mod aligner;
pub mod colors;
pub mod segmenter;

pub use aligner::{AlignedLap, AlignedSample, ChannelValues, DEFAULT_GRID_POINTS, align_traces};
pub use colors::{DriverColors, Rgb};
pub use segmenter::{DEFAULT_THRESHOLD_KMH, Dominance, Segment, segment_advantage, speed_advantage};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::TrackDeltaError;
use crate::telemetry::{ColorProvider, TelemetryProvider};

/// Resolution and dead-band of a comparison
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Number of points on the shared distance grid
    pub n_points: usize,
    /// Speed delta, in km/h, below which neither driver counts as faster
    pub threshold_kmh: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            n_points: DEFAULT_GRID_POINTS,
            threshold_kmh: DEFAULT_THRESHOLD_KMH,
        }
    }
}

impl ComparisonConfig {
    pub fn validate(&self) -> Result<(), TrackDeltaError> {
        if self.n_points == 0 {
            return Err(TrackDeltaError::InvalidUserInput {
                field: "n_points".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.threshold_kmh.is_finite() || self.threshold_kmh < 0.0 {
            return Err(TrackDeltaError::InvalidUserInput {
                field: "threshold_kmh".to_string(),
                reason: format!("must be a non-negative number, got {}", self.threshold_kmh),
            });
        }
        Ok(())
    }
}

/// A segment together with how it is displayed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColoredSegment {
    pub segment: Segment,
    pub color: Rgb,
    /// Legend text, e.g. "VER faster" or "Equal pace"
    pub label: String,
}

/// Everything the presentation layer needs to draw a comparison
#[derive(Clone, Debug)]
pub struct Comparison {
    pub driver_a: String,
    pub driver_b: String,
    pub config: ComparisonConfig,
    pub colors: DriverColors,
    pub aligned: AlignedLap,
    /// Speed of driver A minus driver B on every grid point
    pub advantage: Vec<f64>,
    pub segments: Vec<ColoredSegment>,
    /// Average of both drivers' aligned positions
    pub background_track: Vec<(f64, f64)>,
}

impl Comparison {
    /// Segment covering the given grid index
    pub fn segment_at(&self, index: usize) -> Option<&ColoredSegment> {
        let pos = self
            .segments
            .partition_point(|s| s.segment.end_index < index);
        self.segments
            .get(pos)
            .filter(|s| s.segment.start_index <= index)
    }

    pub fn label_for(&self, dominance: Dominance) -> String {
        match dominance {
            Dominance::DriverA => format!("{} faster", self.driver_a),
            Dominance::DriverB => format!("{} faster", self.driver_b),
            Dominance::Equal => "Equal pace".to_string(),
        }
    }
}

/// Result handed to the presentation layer. Failures never escape as errors,
/// they become a placeholder carrying the reason.
#[derive(Clone, Debug)]
pub enum ComparisonMap {
    Available(Box<Comparison>),
    Unavailable { reason: String },
}

impl ComparisonMap {
    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            ComparisonMap::Available(comparison) => Some(comparison),
            ComparisonMap::Unavailable { .. } => None,
        }
    }
}

/// Compare two drivers' fastest laps, propagating the first failure
pub fn compare_drivers<P>(
    provider: &P,
    driver_a: &str,
    driver_b: &str,
    config: &ComparisonConfig,
) -> Result<Comparison, TrackDeltaError>
where
    P: TelemetryProvider + ColorProvider,
{
    if driver_a == driver_b {
        return Err(TrackDeltaError::SameDriver {
            driver: driver_a.to_string(),
        });
    }
    config.validate()?;

    let trace_a = provider.fastest_lap_telemetry(driver_a)?;
    let trace_b = provider.fastest_lap_telemetry(driver_b)?;
    let aligned = align_traces(driver_a, &trace_a, driver_b, &trace_b, config.n_points)?;

    let advantage = speed_advantage(&aligned);
    let segments = segment_advantage(&advantage, config.threshold_kmh);
    let colors = DriverColors::lookup(provider, driver_a, driver_b);
    debug!(
        "{} vs {}: {} segments, colors {} / {}",
        driver_a,
        driver_b,
        segments.len(),
        colors.driver_a,
        colors.driver_b
    );

    let mut comparison = Comparison {
        driver_a: driver_a.to_string(),
        driver_b: driver_b.to_string(),
        config: config.clone(),
        colors,
        background_track: aligned.average_positions(),
        aligned,
        advantage,
        segments: Vec::with_capacity(segments.len()),
    };
    comparison.segments = segments
        .into_iter()
        .map(|segment| ColoredSegment {
            color: colors.for_dominance(segment.dominant),
            label: comparison.label_for(segment.dominant),
            segment,
        })
        .collect();
    Ok(comparison)
}

/// Build the circuit comparison map for two drivers of a session
pub fn build_comparison_map<P>(
    provider: &P,
    driver_a: &str,
    driver_b: &str,
    config: &ComparisonConfig,
) -> ComparisonMap
where
    P: TelemetryProvider + ColorProvider,
{
    match compare_drivers(provider, driver_a, driver_b, config) {
        Ok(comparison) => {
            info!(
                "Built comparison map {} vs {} with {} segments",
                driver_a,
                driver_b,
                comparison.segments.len()
            );
            ComparisonMap::Available(Box::new(comparison))
        }
        Err(e) => {
            warn!("Comparison {} vs {} unavailable: {}", driver_a, driver_b, e);
            ComparisonMap::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{DriverInfo, LapRecord, RawTelemetrySample, Session};

    fn session_with(laps: Vec<(&str, Option<&str>, Vec<(f64, f64)>)>) -> Session {
        let mut session = Session::default();
        for (i, (code, color, points)) in laps.into_iter().enumerate() {
            session.add_driver(DriverInfo {
                code: code.to_string(),
                team_name: format!("Team {}", code),
                team_color: color.map(str::to_string),
            });
            session.add_lap(LapRecord {
                driver: code.to_string(),
                lap_number: i as u32 + 1,
                lap_time_s: Some(90.0),
                samples: points
                    .into_iter()
                    .map(|(d, v)| RawTelemetrySample::at(d, v).with_position(d, 0.0))
                    .collect(),
            });
        }
        session
    }

    fn reference_session() -> Session {
        session_with(vec![
            (
                "AAA",
                Some("#ff0000"),
                vec![(0.0, 100.0), (10.0, 120.0), (20.0, 80.0)],
            ),
            (
                "BBB",
                Some("#0000ff"),
                vec![(0.0, 90.0), (10.0, 90.0), (20.0, 110.0)],
            ),
        ])
    }

    fn config(n_points: usize) -> ComparisonConfig {
        ComparisonConfig {
            n_points,
            threshold_kmh: 0.1,
        }
    }

    #[test]
    fn test_reference_comparison() {
        let session = reference_session();
        let comparison = compare_drivers(&session, "AAA", "BBB", &config(3)).unwrap();

        assert_eq!(comparison.aligned.distance, vec![0.0, 10.0, 20.0]);
        assert_eq!(comparison.advantage, vec![10.0, 30.0, -30.0]);
        assert_eq!(comparison.segments.len(), 2);

        let first = &comparison.segments[0];
        assert_eq!(first.segment.indices(), 0..=1);
        assert_eq!(first.segment.dominant, Dominance::DriverA);
        assert_eq!(first.color, Rgb::new(255, 0, 0));
        assert_eq!(first.label, "AAA faster");

        let second = &comparison.segments[1];
        assert_eq!(second.segment.indices(), 2..=2);
        assert_eq!(second.segment.dominant, Dominance::DriverB);
        assert_eq!(second.color, Rgb::new(0, 0, 255));
        assert_eq!(second.label, "BBB faster");
    }

    #[test]
    fn test_background_track_is_average_position() {
        let session = reference_session();
        let comparison = compare_drivers(&session, "AAA", "BBB", &config(3)).unwrap();
        assert_eq!(
            comparison.background_track,
            vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]
        );
    }

    #[test]
    fn test_same_driver_is_rejected() {
        let session = reference_session();
        match compare_drivers(&session, "AAA", "AAA", &config(3)) {
            Err(TrackDeltaError::SameDriver { driver }) => assert_eq!(driver, "AAA"),
            other => panic!("Expected SameDriver, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let session = reference_session();
        let bad = ComparisonConfig {
            n_points: 10,
            threshold_kmh: -1.0,
        };
        assert!(matches!(
            compare_drivers(&session, "AAA", "BBB", &bad),
            Err(TrackDeltaError::InvalidUserInput { .. })
        ));
        assert!(ComparisonConfig::default().validate().is_ok());
    }

    #[test]
    fn test_failures_become_unavailable() {
        let session = reference_session();
        match build_comparison_map(&session, "AAA", "ZZZ", &config(3)) {
            ComparisonMap::Unavailable { reason } => assert!(reason.contains("ZZZ")),
            ComparisonMap::Available(_) => panic!("Expected an unavailable map"),
        }
        assert!(
            build_comparison_map(&session, "AAA", "AAA", &config(3))
                .comparison()
                .is_none()
        );
    }

    #[test]
    fn test_degenerate_distance_becomes_unavailable() {
        let mut session = reference_session();
        for sample in session.laps[1].samples.iter_mut() {
            sample.distance = Some(f64::NAN);
        }
        match build_comparison_map(&session, "AAA", "BBB", &config(3)) {
            ComparisonMap::Unavailable { reason } => {
                assert!(reason.starts_with("Invalid telemetry for BBB"))
            }
            ComparisonMap::Available(_) => panic!("Expected an unavailable map"),
        }
    }

    #[test]
    fn test_same_team_colors_are_split() {
        let session = session_with(vec![
            ("AAA", Some("#FF8000"), vec![(0.0, 100.0), (10.0, 100.0)]),
            ("BBB", Some("#ff8000"), vec![(0.0, 90.0), (10.0, 90.0)]),
        ]);
        let comparison = compare_drivers(&session, "AAA", "BBB", &config(10)).unwrap();
        assert_ne!(comparison.colors.driver_a, comparison.colors.driver_b);
    }

    #[test]
    fn test_equal_segment_label_and_color() {
        let session = session_with(vec![
            ("AAA", Some("#FF8000"), vec![(0.0, 100.0), (10.0, 100.0)]),
            ("BBB", Some("#00ff00"), vec![(0.0, 100.05), (10.0, 99.95)]),
        ]);
        let comparison = compare_drivers(&session, "AAA", "BBB", &config(5)).unwrap();
        assert_eq!(comparison.segments.len(), 1);
        assert_eq!(comparison.segments[0].label, "Equal pace");
        assert_eq!(comparison.segments[0].color, colors::EQUAL_PACE_COLOR);
    }

    #[test]
    fn test_segment_lookup_by_index() {
        let session = reference_session();
        let comparison = compare_drivers(&session, "AAA", "BBB", &config(3)).unwrap();
        assert_eq!(
            comparison.segment_at(1).map(|s| s.segment.start_index),
            Some(0)
        );
        assert_eq!(
            comparison.segment_at(2).map(|s| s.segment.start_index),
            Some(2)
        );
        assert!(comparison.segment_at(3).is_none());
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let session = session_with(vec![
            (
                "AAA",
                None,
                (0..200).map(|i| (i as f64 * 7.3, 200.0 + (i as f64).sin() * 20.0)).collect(),
            ),
            (
                "BBB",
                None,
                (0..150).map(|i| (i as f64 * 9.1, 200.0 + (i as f64 * 0.7).cos() * 20.0)).collect(),
            ),
        ]);
        let first = compare_drivers(&session, "AAA", "BBB", &config(500)).unwrap();
        let second = compare_drivers(&session, "AAA", "BBB", &config(500)).unwrap();

        assert_eq!(first.segments.len(), second.segments.len());
        for (a, b) in first.segments.iter().zip(second.segments.iter()) {
            assert_eq!(a.segment.indices(), b.segment.indices());
            assert_eq!(a.color, b.color);
        }
        assert_eq!(first.colors, second.colors);
    }
}
