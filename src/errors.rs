// Error types for trackdelta

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum TrackDeltaError {
    // Errors raised by the comparison pipeline
    #[snafu(display("Invalid telemetry for {driver}: {reason}"))]
    InvalidTelemetry { driver: String, reason: String },
    #[snafu(display("Driver {driver} not found in session"))]
    DriverNotFound { driver: String },
    #[snafu(display("No laps recorded for driver {driver}"))]
    NoLapData { driver: String },
    #[snafu(display("Cannot compare {driver} against itself"))]
    SameDriver { driver: String },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // Session file errors
    #[snafu(display("Invalid session file: {path}"))]
    InvalidSessionFile { path: String },
    #[snafu(display("Error loading session file"))]
    SessionLoaderError { source: io::Error },

    // Output errors
    #[snafu(display("Error writing output file"))]
    ExportError { source: io::Error },
    #[snafu(display("Error serializing aligned telemetry"))]
    ExportSerializeError { source: serde_json::Error },
    #[snafu(display("SVG generation failed: {reason}"))]
    SvgGenerationError { reason: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}
