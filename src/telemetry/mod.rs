pub mod loader;
pub mod session;

pub use loader::load_session_jsonl;
pub use session::Session;

use serde::{Deserialize, Serialize};

use crate::TrackDeltaError;

/// One telemetry sample as recorded for a driver's lap.
///
/// Every channel is optional: a sample with a missing channel is kept as a row
/// and the channel reads as NaN once it is resampled.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawTelemetrySample {
    /// Meters traveled from S/F this lap
    pub distance: Option<f64>,
    /// Track position, X axis
    pub x: Option<f64>,
    /// Track position, Y axis
    pub y: Option<f64>,
    /// Speed in km/h
    pub speed: Option<f64>,
    /// Throttle use. 0=off throttle to 100=full throttle
    pub throttle: Option<f64>,
    /// Brake use, either on/off (0/1) or analog
    pub brake: Option<f64>,
    /// Current gear. Stored as a float so exports that write `7.0` still load
    pub gear: Option<f64>,
    /// Drag reduction system state, 0=closed 1=open
    pub drs: Option<f64>,
}

impl RawTelemetrySample {
    /// Sample carrying only distance and speed, the two channels the segmenter needs.
    pub fn at(distance: f64, speed: f64) -> Self {
        Self {
            distance: Some(distance),
            speed: Some(speed),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Read a channel as a float, NaN when it was not recorded
    pub fn channel(&self, channel: Channel) -> f64 {
        let value = match channel {
            Channel::X => self.x,
            Channel::Y => self.y,
            Channel::Speed => self.speed,
            Channel::Throttle => self.throttle,
            Channel::Brake => self.brake,
            Channel::Gear => self.gear,
            Channel::Drs => self.drs,
        };
        value.unwrap_or(f64::NAN)
    }
}

/// Channels carried through distance alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    X,
    Y,
    Speed,
    Throttle,
    Brake,
    Gear,
    Drs,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::X,
        Channel::Y,
        Channel::Speed,
        Channel::Throttle,
        Channel::Brake,
        Channel::Gear,
        Channel::Drs,
    ];
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriverInfo {
    /// Three letter driver abbreviation (e.g. "VER")
    pub code: String,
    pub team_name: String,
    /// Team color as a hex string, when the session provides one
    #[serde(default)]
    pub team_color: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapRecord {
    /// Code of the driver who set the lap
    pub driver: String,
    pub lap_number: u32,
    /// Lap time in seconds, missing for laps without a valid timing
    #[serde(default)]
    pub lap_time_s: Option<f64>,
    #[serde(default)]
    pub samples: Vec<RawTelemetrySample>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    #[serde(default)]
    pub year: Option<u32>,
    pub event_name: String,
    pub session_type: String,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            year: None,
            event_name: "Unknown".to_string(),
            session_type: "Unknown".to_string(),
        }
    }
}

/// Expand the short session names used on the command line and in files.
/// Names that are not abbreviations are returned unchanged.
pub fn normalize_session_type(session_type: &str) -> String {
    match session_type.trim().to_uppercase().as_str() {
        "FP1" => "Practice 1".to_string(),
        "FP2" => "Practice 2".to_string(),
        "FP3" => "Practice 3".to_string(),
        "QUALIFYING" => "Qualifying".to_string(),
        "RACE" => "Race".to_string(),
        _ => session_type.to_string(),
    }
}

/// A line in a session file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionRecord {
    SessionInfo(SessionInfo),
    Driver(DriverInfo),
    Lap(LapRecord),
}

/// Source of per-driver fastest lap telemetry for one session
pub trait TelemetryProvider {
    /// Telemetry of the driver's fastest lap, in recorded order.
    ///
    /// Fails with `DriverNotFound` when the code is not on the session roster and
    /// with `NoLapData` when the driver has no recorded laps.
    fn fastest_lap_telemetry(
        &self,
        driver_code: &str,
    ) -> Result<Vec<RawTelemetrySample>, TrackDeltaError>;
}

/// Best-effort team color lookup
pub trait ColorProvider {
    fn team_color(&self, driver_code: &str) -> Option<String>;
}
