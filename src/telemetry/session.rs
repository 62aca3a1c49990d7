use log::debug;

use crate::TrackDeltaError;

use super::{
    ColorProvider, DriverInfo, LapRecord, RawTelemetrySample, SessionInfo, TelemetryProvider,
};

/// A loaded session: driver roster plus every recorded lap
#[derive(Default, Clone, Debug)]
pub struct Session {
    pub info: SessionInfo,
    pub drivers: Vec<DriverInfo>,
    pub laps: Vec<LapRecord>,
}

impl Session {
    pub fn new(info: SessionInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    pub fn add_driver(&mut self, driver: DriverInfo) {
        self.drivers.push(driver);
    }

    pub fn add_lap(&mut self, lap: LapRecord) {
        self.laps.push(lap);
    }

    /// Driver abbreviations in roster order
    pub fn driver_codes(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.code.as_str()).collect()
    }

    pub fn driver(&self, driver_code: &str) -> Option<&DriverInfo> {
        self.drivers.iter().find(|d| d.code == driver_code)
    }

    pub fn laps_for(&self, driver_code: &str) -> Vec<&LapRecord> {
        self.laps.iter().filter(|l| l.driver == driver_code).collect()
    }

    /// The driver's quickest timed lap. When none of the laps carries a valid
    /// time the lowest numbered lap is returned instead.
    pub fn fastest_lap(&self, driver_code: &str) -> Result<&LapRecord, TrackDeltaError> {
        if self.driver(driver_code).is_none() {
            return Err(TrackDeltaError::DriverNotFound {
                driver: driver_code.to_string(),
            });
        }

        let timed_fastest = self
            .laps_for(driver_code)
            .into_iter()
            .filter_map(|lap| match lap.lap_time_s {
                Some(t) if t.is_finite() => Some((t, lap)),
                _ => None,
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, lap)| lap);

        match timed_fastest {
            Some(lap) => Ok(lap),
            None => {
                let first = self
                    .laps_for(driver_code)
                    .into_iter()
                    .min_by_key(|lap| lap.lap_number)
                    .ok_or_else(|| TrackDeltaError::NoLapData {
                        driver: driver_code.to_string(),
                    })?;
                debug!(
                    "No timed laps for {}, falling back to lap {}",
                    driver_code, first.lap_number
                );
                Ok(first)
            }
        }
    }
}

impl TelemetryProvider for Session {
    fn fastest_lap_telemetry(
        &self,
        driver_code: &str,
    ) -> Result<Vec<RawTelemetrySample>, TrackDeltaError> {
        let lap = self.fastest_lap(driver_code)?;
        debug!(
            "Fastest lap for {} is lap {} with {} samples",
            driver_code,
            lap.lap_number,
            lap.samples.len()
        );
        Ok(lap.samples.clone())
    }
}

impl ColorProvider for Session {
    fn team_color(&self, driver_code: &str) -> Option<String> {
        self.driver(driver_code)?.team_color.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(code: &str, color: Option<&str>) -> DriverInfo {
        DriverInfo {
            code: code.to_string(),
            team_name: format!("{} Racing", code),
            team_color: color.map(str::to_string),
        }
    }

    fn lap(code: &str, lap_number: u32, lap_time_s: Option<f64>, speed: f64) -> LapRecord {
        LapRecord {
            driver: code.to_string(),
            lap_number,
            lap_time_s,
            samples: vec![
                RawTelemetrySample::at(0.0, speed),
                RawTelemetrySample::at(100.0, speed),
            ],
        }
    }

    fn test_session() -> Session {
        let mut session = Session::default();
        session.add_driver(driver("VER", Some("#3671C6")));
        session.add_driver(driver("LEC", None));
        session.add_driver(driver("HAM", None));
        session.add_lap(lap("VER", 1, Some(92.4), 200.0));
        session.add_lap(lap("VER", 2, Some(90.1), 250.0));
        session.add_lap(lap("VER", 3, None, 100.0));
        session.add_lap(lap("LEC", 4, None, 150.0));
        session.add_lap(lap("LEC", 2, Some(f64::NAN), 140.0));
        session
    }

    #[test]
    fn test_fastest_lap_picks_minimum_time() {
        let session = test_session();
        let lap = session.fastest_lap("VER").unwrap();
        assert_eq!(lap.lap_number, 2);
    }

    #[test]
    fn test_fastest_lap_falls_back_to_first_untimed_lap() {
        let session = test_session();
        let lap = session.fastest_lap("LEC").unwrap();
        assert_eq!(lap.lap_number, 2);
    }

    #[test]
    fn test_unknown_driver_is_not_found() {
        let session = test_session();
        match session.fastest_lap_telemetry("ALO") {
            Err(TrackDeltaError::DriverNotFound { driver }) => assert_eq!(driver, "ALO"),
            other => panic!("Expected DriverNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_driver_without_laps_has_no_lap_data() {
        let session = test_session();
        match session.fastest_lap_telemetry("HAM") {
            Err(TrackDeltaError::NoLapData { driver }) => assert_eq!(driver, "HAM"),
            other => panic!("Expected NoLapData, got {:?}", other),
        }
    }

    #[test]
    fn test_fastest_lap_telemetry_returns_samples() {
        let session = test_session();
        let samples = session.fastest_lap_telemetry("VER").unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].speed, Some(250.0));
    }

    #[test]
    fn test_team_color_lookup() {
        let session = test_session();
        assert_eq!(session.team_color("VER").as_deref(), Some("#3671C6"));
        assert_eq!(session.team_color("LEC"), None);
        assert_eq!(session.team_color("ALO"), None);
        assert_eq!(session.driver_codes(), vec!["VER", "LEC", "HAM"]);
    }
}
