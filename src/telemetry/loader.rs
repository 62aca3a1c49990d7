use std::path::Path;

use log::{info, warn};

use super::{Session, SessionRecord, normalize_session_type};
use crate::TrackDeltaError;

/// Load a session from a JSON Lines file, one `SessionRecord` per line.
pub fn load_session_jsonl(source_file: &Path) -> Result<Session, TrackDeltaError> {
    if !source_file.exists() {
        return Err(TrackDeltaError::InvalidSessionFile {
            path: format!("{:?}", source_file),
        });
    }

    // TODO: stream laps lazily instead of collecting the whole file up front
    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| TrackDeltaError::SessionLoaderError { source: e })?
        .collect::<Result<Vec<SessionRecord>, std::io::Error>>()
        .map_err(|e| TrackDeltaError::SessionLoaderError { source: e })?;

    let mut session = Session::default();
    for record in records {
        match record {
            SessionRecord::SessionInfo(mut session_info) => {
                session_info.session_type = normalize_session_type(&session_info.session_type);
                session.info = session_info;
            }
            SessionRecord::Driver(driver) => {
                if session.driver(&driver.code).is_some() {
                    warn!("Duplicate roster entry for {}, keeping the first", driver.code);
                    continue;
                }
                session.add_driver(driver);
            }
            SessionRecord::Lap(lap) => session.add_lap(lap),
        }
    }

    let orphan_laps = session
        .laps
        .iter()
        .filter(|lap| session.driver(&lap.driver).is_none())
        .count();
    if orphan_laps > 0 {
        warn!(
            "{} laps in {:?} belong to drivers missing from the roster",
            orphan_laps, source_file
        );
    }

    info!(
        "Loaded {:?}: {} {}, {} drivers with a total of {} laps",
        source_file,
        session.info.event_name,
        session.info.session_type,
        session.drivers.len(),
        session.laps.len()
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{
        DriverInfo, LapRecord, RawTelemetrySample, SessionInfo, TelemetryProvider,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_session_file() {
        let records = vec![
            SessionRecord::SessionInfo(SessionInfo {
                year: Some(2024),
                event_name: "Italian Grand Prix".to_string(),
                session_type: "FP2".to_string(),
            }),
            SessionRecord::Driver(DriverInfo {
                code: "LEC".to_string(),
                team_name: "Ferrari".to_string(),
                team_color: Some("#E8002D".to_string()),
            }),
            SessionRecord::Lap(LapRecord {
                driver: "LEC".to_string(),
                lap_number: 1,
                lap_time_s: Some(81.2),
                samples: vec![
                    RawTelemetrySample::at(0.0, 280.0),
                    RawTelemetrySample::at(5793.0, 300.0),
                ],
            }),
        ];
        let file = NamedTempFile::new().unwrap();
        serde_jsonlines::write_json_lines(file.path(), &records).unwrap();

        let session = load_session_jsonl(file.path()).unwrap();
        assert_eq!(session.info.session_type, "Practice 2");
        assert_eq!(session.info.year, Some(2024));
        assert_eq!(session.driver_codes(), vec!["LEC"]);
        assert_eq!(session.fastest_lap_telemetry("LEC").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_roster_entries_are_ignored() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"{{"Driver":{{"code":"NOR","team_name":"McLaren","team_color":"#FF8000"}}}}"##
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"Driver":{{"code":"NOR","team_name":"Someone Else"}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let session = load_session_jsonl(file.path()).unwrap();
        assert_eq!(session.drivers.len(), 1);
        assert_eq!(session.drivers[0].team_name, "McLaren");
    }

    #[test]
    fn test_lap_with_float_gear_values_loads() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"Driver":{{"code":"HUL","team_name":"Haas"}}}}"#).unwrap();
        let lap = serde_json::json!({"Lap": {
            "driver": "HUL",
            "lap_number": 1,
            "samples": [
                {"distance": 0.0, "speed": 90.0, "gear": 7.0, "drs": null},
                {"distance": 5.0, "speed": 95.0, "gear": null, "drs": 8.0}
            ]
        }});
        // floats keep their decimal point when written
        assert!(lap.to_string().contains(r#""gear":7.0"#));
        writeln!(file, "{}", lap).unwrap();
        file.flush().unwrap();

        let session = load_session_jsonl(file.path()).unwrap();
        let samples = session.fastest_lap_telemetry("HUL").unwrap();
        assert_eq!(samples[0].gear, Some(7.0));
        assert_eq!(samples[1].gear, None);
        assert_eq!(samples[1].drs, Some(8.0));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = load_session_jsonl(Path::new("/definitely/not/here.jsonl"));
        match result {
            Err(TrackDeltaError::InvalidSessionFile { .. }) => {}
            other => panic!("Expected InvalidSessionFile, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_is_a_loader_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"NotARecord\": 1}}").unwrap();
        file.flush().unwrap();

        match load_session_jsonl(file.path()) {
            Err(TrackDeltaError::SessionLoaderError { .. }) => {}
            other => panic!("Expected SessionLoaderError, got {:?}", other),
        }
    }
}
