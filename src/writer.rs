use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{TrackDeltaError, comparison::AlignedLap};

/// Write the aligned lap as JSON Lines, one aligned sample per grid point.
/// Channels a driver never recorded are written as `null`.
pub fn write_aligned_lap(file: &Path, aligned: &AlignedLap) -> Result<(), TrackDeltaError> {
    let output_file = File::create(file).map_err(|e| TrackDeltaError::ExportError { source: e })?;
    let mut output_writer = BufWriter::new(output_file);
    for sample in aligned.samples() {
        let line = serde_json::to_string(&sample)
            .map_err(|e| TrackDeltaError::ExportSerializeError { source: e })?;
        writeln!(output_writer, "{}", line)
            .map_err(|e| TrackDeltaError::ExportError { source: e })?;
    }
    output_writer
        .flush()
        .map_err(|e| TrackDeltaError::ExportError { source: e })?;
    info!("Wrote {} aligned samples to {:?}", aligned.len(), file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::align_traces;
    use crate::telemetry::RawTelemetrySample;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_aligned_lap() {
        let trace_a = vec![RawTelemetrySample::at(0.0, 100.0), RawTelemetrySample::at(10.0, 120.0)];
        let trace_b = vec![RawTelemetrySample::at(0.0, 90.0), RawTelemetrySample::at(10.0, 90.0)];
        let aligned = align_traces("AAA", &trace_a, "BBB", &trace_b, 3).unwrap();

        let file = NamedTempFile::new().unwrap();
        write_aligned_lap(file.path(), &aligned).unwrap();

        let rows = serde_jsonlines::json_lines(file.path())
            .unwrap()
            .collect::<Result<Vec<serde_json::Value>, std::io::Error>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["distance"], 5.0);
        assert_eq!(rows[1]["driver_a"]["speed"], 110.0);
        assert_eq!(rows[1]["driver_b"]["speed"], 90.0);
        assert!(rows[1]["driver_a"]["gear"].is_null());
    }

    #[test]
    fn test_unwritable_path_fails() {
        let aligned = AlignedLap::default();
        let result = write_aligned_lap(Path::new("/nonexistent/dir/out.jsonl"), &aligned);
        assert!(matches!(result, Err(TrackDeltaError::ExportError { .. })));
    }
}
