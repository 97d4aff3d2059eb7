//! Audio file I/O for the UDS encoder
//!
//! Reads mono integer PCM WAV sources at their native width and writes
//! waveforms back at the same rate and bit depth. Also handles the UDS text
//! stream, which is a plain run of symbol characters.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};

use crate::engine::sequence::{SampleSequence, MONO};
use crate::error::{wav_write_error, Result, UdsError};

/// Number of samples covering `duration_secs` at `sample_rate`
pub fn requested_sample_count(duration_secs: f64, sample_rate: u32) -> usize {
    (duration_secs * sample_rate as f64).round() as usize
}

/// Load the first `max_duration_secs` of a mono WAV file
///
/// # Arguments
/// * `path` - Path to the WAV file
/// * `max_duration_secs` - Length to keep from the start of the source
/// * `expected_sample_rate` - If set, the source must use this rate
///
/// # Errors
/// * `SourceNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `UnsupportedFormat` - If the source is not mono integer PCM at the expected rate
/// * `InvalidDuration` - If the source is shorter than the requested duration
pub fn load_samples(
    path: &Path,
    max_duration_secs: f64,
    expected_sample_rate: Option<u32>,
) -> Result<SampleSequence> {
    if !path.exists() {
        return Err(UdsError::SourceNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| UdsError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    check_source_spec(&spec, expected_sample_rate)?;

    // Frame count comes from the header, so the bounds check happens before
    // any sample is read.
    let available_samples = reader.duration() as usize;
    let requested_samples = requested_sample_count(max_duration_secs, spec.sample_rate);
    if requested_samples > available_samples {
        return Err(UdsError::InvalidDuration {
            requested_secs: max_duration_secs,
            requested_samples,
            available_samples,
        });
    }

    let samples = read_int_samples(reader, requested_samples)?;

    info!(
        "WAV file read. Rate = {}, Length = {}",
        spec.sample_rate,
        samples.len()
    );

    Ok(SampleSequence::new(
        samples,
        spec.sample_rate,
        spec.bits_per_sample,
    ))
}

/// Write integer samples as a mono PCM WAV file
pub fn write_waveform(
    path: &Path,
    samples: &[i32],
    sample_rate: u32,
    bits_per_sample: u16,
) -> Result<()> {
    debug!("Writing WAV file to {}", path.display());

    let spec = WavSpec {
        channels: MONO,
        sample_rate,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_write_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(wav_write_error)?;
    }
    writer.finalize().map_err(wav_write_error)?;

    debug!("Finished writing {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// Write a UDS character stream with no separators
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    debug!("Wrote {} symbols to {}", contents.len(), path.display());
    Ok(())
}

/// Read a UDS character stream, dropping surrounding whitespace
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(UdsError::SourceNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn check_source_spec(spec: &WavSpec, expected_sample_rate: Option<u32>) -> Result<()> {
    if spec.channels != MONO {
        return Err(UdsError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono supported)", spec.channels),
        });
    }

    if spec.sample_format != SampleFormat::Int {
        return Err(UdsError::UnsupportedFormat {
            format: format!("{}-bit float audio (only integer PCM supported)", spec.bits_per_sample),
        });
    }

    if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(UdsError::UnsupportedFormat {
            format: format!("{}-bit integer audio", spec.bits_per_sample),
        });
    }

    match expected_sample_rate {
        Some(rate) if rate != spec.sample_rate => Err(UdsError::UnsupportedFormat {
            format: format!("{} Hz audio (expected {} Hz)", spec.sample_rate, rate),
        }),
        _ => Ok(()),
    }
}

/// Read the first `count` samples without rescaling
fn read_int_samples<R: std::io::Read>(mut reader: WavReader<R>, count: usize) -> Result<Vec<i32>> {
    let bits = reader.spec().bits_per_sample;
    let samples = reader
        .samples::<i32>()
        .take(count)
        .collect::<std::result::Result<Vec<i32>, _>>()
        .map_err(|e| UdsError::InvalidAudio {
            reason: format!("Failed to read {}-bit samples: {}", bits, e),
            source: Some(Box::new(e)),
        })?;

    // A header that overstates its length surfaces here instead of as a short read.
    if samples.len() < count {
        return Err(UdsError::InvalidAudio {
            reason: format!("Expected {} samples, found {}", count, samples.len()),
            source: None,
        });
    }

    Ok(samples)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_fixture(path: &Path, spec: WavSpec, samples: &[i32]) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn mono_spec(sample_rate: u32, bits_per_sample: u16) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_requested_sample_count_rounds() {
        assert_eq!(requested_sample_count(1.0, 44100), 44100);
        assert_eq!(requested_sample_count(0.5, 8001), 4001);
        assert_eq!(requested_sample_count(0.0001, 8000), 1);
    }

    #[test]
    fn test_load_truncates_to_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i32> = (0..100).collect();
        write_fixture(&path, mono_spec(100, 16), &samples);

        let seq = load_samples(&path, 0.5, None).unwrap();
        assert_eq!(seq.len(), 50);
        assert_eq!(seq.samples(), &samples[..50]);
        assert_eq!(seq.sample_rate(), 100);
        assert_eq!(seq.bits_per_sample(), 16);
    }

    #[test]
    fn test_load_exact_length_is_allowed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exact.wav");
        write_fixture(&path, mono_spec(10, 16), &[1; 20]);

        let seq = load_samples(&path, 2.0, None).unwrap();
        assert_eq!(seq.len(), 20);
    }

    #[test]
    fn test_load_rejects_duration_past_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_fixture(&path, mono_spec(10, 16), &[1; 20]);

        match load_samples(&path, 3.0, None).unwrap_err() {
            UdsError::InvalidDuration {
                requested_samples,
                available_samples,
                ..
            } => {
                assert_eq!(requested_samples, 30);
                assert_eq!(available_samples, 20);
            }
            other => panic!("Expected InvalidDuration, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_preserves_native_width() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.wav");
        let samples = vec![8_000_000, -8_000_000, 12345];
        write_fixture(&path, mono_spec(3, 24), &samples);

        let seq = load_samples(&path, 1.0, None).unwrap();
        assert_eq!(seq.samples(), &samples[..]);
        assert_eq!(seq.bits_per_sample(), 24);
    }

    #[test]
    fn test_load_rejects_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            ..mono_spec(10, 16)
        };
        write_fixture(&path, spec, &[0; 40]);

        assert!(matches!(
            load_samples(&path, 1.0, None),
            Err(UdsError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unexpected_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rate.wav");
        write_fixture(&path, mono_spec(22050, 16), &[0; 100]);

        assert!(matches!(
            load_samples(&path, 0.001, Some(44100)),
            Err(UdsError::UnsupportedFormat { .. })
        ));
        assert!(load_samples(&path, 0.001, Some(22050)).is_ok());
    }

    #[test]
    fn test_load_nonexistent_file() {
        match load_samples(Path::new("/nonexistent/path/audio.wav"), 1.0, None).unwrap_err() {
            UdsError::SourceNotFound { path, .. } => assert!(path.contains("nonexistent")),
            other => panic!("Expected SourceNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        fs::write(&path, b"definitely not a wav file").unwrap();

        assert!(matches!(
            load_samples(&path, 1.0, None),
            Err(UdsError::InvalidAudio { .. })
        ));
    }

    #[test]
    fn test_write_waveform_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = vec![0, 100, -100, 32767, -32768];

        write_waveform(&path, &samples, 44100, 16).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        let read: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_text_round_trip_trims() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uds.txt");
        write_text(&path, "BSUD").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "BSUD");

        fs::write(&path, "BSUD\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "BSUD");
    }
}
