//! Output writer
//!
//! Serializes a pipeline run: the reduced waveform, the reconstructed
//! waveform and the UDS text, under names that encode the configuration.
//! Optionally records a JSON manifest of the run next to them.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::pipeline::PipelineOutput;
use crate::codec::symbol::UdsStats;
use crate::config::EncoderConfig;
use crate::engine::io::{write_text, write_waveform};
use crate::error::Result;

// ============================================================================
// Output paths
// ============================================================================

/// File names for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub reduced_wav: PathBuf,
    pub uds_text: PathBuf,
    pub uds_wav: PathBuf,
    pub manifest: PathBuf,
}

impl OutputPaths {
    /// Build names like `<name>_reduced_R<r>_M<m>.wav` inside `dir`
    pub fn new(dir: &Path, name: &str, config: &EncoderConfig) -> Self {
        let r = config.block_size;
        let m = config.strategy.id();
        let d = config.threshold_label();
        let uds_stem = format!("{}_UDS_R{}_M{}_D{}", name, r, m, d);

        OutputPaths {
            reduced_wav: dir.join(format!("{}_reduced_R{}_M{}.wav", name, r, m)),
            uds_text: dir.join(format!("{}.txt", uds_stem)),
            uds_wav: dir.join(format!("{}.wav", uds_stem)),
            manifest: dir.join(format!("{}.json", uds_stem)),
        }
    }

    /// Names for a source file, placed in `dir` or next to the source
    pub fn for_source(source: &Path, dir: Option<&Path>, config: &EncoderConfig) -> Self {
        let name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let dir = dir
            .map(Path::to_path_buf)
            .or_else(|| source.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self::new(&dir, &name, config)
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Write the two waveforms and the UDS text
///
/// If any write fails, the files already written for this run are removed
/// so a run leaves either all three outputs or none.
pub fn write_outputs(output: &PipelineOutput, paths: &OutputPaths) -> Result<()> {
    let mut written: Vec<&Path> = Vec::with_capacity(3);
    let result = write_all(output, paths, &mut written);

    if let Err(e) = &result {
        for path in written {
            match fs::remove_file(path) {
                Ok(()) => warn!("Removed partial output {} after: {}", path.display(), e),
                Err(remove_err) => warn!(
                    "Could not remove partial output {}: {}",
                    path.display(),
                    remove_err
                ),
            }
        }
    }

    result
}

fn write_all<'a>(
    output: &PipelineOutput,
    paths: &'a OutputPaths,
    written: &mut Vec<&'a Path>,
) -> Result<()> {
    let reduced = &output.reduced;
    write_waveform(
        &paths.reduced_wav,
        &reduced.quantized(),
        reduced.sample_rate(),
        reduced.bits_per_sample(),
    )?;
    written.push(&paths.reduced_wav);
    info!("Reduced .WAV file written to {}", paths.reduced_wav.display());

    write_text(&paths.uds_text, &output.encoding.symbols.to_string())?;
    written.push(&paths.uds_text);
    info!("UDS text written to {}", paths.uds_text.display());

    let reconstructed = &output.encoding.reconstructed;
    write_waveform(
        &paths.uds_wav,
        &reconstructed.quantized(),
        reconstructed.sample_rate(),
        reconstructed.bits_per_sample(),
    )?;
    written.push(&paths.uds_wav);
    info!("UDS .WAV file written to {}", paths.uds_wav.display());

    Ok(())
}

// ============================================================================
// Manifest
// ============================================================================

/// A written file and its checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub sha256: String,
}

/// Durable record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub source: PathBuf,
    pub config: EncoderConfig,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub num_samples: usize,
    pub num_blocks: usize,
    pub symbols: UdsStats,
    /// Source samples per emitted symbol
    pub reduction_ratio: f64,
    pub outputs: Vec<OutputFile>,
    pub created_at: DateTime<Utc>,
}

impl RunManifest {
    /// Describe a run whose outputs have already been written
    pub fn new(
        source: &Path,
        config: &EncoderConfig,
        output: &PipelineOutput,
        paths: &OutputPaths,
    ) -> Result<Self> {
        let symbols = output.encoding.symbols.stats();
        let num_samples = output.original.len();
        let reduction_ratio = if symbols.total() == 0 {
            0.0
        } else {
            num_samples as f64 / symbols.total() as f64
        };

        let outputs = [&paths.reduced_wav, &paths.uds_text, &paths.uds_wav]
            .into_iter()
            .map(|path| -> Result<OutputFile> {
                Ok(OutputFile {
                    path: path.clone(),
                    sha256: sha256_file(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source: source.to_path_buf(),
            config: config.clone(),
            sample_rate: output.original.sample_rate(),
            bits_per_sample: output.original.bits_per_sample(),
            num_samples,
            num_blocks: output.reduced.block_count(),
            symbols,
            reduction_ratio,
            outputs,
            created_at: Utc::now(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Run manifest written to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Hex SHA-256 of a file's contents
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
