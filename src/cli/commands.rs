//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use walkdir::WalkDir;

use crate::cli::EncodeArgs;
use crate::codec::Pipeline;
use crate::error::Result;
use crate::output::{write_outputs, OutputPaths, RunManifest};
use crate::query::{query_path, write_query_file, SplitLength};

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub encoded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Encode one source with an already validated pipeline
pub fn encode_source(
    pipeline: &Pipeline,
    source: &Path,
    output_dir: Option<&Path>,
    manifest: bool,
) -> Result<OutputPaths> {
    info!("Encoding: {}", source.display());

    let paths = OutputPaths::for_source(source, output_dir, pipeline.config());
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let output = pipeline.run(source)?;
    write_outputs(&output, &paths)?;

    if manifest {
        RunManifest::new(source, pipeline.config(), &output, &paths)?.save(&paths.manifest)?;
    }

    let stats = output.encoding.symbols.stats();
    println!(
        "{}: {} samples -> {} symbols (U {} / D {} / S {})",
        source.display(),
        output.original.len(),
        stats.total(),
        stats.up,
        stats.down,
        stats.same
    );

    Ok(paths)
}

/// Encode a single WAV file.
pub fn encode(input: &Path, options: &EncodeArgs) -> Result<()> {
    let pipeline = Pipeline::new(options.to_config()?)?;
    let paths = encode_source(&pipeline, input, options.output_dir.as_deref(), options.manifest)?;

    println!("Reduced: {}", paths.reduced_wav.display());
    println!("UDS text: {}", paths.uds_text.display());
    println!("UDS audio: {}", paths.uds_wav.display());

    Ok(())
}

/// Encode every WAV file under a directory.
///
/// With an output directory, each source's path relative to `dir` is kept
/// below it, so equal file names in different subdirectories do not collide.
/// Files that fail are reported in the summary instead of stopping the run.
pub fn batch(dir: &Path, options: &EncodeArgs) -> Result<BatchSummary> {
    let pipeline = Pipeline::new(options.to_config()?)?;
    let mut summary = BatchSummary::default();

    for source in find_sources(dir) {
        let output_dir = batch_output_dir(dir, &source, options.output_dir.as_deref());
        match encode_source(
            &pipeline,
            &source,
            output_dir.as_deref(),
            options.manifest,
        ) {
            Ok(_) => summary.encoded.push(source),
            Err(e) => {
                warn!("Skipping {}: {} ({})", source.display(), e, e.error_code());
                summary.failed.push((source, e.to_string()));
            }
        }
    }

    println!(
        "Batch complete: {} encoded, {} failed",
        summary.encoded.len(),
        summary.failed.len()
    );

    Ok(summary)
}

/// Output directory for one batch source: `output_dir` joined with the
/// source's parent relative to `dir`
fn batch_output_dir(dir: &Path, source: &Path, output_dir: Option<&Path>) -> Option<PathBuf> {
    let output_dir = output_dir?;
    let relative = source
        .parent()
        .and_then(|parent| parent.strip_prefix(dir).ok())
        .filter(|relative| !relative.as_os_str().is_empty());

    Some(match relative {
        Some(relative) => output_dir.join(relative),
        None => output_dir.to_path_buf(),
    })
}

/// Split a UDS text file into queries.
pub fn query(
    input: &Path,
    split: SplitLength,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| query_path(input));

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let count = write_query_file(input, &output, split, &mut rng)?;
    println!("{} queries written to {}", count, output.display());

    Ok(())
}

/// WAV sources under `dir`, sorted, skipping files this tool wrote
pub fn find_sources(dir: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .filter(|path| !is_generated(path))
        .collect();
    sources.sort();
    sources
}

fn is_generated(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.contains("_reduced_R") || stem.contains("_UDS_R"))
}
