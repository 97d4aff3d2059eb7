//! Query generation from UDS text
//!
//! Splits a UDS character stream into chunks and keeps every other chunk,
//! starting with the first. Chunks are either a fixed length or drawn at
//! random per chunk. Only the text format is shared with the encoder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use rand::Rng;

use crate::codec::symbol::UdsSequence;
use crate::engine::io::{read_text, write_text};
use crate::error::{Result, UdsError};

/// Shortest random chunk length
pub const RANDOM_SPLIT_MIN: usize = 1;

/// Longest random chunk length
pub const RANDOM_SPLIT_MAX: usize = 15;

/// How long each chunk is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitLength {
    /// Every chunk has this many symbols (the last one may be shorter)
    Fixed(usize),
    /// Each chunk length is drawn from `RANDOM_SPLIT_MIN..=RANDOM_SPLIT_MAX`
    Random,
}

impl SplitLength {
    pub fn fixed(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(UdsError::InvalidSplitLength {
                value: len.to_string(),
            });
        }
        Ok(SplitLength::Fixed(len))
    }

    fn next_len<R: Rng>(self, rng: &mut R) -> usize {
        match self {
            SplitLength::Fixed(len) => len,
            SplitLength::Random => rng.random_range(RANDOM_SPLIT_MIN..=RANDOM_SPLIT_MAX),
        }
    }
}

impl FromStr for SplitLength {
    type Err = UdsError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "rand" | "random" => Ok(SplitLength::Random),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|&len| len > 0)
                .map(SplitLength::Fixed)
                .ok_or_else(|| UdsError::InvalidSplitLength {
                    value: trimmed.to_string(),
                }),
        }
    }
}

impl fmt::Display for SplitLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitLength::Fixed(len) => write!(f, "{}", len),
            SplitLength::Random => write!(f, "random"),
        }
    }
}

/// Split `text` into chunks and keep the chunks at even positions
pub fn generate_queries<R: Rng>(
    text: &str,
    split: SplitLength,
    rng: &mut R,
) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut queries = Vec::new();
    let mut keep = true;
    let mut start = 0;

    while start < chars.len() {
        let end = (start + split.next_len(rng)).min(chars.len());
        if keep {
            queries.push(chars[start..end].iter().collect());
        }
        keep = !keep;
        start = end;
    }

    queries
}

/// Kept chunks, each followed by a newline
pub fn format_queries(queries: &[String]) -> String {
    queries.iter().map(|q| format!("{}\n", q)).collect()
}

/// `<dir>/<stem>_QUERY.txt` for a UDS text file
pub fn query_path(uds_text: &Path) -> PathBuf {
    let stem = uds_text
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "uds".to_string());
    uds_text.with_file_name(format!("{}_QUERY.txt", stem))
}

/// Read a UDS text file, generate queries and write them out
///
/// The text is parsed as a UDS sequence first, so a file with characters
/// outside the alphabet fails with `InvalidSymbol` and nothing is written.
/// Returns the number of queries written.
pub fn write_query_file<R: Rng>(
    uds_text: &Path,
    output: &Path,
    split: SplitLength,
    rng: &mut R,
) -> Result<usize> {
    let sequence: UdsSequence = read_text(uds_text)?.parse()?;
    let queries = generate_queries(&sequence.to_string(), split, rng);
    write_text(output, &format_queries(&queries))?;
    info!(
        "Queries generated: {} (split {}) written to {}",
        queries.len(),
        split,
        output.display()
    );
    Ok(queries.len())
}
