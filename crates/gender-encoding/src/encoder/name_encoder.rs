use std::borrow::Cow;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use super::{charmap, params::EncoderParams};

/// Minimum number of names to consider parallelization
const MIN_NAMES_FOR_PARALLEL: usize = 100;

/// Minimum total character count to consider parallelization
const MIN_CHARS_FOR_PARALLEL: usize = 10_000;

/// Encodes batches of raw names into a fixed-shape numeric matrix.
///
/// Every name becomes one row of exactly `sequence_length` cells holding
/// integer-valued floats in `[0, 26]`. Encoding is total: any string,
/// including the empty string, yields a valid row.
#[derive(Clone, Debug)]
pub struct NameEncoder {
    params: EncoderParams,
}

impl NameEncoder {
    pub fn new(params: impl Into<EncoderParams>) -> Self {
        Self {
            params: params.into(),
        }
    }

    #[must_use]
    pub fn sequence_length(&self) -> usize {
        self.params.sequence_length()
    }

    /// Encode a batch of names into an `[names.len(), sequence_length]`
    /// matrix, one row per name in input order.
    ///
    /// Per name: lowercase, split into codepoints, right-pad or truncate to
    /// the sequence length, then map each character through the a-z
    /// alphabet with everything else collapsing to 0.
    pub fn encode<T: AsRef<str> + Sync>(&self, names: &[T]) -> Array2<f32> {
        debug!(num_names = names.len(), "Encoding name batch");
        let sequence_length = self.sequence_length();

        let cells = if should_use_parallel(names) {
            encode_rows_par(names, sequence_length)
        } else {
            encode_rows(names, sequence_length)
        };

        Array2::from_shape_vec((names.len(), sequence_length), cells)
            .expect("every encoded row has exactly sequence_length cells")
    }
}

impl Default for NameEncoder {
    fn default() -> Self {
        Self::new(EncoderParams::default())
    }
}

/// Encode one name into its fixed-length cell row.
///
/// Right-padding with spaces and the character clamp both land on the
/// unknown token, so the pad is written as zeros directly.
fn encode_row(name: &str, sequence_length: usize) -> Vec<f32> {
    let lowered = name.to_lowercase();
    let mut row: Vec<f32> = lowered
        .chars()
        .take(sequence_length)
        .map(charmap::encode_char)
        .collect();
    row.resize(sequence_length, charmap::UNKNOWN);
    row
}

fn encode_rows<T: AsRef<str>>(names: &[T], sequence_length: usize) -> Vec<f32> {
    names
        .iter()
        .flat_map(|name| encode_row(name.as_ref(), sequence_length))
        .collect()
}

fn encode_rows_par<T: AsRef<str> + Sync>(names: &[T], sequence_length: usize) -> Vec<f32> {
    debug!(num_names = names.len(), "Using parallel encoding");
    let pb = progress_bar_setup(names.len(), "Encoding names in parallel");
    let rows: Vec<Vec<f32>> = names
        .par_iter()
        .progress_with(pb.clone())
        .map(|name| encode_row(name.as_ref(), sequence_length))
        .collect();
    pb.finish_with_message("Parallel encoding complete");
    rows.into_iter().flatten().collect()
}

fn progress_bar_setup(len: usize, message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb
}

/// Determine if parallel encoding should be used based on workload size.
///
/// Names are short, so thread spawning only pays off for large batches or
/// unusually long inputs.
#[inline]
fn should_use_parallel<T: AsRef<str>>(names: &[T]) -> bool {
    if names.len() >= MIN_NAMES_FOR_PARALLEL {
        return true;
    }
    let total_chars: usize = names.iter().map(|n| n.as_ref().len()).sum();
    total_chars >= MIN_CHARS_FOR_PARALLEL
}
