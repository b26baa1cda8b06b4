//! # Root for utility functions in `cnscribe`
//!
//! Miscellaneous helpers shared by the library modules: chromosome name
//! canonicalization, half-open interval arithmetic, and output prefix
//! inference.
use anyhow::{bail, Context, Result};
use std::{cmp, path::Path};

/// Canonicalize a chromosome name by stripping the conventional "chr"
/// prefix. Applied once at every ingestion point (segments, arms, genes)
/// so that all lookups share a single key space.
///
/// # Examples
///
/// ```
/// assert_eq!("1", cnscribe::utils::normalize_chrom("chr1"));
/// assert_eq!("1", cnscribe::utils::normalize_chrom("1"));
/// assert_eq!("X", cnscribe::utils::normalize_chrom("chrX"));
/// ```
pub fn normalize_chrom(raw: &str) -> String {
    raw.strip_prefix("chr").unwrap_or(raw).to_string()
}

/// Determine the overlap between two half-open ranges `[a_start, a_end)`
/// and `[b_start, b_end)`.
///
/// # Examples
///
/// ```
/// let overlap = cnscribe::utils::window_overlap(10, 15, 13, 25).unwrap();
/// assert_eq!(2, overlap);
/// ```
pub fn window_overlap(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> Result<i64> {
    if (a_start > a_end) | (b_start > b_end) {
        bail!("a or b range not correctly specified")
    }
    Ok(cmp::max(
        0,
        cmp::min(a_end, b_end) - cmp::max(a_start, b_start),
    ))
}

/// Infer an output prefix from the filepath of the segments file
///
/// # Examples
///
/// ```
/// let filepath = "./path/to/cohort_segments.tsv";
/// let prefix = cnscribe::utils::sample_name_from_path(filepath).unwrap();
///
/// assert_eq!("cohort_segments", prefix);
/// ```
pub fn sample_name_from_path(filepath: &str) -> Result<String> {
    let context = || format!("Could not infer name from path {filepath}");
    let name = Path::new(filepath)
        .file_stem()
        .with_context(context)?
        .to_str()
        .with_context(context)?;

    Ok(String::from(name))
}
