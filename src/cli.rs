//! # Command line interface for `cnscribe`
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::warn;

use crate::utils;

#[derive(Parser)]
#[command(
    name = "cnscribe",
    author,
    version,
    about = "Copy number segment consolidation and event calling",
    long_about = None
)]
pub struct Cli {
    /// Copy number segments for all samples. Expected format is headered TSV
    /// with columns Tumor_Sample_Barcode, chromosome, start, end, CN
    #[arg(short, long)]
    pub segments: String,

    /// File specifying chromosome arm coordinates. Expected format is headered
    /// TSV with columns chromosome, start, end, arm
    #[arg(short, long)]
    pub arms: String,

    /// File specifying gene coordinates. Expected format is BED4+
    #[arg(short, long)]
    pub genes: String,

    /// Interpret the CN column as log2 ratios instead of absolute copy numbers
    #[arg(long)]
    pub log2: bool,

    /// Fraction of an arm (or chromosome) an event must cover to be called at
    /// that level
    #[arg(long, default_value_t = crate::classify::DEFAULT_THRESHOLD, value_parser = threshold_in_range)]
    pub threshold: f64,

    /// Maximum length (bp) of a segment for it to count as a focal event
    #[arg(long, default_value_t = crate::annotate::DEFAULT_FOCAL_THRESHOLD)]
    pub focal_threshold: i64,

    /// Number of threads to use
    #[arg(long, default_value_t = 1, value_parser = threads_in_range)]
    pub threads: usize,

    /// Directory to write output files to
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// Prefix for output file names
    #[arg(long)]
    pub prefix: Option<String>,
}

impl Cli {
    pub fn get_output_prefix(&self) -> Result<String> {
        if let Some(prefix) = &self.prefix {
            Ok(prefix.clone())
        } else {
            let prefix = utils::sample_name_from_path(&self.segments)?;
            warn!("No output prefix given. Using inferred prefix: {prefix}");
            Ok(prefix)
        }
    }
}

fn threads_in_range(s: &str) -> Result<usize> {
    let threads = s
        .parse()
        .context("Could not parse value passed to --threads to integer")?;
    if threads < 1 {
        bail!("--threads must be at least 1");
    }
    Ok(threads)
}

fn threshold_in_range(s: &str) -> Result<f64> {
    let threshold: f64 = s
        .parse()
        .context("Could not parse value passed to --threshold to float")?;
    if threshold <= 0. || threshold > 1. {
        bail!("--threshold must be in (0, 1]");
    }
    Ok(threshold)
}
