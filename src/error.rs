//! # Typed errors for `cnscribe`
//!
//! Every variant here is fatal for the run in progress: the computations
//! are pure, so there is no transient failure mode to retry and no partial
//! result worth salvaging.
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid CN segment '{chrom}:{start}-{end}': end coordinate occurs before start")]
    InvalidSegment { chrom: String, start: i64, end: i64 },
    #[error("conflicting coordinates for the {arm} arm of chromosome '{chrom}': already assigned or overlapping the other arm")]
    DuplicateArmAssignment { chrom: String, arm: String },
    #[error("invalid window {start}-{end} for the {arm} arm of chromosome '{chrom}': end coordinate occurs before start")]
    InvalidArmWindow {
        chrom: String,
        arm: String,
        start: i64,
        end: i64,
    },
    #[error("gene '{gene}' has rows on both chromosome '{chrom}' and chromosome '{other}'")]
    DuplicateGene {
        gene: String,
        chrom: String,
        other: String,
    },
    #[error("unknown arm '{arm}' specified for chromosome '{chrom}', must be 'p' or 'q'")]
    UnknownArm { chrom: String, arm: String },
    #[error("ploidy of sample '{sample}' was calculated to be {ploidy}, below 1")]
    InvalidPloidy { sample: String, ploidy: i64 },
    #[error("refusing to calculate gene overlap for a copy-neutral segment (CN {cn})")]
    InvalidCnState { cn: i64 },
}
