//! # Input and output collaborators
//!
//! Everything that touches the filesystem lives in this module tree; the
//! core modules only ever see already-parsed tables and profiles.
use anyhow::Result;

use crate::{annotate::GeneTable, karyotype::Karyotype, profile::SampleProfile};

pub mod arms;
pub mod genes;
pub mod output;
pub mod segments;

/// Load all three inputs of a run. The arm and gene tables are read
/// first so that an empty or malformed annotation file fails fast,
/// before the (typically much larger) segment file is consumed.
pub fn load_inputs(
    segments_path: &str,
    arms_path: &str,
    genes_path: &str,
    input_log2: bool,
) -> Result<(Vec<SampleProfile>, Karyotype, GeneTable)> {
    let karyotype = arms::read_arm_table(arms_path)?;
    let gene_table = genes::read_gene_bed(genes_path)?;
    let profiles = segments::read_segments(segments_path, input_log2)?;

    Ok((profiles, karyotype, gene_table))
}
