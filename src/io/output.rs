//! Writing flat result files.
//!
//! All three outputs are tab-delimited with a single header line, one
//! row per call (or per sample, for ploidy).
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::info;

use crate::profile::SampleProfile;

fn tsv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Could not create output file {}", path.display()))
}

/// Write all genes disrupted by focal events, one row per (sample, gene,
/// event) triple.
pub fn write_gene_events(profiles: &[SampleProfile], path: &Path) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(["Sample", "Gene", "Type"])?;
    let mut n = 0;
    for profile in profiles {
        for (gene, kind) in &profile.gene_events {
            writer.write_record([profile.sample.as_str(), gene, kind.as_str()])?;
            n += 1;
        }
    }
    writer.flush()?;

    info!("Wrote {n} gene-level events to {}", path.display());
    Ok(())
}

/// Write arm and whole-chromosome events, one row per (sample, arm key,
/// event) triple.
pub fn write_arm_events(profiles: &[SampleProfile], path: &Path) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(["Sample", "Arm", "Type"])?;
    let mut n = 0;
    for profile in profiles {
        for (arm_key, kind) in &profile.arm_events {
            writer.write_record([profile.sample.as_str(), arm_key, kind.as_str()])?;
            n += 1;
        }
    }
    writer.flush()?;

    info!("Wrote {n} arm-level events to {}", path.display());
    Ok(())
}

/// Write the computed genome-wide ploidy of every sample.
pub fn write_ploidy(profiles: &[SampleProfile], path: &Path) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(["Sample", "Ploidy"])?;
    for profile in profiles {
        if let Some(ploidy) = profile.ploidy {
            writer.write_record([profile.sample.as_str(), &ploidy.to_string()])?;
        }
    }
    writer.flush()?;

    info!("Wrote ploidy values to {}", path.display());
    Ok(())
}
