//! Reading the chromosome arm table.
use std::{fs::File, io::Read};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::info;
use serde::Deserialize;

use crate::{karyotype::Karyotype, utils};

/// One row of the arm table. Columns are resolved from the file header,
/// so their order is free and extra columns are ignored.
#[derive(Debug, Deserialize)]
struct ArmRecord {
    chromosome: String,
    start: i64,
    end: i64,
    arm: String,
}

/// Read chromosome arm coordinates from a headered, tab-delimited file
/// into a [`Karyotype`]. Chromosome names are canonicalized here.
pub fn read_arm_table(path: &str) -> Result<Karyotype> {
    let file = File::open(path).with_context(|| format!("Could not read arm table {path}"))?;
    read_arm_table_from(file, path)
}

fn read_arm_table_from<R: Read>(source: R, path: &str) -> Result<Karyotype> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(source);

    let mut karyotype = Karyotype::new();
    let mut n = 0;
    for result in reader.deserialize() {
        let record: ArmRecord =
            result.with_context(|| format!("Failed to deserialize arm record in {path}"))?;
        let chrom = utils::normalize_chrom(&record.chromosome);
        karyotype
            .set_arm(&chrom, &record.arm, record.start, record.end)
            .with_context(|| format!("Invalid arm definition in {path}"))?;
        n += 1;
    }

    info!("Read {n} arm definitions covering {} chromosomes from {path}", karyotype.len());
    Ok(karyotype)
}
