//! Reading gene coordinates from BED4+ files.
use std::{fs::File, io::Read};

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use log::info;

use crate::{annotate::GeneTable, utils};

/// Read gene positions from a headerless BED4+ file into a [`GeneTable`].
///
/// Only the first four columns (chrom, start, end, gene id) are used;
/// anything beyond them (e.g. BED6/BED12 fields) is ignored. A gene may
/// be split across multiple entries (e.g. exonic coordinates); the
/// entries are merged into one bounding box per gene. An id appearing on
/// two different chromosomes is fatal.
pub fn read_gene_bed(path: &str) -> Result<GeneTable> {
    let file = File::open(path).with_context(|| format!("Could not read bed file {path}"))?;
    read_gene_bed_from(file, path)
}

fn read_gene_bed_from<R: Read>(source: R, path: &str) -> Result<GeneTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(source);

    let mut gene_table = GeneTable::new();
    for (i, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read bed record in {path}"))?;
        let line = i + 1;
        if record.len() < 4 {
            bail!(
                "Line {line} of {path} contains less than four columns (chrom, start, end, gene)"
            );
        }

        let chrom = utils::normalize_chrom(&record[0]);
        let start: i64 = record[1].parse().with_context(|| {
            format!("Start position '{}' on line {line} of {path} is not a valid genomic coordinate", &record[1])
        })?;
        let end: i64 = record[2].parse().with_context(|| {
            format!("End position '{}' on line {line} of {path} is not a valid genomic coordinate", &record[2])
        })?;

        gene_table
            .add_row(&chrom, start, end, &record[3])
            .with_context(|| format!("Invalid gene definition on line {line} of {path}"))?;
    }

    info!("Read {} genes from {path}", gene_table.gene_count());
    Ok(gene_table)
}
