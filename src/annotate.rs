//! # Focal gene annotation
//!
//! Determines which genes are disrupted by a single focal copy number
//! segment. Losses and gains are treated asymmetrically when a segment
//! only partially overlaps a gene: deleting part of a gene likely breaks
//! it, so partial losses count, while a partially duplicated copy is
//! assumed non-functional, so partial gains do not.
use std::collections::BTreeMap;

use crate::error::Error;

/// Maximum size of an event for it to be considered focal, in bp.
pub const DEFAULT_FOCAL_THRESHOLD: i64 = 30_000_000;

/// Genomic extent of one gene, half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub id: String,
}

/// Gene coordinates grouped per canonical chromosome name. A gene may be
/// contributed by multiple source rows (e.g. exons); rows with the same
/// id merge into the minimal-start/maximal-end bounding box. A gene id
/// may only ever appear on one chromosome; a row placing a known id on a
/// different chromosome is fatal, since merging its coordinates would be
/// meaningless.
#[derive(Debug, Default)]
pub struct GeneTable {
    genes: BTreeMap<String, BTreeMap<String, Gene>>,
    chrom_by_id: BTreeMap<String, String>,
}

impl GeneTable {
    pub fn new() -> Self {
        GeneTable::default()
    }

    /// Record one source row for a gene, widening the existing bounding
    /// box if the gene was seen before.
    pub fn add_row(&mut self, chrom: &str, start: i64, end: i64, id: &str) -> Result<(), Error> {
        match self.chrom_by_id.get(id) {
            Some(seen) if seen != chrom => {
                return Err(Error::DuplicateGene {
                    gene: id.to_string(),
                    chrom: seen.clone(),
                    other: chrom.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.chrom_by_id.insert(id.to_string(), chrom.to_string());
            }
        }

        let gene = self
            .genes
            .entry(chrom.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Gene {
                chrom: chrom.to_string(),
                start,
                end,
                id: id.to_string(),
            });
        if start < gene.start {
            gene.start = start;
        }
        if end > gene.end {
            gene.end = end;
        }
        Ok(())
    }

    pub fn on_chromosome(&self, chrom: &str) -> Option<&BTreeMap<String, Gene>> {
        self.genes.get(chrom)
    }

    pub fn gene_count(&self) -> usize {
        self.genes.values().map(BTreeMap::len).sum()
    }
}

/// Find the genes disrupted by one focal segment.
///
/// A gene is a candidate when its interval intersects `[start, end)`.
/// For losses (`cn < 2`) any intersection qualifies; for gains (`cn > 2`)
/// the gene must be fully contained in the segment. Calling this for a
/// copy-neutral segment is a caller contract violation and fatal.
///
/// This is a deliberate brute-force scan over all genes on the segment's
/// chromosome; per-chromosome gene counts are small enough that indexing
/// does not pay off.
pub fn focal_genes(
    chrom: &str,
    start: i64,
    end: i64,
    cn: i64,
    genes: &GeneTable,
) -> Result<Vec<String>, Error> {
    if cn == 2 {
        return Err(Error::InvalidCnState { cn });
    }

    // A chromosome without annotated genes yields no overlaps; this may
    // also be a contig name the gene source simply does not cover.
    let Some(on_chrom) = genes.on_chromosome(chrom) else {
        return Ok(Vec::new());
    };

    let mut overlapping = Vec::new();
    for (id, gene) in on_chrom {
        if start >= gene.end || end <= gene.start {
            continue;
        }
        if cn < 2 {
            overlapping.push(id.clone());
        } else if start <= gene.start && gene.end <= end {
            overlapping.push(id.clone());
        }
    }

    Ok(overlapping)
}
