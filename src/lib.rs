//! # cnscribe
//!
//! `cnscribe` consolidates per-sample copy number segments into
//! non-overlapping partitions, re-baselines their CN states for sample
//! ploidy, flags arm- and chromosome-level events, and reports the genes
//! disrupted by focal events.
pub mod annotate;
pub mod classify;
pub mod cli;
pub mod error;
pub mod io;
pub mod karyotype;
pub mod profile;
pub mod utils;

use anyhow::{Context, Result};
use log::trace;

use crate::{
    annotate::GeneTable, classify::EventKind, karyotype::Karyotype, profile::SampleProfile,
};

/// Tunables for event calling.
#[derive(Debug, Clone, Copy)]
pub struct CallParams {
    /// Fraction of an arm/chromosome an event class must cover to be
    /// called at that level.
    pub threshold: f64,
    /// Maximum span of a focal event, in bp.
    pub focal_threshold: i64,
}

impl Default for CallParams {
    fn default() -> Self {
        CallParams {
            threshold: classify::DEFAULT_THRESHOLD,
            focal_threshold: annotate::DEFAULT_FOCAL_THRESHOLD,
        }
    }
}

/// The main work of `cnscribe` happens in this `run` function.
/// It is meant to be called from inside a rayon parallel iterator: each
/// invocation owns a chunk of sample profiles, while the arm and gene
/// tables are shared read-only. For every sample we normalize the CN
/// states for ploidy, annotate the genes hit by focal events, and
/// classify arm-level events. Any failure aborts the run; the errors the
/// engine produces indicate broken input or a caller bug, neither of
/// which is worth salvaging partial results for.
pub fn run(
    profiles: &mut [SampleProfile],
    karyotype: &Karyotype,
    gene_table: &GeneTable,
    params: &CallParams,
    tidx: usize,
) -> Result<()> {
    trace!("Launching thread {tidx}");

    for profile in profiles {
        process_sample(profile, karyotype, gene_table, params)
            .with_context(|| format!("Error processing sample '{}'", profile.sample))?;
    }

    trace!("Finished on thread {tidx}");
    Ok(())
}

/// Call events for a single sample, storing the results on its profile.
fn process_sample(
    profile: &mut SampleProfile,
    karyotype: &Karyotype,
    gene_table: &GeneTable,
    params: &CallParams,
) -> Result<()> {
    profile.normalize_ploidy(karyotype, false)?;

    let mut gene_events: Vec<(String, EventKind)> = Vec::new();
    for (chrom, partition) in profile.iter() {
        for (&start, seg) in partition {
            if seg.cn == 2 || seg.end - start >= params.focal_threshold {
                continue;
            }
            let Some(kind) = EventKind::from_cn(seg.cn) else {
                continue;
            };
            for gene in annotate::focal_genes(chrom, start, seg.end, seg.cn, gene_table)? {
                gene_events.push((gene, kind));
            }
        }
    }

    let mut arm_events: Vec<(String, EventKind)> = Vec::new();
    for arms in karyotype.chromosomes() {
        // Sex chromosomes are not classified at the arm level
        if matches!(arms.chrom(), "X" | "Y") {
            continue;
        }
        let Some(partition) = profile.segments(arms.chrom()) else {
            continue;
        };
        for (arm_key, kind) in classify::classify_arms(partition, arms, params.threshold)? {
            arm_events.push((arm_key, kind));
        }
    }

    profile.gene_events = gene_events;
    profile.arm_events = arm_events;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_genome() -> (Karyotype, GeneTable) {
        let mut karyotype = Karyotype::new();
        karyotype.set_arm("1", "p", 0, 1000).unwrap();
        karyotype.set_arm("1", "q", 1000, 2000).unwrap();
        karyotype.set_arm("X", "p", 0, 1000).unwrap();
        karyotype.set_arm("X", "q", 1000, 2000).unwrap();

        let mut gene_table = GeneTable::new();
        gene_table.add_row("1", 100, 200, "GENE_A").unwrap();
        gene_table.add_row("1", 1200, 1300, "GENE_B").unwrap();
        gene_table.add_row("X", 100, 200, "GENE_X").unwrap();
        (karyotype, gene_table)
    }

    /// Fill every region of the two test chromosomes that `covered` does
    /// not mention with copy-neutral segments, so that the ploidy average
    /// is dominated by CN 2. Uncovered genome contributes nothing to the
    /// weighted average, which would otherwise drag the ploidy down.
    fn diploid_backbone(profile: &mut SampleProfile) {
        for chrom in ["1", "X"] {
            profile.insert_segment(chrom, 0, 2000, 2).unwrap();
        }
    }

    #[test]
    fn sample_gets_gene_and_arm_calls() {
        let (karyotype, gene_table) = small_genome();
        let mut profile = SampleProfile::new("s1");
        diploid_backbone(&mut profile);
        // Focal loss over GENE_A, broad gain over the q arm
        profile.insert_segment("1", 50, 250, 0).unwrap();
        profile.insert_segment("1", 1000, 1900, 3).unwrap();

        let params = CallParams::default();
        run(
            std::slice::from_mut(&mut profile),
            &karyotype,
            &gene_table,
            &params,
            0,
        )
        .unwrap();

        assert_eq!(Some(2), profile.ploidy);
        assert_eq!(
            vec![("GENE_A".to_string(), EventKind::Homdel)],
            profile.gene_events
        );
        assert_eq!(
            vec![("1q".to_string(), EventKind::Gain)],
            profile.arm_events
        );
    }

    #[test]
    fn focal_threshold_gates_gene_annotation() {
        let (karyotype, gene_table) = small_genome();
        let mut profile = SampleProfile::new("s1");
        diploid_backbone(&mut profile);
        profile.insert_segment("1", 50, 250, 0).unwrap();

        let params = CallParams {
            focal_threshold: 100,
            ..CallParams::default()
        };
        run(
            std::slice::from_mut(&mut profile),
            &karyotype,
            &gene_table,
            &params,
            0,
        )
        .unwrap();

        // The 200 bp segment is no longer focal under a 100 bp threshold
        assert!(profile.gene_events.is_empty());
    }

    #[test]
    fn sex_chromosomes_excluded_from_arm_calls_only() {
        let (karyotype, gene_table) = small_genome();
        let params = CallParams::default();

        let mut profile = SampleProfile::new("s1");
        profile.insert_segment("X", 0, 2000, 1).unwrap();
        profile.insert_segment("1", 0, 2000, 2).unwrap();
        run(
            std::slice::from_mut(&mut profile),
            &karyotype,
            &gene_table,
            &params,
            0,
        )
        .unwrap();
        // A whole-chromosome loss of X produces no arm call
        assert!(profile.arm_events.is_empty());

        // Focal annotation still covers the sex chromosomes
        let mut profile = SampleProfile::new("s2");
        diploid_backbone(&mut profile);
        profile.insert_segment("X", 50, 250, 0).unwrap();
        run(
            std::slice::from_mut(&mut profile),
            &karyotype,
            &gene_table,
            &params,
            0,
        )
        .unwrap();
        assert_eq!(
            vec![("GENE_X".to_string(), EventKind::Homdel)],
            profile.gene_events
        );
    }

    #[test]
    fn gene_events_use_post_normalization_states() {
        let (karyotype, gene_table) = small_genome();
        let mut profile = SampleProfile::new("s1");
        // Uniform CN 4 genome with a focal CN 1 dip over GENE_A; the dip
        // survives consolidation because mixed-family conflicts keep the
        // smaller span
        profile.insert_segment("1", 0, 2000, 4).unwrap();
        profile.insert_segment("X", 0, 2000, 4).unwrap();
        profile.insert_segment("1", 50, 250, 1).unwrap();

        let params = CallParams::default();
        run(
            std::slice::from_mut(&mut profile),
            &karyotype,
            &gene_table,
            &params,
            0,
        )
        .unwrap();

        // After the -2 shift the dip reads as CN -1, a homdel-tier event
        assert_eq!(Some(4), profile.ploidy);
        assert_eq!(
            vec![("GENE_A".to_string(), EventKind::Homdel)],
            profile.gene_events
        );
    }
}
