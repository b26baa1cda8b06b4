//! # Per-sample copy number profiles
//!
//! [`SampleProfile`] owns, per chromosome, a sorted non-overlapping
//! partition of copy number segments. Input segments may overlap each
//! other arbitrarily; [`SampleProfile::insert_segment`] resolves every
//! conflict on insertion so that the partition invariant holds at all
//! times. Once all input for a sample is consumed,
//! [`SampleProfile::normalize_ploidy`] re-baselines every CN state to a
//! diploid-relative scale in a single pass.
//!
//! Conflict resolution follows three rules:
//! - equal CN states merge into their union span;
//! - within one family (both CN <= 2, or both CN >= 2) the more extreme
//!   state wins and the loser is truncated around it;
//! - across families the smaller-span segment wins outright, regardless
//!   of magnitude.
use std::collections::BTreeMap;

use anyhow::{bail, Result};
use log::debug;

use crate::{classify::EventKind, error::Error, karyotype::Karyotype, utils};

/// Copy number state of one consolidated segment. The start coordinate is
/// the key in the per-chromosome partition; intervals are half-open
/// `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentData {
    pub end: i64,
    pub cn: i64,
}

/// One chromosome's partition: segment starts mapped to [`SegmentData`],
/// sorted and pairwise non-overlapping.
pub type Partition = BTreeMap<i64, SegmentData>;

/// All consolidated CN segments of a single sample, plus the event calls
/// derived from them. Owned exclusively by the engine for that sample;
/// never shared across samples, which makes per-sample parallel
/// processing safe by construction.
#[derive(Debug, Default)]
pub struct SampleProfile {
    pub sample: String,
    partitions: BTreeMap<String, Partition>,
    /// Genome-wide dominant CN state, cached by `normalize_ploidy`.
    pub ploidy: Option<i64>,
    /// Genes disrupted by focal events, filled in by [`crate::run`].
    pub gene_events: Vec<(String, EventKind)>,
    /// Arm and whole-chromosome events, filled in by [`crate::run`].
    pub arm_events: Vec<(String, EventKind)>,
}

impl SampleProfile {
    pub fn new(sample: &str) -> Self {
        SampleProfile {
            sample: sample.to_string(),
            ..SampleProfile::default()
        }
    }

    /// Insert a segment into this sample's partition for `chrom`,
    /// resolving any overlaps with previously inserted segments.
    ///
    /// Expects a canonicalized chromosome name (see
    /// [`utils::normalize_chrom`]) and a half-open interval. Zero-length
    /// segments are filtered out upstream and inserting one is a no-op;
    /// an inverted interval is fatal.
    ///
    /// An explicit worklist drives the resolution, keeping the stack flat
    /// no matter how many conflicts cascade: each worklist entry either
    /// lands in a free gap, consumes one established segment, or shrinks
    /// to the flanks of one.
    pub fn insert_segment(&mut self, chrom: &str, start: i64, end: i64, cn: i64) -> Result<(), Error> {
        if end < start {
            return Err(Error::InvalidSegment {
                chrom: chrom.to_string(),
                start,
                end,
            });
        }
        if end == start {
            return Ok(());
        }

        let partition = self.partitions.entry(chrom.to_string()).or_default();

        let mut work: Vec<(i64, i64, i64)> = vec![(start, end, cn)];
        while let Some((start, end, cn)) = work.pop() {
            let Some((old_start, old)) = first_overlap(partition, start, end) else {
                partition.insert(start, SegmentData { end, cn });
                continue;
            };
            let (old_end, old_cn) = (old.end, old.cn);

            if old_cn == cn {
                // Same state: merge into the union span, which may in turn
                // overlap further segments.
                partition.remove(&old_start);
                work.push((start.min(old_start), end.max(old_end), cn));
                continue;
            }

            let established_wins = if cn <= 2 && old_cn <= 2 {
                // Loss family: the deeper deletion wins
                old_cn < cn
            } else if cn >= 2 && old_cn >= 2 {
                // Gain family: the higher gain wins
                old_cn > cn
            } else {
                // Mixed families: keep both states, the smaller span wins
                old_end - old_start < end - start
            };

            if established_wins {
                // Truncate the incoming segment around the established
                // one; the flanks may still overlap other segments.
                if start < old_start {
                    work.push((start, old_start, cn));
                }
                if old_end < end {
                    work.push((old_end, end, cn));
                }
            } else {
                // Split the established segment around the incoming span.
                // Its flanks are sub-ranges of a segment that already
                // satisfied the invariant, so they can land directly.
                partition.remove(&old_start);
                if old_start < start {
                    partition.insert(old_start, SegmentData { end: start, cn: old_cn });
                }
                if end < old_end {
                    partition.insert(end, SegmentData { end: old_end, cn: old_cn });
                }
                work.push((start, end, cn));
            }
        }

        Ok(())
    }

    /// Compute this sample's genome-wide ploidy as the length-weighted
    /// average CN over all arm windows in `karyotype`, then shift every
    /// segment in the profile so the dominant state reads as diploid.
    ///
    /// The shift covers the entire profile, including chromosomes absent
    /// from the arm table, and is applied exactly once: repeat calls
    /// return the cached ploidy unless `force` is set.
    pub fn normalize_ploidy(&mut self, karyotype: &Karyotype, force: bool) -> Result<i64> {
        if let Some(ploidy) = self.ploidy {
            if !force {
                return Ok(ploidy);
            }
        }
        if karyotype.is_empty() {
            bail!("Cannot calculate ploidy for sample '{}': arm table is empty", self.sample);
        }

        let mut weighted_cn: i64 = 0;
        let mut genome_size: i64 = 0;
        for arms in karyotype.chromosomes() {
            // Placeholder lengths of unset arms count toward the genome
            // size but match no segment.
            genome_size += arms.whole_length();

            let Some(partition) = self.partitions.get(arms.chrom()) else {
                continue;
            };
            for (&start, seg) in partition {
                for (w_start, w_end) in [arms.p_window(), arms.q_window()].into_iter().flatten() {
                    let overlap = utils::window_overlap(start, seg.end, w_start, w_end)?;
                    weighted_cn += seg.cn * overlap;
                }
            }
        }

        let ploidy = (weighted_cn as f64 / genome_size as f64).round() as i64;
        if ploidy < 1 {
            return Err(Error::InvalidPloidy {
                sample: self.sample.clone(),
                ploidy,
            }
            .into());
        }

        if ploidy != 2 {
            debug!("'{}' was calculated to have a ploidy of {ploidy}", self.sample);
            let shift = ploidy - 2;
            for (chrom, partition) in &mut self.partitions {
                for seg in partition.values_mut() {
                    seg.cn -= shift;
                    if seg.cn < 0 {
                        debug!(
                            "Ploidy shift drove a segment on chromosome {chrom} of '{}' below CN 0",
                            self.sample
                        );
                    }
                }
            }
        }

        self.ploidy = Some(ploidy);
        Ok(ploidy)
    }

    /// The consolidated partition for one chromosome, if any segments
    /// were inserted on it.
    pub fn segments(&self, chrom: &str) -> Option<&Partition> {
        self.partitions.get(chrom)
    }

    /// Iterate over all chromosomes with segments, in canonical name
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Partition)> {
        self.partitions.iter().map(|(chrom, p)| (chrom.as_str(), p))
    }

    pub fn segment_count(&self) -> usize {
        self.partitions.values().map(BTreeMap::len).sum()
    }
}

/// Find the leftmost established segment overlapping `[start, end)`.
fn first_overlap(partition: &Partition, start: i64, end: i64) -> Option<(i64, SegmentData)> {
    // A segment starting at or before `start` overlaps iff it extends
    // past it.
    if let Some((&seg_start, seg)) = partition.range(..=start).next_back() {
        if seg.end > start {
            return Some((seg_start, *seg));
        }
    }
    // Otherwise the first segment starting inside the interval, if any.
    partition
        .range(start..end)
        .next()
        .map(|(&seg_start, seg)| (seg_start, *seg))
}
