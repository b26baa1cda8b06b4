//! # Arm and chromosome level event classification
//!
//! Aggregates the overlap between a sample's consolidated segments and
//! the p/q windows of one chromosome, then flags arms or the whole
//! chromosome as amplified, gained, homozygously deleted, or
//! heterozygously lost when the covered fraction crosses a threshold.
use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;

use crate::{
    karyotype::{Arm, ChromosomeArms},
    profile::Partition,
    utils,
};

/// Fraction of an arm or chromosome that must be covered by an event
/// class before it is called.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Classification tiers for copy number events. `Amp` and `Homdel` are
/// the extreme tiers (CN > 3 and CN < 1); `Gain` and `Hetloss` cover the
/// remaining non-neutral states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Amp,
    Gain,
    Homdel,
    Hetloss,
}

impl EventKind {
    /// The event tier of a non-neutral CN state, or `None` for CN 2.
    pub fn from_cn(cn: i64) -> Option<EventKind> {
        if cn > 3 {
            Some(EventKind::Amp)
        } else if cn > 2 {
            Some(EventKind::Gain)
        } else if cn < 1 {
            Some(EventKind::Homdel)
        } else if cn < 2 {
            Some(EventKind::Hetloss)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Amp => "AMP",
            EventKind::Gain => "GAIN",
            EventKind::Homdel => "HOMDEL",
            EventKind::Hetloss => "HETLOSS",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overlap length accumulated per arm, and combined for the chromosome.
/// A segment spanning the centromere contributes to both arms, but never
/// twice to the same side.
#[derive(Debug, Default, Clone, Copy)]
struct OverlapSums {
    p: i64,
    q: i64,
    chrom: i64,
}

impl OverlapSums {
    fn add(&mut self, arm: Arm, length: i64) {
        match arm {
            Arm::P => self.p += length,
            Arm::Q => self.q += length,
        }
        self.chrom += length;
    }
}

/// Classify large-scale events for one chromosome of one sample.
///
/// Returns a map from arm key (`<chrom>p`, `<chrom>q`, `<chrom>Chrom`) to
/// event kind; keys that do not cross `threshold` are absent. Gains are
/// evaluated before losses and both families write into the same map, so
/// a loss call replaces a gain call landing on the identical key while
/// calls on different keys coexist.
pub fn classify_arms(
    segments: &Partition,
    arms: &ChromosomeArms,
    threshold: f64,
) -> Result<BTreeMap<String, EventKind>> {
    let mut homdel = OverlapSums::default();
    let mut del = OverlapSums::default();
    let mut gain = OverlapSums::default();
    let mut amp = OverlapSums::default();

    for (&start, seg) in segments {
        // Copy-neutral segments carry no event
        if seg.cn == 2 {
            continue;
        }
        for (arm, window) in [(Arm::P, arms.p_window()), (Arm::Q, arms.q_window())] {
            let Some((w_start, w_end)) = window else {
                continue;
            };
            let overlap = utils::window_overlap(start, seg.end, w_start, w_end)?;
            if overlap == 0 {
                continue;
            }
            if seg.cn < 2 {
                del.add(arm, overlap);
                if seg.cn < 1 {
                    homdel.add(arm, overlap);
                }
            } else {
                gain.add(arm, overlap);
                if seg.cn > 3 {
                    amp.add(arm, overlap);
                }
            }
        }
    }

    let chrom = arms.chrom();
    let p_key = format!("{chrom}p");
    let q_key = format!("{chrom}q");
    let chrom_key = format!("{chrom}Chrom");
    let p_length = arms.p_length() as f64;
    let q_length = arms.q_length() as f64;
    let whole_length = arms.whole_length() as f64;

    let mut events: BTreeMap<String, EventKind> = BTreeMap::new();

    // Start from the highest tier and the biggest window and work down:
    // a whole-chromosome call suppresses arm-level calls of its family,
    // and the extreme tier shadows the milder one on the same key.
    let families = [
        (amp, gain, EventKind::Amp, EventKind::Gain),
        (homdel, del, EventKind::Homdel, EventKind::Hetloss),
    ];
    for (extreme, mild, extreme_kind, mild_kind) in families {
        if extreme.chrom as f64 / whole_length > threshold {
            events.insert(chrom_key.clone(), extreme_kind);
        } else {
            if extreme.p as f64 / p_length > threshold {
                events.insert(p_key.clone(), extreme_kind);
            } else if extreme.q as f64 / q_length > threshold {
                events.insert(q_key.clone(), extreme_kind);
            }
            if !events.contains_key(&chrom_key) && mild.chrom as f64 / whole_length > threshold {
                events.insert(chrom_key.clone(), mild_kind);
            } else {
                if !events.contains_key(&p_key) && mild.p as f64 / p_length > threshold {
                    events.insert(p_key.clone(), mild_kind);
                }
                if !events.contains_key(&q_key) && mild.q as f64 / q_length > threshold {
                    events.insert(q_key.clone(), mild_kind);
                }
            }
        }
    }

    Ok(events)
}
