//! # Chromosome arm architecture
//!
//! [`Karyotype`] maps canonical chromosome names to [`ChromosomeArms`],
//! the genomic windows of the p and q arms. Arm coordinates may be absent
//! for a chromosome (e.g. acrocentric contigs in sparse arm tables); an
//! unset arm reports a placeholder length of 1 so that genome-wide length
//! arithmetic stays well-defined, while matching no real segment.
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;

/// Length reported for an arm whose real coordinates are unavailable.
pub const PLACEHOLDER_ARM_LENGTH: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arm {
    P,
    Q,
}

impl Arm {
    /// Parse an arm label from the arm table. Anything other than "p" or
    /// "q" is fatal.
    pub fn from_label(chrom: &str, label: &str) -> Result<Arm, Error> {
        match label {
            "p" => Ok(Arm::P),
            "q" => Ok(Arm::Q),
            _ => Err(Error::UnknownArm {
                chrom: chrom.to_string(),
                arm: label.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arm::P => "p",
            Arm::Q => "q",
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The p and q windows of a single chromosome, both half-open and both
/// optional. When both are set, p must end at or before the start of q.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeArms {
    chrom: String,
    p: Option<(i64, i64)>,
    q: Option<(i64, i64)>,
}

impl ChromosomeArms {
    pub fn new(chrom: &str) -> Self {
        ChromosomeArms {
            chrom: chrom.to_string(),
            p: None,
            q: None,
        }
    }

    /// Assign coordinates to one arm. An inverted window, assigning an
    /// arm twice, or creating an overlap between the p and q windows, is
    /// fatal.
    pub fn set_arm(&mut self, arm: Arm, start: i64, end: i64) -> Result<(), Error> {
        if start > end {
            return Err(Error::InvalidArmWindow {
                chrom: self.chrom.clone(),
                arm: arm.as_str().to_string(),
                start,
                end,
            });
        }
        let conflict = || Error::DuplicateArmAssignment {
            chrom: self.chrom.clone(),
            arm: arm.as_str().to_string(),
        };

        let slot = match arm {
            Arm::P => &mut self.p,
            Arm::Q => &mut self.q,
        };
        if slot.is_some() {
            return Err(conflict());
        }
        *slot = Some((start, end));

        if let (Some((_, p_end)), Some((q_start, _))) = (self.p, self.q) {
            // The q arm may not start before the end of the p arm
            if p_end > q_start {
                return Err(conflict());
            }
        }

        Ok(())
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn p_window(&self) -> Option<(i64, i64)> {
        self.p
    }

    pub fn q_window(&self) -> Option<(i64, i64)> {
        self.q
    }

    pub fn p_length(&self) -> i64 {
        self.p.map_or(PLACEHOLDER_ARM_LENGTH, |(start, end)| end - start)
    }

    pub fn q_length(&self) -> i64 {
        self.q.map_or(PLACEHOLDER_ARM_LENGTH, |(start, end)| end - start)
    }

    /// Combined length of both arms. Never zero thanks to the placeholder
    /// lengths, so fractions over it are always defined.
    pub fn whole_length(&self) -> i64 {
        self.p_length() + self.q_length()
    }
}

/// All chromosome arm definitions for one genome, keyed by canonical
/// chromosome name. Loaded once before any sample processing and shared
/// read-only across threads afterwards.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Karyotype {
    arms: BTreeMap<String, ChromosomeArms>,
}

impl Karyotype {
    pub fn new() -> Self {
        Karyotype::default()
    }

    /// Record one arm-table row. The chromosome entry is created on first
    /// sight; the label is validated here.
    pub fn set_arm(&mut self, chrom: &str, label: &str, start: i64, end: i64) -> Result<(), Error> {
        let arm = Arm::from_label(chrom, label)?;
        self.arms
            .entry(chrom.to_string())
            .or_insert_with(|| ChromosomeArms::new(chrom))
            .set_arm(arm, start, end)
    }

    pub fn get(&self, chrom: &str) -> Option<&ChromosomeArms> {
        self.arms.get(chrom)
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = &ChromosomeArms> {
        self.arms.values()
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arms_with_coordinates() {
        let mut arms = ChromosomeArms::new("1");
        arms.set_arm(Arm::P, 0, 1000).unwrap();
        arms.set_arm(Arm::Q, 1200, 2000).unwrap();

        assert_eq!(Some((0, 1000)), arms.p_window());
        assert_eq!(1000, arms.p_length());
        assert_eq!(800, arms.q_length());
        assert_eq!(1800, arms.whole_length());
    }

    #[test]
    fn unset_arm_uses_placeholder_length() {
        let mut arms = ChromosomeArms::new("13");
        arms.set_arm(Arm::Q, 1200, 2000).unwrap();

        assert_eq!(None, arms.p_window());
        assert_eq!(PLACEHOLDER_ARM_LENGTH, arms.p_length());
        assert_eq!(800 + PLACEHOLDER_ARM_LENGTH, arms.whole_length());
    }

    #[test]
    fn duplicate_assignment_rejected() {
        let mut arms = ChromosomeArms::new("1");
        arms.set_arm(Arm::P, 0, 1000).unwrap();
        let err = arms.set_arm(Arm::P, 0, 500).unwrap_err();
        assert_eq!(
            Error::DuplicateArmAssignment {
                chrom: "1".to_string(),
                arm: "p".to_string()
            },
            err
        );
    }

    #[test]
    fn overlapping_arms_rejected() {
        let mut arms = ChromosomeArms::new("1");
        arms.set_arm(Arm::Q, 800, 2000).unwrap();
        assert!(arms.set_arm(Arm::P, 0, 1000).is_err());

        // Abutting arms are fine
        let mut arms = ChromosomeArms::new("2");
        arms.set_arm(Arm::Q, 1000, 2000).unwrap();
        arms.set_arm(Arm::P, 0, 1000).unwrap();
    }

    #[test]
    fn inverted_arm_window_rejected() {
        let mut arms = ChromosomeArms::new("1");
        let err = arms.set_arm(Arm::P, 1000, 0).unwrap_err();
        assert_eq!(
            Error::InvalidArmWindow {
                chrom: "1".to_string(),
                arm: "p".to_string(),
                start: 1000,
                end: 0
            },
            err
        );
        // The failed assignment leaves the arm unset
        assert_eq!(None, arms.p_window());
    }

    #[test]
    fn unknown_arm_label_rejected() {
        let mut karyotype = Karyotype::new();
        let err = karyotype.set_arm("1", "r", 0, 1000).unwrap_err();
        assert_eq!(
            Error::UnknownArm {
                chrom: "1".to_string(),
                arm: "r".to_string()
            },
            err
        );
    }

    #[test]
    fn karyotype_collects_rows_per_chromosome() {
        let mut karyotype = Karyotype::new();
        karyotype.set_arm("1", "p", 0, 1000).unwrap();
        karyotype.set_arm("1", "q", 1000, 2500).unwrap();
        karyotype.set_arm("2", "q", 500, 900).unwrap();

        assert_eq!(2, karyotype.len());
        let chr1 = karyotype.get("1").unwrap();
        assert_eq!(2500, chr1.whole_length());
        assert!(karyotype.get("3").is_none());
    }
}
