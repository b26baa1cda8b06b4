//! Reading the copy number segment stream.
//!
//! Boundary conversions happen here, before anything reaches the
//! consolidator: chromosome names are canonicalized, zero-length rows
//! are dropped, and log2 ratios are converted to absolute copy numbers.
use std::{collections::BTreeMap, fs::File, io::Read};

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use log::{debug, info};
use serde::Deserialize;

use crate::{profile::SampleProfile, utils};

/// One row of the segment file. Columns are resolved from the file
/// header; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct SegmentRecord {
    #[serde(rename = "Tumor_Sample_Barcode")]
    sample: String,
    chromosome: String,
    start: i64,
    end: i64,
    #[serde(rename = "CN")]
    cn: f64,
}

/// Read CN segments from a headered, tab-delimited file and consolidate
/// them into one [`SampleProfile`] per sample, in sample name order.
///
/// With `input_log2` set, the CN column is interpreted as
/// `log2(absoluteCN) - 1` and converted before insertion. Without it, a
/// negative CN value is rejected: it almost certainly means the file
/// contains ratios after all.
pub fn read_segments(path: &str, input_log2: bool) -> Result<Vec<SampleProfile>> {
    let file =
        File::open(path).with_context(|| format!("Could not read segment file {path}"))?;
    read_segments_from(file, path, input_log2)
}

fn read_segments_from<R: Read>(
    source: R,
    path: &str,
    input_log2: bool,
) -> Result<Vec<SampleProfile>> {
    if input_log2 {
        debug!("Converting CN values from log2 ratios");
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(source);

    let mut profiles: BTreeMap<String, SampleProfile> = BTreeMap::new();
    let mut n = 0;
    for (i, result) in reader.deserialize().enumerate() {
        let record: SegmentRecord =
            result.with_context(|| format!("Failed to deserialize segment record in {path}"))?;
        let line = i + 2; // header occupies line 1

        // Zero-length segments carry no information
        if record.start == record.end {
            continue;
        }

        let cn = if input_log2 {
            absolute_cn_from_log2(record.cn)
        } else {
            if record.cn < 0. {
                bail!(
                    "Negative copy number on line {line} of {path}. Did you mean to specify --log2?"
                );
            }
            record.cn.round() as i64
        };

        let chrom = utils::normalize_chrom(&record.chromosome);
        profiles
            .entry(record.sample.clone())
            .or_insert_with(|| SampleProfile::new(&record.sample))
            .insert_segment(&chrom, record.start, record.end, cn)
            .with_context(|| format!("Invalid segment on line {line} of {path}"))?;
        n += 1;
    }

    info!("Read {n} segments for {} samples from {path}", profiles.len());
    Ok(profiles.into_values().collect())
}

/// Convert a log2 ratio (`log2(absoluteCN) - 1`) to absolute copy
/// number, flooring at zero.
pub fn absolute_cn_from_log2(log2: f64) -> i64 {
    f64::powf(2., log2 + 1.).max(0.).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles_from_str(data: &str, input_log2: bool) -> Result<Vec<SampleProfile>> {
        read_segments_from(data.as_bytes(), "segments.tsv", input_log2)
    }

    #[test]
    fn rows_group_by_sample() {
        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s2\tchr1\t100\t200\t3\n\
                    s1\tchr1\t100\t200\t1\n\
                    s2\tchr2\t100\t200\t0\n";
        let profiles = profiles_from_str(data, false).unwrap();

        assert_eq!(2, profiles.len());
        assert_eq!("s1", profiles[0].sample);
        assert_eq!("s2", profiles[1].sample);
        assert_eq!(1, profiles[0].segment_count());
        assert_eq!(2, profiles[1].segment_count());
    }

    #[test]
    fn zero_length_rows_skipped() {
        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s1\tchr1\t100\t100\t3\n";
        let profiles = profiles_from_str(data, false).unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn negative_cn_without_log2_fails() {
        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s1\tchr1\t100\t200\t-0.8\n";
        assert!(profiles_from_str(data, false).is_err());
    }

    #[test]
    fn errors_name_the_offending_line() {
        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s1\tchr1\t100\t200\t2\n\
                    s1\tchr1\t100\t200\t-0.8\n";
        let err = profiles_from_str(data, false).unwrap_err();
        assert!(format!("{err:#}").contains("line 3 of segments.tsv"));

        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s1\tchr1\t200\t100\t2\n";
        let err = profiles_from_str(data, false).unwrap_err();
        assert!(format!("{err:#}").contains("line 2 of segments.tsv"));
    }

    #[test]
    fn log2_ratios_convert_to_absolute_cn() {
        // log2(CN) - 1 for CN 2 is 0; for CN 4 it is 1
        assert_eq!(2, absolute_cn_from_log2(0.));
        assert_eq!(4, absolute_cn_from_log2(1.));
        assert_eq!(1, absolute_cn_from_log2(-1.));
        // Deep losses floor at zero
        assert_eq!(0, absolute_cn_from_log2(-8.));
    }

    #[test]
    fn log2_input_is_converted_before_insertion() {
        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s1\tchr1\t100\t200\t1.0\n";
        let profiles = profiles_from_str(data, true).unwrap();
        let seg = profiles[0].segments("1").unwrap()[&100];
        assert_eq!(4, seg.cn);
    }

    #[test]
    fn inverted_segment_fails() {
        let data = "Tumor_Sample_Barcode\tchromosome\tstart\tend\tCN\n\
                    s1\tchr1\t200\t100\t3\n";
        assert!(profiles_from_str(data, false).is_err());
    }
}
