#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Identification and removal of UMI tags and primers from the start of sequencing reads.
//! Each read is expected to start with an optional offset, a UMI of fixed length and
//! one of a small set of primers. The UMI and best primer are reported per read and
//! the read can be written back out starting at the primer, with the UMI removed.

pub mod error;
pub mod matching;
pub mod primer;
pub mod record;

use crate::matching::{classify, Classification};
use crate::primer::PrimerTable;
use crate::record::RecordWriter;
use bio::io::fastq;
use log::debug;
use std::io::Write;

/// Crate wide result
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Default length of the UMI
pub const DEFAULT_UMI_LENGTH: usize = 6;
/// Default number of bases allowed before the UMI
pub const DEFAULT_MAX_OFFSET: usize = 0;
/// Default number of primer mismatches allowed
pub const DEFAULT_MAX_MISMATCH: usize = 1;

/// Matching settings, fixed for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bases between the offset and the primer
    pub umi_length: usize,
    /// Largest offset tried
    pub max_offset: usize,
    /// Largest accepted number of primer mismatches
    pub max_mismatch: usize,
    /// Also emit reads without a unique primer
    pub include_invalid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            umi_length: DEFAULT_UMI_LENGTH,
            max_offset: DEFAULT_MAX_OFFSET,
            max_mismatch: DEFAULT_MAX_MISMATCH,
            include_invalid: false,
        }
    }
}

/// Read counts for a finished run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Reads taken from the input
    pub reads: usize,
    /// Reads with a unique best primer
    pub selected: usize,
    /// Reads with tied primers at the first matching offset
    pub ambiguous: usize,
    /// Reads with no primer within the mismatch budget at any offset
    pub unmatched: usize,
    /// Reads written to the outputs
    pub emitted: usize,
}

/// Classifies and writes every read in input order
pub fn process<I, W>(
    records: I,
    primers: &PrimerTable,
    config: &Config,
    writer: &mut RecordWriter<W>,
) -> Result<Summary>
where
    I: IntoIterator<Item = std::result::Result<fastq::Record, fastq::Error>>,
    W: Write,
{
    let mut summary = Summary::default();

    for (i, record) in records.into_iter().enumerate() {
        let read_n = i + 1;
        let read = record.map_err(|e| crate::error::Error::FastqRecordError(read_n, e))?;
        summary.reads += 1;
        debug!("read {}: {}", read_n, String::from_utf8_lossy(read.seq()));

        let classification = classify(read.seq(), primers, config);
        match classification {
            Classification::Selected {
                primer,
                mismatches,
                offset,
            } => {
                summary.selected += 1;
                debug!(
                    "read {}: primer {} ({} mismatches at offset {}) selected",
                    read_n, primer.id, mismatches, offset
                );
            }
            Classification::Ambiguous { mismatches, .. } => {
                summary.ambiguous += 1;
                debug!(
                    "read {}: multiple primers found with {} mismatches",
                    read_n, mismatches
                );
            }
            Classification::Unmatched { .. } => {
                summary.unmatched += 1;
                debug!("read {}: no primers selected", read_n);
            }
        }

        if writer.write(&read, &classification, config)? {
            summary.emitted += 1;
        }
    }

    writer.finish()?;
    Ok(summary)
}
