//! Fixed-offset primer matching.
//!
//! A read is expected to look like `<offset bases><UMI><primer><payload>`. For every
//! candidate offset, in increasing order, the bases following the UMI are compared
//! against every primer by Hamming distance. The first offset at which any primer is
//! within the mismatch budget decides the read: a single best primer is selected, a
//! tie leaves the read unselected without looking at later offsets.
use crate::error::Error;
use crate::primer::{Primer, PrimerTable};
use crate::{Config, Result};

/// Counts the positions of `pattern` that differ from the start of `candidate`.
/// Bases are compared as raw bytes, `N` is not a wildcard.
pub fn mismatches(pattern: &[u8], candidate: &[u8]) -> Result<usize> {
    if pattern.len() > candidate.len() {
        return Err(Error::PatternTooLong {
            pattern: pattern.len(),
            candidate: candidate.len(),
        });
    }

    Ok(pattern
        .iter()
        .zip(candidate.iter())
        .filter(|(p, c)| p != c)
        .count())
}

/// Best scoring primers at a single comparison start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMatch<'a> {
    /// Mismatches of every primer in `primers`
    pub mismatches: usize,
    /// Primers tied for the lowest mismatch count, in table order
    pub primers: Vec<&'a Primer>,
}

impl<'a> OffsetMatch<'a> {
    /// The primer if it is the only best one
    pub fn unique(&self) -> Option<&'a Primer> {
        match self.primers.as_slice() {
            &[primer] => Some(primer),
            _ => None,
        }
    }
}

/// Compares every primer against `seq[start..]`. Primers longer than the remaining
/// sequence do not match. Returns `None` when no primer has at most `max_mismatch`
/// mismatches.
pub fn match_at_offset<'a>(
    seq: &[u8],
    primers: &'a PrimerTable,
    start: usize,
    max_mismatch: usize,
) -> Option<OffsetMatch<'a>> {
    let window = seq.get(start..).unwrap_or(&[]);
    let mut best_mismatches = max_mismatch;
    let mut best_primers: Vec<&'a Primer> = Vec::new();

    for primer in primers {
        let mismatch = match mismatches(&primer.sequence, window) {
            Ok(mismatch) => mismatch,
            Err(_) => continue,
        };
        if mismatch < best_mismatches {
            best_primers.clear();
            best_primers.push(primer);
            best_mismatches = mismatch;
        } else if mismatch == best_mismatches {
            best_primers.push(primer);
        }
    }

    if best_primers.is_empty() {
        None
    } else {
        Some(OffsetMatch {
            mismatches: best_mismatches,
            primers: best_primers,
        })
    }
}

/// Outcome of scanning one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    /// A single primer was the best match at `offset`
    Selected {
        /// The selected primer
        primer: &'a Primer,
        /// Its mismatch count
        mismatches: usize,
        /// Offset it was found at
        offset: usize,
    },
    /// Several primers tied at the first offset with any match
    Ambiguous {
        /// Mismatch count shared by the tied primers
        mismatches: usize,
        /// Offset of the tie
        offset: usize,
    },
    /// No primer matched at any offset, `offset` is the last one tried
    Unmatched {
        /// Last offset tried
        offset: usize,
    },
}

impl<'a> Classification<'a> {
    /// Offset at which the scan stopped
    pub fn offset(&self) -> usize {
        match *self {
            Classification::Selected { offset, .. }
            | Classification::Ambiguous { offset, .. }
            | Classification::Unmatched { offset } => offset,
        }
    }

    /// Whether a single primer was picked
    pub fn is_selected(&self) -> bool {
        matches!(self, Classification::Selected { .. })
    }

    /// The selected primer
    pub fn primer(&self) -> Option<&'a Primer> {
        match *self {
            Classification::Selected { primer, .. } => Some(primer),
            _ => None,
        }
    }

    /// Mismatches of the selected primer
    pub fn mismatches(&self) -> Option<usize> {
        match *self {
            Classification::Selected { mismatches, .. } => Some(mismatches),
            _ => None,
        }
    }
}

/// Scans offsets `0..=config.max_offset` and picks at most one primer for the read
pub fn classify<'a>(seq: &[u8], primers: &'a PrimerTable, config: &Config) -> Classification<'a> {
    for offset in 0..=config.max_offset {
        let start = offset + config.umi_length;
        let found = match match_at_offset(seq, primers, start, config.max_mismatch) {
            Some(found) => found,
            None => continue,
        };

        return match found.unique() {
            Some(primer) => Classification::Selected {
                primer,
                mismatches: found.mismatches,
                offset,
            },
            None => Classification::Ambiguous {
                mismatches: found.mismatches,
                offset,
            },
        };
    }

    Classification::Unmatched {
        offset: config.max_offset,
    }
}
