//! Errors raised while reading primers and reads or writing results.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors of which majority are related to I/O issues or incorrect file format errors
pub enum Error {
    #[error("failed to read primers from \"{path}\": {source}")]
    /// Primer FASTA could not be opened
    PrimerFile {
        /// Primer file location
        path: PathBuf,
        /// Underlying open error
        source: niffler::Error,
    },
    #[error("failed to open file \"{path}\": {source}")]
    /// Reads FASTQ could not be opened
    OpenReads {
        /// Reads file location
        path: PathBuf,
        /// Underlying open error
        source: niffler::Error,
    },
    #[error("failed to open file \"{path}\": {source}")]
    /// Clipped FASTQ destination could not be created
    CreateOutput {
        /// Output file location
        path: PathBuf,
        /// Underlying create error
        source: niffler::Error,
    },
    #[error("Could not read FASTA record: {0}")]
    /// Could not read an entry in a fasta file
    FastaRecordError(#[source] std::io::Error),
    #[error("Could not read FASTQ record {0}: {1}")]
    /// Could not read an entry in a fastq file
    FastqRecordError(usize, #[source] bio::io::fastq::Error),
    #[error("Pattern of length {pattern} is longer than the {candidate} bases it is compared to")]
    /// Distance requested for a pattern that does not fit the candidate
    PatternTooLong {
        /// Pattern length
        pattern: usize,
        /// Candidate length
        candidate: usize,
    },
    #[error("Could not write output: {0}")]
    /// Write failure on stdout or the clipped FASTQ
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the downstream consumer closed its end of the pipe
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn broken_pipe_is_recognised() {
        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(err.is_broken_pipe());
    }

    #[test]
    fn other_io_errors_are_not_broken_pipe() {
        let err = Error::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_broken_pipe());
        assert!(!Error::PatternTooLong {
            pattern: 4,
            candidate: 2
        }
        .is_broken_pipe());
    }
}
