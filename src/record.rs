//! Mapping lines, clipped reads and the files they are read from and written to.
use crate::error::Error;
use crate::matching::Classification;
use crate::{Config, Result};
use bio::io::fastq;
use log::info;
use niffler::compression::Format;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// Written in place of the primer and mismatch count of unselected reads
pub const MISSING: &str = "None";

/// Mapping of one read to its UMI and primer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping<'a> {
    /// Read header up to the first space
    pub read_id: &'a str,
    /// Bases preceding the primer position
    pub umi: &'a [u8],
    /// Selected primer id
    pub primer: Option<&'a str>,
    /// Mismatches of the selected primer
    pub mismatches: Option<usize>,
    /// Offset at which the scan stopped
    pub offset: usize,
}

impl<'a> Mapping<'a> {
    /// Mapping of `read` at the offset where its scan stopped
    pub fn new(read: &'a fastq::Record, classification: &Classification<'a>, config: &Config) -> Self {
        let offset = classification.offset();
        Self {
            read_id: read.id(),
            umi: clamped(read.seq(), offset, offset + config.umi_length),
            primer: classification.primer().map(|p| p.id.as_str()),
            mismatches: classification.mismatches(),
            offset,
        }
    }
}

impl fmt::Display for Mapping<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t",
            self.read_id,
            String::from_utf8_lossy(self.umi),
            self.primer.unwrap_or(MISSING)
        )?;
        match self.mismatches {
            Some(mismatches) => write!(f, "{}", mismatches)?,
            None => f.write_str(MISSING)?,
        }
        write!(f, "\t{}", self.offset)
    }
}

/// What gets written for a read that passed the filter
#[derive(Debug)]
pub struct Emission<'a> {
    /// Line for the mapping output
    pub mapping: Mapping<'a>,
    /// Read from the primer position on, only built when requested
    pub clipped: Option<fastq::Record>,
}

/// Position the primer comparison started at for the final offset of the scan
pub fn clip_start(classification: &Classification<'_>, config: &Config) -> usize {
    classification.offset() + config.umi_length
}

/// Copy of the read starting at the clip position
pub fn clip(read: &fastq::Record, classification: &Classification<'_>, config: &Config) -> fastq::Record {
    let start = clip_start(classification, config);
    fastq::Record::with_attrs(
        read.id(),
        read.desc(),
        clamped(read.seq(), start, read.seq().len()),
        clamped(read.qual(), start, read.qual().len()),
    )
}

/// Builds the output for one read, `None` if the read is dropped
pub fn emit<'a>(
    read: &'a fastq::Record,
    classification: &Classification<'a>,
    config: &Config,
    with_clipped: bool,
) -> Option<Emission<'a>> {
    if !classification.is_selected() && !config.include_invalid {
        return None;
    }

    let clipped = if with_clipped {
        Some(clip(read, classification, config))
    } else {
        None
    };
    Some(Emission {
        mapping: Mapping::new(read, classification, config),
        clipped,
    })
}

fn clamped(seq: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(seq.len());
    let start = start.min(end);
    &seq[start..end]
}

/// Destination of the mapping lines and, optionally, the clipped reads
pub struct RecordWriter<W: Write> {
    mapping: W,
    clipped: Option<fastq::Writer<Box<dyn Write>>>,
}

impl<W: Write> fmt::Debug for RecordWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordWriter")
            .field("clipped", &self.clipped.is_some())
            .finish()
    }
}

impl<W: Write> RecordWriter<W> {
    /// Writes mapping lines only
    pub fn new(mapping: W) -> Self {
        Self {
            mapping,
            clipped: None,
        }
    }

    /// Also writes clipped reads to `clipped`
    pub fn with_clipped(mapping: W, clipped: Box<dyn Write>) -> Self {
        Self {
            mapping,
            clipped: Some(fastq::Writer::new(clipped)),
        }
    }

    /// Writes a read if it passes the filter and reports whether it did
    pub fn write(
        &mut self,
        read: &fastq::Record,
        classification: &Classification<'_>,
        config: &Config,
    ) -> Result<bool> {
        let emission = match emit(read, classification, config, self.clipped.is_some()) {
            Some(emission) => emission,
            None => return Ok(false),
        };

        if let (Some(writer), Some(clipped)) = (self.clipped.as_mut(), emission.clipped.as_ref()) {
            writer.write_record(clipped)?;
        }
        writeln!(self.mapping, "{}", emission.mapping)?;
        Ok(true)
    }

    /// Flushes both outputs
    pub fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.clipped.as_mut() {
            writer.flush()?;
        }
        self.mapping.flush()?;
        Ok(())
    }
}

/// Opens a plain or compressed FASTQ as a lazy record iterator
pub fn open_reads<P: AsRef<Path>>(
    path: P,
) -> Result<impl Iterator<Item = std::result::Result<fastq::Record, fastq::Error>>> {
    let path = path.as_ref();
    let (rdr, format) = open_input(path).map_err(|source| Error::OpenReads {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "reading sequences from {} file \"{}\"",
        describe(format),
        path.display()
    );
    Ok(fastq::Reader::new(rdr).records())
}

/// Opens a file that may be compressed. Files too short to sniff are read as plain text.
pub fn open_input(
    path: &Path,
) -> std::result::Result<(Box<dyn io::Read>, Format), niffler::Error> {
    match niffler::from_path(path) {
        Err(niffler::Error::FileTooShort) => {
            let file = std::fs::File::open(path).map_err(niffler::Error::IOError)?;
            Ok((Box::new(file), Format::No))
        }
        other => other,
    }
}

/// Creates the clipped FASTQ, gzip compressed when the name ends in `.gz`
pub fn create_clipped<P: AsRef<Path>>(path: P) -> Result<Box<dyn Write>> {
    let path = path.as_ref();
    let format = match path.extension() {
        Some(ext) if ext == "gz" => Format::Gzip,
        _ => Format::No,
    };
    let writer = niffler::to_path(path, format, niffler::compression::Level::Six).map_err(
        |source| Error::CreateOutput {
            path: path.to_path_buf(),
            source,
        },
    )?;
    info!(
        "writing clipped sequences to {} file \"{}\"",
        describe(format),
        path.display()
    );
    Ok(writer)
}

fn describe(format: Format) -> &'static str {
    match format {
        Format::No => "plain",
        _ => "compressed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primer::{Primer, PrimerTable};

    fn config(include_invalid: bool) -> Config {
        Config {
            umi_length: 2,
            max_offset: 0,
            max_mismatch: 1,
            include_invalid,
        }
    }

    fn primers() -> PrimerTable {
        vec![Primer::new("P1", "ACGT"), Primer::new("P2", "TTTT")]
            .into_iter()
            .collect()
    }

    fn read(seq: &str) -> fastq::Record {
        let qual = "ABCDEFGHIJ".get(..seq.len()).unwrap();
        fastq::Record::with_attrs("read1", Some("1:N:0:1"), seq.as_bytes(), qual.as_bytes())
    }

    #[test]
    fn selected_mapping_line() {
        let primers = primers();
        let read = read("NNACGTAAAA");
        let c = Classification::Selected {
            primer: primers.get("P1").unwrap(),
            mismatches: 0,
            offset: 0,
        };
        let emission = emit(&read, &c, &config(false), true).unwrap();
        assert_eq!(emission.mapping.to_string(), "read1\tNN\tP1\t0\t0");
        let clipped = emission.clipped.unwrap();
        assert_eq!(clipped.seq(), b"ACGTAAAA");
        assert_eq!(clipped.qual(), b"CDEFGHIJ");
        assert_eq!(clipped.seq(), &read.seq()[2..]);
        assert_eq!(clipped.id(), "read1");
        assert_eq!(clipped.desc(), Some("1:N:0:1"));
    }

    #[test]
    fn umi_and_clip_follow_offset() {
        let primers = primers();
        let read = read("GGCANNACGT");
        let c = Classification::Selected {
            primer: primers.get("P1").unwrap(),
            mismatches: 0,
            offset: 2,
        };
        let mapping = Mapping::new(&read, &c, &config(false));
        assert_eq!(mapping.umi, b"CA");
        assert_eq!(mapping.to_string(), "read1\tCA\tP1\t0\t2");
        assert_eq!(clip(&read, &c, &config(false)).seq(), b"NNACGT");
    }

    #[test]
    fn unselected_reads_are_dropped_by_default() {
        let read = read("NNGGGGCCCC");
        let c = Classification::Unmatched { offset: 0 };
        assert!(emit(&read, &c, &config(false), true).is_none());
    }

    #[test]
    fn unselected_reads_use_missing_marker() {
        let read = read("NNGGGGCCCC");
        let c = Classification::Ambiguous {
            mismatches: 0,
            offset: 0,
        };
        let emission = emit(&read, &c, &config(true), true).unwrap();
        assert_eq!(emission.mapping.to_string(), "read1\tNN\tNone\tNone\t0");
        assert_eq!(emission.clipped.unwrap().seq(), b"GGGGCCCC");
    }

    #[test]
    fn clipped_record_only_when_requested() {
        let primers = primers();
        let read = read("NNACGTAAAA");
        let c = Classification::Selected {
            primer: primers.get("P1").unwrap(),
            mismatches: 0,
            offset: 0,
        };
        assert!(emit(&read, &c, &config(false), false)
            .unwrap()
            .clipped
            .is_none());
    }

    #[test]
    fn short_read_is_clamped() {
        let read = read("NA");
        let c = Classification::Unmatched { offset: 3 };
        let emission = emit(&read, &c, &config(true), true).unwrap();
        assert_eq!(emission.mapping.umi, b"");
        assert_eq!(emission.clipped.unwrap().seq(), b"");
    }

    #[test]
    fn writer_writes_mapping_and_clipped() {
        let primers = primers();
        let read = read("NNACGGAAAA");
        let c = Classification::Selected {
            primer: primers.get("P1").unwrap(),
            mismatches: 1,
            offset: 0,
        };
        let mut mapping = Vec::new();
        let clipped = tempfile::NamedTempFile::new().unwrap();
        {
            let file = std::fs::File::create(clipped.path()).unwrap();
            let mut writer = RecordWriter::with_clipped(&mut mapping, Box::new(file));
            assert!(writer.write(&read, &c, &config(false)).unwrap());
            assert!(!writer
                .write(&read, &Classification::Unmatched { offset: 0 }, &config(false))
                .unwrap());
            writer.finish().unwrap();
        }
        assert_eq!(String::from_utf8(mapping).unwrap(), "read1\tNN\tP1\t1\t0\n");
        let fq = std::fs::read_to_string(clipped.path()).unwrap();
        assert_eq!(fq, "@read1 1:N:0:1\nACGGAAAA\n+\nCDEFGHIJ\n");
    }

    #[test]
    fn selected_and_unselected_clip_at_same_position() {
        let primers = primers();
        let read = read("NNACGTAAAA");
        let selected = Classification::Selected {
            primer: primers.get("P1").unwrap(),
            mismatches: 0,
            offset: 0,
        };
        let unmatched = Classification::Unmatched { offset: 0 };
        assert_eq!(clip_start(&selected, &config(true)), 2);
        assert_eq!(
            clip(&read, &selected, &config(true)).seq(),
            clip(&read, &unmatched, &config(true)).seq()
        );
    }

    #[test]
    fn empty_reads_file_has_no_records() {
        let empty = tempfile::NamedTempFile::new().unwrap();
        let records = open_reads(empty.path()).unwrap();
        assert_eq!(records.count(), 0);
    }

    #[test]
    fn short_file_opens_as_plain() {
        let short = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(short.path(), b">P\nA").unwrap();
        let (mut rdr, format) = open_input(short.path()).unwrap();
        assert_eq!(format, Format::No);
        let mut content = String::new();
        io::Read::read_to_string(&mut rdr, &mut content).unwrap();
        assert_eq!(content, ">P\nA");
    }

    #[test]
    fn gz_suffix_selects_compression() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipped.fastq.gz");
        {
            let mut writer = create_clipped(&path).unwrap();
            writer.write_all(b"@r\nA\n+\nI\n").unwrap();
        }
        let (_, format) = niffler::from_path(&path).unwrap();
        assert_eq!(format, Format::Gzip);
    }
}
