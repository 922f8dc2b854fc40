//! Primer records and the ordered table they are looked up in.
use crate::error::Error;
use crate::record::open_input;
use crate::Result;
use bio::io::fasta;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;

/// A named primer expected to follow the UMI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primer {
    /// FASTA header without the leading `>`, id and description joined by one space
    pub id: String,
    /// Primer bases, compared verbatim
    pub sequence: Vec<u8>,
}

impl Primer {
    /// Primer named `id` with the given bases
    pub fn new<I: Into<String>, S: Into<Vec<u8>>>(id: I, sequence: S) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Number of bases in the primer
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// True for a primer with no bases
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Primers in the order they were first seen. Inserting an existing id replaces
/// its sequence in place.
#[derive(Debug, Default, Clone)]
pub struct PrimerTable {
    primers: Vec<Primer>,
    index: HashMap<String, usize>,
}

impl PrimerTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primer, overwriting the sequence of an earlier primer with the same id
    pub fn insert(&mut self, primer: Primer) {
        match self.index.get(&primer.id) {
            Some(&i) => {
                debug!("primer {} redefined, keeping the later sequence", primer.id);
                self.primers[i].sequence = primer.sequence;
            }
            None => {
                self.index.insert(primer.id.clone(), self.primers.len());
                self.primers.push(primer);
            }
        }
    }

    /// Looks up a primer by id
    pub fn get(&self, id: &str) -> Option<&Primer> {
        self.index.get(id).map(|&i| &self.primers[i])
    }

    /// Primers in table order
    pub fn iter(&self) -> std::slice::Iter<'_, Primer> {
        self.primers.iter()
    }

    /// Number of distinct ids
    pub fn len(&self) -> usize {
        self.primers.len()
    }

    /// True when no primer was loaded
    pub fn is_empty(&self) -> bool {
        self.primers.is_empty()
    }

    /// Length of the longest primer, zero for an empty table
    pub fn max_len(&self) -> usize {
        self.primers.iter().map(Primer::len).max().unwrap_or(0)
    }

    /// Reads primers from FASTA, the header text after `>` becomes the id. The id and
    /// description of the header are joined by a single space.
    pub fn from_reader<T: std::io::Read>(rdr: T) -> Result<Self> {
        let rdr = fasta::Reader::new(rdr);
        let mut table = Self::new();
        for record in rdr.records() {
            let record = record.map_err(Error::FastaRecordError)?;
            let id = match record.desc() {
                Some(desc) => format!("{} {}", record.id(), desc),
                None => record.id().to_string(),
            };
            table.insert(Primer::new(id, record.seq()));
        }

        debug!("read {} primers", table.len());
        for primer in table.iter() {
            debug!(
                "primer {}: {}",
                primer.id,
                String::from_utf8_lossy(&primer.sequence)
            );
        }
        if table.is_empty() {
            warn!("no primers found, no read will be selected");
        }
        Ok(table)
    }

    /// Opens a plain or compressed FASTA and reads the primers from it
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("reading primers from \"{}\"", path.display());
        let (rdr, _) = open_input(path).map_err(|source| Error::PrimerFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(rdr)
    }
}

impl<'a> IntoIterator for &'a PrimerTable {
    type Item = &'a Primer;
    type IntoIter = std::slice::Iter<'a, Primer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::iter::FromIterator<Primer> for PrimerTable {
    fn from_iter<I: IntoIterator<Item = Primer>>(iter: I) -> Self {
        let mut table = Self::new();
        for primer in iter {
            table.insert(primer);
        }
        table
    }
}
