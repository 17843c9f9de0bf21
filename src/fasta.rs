use crate::error::RefmodError;
use crate::types::HashMap;
use anyhow::Result;
use needletail::errors::ParseErrorKind;
use needletail::parser::{FastxReader, LineEnding, write_fasta};
use needletail::{parse_fastx_file, parse_fastx_reader};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub header: String,
    pub bases: String,
}

/// FASTA records in file order, addressable by header.
#[derive(Debug, Default)]
pub struct FastaDb {
    records: Vec<Sequence>,
    index: HashMap<String, usize>,
}

impl FastaDb {
    pub fn load(path: &Path) -> Result<Self> {
        let reader = match parse_fastx_file(path) {
            Ok(reader) => reader,
            Err(e) if e.kind == ParseErrorKind::EmptyFile => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow::anyhow!("failed to open FASTA {}: {}", path.display(), e));
            }
        };
        Self::collect(reader)
    }

    pub fn from_reader<R: Read + Send>(reader: R) -> Result<Self> {
        match parse_fastx_reader(reader) {
            Ok(reader) => Self::collect(reader),
            Err(e) if e.kind == ParseErrorKind::EmptyFile => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!("failed to open FASTA stream: {}", e)),
        }
    }

    fn collect<'a>(mut reader: Box<dyn FastxReader + 'a>) -> Result<Self> {
        let mut db = Self::default();
        while let Some(result) = reader.next() {
            let record = result
                .map_err(|e| anyhow::anyhow!("failed to parse FASTA record: {}", e))?;
            let header = String::from_utf8_lossy(record.id()).into_owned();
            let bases = String::from_utf8(record.seq().into_owned()).map_err(|e| {
                anyhow::anyhow!("FASTA record '{}' is not valid UTF-8: {}", header, e)
            })?;
            db.push(Sequence { header, bases });
        }
        Ok(db)
    }

    /// Records sharing a header are concatenated in file order.
    pub fn push(&mut self, seq: Sequence) {
        if let Some(&idx) = self.index.get(&seq.header) {
            tracing::debug!(header = %seq.header, "repeated FASTA header, concatenating");
            self.records[idx].bases.push_str(&seq.bases);
            return;
        }
        self.index.insert(seq.header.clone(), self.records.len());
        self.records.push(seq);
    }

    pub fn get(&self, header: &str) -> Option<&Sequence> {
        self.index.get(header).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[Sequence] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The reference is the first record; it must carry a non-empty sequence.
    pub fn into_reference(mut self, source: &str) -> std::result::Result<Sequence, RefmodError> {
        if self.records.len() > 1 {
            tracing::warn!(
                source,
                records = self.records.len(),
                "reference FASTA has several records, using the first"
            );
        }
        match self.records.drain(..).next() {
            Some(seq) if !seq.bases.is_empty() => Ok(seq),
            _ => Err(RefmodError::MissingReferenceHeader { path: source.to_string() }),
        }
    }
}

pub fn write_sequence(writer: &mut dyn Write, seq: &Sequence) -> Result<()> {
    write_fasta(seq.header.as_bytes(), seq.bases.as_bytes(), writer, LineEnding::Unix)
        .map_err(|e| anyhow::anyhow!("failed to write FASTA record '{}': {}", seq.header, e))
}
