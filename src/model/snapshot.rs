use super::{ItemRecord, TitleIndex};
use crate::error::Result;

/// Ordered item records from one enumeration of a remote playlist
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<ItemRecord>,
}

impl Snapshot {
    /// Parse every line into a record, in playlist order
    ///
    /// The first malformed line aborts the whole snapshot.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| ItemRecord::parse(line.as_ref()).map_err(|e| e.at_line(i + 1)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    /// Raw lines in playlist order
    pub fn raw_lines(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.raw.as_str())
    }

    /// Number of items the remote playlist reported
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build the title-keyed index of this snapshot
    pub fn index(&self) -> TitleIndex {
        self.records.iter().collect()
    }
}
