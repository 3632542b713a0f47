use super::ItemRecord;
use std::collections::HashMap;

/// URL and raw record remembered for one title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Canonical item URL
    pub url: String,

    /// Raw serialized record, replayable into a manifest
    pub raw: String,
}

/// Mapping from item title to its URL and raw record
///
/// Titles are unique within an index: folding a record whose title is
/// already present replaces the earlier entry (last write wins).
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    entries: HashMap<String, IndexEntry>,
}

impl TitleIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a record into the index
    ///
    /// Returns true if an entry with the same title was replaced.
    pub fn insert(&mut self, record: &ItemRecord) -> bool {
        let entry = IndexEntry {
            url: record.url(),
            raw: record.raw.clone(),
        };

        let replaced = self.entries.insert(record.title.clone(), entry).is_some();
        if replaced {
            log::warn!(
                "Duplicate title {:?} folded into index (keeping id {})",
                record.title,
                record.id
            );
        }
        replaced
    }

    /// Look up a title
    pub fn get(&self, title: &str) -> Option<&IndexEntry> {
        self.entries.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    /// All titles in the index, in no particular order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a ItemRecord> for TitleIndex {
    fn from_iter<I: IntoIterator<Item = &'a ItemRecord>>(iter: I) -> Self {
        let mut index = TitleIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
