use indexmap::IndexMap;

use crate::dao::models::MatchRecord;

/// Ordered, duplicate-free match list, most recent first.
///
/// Built wholesale from a fetched snapshot: the first occurrence of a `match_id` wins and
/// keeps its position, later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchCollection {
    records: IndexMap<String, MatchRecord>,
}

impl MatchCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deduplicate `records` by `match_id`, preserving the received order.
    pub fn from_records(records: impl IntoIterator<Item = MatchRecord>) -> Self {
        let mut collected = IndexMap::new();
        for record in records {
            collected.entry(record.match_id.clone()).or_insert(record);
        }
        Self { records: collected }
    }

    /// Number of distinct matches.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no match is known.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Match with the given id.
    pub fn get(&self, match_id: &str) -> Option<&MatchRecord> {
        self.records.get(match_id)
    }

    /// Whether a match with the given id is present.
    pub fn contains(&self, match_id: &str) -> bool {
        self.records.contains_key(match_id)
    }

    /// Records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.values()
    }

    /// Match ids in collection order.
    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Whether `other` lists different matches, or the same ones in a different order.
    ///
    /// Records are immutable upstream, so identities are enough to detect a change.
    pub fn differs_from(&self, other: &MatchCollection) -> bool {
        self.len() != other.len() || !self.match_ids().eq(other.match_ids())
    }
}

impl<'a> IntoIterator for &'a MatchCollection {
    type Item = &'a MatchRecord;
    type IntoIter = indexmap::map::Values<'a, String, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
